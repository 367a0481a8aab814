use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use url::Url;

pub const AUTH_COOKIE: &str = "auth_token";

const ONE_DAY_SECS: u64 = 24 * 60 * 60;

/// The `auth_token` cookie, kept in the jar the HTTP client sends with every
/// request so the server can see it.
#[derive(Clone)]
pub struct AuthCookie {
    jar: Arc<Jar>,
    url: Url,
}

impl AuthCookie {
    pub fn new(url: Url) -> Self {
        Self {
            jar: Arc::new(Jar::default()),
            url,
        }
    }

    pub fn jar(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }

    pub fn set(&self, token: &str) {
        let cookie = format!(
            "{}={}; Max-Age={}; Path=/; SameSite=Strict",
            AUTH_COOKIE, token, ONE_DAY_SECS
        );
        self.jar.add_cookie_str(&cookie, &self.url);
    }

    pub fn get(&self) -> Option<String> {
        let header = self.jar.cookies(&self.url)?;
        let raw = header.to_str().ok()?;
        raw.split(';')
            .map(str::trim)
            .find_map(|pair| pair.strip_prefix(AUTH_COOKIE)?.strip_prefix('='))
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    pub fn is_present(&self) -> bool {
        self.get().is_some()
    }

    pub fn clear(&self) {
        // An already-expired cookie evicts the stored one.
        let cookie = format!(
            "{}=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Path=/",
            AUTH_COOKIE
        );
        self.jar.add_cookie_str(&cookie, &self.url);
    }
}
