use serde::Serialize;

use crate::storage::AuthCookie;

/// Where the UI should land after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Navigation {
    Login,
    Dashboard,
}

impl Navigation {
    /// The webview route for this destination.
    pub fn path(self) -> &'static str {
        match self {
            Navigation::Login => "/login",
            Navigation::Dashboard => "/dashboard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "to", rename_all = "lowercase")]
pub enum RouteDecision {
    Allow,
    Redirect(Navigation),
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    protected: Vec<String>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(["/dashboard", "/profile"])
    }
}

impl RouteGuard {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protected: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn evaluate(&self, path: &str, authenticated: bool) -> RouteDecision {
        if self.is_protected(path) && !authenticated {
            RouteDecision::Redirect(Navigation::Login)
        } else {
            RouteDecision::Allow
        }
    }

    /// Boundary check on the server-visible cookie alone, before any
    /// session state has been loaded.
    pub fn evaluate_cookie(&self, path: &str, cookie: &AuthCookie) -> RouteDecision {
        self.evaluate(path, cookie.is_present())
    }
}
