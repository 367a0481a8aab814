use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::{LoginRequest, SignupRequest, TokenResponse, User};
use crate::navigation::{Navigation, RouteDecision, RouteGuard};
use crate::storage::Identity;

#[derive(Error, Debug)]
pub enum SessionError {
    /// Credentials or registration refused; the message is fit for display.
    #[error("{message}")]
    Rejected {
        message: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to persist session: {0}")]
    Storage(#[from] crate::error::StorageError),
}

/// The signed-in identity and the operations that change it.
///
/// Constructed once per application and shared by `Arc` with the task list
/// and chat controller.
pub struct Session {
    client: Arc<ApiClient>,
    guard: RouteGuard,
    loading: AtomicBool,
}

impl Session {
    pub fn new(client: Arc<ApiClient>) -> Self {
        let guard = RouteGuard::new(client.config().protected_routes.iter().cloned());
        Self {
            client,
            guard,
            loading: AtomicBool::new(true),
        }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    /// Restores the identity persisted by a previous run. A stored token with
    /// no cached user is checked against `/api/auth/me`; if that fails the
    /// stored identity is discarded and the session stays signed out.
    pub async fn initialize(&self) {
        self.loading.store(true, Ordering::SeqCst);
        self.restore().await;
        self.loading.store(false, Ordering::SeqCst);
        log::info!(
            "Session initialized, authenticated: {}",
            self.is_authenticated()
        );
    }

    async fn restore(&self) {
        let storage = self.client.storage();
        let mut user = storage.cached_user();
        let Some(token) = storage.cached_token() else {
            return;
        };

        if user.is_none() {
            match self.client.get::<User>("/api/auth/me").await {
                Ok(me) => {
                    if let Err(e) = storage.cache_user(&me) {
                        log::warn!("Failed to cache validated user: {}", e);
                    }
                    user = Some(me);
                }
                Err(e) => {
                    log::warn!("Stored token failed validation, signing out: {}", e);
                    storage.clear();
                    return;
                }
            }
        }

        if let Some(user) = user {
            storage.adopt(user, token);
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Navigation, SessionError> {
        log::info!("Logging in {}", email);
        let body = LoginRequest {
            username: email,
            password,
        };
        let response = self
            .client
            .post::<_, TokenResponse>("/api/auth/login", &body)
            .await
            .map_err(|e| rejected(e, "Login failed. Please try again."))?;

        self.accept(response)
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<Navigation, SessionError> {
        log::info!("Registering {}", email);
        let body = SignupRequest {
            email,
            password,
            first_name,
            last_name,
        };
        let response = self
            .client
            .post::<_, TokenResponse>("/api/auth/signup", &body)
            .await
            .map_err(|e| rejected(e, "Registration failed. Please try again."))?;

        self.accept(response)
    }

    fn accept(&self, response: TokenResponse) -> Result<Navigation, SessionError> {
        log::info!("Signed in as {}", response.user.display_name());
        self.client
            .storage()
            .establish(response.user, response.access_token)?;
        Ok(Navigation::Dashboard)
    }

    /// Tells the backend, then forgets the identity whatever it answered.
    pub async fn logout(&self) -> Navigation {
        if let Err(e) = self
            .client
            .post_empty::<serde::de::IgnoredAny>("/api/auth/logout")
            .await
        {
            log::warn!("Logout API call failed: {}", e);
        }
        self.client.storage().clear();
        let next = Navigation::Login;
        log::info!("Logged out, returning to {}", next.path());
        next
    }

    pub fn identity(&self) -> Identity {
        self.client.storage().identity()
    }

    pub fn user(&self) -> Option<User> {
        self.identity().user
    }

    pub fn token(&self) -> Option<String> {
        self.identity().token
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_authenticated()
    }

    /// Decides whether `path` may be shown. Until initialization has finished
    /// only the auth cookie is consulted.
    pub fn guard(&self, path: &str) -> RouteDecision {
        if self.is_loading() {
            return self.guard.evaluate_cookie(path, self.client.storage().cookie());
        }
        self.guard.evaluate(path, self.is_authenticated())
    }
}

fn rejected(source: ApiError, fallback: &str) -> SessionError {
    log::error!("Authentication request failed: {}", source);
    let message = source.detail().unwrap_or(fallback).to_string();
    SessionError::Rejected { message, source }
}
