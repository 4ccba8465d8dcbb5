//! Process-wide admin session.
//!
//! Nothing outside this module holds the bearer token: handlers ask the
//! context for it, and the admin cookie is only ever compared against it.

use crate::backend::{AdminUser, ApiClient, ApiError, Credentials};
use crate::i18n::Language;
use crate::security::constant_time_compare;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email and password are required")]
    MissingCredentials,

    #[error("credentials were refused by the backend")]
    InvalidCredentials,

    #[error("login request failed: {0}")]
    Backend(#[source] ApiError),
}

impl AuthError {
    /// Short localized message for the login page.
    pub fn user_message(&self, language: Language) -> &'static str {
        let strings = language.strings();
        match self {
            AuthError::MissingCredentials => strings.field_required,
            AuthError::InvalidCredentials | AuthError::Backend(_) => strings.login_failed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
    pub user: AdminUser,
}

#[derive(Clone)]
pub struct AuthContext {
    client: ApiClient,
    session: Arc<RwLock<Option<AdminSession>>>,
}

impl AuthContext {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            session: Arc::new(RwLock::new(None)),
        }
    }

    /// Log in against the backend and keep the returned token.
    pub async fn login(&self, credentials: Credentials) -> Result<String, AuthError> {
        if credentials.email.trim().is_empty() || credentials.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let credentials = Credentials {
            email: credentials.email.trim().to_string(),
            password: credentials.password,
        };

        let response = match self.client.login(&credentials).await {
            Ok(response) => response,
            Err(ApiError::Unauthorized) | Err(ApiError::Rejected(_)) => {
                warn!("Login refused for {}", credentials.email);
                return Err(AuthError::InvalidCredentials);
            }
            Err(ApiError::Status { status, .. }) if matches!(status, 403 | 422) => {
                warn!("Login refused for {} (HTTP {})", credentials.email, status);
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                warn!("Login request failed: {}", e);
                return Err(AuthError::Backend(e));
            }
        };

        info!("Admin {} logged in", credentials.email);
        let token = response.token.clone();
        *self.session.write().await = Some(AdminSession {
            token: response.token,
            user: response.user,
        });
        Ok(token)
    }

    pub async fn logout(&self) {
        if self.session.write().await.take().is_some() {
            info!("Admin session cleared");
        }
    }

    pub async fn current_token(&self) -> Option<String> {
        self.session.read().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn current_user(&self) -> Option<AdminUser> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    /// Whether a presented token matches the active session.
    pub async fn verify(&self, presented: &str) -> bool {
        match self.session.read().await.as_ref() {
            Some(session) => constant_time_compare(&session.token, presented),
            None => false,
        }
    }
}
