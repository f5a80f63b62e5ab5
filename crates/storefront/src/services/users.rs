//! User service client - authentication.

use prism_core::UserId;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use super::{ApiError, ServiceClient};
use crate::local::LocalStore;
use crate::models::User;

/// Development-only bypass credentials.
///
/// Inherited from the original client, where they were reachable in
/// production on any login failure. Here they are honored only when the
/// `dev_admin_bypass` config flag is set AND the build is a debug
/// build; release binaries can never take this path.
const DEV_ADMIN_EMAIL: &str = "admin@gmail.com";
const DEV_ADMIN_PASSWORD: &str = "admin@123";
const DEV_ADMIN_TOKEN: &str = "admin-local-token";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
    user: User,
}

/// Client for the user/auth service.
#[derive(Debug, Clone)]
pub struct UserClient {
    inner: ServiceClient,
    local: LocalStore,
    dev_admin_bypass: bool,
}

impl UserClient {
    /// Create a new user service client.
    #[must_use]
    pub fn new(base: Url, local: LocalStore, dev_admin_bypass: bool) -> Self {
        Self {
            inner: ServiceClient::new(base, local.clone()),
            local,
            dev_admin_bypass,
        }
    }

    /// Authenticate against the user service.
    ///
    /// On success the bearer token (when provided) and the admin flag
    /// are persisted to the local session blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or credentials are
    /// rejected; there is no automatic retry.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let result: Result<LoginResponse, ApiError> = self
            .inner
            .post_json("/api/users/login", &LoginRequest { email, password })
            .await;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                if let Some(user) = self.dev_bypass(email, password) {
                    tracing::warn!("login failed, using development admin bypass");
                    return Ok(user);
                }
                return Err(err);
            }
        };

        if let Some(token) = &response.token {
            self.local.set_token(token.clone());
        }
        self.local.set_is_admin(response.user.is_admin);
        Ok(response.user)
    }

    /// The development admin bypass, unreachable in release builds.
    fn dev_bypass(&self, email: &str, password: &str) -> Option<User> {
        if !cfg!(debug_assertions) || !self.dev_admin_bypass {
            return None;
        }
        if email != DEV_ADMIN_EMAIL || password != DEV_ADMIN_PASSWORD {
            return None;
        }
        self.local.set_token(DEV_ADMIN_TOKEN);
        self.local.set_is_admin(true);
        Some(User {
            id: UserId::new(0),
            name: "Administrator".to_string(),
            email: DEV_ADMIN_EMAIL.to_string(),
            avatar: None,
            is_admin: true,
        })
    }
}
