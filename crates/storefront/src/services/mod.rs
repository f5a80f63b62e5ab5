//! Backend service clients.
//!
//! Six independent HTTP collaborators, each consumed through the same
//! request/response contract: JSON bodies, bearer-token auth, non-2xx
//! mapped to [`ApiError::Api`]. The clients never re-implement backend
//! logic; they issue requests and decode responses.
//!
//! # Services
//!
//! - [`users`] - authentication
//! - [`products`] - catalog read/write (cached)
//! - [`orders`] - order placement and history
//! - [`payments`] - payment processing and status polling
//! - [`shipping`] - shipment creation, status polling, tracking
//! - [`reviews`] - product reviews

pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod shipping;
pub mod users;

pub use orders::OrderClient;
pub use payments::PaymentClient;
pub use products::ProductClient;
pub use reviews::ReviewClient;
pub use shipping::ShippingClient;
pub use users::UserClient;

use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::local::LocalStore;

/// Errors that can occur when calling a backend service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Shared HTTP plumbing for the per-service clients.
///
/// The bearer token is read from the local session blob per request
/// (it appears after login, not at construction time).
#[derive(Debug, Clone)]
pub(crate) struct ServiceClient {
    client: reqwest::Client,
    base: Url,
    local: LocalStore,
}

impl ServiceClient {
    pub(crate) fn new(base: Url, local: LocalStore) -> Self {
        Self {
            client: reqwest::Client::new(),
            base,
            local,
        }
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Parse(format!("invalid path {path}: {e}")))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.local.token() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .authorize(self.client.get(self.url(path)?))
            .send()
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .authorize(self.client.post(self.url(path)?))
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// POST with no request body (e.g. `/helpful`, `/cancel` actions).
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .authorize(self.client.post(self.url(path)?))
            .send()
            .await?;
        Self::decode(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self
            .authorize(self.client.delete(self.url(path)?))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 502 - bad gateway");

        let err = ApiError::NotFound("product p1".to_string());
        assert_eq!(err.to_string(), "Not found: product p1");
    }
}
