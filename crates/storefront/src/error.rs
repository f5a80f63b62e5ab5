//! Unified error handling for the storefront client.
//!
//! Library callers that do not care which layer failed can hold an
//! `AppError`; everything converts into it via `#[from]`.

use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::services::ApiError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// A backend service request failed.
    #[error("Service error: {0}")]
    Service(#[from] ApiError),

    /// The checkout sequencer failed or was cancelled.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Configuration loading failed.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Service(ApiError::NotFound("product p1".to_string()));
        assert_eq!(err.to_string(), "Service error: Not found: product p1");

        let err = AppError::Checkout(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Checkout error: cart is empty");
    }
}
