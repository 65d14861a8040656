//! Error Types

use std::time::Duration;

use thiserror::Error;

/// Result type alias for storefront operations
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Shown whenever a checkout attempt fails, whatever the cause.
pub const CHECKOUT_FAILED_MESSAGE: &str =
    "Sorry, we couldn't process your payment request. Please try again later.";

/// Storefront error types
#[derive(Error, Debug)]
pub enum StorefrontError {
    /// Session lookup failed (distinct from "no session")
    #[error("Auth error: {0}")]
    Auth(String),

    /// Subscription status lookup failed
    #[error("Subscription lookup error: {0}")]
    Subscription(String),

    /// Payment session could not be created
    #[error("Payment error: {0}")]
    Payment(String),

    /// A collaborator call did not resolve in time
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Article fetch failed
    #[error("Article fetch error: {0}")]
    Article(String),

    /// Native share or clipboard call failed
    #[error("Share error: {0}")]
    Share(String),

    /// Collaborator returned a non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl StorefrontError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            StorefrontError::Timeout(_) => true,
            StorefrontError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Convert to a user-friendly message. Never includes the raw cause.
    pub fn user_message(&self) -> &'static str {
        match self {
            StorefrontError::Auth(_)
            | StorefrontError::Payment(_)
            | StorefrontError::Timeout(_) => CHECKOUT_FAILED_MESSAGE,
            StorefrontError::Subscription(_) => "We couldn't check your subscription status.",
            StorefrontError::Article(_) => "This article could not be loaded.",
            StorefrontError::Share(_) => "Sharing is not available right now.",
            StorefrontError::Config(_) => "Service configuration error.",
            _ => "An unexpected error occurred.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_cause() {
        let err = StorefrontError::Payment("stripe: card_declined sk_live_123".into());
        assert_eq!(err.user_message(), CHECKOUT_FAILED_MESSAGE);
        assert!(!err.user_message().contains("sk_live"));
    }

    #[test]
    fn test_retryable() {
        assert!(StorefrontError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(StorefrontError::Http { status: 503, message: "down".into() }.is_retryable());
        assert!(!StorefrontError::Http { status: 400, message: "bad".into() }.is_retryable());
        assert!(!StorefrontError::Payment("x".into()).is_retryable());
    }
}
