//! Storefront Configuration
//!
//! Every field has a product default, so an empty JSON object is a valid
//! configuration and overrides only need to name what they change.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StorefrontError};

pub const DEFAULT_TITLE: &str = "AI Interior Design | Free, No Sign Up, No Credit Card";

pub const DEFAULT_DESCRIPTION: &str = "Transform your space with our free AI interior design tool. \
No sign up or credit card required. Get instant design recommendations powered by AI.";

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    pub checkout: CheckoutConfig,
    pub article: ArticleConfig,
    pub metadata: MetadataDefaults,
}

impl StorefrontConfig {
    /// Parse overrides from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.checkout.plan.price_usd == 0 {
            return Err(StorefrontError::Config("plan price must be positive".into()));
        }
        if self.checkout.payment_timeout_ms == 0 {
            return Err(StorefrontError::Config("payment timeout must be positive".into()));
        }
        if !self.checkout.auth_route.starts_with('/') || !self.article.not_found_route.starts_with('/') {
            return Err(StorefrontError::Config("in-app routes must start with '/'".into()));
        }
        Ok(())
    }
}

/// The single paid plan offered by the pricing widget
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    pub name: String,
    /// Whole US dollars, sent as-is to the payment service
    pub price_usd: u32,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            name: "Starter Package".into(),
            price_usd: 14,
        }
    }
}

/// What a failed subscription lookup means for the purchase control
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupFailurePolicy {
    /// Treat as not subscribed and let the user try to buy
    #[default]
    FailOpen,
    /// Keep the status unknown and the control disabled
    FailClosed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    pub plan: PlanConfig,
    pub auth_route: String,
    pub payment_timeout_ms: u64,
    pub lookup_failure_policy: LookupFailurePolicy,
}

impl CheckoutConfig {
    pub fn payment_timeout(&self) -> Duration {
        Duration::from_millis(self.payment_timeout_ms)
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            plan: PlanConfig::default(),
            auth_route: "/auth".into(),
            payment_timeout_ms: 15_000,
            lookup_failure_policy: LookupFailurePolicy::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleConfig {
    pub not_found_route: String,
    /// Share title used when the article has none
    pub share_fallback_title: String,
}

impl Default for ArticleConfig {
    fn default() -> Self {
        Self {
            not_found_route: "/not-found".into(),
            share_fallback_title: "Blog Post".into(),
        }
    }
}

/// Head contents restored when an article view goes away
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataDefaults {
    pub title: String,
    pub description: String,
}

impl Default for MetadataDefaults {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.into(),
            description: DEFAULT_DESCRIPTION.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = StorefrontConfig::from_json("{}").unwrap();
        assert_eq!(config, StorefrontConfig::default());
        assert_eq!(config.checkout.plan.price_usd, 14);
        assert_eq!(config.checkout.payment_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_partial_override() {
        let config = StorefrontConfig::from_json(
            r#"{ "checkout": { "lookup_failure_policy": "fail_closed", "plan": { "price_usd": 20 } } }"#,
        )
        .unwrap();
        assert_eq!(config.checkout.lookup_failure_policy, LookupFailurePolicy::FailClosed);
        assert_eq!(config.checkout.plan.price_usd, 20);
        assert_eq!(config.checkout.plan.name, "Starter Package");
        assert_eq!(config.checkout.auth_route, "/auth");
    }

    #[test]
    fn test_invalid_config() {
        assert!(StorefrontConfig::from_json(r#"{ "checkout": { "plan": { "price_usd": 0 } } }"#).is_err());
        assert!(StorefrontConfig::from_json(r#"{ "checkout": { "auth_route": "auth" } }"#).is_err());
        assert!(StorefrontConfig::from_json("not json").is_err());
    }
}
