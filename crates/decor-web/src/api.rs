//! API Client
//!
//! HTTP adapters for the auth, subscription, payment and article services.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use decor_core::{
    Article, ArticleService, AuthProvider, PaymentService, PaymentSession, Result, Session,
    StorefrontError, SubscriptionService,
};

#[derive(Debug, Deserialize)]
struct SessionResponse {
    #[serde(default)]
    session: Option<Session>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionResponse {
    subscribed: bool,
}

#[derive(Debug, Serialize)]
struct PaymentRequest {
    amount: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Client for the storefront backend
pub struct ApiClient {
    client: reqwest::Client,
    base: String,
}

impl ApiClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: base.into(),
        }
    }

    /// Base URL from `DECOR_API_BASE` at build time; relative bases are
    /// resolved against the page origin.
    pub fn from_build_env() -> Self {
        let base = option_env!("DECOR_API_BASE").unwrap_or("/api");
        if base.starts_with('/') {
            let origin = web_sys::window()
                .and_then(|w| w.location().origin().ok())
                .unwrap_or_else(|| "http://localhost:3000".into());
            Self::new(format!("{origin}{base}"))
        } else {
            Self::new(base)
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base.trim_end_matches('/'), path)
    }
}

async fn http_error(response: reqwest::Response) -> StorefrontError {
    let status = response.status().as_u16();
    let body: ErrorBody = response.json().await.unwrap_or(ErrorBody { error: None });
    StorefrontError::Http {
        status,
        message: body.error.unwrap_or_else(|| "Request failed".into()),
    }
}

#[async_trait(?Send)]
impl AuthProvider for ApiClient {
    async fn get_session(&self) -> Result<Option<Session>> {
        let response = self
            .client
            .get(self.url("/auth/session"))
            .send()
            .await
            .map_err(|e| StorefrontError::Auth(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(http_error(response).await);
        }

        let data: SessionResponse = response
            .json()
            .await
            .map_err(|e| StorefrontError::Auth(e.to_string()))?;
        Ok(data.session)
    }
}

#[async_trait(?Send)]
impl SubscriptionService for ApiClient {
    async fn is_user_subscribed(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.url("/subscription/status"))
            .send()
            .await
            .map_err(|e| StorefrontError::Subscription(e.to_string()))?;

        if !response.status().is_success() {
            return Err(http_error(response).await);
        }

        let data: SubscriptionResponse = response
            .json()
            .await
            .map_err(|e| StorefrontError::Subscription(e.to_string()))?;
        Ok(data.subscribed)
    }
}

#[async_trait(?Send)]
impl PaymentService for ApiClient {
    async fn create_payment(&self, amount_usd: u32) -> Result<PaymentSession> {
        let response = self
            .client
            .post(self.url("/payments"))
            .json(&PaymentRequest { amount: amount_usd })
            .send()
            .await
            .map_err(|e| StorefrontError::Payment(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StorefrontError::Payment(format!(
                "payment service returned {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| StorefrontError::Payment(e.to_string()))
    }
}

#[async_trait(?Send)]
impl ArticleService for ApiClient {
    async fn fetch_article(&self, slug: &str) -> Result<Option<Article>> {
        let response = self
            .client
            .get(self.url(&format!("/blog/{slug}")))
            .send()
            .await
            .map_err(|e| StorefrontError::Article(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(http_error(response).await);
        }

        let article = response
            .json()
            .await
            .map_err(|e| StorefrontError::Article(e.to_string()))?;
        Ok(Some(article))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let api = ApiClient::new("https://shop.example/api/");
        assert_eq!(api.url("/payments"), "https://shop.example/api/payments");
    }

    #[test]
    fn test_session_response_shapes() {
        let signed_out: SessionResponse = serde_json::from_str(r#"{"session":null}"#).unwrap();
        assert!(signed_out.session.is_none());

        let signed_in: SessionResponse =
            serde_json::from_str(r#"{"session":{"user_id":"u1","email":"a@b.c"}}"#).unwrap();
        assert_eq!(signed_in.session.unwrap().user_id, "u1");
    }

    #[test]
    fn test_payment_request_body() {
        let body = serde_json::to_value(PaymentRequest { amount: 14 }).unwrap();
        assert_eq!(body, serde_json::json!({ "amount": 14 }));
    }
}
