//! Domain Model
//!
//! Values exchanged with the collaborators and rendered by the views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated-user credential. Presence means the user is signed in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            expires_at: None,
        }
    }
}

/// Whether the current user already holds the offered plan
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubscriptionStatus {
    #[default]
    Unknown,
    Subscribed,
    NotSubscribed,
}

/// Progress of a single checkout attempt
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckoutState {
    #[default]
    Idle,
    CheckingAuth,
    RedirectingToAuth,
    CreatingPayment,
    Error,
}

impl CheckoutState {
    pub fn is_idle(self) -> bool {
        self == CheckoutState::Idle
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::CheckingAuth => "checking-auth",
            CheckoutState::RedirectingToAuth => "redirecting-to-auth",
            CheckoutState::CreatingPayment => "creating-payment",
            CheckoutState::Error => "error",
        }
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-hosted checkout resource. The URL is opaque and never parsed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    #[serde(rename = "payment_url")]
    pub redirect_url: String,
}

/// Page metadata published with an article
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleMetadata {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

impl ArticleMetadata {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A published article as returned by the article service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Markdown body
    pub content: String,

    /// Canonical URL of the original publication
    pub url: String,

    #[serde(default)]
    pub meta_tags: Option<ArticleMetadata>,
}

impl Article {
    pub fn title(&self) -> Option<&str> {
        self.meta_tags.as_ref().and_then(|m| m.title.as_deref())
    }
}

/// Resolution state of an article fetch, as seen by the view
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArticleQuery {
    Loading,
    Loaded(Article),
    Missing,
    Failed(String),
}

impl ArticleQuery {
    pub fn from_result(result: crate::Result<Option<Article>>) -> Self {
        match result {
            Ok(Some(article)) => ArticleQuery::Loaded(article),
            Ok(None) => ArticleQuery::Missing,
            Err(e) => ArticleQuery::Failed(e.to_string()),
        }
    }

    pub fn article(&self) -> Option<&Article> {
        match self {
            ArticleQuery::Loaded(article) => Some(article),
            _ => None,
        }
    }
}

/// Notification severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A non-blocking, user-visible message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            title: title.into(),
            description: None,
            created_at: Utc::now(),
        }
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, title)
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, title)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the toast has been visible longer than `ttl`
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.created_at >= ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_deserialize() {
        let json = r#"{
            "content": "Rooms need light.",
            "url": "https://blog.example/light",
            "meta_tags": { "title": "Light", "description": "On light" }
        }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.title(), Some("Light"));

        let bare: Article = serde_json::from_str(r#"{"content":"","url":"u"}"#).unwrap();
        assert!(bare.meta_tags.is_none());
        assert_eq!(bare.title(), None);
    }

    #[test]
    fn test_payment_session_wire_name() {
        let session: PaymentSession =
            serde_json::from_str(r#"{"payment_url":"https://pay.example/x"}"#).unwrap();
        assert_eq!(session.redirect_url, "https://pay.example/x");
    }

    #[test]
    fn test_query_from_result() {
        assert_eq!(ArticleQuery::from_result(Ok(None)), ArticleQuery::Missing);
        let failed = ArticleQuery::from_result(Err(crate::StorefrontError::Article("boom".into())));
        assert!(matches!(failed, ArticleQuery::Failed(_)));
    }

    #[test]
    fn test_notification_expiry() {
        let n = Notification::info("hi");
        let ttl = chrono::Duration::seconds(4);
        assert!(!n.is_expired(n.created_at, ttl));
        assert!(n.is_expired(n.created_at + ttl, ttl));
    }
}
