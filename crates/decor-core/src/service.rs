//! Collaborator Contracts
//!
//! The controllers only ever talk to the outside world through these traits.
//! Implement them once for the browser and once for tests.
//!
//! Futures are `?Send`: everything runs on the single-threaded UI event loop
//! and browser handles are not thread-safe.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Article, Notification, PaymentSession, Session};

/// Session / authentication provider
#[async_trait(?Send)]
pub trait AuthProvider {
    /// `Ok(None)` means the user is not signed in
    async fn get_session(&self) -> Result<Option<Session>>;
}

/// Subscription-status lookup for the current user
#[async_trait(?Send)]
pub trait SubscriptionService {
    async fn is_user_subscribed(&self) -> Result<bool>;
}

/// Payment-session creation (Strategy pattern)
#[async_trait(?Send)]
pub trait PaymentService {
    /// Create a hosted checkout for a whole-dollar amount
    async fn create_payment(&self, amount_usd: u32) -> Result<PaymentSession>;
}

/// Article-content fetch
#[async_trait(?Send)]
pub trait ArticleService {
    /// `Ok(None)` when no article exists for `slug`
    async fn fetch_article(&self, slug: &str) -> Result<Option<Article>>;
}

/// How an in-app navigation affects history
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigateMode {
    Push,
    Replace,
}

/// Routing and page-level navigation
pub trait Navigator {
    /// In-app route change
    fn navigate(&self, path: &str, mode: NavigateMode);

    /// Full-page navigation away from the app. One-way.
    fn redirect_external(&self, url: &str);

    /// History back
    fn back(&self);
}

/// Toast-style user notifications
pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Data handed to the platform share sheet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareData {
    pub title: String,
    pub url: String,
}

/// Native share and clipboard access
#[async_trait(?Send)]
pub trait SharePlatform {
    /// Whether a native share sheet exists
    fn can_share(&self) -> bool;

    /// URL of the page currently shown
    fn current_url(&self) -> String;

    async fn share(&self, data: &ShareData) -> Result<()>;

    async fn copy_to_clipboard(&self, text: &str) -> Result<()>;
}

/// Source of delays for timeouts
#[async_trait(?Send)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
}
