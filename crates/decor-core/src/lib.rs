//! # decor-core
//!
//! Control logic behind the storefront's pricing widget and article pages,
//! independent of any UI framework.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐      ┌──────────────────────────────┐
//! │      CheckoutController      │      │    MetadataSyncController    │
//! │  auth ─▶ subscription ─▶ pay │      │  sync(view) / teardown(view) │
//! └──────────────┬───────────────┘      └──────────────┬───────────────┘
//!                │ collaborator traits                 │ MetadataStore
//!                ▼                                     ▼
//!     Auth / Subscription / Payment            document head (browser)
//!     Navigator / Notifier / Timer             or MemoryMetadataStore
//! ```
//!
//! Both controllers are leaves and never talk to each other. Everything
//! outside them is injected, so the same code runs in the browser and in
//! tests.

pub mod article;
pub mod checkout;
pub mod config;
pub mod error;
pub mod metadata;
pub mod mock;
pub mod model;
pub mod service;

pub use article::{ArticleServices, ArticleViewController};
pub use checkout::{CheckoutController, CheckoutOutcome, CheckoutServices, Liveness};
pub use config::{ArticleConfig, CheckoutConfig, LookupFailurePolicy, MetadataDefaults, StorefrontConfig};
pub use error::{CHECKOUT_FAILED_MESSAGE, Result, StorefrontError};
pub use metadata::{AttrKind, MemoryMetadataStore, MetaKey, MetadataBinding, MetadataStore, MetadataSyncController, ViewId};
pub use model::{
    Article, ArticleMetadata, ArticleQuery, CheckoutState, Notification, NotificationLevel,
    PaymentSession, Session, SubscriptionStatus,
};
pub use service::{
    ArticleService, AuthProvider, NavigateMode, Navigator, Notifier, PaymentService, ShareData,
    SharePlatform, SubscriptionService, Timer,
};
