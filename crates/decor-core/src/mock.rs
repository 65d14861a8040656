//! Mock Collaborators
//!
//! Scripted, recording implementations of every collaborator trait. Used by
//! the unit tests and handy when running the controllers outside a browser.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::task::Poll;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Result, StorefrontError};
use crate::model::{Article, Notification, PaymentSession, Session};
use crate::service::{
    ArticleService, AuthProvider, NavigateMode, Navigator, Notifier, PaymentService, ShareData,
    SharePlatform, SubscriptionService, Timer,
};

/// Yield to the executor once, so other futures on the same task get polled
pub async fn yield_once() {
    let mut yielded = false;
    futures::future::poll_fn(|cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await;
}

/// Auth provider with a fixed answer
pub struct ScriptedAuth {
    session: Option<Session>,
    fail: bool,
    calls: Cell<usize>,
}

impl ScriptedAuth {
    pub fn signed_in(user_id: &str) -> Self {
        Self {
            session: Some(Session::new(user_id)),
            fail: false,
            calls: Cell::new(0),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            session: None,
            fail: false,
            calls: Cell::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            session: None,
            fail: true,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

#[async_trait(?Send)]
impl AuthProvider for ScriptedAuth {
    async fn get_session(&self) -> Result<Option<Session>> {
        self.calls.set(self.calls.get() + 1);
        yield_once().await;
        if self.fail {
            return Err(StorefrontError::Auth("session endpoint unreachable".into()));
        }
        Ok(self.session.clone())
    }
}

/// Subscription lookup with a fixed answer
pub struct ScriptedSubscriptions {
    answer: Result<bool>,
    calls: Cell<usize>,
}

impl ScriptedSubscriptions {
    pub fn subscribed(subscribed: bool) -> Self {
        Self {
            answer: Ok(subscribed),
            calls: Cell::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: Err(StorefrontError::Subscription("lookup failed".into())),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

#[async_trait(?Send)]
impl SubscriptionService for ScriptedSubscriptions {
    async fn is_user_subscribed(&self) -> Result<bool> {
        self.calls.set(self.calls.get() + 1);
        yield_once().await;
        match &self.answer {
            Ok(subscribed) => Ok(*subscribed),
            Err(e) => Err(StorefrontError::Subscription(e.to_string())),
        }
    }
}

/// What [`ScriptedPayments`] does when called
#[derive(Clone, Debug)]
pub enum PaymentScript {
    Succeed(String),
    Fail(String),
    /// Never resolves
    Hang,
}

/// Payment service that records every requested amount
pub struct ScriptedPayments {
    script: PaymentScript,
    requests: RefCell<Vec<u32>>,
}

impl ScriptedPayments {
    pub fn new(script: PaymentScript) -> Self {
        Self {
            script,
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn succeeding(url: &str) -> Self {
        Self::new(PaymentScript::Succeed(url.to_string()))
    }

    pub fn failing(reason: &str) -> Self {
        Self::new(PaymentScript::Fail(reason.to_string()))
    }

    pub fn requests(&self) -> Vec<u32> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PaymentService for ScriptedPayments {
    async fn create_payment(&self, amount_usd: u32) -> Result<PaymentSession> {
        self.requests.borrow_mut().push(amount_usd);
        yield_once().await;
        match &self.script {
            PaymentScript::Succeed(url) => Ok(PaymentSession {
                redirect_url: url.clone(),
            }),
            PaymentScript::Fail(reason) => Err(StorefrontError::Payment(reason.clone())),
            PaymentScript::Hang => futures::future::pending().await,
        }
    }
}

/// In-memory article catalogue
#[derive(Default)]
pub struct MemoryArticleService {
    articles: HashMap<String, Article>,
    fail: bool,
}

impl MemoryArticleService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_article(mut self, slug: &str, article: Article) -> Self {
        self.articles.insert(slug.to_string(), article);
        self
    }

    pub fn failing() -> Self {
        Self {
            articles: HashMap::new(),
            fail: true,
        }
    }
}

#[async_trait(?Send)]
impl ArticleService for MemoryArticleService {
    async fn fetch_article(&self, slug: &str) -> Result<Option<Article>> {
        if self.fail {
            return Err(StorefrontError::Article(format!("backend down fetching {slug}")));
        }
        Ok(self.articles.get(slug).cloned())
    }
}

/// A navigation performed through [`RecordingNavigator`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationEvent {
    Internal { path: String, mode: NavigateMode },
    External(String),
    Back,
}

#[derive(Default)]
pub struct RecordingNavigator {
    events: RefCell<Vec<NavigationEvent>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NavigationEvent> {
        self.events.borrow().clone()
    }

    pub fn external(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                NavigationEvent::External(url) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str, mode: NavigateMode) {
        self.events.borrow_mut().push(NavigationEvent::Internal {
            path: path.to_string(),
            mode,
        });
    }

    fn redirect_external(&self, url: &str) {
        self.events.borrow_mut().push(NavigationEvent::External(url.to_string()));
    }

    fn back(&self) {
        self.events.borrow_mut().push(NavigationEvent::Back);
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: RefCell<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.borrow_mut().push(notification);
    }
}

/// Share platform with switchable capabilities
pub struct ScriptedShare {
    url: String,
    native: bool,
    fail: bool,
    shared: RefCell<Vec<ShareData>>,
    copied: RefCell<Vec<String>>,
}

impl ScriptedShare {
    pub fn native(url: &str) -> Self {
        Self {
            url: url.to_string(),
            native: true,
            fail: false,
            shared: RefCell::new(Vec::new()),
            copied: RefCell::new(Vec::new()),
        }
    }

    pub fn clipboard_only(url: &str) -> Self {
        Self {
            native: false,
            ..Self::native(url)
        }
    }

    /// Every share or copy attempt fails
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn shared(&self) -> Vec<ShareData> {
        self.shared.borrow().clone()
    }

    pub fn copied(&self) -> Vec<String> {
        self.copied.borrow().clone()
    }
}

#[async_trait(?Send)]
impl SharePlatform for ScriptedShare {
    fn can_share(&self) -> bool {
        self.native
    }

    fn current_url(&self) -> String {
        self.url.clone()
    }

    async fn share(&self, data: &ShareData) -> Result<()> {
        if self.fail {
            return Err(StorefrontError::Share("AbortError: share canceled".into()));
        }
        self.shared.borrow_mut().push(data.clone());
        Ok(())
    }

    async fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        if self.fail {
            return Err(StorefrontError::Share("NotAllowedError: clipboard denied".into()));
        }
        self.copied.borrow_mut().push(text.to_string());
        Ok(())
    }
}

/// Timer backed by the tokio clock
#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioTimer;

#[cfg(not(target_arch = "wasm32"))]
#[async_trait(?Send)]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Timer that never fires
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverTimer;

#[async_trait(?Send)]
impl Timer for NeverTimer {
    async fn sleep(&self, _duration: Duration) {
        futures::future::pending::<()>().await;
    }
}
