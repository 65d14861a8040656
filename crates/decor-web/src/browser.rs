//! Browser Adapters
//!
//! `web-sys` implementations of the head, navigation, share, notification
//! and timer collaborators.

use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use js_sys::{Function, Object, Promise, Reflect};
use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element};

use decor_core::{
    AttrKind, MetadataStore, NavigateMode, Navigator, Notification, Notifier, Result, ShareData,
    SharePlatform, StorefrontError, Timer,
};

use crate::components::Toasts;

const TOAST_SECONDS: u32 = 4;

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

fn find_meta(document: &Document, attr: AttrKind, key: &str) -> Option<Element> {
    let selector = format!(r#"meta[{}="{}"]"#, attr.as_str(), key);
    document.query_selector(&selector).ok().flatten()
}

/// The live `<head>` of the page
///
/// Holds no handles; every call looks the document up again, which keeps it
/// `Send + Sync` for sharing through context.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentHead;

impl MetadataStore for DocumentHead {
    fn title(&self) -> String {
        document().map(|d| d.title()).unwrap_or_default()
    }

    fn set_title(&self, title: &str) {
        if let Some(document) = document() {
            document.set_title(title);
        }
    }

    fn get(&self, attr: AttrKind, key: &str) -> Option<String> {
        let document = document()?;
        let meta = find_meta(&document, attr, key)?;
        Some(meta.get_attribute("content").unwrap_or_default())
    }

    fn upsert(&self, attr: AttrKind, key: &str, content: &str) {
        let Some(document) = document() else { return };

        if let Some(meta) = find_meta(&document, attr, key) {
            if let Err(e) = meta.set_attribute("content", content) {
                tracing::warn!(key, error = ?e, "failed to update meta tag");
            }
            return;
        }

        let appended = document.create_element("meta").and_then(|meta| {
            meta.set_attribute(attr.as_str(), key)?;
            meta.set_attribute("content", content)?;
            match document.head() {
                Some(head) => head.append_child(&meta).map(|_| ()),
                None => Err(JsValue::from_str("document has no head")),
            }
        });
        if let Err(e) = appended {
            tracing::warn!(key, error = ?e, "failed to create meta tag");
        }
    }
}

/// Router-backed navigation
pub struct BrowserNavigator {
    navigate: Rc<dyn Fn(&str, NavigateOptions)>,
}

impl BrowserNavigator {
    /// Must be called inside the `<Router>`
    pub fn from_router() -> Self {
        let navigate = use_navigate();
        Self {
            navigate: Rc::new(move |path: &str, options: NavigateOptions| navigate(path, options)),
        }
    }
}

impl Navigator for BrowserNavigator {
    fn navigate(&self, path: &str, mode: NavigateMode) {
        let options = NavigateOptions {
            replace: mode == NavigateMode::Replace,
            ..NavigateOptions::default()
        };
        (self.navigate)(path, options);
    }

    fn redirect_external(&self, url: &str) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.location().set_href(url) {
                tracing::error!(error = ?e, "external redirect failed");
            }
        }
    }

    fn back(&self) {
        let Some(window) = web_sys::window() else { return };
        if let Err(e) = window.history().and_then(|h| h.back()) {
            tracing::warn!(error = ?e, "history back failed");
        }
    }
}

/// Pushes notifications into the toaster
pub struct ToastNotifier {
    toasts: Toasts,
}

impl ToastNotifier {
    pub fn new(toasts: Toasts) -> Self {
        Self { toasts }
    }
}

impl Notifier for ToastNotifier {
    fn notify(&self, notification: Notification) {
        let ttl = chrono::Duration::seconds(i64::from(TOAST_SECONDS));
        let id = notification.id;
        let toasts = self.toasts.0;

        toasts.update(|list| {
            let now = Utc::now();
            list.retain(|t| !t.is_expired(now, ttl));
            list.push(notification);
        });

        set_timeout(
            move || {
                toasts.try_update(|list| list.retain(|t| t.id != id));
            },
            Duration::from_secs(u64::from(TOAST_SECONDS)),
        );
    }
}

fn js_error(e: &JsValue) -> StorefrontError {
    StorefrontError::Share(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

/// Web Share API with clipboard fallback
///
/// Both APIs are looked up dynamically since support varies by browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserShare;

impl BrowserShare {
    fn navigator() -> Option<web_sys::Navigator> {
        web_sys::window().map(|w| w.navigator())
    }

    async fn call_promise(target: &JsValue, method: &str, arg: &JsValue) -> Result<()> {
        let function: Function = Reflect::get(target, &JsValue::from_str(method))
            .map_err(|e| js_error(&e))?
            .dyn_into()
            .map_err(|e| js_error(&e))?;
        let promise: Promise = function
            .call1(target, arg)
            .map_err(|e| js_error(&e))?
            .dyn_into()
            .map_err(|e| js_error(&e))?;
        JsFuture::from(promise).await.map_err(|e| js_error(&e))?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl SharePlatform for BrowserShare {
    fn can_share(&self) -> bool {
        Self::navigator().is_some_and(|n| {
            Reflect::get(&n, &JsValue::from_str("share")).is_ok_and(|f| f.is_function())
        })
    }

    fn current_url(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().href().ok())
            .unwrap_or_default()
    }

    async fn share(&self, data: &ShareData) -> Result<()> {
        let navigator = Self::navigator().ok_or_else(|| StorefrontError::Share("no navigator".into()))?;

        let payload = Object::new();
        Reflect::set(&payload, &"title".into(), &data.title.as_str().into()).map_err(|e| js_error(&e))?;
        Reflect::set(&payload, &"url".into(), &data.url.as_str().into()).map_err(|e| js_error(&e))?;

        Self::call_promise(&navigator, "share", &payload).await
    }

    async fn copy_to_clipboard(&self, text: &str) -> Result<()> {
        let navigator = Self::navigator().ok_or_else(|| StorefrontError::Share("no navigator".into()))?;
        let clipboard = Reflect::get(&navigator, &"clipboard".into()).map_err(|e| js_error(&e))?;
        if clipboard.is_undefined() {
            return Err(StorefrontError::Share("clipboard unavailable".into()));
        }

        Self::call_promise(&clipboard, "writeText", &text.into()).await
    }
}

/// `setTimeout`-backed timer
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTimer;

#[async_trait(?Send)]
impl Timer for BrowserTimer {
    async fn sleep(&self, duration: Duration) {
        let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        let promise = Promise::new(&mut |resolve, _reject| {
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis);
            }
        });
        let _ = JsFuture::from(promise).await;
    }
}
