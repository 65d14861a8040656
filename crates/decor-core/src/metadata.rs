//! Document Metadata Synchronization
//!
//! Publishes an article's title, description and social-preview tags to the
//! document head while the article is the active view, and puts the product
//! defaults back when it stops being active.
//!
//! ```text
//!   begin_view ──▶ sync(view, meta) ──▶ sync(view, meta) ... ──▶ teardown(view)
//!                        │                                            │
//!                        ▼                                            ▼
//!                 head shows article                     head shows defaults
//! ```
//!
//! The head is process-wide. At most one view is live at a time; syncing a
//! newer view retires the live one first, and a retired view can neither
//! sync nor tear down again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::config::MetadataDefaults;
use crate::model::ArticleMetadata;

/// Attribute a meta tag is keyed by
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttrKind {
    /// `<meta name="...">`
    Name,
    /// `<meta property="...">`, used by Open Graph
    Property,
}

impl AttrKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AttrKind::Name => "name",
            AttrKind::Property => "property",
        }
    }
}

/// The tags this controller manages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetaKey {
    Description,
    OgTitle,
    TwitterTitle,
    OgDescription,
    TwitterDescription,
}

impl MetaKey {
    /// In the order tags are first appended to the head
    pub const ALL: [MetaKey; 5] = [
        MetaKey::Description,
        MetaKey::OgTitle,
        MetaKey::TwitterTitle,
        MetaKey::OgDescription,
        MetaKey::TwitterDescription,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MetaKey::Description => "description",
            MetaKey::OgTitle => "og:title",
            MetaKey::TwitterTitle => "twitter:title",
            MetaKey::OgDescription => "og:description",
            MetaKey::TwitterDescription => "twitter:description",
        }
    }

    /// Crawlers read `og:*` from `property`, everything else from `name`.
    pub fn attr(self) -> AttrKind {
        if self.as_str().starts_with("og:") {
            AttrKind::Property
        } else {
            AttrKind::Name
        }
    }

    fn is_title(self) -> bool {
        matches!(self, MetaKey::OgTitle | MetaKey::TwitterTitle)
    }

    fn value_from(self, meta: &ArticleMetadata) -> Option<&str> {
        if self.is_title() {
            meta.title.as_deref()
        } else {
            meta.description.as_deref()
        }
    }

    fn default_from(self, defaults: &MetadataDefaults) -> &str {
        if self.is_title() {
            &defaults.title
        } else {
            &defaults.description
        }
    }
}

/// Access to the document head
///
/// Implementations must find tags by the exact `(attr, key)` pair, and
/// `upsert` must never create a second tag for a pair that already exists.
pub trait MetadataStore: Send + Sync {
    fn title(&self) -> String;

    fn set_title(&self, title: &str);

    /// Content of the tag keyed `attr="key"`, if present
    fn get(&self, attr: AttrKind, key: &str) -> Option<String>;

    /// Update the tag keyed `attr="key"` or append a new one
    fn upsert(&self, attr: AttrKind, key: &str, content: &str);

    /// Restore the title and the content of every managed tag that exists.
    /// Tags are never removed; other views rely on them being present.
    fn reset_to_defaults(&self, defaults: &MetadataDefaults) {
        self.set_title(&defaults.title);
        for key in MetaKey::ALL {
            if self.get(key.attr(), key.as_str()).is_some() {
                self.upsert(key.attr(), key.as_str(), key.default_from(defaults));
            }
        }
    }
}

/// A meta tag as held by [`MemoryMetadataStore`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetaTag {
    pub attr: AttrKind,
    pub key: String,
    pub content: String,
}

#[derive(Default)]
struct MemoryHead {
    title: String,
    tags: Vec<MetaTag>,
}

/// In-memory head (for tests and non-browser hosts)
#[derive(Default)]
pub struct MemoryMetadataStore {
    head: RwLock<MemoryHead>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A head as served by the static page: default title plus a
    /// `description` tag
    pub fn with_defaults(defaults: &MetadataDefaults) -> Self {
        let store = Self::new();
        store.set_title(&defaults.title);
        store.upsert(AttrKind::Name, MetaKey::Description.as_str(), &defaults.description);
        store
    }

    /// Snapshot of all tags in document order
    pub fn tags(&self) -> Vec<MetaTag> {
        self.head.read().unwrap_or_else(PoisonError::into_inner).tags.clone()
    }

    /// Number of tags keyed `attr="key"`
    pub fn count(&self, attr: AttrKind, key: &str) -> usize {
        let head = self.head.read().unwrap_or_else(PoisonError::into_inner);
        head.tags.iter().filter(|t| t.attr == attr && t.key == key).count()
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn title(&self) -> String {
        self.head.read().unwrap_or_else(PoisonError::into_inner).title.clone()
    }

    fn set_title(&self, title: &str) {
        self.head.write().unwrap_or_else(PoisonError::into_inner).title = title.to_string();
    }

    fn get(&self, attr: AttrKind, key: &str) -> Option<String> {
        let head = self.head.read().unwrap_or_else(PoisonError::into_inner);
        head.tags
            .iter()
            .find(|t| t.attr == attr && t.key == key)
            .map(|t| t.content.clone())
    }

    fn upsert(&self, attr: AttrKind, key: &str, content: &str) {
        let mut head = self.head.write().unwrap_or_else(PoisonError::into_inner);
        match head.tags.iter_mut().find(|t| t.attr == attr && t.key == key) {
            Some(tag) => tag.content = content.to_string(),
            None => head.tags.push(MetaTag {
                attr,
                key: key.to_string(),
                content: content.to_string(),
            }),
        }
    }
}

/// Identity of one article view's claim on the head
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(u64);

#[derive(Default)]
struct Lease {
    live: Option<ViewId>,
    /// Every view id at or below this has been retired
    retired_through: u64,
}

/// Owns the head on behalf of whichever article view is active
pub struct MetadataSyncController {
    store: Arc<dyn MetadataStore>,
    defaults: MetadataDefaults,
    next_view: AtomicU64,
    lease: Mutex<Lease>,
}

impl MetadataSyncController {
    pub fn new(store: Arc<dyn MetadataStore>, defaults: MetadataDefaults) -> Self {
        Self {
            store,
            defaults,
            next_view: AtomicU64::new(0),
            lease: Mutex::new(Lease::default()),
        }
    }

    /// Allocate an id for a newly mounted view. Ids only grow.
    pub fn begin_view(&self) -> ViewId {
        ViewId(self.next_view.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// The view currently owning the head
    pub fn live_view(&self) -> Option<ViewId> {
        self.lease().live
    }

    /// Publish `meta` for `view`. Returns `false` when the view is stale.
    pub fn sync(&self, view: ViewId, meta: &ArticleMetadata) -> bool {
        let mut lease = self.lease();

        if view.0 <= lease.retired_through {
            tracing::debug!(view = view.0, "ignoring sync for retired view");
            return false;
        }

        match lease.live {
            Some(live) if live > view => {
                tracing::debug!(view = view.0, live = live.0, "ignoring sync for superseded view");
                return false;
            }
            Some(live) if live != view => {
                self.store.reset_to_defaults(&self.defaults);
                lease.retired_through = live.0;
                tracing::debug!(retired = live.0, view = view.0, "retired previous view before sync");
            }
            _ => {}
        }

        if let Some(title) = &meta.title {
            self.store.set_title(title);
        }
        for key in MetaKey::ALL {
            if let Some(value) = key.value_from(meta) {
                self.store.upsert(key.attr(), key.as_str(), value);
            }
        }

        lease.live = Some(view);
        tracing::debug!(view = view.0, title = ?meta.title, "synced article metadata");
        true
    }

    /// Restore defaults if `view` owns the head. Acts at most once per view.
    pub fn teardown(&self, view: ViewId) -> bool {
        let mut lease = self.lease();
        lease.retired_through = lease.retired_through.max(view.0);

        if lease.live != Some(view) {
            return false;
        }

        self.store.reset_to_defaults(&self.defaults);
        lease.live = None;
        tracing::debug!(view = view.0, "restored default metadata");
        true
    }

    fn lease(&self) -> MutexGuard<'_, Lease> {
        self.lease.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One mounted article page's handle on the head
///
/// Re-binding with a different article key retires the previous view, so a
/// page that swaps articles in place never shows a mix of both.
pub struct MetadataBinding {
    sync: Arc<MetadataSyncController>,
    bound: Mutex<Option<(String, ViewId)>>,
}

impl MetadataBinding {
    pub fn new(sync: Arc<MetadataSyncController>) -> Self {
        Self {
            sync,
            bound: Mutex::new(None),
        }
    }

    /// Publish `meta` for the article identified by `key`
    pub fn bind(&self, key: &str, meta: &ArticleMetadata) -> bool {
        let mut bound = self.bound.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some((current, view)) = bound.as_ref() {
            if current == key {
                return self.sync.sync(*view, meta);
            }
            self.sync.teardown(*view);
        }

        let view = self.sync.begin_view();
        *bound = Some((key.to_string(), view));
        self.sync.sync(view, meta)
    }

    /// Give the head back. Safe to call any number of times.
    pub fn release(&self) -> bool {
        let taken = self.bound.lock().unwrap_or_else(PoisonError::into_inner).take();
        taken.is_some_and(|(_, view)| self.sync.teardown(view))
    }

    pub fn is_bound(&self) -> bool {
        self.bound.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_DESCRIPTION, DEFAULT_TITLE};

    fn setup() -> (Arc<MemoryMetadataStore>, Arc<MetadataSyncController>) {
        let defaults = MetadataDefaults::default();
        let store = Arc::new(MemoryMetadataStore::with_defaults(&defaults));
        let sync = Arc::new(MetadataSyncController::new(store.clone(), defaults));
        (store, sync)
    }

    fn article() -> ArticleMetadata {
        ArticleMetadata::titled("Foo").with_description("All about foo")
    }

    #[test]
    fn test_sync_publishes_all_tags() {
        let (store, sync) = setup();
        let view = sync.begin_view();
        assert!(sync.sync(view, &article()));

        assert_eq!(store.title(), "Foo");
        assert_eq!(store.get(AttrKind::Name, "description").as_deref(), Some("All about foo"));
        assert_eq!(store.get(AttrKind::Property, "og:title").as_deref(), Some("Foo"));
        assert_eq!(store.get(AttrKind::Name, "twitter:title").as_deref(), Some("Foo"));
        assert_eq!(store.get(AttrKind::Property, "og:description").as_deref(), Some("All about foo"));
        assert_eq!(store.get(AttrKind::Name, "twitter:description").as_deref(), Some("All about foo"));
    }

    #[test]
    fn test_og_uses_property_others_use_name() {
        let (store, sync) = setup();
        let view = sync.begin_view();
        sync.sync(view, &ArticleMetadata::titled("T"));

        assert_eq!(store.get(AttrKind::Property, "og:title").as_deref(), Some("T"));
        assert_eq!(store.get(AttrKind::Name, "twitter:title").as_deref(), Some("T"));
        assert_eq!(store.get(AttrKind::Name, "og:title"), None);
        assert_eq!(store.get(AttrKind::Property, "twitter:title"), None);
    }

    #[test]
    fn test_sync_is_idempotent() {
        let (store, sync) = setup();
        let view = sync.begin_view();
        sync.sync(view, &article());
        let first = store.tags();
        let title = store.title();

        sync.sync(view, &article());
        assert_eq!(store.tags(), first);
        assert_eq!(store.title(), title);
        for key in MetaKey::ALL {
            assert_eq!(store.count(key.attr(), key.as_str()), 1);
        }
    }

    #[test]
    fn test_missing_title_leaves_title_alone() {
        let (store, sync) = setup();
        let view = sync.begin_view();
        sync.sync(view, &ArticleMetadata::default().with_description("only a description"));

        assert_eq!(store.title(), DEFAULT_TITLE);
        assert_eq!(store.get(AttrKind::Property, "og:title"), None);
        assert_eq!(store.get(AttrKind::Name, "description").as_deref(), Some("only a description"));
    }

    #[test]
    fn test_sync_then_teardown_restores_pristine_head() {
        let (store, sync) = setup();
        let pristine_title = store.title();
        let pristine_description = store.get(AttrKind::Name, "description");

        let view = sync.begin_view();
        sync.sync(view, &article());
        assert_eq!(store.title(), "Foo");

        assert!(sync.teardown(view));
        assert_eq!(store.title(), pristine_title);
        assert_eq!(store.get(AttrKind::Name, "description"), pristine_description);
    }

    #[test]
    fn test_teardown_reverts_social_tags_without_removing() {
        let (store, sync) = setup();
        let view = sync.begin_view();
        sync.sync(view, &article());
        let tag_count = store.tags().len();

        sync.teardown(view);
        assert_eq!(store.tags().len(), tag_count);
        assert_eq!(store.get(AttrKind::Property, "og:title").as_deref(), Some(DEFAULT_TITLE));
        assert_eq!(store.get(AttrKind::Name, "twitter:description").as_deref(), Some(DEFAULT_DESCRIPTION));
    }

    #[test]
    fn test_teardown_runs_once() {
        let (store, sync) = setup();
        let view = sync.begin_view();
        sync.sync(view, &article());

        assert!(sync.teardown(view));
        store.set_title("changed by someone else");
        assert!(!sync.teardown(view));
        assert_eq!(store.title(), "changed by someone else");
    }

    #[test]
    fn test_new_view_retires_old_before_sync() {
        let (store, sync) = setup();
        let first = sync.begin_view();
        let second = sync.begin_view();

        sync.sync(first, &article());
        sync.sync(second, &ArticleMetadata::default().with_description("second"));

        // first view's title must not leak into the second view
        assert_eq!(store.title(), DEFAULT_TITLE);
        assert_eq!(store.get(AttrKind::Property, "og:title").as_deref(), Some(DEFAULT_TITLE));
        assert_eq!(sync.live_view(), Some(second));

        // late teardown of the first view must not clobber the second
        assert!(!sync.teardown(first));
        assert_eq!(store.get(AttrKind::Name, "description").as_deref(), Some("second"));
    }

    #[test]
    fn test_stale_sync_is_ignored() {
        let (store, sync) = setup();
        let first = sync.begin_view();
        let second = sync.begin_view();

        sync.sync(second, &ArticleMetadata::titled("Second"));
        assert!(!sync.sync(first, &ArticleMetadata::titled("First")));
        assert_eq!(store.title(), "Second");

        sync.teardown(second);
        assert!(!sync.sync(second, &ArticleMetadata::titled("Second")));
        assert_eq!(store.title(), DEFAULT_TITLE);
    }

    #[test]
    fn test_binding_switches_articles() {
        let (store, sync) = setup();
        let binding = MetadataBinding::new(sync.clone());

        binding.bind("a", &ArticleMetadata::titled("A"));
        binding.bind("a", &ArticleMetadata::titled("A"));
        assert_eq!(store.title(), "A");

        binding.bind("b", &ArticleMetadata::default().with_description("b only"));
        assert_eq!(store.title(), DEFAULT_TITLE);

        assert!(binding.release());
        assert!(!binding.release());
        assert!(!binding.is_bound());
        assert_eq!(store.get(AttrKind::Name, "description").as_deref(), Some(DEFAULT_DESCRIPTION));
        assert_eq!(sync.live_view(), None);
    }
}
