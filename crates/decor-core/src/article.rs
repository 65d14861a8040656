//! Article View
//!
//! Glue between the article fetch, the shared head and the page chrome
//! (share and back buttons).

use std::rc::Rc;
use std::sync::Arc;

use crate::config::ArticleConfig;
use crate::metadata::{MetadataBinding, MetadataSyncController};
use crate::model::{Article, ArticleQuery, Notification};
use crate::service::{ArticleService, NavigateMode, Navigator, Notifier, ShareData, SharePlatform};

#[derive(Clone)]
pub struct ArticleServices {
    pub articles: Rc<dyn ArticleService>,
    pub navigator: Rc<dyn Navigator>,
    pub notifier: Rc<dyn Notifier>,
    pub share: Rc<dyn SharePlatform>,
}

/// Controller for one mounted article page
pub struct ArticleViewController {
    services: ArticleServices,
    config: ArticleConfig,
    binding: Arc<MetadataBinding>,
}

impl ArticleViewController {
    pub fn new(
        services: ArticleServices,
        config: ArticleConfig,
        metadata: Arc<MetadataSyncController>,
    ) -> Self {
        Self {
            services,
            config,
            binding: Arc::new(MetadataBinding::new(metadata)),
        }
    }

    /// Handle for releasing the head from a cleanup hook
    pub fn binding(&self) -> Arc<MetadataBinding> {
        self.binding.clone()
    }

    pub async fn load(&self, slug: &str) -> ArticleQuery {
        let result = self.services.articles.fetch_article(slug).await;
        if let Err(e) = &result {
            tracing::warn!(slug, error = %e, "article fetch failed");
        }
        ArticleQuery::from_result(result)
    }

    /// React to a new query state
    pub fn on_query(&self, query: &ArticleQuery) {
        match query {
            // The previous article's title must not outlive its slug.
            ArticleQuery::Loading => {
                self.binding.release();
            }
            ArticleQuery::Loaded(article) => {
                let meta = article.meta_tags.clone().unwrap_or_default();
                self.binding.bind(&article.url, &meta);
            }
            ArticleQuery::Missing | ArticleQuery::Failed(_) => {
                self.binding.release();
                tracing::info!(route = %self.config.not_found_route, "article unavailable");
                self.services
                    .navigator
                    .navigate(&self.config.not_found_route, NavigateMode::Replace);
            }
        }
    }

    /// Share the current page. Best effort: failures are only logged.
    pub async fn share(&self, article: Option<&Article>) {
        let share = &self.services.share;
        let url = share.current_url();

        if share.can_share() {
            let data = ShareData {
                title: article
                    .and_then(Article::title)
                    .unwrap_or(self.config.share_fallback_title.as_str())
                    .to_string(),
                url,
            };
            if let Err(e) = share.share(&data).await {
                tracing::warn!(error = %e, "error sharing");
            }
            return;
        }

        match share.copy_to_clipboard(&url).await {
            Ok(()) => self.services.notifier.notify(
                Notification::success("Link copied to clipboard")
                    .with_description("You can now share this article with others"),
            ),
            Err(e) => tracing::warn!(error = %e, "error copying link"),
        }
    }

    pub fn back(&self) {
        self.services.navigator.back();
    }

    /// The page is going away
    pub fn release(&self) -> bool {
        self.binding.release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_TITLE, MetadataDefaults};
    use crate::metadata::{AttrKind, MemoryMetadataStore, MetadataStore};
    use crate::mock::{
        MemoryArticleService, NavigationEvent, RecordingNavigator, RecordingNotifier, ScriptedShare,
    };
    use crate::model::{ArticleMetadata, NotificationLevel};

    struct Harness {
        store: Arc<MemoryMetadataStore>,
        navigator: Rc<RecordingNavigator>,
        notifier: Rc<RecordingNotifier>,
        share: Rc<ScriptedShare>,
        controller: ArticleViewController,
    }

    fn article(url: &str, title: Option<&str>) -> Article {
        Article {
            content: "# Warm minimalism".into(),
            url: url.into(),
            meta_tags: title.map(|t| ArticleMetadata::titled(t).with_description("desc")),
        }
    }

    fn harness(articles: MemoryArticleService, share: ScriptedShare) -> Harness {
        let defaults = MetadataDefaults::default();
        let store = Arc::new(MemoryMetadataStore::with_defaults(&defaults));
        let metadata = Arc::new(MetadataSyncController::new(store.clone(), defaults));
        let navigator = Rc::new(RecordingNavigator::new());
        let notifier = Rc::new(RecordingNotifier::new());
        let share = Rc::new(share);
        let services = ArticleServices {
            articles: Rc::new(articles),
            navigator: navigator.clone(),
            notifier: notifier.clone(),
            share: share.clone(),
        };
        Harness {
            store,
            navigator,
            notifier,
            share,
            controller: ArticleViewController::new(services, ArticleConfig::default(), metadata),
        }
    }

    fn not_found() -> NavigationEvent {
        NavigationEvent::Internal {
            path: "/not-found".into(),
            mode: NavigateMode::Replace,
        }
    }

    #[tokio::test]
    async fn test_title_visible_while_mounted() {
        let articles = MemoryArticleService::new().with_article("foo", article("https://blog.example/foo", Some("Foo")));
        let h = harness(articles, ScriptedShare::native("https://app.example/blog/foo"));

        assert!(h.controller.load("foo").await.article().is_some());
        h.controller.on_query(&ArticleQuery::Loading);
        assert_eq!(h.store.title(), DEFAULT_TITLE);

        let query = h.controller.load("foo").await;
        h.controller.on_query(&query);
        assert_eq!(h.store.title(), "Foo");

        assert!(h.controller.release());
        assert_eq!(h.store.title(), DEFAULT_TITLE);
        assert!(h.navigator.events().is_empty());
    }

    #[tokio::test]
    async fn test_missing_article_goes_to_not_found() {
        let h = harness(MemoryArticleService::new(), ScriptedShare::native("u"));

        let query = h.controller.load("nope").await;
        assert_eq!(query, ArticleQuery::Missing);
        h.controller.on_query(&query);

        assert_eq!(h.navigator.events(), vec![not_found()]);
        assert_eq!(h.store.title(), DEFAULT_TITLE);
    }

    #[tokio::test]
    async fn test_failed_fetch_goes_to_not_found() {
        let h = harness(MemoryArticleService::failing(), ScriptedShare::native("u"));

        let query = h.controller.load("foo").await;
        assert!(matches!(query, ArticleQuery::Failed(_)));
        h.controller.on_query(&query);

        assert_eq!(h.navigator.events(), vec![not_found()]);
    }

    #[test]
    fn test_switching_articles_drops_old_title() {
        let h = harness(MemoryArticleService::new(), ScriptedShare::native("u"));

        h.controller.on_query(&ArticleQuery::Loaded(article("https://blog.example/a", Some("A"))));
        assert_eq!(h.store.title(), "A");

        h.controller.on_query(&ArticleQuery::Loaded(article("https://blog.example/b", None)));
        assert_eq!(h.store.title(), DEFAULT_TITLE);
        assert_eq!(h.store.get(AttrKind::Property, "og:title").as_deref(), Some(DEFAULT_TITLE));
    }

    #[test]
    fn test_loading_next_slug_restores_defaults() {
        let h = harness(MemoryArticleService::new(), ScriptedShare::native("u"));

        h.controller.on_query(&ArticleQuery::Loaded(article("https://blog.example/a", Some("A"))));
        assert!(h.controller.binding().is_bound());

        h.controller.on_query(&ArticleQuery::Loading);

        assert!(!h.controller.binding().is_bound());
        assert_eq!(h.store.title(), DEFAULT_TITLE);
        assert_eq!(h.store.get(AttrKind::Property, "og:title").as_deref(), Some(DEFAULT_TITLE));
        assert!(h.navigator.events().is_empty());
    }

    #[tokio::test]
    async fn test_native_share_uses_article_title() {
        let h = harness(MemoryArticleService::new(), ScriptedShare::native("https://app.example/blog/a"));
        let a = article("https://blog.example/a", Some("A"));

        h.controller.share(Some(&a)).await;
        h.controller.share(None).await;

        let shared = h.share.shared();
        assert_eq!(shared[0].title, "A");
        assert_eq!(shared[0].url, "https://app.example/blog/a");
        assert_eq!(shared[1].title, "Blog Post");
        assert!(h.notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn test_share_falls_back_to_clipboard() {
        let h = harness(MemoryArticleService::new(), ScriptedShare::clipboard_only("https://app.example/blog/a"));

        h.controller.share(None).await;

        assert_eq!(h.share.copied(), vec!["https://app.example/blog/a".to_string()]);
        let notes = h.notifier.notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, NotificationLevel::Success);
        assert_eq!(notes[0].title, "Link copied to clipboard");
    }

    #[tokio::test]
    async fn test_share_failures_are_silent() {
        let h = harness(MemoryArticleService::new(), ScriptedShare::native("u").failing());
        h.controller.share(None).await;
        assert!(h.notifier.notifications().is_empty());

        let h = harness(MemoryArticleService::new(), ScriptedShare::clipboard_only("u").failing());
        h.controller.share(None).await;
        assert!(h.notifier.notifications().is_empty());
    }

    #[test]
    fn test_back() {
        let h = harness(MemoryArticleService::new(), ScriptedShare::native("u"));
        h.controller.back();
        assert_eq!(h.navigator.events(), vec![NavigationEvent::Back]);
    }
}
