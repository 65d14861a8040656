//! Blog Post Page

use std::rc::Rc;
use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params_map;

use decor_core::{ArticleQuery, ArticleServices, ArticleViewController, MetadataSyncController, StorefrontConfig};

use crate::api::ApiClient;
use crate::browser::{BrowserNavigator, BrowserShare, ToastNotifier};
use crate::components::Toasts;

#[component]
pub fn BlogPostPage() -> impl IntoView {
    let params = use_params_map();
    let slug = move || params.with(|p| p.get("slug").unwrap_or_default());

    let config = use_context::<StorefrontConfig>().unwrap_or_default();
    let metadata = expect_context::<Arc<MetadataSyncController>>();
    let services = ArticleServices {
        articles: Rc::new(ApiClient::from_build_env()),
        navigator: Rc::new(BrowserNavigator::from_router()),
        notifier: Rc::new(ToastNotifier::new(expect_context::<Toasts>())),
        share: Rc::new(BrowserShare),
    };
    let controller = ArticleViewController::new(services, config.article, metadata);

    let binding = controller.binding();
    on_cleanup(move || {
        binding.release();
    });

    let controller = StoredValue::new_local(Rc::new(controller));
    let (query, set_query) = signal(ArticleQuery::Loading);

    Effect::new(move |_| {
        let requested = slug();
        set_query.set(ArticleQuery::Loading);
        let controller = controller.get_value();
        spawn_local(async move {
            let result = controller.load(&requested).await;
            // a newer slug may have been requested meanwhile
            if params.with_untracked(|p| p.get("slug")).as_deref() == Some(requested.as_str()) {
                set_query.try_set(result);
            }
        });
    });

    Effect::new(move |_| {
        query.with(|q| controller.with_value(|c| c.on_query(q)));
    });

    let back = move |_| controller.with_value(|c| c.back());
    let share = move |_| {
        let article = query.with_untracked(|q| q.article().cloned());
        let controller = controller.get_value();
        spawn_local(async move { controller.share(article.as_ref()).await });
    };

    view! {
        <div class="blog-post">
            <div class="toolbar">
                <button class="btn btn-small" on:click=back>"← Back"</button>
                <Show when=move || query.with(|q| q.article().is_some())>
                    <button class="btn btn-small" on:click=share>"Share"</button>
                </Show>
            </div>

            {move || match query.get() {
                ArticleQuery::Loading => view! {
                    <div class="skeleton">
                        <div class="skeleton-title"></div>
                        <div class="skeleton-line"></div>
                        <div class="skeleton-line"></div>
                        <div class="skeleton-block"></div>
                    </div>
                }
                .into_any(),
                ArticleQuery::Loaded(article) => {
                    let title = article.title().map(str::to_owned);
                    let url = article.url.clone();
                    let href = url.clone();
                    view! {
                        <article class="card">
                            {title.map(|t| view! { <h1>{t}</h1> })}
                            <div class="prose">{article.content}</div>
                        </article>
                        <p class="source">
                            "Originally published at: "
                            <a href=href target="_blank" rel="noopener noreferrer">{url}</a>
                        </p>
                    }
                    .into_any()
                }
                // on its way to the not-found page
                ArticleQuery::Missing | ArticleQuery::Failed(_) => ().into_any(),
            }}
        </div>
    }
}
