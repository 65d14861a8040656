//! Main App Component

use std::sync::Arc;

use leptos::prelude::*;
use leptos_router::{components::*, path};

use decor_core::{MetadataSyncController, StorefrontConfig};

use crate::browser::DocumentHead;
use crate::components::{Toaster, Toasts};
use crate::pages::{BlogPostPage, HomePage, NotFoundPage, PricingPage};

/// Configuration baked in at build time via `DECOR_CONFIG` (JSON overrides)
fn load_config() -> StorefrontConfig {
    match option_env!("DECOR_CONFIG") {
        Some(json) => StorefrontConfig::from_json(json).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring invalid DECOR_CONFIG");
            StorefrontConfig::default()
        }),
        None => StorefrontConfig::default(),
    }
}

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    let config = load_config();
    let metadata = Arc::new(MetadataSyncController::new(
        Arc::new(DocumentHead),
        config.metadata.clone(),
    ));

    provide_context(config);
    provide_context(metadata);
    provide_context(Toasts::new());

    view! {
        <Router>
            <main class="app">
                <Routes fallback=|| view! { <NotFoundPage /> }>
                    <Route path=path!("/") view=HomePage />
                    <Route path=path!("/pricing") view=PricingPage />
                    <Route path=path!("/blog/:slug") view=BlogPostPage />
                    <Route path=path!("/not-found") view=NotFoundPage />
                </Routes>
            </main>
            <Toaster />
        </Router>
    }
}
