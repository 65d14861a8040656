//! Not Found Page

use leptos::prelude::*;

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <div class="not-found">
            <h1>"404"</h1>
            <p>"We couldn't find that page."</p>
            <a href="/" class="btn">"Back to home"</a>
        </div>
    }
}
