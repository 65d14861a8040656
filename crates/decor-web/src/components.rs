//! UI Components

use leptos::prelude::*;

use decor_core::{Notification, NotificationLevel};

/// Notifications currently on screen, provided at the app root
#[derive(Clone, Copy)]
pub struct Toasts(pub RwSignal<Vec<Notification>>);

impl Toasts {
    pub fn new() -> Self {
        Self(RwSignal::new(Vec::new()))
    }
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new()
    }
}

/// Stack of toasts in the corner of the page
#[component]
pub fn Toaster() -> impl IntoView {
    let toasts = expect_context::<Toasts>();

    view! {
        <div class="toaster">
            <For
                each=move || toasts.0.get()
                key=|n| n.id
                children=move |n| view! { <Toast notification=n /> }
            />
        </div>
    }
}

#[component]
fn Toast(notification: Notification) -> impl IntoView {
    let class = match notification.level {
        NotificationLevel::Info => "toast toast-info",
        NotificationLevel::Success => "toast toast-success",
        NotificationLevel::Error => "toast toast-error",
    };

    view! {
        <div class=class role="status">
            <p class="toast-title">{notification.title}</p>
            {notification.description.map(|d| view! { <p class="toast-description">{d}</p> })}
        </div>
    }
}

/// Bullet list of plan features
#[component]
pub fn FeatureList(features: &'static [&'static str]) -> impl IntoView {
    view! {
        <ul class="features">
            {features.iter().map(|f| view! { <li>"✓ " {*f}</li> }).collect_view()}
        </ul>
    }
}
