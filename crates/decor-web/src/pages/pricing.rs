//! Pricing Page

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;

use decor_core::checkout::{button_label, free_tier_label, purchase_enabled};
use decor_core::{CheckoutController, CheckoutServices, CheckoutState, StorefrontConfig, SubscriptionStatus};

use crate::api::ApiClient;
use crate::browser::{BrowserNavigator, BrowserTimer, ToastNotifier};
use crate::components::{FeatureList, Toasts};

#[component]
pub fn PricingPage() -> impl IntoView {
    let config = use_context::<StorefrontConfig>().unwrap_or_default();
    let toasts = expect_context::<Toasts>();
    let policy = config.checkout.lookup_failure_policy;
    let price = config.checkout.plan.price_usd;

    let api = Rc::new(ApiClient::from_build_env());
    let services = CheckoutServices {
        auth: api.clone(),
        subscriptions: api.clone(),
        payments: api,
        navigator: Rc::new(BrowserNavigator::from_router()),
        notifier: Rc::new(ToastNotifier::new(toasts)),
        timer: Rc::new(BrowserTimer),
    };
    let controller = Rc::new(CheckoutController::new(services, config.checkout));

    let (state, set_state) = signal(CheckoutState::Idle);
    let (status, set_status) = signal(SubscriptionStatus::Unknown);

    // Mirror controller state into signals; the loops end with the controller.
    let mut state_rx = controller.watch_state();
    spawn_local(async move {
        while state_rx.changed().await.is_ok() {
            let next = *state_rx.borrow_and_update();
            set_state.try_set(next);
        }
    });
    let mut status_rx = controller.watch_subscription();
    spawn_local(async move {
        while status_rx.changed().await.is_ok() {
            let next = *status_rx.borrow_and_update();
            set_status.try_set(next);
        }
    });

    {
        let controller = controller.clone();
        spawn_local(async move { controller.on_mount().await });
    }

    let liveness = controller.liveness();
    on_cleanup(move || liveness.end());

    let controller = StoredValue::new_local(controller);
    let subscribe = move |_| {
        let controller = controller.get_value();
        if !controller.can_purchase() {
            return;
        }
        spawn_local(async move {
            let outcome = controller.subscribe().await;
            tracing::debug!(?outcome, "checkout finished");
        });
    };

    let disabled = move || !purchase_enabled(state.get(), status.get(), policy);
    let subscribed = move || status.get() == SubscriptionStatus::Subscribed;

    view! {
        <section id="pricing" class="pricing">
            <h1>"Simple, Transparent Pricing"</h1>
            <p class="subtitle">"Choose the perfect plan for your interior design needs"</p>

            <div class="plans">
                <div class="plan">
                    <h2>"Free Trial"</h2>
                    <p class="plan-blurb">"Try once with no commitment"</p>
                    <div class="price">"$0"<span>"/once"</span></div>
                    <FeatureList features=&[
                        "One free room analysis",
                        "Basic design recommendations",
                        "Limited to one use",
                    ] />
                    <button class="btn" disabled=true>
                        {move || free_tier_label(status.get())}
                    </button>
                </div>

                <div class="plan featured" class:subscribed=subscribed>
                    <span class="badge">"Recommended"</span>
                    <h2>"Starter Package"</h2>
                    <p class="plan-blurb">"Perfect for home owners"</p>
                    <div class="price">{format!("${price}")}<span>"/month"</span></div>
                    <FeatureList features=&[
                        "Unlimited room analyses",
                        "Detailed design recommendations",
                        "Download design reports",
                        "Priority support",
                    ] />
                    <button class="btn btn-primary" on:click=subscribe disabled=disabled>
                        {move || button_label(state.get(), status.get())}
                    </button>
                </div>

                <div class="plan">
                    <h2>"Professional"</h2>
                    <p class="plan-blurb">"For design professionals"</p>
                    <div class="price">"$29"<span>"/month"</span></div>
                    <FeatureList features=&[
                        "Everything in Starter",
                        "Advanced design concepts",
                        "Professional color schemes",
                        "Commercial use license",
                        "White-label reports",
                    ] />
                    <button class="btn" disabled=true>"Coming Soon"</button>
                </div>
            </div>
        </section>
    }
}
