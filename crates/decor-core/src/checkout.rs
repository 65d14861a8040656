//! Subscription-Gated Checkout
//!
//! Drives the paid-plan purchase button:
//!
//! ```text
//!   Idle ──▶ CheckingAuth ──┬─(no session)──▶ RedirectingToAuth ──▶ Idle
//!                           │
//!                           └─(session)────▶ CreatingPayment ──┬─▶ external redirect
//!                                                              └─▶ Error ──▶ Idle
//! ```
//!
//! The button is disabled whenever the state is not `Idle` or the user is
//! already subscribed, which is also what keeps a second `subscribe()` from
//! starting while one is in flight.

use std::cell::Cell;
use std::pin::pin;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::{Either, select};
use tokio::sync::watch;

use crate::config::{CheckoutConfig, LookupFailurePolicy};
use crate::error::{CHECKOUT_FAILED_MESSAGE, Result, StorefrontError};
use crate::model::{CheckoutState, Notification, PaymentSession, SubscriptionStatus};
use crate::service::{
    AuthProvider, NavigateMode, Navigator, Notifier, PaymentService, SubscriptionService, Timer,
};

pub const SIGN_IN_MESSAGE: &str = "Please sign in to continue with your subscription";

/// Collaborators used by [`CheckoutController`]
#[derive(Clone)]
pub struct CheckoutServices {
    pub auth: Rc<dyn AuthProvider>,
    pub subscriptions: Rc<dyn SubscriptionService>,
    pub payments: Rc<dyn PaymentService>,
    pub navigator: Rc<dyn Navigator>,
    pub notifier: Rc<dyn Notifier>,
    pub timer: Rc<dyn Timer>,
}

/// How a `subscribe()` call ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Control was disabled; nothing happened
    Rejected,
    /// No session; sent to the sign-in route
    AuthRequired,
    /// Left the app for the payment provider
    Redirected(String),
    /// Payment session could not be created
    Failed,
    /// The view went away while a call was in flight
    Abandoned,
}

/// Mount flag shared with whoever tears the view down
///
/// Cheap to clone and `Send + Sync`, so it can live in cleanup hooks that
/// cannot hold the controller itself.
#[derive(Clone, Debug)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark the view as gone. Later resolutions become no-ops.
    pub fn end(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Pricing-widget controller for a single paid plan
pub struct CheckoutController {
    services: CheckoutServices,
    config: CheckoutConfig,
    state: watch::Sender<CheckoutState>,
    status: watch::Sender<SubscriptionStatus>,
    mounted: Cell<bool>,
    liveness: Liveness,
}

impl CheckoutController {
    pub fn new(services: CheckoutServices, config: CheckoutConfig) -> Self {
        let (state, _) = watch::channel(CheckoutState::Idle);
        let (status, _) = watch::channel(SubscriptionStatus::Unknown);
        Self {
            services,
            config,
            state,
            status,
            mounted: Cell::new(false),
            liveness: Liveness::new(),
        }
    }

    pub fn state(&self) -> CheckoutState {
        *self.state.borrow()
    }

    pub fn subscription_status(&self) -> SubscriptionStatus {
        *self.status.borrow()
    }

    /// Receive every state change
    pub fn watch_state(&self) -> watch::Receiver<CheckoutState> {
        self.state.subscribe()
    }

    pub fn watch_subscription(&self) -> watch::Receiver<SubscriptionStatus> {
        self.status.subscribe()
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    /// Whether the purchase button is enabled
    pub fn can_purchase(&self) -> bool {
        purchase_enabled(self.state(), self.subscription_status(), self.config.lookup_failure_policy)
    }

    pub fn button_label(&self) -> &'static str {
        button_label(self.state(), self.subscription_status())
    }

    /// Look up the subscription status. Runs once per controller.
    pub async fn on_mount(&self) {
        if self.mounted.replace(true) {
            tracing::debug!("subscription lookup already started");
            return;
        }

        let status = match self.services.subscriptions.is_user_subscribed().await {
            Ok(true) => SubscriptionStatus::Subscribed,
            Ok(false) => SubscriptionStatus::NotSubscribed,
            Err(e) => {
                let fallback = match self.config.lookup_failure_policy {
                    LookupFailurePolicy::FailOpen => SubscriptionStatus::NotSubscribed,
                    LookupFailurePolicy::FailClosed => SubscriptionStatus::Unknown,
                };
                tracing::warn!(error = %e, ?fallback, "subscription lookup failed");
                fallback
            }
        };

        if !self.liveness.is_alive() {
            return;
        }
        self.status.send_replace(status);
        tracing::debug!(?status, "subscription status resolved");
    }

    /// Start a purchase of the configured plan
    pub async fn subscribe(&self) -> CheckoutOutcome {
        if !self.can_purchase() {
            tracing::debug!(
                state = %self.state(),
                status = ?self.subscription_status(),
                "subscribe ignored, control disabled"
            );
            return CheckoutOutcome::Rejected;
        }

        self.transition(CheckoutState::CheckingAuth);
        let outcome = self.run().await;

        // After a redirect the page is going away; nothing to restore.
        if !matches!(outcome, CheckoutOutcome::Redirected(_) | CheckoutOutcome::Abandoned) {
            self.transition(CheckoutState::Idle);
        }
        outcome
    }

    async fn run(&self) -> CheckoutOutcome {
        let session = match self.services.auth.get_session().await {
            Ok(session) => session,
            Err(e) => return self.fail(&e),
        };
        if !self.liveness.is_alive() {
            return CheckoutOutcome::Abandoned;
        }

        let Some(session) = session else {
            self.transition(CheckoutState::RedirectingToAuth);
            self.services.notifier.notify(Notification::info(SIGN_IN_MESSAGE));
            self.services
                .navigator
                .navigate(&self.config.auth_route, NavigateMode::Push);
            return CheckoutOutcome::AuthRequired;
        };

        self.transition(CheckoutState::CreatingPayment);
        let amount = self.config.plan.price_usd;
        tracing::info!(
            user_id = %session.user_id,
            plan = %self.config.plan.name,
            amount_usd = amount,
            "creating payment session"
        );

        let result = self.create_payment(amount).await;
        if !self.liveness.is_alive() {
            tracing::debug!("payment resolved after view closed");
            return CheckoutOutcome::Abandoned;
        }

        match result {
            Ok(payment) => {
                self.services.navigator.redirect_external(&payment.redirect_url);
                CheckoutOutcome::Redirected(payment.redirect_url)
            }
            Err(e) => self.fail(&e),
        }
    }

    async fn create_payment(&self, amount_usd: u32) -> Result<PaymentSession> {
        let timeout = self.config.payment_timeout();
        let payment = pin!(self.services.payments.create_payment(amount_usd));
        let expiry = pin!(self.services.timer.sleep(timeout));

        match select(payment, expiry).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(StorefrontError::Timeout(timeout)),
        }
    }

    fn fail(&self, error: &StorefrontError) -> CheckoutOutcome {
        if !self.liveness.is_alive() {
            return CheckoutOutcome::Abandoned;
        }
        tracing::error!(error = %error, retryable = error.is_retryable(), "checkout failed");
        self.transition(CheckoutState::Error);
        // One message for every checkout failure; the cause only goes to the log.
        self.services.notifier.notify(Notification::error(CHECKOUT_FAILED_MESSAGE));
        CheckoutOutcome::Failed
    }

    fn transition(&self, next: CheckoutState) {
        if !self.liveness.is_alive() {
            return;
        }
        let previous = self.state.send_replace(next);
        tracing::debug!(from = %previous, to = %next, "checkout state");
    }
}

/// Enablement rule for the purchase button
pub fn purchase_enabled(
    state: CheckoutState,
    status: SubscriptionStatus,
    policy: LookupFailurePolicy,
) -> bool {
    if !state.is_idle() {
        return false;
    }
    match status {
        SubscriptionStatus::Subscribed => false,
        SubscriptionStatus::NotSubscribed => true,
        SubscriptionStatus::Unknown => policy == LookupFailurePolicy::FailOpen,
    }
}

/// Label of the paid-plan button
pub fn button_label(state: CheckoutState, status: SubscriptionStatus) -> &'static str {
    if !state.is_idle() {
        "Processing..."
    } else if status == SubscriptionStatus::Subscribed {
        "Current Plan"
    } else {
        "Subscribe Now"
    }
}

/// Label of the (always disabled) free-tier button
pub fn free_tier_label(status: SubscriptionStatus) -> &'static str {
    if status == SubscriptionStatus::Subscribed {
        "Included in Subscription"
    } else {
        "Current Plan"
    }
}
