use crate::api::ApiService;
use crate::cart::CartStore;
use crate::config::Payment;
use crate::error::ClientError;
use crate::model::{
    CartLineItem, PaymentConfirmation, PaymentLine, PendingPaymentOrder, VerifiedOrder,
};
use crate::notify::Notices;
use crate::session::Session;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    Validating,
    AwaitingGatewayOrder,
    AwaitingUserPayment,
    Verifying,
    Succeeded,
    Failed,
}

impl CheckoutState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Idle => "idle",
            CheckoutState::Validating => "validating",
            CheckoutState::AwaitingGatewayOrder => "awaiting_gateway_order",
            CheckoutState::AwaitingUserPayment => "awaiting_user_payment",
            CheckoutState::Verifying => "verifying",
            CheckoutState::Succeeded => "succeeded",
            CheckoutState::Failed => "failed",
        }
    }
}

/// Configuration handed to the external payment widget for one handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetOptions {
    pub key: String,
    pub amount: i64,
    pub currency: String,
    pub order_id: String,
    pub name: String,
    pub description: String,
    pub prefill_name: String,
    pub prefill_email: String,
    pub prefill_contact: String,
    pub theme_color: String,
}

/// How the widget handshake resolved. The widget is an opaque external
/// actor; it reports exactly one of these per attempt (user cancellation
/// surfaces as `Failed`).
#[derive(Debug, Clone)]
pub enum GatewayOutcome {
    Completed(PaymentConfirmation),
    Failed { description: String },
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn collect_payment(&self, options: WidgetOptions) -> GatewayOutcome;
}

/// Terminal result of one checkout attempt.
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// Cart cleared; the host navigates to order tracking carrying `order`
    /// as navigation state.
    Succeeded { order: VerifiedOrder },
    /// Cart preserved for retry.
    Failed { reason: ClientError },
    /// Session cleared; the host navigates to the authentication screen.
    AuthExpired,
}

/// One checkout attempt:
/// `Idle → Validating → AwaitingGatewayOrder → AwaitingUserPayment →
/// Verifying → Succeeded | Failed`. Steps are strictly sequential; no two
/// payment calls are ever in flight for the same attempt.
pub struct CheckoutFlow {
    api: Arc<dyn ApiService>,
    gateway: Arc<dyn PaymentGateway>,
    cart: CartStore,
    session: Session,
    notices: Notices,
    payment: Payment,
    state: CheckoutState,
}

/// Normalize the cart into payment lines, failing closed on an empty cart
/// or any line with an unusable price or quantity.
pub fn validate_items(items: &[CartLineItem]) -> Result<Vec<PaymentLine>, String> {
    if items.is_empty() {
        return Err("Cart is empty".into());
    }
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        match item.price.filter(|price| *price > Decimal::ZERO) {
            Some(price) if item.quantity > 0 => lines.push(PaymentLine {
                id: item.id.clone(),
                price,
                quantity: item.quantity,
            }),
            _ => return Err("Cart contains items with invalid price or quantity".into()),
        }
    }
    Ok(lines)
}

/// Widget configuration for a pending gateway order.
pub fn widget_options(payment: &Payment, pending: &PendingPaymentOrder) -> WidgetOptions {
    WidgetOptions {
        key: payment.key.clone(),
        amount: pending.amount,
        currency: pending.currency.clone(),
        order_id: pending.gateway_order_id.clone(),
        name: payment.merchant_name.clone(),
        description: payment.description.clone(),
        prefill_name: payment.prefill.name.clone(),
        prefill_email: payment.prefill.email.clone(),
        prefill_contact: payment.prefill.contact.clone(),
        theme_color: payment.theme_color.clone(),
    }
}

impl CheckoutFlow {
    pub fn new(
        api: Arc<dyn ApiService>,
        gateway: Arc<dyn PaymentGateway>,
        cart: CartStore,
        session: Session,
        notices: Notices,
        payment: Payment,
    ) -> Self {
        Self {
            api,
            gateway,
            cart,
            session,
            notices,
            payment,
            state: CheckoutState::Idle,
        }
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    fn enter(&mut self, state: CheckoutState) {
        debug!(from = self.state.as_str(), to = state.as_str(), "checkout transition");
        self.state = state;
    }

    fn fail(&mut self, reason: ClientError) -> CheckoutOutcome {
        self.enter(CheckoutState::Failed);
        CheckoutOutcome::Failed { reason }
    }

    fn auth_expired(&mut self, err: &ClientError) -> CheckoutOutcome {
        warn!(%err, "auth loss during checkout");
        self.notices.error(err.to_string());
        self.session.end();
        CheckoutOutcome::AuthExpired
    }

    /// Drive the attempt to a terminal state. Consuming `self` is what makes
    /// terminal states unrepeatable; a fresh attempt constructs a new flow.
    pub async fn run(mut self) -> CheckoutOutcome {
        self.enter(CheckoutState::Validating);
        let lines = match validate_items(&self.cart.items()) {
            Ok(lines) => lines,
            Err(message) => {
                self.notices.warning(message.clone());
                return self.fail(ClientError::Validation(message));
            }
        };

        self.enter(CheckoutState::AwaitingGatewayOrder);
        let pending = match self.api.initiate_payment(&lines).await {
            Ok(pending) => pending,
            Err(err) if err.is_auth_loss() => return self.auth_expired(&err),
            Err(err) => {
                warn!(%err, "payment initiation failed");
                self.notices.error(err.to_string());
                return self.fail(err);
            }
        };

        self.enter(CheckoutState::AwaitingUserPayment);
        let options = widget_options(&self.payment, &pending);
        let confirmation = match self.gateway.collect_payment(options).await {
            GatewayOutcome::Completed(confirmation) => confirmation,
            GatewayOutcome::Failed { description } => {
                warn!(%description, "gateway reported failure");
                self.notices
                    .error(format!("Payment failed: {description}"));
                return self.fail(ClientError::PaymentFailed(description));
            }
        };

        self.enter(CheckoutState::Verifying);
        match self
            .api
            .verify_payment(&confirmation, &pending.local_order_id)
            .await
        {
            Ok(order) => {
                self.notices.success("Payment successful!");
                self.cart.clear();
                self.enter(CheckoutState::Succeeded);
                CheckoutOutcome::Succeeded { order }
            }
            Err(err) if err.is_auth_loss() => self.auth_expired(&err),
            Err(err) => {
                // Money may have moved; keep this distinct from a gateway
                // failure and leave the cart alone.
                let reason = match err {
                    ClientError::VerificationFailed(_) => err,
                    ClientError::ServerRejected { message, .. } => {
                        ClientError::VerificationFailed(message)
                    }
                    other => ClientError::VerificationFailed(other.to_string()),
                };
                warn!(%reason, "payment verification failed");
                self.notices.error(reason.to_string());
                self.fail(reason)
            }
        }
    }
}
