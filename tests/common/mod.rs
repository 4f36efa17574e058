#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use skillhub_client::api::ApiService;
use skillhub_client::checkout::{GatewayOutcome, PaymentGateway, WidgetOptions};
use skillhub_client::config::{Payment, Prefill};
use skillhub_client::error::ClientError;
use skillhub_client::model::{
    CartEntry, CartLineItem, PaymentConfirmation, PaymentLine, PendingPaymentOrder, VerifiedOrder,
};
use skillhub_client::notify::{Notice, NoticeKind, Notifier};
use skillhub_client::session::Session;
use std::collections::VecDeque;
use std::sync::Mutex;

pub const HEX_A: &str = "a1a1a1a1a1a1a1a1a1a1a1a1";
pub const HEX_B: &str = "b2b2b2b2b2b2b2b2b2b2b2b2";

pub fn course(id: &str, price: i64) -> CartLineItem {
    CartLineItem {
        id: id.into(),
        title: "Practical Rust".into(),
        price: Some(Decimal::from(price)),
        quantity: 1,
        instructor: Some("Maya".into()),
        image: None,
    }
}

pub fn pending_order(gateway_order_id: &str) -> PendingPaymentOrder {
    PendingPaymentOrder {
        gateway_order_id: gateway_order_id.into(),
        amount: 10000,
        currency: "INR".into(),
        local_order_id: "db-1".into(),
    }
}

pub fn confirmation() -> PaymentConfirmation {
    PaymentConfirmation {
        razorpay_order_id: "o1".into(),
        razorpay_payment_id: "pay_1".into(),
        razorpay_signature: "sig_1".into(),
    }
}

pub fn verified_order(id: &str, status: &str, total: i64) -> VerifiedOrder {
    VerifiedOrder {
        id: id.into(),
        status: status.into(),
        created_at: Utc::now(),
        courses: Vec::new(),
        total: Some(Decimal::from(total)),
        username: Some("maya".into()),
    }
}

pub fn session_with_token() -> Session {
    let session = Session::in_memory();
    session.set_token("tok-test");
    session
}

pub fn payment_config() -> Payment {
    Payment {
        key: "rzp_test_BQZeGK1Esi5rzS".into(),
        merchant_name: "SkillHub Learning".into(),
        description: "Payment for courses".into(),
        theme_color: "#3399cc".into(),
        prefill: Prefill {
            name: "User Name".into(),
            email: "user@example.com".into(),
            contact: "9999999999".into(),
        },
    }
}

/// Backend fake: records every call and pops scripted responses per
/// endpoint, with benign defaults where a test didn't script one.
#[derive(Default)]
pub struct RecordingApi {
    pub cart_pulls: Mutex<u32>,
    pub cart_pushes: Mutex<Vec<Vec<CartEntry>>>,
    pub initiate_calls: Mutex<Vec<Vec<PaymentLine>>>,
    pub verify_calls: Mutex<Vec<(PaymentConfirmation, String)>>,
    pub orders_fetches: Mutex<u32>,
    pub all_orders_fetches: Mutex<u32>,

    pub cart_responses: Mutex<VecDeque<Result<Vec<CartLineItem>, ClientError>>>,
    pub push_responses: Mutex<VecDeque<Result<(), ClientError>>>,
    pub initiate_responses: Mutex<VecDeque<Result<PendingPaymentOrder, ClientError>>>,
    pub verify_responses: Mutex<VecDeque<Result<VerifiedOrder, ClientError>>>,
    pub orders_responses: Mutex<VecDeque<Result<Vec<VerifiedOrder>, ClientError>>>,
    pub all_orders_responses: Mutex<VecDeque<Result<Vec<VerifiedOrder>, ClientError>>>,
}

impl RecordingApi {
    pub fn calls_total(&self) -> usize {
        *self.cart_pulls.lock().unwrap() as usize
            + self.cart_pushes.lock().unwrap().len()
            + self.initiate_calls.lock().unwrap().len()
            + self.verify_calls.lock().unwrap().len()
            + *self.orders_fetches.lock().unwrap() as usize
            + *self.all_orders_fetches.lock().unwrap() as usize
    }

    pub fn pushes(&self) -> Vec<Vec<CartEntry>> {
        self.cart_pushes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiService for RecordingApi {
    async fn fetch_cart(&self) -> Result<Vec<CartLineItem>, ClientError> {
        *self.cart_pulls.lock().unwrap() += 1;
        self.cart_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn replace_cart(&self, entries: &[CartEntry]) -> Result<(), ClientError> {
        self.cart_pushes.lock().unwrap().push(entries.to_vec());
        self.push_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn initiate_payment(
        &self,
        lines: &[PaymentLine],
    ) -> Result<PendingPaymentOrder, ClientError> {
        self.initiate_calls.lock().unwrap().push(lines.to_vec());
        self.initiate_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ClientError::ServerRejected {
                    status: 500,
                    message: "unscripted initiate-payment response".into(),
                })
            })
    }

    async fn verify_payment(
        &self,
        confirmation: &PaymentConfirmation,
        local_order_id: &str,
    ) -> Result<VerifiedOrder, ClientError> {
        self.verify_calls
            .lock()
            .unwrap()
            .push((confirmation.clone(), local_order_id.to_string()));
        self.verify_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ClientError::ServerRejected {
                    status: 500,
                    message: "unscripted verify-payment response".into(),
                })
            })
    }

    async fn fetch_orders(&self) -> Result<Vec<VerifiedOrder>, ClientError> {
        *self.orders_fetches.lock().unwrap() += 1;
        self.orders_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_all_orders(&self) -> Result<Vec<VerifiedOrder>, ClientError> {
        *self.all_orders_fetches.lock().unwrap() += 1;
        self.all_orders_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Payment widget fake: hands back one scripted outcome and records the
/// options it was opened with.
pub struct ScriptedGateway {
    outcome: Mutex<Option<GatewayOutcome>>,
    pub seen_options: Mutex<Vec<WidgetOptions>>,
}

impl ScriptedGateway {
    pub fn completing(confirmation: PaymentConfirmation) -> Self {
        Self::with_outcome(GatewayOutcome::Completed(confirmation))
    }

    pub fn failing(description: &str) -> Self {
        Self::with_outcome(GatewayOutcome::Failed {
            description: description.into(),
        })
    }

    fn with_outcome(outcome: GatewayOutcome) -> Self {
        Self {
            outcome: Mutex::new(Some(outcome)),
            seen_options: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn collect_payment(&self, options: WidgetOptions) -> GatewayOutcome {
        self.seen_options.lock().unwrap().push(options);
        self.outcome
            .lock()
            .unwrap()
            .take()
            .unwrap_or(GatewayOutcome::Failed {
                description: "widget already consumed".into(),
            })
    }
}

/// Notifier fake capturing every user-visible notice.
#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn count_of(&self, kind: NoticeKind) -> usize {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.kind == kind)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
