use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::str::FromStr;

static COURSE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[0-9a-fA-F]{24}$").expect("valid course id pattern"));

/// Canonical course identifiers are 24 hex characters (backend object ids).
/// Anything else must never reach the cart endpoint.
pub fn is_canonical_course_id(id: &str) -> bool {
    COURSE_ID_RE.is_match(id)
}

/// One course entry in the cart. Identity is `id`; the store guarantees at
/// most one line per id. `price` tolerates malformed catalog data (the
/// checkout validation is the fail-closed gate, not deserialization).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLineItem {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<Decimal>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Wire form of a cart line for the batch-replace endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartEntry {
    #[serde(rename = "courseId")]
    pub course_id: String,
    pub quantity: u32,
}

/// Wire form of a cart line for payment initiation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentLine {
    pub id: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// Gateway-side transaction record created before the user pays.
/// Consumed exactly once by the payment widget handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPaymentOrder {
    pub gateway_order_id: String,
    /// Amount in the currency's minor units, as the gateway expects.
    pub amount: i64,
    pub currency: String,
    pub local_order_id: String,
}

/// Signed success payload handed back by the payment widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// One course line inside a finalized order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    #[serde(rename = "courseId", default)]
    pub course_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<Decimal>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// Order finalized by the backend after payment verification. Read-only on
/// the client. `status` stays a string: the backend's casing varies and
/// classification is display-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerifiedOrder {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub courses: Vec<OrderLine>,
    #[serde(default, deserialize_with = "lenient_price")]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub username: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

/// Parse a price out of whatever the backend stored: JSON numbers and
/// numeric strings succeed, everything else is `None`.
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn lenient_price<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(decimal_from_value))
}
