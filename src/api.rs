use crate::config::Config;
use crate::error::ClientError;
use crate::model::{
    CartEntry, CartLineItem, PaymentConfirmation, PaymentLine, PendingPaymentOrder, VerifiedOrder,
};
use crate::session::{AuthProfile, Session};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tracing::debug;

const LOGIN_PATH: &str = "auth/userlog";
const CART_PATH: &str = "user/update-cart";
const INITIATE_PAYMENT_PATH: &str = "payment/initiate-payment";
const VERIFY_PAYMENT_PATH: &str = "payment/verify-payment";
const ORDER_STATUS_PATH: &str = "payment/order-status";
const ALL_ORDERS_PATH: &str = "payment/all-orders";

/// Backend operations the core flows depend on. The concrete client talks
/// REST; tests substitute recording fakes.
#[async_trait]
pub trait ApiService: Send + Sync {
    async fn fetch_cart(&self) -> Result<Vec<CartLineItem>, ClientError>;

    async fn replace_cart(&self, entries: &[CartEntry]) -> Result<(), ClientError>;

    async fn initiate_payment(
        &self,
        lines: &[PaymentLine],
    ) -> Result<PendingPaymentOrder, ClientError>;

    async fn verify_payment(
        &self,
        confirmation: &PaymentConfirmation,
        local_order_id: &str,
    ) -> Result<VerifiedOrder, ClientError>;

    async fn fetch_orders(&self) -> Result<Vec<VerifiedOrder>, ClientError>;

    async fn fetch_all_orders(&self) -> Result<Vec<VerifiedOrder>, ClientError>;
}

/// Uniform REST client: bearer auth from the session store, JSON bodies, a
/// fixed request timeout, failures normalized into `ClientError`.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Session,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn from_config(cfg: &Config, session: Session) -> Self {
        let base_url = Url::parse(&cfg.api.base_url).expect("validated base URL");
        Self::with_base_url(
            session,
            base_url,
            Duration::from_secs(cfg.app.request_timeout_seconds),
        )
    }

    pub fn with_base_url(session: Session, mut base_url: Url, timeout: Duration) -> Self {
        // join() drops the last path segment unless the base ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder()
            .user_agent("skillhub-client/0.1")
            .timeout(timeout)
            .no_proxy()
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url,
            session,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|_| ClientError::Network(format!("invalid endpoint: {path}")))
    }

    pub fn build_authed_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Request, ClientError> {
        let token = self.session.require_token()?;
        let mut builder = self
            .http
            .request(method, self.endpoint(path)?)
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder
            .build()
            .map_err(|err| ClientError::Network(err.to_string()))
    }

    async fn execute_authed(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, ClientError> {
        let request = self.build_authed_request(method, path, body)?;
        debug!(url = %request.url(), "sending api request");
        let res = self
            .http
            .execute(request)
            .await
            .map_err(normalize_transport)?;
        let status = res.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            return Err(reject(res).await);
        }
        Ok(res)
    }

    /// Authenticate against the backend and return the profile to persist in
    /// the session store. The only unauthenticated call in this client.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<AuthProfile, ClientError> {
        let body = json!({ "email": email, "password": password, "role": role });
        let res = self
            .http
            .post(self.endpoint(LOGIN_PATH)?)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(normalize_transport)?;
        let status = res.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            return Err(reject(res).await);
        }
        let payload: LoginResponse = decode(res).await?;
        Ok(AuthProfile {
            token: payload.token,
            username: payload.user.username,
            role: payload.user.role,
            github: payload.user.github,
            linkedin: payload.user.linkedin,
            avatar: payload.user.profile,
        })
    }
}

#[async_trait]
impl ApiService for ApiClient {
    async fn fetch_cart(&self) -> Result<Vec<CartLineItem>, ClientError> {
        let res = self.execute_authed(Method::GET, CART_PATH, None).await?;
        let payload: CartResponse = decode(res).await?;
        Ok(payload
            .cart
            .courses
            .into_iter()
            .map(|line| CartLineItem {
                quantity: line.quantity.max(1),
                ..line.course
            })
            .collect())
    }

    async fn replace_cart(&self, entries: &[CartEntry]) -> Result<(), ClientError> {
        let body = cart_update_body(entries);
        self.execute_authed(Method::PUT, CART_PATH, Some(&body))
            .await?;
        Ok(())
    }

    async fn initiate_payment(
        &self,
        lines: &[PaymentLine],
    ) -> Result<PendingPaymentOrder, ClientError> {
        let body = initiate_payment_body(lines);
        let res = self
            .execute_authed(Method::POST, INITIATE_PAYMENT_PATH, Some(&body))
            .await?;
        let payload: InitiatePaymentResponse = decode(res).await?;
        match payload.order_id {
            Some(order_id) if !order_id.is_empty() => Ok(PendingPaymentOrder {
                gateway_order_id: order_id,
                amount: payload.amount,
                currency: payload.currency,
                local_order_id: payload.db_order_id,
            }),
            _ => Err(ClientError::ServerRejected {
                status: 200,
                message: "Failed to initiate payment".into(),
            }),
        }
    }

    async fn verify_payment(
        &self,
        confirmation: &PaymentConfirmation,
        local_order_id: &str,
    ) -> Result<VerifiedOrder, ClientError> {
        let body = verify_payment_body(confirmation, local_order_id);
        let res = self
            .execute_authed(Method::POST, VERIFY_PAYMENT_PATH, Some(&body))
            .await?;
        let payload: VerifyPaymentResponse = decode(res).await?;
        match payload.order {
            Some(order) => Ok(order),
            None => Err(ClientError::VerificationFailed(
                payload
                    .message
                    .unwrap_or_else(|| "Payment verification failed".into()),
            )),
        }
    }

    async fn fetch_orders(&self) -> Result<Vec<VerifiedOrder>, ClientError> {
        let res = self
            .execute_authed(Method::GET, ORDER_STATUS_PATH, None)
            .await?;
        decode(res).await
    }

    async fn fetch_all_orders(&self) -> Result<Vec<VerifiedOrder>, ClientError> {
        let res = self
            .execute_authed(Method::GET, ALL_ORDERS_PATH, None)
            .await?;
        decode(res).await
    }
}

pub fn cart_update_body(entries: &[CartEntry]) -> Value {
    json!({ "cart": entries })
}

pub fn initiate_payment_body(lines: &[PaymentLine]) -> Value {
    json!(lines)
}

pub fn verify_payment_body(confirmation: &PaymentConfirmation, local_order_id: &str) -> Value {
    json!({
        "razorpayOrderId": confirmation.razorpay_order_id,
        "razorpayPaymentId": confirmation.razorpay_payment_id,
        "razorpaySignature": confirmation.razorpay_signature,
        "dbOrderId": local_order_id,
    })
}

fn normalize_transport(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Network("request timed out".into())
    } else {
        ClientError::Network(err.to_string())
    }
}

async fn reject(res: reqwest::Response) -> ClientError {
    let status = res.status().as_u16();
    let body = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                "An unexpected error occurred".into()
            } else {
                body
            }
        });
    ClientError::ServerRejected { status, message }
}

async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ClientError> {
    res.json::<T>()
        .await
        .map_err(|err| ClientError::Network(format!("invalid response: {err}")))
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct CartResponse {
    cart: CartDoc,
}

#[derive(Deserialize)]
struct CartDoc {
    #[serde(default)]
    courses: Vec<ServerCartLine>,
}

/// The backend populates each cart line's course document.
#[derive(Deserialize)]
struct ServerCartLine {
    #[serde(rename = "courseId")]
    course: CartLineItem,
    #[serde(default)]
    quantity: u32,
}

#[derive(Deserialize)]
struct InitiatePaymentResponse {
    #[serde(rename = "orderId", default)]
    order_id: Option<String>,
    #[serde(default)]
    amount: i64,
    #[serde(default)]
    currency: String,
    #[serde(rename = "dbOrderId", default)]
    db_order_id: String,
}

#[derive(Deserialize)]
struct VerifyPaymentResponse {
    order: Option<VerifiedOrder>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    user: LoginUser,
}

#[derive(Deserialize)]
struct LoginUser {
    username: String,
    #[serde(default)]
    role: String,
    github: Option<String>,
    linkedin: Option<String>,
    profile: Option<String>,
}
