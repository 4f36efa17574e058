use crate::api::ApiService;
use crate::error::ClientError;
use crate::model::VerifiedOrder;
use crate::notify::Notices;
use crate::session::Session;
use std::sync::Arc;
use tracing::{info, warn};

/// Display style for an order status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusStyle {
    Success,
    Warning,
    Muted,
}

impl StatusStyle {
    /// Pure display mapping, case-insensitive. Never drives business logic.
    pub fn classify(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "completed" => StatusStyle::Success,
            "pending" => StatusStyle::Warning,
            _ => StatusStyle::Muted,
        }
    }
}

/// Result of loading the tracking view.
#[derive(Debug)]
pub enum OrdersOutcome {
    Loaded { orders: Vec<VerifiedOrder> },
    /// No orders anywhere. An empty state, not an error.
    Empty,
    Failed { reason: ClientError },
    /// Session cleared; the host navigates to the authentication screen.
    AuthExpired,
}

/// Merge a just-completed order with the authoritative list: prepend it only
/// when the server doesn't know it yet (eventual-consistency gap). An order
/// id never appears twice.
pub fn merge_orders(
    pending: Option<VerifiedOrder>,
    fetched: Vec<VerifiedOrder>,
) -> Vec<VerifiedOrder> {
    match pending {
        Some(order) if !fetched.iter().any(|o| o.id == order.id) => {
            let mut merged = Vec::with_capacity(fetched.len() + 1);
            merged.push(order);
            merged.extend(fetched);
            merged
        }
        _ => fetched,
    }
}

/// View-model for the order tracking screen and the admin order list.
pub struct OrderTracker {
    api: Arc<dyn ApiService>,
    session: Session,
    notices: Notices,
}

impl OrderTracker {
    pub fn new(api: Arc<dyn ApiService>, session: Session, notices: Notices) -> Self {
        Self {
            api,
            session,
            notices,
        }
    }

    /// Load the user's order history, reconciling it with a just-completed
    /// order handed over from checkout.
    pub async fn load_orders(&self, pending: Option<VerifiedOrder>) -> OrdersOutcome {
        match self.api.fetch_orders().await {
            Ok(fetched) => {
                info!(count = fetched.len(), "fetched order history");
                let prepended = pending
                    .as_ref()
                    .is_some_and(|p| !fetched.iter().any(|o| o.id == p.id));
                let merged = merge_orders(pending, fetched);
                if prepended {
                    self.notices.success("New order added to tracking");
                }
                if merged.is_empty() {
                    OrdersOutcome::Empty
                } else {
                    OrdersOutcome::Loaded { orders: merged }
                }
            }
            Err(err) => self.failure(err),
        }
    }

    /// Admin view over every order. Same guard, no pending merge.
    pub async fn load_all_orders(&self) -> OrdersOutcome {
        match self.api.fetch_all_orders().await {
            Ok(orders) => {
                info!(count = orders.len(), "fetched all orders");
                if orders.is_empty() {
                    OrdersOutcome::Empty
                } else {
                    OrdersOutcome::Loaded { orders }
                }
            }
            Err(err) => self.failure(err),
        }
    }

    fn failure(&self, err: ClientError) -> OrdersOutcome {
        if err.is_auth_loss() {
            warn!(%err, "auth loss while loading orders");
            self.notices.error("Session expired. Please log in again.");
            self.session.end();
            return OrdersOutcome::AuthExpired;
        }
        warn!(%err, "failed to load orders");
        self.notices.error(err.to_string());
        OrdersOutcome::Failed { reason: err }
    }
}
