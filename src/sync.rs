use crate::api::ApiService;
use crate::cart::CartStore;
use crate::error::ClientError;
use crate::model::{is_canonical_course_id, CartEntry, CartLineItem};
use crate::notify::Notices;
use crate::session::Session;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reconciles the local cart with the server: wholesale pull on mount,
/// validated batch push on every mutation. Pushes are fire-and-forget with
/// respect to local state; a failed push never rolls back the optimistic
/// mutation.
pub struct CartSyncEngine {
    api: Arc<dyn ApiService>,
    cart: CartStore,
    session: Session,
    notices: Notices,
}

/// Why a line item must be excluded from a push, if it must be.
pub fn sync_exclusion(item: &CartLineItem) -> Option<String> {
    if !is_canonical_course_id(&item.id) {
        let shown = if item.id.is_empty() {
            "unknown"
        } else {
            item.id.as_str()
        };
        return Some(format!("Invalid course ID: {shown}"));
    }
    if item.price.map_or(true, |price| price <= Decimal::ZERO) {
        return Some(format!("Invalid price for course: {}", item.title));
    }
    if item.quantity == 0 {
        return Some(format!("Invalid quantity for course: {}", item.title));
    }
    None
}

impl CartSyncEngine {
    pub fn new(api: Arc<dyn ApiService>, cart: CartStore, session: Session, notices: Notices) -> Self {
        Self {
            api,
            cart,
            session,
            notices,
        }
    }

    /// Initial mount: seed local state from the server cart. The server's
    /// answer is authoritative; local optimistic state is replaced
    /// wholesale. Failure is reported and leaves local state untouched.
    pub async fn seed(&self) {
        if !self.session.is_authenticated() {
            return;
        }
        if let Err(err) = self.pull_cart().await {
            warn!(?err, "failed to fetch initial cart");
            self.notices.error("Failed to load cart");
        }
    }

    pub async fn pull_cart(&self) -> Result<(), ClientError> {
        let items = self.api.fetch_cart().await?;
        info!(count = items.len(), "seeded cart from server");
        self.cart.replace_all(items);
        Ok(())
    }

    /// Push the current cart as a batch replace. No-op without a session
    /// token, with an empty cart, or when no line survives validation —
    /// invalid lines are excluded with one warning each, never sent.
    pub async fn push_cart(&self) -> Result<(), ClientError> {
        if !self.session.is_authenticated() {
            debug!("no session token; skipping cart sync");
            return Ok(());
        }
        let items = self.cart.items();
        if items.is_empty() {
            return Ok(());
        }
        let entries = self.sanitize(&items);
        if entries.is_empty() {
            debug!("no valid cart items to sync");
            return Ok(());
        }
        debug!(count = entries.len(), "pushing cart to server");
        self.api.replace_cart(&entries).await
    }

    fn sanitize(&self, items: &[CartLineItem]) -> Vec<CartEntry> {
        items
            .iter()
            .filter_map(|item| match sync_exclusion(item) {
                Some(reason) => {
                    warn!(id = %item.id, %reason, "cart item excluded from sync");
                    self.notices.warning(reason);
                    None
                }
                None => Some(CartEntry {
                    course_id: item.id.clone(),
                    quantity: item.quantity,
                }),
            })
            .collect()
    }

    /// Worker loop: wake on every cart revision and push. Failures are
    /// reported and the loop keeps going; the next mutation (or the next
    /// mount's pull) reconciles. Exits when the cart store is dropped.
    pub async fn run(self) {
        let mut revisions = self.cart.subscribe();
        // Reconcile whatever state existed before the worker subscribed
        revisions.mark_changed();
        while revisions.changed().await.is_ok() {
            if let Err(err) = self.push_cart().await {
                warn!(?err, "cart sync failed");
                self.notices
                    .error(format!("Failed to sync cart with server: {err}"));
            }
        }
    }
}
