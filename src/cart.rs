use crate::error::ClientError;
use crate::model::CartLineItem;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::warn;

struct CartInner {
    items: Mutex<Vec<CartLineItem>>,
    revision: watch::Sender<u64>,
}

/// The single shared mutable collection of cart line items. Handles are
/// cheap clones over the same collection; every mutation is synchronous
/// (optimistic, immediately visible) and bumps a revision observed by the
/// sync engine. External replacement is reserved for the engine's initial
/// pull (`replace_all`) and `clear`.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartInner>,
}

impl CartStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0u64);
        Self {
            inner: Arc::new(CartInner {
                items: Mutex::new(Vec::new()),
                revision,
            }),
        }
    }

    /// Change feed for the sync engine. Rapid mutations coalesce; only the
    /// latest revision is observable.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    pub fn items(&self) -> Vec<CartLineItem> {
        self.inner.items.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a course to the cart. A line with the same id has its quantity
    /// incremented by one; otherwise the course is appended as a fresh line
    /// with quantity 1. Items without an identifier are rejected.
    pub fn add_item(&self, course: CartLineItem) -> Result<(), ClientError> {
        if course.id.trim().is_empty() {
            return Err(ClientError::Validation(
                "course is missing an identifier".into(),
            ));
        }
        if course.title.is_empty() {
            warn!(id = %course.id, "incomplete course data added to cart");
        }
        {
            let mut items = self.inner.items.lock().unwrap();
            match items.iter_mut().find(|item| item.id == course.id) {
                Some(existing) => existing.quantity = existing.quantity.saturating_add(1),
                None => items.push(CartLineItem {
                    quantity: 1,
                    ..course
                }),
            }
        }
        self.bump();
        Ok(())
    }

    /// Adjust a line's quantity by `delta`, clamped to a minimum of 1.
    /// Reaching zero never removes a line; removal is only `remove_item`.
    pub fn set_quantity(&self, id: &str, delta: i64) {
        let mut changed = false;
        {
            let mut items = self.inner.items.lock().unwrap();
            if let Some(item) = items.iter_mut().find(|item| item.id == id) {
                let next = (i64::from(item.quantity) + delta).clamp(1, i64::from(u32::MAX));
                item.quantity = next as u32;
                changed = true;
            }
        }
        if changed {
            self.bump();
        }
    }

    /// Remove a line by id. No-op when absent.
    pub fn remove_item(&self, id: &str) {
        let removed = {
            let mut items = self.inner.items.lock().unwrap();
            let before = items.len();
            items.retain(|item| item.id != id);
            items.len() != before
        };
        if removed {
            self.bump();
        }
    }

    /// Empty the cart. Used after a successful checkout and on logout.
    pub fn clear(&self) {
        self.inner.items.lock().unwrap().clear();
        self.bump();
    }

    /// Wholesale replacement with the server's cart. Reserved for the sync
    /// engine's initial pull; the server's answer is authoritative at
    /// startup.
    pub fn replace_all(&self, items: Vec<CartLineItem>) {
        *self.inner.items.lock().unwrap() = items;
        self.bump();
    }

    /// Display total over priced lines.
    pub fn total(&self) -> Decimal {
        self.inner
            .items
            .lock()
            .unwrap()
            .iter()
            .map(|item| item.price.unwrap_or_default() * Decimal::from(item.quantity))
            .sum()
    }

    fn bump(&self) {
        self.inner.revision.send_modify(|rev| *rev += 1);
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}
