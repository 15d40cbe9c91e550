//! Cart store: the session's single source of truth for the cart.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use storefront_core::{AggregateRoot, ExpectedVersion, Product, ProductId};
use thiserror::Error;

use crate::cart::{decode_lines, Cart, DEFAULT_CART_KEY};
use crate::line::CartLine;
use crate::persistence::{PersistTask, PersistenceQueue};
use crate::storage::KeyValueStorage;

/// Cart store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartStoreConfig {
    /// Storage key holding the serialised cart.
    pub storage_key: String,
}

impl Default for CartStoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_CART_KEY.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CartStoreError {
    #[error("cart store must be created inside a tokio runtime")]
    NoRuntime,
}

/// Coarse lifecycle of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// No hydration has completed yet.
    Uninitialized,
    /// At least one `load_cart` has resolved.
    Ready,
}

/// What a `load_cart` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// The persisted cart replaced the in-memory one.
    Restored { lines: usize },
    /// Nothing persisted; in-memory cart untouched.
    Absent,
    /// A payload existed but could not be parsed; treated as absent.
    Corrupted,
    /// Storage could not be read; treated as absent.
    Unavailable,
    /// The cart was mutated while the read was in flight; the persisted copy
    /// was discarded in favour of the newer in-memory state.
    Superseded,
}

/// Explicit cart state container.
///
/// Create one per session in the composition root and hand clones to the
/// screens that need it; clones share the same cart.
///
/// Mutations apply synchronously and are visible to the next read. Each one
/// enqueues a persistence task that a background worker applies in order;
/// the caller never waits for it and never sees its failures.
///
/// Hydration (`load_cart`) is meant to run once at startup, before the user
/// can interact. Calling it later is a correctness hazard: if the cart was
/// mutated while the read was in flight the persisted copy is discarded
/// (`HydrationOutcome::Superseded`), so it never clobbers newer state, but a
/// stale durable copy is then silently ignored.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

struct Inner {
    cart: RwLock<Cart>,
    ready: AtomicBool,
    storage: Arc<dyn KeyValueStorage>,
    queue: PersistenceQueue,
}

impl core::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &*self.read_cart())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create an empty store and start its persistence worker on the current
    /// tokio runtime.
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        config: CartStoreConfig,
    ) -> Result<Self, CartStoreError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| CartStoreError::NoRuntime)?;
        let queue = PersistenceQueue::start(&runtime, storage.clone());

        Ok(Self {
            inner: Arc::new(Inner {
                cart: RwLock::new(Cart::empty(config.storage_key)),
                ready: AtomicBool::new(false),
                storage,
                queue,
            }),
        })
    }

    pub fn state(&self) -> StoreState {
        if self.inner.ready.load(Ordering::Acquire) {
            StoreState::Ready
        } else {
            StoreState::Uninitialized
        }
    }

    /// Add one unit of `product`; returns the updated cart.
    pub fn add_to_cart(&self, product: &Product) -> Cart {
        let mut cart = self.write_cart();
        let quantity = cart.add(product);
        tracing::debug!(product_id = %product.id, quantity, "added product to cart");

        self.persist(&cart);
        cart.clone()
    }

    /// Remove the line for `product_id`; a missing product is a no-op.
    pub fn remove_from_cart(&self, product_id: ProductId) -> Cart {
        let mut cart = self.write_cart();
        if cart.remove(product_id) {
            tracing::debug!(product_id = %product_id, "removed product from cart");
            self.persist(&cart);
        } else {
            tracing::debug!(product_id = %product_id, "product not in cart; nothing to remove");
        }
        cart.clone()
    }

    /// Empty the cart and erase the durable slot (not an empty write).
    pub fn clear_cart(&self) {
        let mut cart = self.write_cart();
        cart.clear();
        tracing::debug!(version = cart.version(), "cleared cart");

        self.inner.queue.enqueue(PersistTask::Erase {
            key: cart.id().clone(),
            version: cart.version(),
        });
    }

    pub fn total_price(&self) -> f64 {
        self.read_cart().total_price()
    }

    pub fn total_cart_items(&self) -> u64 {
        self.read_cart().total_items()
    }

    /// Snapshot of the current cart.
    pub fn cart(&self) -> Cart {
        self.read_cart().clone()
    }

    pub fn lines(&self) -> Vec<CartLine> {
        self.read_cart().lines().to_vec()
    }

    /// Hydrate from durable storage.
    ///
    /// Never fails: corrupt or unreadable storage leaves the in-memory cart
    /// as it is. Safe to call repeatedly.
    pub async fn load_cart(&self) -> HydrationOutcome {
        let expected = ExpectedVersion::Exact(self.read_cart().version());
        let key = self.read_cart().id().clone();

        // Read our own writes: anything enqueued before this call lands first.
        self.inner.queue.flush().await;

        let outcome = match self.inner.storage.get(&key).await {
            Err(err) => {
                tracing::warn!(
                    key = %key,
                    "cart storage unreadable; starting with current cart: {err}"
                );
                HydrationOutcome::Unavailable
            }
            Ok(None) => {
                tracing::info!(key = %key, "no persisted cart");
                HydrationOutcome::Absent
            }
            Ok(Some(raw)) => match decode_lines(&raw) {
                Err(err) => {
                    tracing::error!(key = %key, "persisted cart is corrupt; ignoring it: {err}");
                    HydrationOutcome::Corrupted
                }
                Ok(lines) => {
                    let count = lines.len();
                    let mut cart = self.write_cart();
                    match cart.restore(lines, expected) {
                        Ok(()) => {
                            tracing::info!(key = %key, lines = count, "restored persisted cart");
                            HydrationOutcome::Restored { lines: count }
                        }
                        Err(err) => {
                            tracing::warn!(
                                key = %key,
                                "cart changed during hydration; keeping in-memory cart: {err}"
                            );
                            HydrationOutcome::Superseded
                        }
                    }
                }
            },
        };

        self.inner.ready.store(true, Ordering::Release);
        outcome
    }

    /// Wait for every persistence task enqueued so far.
    pub async fn flush(&self) {
        self.inner.queue.flush().await;
    }

    /// Drain pending writes and stop the persistence worker. Mutations made
    /// afterwards stay in memory only.
    pub async fn shutdown(&self) {
        self.inner.queue.shutdown().await;
    }

    /// Enqueue a full snapshot. Called with the write lock held so tasks are
    /// queued in mutation order.
    fn persist(&self, cart: &Cart) {
        match cart.encode() {
            Ok(payload) => self.inner.queue.enqueue(PersistTask::Write {
                key: cart.id().clone(),
                payload,
                version: cart.version(),
            }),
            Err(err) => {
                tracing::error!(version = cart.version(), "failed to serialise cart: {err}");
            }
        }
    }

    fn read_cart(&self) -> RwLockReadGuard<'_, Cart> {
        self.inner.cart.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cart(&self) -> RwLockWriteGuard<'_, Cart> {
        self.inner.cart.write().unwrap_or_else(PoisonError::into_inner)
    }
}
