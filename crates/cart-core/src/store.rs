//! # Cart Store
//!
//! Shared, observable cart handle. The store is created once per browsing
//! session and handed to whatever renders the cart; renderers subscribe and
//! are woken only when a mutation actually changes the cart.

use crate::cart::{Cart, CartItem};
use crate::catalog::Product;
use crate::checkout::CheckoutRequest;
use crate::money::{Currency, Price};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Cloneable handle to one cart
#[derive(Debug, Clone)]
pub struct CartStore {
    tx: Arc<watch::Sender<Cart>>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// Create a store holding an empty cart
    pub fn new() -> Self {
        Self::from_cart(Cart::new())
    }

    /// Create a store holding an empty cart in a given currency
    pub fn with_currency(currency: Currency) -> Self {
        Self::from_cart(Cart::with_currency(currency))
    }

    /// Wrap an existing cart
    pub fn from_cart(cart: Cart) -> Self {
        let (tx, _rx) = watch::channel(cart);
        Self { tx: Arc::new(tx) }
    }

    /// Receive the current cart and every subsequent change
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.tx.subscribe()
    }

    /// Copy of the current cart
    pub fn snapshot(&self) -> Cart {
        self.tx.borrow().clone()
    }

    /// Read the current cart without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&Cart) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// See [`Cart::add_item`]
    pub fn add_item(&self, item: CartItem) {
        debug!(id = %item.id, quantity = item.quantity, "cart add");
        self.tx.send_modify(|cart| cart.add_item(item));
    }

    /// Add one unit of a catalog product
    pub fn add_product(&self, product: &Product) {
        self.add_item(CartItem::from_product(product));
    }

    /// See [`Cart::update_quantity`]
    pub fn update_quantity(&self, id: &str, quantity: i64) -> bool {
        debug!(id, quantity, "cart update");
        self.tx
            .send_if_modified(|cart| cart.update_quantity(id, quantity))
    }

    /// See [`Cart::remove_item`]
    pub fn remove_item(&self, id: &str) -> bool {
        debug!(id, "cart remove");
        self.tx.send_if_modified(|cart| cart.remove_item(id).is_some())
    }

    /// Empty the cart
    pub fn clear(&self) -> bool {
        debug!("cart clear");
        self.tx.send_if_modified(Cart::clear)
    }

    pub fn is_empty(&self) -> bool {
        self.read(Cart::is_empty)
    }

    pub fn total_items(&self) -> u64 {
        self.read(Cart::total_items)
    }

    pub fn total_price(&self) -> Price {
        self.read(Cart::total_price)
    }

    /// Package the current cart for the payment endpoint
    pub fn checkout_request(&self, email: &str) -> CheckoutRequest {
        self.read(|cart| cart.to_checkout_request(email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_operations() {
        let store = CartStore::new();
        store.add_item(CartItem::new("1", "Block 1", 2000));
        store.add_item(CartItem::new("pack", "Pack", 10000));

        assert_eq!(store.total_items(), 2);
        assert_eq!(store.total_price().amount, 12000);

        assert!(store.update_quantity("1", 3));
        assert!(store.remove_item("pack"));
        assert!(!store.remove_item("pack"));
        assert_eq!(store.total_items(), 3);

        assert!(store.clear());
        assert!(store.is_empty());
    }

    #[test]
    fn test_clones_share_one_cart() {
        let store = CartStore::new();
        let other = store.clone();
        other.add_item(CartItem::new("1", "Block 1", 2000));
        assert_eq!(store.total_items(), 1);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = CartStore::new();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.add_item(CartItem::new("1", "Block 1", 2000));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().total_items(), 1);
    }

    #[tokio::test]
    async fn test_noop_mutations_do_not_notify() {
        let store = CartStore::new();
        let mut rx = store.subscribe();

        store.remove_item("missing");
        store.update_quantity("missing", 4);
        store.clear();
        assert!(!rx.has_changed().unwrap());

        store.add_item(CartItem::new("1", "Block 1", 2000));
        assert!(rx.has_changed().unwrap());
        let _ = rx.borrow_and_update();

        store.update_quantity("1", 1);
        assert!(!rx.has_changed().unwrap());
    }
}
