//! # Cart
//!
//! In-memory shopping cart. Line items are unique by id and kept in
//! insertion order; totals are derived on every read.

use crate::catalog::Product;
use crate::checkout::{CheckoutItem, CheckoutRequest};
use crate::money::{major_units, Currency, Price};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A line item in the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product ID
    pub id: String,

    /// Product title (denormalized for display)
    pub title: String,

    /// Unit price in minor units; travels as a decimal `price`
    #[serde(rename = "price", with = "major_units")]
    pub unit_price: i64,

    /// Quantity, always at least 1 while the item is in a cart
    pub quantity: u32,
}

impl CartItem {
    /// Create a line item with quantity 1
    pub fn new(id: impl Into<String>, title: impl Into<String>, unit_price: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            unit_price,
            quantity: 1,
        }
    }

    /// Create a line item from a catalog product
    pub fn from_product(product: &Product) -> Self {
        Self::new(product.id.clone(), product.title.clone(), product.price.amount)
    }

    /// Builder: set quantity
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Line total in minor units, saturating at `i64::MAX`
    pub fn total(&self) -> i64 {
        self.unit_price.saturating_mul(i64::from(self.quantity))
    }
}

/// Insertion-ordered collection of line items keyed by id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: IndexMap<String, CartItem>,
    currency: Currency,
}

impl Cart {
    /// Create an empty cart in the default currency
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cart in a given currency
    pub fn with_currency(currency: Currency) -> Self {
        Self {
            items: IndexMap::new(),
            currency,
        }
    }

    /// Cart currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Add an item, merging into an existing entry with the same id.
    ///
    /// The item's quantity is the increment (treated as 1 when zero).
    /// A merged entry keeps its original title and price.
    pub fn add_item(&mut self, item: CartItem) {
        let increment = item.quantity.max(1);
        match self.items.get_mut(&item.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(increment);
            }
            None => {
                let item = CartItem {
                    quantity: increment,
                    ..item
                };
                self.items.insert(item.id.clone(), item);
            }
        }
    }

    /// Add one unit of a catalog product
    pub fn add_product(&mut self, product: &Product) {
        self.add_item(CartItem::from_product(product));
    }

    /// Set the quantity of an item. Zero or negative removes it; unknown ids
    /// are ignored. Returns whether the cart changed.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove_item(id).is_some();
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.items.get_mut(id) {
            Some(item) if item.quantity != quantity => {
                item.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Remove an item, returning it if it was present
    pub fn remove_item(&mut self, id: &str) -> Option<CartItem> {
        self.items.shift_remove(id)
    }

    /// Empty the cart. Returns whether anything was removed.
    pub fn clear(&mut self) -> bool {
        let had_items = !self.items.is_empty();
        self.items.clear();
        had_items
    }

    /// Look up an item by id
    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.get(id)
    }

    /// Items in insertion order
    pub fn items(&self) -> impl Iterator<Item = &CartItem> {
        self.items.values()
    }

    /// Number of distinct line items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities, widened so saturated lines cannot overflow
    pub fn total_items(&self) -> u64 {
        self.items.values().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of price × quantity
    pub fn total_price(&self) -> Price {
        Price::from_cents(self.total_amount(), self.currency)
    }

    /// Total in minor units
    pub fn total_amount(&self) -> i64 {
        self.items
            .values()
            .fold(0i64, |sum, item| sum.saturating_add(item.total()))
    }

    /// Package the cart for the payment endpoint
    pub fn to_checkout_request(&self, email: impl Into<String>) -> CheckoutRequest {
        CheckoutRequest {
            email: email.into(),
            items: self.items().map(CheckoutItem::from).collect(),
            total_amount: self.total_amount(),
            idempotency_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductCatalog;

    fn assert_totals_consistent(cart: &Cart) {
        let qty: u64 = cart.items().map(|i| u64::from(i.quantity)).sum();
        let price: i64 = cart.items().map(|i| i.unit_price * i64::from(i.quantity)).sum();
        assert_eq!(cart.total_items(), qty);
        assert_eq!(cart.total_price().amount, price);
    }

    #[test]
    fn test_block_and_pack_totals() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new("1", "Block 1", 2000));
        cart.add_item(CartItem::new("pack", "Pack", 10000));

        assert_eq!(cart.total_items(), 2);
        assert_eq!(cart.total_price().amount, 12000);
        assert_eq!(cart.total_price().display(), "€120.00");
    }

    #[test]
    fn test_add_same_id_merges() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new("1", "Block 1", 2000));
        cart.add_item(CartItem::new("1", "Block 1 (renamed)", 9999));
        cart.add_item(CartItem::new("1", "Block 1", 2000).with_quantity(3));

        assert_eq!(cart.len(), 1);
        let item = cart.get("1").unwrap();
        assert_eq!(item.quantity, 5);
        assert_eq!(item.title, "Block 1");
        assert_eq!(item.unit_price, 2000);
    }

    #[test]
    fn test_saturated_quantities_still_sum() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new("1", "Block 1", 2000));
        cart.add_item(CartItem::new("2", "Block 2", 2000));
        assert!(cart.update_quantity("1", i64::MAX));
        assert!(cart.update_quantity("2", i64::MAX));

        assert_eq!(cart.get("1").unwrap().quantity, u32::MAX);
        assert_eq!(cart.total_items(), 2 * u64::from(u32::MAX));
        assert_totals_consistent(&cart);
    }

    #[test]
    fn test_add_zero_quantity_counts_as_one() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new("1", "Block 1", 2000).with_quantity(0));
        assert_eq!(cart.total_items(), 1);
    }

    #[test]
    fn test_insertion_order_survives_removal() {
        let mut cart = Cart::new();
        for id in ["3", "1", "pack", "2"] {
            cart.add_item(CartItem::new(id, id, 2000));
        }
        cart.remove_item("1");
        cart.add_item(CartItem::new("3", "3", 2000));

        let ids: Vec<_> = cart.items().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["3", "pack", "2"]);
    }

    #[test]
    fn test_update_quantity() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new("1", "Block 1", 2000));

        assert!(cart.update_quantity("1", 4));
        assert_eq!(cart.get("1").unwrap().quantity, 4);
        assert!(!cart.update_quantity("1", 4));
        assert!(!cart.update_quantity("missing", 2));
        assert!(cart.get("missing").is_none());
        assert_totals_consistent(&cart);
    }

    #[test]
    fn test_update_quantity_zero_or_negative_removes() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new("1", "Block 1", 2000));
        cart.add_item(CartItem::new("2", "Block 2", 2000));

        assert!(cart.update_quantity("1", 0));
        assert!(cart.update_quantity("2", -3));
        assert!(cart.is_empty());
        assert!(!cart.update_quantity("2", -1));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new("1", "Block 1", 2000));
        assert!(cart.remove_item("nope").is_none());
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_clear_always_empties() {
        let mut cart = Cart::new();
        assert!(!cart.clear());

        let catalog = ProductCatalog::study_blocks();
        for product in catalog.active_products() {
            cart.add_product(product);
        }
        assert!(cart.clear());
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price().amount, 0);
    }

    #[test]
    fn test_totals_track_mixed_operations() {
        let mut cart = Cart::new();
        let ops: [(&str, i64); 8] = [
            ("1", 1),
            ("2", 3),
            ("1", 2),
            ("pack", 1),
            ("2", 0),
            ("3", 7),
            ("3", -1),
            ("1", 5),
        ];

        for (id, qty) in ops {
            if cart.get(id).is_none() && qty > 0 {
                cart.add_item(CartItem::new(id, id, 1999));
            }
            cart.update_quantity(id, qty);
            assert_totals_consistent(&cart);
        }

        assert_eq!(cart.total_items(), 6);
        assert_eq!(cart.total_amount(), 6 * 1999);
    }

    #[test]
    fn test_to_checkout_request() {
        let mut cart = Cart::new();
        cart.add_item(CartItem::new("1", "Block 1", 1999).with_quantity(2));
        cart.add_item(CartItem::new("pack", "Pack", 10000));

        let request = cart.to_checkout_request("ana@example.com");
        assert_eq!(request.email, "ana@example.com");
        assert_eq!(request.items.len(), 2);
        assert_eq!(request.total_amount, 13998);
        assert_eq!(request.items_total(), Some(request.total_amount));
    }

    #[test]
    fn test_cart_item_wire_format() {
        let item = CartItem::new("1", "Block 1", 2000).with_quantity(2);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "1", "title": "Block 1", "price": 20, "quantity": 2})
        );
    }
}
