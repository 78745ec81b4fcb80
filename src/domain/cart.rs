//! Shopping cart
//!
//! Ordered set of line items keyed by product id. Session-scoped and never
//! persisted; an order placement snapshots and clears it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::Product;
use crate::{Result, StorefrontError};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Raised for the UI layer; the session turns `ItemAdded` into a transient
/// confirmation notice.
#[derive(Clone, Debug)]
pub enum CartEvent {
    ItemAdded { name: String, quantity: u32 },
}

#[derive(Clone, Debug, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    events: Vec<CartEvent>,
}

impl Cart {
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities, for badge displays.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Merges quantity into an existing line for the same product, or appends
    /// a new line. Quantities below 1 are rejected.
    ///
    /// Stock is intentionally not checked here; the source never capped cart
    /// quantity against availability and that remains an open product
    /// decision rather than something to fix silently.
    pub fn add(&mut self, product: Product, quantity: u32) -> Result<()> {
        if quantity < 1 {
            return Err(StorefrontError::InvalidQuantity);
        }
        let name = product.name.clone();
        if let Some(existing) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            existing.quantity += quantity;
        } else {
            self.items.push(CartItem { product, quantity });
        }
        self.events.push(CartEvent::ItemAdded { name, quantity });
        Ok(())
    }

    /// Zero quantity removes the line; an absent id is a no-op.
    pub fn update_quantity(&mut self, product_id: u32, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
        } else if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product_id) {
            item.quantity = quantity;
        }
    }

    /// Idempotent.
    pub fn remove(&mut self, product_id: u32) {
        self.items.retain(|i| i.product.id != product_id);
    }

    /// Called exactly once, by successful order placement.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Frozen copy of the current lines, for order snapshots.
    pub fn snapshot(&self) -> Vec<CartItem> {
        self.items.clone()
    }

    pub fn take_events(&mut self) -> Vec<CartEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog;

    fn product(id: u32) -> Product {
        let mut p = catalog::seed().all()[0].clone();
        p.id = id;
        p
    }

    #[test]
    fn test_repeated_adds_merge_into_one_line() {
        let mut cart = Cart::default();
        cart.add(product(1), 2).unwrap();
        cart.add(product(1), 3).unwrap();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_zero_quantity_add_rejected() {
        let mut cart = Cart::default();
        assert!(matches!(
            cart.add(product(1), 0),
            Err(StorefrontError::InvalidQuantity)
        ));
    }

    #[test]
    fn test_update_to_zero_equals_remove() {
        let mut a = Cart::default();
        let mut b = Cart::default();
        a.add(product(1), 2).unwrap();
        b.add(product(1), 2).unwrap();
        a.update_quantity(1, 0);
        b.remove(1);
        assert!(a.is_empty());
        assert!(b.is_empty());
    }

    #[test]
    fn test_update_absent_id_is_noop() {
        let mut cart = Cart::default();
        cart.add(product(1), 1).unwrap();
        cart.update_quantity(42, 3);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_add_raises_event() {
        let mut cart = Cart::default();
        cart.add(product(1), 2).unwrap();
        let events = cart.take_events();
        assert!(matches!(
            events.as_slice(),
            [CartEvent::ItemAdded { quantity: 2, .. }]
        ));
        assert!(cart.take_events().is_empty());
    }
}
