//! Order lifecycle
//!
//! Orders are frozen snapshots of the cart at placement time; only the
//! status field moves afterwards, forward through a linear state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::cart::CartItem;
use super::pricing;
use crate::{Result, StorefrontError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Processing,
    Shipped,
    #[serde(rename = "Out for Delivery")]
    OutForDelivery,
    Delivered,
}

impl OrderStatus {
    /// Forward-only; no cancellation or refund is modeled.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Processing => Some(Self::Shipped),
            Self::Shipped => Some(Self::OutForDelivery),
            Self::OutForDelivery => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct ShippingInfo {
    #[validate(custom = "non_blank")]
    pub full_name: String,
    #[validate(custom = "non_blank")]
    pub address: String,
    #[validate(custom = "non_blank")]
    pub city: String,
    #[validate(custom = "six_digit_postal")]
    pub postal_code: String,
    #[validate(custom = "non_blank")]
    pub country: String,
}

fn non_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

fn six_digit_postal(value: &str) -> std::result::Result<(), ValidationError> {
    if value.len() != 6 || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("postal_code"));
    }
    Ok(())
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: u64,
    pub date: DateTime<Utc>,
    pub items: Vec<CartItem>,
    /// Subtotal plus shipping, computed once at placement.
    pub total: rust_decimal::Decimal,
    pub shipping_info: ShippingInfo,
    pub status: OrderStatus,
}

impl Order {
    /// Administrative action, outside the shopping flow.
    pub fn advance(&mut self) -> Result<OrderStatus> {
        self.status = self
            .status
            .next()
            .ok_or_else(|| StorefrontError::Validation("order already delivered".into()))?;
        Ok(self.status)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OrderBook {
    orders: Vec<Order>,
}

impl OrderBook {
    pub fn new(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Validates shipping info, snapshots the items and stores the order
    /// newest-first. Ids are random, not timestamp-derived, so back-to-back
    /// placements in the same millisecond still get distinct ids.
    pub fn place(
        &mut self,
        user_id: u64,
        items: Vec<CartItem>,
        shipping_info: ShippingInfo,
    ) -> Result<String> {
        if items.is_empty() {
            return Err(StorefrontError::Validation("cart is empty".into()));
        }
        shipping_info
            .validate()
            .map_err(|e| StorefrontError::Validation(e.to_string()))?;
        let order = Order {
            id: format!("UE-{}", Uuid::new_v4()),
            user_id,
            date: Utc::now(),
            total: pricing::total(&items),
            items,
            shipping_info,
            status: OrderStatus::Processing,
        };
        let id = order.id.clone();
        self.orders.insert(0, order);
        Ok(id)
    }

    /// Case-insensitive, whitespace-trimmed match; tracking input is typed
    /// by hand.
    pub fn find(&self, id: &str) -> Option<&Order> {
        let wanted = id.trim();
        self.orders.iter().find(|o| o.id.eq_ignore_ascii_case(wanted))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Order> {
        let wanted = id.trim();
        self.orders
            .iter_mut()
            .find(|o| o.id.eq_ignore_ascii_case(wanted))
    }

    /// Newest-first.
    pub fn orders_for(&self, user_id: u64) -> Vec<&Order> {
        self.orders.iter().filter(|o| o.user_id == user_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog;
    use rust_decimal::Decimal;

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            full_name: "Alex Mercer".into(),
            address: "123 Urban St.".into(),
            city: "Mumbai".into(),
            postal_code: "400001".into(),
            country: "India".into(),
        }
    }

    fn items(prices: &[u32]) -> Vec<CartItem> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| {
                let mut product = catalog::seed().all()[0].clone();
                product.id = i as u32 + 1;
                product.price = Decimal::from(price);
                CartItem { product, quantity: 1 }
            })
            .collect()
    }

    #[test]
    fn test_place_order_totals_and_status() {
        let mut book = OrderBook::default();
        let id = book.place(1, items(&[500, 600]), shipping()).unwrap();
        let order = book.find(&id).unwrap();
        assert_eq!(order.total, Decimal::from(1100)); // free shipping above 999
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[test]
    fn test_rapid_orders_get_distinct_ids() {
        let mut book = OrderBook::default();
        let a = book.place(1, items(&[500]), shipping()).unwrap();
        let b = book.place(1, items(&[500]), shipping()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_find_trims_and_case_folds() {
        let mut book = OrderBook::default();
        let id = book.place(1, items(&[500]), shipping()).unwrap();
        let sloppy = format!("  {}  ", id.to_lowercase());
        assert!(book.find(&sloppy).is_some());
        assert!(book.find("UE-unknown").is_none());
    }

    #[test]
    fn test_bad_postal_code_rejected() {
        let mut book = OrderBook::default();
        let mut info = shipping();
        info.postal_code = "4000".into();
        assert!(matches!(
            book.place(1, items(&[500]), info),
            Err(StorefrontError::Validation(_))
        ));
    }

    #[test]
    fn test_blank_field_rejected() {
        let mut book = OrderBook::default();
        let mut info = shipping();
        info.city = "   ".into();
        assert!(book.place(1, items(&[500]), info).is_err());
    }

    #[test]
    fn test_empty_cart_rejected() {
        let mut book = OrderBook::default();
        assert!(book.place(1, vec![], shipping()).is_err());
    }

    #[test]
    fn test_orders_for_is_newest_first() {
        let mut book = OrderBook::default();
        let first = book.place(1, items(&[500]), shipping()).unwrap();
        let second = book.place(1, items(&[600]), shipping()).unwrap();
        book.place(2, items(&[700]), shipping()).unwrap();
        let mine: Vec<&str> = book.orders_for(1).iter().map(|o| o.id.as_str()).collect();
        assert_eq!(mine, vec![second.as_str(), first.as_str()]);
    }

    #[test]
    fn test_status_advances_linearly() {
        let mut book = OrderBook::default();
        let id = book.place(1, items(&[500]), shipping()).unwrap();
        let order = book.find_mut(&id).unwrap();
        assert_eq!(order.advance().unwrap(), OrderStatus::Shipped);
        assert_eq!(order.advance().unwrap(), OrderStatus::OutForDelivery);
        assert_eq!(order.advance().unwrap(), OrderStatus::Delivered);
        assert!(order.advance().is_err());
    }
}
