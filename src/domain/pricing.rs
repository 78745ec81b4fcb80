//! Price and shipping policy
//!
//! Pure functions over cart line items. Amounts accumulate as [`Decimal`]
//! and are rounded to two places only when formatted for display.

use rust_decimal::Decimal;

use super::cart::CartItem;

/// Orders strictly above this subtotal ship free.
pub const FREE_SHIPPING_THRESHOLD: u32 = 999;
/// Flat fee below the free-shipping threshold.
pub const FLAT_SHIPPING_FEE: u32 = 50;

pub fn subtotal(items: &[CartItem]) -> Decimal {
    items.iter().fold(Decimal::ZERO, |acc, item| {
        acc + item.product.price * Decimal::from(item.quantity)
    })
}

pub fn shipping(subtotal: Decimal) -> Decimal {
    if subtotal > Decimal::from(FREE_SHIPPING_THRESHOLD) {
        Decimal::ZERO
    } else {
        Decimal::from(FLAT_SHIPPING_FEE)
    }
}

pub fn total(items: &[CartItem]) -> Decimal {
    let sub = subtotal(items);
    sub + shipping(sub)
}

/// Display formatting; the only place money is rounded.
pub fn format_money(amount: Decimal) -> String {
    format!("₹{:.2}", amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog;

    fn item(price: u32, quantity: u32) -> CartItem {
        let mut product = catalog::seed().all()[0].clone();
        product.price = Decimal::from(price);
        CartItem { product, quantity }
    }

    #[test]
    fn test_shipping_boundary_is_strict() {
        assert_eq!(shipping(Decimal::from(999)), Decimal::from(50));
        assert_eq!(shipping(Decimal::from(1000)), Decimal::ZERO);
    }

    #[test]
    fn test_total_two_items_free_shipping() {
        let items = vec![item(500, 1), item(600, 1)];
        assert_eq!(subtotal(&items), Decimal::from(1100));
        assert_eq!(total(&items), Decimal::from(1100));
    }

    #[test]
    fn test_total_below_threshold_adds_flat_fee() {
        let items = vec![item(299, 2)];
        assert_eq!(total(&items), Decimal::from(648));
    }

    #[test]
    fn test_format_money_rounds_at_display() {
        assert_eq!(format_money(Decimal::new(129999, 2)), "₹1299.99");
        assert_eq!(format_money(Decimal::from(50)), "₹50.00");
    }
}
