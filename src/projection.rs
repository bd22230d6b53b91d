//! Pricing projection.
//!
//! Pure read-side computation over the cart store and per-line discount
//! state. Never mutates, never fails; projecting the same inputs twice
//! yields identical output.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::cart::CartStore;
use crate::engine::LineState;

/// Computed totals for one cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTotal {
    pub item_code: String,
    pub quantity: Decimal,
    /// Unit price after discounts.
    pub effective_price: Decimal,
    pub total: Decimal,
}

/// Computed totals for the whole cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub lines: Vec<LineTotal>,
    pub subtotal: Decimal,
    pub coupon_discount: Decimal,
    pub total: Decimal,
}

/// Effective unit price after discounts.
///
/// The percentage applies before the fixed amount; each step is skipped at
/// zero and the result is clamped at zero. Amount-first would undercharge
/// whenever both discounts are set, so the order is part of the contract.
pub fn effective_price(price: Decimal, state: Option<&LineState>) -> Decimal {
    let Some(state) = state else {
        return price;
    };
    let mut effective = price;
    if !state.discount_percent.is_zero() {
        effective *= Decimal::ONE - state.discount_percent / Decimal::ONE_HUNDRED;
    }
    if !state.discount_amount.is_zero() {
        effective -= state.discount_amount;
    }
    effective.max(Decimal::ZERO)
}

/// Project cart lines and discount state into displayed totals.
///
/// Coupons subtract their fixed values from the subtotal; the grand total
/// never goes negative.
pub fn project(cart: &CartStore, states: &HashMap<String, LineState>) -> Receipt {
    let lines: Vec<LineTotal> = cart
        .lines()
        .iter()
        .map(|line| {
            let effective = effective_price(line.price, states.get(&line.item_code));
            LineTotal {
                item_code: line.item_code.clone(),
                quantity: line.quantity,
                effective_price: effective,
                total: effective * line.quantity,
            }
        })
        .collect();

    let subtotal: Decimal = lines.iter().map(|l| l.total).sum();
    let coupon_discount: Decimal = cart.coupons().iter().map(|c| c.value).sum();

    Receipt {
        lines,
        subtotal,
        coupon_discount,
        total: (subtotal - coupon_discount).max(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::AppliedCoupon;
    use crate::test_utils::{dec, make_item};

    fn state(percent: &str, amount: &str) -> LineState {
        LineState {
            discount_percent: dec(percent),
            discount_amount: dec(amount),
            ..LineState::default()
        }
    }

    #[test]
    fn percentage_applies_before_fixed_amount() {
        // 100 * 0.9 = 90, then 90 - 5 = 85. Amount-first would differ.
        let effective = effective_price(dec("100"), Some(&state("10", "5")));
        assert_eq!(effective, dec("85"));
    }

    #[test]
    fn line_total_multiplies_by_quantity() {
        let mut cart = CartStore::new();
        cart.add_or_set_quantity(&make_item("A", 100), dec("2"), None);
        let mut states = HashMap::new();
        states.insert("A".to_string(), state("10", "5"));

        let receipt = project(&cart, &states);
        assert_eq!(receipt.lines[0].total, dec("170"));
        assert_eq!(receipt.subtotal, dec("170"));
    }

    #[test]
    fn discounts_clamp_at_zero() {
        let effective = effective_price(dec("3"), Some(&state("50", "10")));
        assert_eq!(effective, Decimal::ZERO);
    }

    #[test]
    fn zero_discounts_are_skipped() {
        assert_eq!(effective_price(dec("42.50"), Some(&LineState::default())), dec("42.50"));
        assert_eq!(effective_price(dec("42.50"), None), dec("42.50"));
    }

    #[test]
    fn coupon_discount_floors_grand_total_at_zero() {
        let mut cart = CartStore::new();
        cart.add_or_set_quantity(&make_item("A", 50), Decimal::ONE, None);
        cart.apply_coupon(AppliedCoupon {
            code: "BIG".into(),
            value: dec("80"),
            description: String::new(),
        });

        let receipt = project(&cart, &HashMap::new());
        assert_eq!(receipt.subtotal, dec("50"));
        assert_eq!(receipt.coupon_discount, dec("80"));
        assert_eq!(receipt.total, Decimal::ZERO);
    }

    #[test]
    fn projection_is_idempotent() {
        let mut cart = CartStore::new();
        cart.add_or_set_quantity(&make_item("A", 100), dec("3.5"), None);
        let mut states = HashMap::new();
        states.insert("A".to_string(), state("25", "1.50"));

        let first = project(&cart, &states);
        let second = project(&cart, &states);
        assert_eq!(first, second);
    }
}
