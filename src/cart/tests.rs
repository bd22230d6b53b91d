use rust_decimal::Decimal;

use super::*;
use crate::test_utils::{dec, make_item};

#[test]
fn fresh_line_lands_at_scanned_quantity() {
    let mut cart = CartStore::new();
    cart.add_or_set_quantity(&make_item("X", 100), dec("3.5"), None);

    let line = cart.get("X").unwrap();
    assert_eq!(line.quantity, dec("3.5"));
}

#[test]
fn repeated_scans_accumulate_on_one_line() {
    let mut cart = CartStore::new();
    let item = make_item("X", 100);
    cart.add_or_set_quantity(&item, dec("3.5"), None);
    cart.add_or_set_quantity(&item, dec("2.0"), None);

    assert_eq!(cart.len(), 1);
    assert_eq!(cart.get("X").unwrap().quantity, dec("5.5"));
}

#[test]
fn no_two_lines_share_an_item_code() {
    let mut cart = CartStore::new();
    cart.add_or_set_quantity(&make_item("A", 10), Decimal::ONE, None);
    cart.add_or_set_quantity(&make_item("B", 20), Decimal::ONE, None);
    cart.add_or_set_quantity(&make_item("A", 10), Decimal::ONE, None);

    assert_eq!(cart.len(), 2);
    assert_eq!(cart.get("A").unwrap().quantity, dec("2"));
}

#[test]
fn new_line_starts_at_base_uom_and_price() {
    let mut cart = CartStore::new();
    cart.add_or_set_quantity(&make_item("A", 42), Decimal::ONE, None);

    let line = cart.get("A").unwrap();
    assert_eq!(line.uom, "Nos");
    assert_eq!(line.price, dec("42"));
    assert_eq!(line.original_item_code, None);
}

#[test]
fn update_quantity_to_zero_removes_the_line() {
    let mut cart = CartStore::new();
    cart.add_or_set_quantity(&make_item("A", 10), dec("2"), None);

    let removed = cart.update_quantity("A", Decimal::ZERO).unwrap();
    assert_eq!(removed.item_code, "A");
    assert!(cart.is_empty());
}

#[test]
fn update_quantity_replaces_in_place() {
    let mut cart = CartStore::new();
    cart.add_or_set_quantity(&make_item("A", 10), dec("2"), None);

    assert!(cart.update_quantity("A", dec("7")).is_none());
    assert_eq!(cart.get("A").unwrap().quantity, dec("7"));
}

#[test]
fn coupons_deduplicate_by_code() {
    let mut cart = CartStore::new();
    let coupon = AppliedCoupon {
        code: "WELCOME".into(),
        value: dec("10"),
        description: String::new(),
    };
    assert!(cart.apply_coupon(coupon.clone()));
    assert!(!cart.apply_coupon(coupon));
    assert_eq!(cart.coupons().len(), 1);

    assert!(cart.remove_coupon("WELCOME"));
    assert!(!cart.remove_coupon("WELCOME"));
}

#[test]
fn clear_resets_lines_coupons_and_customer() {
    let mut cart = CartStore::new();
    cart.add_or_set_quantity(&make_item("A", 10), Decimal::ONE, None);
    cart.apply_coupon(AppliedCoupon {
        code: "C".into(),
        value: dec("5"),
        description: String::new(),
    });
    cart.set_customer(Some("CUST-1".into()));

    cart.clear();

    assert!(cart.is_empty());
    assert!(cart.coupons().is_empty());
    assert_eq!(cart.customer(), None);
}
