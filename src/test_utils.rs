//! Test fixtures.
//!
//! Shared constructors for catalog items and resolved-lookup responses so
//! tests do not repeat field lists.

use rust_decimal::Decimal;

use crate::cart::CatalogItem;
use crate::interfaces::ResolvedItem;

/// Parse a decimal literal; panics on malformed input (test-only).
pub fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal literal")
}

/// A plain catalog item priced in whole currency units, well stocked.
pub fn make_item(code: &str, price: i64) -> CatalogItem {
    CatalogItem {
        item_code: code.to_string(),
        item_name: format!("Item {code}"),
        item_group: "General".to_string(),
        price: Decimal::from(price),
        available: Decimal::from(100),
        stock_uom: "Nos".to_string(),
        barcode: None,
    }
}

/// A catalog item with explicit stock on hand.
pub fn make_item_with_stock(code: &str, price: i64, available: i64) -> CatalogItem {
    CatalogItem {
        available: Decimal::from(available),
        ..make_item(code, price)
    }
}

/// A backend lookup response for `code`, without a batch/serial match.
pub fn make_resolved(code: &str, price: i64) -> ResolvedItem {
    ResolvedItem {
        item_code: code.to_string(),
        item_name: format!("Item {code}"),
        item_group: "General".to_string(),
        price: Decimal::from(price),
        available: Decimal::from(100),
        image: None,
        stock_uom: Some("Nos".to_string()),
        matched_type: None,
        matched_value: None,
    }
}

/// A backend lookup response that matched a batch or serial number.
pub fn make_resolved_with_match(
    code: &str,
    price: i64,
    matched_type: &str,
    matched_value: &str,
) -> ResolvedItem {
    ResolvedItem {
        matched_type: Some(matched_type.to_string()),
        matched_value: Some(matched_value.to_string()),
        ..make_resolved(code, price)
    }
}
