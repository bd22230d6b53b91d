//! End-to-end register flows over mock collaborators.
//!
//! Exercises the full path a cashier drives: scans and typed input through
//! the reconciliation engine, discount and coupon edits, and the projected
//! receipt the UI would display.

use std::sync::Arc;

use rust_decimal::Decimal;

use till::cart::{AppliedCoupon, CatalogItem};
use till::clients::mock::{MockCatalog, MockInventory, MockPrices};
use till::config::RegisterConfig;
use till::engine::{Reconciler, ResolveOutcome, ValidationError};
use till::interfaces::{BatchOption, PreselectKind, ResolvedItem, UomPrice, UomPricing};

fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal literal")
}

fn produce_item(code: &str, price: &str) -> CatalogItem {
    CatalogItem {
        item_code: code.to_string(),
        item_name: format!("Item {code}"),
        item_group: "Produce".to_string(),
        price: dec(price),
        available: dec("100"),
        stock_uom: "Kg".to_string(),
        barcode: None,
    }
}

fn resolved(code: &str, price: &str) -> ResolvedItem {
    ResolvedItem {
        item_code: code.to_string(),
        item_name: format!("Item {code}"),
        item_group: "General".to_string(),
        price: dec(price),
        available: dec("100"),
        image: None,
        stock_uom: Some("Nos".to_string()),
        matched_type: None,
        matched_value: None,
    }
}

struct Register {
    catalog: Arc<MockCatalog>,
    prices: Arc<MockPrices>,
    inventory: Arc<MockInventory>,
    engine: Reconciler,
}

fn register(scale_prefix: &str) -> Register {
    let catalog = Arc::new(MockCatalog::new());
    let prices = Arc::new(MockPrices::new());
    let inventory = Arc::new(MockInventory::new());
    let config = RegisterConfig {
        scale_prefix: scale_prefix.to_string(),
        ..RegisterConfig::default()
    };
    let engine = Reconciler::new(
        &config,
        catalog.clone(),
        prices.clone(),
        inventory.clone(),
    );
    Register {
        catalog,
        prices,
        inventory,
        engine,
    }
}

#[tokio::test]
async fn weighed_produce_checkout() {
    let mut r = register("99");
    r.engine.set_catalog(vec![produce_item("9900001", "4.20")]);

    // Two weighed parcels of the same item: 7.60 kg then 7.60 kg again.
    r.engine.resolve_and_add("9900001007606").await.unwrap();
    r.engine.resolve_and_add("9900001007606").await.unwrap();

    let cart = r.engine.cart();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart.get("9900001").unwrap().quantity, dec("15.20"));

    let receipt = r.engine.receipt();
    assert_eq!(receipt.subtotal, dec("63.84"));
    assert_eq!(receipt.total, dec("63.84"));
}

#[tokio::test]
async fn corrupted_scan_is_rejected_without_touching_the_cart() {
    let mut r = register("99");
    r.engine.set_catalog(vec![produce_item("9900001", "4.20")]);
    r.engine.resolve_and_add("9900001007606").await.unwrap();

    let err = r.engine.resolve_and_add("9900001007600").await.unwrap_err();
    assert!(matches!(err, ValidationError::ScaleCheckDigit(_)));
    assert_eq!(r.engine.cart().get("9900001").unwrap().quantity, dec("7.60"));
}

#[tokio::test]
async fn typed_search_then_scan_accumulates_on_one_line() {
    let mut r = register("99");
    let item = produce_item("9900001", "4.20");
    r.engine.set_catalog(vec![item.clone()]);

    // Cashier clicks the grid item, then the customer brings a weighed bag.
    r.engine.add_item(&item).await;
    r.engine.resolve_and_add("9900001007606").await.unwrap();

    assert_eq!(r.engine.cart().len(), 1);
    assert_eq!(r.engine.cart().get("9900001").unwrap().quantity, dec("8.60"));
}

#[tokio::test]
async fn search_time_batch_match_lands_on_the_line_added_later() {
    let mut r = register("");
    r.inventory
        .insert_batches(
            "ITEM-9",
            vec![
                BatchOption {
                    batch_id: "B-1".to_string(),
                    qty: dec("4"),
                },
                BatchOption {
                    batch_id: "B-2".to_string(),
                    qty: dec("9"),
                },
            ],
        )
        .await;

    // The search pane resolves a batch number before the cashier commits
    // the line.
    r.engine
        .apply_preselect("ITEM-9", PreselectKind::Batch, "B-1")
        .await;
    assert!(r.engine.line_state("ITEM-9").is_none());

    r.engine.add_item(&produce_item("ITEM-9", "12")).await;

    let state = r.engine.line_state("ITEM-9").unwrap();
    assert_eq!(state.batch_no.as_deref(), Some("B-1"));
    assert_eq!(state.batch_available, Some(dec("4")));
}

#[tokio::test]
async fn barcode_scan_resolving_to_serial_preselects_it() {
    let mut r = register("");
    let mut item = resolved("ITEM-5", "250");
    item.matched_type = Some("serial".to_string());
    item.matched_value = Some("SN-0042".to_string());
    r.catalog.insert("8001230042", item).await;

    let outcome = r.engine.resolve_and_add("8001230042").await.unwrap();
    assert_eq!(
        outcome,
        ResolveOutcome::Added {
            item_code: "ITEM-5".to_string()
        }
    );
    assert_eq!(
        r.engine.line_state("ITEM-5").unwrap().serial_no.as_deref(),
        Some("SN-0042")
    );
}

#[tokio::test]
async fn discounted_line_with_coupon_floors_at_zero() {
    let mut r = register("");
    r.engine.add_item(&produce_item("ITEM-1", "100")).await;
    r.engine.update_quantity("ITEM-1", dec("2"));
    r.engine.set_discount_percent("ITEM-1", dec("10")).unwrap();
    r.engine.set_discount_amount("ITEM-1", dec("5")).unwrap();
    r.engine.apply_coupon(AppliedCoupon {
        code: "GIFT-500".to_string(),
        value: dec("500"),
        description: "gift card".to_string(),
    });

    let receipt = r.engine.receipt();
    assert_eq!(receipt.lines[0].effective_price, dec("85"));
    assert_eq!(receipt.subtotal, dec("170"));
    assert_eq!(receipt.coupon_discount, dec("500"));
    assert_eq!(receipt.total, Decimal::ZERO);
}

#[tokio::test]
async fn uom_switch_reprices_the_line_once_the_lookup_lands() {
    let mut r = register("");
    r.engine.add_item(&produce_item("ITEM-2", "10")).await;
    r.prices
        .insert(
            "ITEM-2",
            UomPricing {
                base_uom: "Kg".to_string(),
                uoms: vec![
                    UomPrice {
                        uom: "Kg".to_string(),
                        conversion_factor: Decimal::ONE,
                        price: dec("10"),
                    },
                    UomPrice {
                        uom: "Crate".to_string(),
                        conversion_factor: dec("25"),
                        price: dec("230"),
                    },
                ],
            },
        )
        .await;

    assert!(r.engine.select_uom("ITEM-2", "Crate").await);

    let line = r.engine.cart().get("ITEM-2").unwrap();
    assert_eq!(line.uom, "Crate");
    assert_eq!(line.price, dec("230"));
    assert_eq!(r.engine.receipt().subtotal, dec("230"));
}

#[tokio::test]
async fn backend_outage_degrades_scans_to_search_terms() {
    let mut r = register("99");
    r.catalog.set_fail_on_lookup(true).await;

    let outcome = r.engine.resolve_and_add("5012345678900").await.unwrap();
    assert_eq!(
        outcome,
        ResolveOutcome::SearchTerm("5012345678900".to_string())
    );
    assert!(r.engine.cart().is_empty());

    // Projection still works on the untouched cart.
    assert_eq!(r.engine.receipt().total, Decimal::ZERO);
}

#[tokio::test]
async fn projection_is_stable_across_reads() {
    let mut r = register("99");
    r.engine.set_catalog(vec![produce_item("9900001", "4.20")]);
    r.engine.resolve_and_add("9900001007606").await.unwrap();
    r.engine.set_discount_percent("9900001", dec("25")).unwrap();

    let first = r.engine.receipt();
    let second = r.engine.receipt();
    assert_eq!(first, second);
}
