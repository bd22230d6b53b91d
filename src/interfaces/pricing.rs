//! UOM price lookup interface.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::catalog::Result;

/// One selling unit of an item with its conversion factor and price.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UomPrice {
    pub uom: String,
    pub conversion_factor: Decimal,
    pub price: Decimal,
}

/// Selling units available for an item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UomPricing {
    pub base_uom: String,
    pub uoms: Vec<UomPrice>,
}

impl UomPricing {
    pub fn price_for(&self, uom: &str) -> Option<Decimal> {
        self.uoms.iter().find(|u| u.uom == uom).map(|u| u.price)
    }
}

/// Trait for per-UOM price resolution.
#[async_trait]
pub trait UomPriceSource: Send + Sync {
    /// Selling units and prices for an item. Prices may be
    /// customer-specific, so the selected customer is passed along when
    /// one is set.
    async fn uoms_and_prices(&self, item_code: &str, customer: Option<&str>)
        -> Result<UomPricing>;
}
