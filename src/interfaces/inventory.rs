//! Batch and serial option interface.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use super::catalog::Result;

/// A batch an item can be sold from, with its remaining quantity.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchOption {
    pub batch_id: String,
    pub qty: Decimal,
}

/// Trait for fetching batch and serial option lists.
///
/// The engine fetches each list once per distinct item code and caches it
/// for the session, so implementations do not need to.
#[async_trait]
pub trait InventoryOptions: Send + Sync {
    /// Batches available for an item.
    async fn batches(&self, item_code: &str) -> Result<Vec<BatchOption>>;

    /// Serial numbers available for an item.
    async fn serials(&self, item_code: &str) -> Result<Vec<String>>;
}
