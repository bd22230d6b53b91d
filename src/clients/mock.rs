//! Mock collaborators for testing.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::interfaces::catalog::{CatalogLookup, LookupError, ResolvedItem, Result};
use crate::interfaces::inventory::{BatchOption, InventoryOptions};
use crate::interfaces::pricing::{UomPriceSource, UomPricing};

/// Mock catalog lookup backed by an in-memory map.
#[derive(Default)]
pub struct MockCatalog {
    items: RwLock<HashMap<String, ResolvedItem>>,
    fail_on_lookup: RwLock<bool>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item under a lookup code (item code, barcode, batch...).
    pub async fn insert(&self, code: &str, item: ResolvedItem) {
        self.items.write().await.insert(code.to_string(), item);
    }

    pub async fn set_fail_on_lookup(&self, fail: bool) {
        *self.fail_on_lookup.write().await = fail;
    }
}

#[async_trait]
impl CatalogLookup for MockCatalog {
    async fn lookup(&self, code: &str) -> Result<Option<ResolvedItem>> {
        if *self.fail_on_lookup.read().await {
            return Err(LookupError::Connection("mock connection failure".into()));
        }
        Ok(self.items.read().await.get(code).cloned())
    }
}

/// Mock UOM price source with one pricing table per item code.
#[derive(Default)]
pub struct MockPrices {
    pricing: RwLock<HashMap<String, UomPricing>>,
    fail_on_lookup: RwLock<bool>,
    calls: RwLock<u32>,
}

impl MockPrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, item_code: &str, pricing: UomPricing) {
        self.pricing
            .write()
            .await
            .insert(item_code.to_string(), pricing);
    }

    pub async fn set_fail_on_lookup(&self, fail: bool) {
        *self.fail_on_lookup.write().await = fail;
    }

    /// Number of `uoms_and_prices` calls served so far.
    pub async fn calls(&self) -> u32 {
        *self.calls.read().await
    }
}

#[async_trait]
impl UomPriceSource for MockPrices {
    async fn uoms_and_prices(
        &self,
        item_code: &str,
        _customer: Option<&str>,
    ) -> Result<UomPricing> {
        *self.calls.write().await += 1;
        if *self.fail_on_lookup.read().await {
            return Err(LookupError::Connection("mock connection failure".into()));
        }
        self.pricing
            .read()
            .await
            .get(item_code)
            .cloned()
            .ok_or_else(|| LookupError::Backend(format!("no pricing for {item_code}")))
    }
}

/// Mock inventory options with per-item batch and serial lists.
#[derive(Default)]
pub struct MockInventory {
    batches: RwLock<HashMap<String, Vec<BatchOption>>>,
    serials: RwLock<HashMap<String, Vec<String>>>,
    fail_on_lookup: RwLock<bool>,
    batch_calls: RwLock<u32>,
}

impl MockInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_batches(&self, item_code: &str, options: Vec<BatchOption>) {
        self.batches
            .write()
            .await
            .insert(item_code.to_string(), options);
    }

    pub async fn insert_serials(&self, item_code: &str, serials: Vec<String>) {
        self.serials
            .write()
            .await
            .insert(item_code.to_string(), serials);
    }

    pub async fn set_fail_on_lookup(&self, fail: bool) {
        *self.fail_on_lookup.write().await = fail;
    }

    /// Number of `batches` calls served so far; the engine is expected to
    /// cache per item code, so this should stay at one per item.
    pub async fn batch_calls(&self) -> u32 {
        *self.batch_calls.read().await
    }
}

#[async_trait]
impl InventoryOptions for MockInventory {
    async fn batches(&self, item_code: &str) -> Result<Vec<BatchOption>> {
        *self.batch_calls.write().await += 1;
        if *self.fail_on_lookup.read().await {
            return Err(LookupError::Connection("mock connection failure".into()));
        }
        Ok(self
            .batches
            .read()
            .await
            .get(item_code)
            .cloned()
            .unwrap_or_default())
    }

    async fn serials(&self, item_code: &str) -> Result<Vec<String>> {
        if *self.fail_on_lookup.read().await {
            return Err(LookupError::Connection("mock connection failure".into()));
        }
        Ok(self
            .serials
            .read()
            .await
            .get(item_code)
            .cloned()
            .unwrap_or_default())
    }
}
