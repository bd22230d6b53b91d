//! HTTP backend client.
//!
//! Implements the collaborator interfaces against the backend's
//! `/api/method/...` REST endpoints. Responses arrive wrapped in a
//! `{"message": ...}` envelope. Failed or timed-out requests map into
//! [`LookupError`]; no retries here, the engine treats failures as misses.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::interfaces::catalog::{CatalogLookup, LookupError, ResolvedItem, Result};
use crate::interfaces::inventory::{BatchOption, InventoryOptions};
use crate::interfaces::pricing::{UomPriceSource, UomPricing};

const LOOKUP_METHOD: &str = "pos.api.item.get_item_by_barcode";
const UOM_METHOD: &str = "pos.api.item.get_item_uoms";
const BATCH_METHOD: &str = "pos.api.item.get_batch_options";
const SERIAL_METHOD: &str = "pos.api.item.get_serial_options";

/// Backend connection settings.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Base URL, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Envelope<T> {
    #[serde(default)]
    message: Option<T>,
}

/// HTTP client implementing all three collaborator interfaces.
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(settings: BackendSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| LookupError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>> {
        let url = format!("{}/api/method/{}", self.base_url, method);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Backend(format!(
                "{method} returned {status}"
            )));
        }

        let envelope: Envelope<T> = response.json().await.map_err(classify)?;
        Ok(envelope.message)
    }
}

fn classify(e: reqwest::Error) -> LookupError {
    if e.is_connect() || e.is_timeout() {
        LookupError::Connection(e.to_string())
    } else if e.is_decode() {
        LookupError::Decode(e.to_string())
    } else {
        LookupError::Backend(e.to_string())
    }
}

#[async_trait::async_trait]
impl CatalogLookup for BackendClient {
    async fn lookup(&self, code: &str) -> Result<Option<ResolvedItem>> {
        // The backend signals a miss with an absent message or one that
        // carries no item code, so sniff before deserializing.
        let message: Option<serde_json::Value> =
            self.call(LOOKUP_METHOD, &[("barcode", code)]).await?;
        let Some(value) = message else {
            return Ok(None);
        };
        match value.get("item_code").and_then(|c| c.as_str()) {
            Some(code) if !code.is_empty() => {}
            _ => return Ok(None),
        }
        let resolved: ResolvedItem =
            serde_json::from_value(value).map_err(|e| LookupError::Decode(e.to_string()))?;
        Ok(Some(resolved))
    }
}

#[async_trait::async_trait]
impl UomPriceSource for BackendClient {
    async fn uoms_and_prices(
        &self,
        item_code: &str,
        customer: Option<&str>,
    ) -> Result<UomPricing> {
        let mut query = vec![("item_code", item_code)];
        if let Some(customer) = customer {
            query.push(("customer", customer));
        }
        self.call(UOM_METHOD, &query)
            .await?
            .ok_or_else(|| LookupError::Decode("empty UOM pricing response".into()))
    }
}

#[async_trait::async_trait]
impl InventoryOptions for BackendClient {
    async fn batches(&self, item_code: &str) -> Result<Vec<BatchOption>> {
        Ok(self
            .call(BATCH_METHOD, &[("item_code", item_code)])
            .await?
            .unwrap_or_default())
    }

    async fn serials(&self, item_code: &str) -> Result<Vec<String>> {
        Ok(self
            .call(SERIAL_METHOD, &[("item_code", item_code)])
            .await?
            .unwrap_or_default())
    }
}
