//! Catalog lookup interface.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Result type for collaborator lookups.
pub type Result<T> = std::result::Result<T, LookupError>;

/// Errors from remote lookup operations.
///
/// The engine absorbs all of these at its boundary: a failed lookup
/// degrades to a miss, it never propagates into cart state.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Could not reach the backend at all.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The backend answered with a non-success status.
    #[error("backend error: {0}")]
    Backend(String),

    /// The response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl LookupError {
    /// Returns true when the failure is transport-level rather than a
    /// backend fault.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, LookupError::Connection(_))
    }
}

/// Inventory-tracking dimension a lookup can match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreselectKind {
    Batch,
    Serial,
}

/// A catalog item resolved by the backend for a scanned or typed code.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolvedItem {
    pub item_code: String,
    pub item_name: String,
    #[serde(default = "default_group")]
    pub item_group: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub available: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub stock_uom: Option<String>,
    /// Set when the backend matched the code against a batch or serial
    /// number rather than the item itself.
    #[serde(default)]
    pub matched_type: Option<String>,
    #[serde(default)]
    pub matched_value: Option<String>,
}

fn default_group() -> String {
    "General".to_string()
}

impl ResolvedItem {
    /// Batch/serial match reported by the backend, when any.
    pub fn matched(&self) -> Option<(PreselectKind, &str)> {
        let value = self.matched_value.as_deref()?;
        match self.matched_type.as_deref()? {
            "batch" => Some((PreselectKind::Batch, value)),
            "serial" => Some((PreselectKind::Serial, value)),
            _ => None,
        }
    }
}

/// Trait for resolving scanned or typed codes against the backend catalog.
///
/// Implement this trait to create mock lookups for testing or alternative
/// transports.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Resolve a code to a catalog item.
    ///
    /// `Ok(None)` is an ordinary miss (free-text search input hits this
    /// constantly); errors are transport or backend faults.
    async fn lookup(&self, code: &str) -> Result<Option<ResolvedItem>>;
}
