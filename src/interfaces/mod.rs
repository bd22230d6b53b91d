//! Abstract interfaces for register collaborators.
//!
//! These traits define the contracts for:
//! - Catalog lookup (resolving scanned/typed codes to items)
//! - UOM pricing (per-unit, optionally customer-specific prices)
//! - Inventory options (batch and serial lists per item)
//!
//! The engine only ever talks to collaborators through these traits; the
//! HTTP-backed and mock implementations live in [`crate::clients`].

pub mod catalog;
pub mod inventory;
pub mod pricing;

pub use catalog::{CatalogLookup, LookupError, PreselectKind, ResolvedItem};
pub use inventory::{BatchOption, InventoryOptions};
pub use pricing::{UomPrice, UomPriceSource, UomPricing};
