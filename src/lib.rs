//! Till - point-of-sale register core.
//!
//! Scale-barcode decoding, catalog resolution, cart reconciliation with
//! batch/serial preselects, and a pure pricing projection. Rendering,
//! routing, and document CRUD live elsewhere; remote collaborators are
//! reached through the traits in [`interfaces`].

pub mod cart;
pub mod clients;
pub mod config;
pub mod engine;
pub mod interfaces;
pub mod projection;
pub mod scale;
pub mod scan;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
