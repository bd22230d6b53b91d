//! Cart reconciliation engine.
//!
//! Bridges scanned/typed input and the cart store: decodes scale barcodes,
//! resolves codes against the local catalog snapshot and the remote lookup,
//! applies the weighed-quantity upsert rule, buffers batch/serial
//! preselects for lines that do not exist yet, and tracks per-line discount
//! and UOM selection state.
//!
//! All remote failures are absorbed at this boundary. A failed lookup
//! degrades to a miss; nothing downstream of the engine can fail.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::cart::{AppliedCoupon, CartStore, CatalogItem};
use crate::config::RegisterConfig;
use crate::interfaces::{
    BatchOption, CatalogLookup, InventoryOptions, PreselectKind, ResolvedItem, UomPriceSource,
};
use crate::projection::{self, Receipt};
use crate::scale::{self, ScaleError};
use crate::scan;

/// UOM assigned to remotely resolved items that report none.
const FALLBACK_UOM: &str = "Nos";

/// Per-line transient selection state, keyed by cart line item code.
///
/// Created lazily on first edit, discarded with the line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineState {
    /// Percentage discount, 0-100. Applied before the fixed amount.
    pub discount_percent: Decimal,
    /// Fixed discount in currency units, applied after the percentage.
    pub discount_amount: Decimal,
    pub batch_no: Option<String>,
    pub serial_no: Option<String>,
    /// Available quantity of the selected batch, captured for downstream
    /// stock validation.
    pub batch_available: Option<Decimal>,
}

/// Batch/serial values captured before their cart line exists.
///
/// Both fields merge independently: a batch and a serial preselect for the
/// same absent line are both retained until consumed.
#[derive(Debug, Clone, Default)]
struct PendingPreselect {
    batch_no: Option<String>,
    serial_no: Option<String>,
}

/// Validation failures surfaced directly to the operator.
///
/// Nothing is mutated when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid scale barcode: {0}")]
    ScaleCheckDigit(#[from] ScaleError),

    #[error("discount percentage {0} outside 0-100")]
    DiscountPercentOutOfRange(Decimal),

    #[error("discount amount {0} is negative")]
    DiscountAmountNegative(Decimal),
}

/// Outcome of resolving one committed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// A cart line was added or its quantity increased.
    Added { item_code: String },
    /// Nothing matched; treat the input as a free-text search term.
    SearchTerm(String),
    /// A scale code decoded but its base resolved to no catalog item.
    NotFound { code: String },
    /// The resolved item has no stock and was not added.
    OutOfStock { item_code: String },
    /// Scanner-only mode is on and the input is not a scale code.
    Ignored,
}

/// Token tying an in-flight UOM price lookup to the selection that issued
/// it. A newer selection for the same line invalidates older tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UomSelection {
    item_code: String,
    uom: String,
    generation: u64,
}

/// The reconciliation engine for one register session.
///
/// Owns the cart store and all per-line transient state; collaborators are
/// injected as trait objects so tests run against mocks and deployments
/// against the HTTP backend client.
pub struct Reconciler {
    cart: CartStore,
    catalog: Vec<CatalogItem>,
    line_state: HashMap<String, LineState>,
    pending: HashMap<String, PendingPreselect>,
    batch_options: HashMap<String, Vec<BatchOption>>,
    serial_options: HashMap<String, Vec<String>>,
    uom_generation: HashMap<String, u64>,
    lookup: Arc<dyn CatalogLookup>,
    prices: Arc<dyn UomPriceSource>,
    inventory: Arc<dyn InventoryOptions>,
    scale_prefix: String,
    scanner_only: bool,
}

impl Reconciler {
    pub fn new(
        config: &RegisterConfig,
        lookup: Arc<dyn CatalogLookup>,
        prices: Arc<dyn UomPriceSource>,
        inventory: Arc<dyn InventoryOptions>,
    ) -> Self {
        Self {
            cart: CartStore::new(),
            catalog: Vec::new(),
            line_state: HashMap::new(),
            pending: HashMap::new(),
            batch_options: HashMap::new(),
            serial_options: HashMap::new(),
            uom_generation: HashMap::new(),
            lookup,
            prices,
            inventory,
            scale_prefix: config.scale_prefix.clone(),
            scanner_only: config.scanner_only_mode,
        }
    }

    /// Replace the local catalog snapshot. The engine never fetches the
    /// snapshot itself; an external refresh hands it in.
    pub fn set_catalog(&mut self, items: Vec<CatalogItem>) {
        self.catalog = items;
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Transient state for a line, when any edit has touched it.
    pub fn line_state(&self, item_code: &str) -> Option<&LineState> {
        self.line_state.get(item_code)
    }

    /// Project the current cart into displayed totals.
    pub fn receipt(&self) -> Receipt {
        projection::project(&self.cart, &self.line_state)
    }

    /// Resolve one committed input line (Enter key or scanner terminator).
    ///
    /// Scale decoding runs first, in strict mode: a corrupted check digit
    /// is a visible rejection. A decoded scale code resolves its 7-digit
    /// base locally, then remotely, and adds the embedded quantity.
    /// Barcode-looking input goes to the remote lookup (unless
    /// scanner-only mode is on); a hit adds quantity one and forwards any
    /// batch/serial match as a preselect, a miss leaves the input as a
    /// search term. Anything else is a search term outright.
    pub async fn resolve_and_add(
        &mut self,
        raw: &str,
    ) -> Result<ResolveOutcome, ValidationError> {
        let raw = raw.trim();
        if let Some(code) = scale::decode_strict(raw, &self.scale_prefix)? {
            return Ok(self.add_scale_code(code).await);
        }

        if self.scanner_only {
            debug!(raw, "scanner-only mode, ignoring non-scale input");
            return Ok(ResolveOutcome::Ignored);
        }

        if !scan::looks_like_barcode(raw) {
            return Ok(ResolveOutcome::SearchTerm(raw.to_string()));
        }

        match self.lookup.lookup(raw).await {
            Ok(Some(resolved)) => {
                let matched = resolved
                    .matched()
                    .map(|(kind, value)| (kind, value.to_string()));
                let item = catalog_item_from(&resolved);
                let original =
                    (item.item_code != raw).then(|| raw.to_string());
                let outcome = self.add_resolved(&item, Decimal::ONE, original).await;
                if let (ResolveOutcome::Added { item_code }, Some((kind, value))) =
                    (&outcome, matched)
                {
                    let item_code = item_code.clone();
                    self.apply_preselect(&item_code, kind, &value).await;
                }
                Ok(outcome)
            }
            Ok(None) => Ok(ResolveOutcome::SearchTerm(raw.to_string())),
            Err(e) => {
                warn!(raw, error = %e, "identifier lookup failed, treating as search");
                Ok(ResolveOutcome::SearchTerm(raw.to_string()))
            }
        }
    }

    /// Add one catalog item with quantity one (grid click path).
    pub async fn add_item(&mut self, item: &CatalogItem) -> ResolveOutcome {
        self.add_resolved(item, Decimal::ONE, None).await
    }

    async fn add_scale_code(&mut self, code: scale::ScaleCode) -> ResolveOutcome {
        if let Some(item) = self.local_item(&code.base).cloned() {
            return self.add_resolved(&item, code.quantity, None).await;
        }
        match self.lookup.lookup(&code.base).await {
            Ok(Some(resolved)) => {
                let item = catalog_item_from(&resolved);
                let original =
                    (item.item_code != code.base).then(|| code.base.clone());
                self.add_resolved(&item, code.quantity, original).await
            }
            Ok(None) => {
                debug!(base = %code.base, "scale base resolved to no item");
                ResolveOutcome::NotFound { code: code.base }
            }
            Err(e) => {
                warn!(base = %code.base, error = %e, "scale base lookup failed");
                ResolveOutcome::NotFound { code: code.base }
            }
        }
    }

    async fn add_resolved(
        &mut self,
        item: &CatalogItem,
        quantity: Decimal,
        original_item_code: Option<String>,
    ) -> ResolveOutcome {
        if item.available <= Decimal::ZERO {
            debug!(item_code = %item.item_code, "item out of stock, not added");
            return ResolveOutcome::OutOfStock {
                item_code: item.item_code.clone(),
            };
        }
        self.cart
            .add_or_set_quantity(item, quantity, original_item_code);
        self.drain_pending().await;
        ResolveOutcome::Added {
            item_code: item.item_code.clone(),
        }
    }

    /// Record a batch or serial selection for a line.
    ///
    /// When the line exists the value lands in its state immediately
    /// (batch selections also capture the batch's available quantity).
    /// When it does not exist yet, the value is buffered and consumed by
    /// the draining pass on the next cart addition.
    pub async fn apply_preselect(&mut self, item_code: &str, kind: PreselectKind, value: &str) {
        if self.cart.contains(item_code) {
            self.write_selection(item_code, kind, value).await;
        } else {
            let entry = self.pending.entry(item_code.to_string()).or_default();
            match kind {
                PreselectKind::Batch => entry.batch_no = Some(value.to_string()),
                PreselectKind::Serial => entry.serial_no = Some(value.to_string()),
            }
            debug!(item_code, ?kind, "preselect buffered for absent cart line");
        }
    }

    async fn write_selection(&mut self, item_code: &str, kind: PreselectKind, value: &str) {
        match kind {
            PreselectKind::Batch => {
                let available = self.batch_available(item_code, value).await;
                let state = self.line_state.entry(item_code.to_string()).or_default();
                state.batch_no = Some(value.to_string());
                state.batch_available = available;
            }
            PreselectKind::Serial => {
                let state = self.line_state.entry(item_code.to_string()).or_default();
                state.serial_no = Some(value.to_string());
            }
        }
    }

    /// Copy buffered preselects into line state for every line that now
    /// exists, deleting the buffered entries.
    async fn drain_pending(&mut self) {
        let ready: Vec<String> = self
            .pending
            .keys()
            .filter(|code| self.cart.contains(code))
            .cloned()
            .collect();
        for item_code in ready {
            let Some(pending) = self.pending.remove(&item_code) else {
                continue;
            };
            if let Some(batch) = pending.batch_no {
                self.write_selection(&item_code, PreselectKind::Batch, &batch)
                    .await;
            }
            if let Some(serial) = pending.serial_no {
                self.write_selection(&item_code, PreselectKind::Serial, &serial)
                    .await;
            }
        }
    }

    /// Batch options for an item, fetched once per item code per session.
    pub async fn batch_options(&mut self, item_code: &str) -> &[BatchOption] {
        if !self.batch_options.contains_key(item_code) {
            let options = match self.inventory.batches(item_code).await {
                Ok(options) => options,
                Err(e) => {
                    warn!(item_code, error = %e, "batch option lookup failed");
                    Vec::new()
                }
            };
            self.batch_options.insert(item_code.to_string(), options);
        }
        &self.batch_options[item_code]
    }

    /// Serial options for an item, fetched once per item code per session.
    pub async fn serial_options(&mut self, item_code: &str) -> &[String] {
        if !self.serial_options.contains_key(item_code) {
            let serials = match self.inventory.serials(item_code).await {
                Ok(serials) => serials,
                Err(e) => {
                    warn!(item_code, error = %e, "serial option lookup failed");
                    Vec::new()
                }
            };
            self.serial_options.insert(item_code.to_string(), serials);
        }
        &self.serial_options[item_code]
    }

    async fn batch_available(&mut self, item_code: &str, batch_id: &str) -> Option<Decimal> {
        self.batch_options(item_code)
            .await
            .iter()
            .find(|b| b.batch_id == batch_id)
            .map(|b| b.qty)
    }

    /// Set a line's percentage discount. Out-of-range values are rejected
    /// without mutating anything; edits to absent lines are dropped.
    pub fn set_discount_percent(
        &mut self,
        item_code: &str,
        percent: Decimal,
    ) -> Result<(), ValidationError> {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(ValidationError::DiscountPercentOutOfRange(percent));
        }
        if !self.cart.contains(item_code) {
            debug!(item_code, "discount edit for absent line dropped");
            return Ok(());
        }
        self.line_state
            .entry(item_code.to_string())
            .or_default()
            .discount_percent = percent;
        Ok(())
    }

    /// Set a line's fixed discount amount. Negative values are rejected.
    pub fn set_discount_amount(
        &mut self,
        item_code: &str,
        amount: Decimal,
    ) -> Result<(), ValidationError> {
        if amount < Decimal::ZERO {
            return Err(ValidationError::DiscountAmountNegative(amount));
        }
        if !self.cart.contains(item_code) {
            debug!(item_code, "discount edit for absent line dropped");
            return Ok(());
        }
        self.line_state
            .entry(item_code.to_string())
            .or_default()
            .discount_amount = amount;
        Ok(())
    }

    /// Start a UOM selection for a line, invalidating any older in-flight
    /// selection for the same line.
    pub fn begin_uom_selection(&mut self, item_code: &str, uom: &str) -> UomSelection {
        let generation = self.uom_generation.entry(item_code.to_string()).or_insert(0);
        *generation += 1;
        UomSelection {
            item_code: item_code.to_string(),
            uom: uom.to_string(),
            generation: *generation,
        }
    }

    /// Apply a completed UOM price lookup.
    ///
    /// The UOM and price land on the line atomically, and only when the
    /// token is still the line's newest selection and the line still
    /// exists; stale responses are discarded. Returns whether the update
    /// was applied.
    pub fn apply_uom_price(&mut self, token: &UomSelection, price: Decimal) -> bool {
        if self.uom_generation.get(&token.item_code).copied() != Some(token.generation) {
            debug!(item_code = %token.item_code, "discarding stale UOM price response");
            return false;
        }
        let Some(line) = self.cart.get_mut(&token.item_code) else {
            debug!(item_code = %token.item_code, "UOM price response for removed line dropped");
            return false;
        };
        line.uom = token.uom.clone();
        line.price = price;
        true
    }

    /// Select a different UOM for a line, fetching its price from the
    /// price source. Failures leave the previous UOM and price unchanged.
    pub async fn select_uom(&mut self, item_code: &str, uom: &str) -> bool {
        if !self.cart.contains(item_code) {
            return false;
        }
        let token = self.begin_uom_selection(item_code, uom);
        let customer = self.cart.customer().map(str::to_string);
        let pricing = match self
            .prices
            .uoms_and_prices(item_code, customer.as_deref())
            .await
        {
            Ok(pricing) => pricing,
            Err(e) => {
                warn!(item_code, uom, error = %e, "UOM price lookup failed, keeping previous price");
                return false;
            }
        };
        match pricing.price_for(&token.uom) {
            Some(price) => self.apply_uom_price(&token, price),
            None => {
                warn!(item_code, uom, "backend reports no price for UOM");
                false
            }
        }
    }

    /// Set a line's quantity; zero or negative removes the line and its
    /// transient state.
    pub fn update_quantity(&mut self, item_code: &str, quantity: Decimal) {
        if self.cart.update_quantity(item_code, quantity).is_some() {
            self.discard_line_state(item_code);
        }
    }

    /// Remove a line and its transient state.
    pub fn remove_line(&mut self, item_code: &str) {
        if self.cart.remove(item_code).is_some() {
            self.discard_line_state(item_code);
        }
    }

    /// Empty the cart. Discount state, buffered preselects, and UOM
    /// generations go with it; fetched option lists stay cached for the
    /// session.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.line_state.clear();
        self.pending.clear();
        self.uom_generation.clear();
    }

    pub fn apply_coupon(&mut self, coupon: AppliedCoupon) -> bool {
        self.cart.apply_coupon(coupon)
    }

    pub fn remove_coupon(&mut self, code: &str) -> bool {
        self.cart.remove_coupon(code)
    }

    pub fn set_customer(&mut self, customer: Option<String>) {
        self.cart.set_customer(customer);
    }

    fn discard_line_state(&mut self, item_code: &str) {
        self.line_state.remove(item_code);
        self.uom_generation.remove(item_code);
    }

    fn local_item(&self, code: &str) -> Option<&CatalogItem> {
        self.catalog
            .iter()
            .find(|i| i.item_code == code || i.barcode.as_deref() == Some(code))
    }
}

fn catalog_item_from(resolved: &ResolvedItem) -> CatalogItem {
    CatalogItem {
        item_code: resolved.item_code.clone(),
        item_name: resolved.item_name.clone(),
        item_group: resolved.item_group.clone(),
        price: resolved.price,
        available: resolved.available,
        stock_uom: resolved
            .stock_uom
            .clone()
            .unwrap_or_else(|| FALLBACK_UOM.to_string()),
        barcode: None,
    }
}
