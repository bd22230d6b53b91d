//! Cart store.
//!
//! Owns the canonical cart lines for one register session. One line per
//! item code: adding an item that is already in the cart mutates the
//! existing line instead of creating a duplicate. Applied gift coupons and
//! the selected customer live here too, since clearing the cart resets all
//! three together.

use rust_decimal::Decimal;
use serde::Deserialize;

/// An item from the catalog snapshot, immutable from the register's
/// perspective.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogItem {
    pub item_code: String,
    pub item_name: String,
    pub item_group: String,
    /// Selling price in the item's base UOM.
    pub price: Decimal,
    /// Stock on hand; items at or below zero are not sold.
    pub available: Decimal,
    /// Base unit of measure, e.g. "Nos" or "Kg".
    pub stock_uom: String,
    /// Barcode distinct from the item code, when one is assigned.
    #[serde(default)]
    pub barcode: Option<String>,
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item_code: String,
    pub item_name: String,
    pub item_group: String,
    /// Unit price for the currently selected UOM.
    pub price: Decimal,
    /// May be fractional for weighed items.
    pub quantity: Decimal,
    /// Currently selected unit of measure.
    pub uom: String,
    /// Code the backend originally matched when it differs from
    /// `item_code` (scale bases, alternate barcodes); used for follow-up
    /// lookups.
    pub original_item_code: Option<String>,
}

/// A gift coupon applied to the cart. Coupons carry a fixed value and are
/// deduplicated by code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppliedCoupon {
    pub code: String,
    pub value: Decimal,
    #[serde(default)]
    pub description: String,
}

/// Canonical cart state for one register session.
#[derive(Debug, Default)]
pub struct CartStore {
    lines: Vec<CartLine>,
    coupons: Vec<AppliedCoupon>,
    customer: Option<String>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains(&self, item_code: &str) -> bool {
        self.get(item_code).is_some()
    }

    pub fn get(&self, item_code: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.item_code == item_code)
    }

    pub fn get_mut(&mut self, item_code: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.item_code == item_code)
    }

    /// Add `quantity` of `item` to the cart.
    ///
    /// An existing line accumulates: repeated scans of the same scale code
    /// add their weights together. A fresh line lands at exactly
    /// `quantity`, not `1 + quantity`. The asymmetry is intentional: each
    /// scan is one weighed parcel, and the first parcel's weight is the
    /// line's starting quantity.
    pub fn add_or_set_quantity(
        &mut self,
        item: &CatalogItem,
        quantity: Decimal,
        original_item_code: Option<String>,
    ) {
        if let Some(line) = self.get_mut(&item.item_code) {
            line.quantity += quantity;
            return;
        }
        self.lines.push(CartLine {
            item_code: item.item_code.clone(),
            item_name: item.item_name.clone(),
            item_group: item.item_group.clone(),
            price: item.price,
            quantity,
            uom: item.stock_uom.clone(),
            original_item_code,
        });
    }

    /// Set a line's quantity. Zero or negative removes the line.
    ///
    /// Returns the removed line, or `None` when the quantity was updated in
    /// place or no such line exists.
    pub fn update_quantity(&mut self, item_code: &str, quantity: Decimal) -> Option<CartLine> {
        if quantity <= Decimal::ZERO {
            return self.remove(item_code);
        }
        if let Some(line) = self.get_mut(item_code) {
            line.quantity = quantity;
        }
        None
    }

    pub fn remove(&mut self, item_code: &str) -> Option<CartLine> {
        let idx = self.lines.iter().position(|l| l.item_code == item_code)?;
        Some(self.lines.remove(idx))
    }

    /// Empty the cart: lines, coupons, and the selected customer.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.coupons.clear();
        self.customer = None;
    }

    /// Apply a coupon. Returns `false` when its code is already applied.
    pub fn apply_coupon(&mut self, coupon: AppliedCoupon) -> bool {
        if self.coupons.iter().any(|c| c.code == coupon.code) {
            return false;
        }
        self.coupons.push(coupon);
        true
    }

    pub fn remove_coupon(&mut self, code: &str) -> bool {
        let before = self.coupons.len();
        self.coupons.retain(|c| c.code != code);
        self.coupons.len() != before
    }

    pub fn coupons(&self) -> &[AppliedCoupon] {
        &self.coupons
    }

    pub fn set_customer(&mut self, customer: Option<String>) {
        self.customer = customer;
    }

    /// Selected customer, consulted for customer-specific UOM prices.
    pub fn customer(&self) -> Option<&str> {
        self.customer.as_deref()
    }
}

#[cfg(test)]
mod tests;
