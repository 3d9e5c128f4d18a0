//! Unit-of-measure normalization.
//!
//! Makes cross-document comparison possible by expressing every weight
//! quantity in kilograms and every count quantity in pieces, and deriving
//! the matching per-canonical-unit price. Normalization is pure and total:
//! it never fails, and an unrecognized unit passes through unchanged so
//! downstream matching still proceeds on whatever data exists.

pub mod units;

pub use units::{CanonicalUnit, UnitClass, classify};

use tracing::debug;

use crate::models::document::{Document, LineItem};

/// Normalize a single line item.
///
/// Original fields are left untouched; only the `normalized_*` fields are
/// filled, which makes the operation idempotent. A line without any usable
/// quantity, or with an unrecognized unit, is returned unchanged.
pub fn normalize_line(item: &LineItem) -> LineItem {
    let mut out = item.clone();

    let Some(quantity) = item.effective_quantity() else {
        return out;
    };
    let unit = item.unit.as_deref().unwrap_or("");

    let (normalized_quantity, normalized_unit) = match classify(unit) {
        UnitClass::Weight(factor) => (quantity * factor, CanonicalUnit::Kg),
        UnitClass::Count => (quantity, CanonicalUnit::Pcs),
        UnitClass::Unrecognized => {
            if !unit.trim().is_empty() {
                debug!(unit, description = %item.description, "unrecognized unit, passing through");
            }
            return out;
        }
    };

    out.normalized_quantity = Some(normalized_quantity);
    out.normalized_unit = Some(normalized_unit);

    // Preserve the extended amount: normalized_quantity * normalized_price
    // must equal original_quantity * original_price.
    if let Some(unit_price) = item.unit_price {
        out.normalized_unit_price = Some(if normalized_quantity == 0.0 {
            0.0
        } else {
            (quantity * unit_price) / normalized_quantity
        });
    }

    out
}

/// Normalize every line item of a document.
pub fn normalize_document(doc: &Document) -> Document {
    let mut out = doc.clone();
    out.line_items = doc.line_items.iter().map(normalize_line).collect();
    out
}
