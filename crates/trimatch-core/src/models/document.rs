//! Document models for the 3-way match: purchase orders, goods receipt
//! notes, and vendor invoices share one representation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::normalize::CanonicalUnit;

/// Kind of business document participating in the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Buyer's commitment to purchase (PO).
    PurchaseOrder,
    /// Record of goods actually received (GRN).
    GoodsReceipt,
    /// Vendor invoice requesting payment.
    Invoice,
}

impl DocumentKind {
    /// Stable snake_case name, used in exception details.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::PurchaseOrder => "purchase_order",
            DocumentKind::GoodsReceipt => "goods_receipt",
            DocumentKind::Invoice => "invoice",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A business document (PO, GRN, or invoice).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier (PO number, GRN number, invoice number).
    pub id: String,

    /// Document kind.
    pub kind: DocumentKind,

    /// Vendor reference (name or vendor code).
    pub vendor: String,

    /// Date the document was issued.
    pub issue_date: NaiveDate,

    /// Ordered sequence of line items.
    #[serde(default)]
    pub line_items: Vec<LineItem>,

    /// Document-level subtotal, if stated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<f64>,

    /// Document-level grand total, if stated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grand_total: Option<f64>,

    /// Purchase orders this document references (invoices and GRNs).
    /// Empty is valid: a non-PO service invoice references nothing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub po_refs: Vec<String>,

    /// Goods receipt notes this document references (invoices).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grn_refs: Vec<String>,
}

impl Document {
    /// True if the document carries a line that resolves against `line`.
    pub fn has_line(&self, line: &LineItem) -> bool {
        self.find_line(line).is_some()
    }

    /// Find the line that resolves against `line`: by catalog key first,
    /// falling back to the description. The fallback keeps a line with a
    /// SKU on only one side resolvable when the descriptions agree.
    pub fn find_line(&self, line: &LineItem) -> Option<&LineItem> {
        if let Some(sku) = line.sku_key() {
            if let Some(found) = self
                .line_items
                .iter()
                .find(|li| li.sku_key().as_deref() == Some(sku.as_str()))
            {
                return Some(found);
            }
        }
        let description = line.description_key();
        self.line_items
            .iter()
            .find(|li| li.description_key() == description)
    }
}

/// A single line item on a document.
///
/// The original fields are never rewritten; normalization only fills the
/// `normalized_*` fields, which makes [`crate::normalize::normalize_line`]
/// trivially idempotent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItem {
    /// Product/service description.
    pub description: String,

    /// Catalog key (SKU, EAN, internal product code).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    /// Generic quantity field (invoices mostly use this).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,

    /// Quantity ordered (PO lines).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordered_quantity: Option<f64>,

    /// Quantity received (GRN lines).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_quantity: Option<f64>,

    /// Unit of measure as written on the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Unit price in the original unit of measure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,

    /// Stated line total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_total: Option<f64>,

    /// Canonical quantity (kg for weight, count for pieces).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_quantity: Option<f64>,

    /// Canonical unit the normalized quantity is expressed in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_unit: Option<CanonicalUnit>,

    /// Price per unit of normalized quantity, derived so that
    /// `normalized_quantity * normalized_unit_price` equals the original
    /// extended amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_unit_price: Option<f64>,
}

impl LineItem {
    /// Quantity under the prioritized field lookup: generic quantity
    /// first, then ordered, then received. Lets one normalizer handle
    /// PO, GRN, and invoice lines despite their differing field names.
    pub fn effective_quantity(&self) -> Option<f64> {
        self.quantity
            .or(self.ordered_quantity)
            .or(self.received_quantity)
    }

    /// Normalized catalog key, when the line carries a non-blank SKU.
    pub fn sku_key(&self) -> Option<String> {
        self.sku
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Normalized description key.
    pub fn description_key(&self) -> String {
        self.description.trim().to_lowercase()
    }

    /// Key identifying this line in cumulative billing state: the SKU
    /// when present, otherwise the trimmed, lowercased description.
    pub fn match_key(&self) -> String {
        self.sku_key().unwrap_or_else(|| self.description_key())
    }

    /// Best available comparison quantity: normalized when the
    /// normalizer recognized the unit, raw otherwise.
    pub fn comparison_quantity(&self) -> Option<f64> {
        self.normalized_quantity.or_else(|| self.effective_quantity())
    }

    /// Best available comparison unit price.
    pub fn comparison_unit_price(&self) -> Option<f64> {
        self.normalized_unit_price.or(self.unit_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(description: &str, sku: Option<&str>) -> LineItem {
        LineItem {
            description: description.to_string(),
            sku: sku.map(String::from),
            ..LineItem::default()
        }
    }

    #[test]
    fn test_match_key_prefers_sku() {
        assert_eq!(line("Steel Rod 10mm", Some("SKU-42")).match_key(), "sku-42");
        assert_eq!(line("Steel Rod 10mm", None).match_key(), "steel rod 10mm");
        // Blank SKU falls back to the description.
        assert_eq!(line(" Steel Rod ", Some("  ")).match_key(), "steel rod");
        assert_eq!(line(" Steel Rod ", Some("  ")).sku_key(), None);
    }

    #[test]
    fn test_effective_quantity_priority() {
        let mut li = line("widget", None);
        li.received_quantity = Some(8.0);
        assert_eq!(li.effective_quantity(), Some(8.0));
        li.ordered_quantity = Some(9.0);
        assert_eq!(li.effective_quantity(), Some(9.0));
        li.quantity = Some(10.0);
        assert_eq!(li.effective_quantity(), Some(10.0));
    }

    #[test]
    fn test_document_find_line() {
        let doc = Document {
            id: "PO-1".to_string(),
            kind: DocumentKind::PurchaseOrder,
            vendor: "Acme".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            line_items: vec![line("Bolt M8", Some("B-8")), line("Nut M8", None)],
            subtotal: None,
            grand_total: None,
            po_refs: Vec::new(),
            grn_refs: Vec::new(),
        };
        // Catalog key wins when both sides carry one.
        let by_sku = line("renamed on invoice", Some("B-8"));
        assert_eq!(doc.find_line(&by_sku).unwrap().description, "Bolt M8");

        // A query without a SKU resolves by description.
        assert!(doc.has_line(&line("bolt m8", None)));
        assert!(doc.has_line(&line(" NUT M8 ", None)));

        // A query whose SKU matches nothing still falls back to the
        // description.
        assert!(doc.has_line(&line("Nut M8", Some("N-8"))));

        assert!(!doc.has_line(&line("Washer M8", None)));
    }
}
