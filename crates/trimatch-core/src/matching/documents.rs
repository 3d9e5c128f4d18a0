//! Document-level checks: duplicate detection, reference resolution, and
//! timing. These run before any item-level check because item comparisons
//! are meaningless without valid related documents.

use crate::exceptions::MatchException;
use crate::models::document::{Document, DocumentKind};

use super::InvoiceKey;

/// True when the invoice's (vendor, invoice id) pair was already accepted.
pub fn is_duplicate(invoice: &Document, accepted: &[InvoiceKey]) -> bool {
    accepted
        .iter()
        .any(|key| key.vendor == invoice.vendor && key.invoice_id == invoice.id)
}

/// Resolve a reference list against the supplied documents, in reference
/// order.
pub fn resolve<'a>(refs: &[String], docs: &'a [Document]) -> Vec<&'a Document> {
    refs.iter()
        .filter_map(|r| docs.iter().find(|d| &d.id == r))
        .collect()
}

/// One exception per reference that resolves to nothing. An invoice with
/// no references at all is a legitimate non-PO invoice and raises nothing.
pub fn check_references(
    invoice: &Document,
    purchase_orders: &[Document],
    goods_receipts: &[Document],
) -> Vec<MatchException> {
    let mut exceptions = Vec::new();

    for reference in &invoice.po_refs {
        if !purchase_orders.iter().any(|d| &d.id == reference) {
            exceptions.push(MatchException::MissingDocument {
                kind: DocumentKind::PurchaseOrder,
                reference: reference.clone(),
            });
        }
    }
    for reference in &invoice.grn_refs {
        if !goods_receipts.iter().any(|d| &d.id == reference) {
            exceptions.push(MatchException::MissingDocument {
                kind: DocumentKind::GoodsReceipt,
                reference: reference.clone(),
            });
        }
    }

    exceptions
}

/// Dates must be non-decreasing along PO -> GRN -> Invoice. Each violating
/// pair raises its own exception, in document order. When no GRN is
/// involved the PO is checked against the invoice directly.
pub fn check_timing(
    invoice: &Document,
    purchase_orders: &[&Document],
    goods_receipts: &[&Document],
) -> Vec<MatchException> {
    let mut exceptions = Vec::new();

    for po in purchase_orders {
        for grn in goods_receipts {
            if po.issue_date > grn.issue_date {
                exceptions.push(out_of_order(po, grn));
            }
        }
        if goods_receipts.is_empty() && po.issue_date > invoice.issue_date {
            exceptions.push(out_of_order(po, invoice));
        }
    }
    for grn in goods_receipts {
        if grn.issue_date > invoice.issue_date {
            exceptions.push(out_of_order(grn, invoice));
        }
    }

    exceptions
}

fn out_of_order(preceding: &Document, following: &Document) -> MatchException {
    MatchException::TimingMismatch {
        preceding: preceding.kind,
        preceding_id: preceding.id.clone(),
        preceding_date: preceding.issue_date,
        following: following.kind,
        following_id: following.id.clone(),
        following_date: following.issue_date,
    }
}
