//! The 3-way matching engine.
//!
//! [`match_invoice`] classifies one invoice as matched or exception-bearing
//! against its resolved purchase orders and goods receipts. The engine is a
//! pure function over its arguments: all external state (resolved
//! documents, already-accepted invoices, cumulative billed quantities)
//! arrives in a [`MatchContext`] supplied by the caller. Matching runs for
//! different invoices are independent; runs against the same PO must be
//! serialized by the caller so the cumulative-quantity inputs stay correct.

pub mod documents;
pub mod items;
pub mod totals;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MatchError, Result};
use crate::models::document::{Document, DocumentKind};
use crate::models::policy::TolerancePolicy;
use crate::models::result::MatchResult;
use crate::normalize::normalize_document;

/// Identity of an already-accepted invoice, for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceKey {
    /// Vendor reference as written on the invoice.
    pub vendor: String,
    /// Invoice identifier.
    pub invoice_id: String,
}

/// External state for one match run, assembled by the caller.
///
/// The engine never queries live storage; read-consistency (in particular
/// serializing concurrent submissions against one PO) is the calling
/// layer's transaction boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchContext {
    /// Documents the invoice's `po_refs` may resolve against.
    #[serde(default)]
    pub purchase_orders: Vec<Document>,

    /// Documents the invoice's `grn_refs` may resolve against.
    #[serde(default)]
    pub goods_receipts: Vec<Document>,

    /// (vendor, invoice id) pairs of invoices already accepted.
    #[serde(default)]
    pub accepted_invoices: Vec<InvoiceKey>,

    /// Cumulative normalized quantity already invoiced per PO line,
    /// keyed by the line match key (SKU or lowercased description).
    #[serde(default)]
    pub billed_quantities: HashMap<String, f64>,
}

/// Match one invoice against its related documents.
///
/// Business exceptions are collected into the returned [`MatchResult`];
/// an `Err` means the match could not be computed at all (malformed
/// input), which is a fault, not a reconciliation outcome.
pub fn match_invoice(
    invoice: &Document,
    ctx: &MatchContext,
    policy: &TolerancePolicy,
) -> Result<MatchResult> {
    validate_invoice(invoice)?;

    let invoice = normalize_document(invoice);
    let purchase_orders: Vec<Document> =
        ctx.purchase_orders.iter().map(normalize_document).collect();
    let goods_receipts: Vec<Document> =
        ctx.goods_receipts.iter().map(normalize_document).collect();

    // The duplicate signal dominates: a duplicate is not additionally
    // quantity- or price-mismatched.
    if documents::is_duplicate(&invoice, &ctx.accepted_invoices) {
        info!(invoice_id = %invoice.id, "duplicate invoice");
        return Ok(MatchResult::new(
            invoice.id.clone(),
            vec![crate::exceptions::MatchException::DuplicateInvoice {
                vendor: invoice.vendor.clone(),
                invoice_id: invoice.id.clone(),
            }],
        ));
    }

    let mut exceptions = Vec::new();

    let missing = documents::check_references(&invoice, &purchase_orders, &goods_receipts);
    let references_resolved = missing.is_empty();
    exceptions.extend(missing);

    let resolved_pos = documents::resolve(&invoice.po_refs, &purchase_orders);
    let resolved_grns = documents::resolve(&invoice.grn_refs, &goods_receipts);

    exceptions.extend(documents::check_timing(&invoice, &resolved_pos, &resolved_grns));

    // Item-level checks are meaningless against an incomplete document
    // set; the totals check below is invoice-internal and still runs.
    if references_resolved {
        exceptions.extend(items::check_lines(
            &invoice,
            &resolved_pos,
            &resolved_grns,
            &ctx.billed_quantities,
            policy,
        ));
    } else {
        debug!(invoice_id = %invoice.id, "skipping item checks, unresolved references");
    }

    exceptions.extend(totals::check_totals(&invoice));

    info!(
        invoice_id = %invoice.id,
        exceptions = exceptions.len(),
        "match run complete"
    );
    Ok(MatchResult::new(invoice.id.clone(), exceptions))
}

/// Fault guard: reject input the engine cannot meaningfully score.
fn validate_invoice(invoice: &Document) -> Result<()> {
    if invoice.kind != DocumentKind::Invoice {
        return Err(MatchError::InvalidRequest(format!(
            "expected an invoice, got {}",
            invoice.kind
        )));
    }
    if invoice.id.trim().is_empty() {
        return Err(MatchError::MalformedDocument {
            id: "<unknown>".to_string(),
            reason: "invoice has no identifier".to_string(),
        });
    }
    if invoice.line_items.is_empty() {
        return Err(MatchError::MalformedDocument {
            id: invoice.id.clone(),
            reason: "invoice has no line items".to_string(),
        });
    }
    for line in &invoice.line_items {
        let finite = [
            line.quantity,
            line.ordered_quantity,
            line.received_quantity,
            line.unit_price,
            line.line_total,
        ]
        .into_iter()
        .flatten()
        .all(f64::is_finite);
        if !finite {
            return Err(MatchError::MalformedDocument {
                id: invoice.id.clone(),
                reason: format!("non-finite value on line '{}'", line.description),
            });
        }
    }
    Ok(())
}
