//! Item-level checks: line resolution, quantity ceilings, and price
//! variance. All quantities and prices compared here are the normalized
//! values when the unit was recognized, raw values otherwise.

use std::collections::HashMap;

use tracing::debug;

use crate::exceptions::MatchException;
use crate::models::document::{Document, DocumentKind, LineItem};
use crate::models::policy::TolerancePolicy;

/// Run all item-level checks for one normalized invoice against its
/// resolved documents. `billed_quantities` maps a PO line match key to the
/// cumulative normalized quantity already invoiced against it.
///
/// When several resolved POs carry the same line, the first in reference
/// order supplies the ordered quantity and price.
pub fn check_lines(
    invoice: &Document,
    purchase_orders: &[&Document],
    goods_receipts: &[&Document],
    billed_quantities: &HashMap<String, f64>,
    policy: &TolerancePolicy,
) -> Vec<MatchException> {
    let mut exceptions = Vec::new();

    for line in &invoice.line_items {
        debug!(key = %line.match_key(), "checking invoice line");

        let po_line = find_line(purchase_orders, line);
        if !purchase_orders.is_empty() && po_line.is_none() {
            exceptions.push(MatchException::ItemMismatch {
                description: line.description.clone(),
                missing_from: DocumentKind::PurchaseOrder,
                searched: ids(purchase_orders),
            });
        }

        let grn_line = find_line(goods_receipts, line);
        if !goods_receipts.is_empty() && grn_line.is_none() {
            exceptions.push(MatchException::ItemMismatch {
                description: line.description.clone(),
                missing_from: DocumentKind::GoodsReceipt,
                searched: ids(goods_receipts),
            });
        }

        let invoiced = line.comparison_quantity();

        if let (Some(po_line), Some(invoiced)) = (po_line, invoiced) {
            if let Some(ordered) = po_line.comparison_quantity() {
                // Billing state is keyed by the PO line, which may carry a
                // SKU the invoice line lacks.
                let previously_billed = billed_quantities
                    .get(&po_line.match_key())
                    .copied()
                    .unwrap_or(0.0);
                if policy.exceeds_quantity(previously_billed + invoiced, ordered) {
                    exceptions.push(MatchException::OverBilling {
                        description: line.description.clone(),
                        ordered_quantity: ordered,
                        previously_billed,
                        invoiced_quantity: invoiced,
                        tolerance_percent: policy.quantity_tolerance_percent,
                    });
                }
            }
        }

        if let (Some(grn_line), Some(invoiced)) = (grn_line, invoiced) {
            if let Some(received) = grn_line.comparison_quantity() {
                if policy.exceeds_quantity(invoiced, received) {
                    exceptions.push(MatchException::QuantityMismatch {
                        description: line.description.clone(),
                        invoiced_quantity: invoiced,
                        received_quantity: received,
                        tolerance_percent: policy.quantity_tolerance_percent,
                    });
                }
            }
        }

        if let Some(po_line) = po_line {
            if let (Some(po_price), Some(invoice_price)) =
                (po_line.comparison_unit_price(), line.comparison_unit_price())
            {
                if !policy.within_price_tolerance(po_price, invoice_price) {
                    exceptions.push(MatchException::PriceMismatch {
                        description: line.description.clone(),
                        po_price,
                        invoice_price,
                        variance_percent: TolerancePolicy::variance_percent(
                            po_price,
                            invoice_price,
                        ),
                        tolerance_percent: policy.price_tolerance_percent,
                    });
                }
            }
        }
    }

    exceptions
}

fn find_line<'a>(docs: &[&'a Document], line: &LineItem) -> Option<&'a LineItem> {
    docs.iter().find_map(|doc| doc.find_line(line))
}

fn ids(docs: &[&Document]) -> Vec<String> {
    docs.iter().map(|d| d.id.clone()).collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::exceptions::ExceptionKind;
    use crate::normalize::normalize_document;

    fn doc(id: &str, kind: DocumentKind, lines: Vec<LineItem>) -> Document {
        normalize_document(&Document {
            id: id.to_string(),
            kind,
            vendor: "Acme".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            line_items: lines,
            subtotal: None,
            grand_total: None,
            po_refs: Vec::new(),
            grn_refs: Vec::new(),
        })
    }

    fn line(description: &str, quantity: f64, unit: &str, unit_price: f64) -> LineItem {
        LineItem {
            description: description.to_string(),
            quantity: Some(quantity),
            unit: Some(unit.to_string()),
            unit_price: Some(unit_price),
            ..LineItem::default()
        }
    }

    #[test]
    fn test_clean_line_raises_nothing() {
        let po = doc(
            "PO-1",
            DocumentKind::PurchaseOrder,
            vec![line("Bolt M8", 100.0, "pcs", 2.0)],
        );
        let invoice = doc(
            "INV-1",
            DocumentKind::Invoice,
            vec![line("Bolt M8", 100.0, "pcs", 2.0)],
        );
        let exceptions = check_lines(
            &invoice,
            &[&po],
            &[],
            &HashMap::new(),
            &TolerancePolicy::default(),
        );
        assert!(exceptions.is_empty());
    }

    #[test]
    fn test_unresolvable_item() {
        let po = doc(
            "PO-1",
            DocumentKind::PurchaseOrder,
            vec![line("Bolt M8", 100.0, "pcs", 2.0)],
        );
        let invoice = doc(
            "INV-1",
            DocumentKind::Invoice,
            vec![line("Washer M8", 100.0, "pcs", 0.5)],
        );
        let exceptions = check_lines(
            &invoice,
            &[&po],
            &[],
            &HashMap::new(),
            &TolerancePolicy::default(),
        );
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].kind(), ExceptionKind::ItemMismatch);
        assert_eq!(exceptions[0].details()["missing_from"], "purchase_order");
    }

    #[test]
    fn test_cross_unit_quantity_comparison() {
        // PO orders 2 tonnes; invoice bills 2200 kg. Same family, 10% over.
        let po = doc(
            "PO-1",
            DocumentKind::PurchaseOrder,
            vec![line("Steel coil", 2.0, "tonnes", 500.0)],
        );
        let invoice = doc(
            "INV-1",
            DocumentKind::Invoice,
            vec![line("Steel coil", 2200.0, "kg", 0.5)],
        );
        let exceptions = check_lines(
            &invoice,
            &[&po],
            &[],
            &HashMap::new(),
            &TolerancePolicy::default(),
        );
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].kind(), ExceptionKind::OverBilling);
        let details = exceptions[0].details();
        assert_eq!(details["ordered_quantity"], 2000.0);
        assert_eq!(details["invoiced_quantity"], 2200.0);
    }

    #[test]
    fn test_cumulative_over_billing() {
        let po = doc(
            "PO-1",
            DocumentKind::PurchaseOrder,
            vec![line("Bolt M8", 100.0, "pcs", 2.0)],
        );
        let policy = TolerancePolicy::default();

        // First invoice for 60 pcs: fine.
        let first = doc(
            "INV-1",
            DocumentKind::Invoice,
            vec![line("Bolt M8", 60.0, "pcs", 2.0)],
        );
        assert!(check_lines(&first, &[&po], &[], &HashMap::new(), &policy).is_empty());

        // Second invoice for 50 pcs with 60 already billed: 110 > 100.
        let second = doc(
            "INV-2",
            DocumentKind::Invoice,
            vec![line("Bolt M8", 50.0, "pcs", 2.0)],
        );
        let billed = HashMap::from([("bolt m8".to_string(), 60.0)]);
        let exceptions = check_lines(&second, &[&po], &[], &billed, &policy);
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].kind(), ExceptionKind::OverBilling);
        assert_eq!(exceptions[0].details()["previously_billed"], 60.0);
    }

    #[test]
    fn test_grn_quantity_mismatch() {
        let po = doc(
            "PO-1",
            DocumentKind::PurchaseOrder,
            vec![line("Bolt M8", 100.0, "pcs", 2.0)],
        );
        let grn_line = LineItem {
            description: "Bolt M8".to_string(),
            unit: Some("pcs".to_string()),
            received_quantity: Some(40.0),
            ..LineItem::default()
        };
        let grn = doc("GRN-1", DocumentKind::GoodsReceipt, vec![grn_line]);

        let invoice = doc(
            "INV-1",
            DocumentKind::Invoice,
            vec![line("Bolt M8", 50.0, "pcs", 2.0)],
        );
        let exceptions = check_lines(
            &invoice,
            &[&po],
            &[&grn],
            &HashMap::new(),
            &TolerancePolicy::default(),
        );
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].kind(), ExceptionKind::QuantityMismatch);
        let details = exceptions[0].details();
        assert_eq!(details["invoiced_quantity"], 50.0);
        assert_eq!(details["received_quantity"], 40.0);
    }

    #[test]
    fn test_price_variance_details() {
        let po = doc(
            "PO-1",
            DocumentKind::PurchaseOrder,
            vec![line("Bolt M8", 100.0, "pcs", 100.0)],
        );
        let invoice = doc(
            "INV-1",
            DocumentKind::Invoice,
            vec![line("Bolt M8", 100.0, "pcs", 108.0)],
        );
        let exceptions = check_lines(
            &invoice,
            &[&po],
            &[],
            &HashMap::new(),
            &TolerancePolicy::default(),
        );
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].kind(), ExceptionKind::PriceMismatch);
        let details = exceptions[0].details();
        assert_eq!(details["po_price"], 100.0);
        assert_eq!(details["invoice_price"], 108.0);
        assert_eq!(details["variance_percent"], 8.0);
    }

    #[test]
    fn test_price_at_tolerance_boundary_passes() {
        let po = doc(
            "PO-1",
            DocumentKind::PurchaseOrder,
            vec![line("Bolt M8", 100.0, "pcs", 100.0)],
        );
        let at_boundary = doc(
            "INV-1",
            DocumentKind::Invoice,
            vec![line("Bolt M8", 100.0, "pcs", 105.0)],
        );
        let policy = TolerancePolicy::default();
        assert!(check_lines(&at_boundary, &[&po], &[], &HashMap::new(), &policy).is_empty());

        let past_boundary = doc(
            "INV-2",
            DocumentKind::Invoice,
            vec![line("Bolt M8", 100.0, "pcs", 105.01)],
        );
        let exceptions = check_lines(&past_boundary, &[&po], &[], &HashMap::new(), &policy);
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].kind(), ExceptionKind::PriceMismatch);
    }

    #[test]
    fn test_sku_on_one_side_resolves_by_description() {
        // PO line carries a SKU, invoice line states only the identical
        // description: resolution must fall back to the description
        // instead of raising a spurious item mismatch.
        let mut po_line = line("Bolt M8", 100.0, "pcs", 2.0);
        po_line.sku = Some("HB-840".to_string());
        let po = doc("PO-1", DocumentKind::PurchaseOrder, vec![po_line]);
        let invoice = doc(
            "INV-1",
            DocumentKind::Invoice,
            vec![line("Bolt M8", 100.0, "pcs", 2.0)],
        );
        let exceptions = check_lines(
            &invoice,
            &[&po],
            &[],
            &HashMap::new(),
            &TolerancePolicy::default(),
        );
        assert_eq!(exceptions, Vec::new());

        // And the other way around: SKU on the invoice line only.
        let po = doc(
            "PO-2",
            DocumentKind::PurchaseOrder,
            vec![line("Bolt M8", 100.0, "pcs", 2.0)],
        );
        let mut inv_line = line("Bolt M8", 100.0, "pcs", 2.0);
        inv_line.sku = Some("HB-840".to_string());
        let invoice = doc("INV-2", DocumentKind::Invoice, vec![inv_line]);
        let exceptions = check_lines(
            &invoice,
            &[&po],
            &[],
            &HashMap::new(),
            &TolerancePolicy::default(),
        );
        assert_eq!(exceptions, Vec::new());
    }

    #[test]
    fn test_description_fallback_still_checks_price() {
        // The fallback-resolved line goes through the quantity and price
        // checks like any other.
        let mut po_line = line("Bolt M8", 100.0, "pcs", 100.0);
        po_line.sku = Some("HB-840".to_string());
        let po = doc("PO-1", DocumentKind::PurchaseOrder, vec![po_line]);
        let invoice = doc(
            "INV-1",
            DocumentKind::Invoice,
            vec![line("Bolt M8", 100.0, "pcs", 108.0)],
        );
        let exceptions = check_lines(
            &invoice,
            &[&po],
            &[],
            &HashMap::new(),
            &TolerancePolicy::default(),
        );
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].kind(), ExceptionKind::PriceMismatch);
    }

    #[test]
    fn test_billed_quantities_keyed_by_po_line() {
        // Cumulative billing state is keyed per PO line; the lookup must
        // use the PO line's key even when the invoice line has no SKU.
        let mut po_line = line("Hex bolt", 100.0, "pcs", 2.0);
        po_line.sku = Some("HB-840".to_string());
        let po = doc("PO-1", DocumentKind::PurchaseOrder, vec![po_line]);
        let invoice = doc(
            "INV-2",
            DocumentKind::Invoice,
            vec![line("Hex bolt", 50.0, "pcs", 2.0)],
        );
        let billed = HashMap::from([("hb-840".to_string(), 60.0)]);
        let exceptions = check_lines(&invoice, &[&po], &[], &billed, &TolerancePolicy::default());
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].kind(), ExceptionKind::OverBilling);
        assert_eq!(exceptions[0].details()["previously_billed"], 60.0);
    }

    #[test]
    fn test_first_resolved_po_supplies_the_line() {
        // Two resolved POs both carry the line; the first in reference
        // order is authoritative for the ordered-quantity ceiling.
        let po_a = doc(
            "PO-1",
            DocumentKind::PurchaseOrder,
            vec![line("Bolt M8", 10.0, "pcs", 2.0)],
        );
        let po_b = doc(
            "PO-2",
            DocumentKind::PurchaseOrder,
            vec![line("Bolt M8", 100.0, "pcs", 2.0)],
        );
        let invoice = doc(
            "INV-1",
            DocumentKind::Invoice,
            vec![line("Bolt M8", 50.0, "pcs", 2.0)],
        );
        let exceptions = check_lines(
            &invoice,
            &[&po_a, &po_b],
            &[],
            &HashMap::new(),
            &TolerancePolicy::default(),
        );
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].kind(), ExceptionKind::OverBilling);
        assert_eq!(exceptions[0].details()["ordered_quantity"], 10.0);
    }

    #[test]
    fn test_resolution_by_sku_across_descriptions() {
        let mut po_line = line("Hex bolt, M8x40, zinc", 10.0, "pcs", 2.0);
        po_line.sku = Some("HB-840".to_string());
        let po = doc("PO-1", DocumentKind::PurchaseOrder, vec![po_line]);

        let mut inv_line = line("Bolt M8 40mm", 10.0, "pcs", 2.0);
        inv_line.sku = Some("hb-840".to_string());
        let invoice = doc("INV-1", DocumentKind::Invoice, vec![inv_line]);

        let exceptions = check_lines(
            &invoice,
            &[&po],
            &[],
            &HashMap::new(),
            &TolerancePolicy::default(),
        );
        assert!(exceptions.is_empty());
    }
}
