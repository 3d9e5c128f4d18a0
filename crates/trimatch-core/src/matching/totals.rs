//! Financial totals checks: stated line totals against extended amounts,
//! and the invoice grand total against the sum of its lines.

use tracing::debug;

use crate::exceptions::MatchException;
use crate::models::document::{Document, LineItem};

/// Relative epsilon for float comparison of money amounts.
const EPSILON: f64 = 1e-6;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * 1.0_f64.max(a.abs()).max(b.abs())
}

/// Extended amount a line should total to: normalized quantity times
/// normalized price when the unit was recognized, raw otherwise.
fn expected_line_total(line: &LineItem) -> Option<f64> {
    match (line.comparison_quantity(), line.comparison_unit_price()) {
        (Some(quantity), Some(price)) => Some(quantity * price),
        _ => {
            if line.line_total.is_none() {
                debug!(
                    description = %line.description,
                    "line has no amounts, excluded from computed grand total"
                );
            }
            line.line_total
        }
    }
}

/// Check internal financial consistency of a normalized invoice.
pub fn check_totals(invoice: &Document) -> Vec<MatchException> {
    let mut exceptions = Vec::new();

    for line in &invoice.line_items {
        if let (Some(stated), Some(quantity), Some(price)) = (
            line.line_total,
            line.comparison_quantity(),
            line.comparison_unit_price(),
        ) {
            let expected = quantity * price;
            if !approx_eq(stated, expected) {
                exceptions.push(MatchException::FinancialMismatch {
                    field: "line_total".to_string(),
                    description: Some(line.description.clone()),
                    expected,
                    actual: stated,
                    delta: stated - expected,
                });
            }
        }
    }

    if let Some(grand_total) = invoice.grand_total {
        let computed: f64 = invoice
            .line_items
            .iter()
            .filter_map(expected_line_total)
            .sum();
        if !approx_eq(grand_total, computed) {
            exceptions.push(MatchException::FinancialMismatch {
                field: "grand_total".to_string(),
                description: None,
                expected: computed,
                actual: grand_total,
                delta: grand_total - computed,
            });
        }
    }

    exceptions
}
