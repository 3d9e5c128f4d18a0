//! Business exception taxonomy for the 3-way match.
//!
//! A [`MatchException`] is a normal, expected reconciliation outcome that a
//! reviewer resolves or overrides. It is a value collected into a
//! [`crate::MatchResult`], never a fault and never thrown; genuine faults
//! live in [`crate::error`].

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::models::document::DocumentKind;

/// The closed vocabulary of reconciliation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    /// Invoice with a (vendor, invoice id) pair already accepted.
    DuplicateInvoice,
    /// A referenced PO or GRN could not be resolved.
    MissingDocument,
    /// Document dates out of logical order (PO <= GRN <= Invoice).
    TimingMismatch,
    /// Invoice line with no counterpart on the PO or GRN.
    ItemMismatch,
    /// Invoiced quantity exceeds the received quantity beyond tolerance.
    QuantityMismatch,
    /// Invoiced unit price outside tolerance of the PO price.
    PriceMismatch,
    /// Cumulative invoiced quantity exceeds the PO order beyond tolerance.
    OverBilling,
    /// Stated totals disagree with computed totals.
    FinancialMismatch,
}

impl ExceptionKind {
    /// Stable snake_case name used in the serialized projection.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExceptionKind::DuplicateInvoice => "duplicate_invoice",
            ExceptionKind::MissingDocument => "missing_document",
            ExceptionKind::TimingMismatch => "timing_mismatch",
            ExceptionKind::ItemMismatch => "item_mismatch",
            ExceptionKind::QuantityMismatch => "quantity_mismatch",
            ExceptionKind::PriceMismatch => "price_mismatch",
            ExceptionKind::OverBilling => "over_billing",
            ExceptionKind::FinancialMismatch => "financial_mismatch",
        }
    }
}

impl std::fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reconciliation failure with its machine-readable payload.
///
/// Serializes to the flat projection `{"type": ..., "message": ...,
/// <details>}` so callers can persist or display it without further
/// transformation.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchException {
    DuplicateInvoice {
        vendor: String,
        invoice_id: String,
    },
    MissingDocument {
        kind: DocumentKind,
        reference: String,
    },
    TimingMismatch {
        preceding: DocumentKind,
        preceding_id: String,
        preceding_date: NaiveDate,
        following: DocumentKind,
        following_id: String,
        following_date: NaiveDate,
    },
    ItemMismatch {
        description: String,
        missing_from: DocumentKind,
        searched: Vec<String>,
    },
    QuantityMismatch {
        description: String,
        invoiced_quantity: f64,
        received_quantity: f64,
        tolerance_percent: f64,
    },
    PriceMismatch {
        description: String,
        po_price: f64,
        invoice_price: f64,
        variance_percent: f64,
        tolerance_percent: f64,
    },
    OverBilling {
        description: String,
        ordered_quantity: f64,
        previously_billed: f64,
        invoiced_quantity: f64,
        tolerance_percent: f64,
    },
    FinancialMismatch {
        field: String,
        description: Option<String>,
        expected: f64,
        actual: f64,
        delta: f64,
    },
}

impl MatchException {
    /// The taxonomy kind of this exception.
    pub fn kind(&self) -> ExceptionKind {
        match self {
            MatchException::DuplicateInvoice { .. } => ExceptionKind::DuplicateInvoice,
            MatchException::MissingDocument { .. } => ExceptionKind::MissingDocument,
            MatchException::TimingMismatch { .. } => ExceptionKind::TimingMismatch,
            MatchException::ItemMismatch { .. } => ExceptionKind::ItemMismatch,
            MatchException::QuantityMismatch { .. } => ExceptionKind::QuantityMismatch,
            MatchException::PriceMismatch { .. } => ExceptionKind::PriceMismatch,
            MatchException::OverBilling { .. } => ExceptionKind::OverBilling,
            MatchException::FinancialMismatch { .. } => ExceptionKind::FinancialMismatch,
        }
    }

    /// Human-readable summary for display and logging.
    pub fn message(&self) -> String {
        match self {
            MatchException::DuplicateInvoice { vendor, invoice_id } => {
                format!("invoice {invoice_id} from {vendor} was already accepted")
            }
            MatchException::MissingDocument { kind, reference } => {
                format!("referenced {kind} {reference} does not exist")
            }
            MatchException::TimingMismatch {
                preceding,
                preceding_id,
                preceding_date,
                following,
                following_id,
                following_date,
            } => format!(
                "{preceding} {preceding_id} dated {preceding_date} is later than {following} {following_id} dated {following_date}"
            ),
            MatchException::ItemMismatch {
                description,
                missing_from,
                ..
            } => format!("line item '{description}' has no counterpart on the {missing_from}"),
            MatchException::QuantityMismatch {
                description,
                invoiced_quantity,
                received_quantity,
                ..
            } => format!(
                "line item '{description}' invoiced {invoiced_quantity} but only {received_quantity} received"
            ),
            MatchException::PriceMismatch {
                description,
                po_price,
                invoice_price,
                variance_percent,
                ..
            } => format!(
                "line item '{description}' priced {invoice_price} against PO price {po_price} ({variance_percent:.2}% variance)"
            ),
            MatchException::OverBilling {
                description,
                ordered_quantity,
                previously_billed,
                invoiced_quantity,
                ..
            } => format!(
                "line item '{description}' would bring billed quantity to {} against {ordered_quantity} ordered",
                previously_billed + invoiced_quantity
            ),
            MatchException::FinancialMismatch {
                field,
                expected,
                actual,
                ..
            } => format!("{field} is {actual} but computes to {expected}"),
        }
    }

    /// The structured details mapping, sufficient to reconstruct the
    /// failure programmatically.
    pub fn details(&self) -> Map<String, Value> {
        let value = match self {
            MatchException::DuplicateInvoice { vendor, invoice_id } => json!({
                "vendor": vendor,
                "invoice_id": invoice_id,
            }),
            MatchException::MissingDocument { kind, reference } => json!({
                "document_kind": kind,
                "reference": reference,
            }),
            MatchException::TimingMismatch {
                preceding,
                preceding_id,
                preceding_date,
                following,
                following_id,
                following_date,
            } => json!({
                "preceding": preceding,
                "preceding_id": preceding_id,
                "preceding_date": preceding_date,
                "following": following,
                "following_id": following_id,
                "following_date": following_date,
            }),
            MatchException::ItemMismatch {
                description,
                missing_from,
                searched,
            } => json!({
                "description": description,
                "missing_from": missing_from,
                "searched": searched,
            }),
            MatchException::QuantityMismatch {
                description,
                invoiced_quantity,
                received_quantity,
                tolerance_percent,
            } => json!({
                "description": description,
                "invoiced_quantity": invoiced_quantity,
                "received_quantity": received_quantity,
                "tolerance_percent": tolerance_percent,
            }),
            MatchException::PriceMismatch {
                description,
                po_price,
                invoice_price,
                variance_percent,
                tolerance_percent,
            } => json!({
                "description": description,
                "po_price": po_price,
                "invoice_price": invoice_price,
                "variance_percent": variance_percent,
                "tolerance_percent": tolerance_percent,
            }),
            MatchException::OverBilling {
                description,
                ordered_quantity,
                previously_billed,
                invoiced_quantity,
                tolerance_percent,
            } => json!({
                "description": description,
                "ordered_quantity": ordered_quantity,
                "previously_billed": previously_billed,
                "invoiced_quantity": invoiced_quantity,
                "tolerance_percent": tolerance_percent,
            }),
            MatchException::FinancialMismatch {
                field,
                description,
                expected,
                actual,
                delta,
            } => json!({
                "field": field,
                "description": description,
                "expected": expected,
                "actual": actual,
                "delta": delta,
            }),
        };
        match value {
            Value::Object(map) => map,
            _ => unreachable!("details are always an object"),
        }
    }

    /// Flat serializable projection: `{"type", "message", ...details}`.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_string(), json!(self.kind()));
        map.insert("message".to_string(), Value::String(self.message()));
        map.extend(self.details());
        Value::Object(map)
    }
}

impl Serialize for MatchException {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

impl std::fmt::Display for MatchException {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())
    }
}
