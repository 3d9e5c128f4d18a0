//! Match result produced by the engine for one invoice.

use serde::{Deserialize, Serialize};

use crate::exceptions::MatchException;

/// Overall outcome of one match run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Every check passed; the invoice may proceed to payment approval.
    Matched,
    /// One or more business exceptions require review.
    Exception,
}

impl MatchStatus {
    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Matched => "matched",
            MatchStatus::Exception => "exception",
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of matching one invoice against its PO(s) and GRN(s).
///
/// Computed fresh on every run and never mutated in place. Exceptions are
/// in detection order, document-level before item-level.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    /// Invoice identifier the result belongs to.
    pub invoice_id: String,

    /// Overall status: matched iff zero exceptions.
    pub status: MatchStatus,

    /// All accumulated exceptions, in detection order.
    pub exceptions: Vec<MatchException>,
}

impl MatchResult {
    /// Build a result; the status is derived from the exception list.
    pub fn new(invoice_id: impl Into<String>, exceptions: Vec<MatchException>) -> Self {
        let status = if exceptions.is_empty() {
            MatchStatus::Matched
        } else {
            MatchStatus::Exception
        };
        Self {
            invoice_id: invoice_id.into(),
            status,
            exceptions,
        }
    }

    /// True when the invoice matched cleanly.
    pub fn is_matched(&self) -> bool {
        self.status == MatchStatus::Matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exceptions::MatchException;

    #[test]
    fn test_status_derived_from_exceptions() {
        let clean = MatchResult::new("INV-1", Vec::new());
        assert_eq!(clean.status, MatchStatus::Matched);
        assert!(clean.is_matched());

        let flagged = MatchResult::new(
            "INV-2",
            vec![MatchException::DuplicateInvoice {
                vendor: "Acme".to_string(),
                invoice_id: "INV-2".to_string(),
            }],
        );
        assert_eq!(flagged.status, MatchStatus::Exception);
        assert!(!flagged.is_matched());
    }

    #[test]
    fn test_serializes_with_flat_exceptions() {
        let result = MatchResult::new(
            "INV-3",
            vec![MatchException::DuplicateInvoice {
                vendor: "Acme".to_string(),
                invoice_id: "INV-3".to_string(),
            }],
        );
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "exception");
        assert_eq!(value["exceptions"][0]["type"], "duplicate_invoice");
    }
}
