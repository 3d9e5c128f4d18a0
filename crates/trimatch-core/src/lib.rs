//! Core library for 3-way invoice matching.
//!
//! This crate provides:
//! - Unit-of-measure normalization (weights to kg, counts to pcs)
//! - Tolerance policy configuration (price and quantity variance)
//! - The business exception taxonomy for reconciliation failures
//! - The matching engine correlating PO, GRN, and invoice line items
//!
//! The engine is a pure computation library: no I/O, no async, no shared
//! mutable state. A surrounding service resolves documents, supplies prior
//! billing state, persists results, and exposes them over an API.

pub mod error;
pub mod exceptions;
pub mod matching;
pub mod models;
pub mod normalize;

pub use error::{MatchError, Result};
pub use exceptions::{ExceptionKind, MatchException};
pub use matching::{InvoiceKey, MatchContext, match_invoice};
pub use models::document::{Document, DocumentKind, LineItem};
pub use models::policy::TolerancePolicy;
pub use models::result::{MatchResult, MatchStatus};
pub use normalize::{CanonicalUnit, normalize_document, normalize_line};
