//! Data models for documents, tolerance policy, and match results.

pub mod document;
pub mod policy;
pub mod result;

pub use document::{Document, DocumentKind, LineItem};
pub use policy::TolerancePolicy;
pub use result::{MatchResult, MatchStatus};
