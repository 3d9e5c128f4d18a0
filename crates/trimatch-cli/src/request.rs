//! Match request file format.
//!
//! A request file bundles the invoice with everything the surrounding
//! service would otherwise supply: the resolved documents, the
//! already-accepted invoice keys, the prior cumulative billed quantities,
//! and optionally an embedded tolerance policy.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use trimatch_core::{Document, MatchContext, TolerancePolicy};

/// One invoice match request.
#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    /// The invoice to reconcile.
    pub invoice: Document,

    /// Resolved documents and prior billing state.
    #[serde(flatten)]
    pub context: MatchContext,

    /// Embedded policy; a `--policy` file on the command line wins.
    #[serde(default)]
    pub policy: Option<TolerancePolicy>,
}

impl MatchRequest {
    /// Load a request from a JSON file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid request file {}", path.display()))
    }
}

/// Effective tolerance policy: explicit policy file, then the policy
/// embedded in the request, then defaults.
pub fn resolve_policy(
    policy_path: Option<&str>,
    embedded: Option<TolerancePolicy>,
) -> anyhow::Result<TolerancePolicy> {
    match policy_path {
        Some(path) => TolerancePolicy::from_file(Path::new(path))
            .with_context(|| format!("failed to load policy file {path}")),
        None => Ok(embedded.unwrap_or_default()),
    }
}
