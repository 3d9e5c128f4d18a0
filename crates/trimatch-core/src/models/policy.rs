//! Tolerance policy configuration for the matching engine.

use serde::{Deserialize, Serialize};

/// Comparison slack so that a variance landing exactly on the tolerance
/// boundary is accepted despite float noise.
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Allowed variance before a discrepancy becomes an exception.
///
/// Loaded once at process start and passed by reference into the engine;
/// the engine never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TolerancePolicy {
    /// Allowed unit-price variance against the PO, in percent.
    pub price_tolerance_percent: f64,

    /// Allowed quantity variance against PO/GRN quantities, in percent.
    pub quantity_tolerance_percent: f64,
}

impl Default for TolerancePolicy {
    fn default() -> Self {
        Self {
            price_tolerance_percent: 5.0,
            quantity_tolerance_percent: 2.0,
        }
    }
}

impl TolerancePolicy {
    /// Load policy from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save policy to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Percentage variance of `actual` against `expected`.
    ///
    /// A zero expected value with a non-zero actual is reported as fully
    /// out of range rather than dividing by zero.
    pub fn variance_percent(expected: f64, actual: f64) -> f64 {
        if expected == 0.0 {
            if actual == 0.0 { 0.0 } else { f64::INFINITY }
        } else {
            ((actual - expected).abs() / expected.abs()) * 100.0
        }
    }

    /// True when `actual` is within the price tolerance of `expected`.
    /// The boundary is inclusive: variance exactly equal to the
    /// configured percentage passes.
    pub fn within_price_tolerance(&self, expected: f64, actual: f64) -> bool {
        Self::variance_percent(expected, actual)
            <= self.price_tolerance_percent + BOUNDARY_EPSILON
    }

    /// Quantity ceiling: the largest quantity that still falls inside the
    /// quantity tolerance of `limit`.
    pub fn quantity_ceiling(&self, limit: f64) -> f64 {
        limit * (1.0 + self.quantity_tolerance_percent / 100.0)
    }

    /// True when `quantity` exceeds `limit` beyond the quantity tolerance.
    pub fn exceeds_quantity(&self, quantity: f64, limit: f64) -> bool {
        quantity > self.quantity_ceiling(limit) + BOUNDARY_EPSILON
    }
}
