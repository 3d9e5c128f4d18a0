//! Unit-of-measure classification tables.
//!
//! The conversion factors are fixed constants; reconciliation totals must
//! reproduce bit-for-bit across runs, so they are never derived at runtime.

use serde::{Deserialize, Serialize};

/// Kilograms per tonne.
pub const TONNE_TO_KG: f64 = 1000.0;
/// Kilograms per pound.
pub const POUND_TO_KG: f64 = 0.453592;
/// Kilograms per ounce.
pub const OUNCE_TO_KG: f64 = 0.0283495;
/// Kilograms per gram.
pub const GRAM_TO_KG: f64 = 0.001;

/// Canonical unit a line item is normalized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CanonicalUnit {
    /// Canonical weight unit (kilograms).
    #[serde(rename = "kg")]
    Kg,
    /// Canonical count unit (pieces).
    #[serde(rename = "pcs")]
    Pcs,
}

impl CanonicalUnit {
    /// Canonical unit string as written on normalized lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalUnit::Kg => "kg",
            CanonicalUnit::Pcs => "pcs",
        }
    }
}

impl std::fmt::Display for CanonicalUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying a raw unit string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitClass {
    /// Weight family; carries the multiplicative factor into kilograms.
    Weight(f64),
    /// Count family; quantity is already a piece count.
    Count,
    /// Not a unit the normalizer knows about.
    Unrecognized,
}

/// Classify a raw unit string (case-insensitive, trimmed).
pub fn classify(unit: &str) -> UnitClass {
    match unit.trim().to_lowercase().as_str() {
        "kg" | "kgs" | "kilo" | "kilos" | "kilogram" | "kilograms" => UnitClass::Weight(1.0),
        "t" | "ton" | "tons" | "tonne" | "tonnes" | "mt" => UnitClass::Weight(TONNE_TO_KG),
        "lb" | "lbs" | "pound" | "pounds" => UnitClass::Weight(POUND_TO_KG),
        "oz" | "ounce" | "ounces" => UnitClass::Weight(OUNCE_TO_KG),
        "g" | "gm" | "gram" | "grams" => UnitClass::Weight(GRAM_TO_KG),
        "pc" | "pcs" | "piece" | "pieces" | "each" | "ea" | "unit" | "units" | "set" | "sets"
        | "pair" | "pairs" | "pack" | "packs" | "box" | "boxes" | "nos" | "no" => UnitClass::Count,
        _ => UnitClass::Unrecognized,
    }
}
