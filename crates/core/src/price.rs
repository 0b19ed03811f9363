//! Price sum type: a decimal value or the "TBD" sentinel.
//!
//! Product prices come from manual entry and may legitimately be unknown
//! ("not yet negotiated"). Parsing therefore never fails: anything that is
//! not a number becomes [`Price::Pending`], and all arithmetic goes through
//! [`Price::amount`], which treats a pending price as zero. This is the one
//! place the "treat TBD as 0" rule lives.

use serde::{Deserialize, Serialize};

/// Sentinel text accepted (case-insensitively) for a not-yet-negotiated price.
pub const PENDING_SENTINEL: &str = "TBD";

/// A product price: either a known amount or still pending negotiation.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Price {
    /// A negotiated amount.
    Known(f64),
    /// Not yet negotiated ("TBD"). Behaves as zero in arithmetic.
    Pending,
}

impl Price {
    /// Parse a stored price string. Never fails: "TBD" and any other
    /// non-numeric content become `Pending`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case(PENDING_SENTINEL) {
            return Price::Pending;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Price::Known(value),
            _ => Price::Pending,
        }
    }

    /// The amount this price contributes to arithmetic (`Pending` -> 0.0).
    pub fn amount(&self) -> f64 {
        match self {
            Price::Known(value) => *value,
            Price::Pending => 0.0,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Price::Pending)
    }
}

impl Default for Price {
    fn default() -> Self {
        Price::Known(0.0)
    }
}

impl From<f64> for Price {
    fn from(value: f64) -> Self {
        Price::Known(value)
    }
}

impl From<String> for Price {
    fn from(value: String) -> Self {
        Price::parse(&value)
    }
}

impl From<Price> for String {
    fn from(value: Price) -> Self {
        value.to_string()
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Price::Known(value) => write!(f, "{value}"),
            Price::Pending => f.write_str(PENDING_SENTINEL),
        }
    }
}
