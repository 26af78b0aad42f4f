//! Tri-state sample values
//!
//! A sampled scalar is either a real value, missing from the source field,
//! or taken outside the field's spatial extent. Keeping the three states
//! explicit prevents the classic conflation of "calm" (0 m/s) with "no
//! data", which would silently dilute percentage-based risk.

use serde::{Deserialize, Serialize};

/// Outcome of sampling one scalar at one point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SampleValue {
    /// Interpolated value in the variable's native unit
    Value(f64),
    /// Variable (or a usable grid value) absent from the field
    NoData,
    /// Requested position outside the field's lat/lon bounds
    OutOfDomain,
}

impl SampleValue {
    /// The value, when present
    pub fn value(self) -> Option<f64> {
        match self {
            SampleValue::Value(v) => Some(v),
            SampleValue::NoData | SampleValue::OutOfDomain => None,
        }
    }

    /// Whether a real value is present
    pub fn is_present(self) -> bool {
        matches!(self, SampleValue::Value(_))
    }

    /// Whether the point must be excluded from aggregates
    pub fn is_excluded(self) -> bool {
        !self.is_present()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_not_missing() {
        let calm = SampleValue::Value(0.0);
        assert!(calm.is_present());
        assert_eq!(calm.value(), Some(0.0));
        assert!(SampleValue::NoData.is_excluded());
        assert!(SampleValue::OutOfDomain.is_excluded());
        assert_ne!(calm, SampleValue::NoData);
    }
}
