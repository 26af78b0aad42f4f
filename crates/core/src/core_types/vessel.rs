//! Vessel performance profiles
//!
//! Used only to turn route geometry into timestamped positions (constant
//! speed along great-circle legs) and to pick the speed-class row of the
//! recommendation table.

use serde::{Deserialize, Serialize};

/// Speed class buckets used by the recommendation decision table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VesselClass {
    /// 5-5.5 kt, 120-130 nm/day
    Slow,
    /// 6-6.5 kt, 140-160 nm/day
    Typical,
    /// 7-8.5 kt, 170-200 nm/day
    Fast,
}

/// Vessel characteristics for passage planning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vessel {
    /// Display name
    pub name: String,
    /// Speed class
    pub class: VesselClass,
    /// Average passage speed (knots)
    pub avg_speed_kn: f64,
    /// Expected daily distance range (nm/day)
    pub daily_range_nm: (f64, f64),
}

impl Vessel {
    /// Slow cruising boat profile
    pub fn slow(name: &str) -> Self {
        Self {
            name: name.to_string(),
            class: VesselClass::Slow,
            avg_speed_kn: 5.25,
            daily_range_nm: (120.0, 130.0),
        }
    }

    /// Typical cruising boat profile
    pub fn typical(name: &str) -> Self {
        Self {
            name: name.to_string(),
            class: VesselClass::Typical,
            avg_speed_kn: 6.25,
            daily_range_nm: (140.0, 160.0),
        }
    }

    /// Fast passage-maker profile
    pub fn fast(name: &str) -> Self {
        Self {
            name: name.to_string(),
            class: VesselClass::Fast,
            avg_speed_kn: 7.75,
            daily_range_nm: (170.0, 200.0),
        }
    }

    /// Nautical miles covered per day at average speed
    pub fn nm_per_day(&self) -> f64 {
        self.avg_speed_kn * 24.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles() {
        let v = Vessel::typical("Mango");
        assert_eq!(v.class, VesselClass::Typical);
        assert!((v.nm_per_day() - 150.0).abs() < 1.0);
        assert!(Vessel::fast("F").avg_speed_kn > Vessel::slow("S").avg_speed_kn);
    }
}
