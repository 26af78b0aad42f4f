//! Analysis configuration
//!
//! Every tunable threshold lives on [`AnalysisConfig`], passed explicitly
//! into engine calls. There is no process-wide default state; two callers
//! with different configs never interfere.

use crate::core_types::grid::BoundingBox;
use serde::{Deserialize, Serialize};

/// Tie-break policy when several vorticity clusters qualify at one timestep.
///
/// The validation region sits at the southern edge of the search box, so the
/// southernmost bias is offered as an alternative to the area-based rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterTieBreak {
    /// Keep the cluster covering the most grid cells; equal areas fall back
    /// to the southernmost centroid
    LargestArea,
    /// Keep the southernmost qualifying cluster outright
    Southernmost,
}

/// Thresholds and weights for the full analysis chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum 500 hPa absolute vorticity for cut-off detection (s⁻¹)
    pub vorticity_threshold: f64,

    /// 300 hPa wind speed marking jet-strength flow (m/s)
    pub jet_wind_threshold_ms: f64,

    /// 10 m wind speed treated as hazardous along a route (m/s, ~30 kt)
    pub strong_wind_threshold_ms: f64,

    /// Significant wave height treated as hazardous along a route (m)
    pub high_wave_threshold_m: f64,

    /// Minimum connected-cluster size (grid cells) for a detection
    pub min_cluster_cells: usize,

    /// Policy for choosing between simultaneous qualifying clusters
    pub tie_break: ClusterTieBreak,

    /// Search region for cut-off detection
    pub detection_bbox: BoundingBox,

    /// Centroid eastward displacement indicating reattachment (degrees lon)
    pub reattachment_eastward_deg: f64,

    /// Band-mean 300 hPa wind increase confirming jet strengthening (m/s)
    pub jet_strengthening_delta_ms: f64,

    /// Longitude corridor over which jet strengthening is evaluated
    pub jet_corridor_lon: (f64, f64),

    /// Wave period below which seas are short and steep (s)
    pub short_period_s: f64,

    /// Wave period below which seas are moderately steep (s)
    pub moderate_period_s: f64,

    /// Wave share of the combined discomfort index (period/steepness
    /// dominates crew fatigue, so waves weigh more than wind)
    pub wave_weight: f64,

    /// Wind share of the combined discomfort index
    pub wind_weight: f64,

    /// Detection-rate difference between recent and old runs that counts
    /// as a trend
    pub trend_delta: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            vorticity_threshold: 8e-5,
            jet_wind_threshold_ms: 30.0,
            strong_wind_threshold_ms: 15.0,
            high_wave_threshold_m: 3.0,
            min_cluster_cells: 1,
            tie_break: ClusterTieBreak::LargestArea,
            // Northern Gulf / Louisiana box where cut-offs strand
            detection_bbox: BoundingBox::new(25.0, 34.0, -96.0, -88.0),
            reattachment_eastward_deg: 5.0,
            jet_strengthening_delta_ms: 5.0,
            jet_corridor_lon: (-85.0, -70.0),
            short_period_s: 7.0,
            moderate_period_s: 10.0,
            wave_weight: 0.7,
            wind_weight: 0.3,
            trend_delta: 0.3,
        }
    }
}
