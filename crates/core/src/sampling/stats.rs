//! Route-level wind and wave aggregation
//!
//! Turns per-waypoint samples into the percentage-based statistics the risk
//! engine consumes. Excluded points (outside the grid, or with no usable
//! data) are counted and reported, and the percentages are computed over
//! valid samples only: a route that is 80% inside the grid reports risk
//! over that 80% plus an explicit coverage gap.

use crate::config::AnalysisConfig;
use crate::core_types::grid::{GriddedField, VAR_U10, VAR_V10, WAVE_HEIGHT_VARS, WAVE_PERIOD_VARS};
use crate::core_types::SampleValue;
use crate::route::Waypoint;
use crate::sampling::sample_scalar;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Wind at one route point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindSamplePoint {
    /// The route point
    pub waypoint: Waypoint,
    /// Wind speed (m/s)
    pub speed: SampleValue,
    /// Meteorological wind direction (degrees FROM), when speed is present
    pub direction_from: Option<f64>,
    /// Whether this point exceeds the configured threshold (absent when
    /// the point is excluded)
    pub above_threshold: Option<bool>,
}

/// Wind conditions along a route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteWindAnalysis {
    /// Highest valid wind speed (m/s)
    pub max_wind_ms: Option<f64>,
    /// Mean of valid wind speeds (m/s)
    pub mean_wind_ms: Option<f64>,
    /// Share of valid points above threshold (0-100)
    pub percent_above_threshold: f64,
    /// Threshold used (m/s)
    pub threshold_ms: f64,
    /// Waypoints requested
    pub samples_total: usize,
    /// Waypoints with a usable wind value
    pub samples_valid: usize,
    /// Waypoints excluded (out of domain or no data)
    pub samples_excluded: usize,
    /// Per-point detail in route order
    pub timeline: Vec<WindSamplePoint>,
}

/// Waves at one route point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveSamplePoint {
    /// The route point
    pub waypoint: Waypoint,
    /// Significant wave height (m)
    pub height: SampleValue,
    /// Dominant wave period (s); independent availability from height
    pub period: SampleValue,
    /// Whether height exceeds the configured threshold (absent when the
    /// point is excluded)
    pub above_threshold: Option<bool>,
}

/// Wave conditions along a route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteWaveAnalysis {
    /// Highest valid significant wave height (m)
    pub max_wave_m: Option<f64>,
    /// Mean of valid significant wave heights (m)
    pub mean_wave_m: Option<f64>,
    /// Mean of valid wave periods (s)
    pub mean_period_s: Option<f64>,
    /// Share of valid points above threshold (0-100)
    pub percent_above_threshold: f64,
    /// Threshold used (m)
    pub threshold_m: f64,
    /// Waypoints requested
    pub samples_total: usize,
    /// Waypoints with a usable height value
    pub samples_valid: usize,
    /// Waypoints excluded (out of domain or no data)
    pub samples_excluded: usize,
    /// Per-point detail in route order
    pub timeline: Vec<WaveSamplePoint>,
}

/// Analyze 10 m winds along a route.
///
/// Speed and direction come from the u/v components; a point missing
/// either component is excluded, never zero-filled.
pub fn analyze_route_winds(
    field: &GriddedField,
    waypoints: &[Waypoint],
    cfg: &AnalysisConfig,
) -> RouteWindAnalysis {
    let threshold = cfg.strong_wind_threshold_ms;
    let mut timeline = Vec::with_capacity(waypoints.len());
    let mut speeds = Vec::new();

    for wp in waypoints {
        let u = sample_scalar(field, VAR_U10, wp.lat, wp.lon, wp.time);
        let v = sample_scalar(field, VAR_V10, wp.lat, wp.lon, wp.time);
        let point = match (u.value(), v.value()) {
            (Some(u), Some(v)) => {
                let wind = Vector2::new(u, v);
                let speed = wind.norm();
                speeds.push(speed);
                WindSamplePoint {
                    waypoint: *wp,
                    speed: SampleValue::Value(speed),
                    direction_from: Some(direction_from_deg(u, v)),
                    above_threshold: Some(speed > threshold),
                }
            }
            _ => WindSamplePoint {
                waypoint: *wp,
                // Out-of-domain dominates: it describes the request, not
                // the data
                speed: merge_exclusion(u, v),
                direction_from: None,
                above_threshold: None,
            },
        };
        timeline.push(point);
    }

    let analysis = RouteWindAnalysis {
        max_wind_ms: fold_max(&speeds),
        mean_wind_ms: mean(&speeds),
        percent_above_threshold: percent_above(&speeds, threshold),
        threshold_ms: threshold,
        samples_total: waypoints.len(),
        samples_valid: speeds.len(),
        samples_excluded: waypoints.len() - speeds.len(),
        timeline,
    };
    report_coverage("wind", analysis.samples_total, analysis.samples_excluded);
    info!(
        "Route wind analysis: max={:.1} m/s, {:.1}% above {threshold:.0} m/s ({} of {} points valid)",
        analysis.max_wind_ms.unwrap_or(0.0),
        analysis.percent_above_threshold,
        analysis.samples_valid,
        analysis.samples_total
    );
    analysis
}

/// Analyze significant wave height (and period, when carried) along a
/// route. Height and period variable names resolve through the alias
/// lists wave servers actually use.
pub fn analyze_route_waves(
    field: &GriddedField,
    waypoints: &[Waypoint],
    cfg: &AnalysisConfig,
) -> RouteWaveAnalysis {
    let threshold = cfg.high_wave_threshold_m;
    let height_var = field.resolve_variable(WAVE_HEIGHT_VARS);
    let period_var = field.resolve_variable(WAVE_PERIOD_VARS);
    if height_var.is_none() {
        warn!("Wave height data not available in field '{}'", field.name());
    }

    let mut timeline = Vec::with_capacity(waypoints.len());
    let mut heights = Vec::new();
    let mut periods = Vec::new();

    for wp in waypoints {
        let height = height_var
            .map_or(SampleValue::NoData, |v| {
                sample_scalar(field, v, wp.lat, wp.lon, wp.time)
            });
        let period = period_var
            .map_or(SampleValue::NoData, |v| {
                sample_scalar(field, v, wp.lat, wp.lon, wp.time)
            });
        if let Some(h) = height.value() {
            heights.push(h);
        }
        if let Some(p) = period.value() {
            periods.push(p);
        }
        timeline.push(WaveSamplePoint {
            waypoint: *wp,
            height,
            period,
            above_threshold: height.value().map(|h| h > threshold),
        });
    }

    let analysis = RouteWaveAnalysis {
        max_wave_m: fold_max(&heights),
        mean_wave_m: mean(&heights),
        mean_period_s: mean(&periods),
        percent_above_threshold: percent_above(&heights, threshold),
        threshold_m: threshold,
        samples_total: waypoints.len(),
        samples_valid: heights.len(),
        samples_excluded: waypoints.len() - heights.len(),
        timeline,
    };
    report_coverage("wave", analysis.samples_total, analysis.samples_excluded);
    info!(
        "Route wave analysis: max={:.1} m, {:.1}% above {threshold:.1} m ({} of {} points valid)",
        analysis.max_wave_m.unwrap_or(0.0),
        analysis.percent_above_threshold,
        analysis.samples_valid,
        analysis.samples_total
    );
    analysis
}

/// Meteorological direction the wind blows FROM, in degrees
pub(crate) fn direction_from_deg(u: f64, v: f64) -> f64 {
    (-u).atan2(-v).to_degrees().rem_euclid(360.0)
}

fn merge_exclusion(a: SampleValue, b: SampleValue) -> SampleValue {
    if a == SampleValue::OutOfDomain || b == SampleValue::OutOfDomain {
        SampleValue::OutOfDomain
    } else {
        SampleValue::NoData
    }
}

fn fold_max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn percent_above(values: &[f64], threshold: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let above = values.iter().filter(|v| **v > threshold).count();
    100.0 * above as f64 / values.len() as f64
}

fn report_coverage(what: &str, total: usize, excluded: usize) {
    if excluded > 0 {
        warn!("Route {what} coverage gap: {excluded} of {total} points excluded");
    }
}
