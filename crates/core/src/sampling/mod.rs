//! Route-relative sampling of gridded fields
//!
//! Projects timestamped waypoints onto a field with bilinear interpolation
//! in latitude/longitude and nearest-neighbor selection in time. Every
//! sample is tri-state ([`SampleValue`]): a waypoint outside the grid is
//! `OutOfDomain`, a missing variable or unusable grid value is `NoData`,
//! and neither is ever reported as zero.

pub mod stats;

pub use stats::{
    analyze_route_waves, analyze_route_winds, RouteWaveAnalysis, RouteWindAnalysis,
    WaveSamplePoint, WindSamplePoint,
};

use crate::core_types::grid::GriddedField;
use crate::core_types::SampleValue;
use crate::route::Waypoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One variable sampled at one route point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSample {
    /// Variable name as requested
    pub variable: String,
    /// Sampling outcome
    pub value: SampleValue,
}

/// All requested variables at one route point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleEntry {
    /// The route point (with its ETA, when timed)
    pub waypoint: Waypoint,
    /// One sample per requested variable, in request order
    pub values: Vec<NamedSample>,
}

/// Ordered per-waypoint samples along a route
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteSampleTimeline {
    /// One entry per waypoint, in route order
    pub entries: Vec<SampleEntry>,
}

/// Sample one scalar at a position and optional time.
///
/// Bilinear in lat/lon, nearest-neighbor in time. An untimed request
/// against a time-varying field returns the time-mean, matching how the
/// engine summarizes a passage when no ETA is known.
///
/// Sampling is surface-only: values are read at level index 0, so a field
/// carrying a pressure-level axis must store surface variables in its
/// first level.
pub fn sample_scalar(
    field: &GriddedField,
    variable: &str,
    lat: f64,
    lon: f64,
    time: Option<DateTime<Utc>>,
) -> SampleValue {
    if !field.has_variable(variable) {
        return SampleValue::NoData;
    }
    if !field.contains(lat, lon) {
        return SampleValue::OutOfDomain;
    }
    let Some((y0, y1, fy)) = axis_bracket(field.lats(), lat) else {
        return SampleValue::OutOfDomain;
    };
    let Some((x0, x1, fx)) = axis_bracket(field.lons(), lon) else {
        return SampleValue::OutOfDomain;
    };

    let nt = field.n_times();
    if nt == 0 {
        return SampleValue::NoData;
    }

    match time.and_then(|t| field.nearest_time(t)) {
        Some(t_idx) => bilinear(field, variable, t_idx, (y0, y1, fy), (x0, x1, fx)),
        None if field.times().is_none() => {
            bilinear(field, variable, 0, (y0, y1, fy), (x0, x1, fx))
        }
        None => {
            // Untimed waypoint, timed field: average the timesteps
            let mut sum = 0.0;
            let mut count = 0usize;
            for t in 0..nt {
                if let SampleValue::Value(v) =
                    bilinear(field, variable, t, (y0, y1, fy), (x0, x1, fx))
                {
                    sum += v;
                    count += 1;
                }
            }
            if count == 0 {
                SampleValue::NoData
            } else {
                SampleValue::Value(sum / count as f64)
            }
        }
    }
}

/// Sample several variables at every waypoint of a route
pub fn sample_route(
    field: &GriddedField,
    variables: &[&str],
    waypoints: &[Waypoint],
) -> RouteSampleTimeline {
    let entries = waypoints
        .iter()
        .map(|wp| SampleEntry {
            waypoint: *wp,
            values: variables
                .iter()
                .map(|var| NamedSample {
                    variable: (*var).to_string(),
                    value: sample_scalar(field, var, wp.lat, wp.lon, wp.time),
                })
                .collect(),
        })
        .collect();
    RouteSampleTimeline { entries }
}

/// Bracket `x` on an ascending axis: surrounding indices plus the fraction
/// toward the upper one. `None` when outside the axis span.
fn axis_bracket(axis: &[f64], x: f64) -> Option<(usize, usize, f64)> {
    let n = axis.len();
    if n == 1 {
        return (x == axis[0]).then_some((0, 0, 0.0));
    }
    if x < axis[0] || x > axis[n - 1] {
        return None;
    }
    // Axes are small; a linear scan beats bookkeeping a binary search
    for i in 0..n - 1 {
        if x <= axis[i + 1] {
            let span = axis[i + 1] - axis[i];
            let frac = if span > 0.0 { (x - axis[i]) / span } else { 0.0 };
            return Some((i, i + 1, frac));
        }
    }
    Some((n - 2, n - 1, 1.0))
}

fn bilinear(
    field: &GriddedField,
    variable: &str,
    t_idx: usize,
    (y0, y1, fy): (usize, usize, f64),
    (x0, x1, fx): (usize, usize, f64),
) -> SampleValue {
    let corner = |y: usize, x: usize| field.value(variable, t_idx, 0, y, x);
    let (Some(v00), Some(v01), Some(v10), Some(v11)) = (
        corner(y0, x0),
        corner(y0, x1),
        corner(y1, x0),
        corner(y1, x1),
    ) else {
        return SampleValue::NoData;
    };
    let v = (1.0 - fy) * ((1.0 - fx) * v00 + fx * v01) + fy * ((1.0 - fx) * v10 + fx * v11);
    if v.is_finite() {
        SampleValue::Value(v)
    } else {
        SampleValue::NoData
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gradient_field() -> GriddedField {
        // Value = lat + lon so interpolation is exactly linear
        let lats = vec![30.0, 31.0, 32.0];
        let lons = vec![-75.0, -74.0, -73.0];
        let mut values = Vec::new();
        for lat in &lats {
            for lon in &lons {
                values.push(lat + lon);
            }
        }
        let mut field = GriddedField::new("gfs", lats, lons).unwrap();
        field.add_variable("ugrd10m", values).unwrap();
        field
    }

    #[test]
    fn test_bilinear_is_exact_on_linear_data() {
        let field = gradient_field();
        let s = sample_scalar(&field, "ugrd10m", 30.5, -74.25, None);
        assert_relative_eq!(s.value().unwrap(), 30.5 - 74.25, epsilon = 1e-9);
        // Grid node
        let s = sample_scalar(&field, "ugrd10m", 31.0, -74.0, None);
        assert_relative_eq!(s.value().unwrap(), -43.0, epsilon = 1e-9);
    }

    #[test]
    fn test_out_of_domain_is_flagged_not_zeroed() {
        let field = gradient_field();
        assert_eq!(
            sample_scalar(&field, "ugrd10m", 89.9, -74.0, None),
            SampleValue::OutOfDomain
        );
        assert_eq!(
            sample_scalar(&field, "ugrd10m", 30.5, -60.0, None),
            SampleValue::OutOfDomain
        );
    }

    #[test]
    fn test_missing_variable_is_no_data() {
        let field = gradient_field();
        assert_eq!(
            sample_scalar(&field, "htsgwsfc", 30.5, -74.0, None),
            SampleValue::NoData
        );
    }

    #[test]
    fn test_nan_cells_are_no_data() {
        let mut field = GriddedField::new("ww3", vec![30.0, 31.0], vec![-75.0, -74.0]).unwrap();
        field
            .add_variable("htsgwsfc", vec![2.0, f64::NAN, 2.0, 2.0])
            .unwrap();
        let s = sample_scalar(&field, "htsgwsfc", 30.5, -74.5, None);
        assert_eq!(s, SampleValue::NoData);
    }

    #[test]
    fn test_sampling_reads_the_first_level() {
        // Surface wind stored at level 0 of a two-level field; the upper
        // slice must never leak into a sample
        let mut field = GriddedField::new("gfs", vec![30.0, 31.0], vec![-75.0, -74.0])
            .unwrap()
            .with_levels(vec![1000.0, 500.0])
            .unwrap();
        let mut values = vec![3.0; 4];
        values.extend(vec![99.0; 4]);
        field.add_variable("ugrd10m", values).unwrap();

        let s = sample_scalar(&field, "ugrd10m", 30.5, -74.5, None);
        assert_relative_eq!(s.value().unwrap(), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sample_route_orders_entries() {
        let field = gradient_field();
        let waypoints = vec![Waypoint::new(30.2, -74.8), Waypoint::new(31.7, -73.2)];
        let timeline = sample_route(&field, &["ugrd10m", "vgrd10m"], &waypoints);
        assert_eq!(timeline.entries.len(), 2);
        assert_eq!(timeline.entries[0].values.len(), 2);
        assert!(timeline.entries[0].values[0].value.is_present());
        // vgrd10m was never added
        assert_eq!(timeline.entries[0].values[1].value, SampleValue::NoData);
    }
}
