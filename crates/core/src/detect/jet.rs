//! Jet stream axis tracking
//!
//! Locates the latitude of maximum time-mean 300 hPa wind speed in each
//! longitude column. The axis is supporting evidence for cut-off
//! reattachment, not a standalone risk input.

use crate::config::AnalysisConfig;
use crate::core_types::grid::{GriddedField, VAR_U_PRS, VAR_V_PRS};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Jet axis sample for one longitude column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JetAxisPoint {
    /// Column longitude (degrees)
    pub lon: f64,
    /// Latitude of the wind-speed maximum (degrees)
    pub lat: f64,
    /// Time-mean wind speed at that latitude (m/s)
    pub speed_ms: f64,
    /// Whether the maximum reaches jet strength
    pub jet_strength: bool,
}

/// Jet stream axis across the field's longitude span
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JetStreamTrack {
    /// One entry per longitude column with usable wind data
    pub axis: Vec<JetAxisPoint>,
}

/// Track the 300 hPa jet axis. Missing wind variables, an absent level
/// axis entry, or an empty time axis degrade to an empty track.
pub fn track_jet_stream(field: &GriddedField, cfg: &AnalysisConfig) -> JetStreamTrack {
    if !field.has_variable(VAR_U_PRS) || !field.has_variable(VAR_V_PRS) {
        debug!("Jet tracking skipped: pressure-level winds not available");
        return JetStreamTrack::default();
    }
    let lev_idx = field.nearest_level(300.0).unwrap_or(0);
    let nt = field.n_times();
    if nt == 0 {
        return JetStreamTrack::default();
    }

    let mut axis = Vec::with_capacity(field.lons().len());
    for (x, &lon) in field.lons().iter().enumerate() {
        let mut best: Option<(f64, f64)> = None;
        for (y, &lat) in field.lats().iter().enumerate() {
            if let Some(speed) = column_mean_speed(field, lev_idx, y, x, nt) {
                let better = best.map_or(true, |(_, s)| speed > s);
                if better {
                    best = Some((lat, speed));
                }
            }
        }
        if let Some((lat, speed_ms)) = best {
            axis.push(JetAxisPoint {
                lon,
                lat,
                speed_ms,
                jet_strength: speed_ms >= cfg.jet_wind_threshold_ms,
            });
        }
    }
    JetStreamTrack { axis }
}

fn column_mean_speed(
    field: &GriddedField,
    lev_idx: usize,
    lat_idx: usize,
    lon_idx: usize,
    nt: usize,
) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for t in 0..nt {
        let u = field.value(VAR_U_PRS, t, lev_idx, lat_idx, lon_idx)?;
        let v = field.value(VAR_V_PRS, t, lev_idx, lat_idx, lon_idx)?;
        let speed = u.hypot(v);
        if speed.is_finite() {
            sum += speed;
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::grid::GriddedField;

    fn jet_field() -> GriddedField {
        // 3 latitudes, 2 longitudes, winds strongest in the middle row
        let mut field = GriddedField::new("gfs", vec![30.0, 35.0, 40.0], vec![-80.0, -75.0])
            .unwrap()
            .with_levels(vec![500.0, 300.0])
            .unwrap();
        let mut u = vec![0.0; 12];
        // level index 1 (300 hPa) block: lats 30/35/40 x lons
        u[6..8].copy_from_slice(&[10.0, 12.0]);
        u[8..10].copy_from_slice(&[45.0, 42.0]);
        u[10..12].copy_from_slice(&[20.0, 18.0]);
        field.add_variable(VAR_U_PRS, u).unwrap();
        field.add_variable(VAR_V_PRS, vec![0.0; 12]).unwrap();
        field
    }

    #[test]
    fn test_axis_follows_wind_maximum() {
        let track = track_jet_stream(&jet_field(), &AnalysisConfig::default());
        assert_eq!(track.axis.len(), 2);
        for point in &track.axis {
            assert!((point.lat - 35.0).abs() < f64::EPSILON);
            assert!(point.jet_strength);
        }
        assert!((track.axis[0].speed_ms - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_winds_yield_empty_track() {
        let field = GriddedField::new("gfs", vec![30.0, 35.0], vec![-80.0]).unwrap();
        let track = track_jet_stream(&field, &AnalysisConfig::default());
        assert!(track.axis.is_empty());
    }
}
