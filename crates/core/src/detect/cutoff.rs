//! Cut-off low detection and reattachment tracking
//!
//! A cut-off low shows up as a compact region of elevated 500 hPa absolute
//! vorticity detached from the westerlies. Detection thresholds the
//! vorticity slice inside a search box, clusters the exceedances with
//! 4-connected labeling, and keeps one winning cluster per timestep.
//! Reattachment is the dangerous exit: the centroid racing east while the
//! 300 hPa jet strengthens over the same latitude band.
//!
//! Missing variables or levels are data-availability conditions: the
//! detector degrades to "not detected" and logs, it never errors. An empty
//! time axis yields an empty result.

use crate::config::{AnalysisConfig, ClusterTieBreak};
use crate::core_types::grid::{BoundingBox, GriddedField, VAR_U_PRS, VAR_V_PRS, VAR_VORTICITY};
use crate::detect::jet::track_jet_stream;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Half-width of the latitude band used for jet-strengthening evidence
const JET_BAND_HALF_WIDTH_DEG: f64 = 5.0;

/// Vorticity-weighted center of a detected cluster
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub lat: f64,
    pub lon: f64,
    /// Grid cells in the winning cluster
    pub cluster_cells: usize,
}

/// Per-run cut-off low verdict
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CutoffDetection {
    /// Whether any timestep produced a qualifying cluster
    pub detected: bool,
    /// Timestamps with a detection (empty when the field has no time axis)
    pub times: Vec<DateTime<Utc>>,
    /// Time-axis indices with a detection
    pub time_indices: Vec<usize>,
    /// Maximum vorticity inside the search box per detected timestep (s⁻¹)
    pub max_vorticity: Vec<f64>,
    /// Winning cluster centroid per detected timestep
    pub centroids: Vec<Centroid>,
}

impl CutoffDetection {
    /// The soft-failure verdict: nothing found, nothing to track
    pub fn not_detected() -> Self {
        Self::default()
    }
}

/// Reattachment verdict with its supporting evidence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReattachmentTrack {
    /// Eastward motion above threshold AND jet strengthening confirmed
    pub reattachment: bool,
    /// Centroid longitude change, first to last detection (degrees east)
    pub eastward_displacement_deg: f64,
    /// Band-mean 300 hPa wind strengthened and finished above jet strength
    pub jet_strengthening: bool,
    /// Band-mean 300 hPa wind at the last detected timestep (m/s)
    pub band_mean_wind_ms: Option<f64>,
    /// Jet axis latitude in the column nearest the final centroid
    pub jet_axis_lat: Option<f64>,
}

/// Detect a cut-off low with the configured vorticity threshold
pub fn detect_cutoff_low(
    field: &GriddedField,
    bbox: &BoundingBox,
    cfg: &AnalysisConfig,
) -> CutoffDetection {
    detect_cutoff_low_with_threshold(field, bbox, cfg.vorticity_threshold, cfg)
}

/// Detect a cut-off low with an explicit vorticity threshold (s⁻¹).
///
/// Raising the threshold never increases the number of detected timesteps:
/// the mask shrinks monotonically and clusters can only lose cells.
pub fn detect_cutoff_low_with_threshold(
    field: &GriddedField,
    bbox: &BoundingBox,
    threshold: f64,
    cfg: &AnalysisConfig,
) -> CutoffDetection {
    if !field.has_variable(VAR_VORTICITY) {
        warn!("Vorticity data not available, cut-off detection skipped");
        return CutoffDetection::not_detected();
    }
    let lev_idx = field.nearest_level(500.0).unwrap_or(0);

    let lat_idx = GriddedField::axis_indices_within(field.lats(), bbox.lat_min, bbox.lat_max);
    let lon_idx = GriddedField::axis_indices_within(field.lons(), bbox.lon_min, bbox.lon_max);
    if lat_idx.is_empty() || lon_idx.is_empty() {
        warn!("Search box does not intersect the field, cut-off detection skipped");
        return CutoffDetection::not_detected();
    }

    let nt = field.n_times();
    // Timesteps are independent; scan them in parallel and reassemble in
    // time order.
    let hits: Vec<Option<TimestepHit>> = (0..nt)
        .into_par_iter()
        .map(|t| scan_timestep(field, t, lev_idx, &lat_idx, &lon_idx, threshold, cfg))
        .collect();

    let mut result = CutoffDetection::not_detected();
    for hit in hits.into_iter().flatten() {
        result.detected = true;
        result.time_indices.push(hit.t);
        if let Some(times) = field.times() {
            result.times.push(times[hit.t]);
        }
        result.max_vorticity.push(hit.max_vorticity);
        result.centroids.push(hit.centroid);
    }

    info!(
        "Cut-off low detection: {} of {} timesteps with vorticity > {:.1e} s^-1",
        result.time_indices.len(),
        nt,
        threshold
    );
    result
}

/// Track whether a detected cut-off reattaches to the jet.
///
/// Requires eastward centroid motion beyond the configured threshold AND
/// 300 hPa jet strengthening over the cut-off's latitude band by the last
/// detected timestep. Fewer than two centroids cannot show motion.
pub fn track_cutoff_reattachment(
    field: &GriddedField,
    detection: &CutoffDetection,
    cfg: &AnalysisConfig,
) -> ReattachmentTrack {
    if !detection.detected || detection.centroids.len() < 2 {
        return ReattachmentTrack::default();
    }

    let first = detection.centroids[0];
    let last = detection.centroids[detection.centroids.len() - 1];
    let eastward = last.lon - first.lon;

    let mean_lat =
        detection.centroids.iter().map(|c| c.lat).sum::<f64>() / detection.centroids.len() as f64;

    let mut jet_strengthening = false;
    let mut band_mean_wind_ms = None;
    if field.has_variable(VAR_U_PRS) && field.has_variable(VAR_V_PRS) {
        let lev_idx = field.nearest_level(300.0).unwrap_or(0);
        let t0 = detection.time_indices[0];
        let t1 = detection.time_indices[detection.time_indices.len() - 1];
        let w0 = band_mean_wind(field, t0, lev_idx, mean_lat, cfg);
        let w1 = band_mean_wind(field, t1, lev_idx, mean_lat, cfg);
        if let (Some(w0), Some(w1)) = (w0, w1) {
            jet_strengthening =
                (w1 - w0) > cfg.jet_strengthening_delta_ms && w1 > cfg.jet_wind_threshold_ms;
            band_mean_wind_ms = Some(w1);
        }
    }

    let jet_axis_lat = track_jet_stream(field, cfg)
        .axis
        .iter()
        .min_by(|a, b| {
            (a.lon - last.lon)
                .abs()
                .total_cmp(&(b.lon - last.lon).abs())
        })
        .map(|p| p.lat);

    let reattachment = eastward > cfg.reattachment_eastward_deg && jet_strengthening;
    info!(
        "Reattachment tracking: eastward={eastward:.1} deg, jet_strengthening={jet_strengthening}"
    );

    ReattachmentTrack {
        reattachment,
        eastward_displacement_deg: eastward,
        jet_strengthening,
        band_mean_wind_ms,
        jet_axis_lat,
    }
}

struct TimestepHit {
    t: usize,
    max_vorticity: f64,
    centroid: Centroid,
}

fn scan_timestep(
    field: &GriddedField,
    t: usize,
    lev_idx: usize,
    lat_idx: &[usize],
    lon_idx: &[usize],
    threshold: f64,
    cfg: &AnalysisConfig,
) -> Option<TimestepHit> {
    let (ny, nx) = (lat_idx.len(), lon_idx.len());

    let mut values = vec![f64::NAN; ny * nx];
    let mut max_vorticity = f64::NEG_INFINITY;
    for yi in 0..ny {
        for xi in 0..nx {
            if let Some(v) = field.value(VAR_VORTICITY, t, lev_idx, lat_idx[yi], lon_idx[xi]) {
                values[yi * nx + xi] = v;
                if v.is_finite() && v > max_vorticity {
                    max_vorticity = v;
                }
            }
        }
    }

    // NaN compares false, so missing cells never enter the mask
    let mask: Vec<bool> = values.iter().map(|v| *v > threshold).collect();
    let clusters = cluster_stats(&mask, &values, ny, nx, field, lat_idx, lon_idx);
    let winner = pick_cluster(clusters, cfg)?;

    Some(TimestepHit {
        t,
        max_vorticity,
        centroid: winner,
    })
}

struct ClusterAgg {
    cells: usize,
    weighted_lat: f64,
    weighted_lon: f64,
    weight: f64,
    lat_sum: f64,
    lon_sum: f64,
}

/// Label 4-connected clusters in the mask and reduce each to a
/// vorticity-weighted centroid
fn cluster_stats(
    mask: &[bool],
    values: &[f64],
    ny: usize,
    nx: usize,
    field: &GriddedField,
    lat_idx: &[usize],
    lon_idx: &[usize],
) -> Vec<Centroid> {
    let mut visited = vec![false; mask.len()];
    let mut clusters = Vec::new();

    for start in 0..mask.len() {
        if !mask[start] || visited[start] {
            continue;
        }
        let mut agg = ClusterAgg {
            cells: 0,
            weighted_lat: 0.0,
            weighted_lon: 0.0,
            weight: 0.0,
            lat_sum: 0.0,
            lon_sum: 0.0,
        };
        let mut stack = vec![start];
        visited[start] = true;
        while let Some(idx) = stack.pop() {
            let (y, x) = (idx / nx, idx % nx);
            let lat = field.lats()[lat_idx[y]];
            let lon = field.lons()[lon_idx[x]];
            let w = values[idx].max(0.0);

            agg.cells += 1;
            agg.weighted_lat += w * lat;
            agg.weighted_lon += w * lon;
            agg.weight += w;
            agg.lat_sum += lat;
            agg.lon_sum += lon;

            let mut push = |ni: usize| {
                if mask[ni] && !visited[ni] {
                    visited[ni] = true;
                    stack.push(ni);
                }
            };
            if y > 0 {
                push(idx - nx);
            }
            if y + 1 < ny {
                push(idx + nx);
            }
            if x > 0 {
                push(idx - 1);
            }
            if x + 1 < nx {
                push(idx + 1);
            }
        }

        // Degenerate weights (all-zero vorticity above a negative
        // threshold) fall back to the unweighted mean
        let (lat, lon) = if agg.weight > 0.0 {
            (agg.weighted_lat / agg.weight, agg.weighted_lon / agg.weight)
        } else {
            (
                agg.lat_sum / agg.cells as f64,
                agg.lon_sum / agg.cells as f64,
            )
        };
        clusters.push(Centroid {
            lat,
            lon,
            cluster_cells: agg.cells,
        });
    }
    clusters
}

/// Apply the minimum-area filter and the configured tie-break policy
fn pick_cluster(clusters: Vec<Centroid>, cfg: &AnalysisConfig) -> Option<Centroid> {
    let qualifying = clusters
        .into_iter()
        .filter(|c| c.cluster_cells >= cfg.min_cluster_cells.max(1));

    match cfg.tie_break {
        ClusterTieBreak::LargestArea => qualifying.reduce(|best, c| {
            if c.cluster_cells > best.cluster_cells
                || (c.cluster_cells == best.cluster_cells && c.lat < best.lat)
            {
                c
            } else {
                best
            }
        }),
        ClusterTieBreak::Southernmost => {
            qualifying.reduce(|best, c| if c.lat < best.lat { c } else { best })
        }
    }
}

fn band_mean_wind(
    field: &GriddedField,
    t: usize,
    lev_idx: usize,
    center_lat: f64,
    cfg: &AnalysisConfig,
) -> Option<f64> {
    let lat_idx = GriddedField::axis_indices_within(
        field.lats(),
        center_lat - JET_BAND_HALF_WIDTH_DEG,
        center_lat + JET_BAND_HALF_WIDTH_DEG,
    );
    let lon_idx = GriddedField::axis_indices_within(
        field.lons(),
        cfg.jet_corridor_lon.0,
        cfg.jet_corridor_lon.1,
    );

    let mut sum = 0.0;
    let mut count = 0usize;
    for &y in &lat_idx {
        for &x in &lon_idx {
            let u = field.value(VAR_U_PRS, t, lev_idx, y, x)?;
            let v = field.value(VAR_V_PRS, t, lev_idx, y, x)?;
            let speed = u.hypot(v);
            if speed.is_finite() {
                sum += speed;
                count += 1;
            }
        }
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
