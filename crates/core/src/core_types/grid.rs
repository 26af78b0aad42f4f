//! Gridded forecast field container
//!
//! A [`GriddedField`] holds one model's output: ordered latitude/longitude
//! axes, an optional pressure-level axis (hPa), an optional time axis, and
//! named scalar arrays in time-major `[t][level][lat][lon]` layout. The
//! retrieval layer builds one per request; the engine treats it as
//! immutable.
//!
//! Axis handling mirrors what model servers actually deliver: latitude may
//! arrive north-to-south, so descending spatial axes are normalized to
//! ascending at construction time and variable rows are reordered to match.
//! Shape violations are hard errors; a *missing* variable or level is not,
//! detectors degrade to "not detected" instead.

use crate::error::AnalysisError;
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// GFS absolute vorticity on pressure levels (s⁻¹)
pub const VAR_VORTICITY: &str = "absvprs";
/// GFS u-wind on pressure levels (m/s)
pub const VAR_U_PRS: &str = "ugrdprs";
/// GFS v-wind on pressure levels (m/s)
pub const VAR_V_PRS: &str = "vgrdprs";
/// GFS 10 m u-wind (m/s)
pub const VAR_U10: &str = "ugrd10m";
/// GFS 10 m v-wind (m/s)
pub const VAR_V10: &str = "vgrd10m";

/// Accepted names for significant wave height, in lookup order. Wave model
/// vocabularies differ between servers.
pub const WAVE_HEIGHT_VARS: &[&str] = &["htsgwsfc", "swh", "hs", "significant_wave_height"];
/// Accepted names for dominant wave period, in lookup order
pub const WAVE_PERIOD_VARS: &[&str] = &["perpwsfc", "mwp", "tp", "peak_period"];

/// Geographic search region (degrees, west longitudes negative)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl BoundingBox {
    /// Create a bounding box; min/max are swapped if supplied reversed
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self {
            lat_min: lat_min.min(lat_max),
            lat_max: lat_min.max(lat_max),
            lon_min: lon_min.min(lon_max),
            lon_max: lon_min.max(lon_max),
        }
    }

    /// Whether a position falls inside (edges inclusive)
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }
}

/// Immutable gridded scalar fields for one model run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GriddedField {
    name: String,
    lats: Vec<f64>,
    lons: Vec<f64>,
    levels: Option<Vec<f64>>,
    times: Option<Vec<DateTime<Utc>>>,
    variables: FxHashMap<String, Vec<f64>>,
    // True when the supplied axis arrived descending and was reversed;
    // add_variable reorders incoming rows so storage stays ascending.
    lat_reversed: bool,
    lon_reversed: bool,
}

impl GriddedField {
    /// Create a field with spatial axes only (one implicit level and
    /// timestep).
    ///
    /// # Errors
    /// [`AnalysisError::EmptyAxis`] when an axis has no entries;
    /// [`AnalysisError::AxisNotMonotonic`] when an axis is neither strictly
    /// ascending nor strictly descending.
    pub fn new(name: &str, lats: Vec<f64>, lons: Vec<f64>) -> Result<Self, AnalysisError> {
        let (lats, lat_reversed) = normalize_axis(lats, "lat")?;
        let (lons, lon_reversed) = normalize_axis(lons, "lon")?;
        Ok(Self {
            name: name.to_string(),
            lats,
            lons,
            levels: None,
            times: None,
            variables: FxHashMap::default(),
            lat_reversed,
            lon_reversed,
        })
    }

    /// Attach a pressure-level axis (hPa). Level order is preserved as
    /// delivered; lookups use nearest-level search.
    ///
    /// # Errors
    /// [`AnalysisError::EmptyAxis`] when no levels are supplied, or any
    /// variable was already added (shapes would silently change).
    pub fn with_levels(mut self, levels: Vec<f64>) -> Result<Self, AnalysisError> {
        if levels.is_empty() {
            return Err(AnalysisError::EmptyAxis { axis: "lev" });
        }
        if !self.variables.is_empty() {
            return Err(AnalysisError::ShapeMismatch {
                variable: "(level axis added after variables)".to_string(),
                expected: self.expected_len(),
                actual: 0,
            });
        }
        self.levels = Some(levels);
        Ok(self)
    }

    /// Attach a time axis. An empty axis is legal and yields empty analysis
    /// results downstream.
    ///
    /// # Errors
    /// [`AnalysisError::AxisNotMonotonic`] when timestamps are not strictly
    /// increasing, or any variable was already added.
    pub fn with_times(mut self, times: Vec<DateTime<Utc>>) -> Result<Self, AnalysisError> {
        if times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(AnalysisError::AxisNotMonotonic { axis: "time" });
        }
        if !self.variables.is_empty() {
            return Err(AnalysisError::ShapeMismatch {
                variable: "(time axis added after variables)".to_string(),
                expected: self.expected_len(),
                actual: 0,
            });
        }
        self.times = Some(times);
        Ok(self)
    }

    /// Add a named scalar array in `[t][level][lat][lon]` layout (with the
    /// orientation the axes were originally supplied in).
    ///
    /// # Errors
    /// [`AnalysisError::ShapeMismatch`] when the flattened length does not
    /// equal `nt * nlev * nlat * nlon`.
    pub fn add_variable(&mut self, name: &str, values: Vec<f64>) -> Result<(), AnalysisError> {
        let expected = self.expected_len();
        if values.len() != expected {
            return Err(AnalysisError::ShapeMismatch {
                variable: name.to_string(),
                expected,
                actual: values.len(),
            });
        }
        let values = self.reorient(values);
        self.variables.insert(name.to_string(), values);
        Ok(())
    }

    /// Model name this field came from ("gfs", "ww3", ...)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ascending latitude axis
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    /// Ascending longitude axis
    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    /// Pressure-level axis, when present
    pub fn levels(&self) -> Option<&[f64]> {
        self.levels.as_deref()
    }

    /// Time axis, when present
    pub fn times(&self) -> Option<&[DateTime<Utc>]> {
        self.times.as_deref()
    }

    /// Number of timesteps (1 for a static field)
    pub fn n_times(&self) -> usize {
        self.times.as_ref().map_or(1, Vec::len)
    }

    /// Number of pressure levels (1 when the field has no level axis)
    pub fn n_levels(&self) -> usize {
        self.levels.as_ref().map_or(1, Vec::len)
    }

    /// Whether a variable is present
    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// First candidate name that resolves to a present variable
    pub fn resolve_variable<'a>(&self, candidates: &[&'a str]) -> Option<&'a str> {
        candidates.iter().copied().find(|c| self.has_variable(c))
    }

    /// Index of the level closest to `target_hpa`, or `None` when the field
    /// carries no level axis
    pub fn nearest_level(&self, target_hpa: f64) -> Option<usize> {
        let levels = self.levels.as_ref()?;
        levels
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = (*a - target_hpa).abs();
                let db = (*b - target_hpa).abs();
                da.total_cmp(&db)
            })
            .map(|(i, _)| i)
    }

    /// Index of the timestep closest to `t`, or `None` when the field has no
    /// (or an empty) time axis
    pub fn nearest_time(&self, t: DateTime<Utc>) -> Option<usize> {
        let times = self.times.as_ref()?;
        times
            .iter()
            .enumerate()
            .min_by_key(|(_, tv)| (**tv - t).num_seconds().abs())
            .map(|(i, _)| i)
    }

    /// Whether a position falls inside the field's spatial extent
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        let (lat0, lat1) = (self.lats[0], self.lats[self.lats.len() - 1]);
        let (lon0, lon1) = (self.lons[0], self.lons[self.lons.len() - 1]);
        lat >= lat0 && lat <= lat1 && lon >= lon0 && lon <= lon1
    }

    /// Raw value at axis indices. `None` when the variable is absent or an
    /// index is out of range.
    pub fn value(
        &self,
        variable: &str,
        t_idx: usize,
        lev_idx: usize,
        lat_idx: usize,
        lon_idx: usize,
    ) -> Option<f64> {
        let values = self.variables.get(variable)?;
        if t_idx >= self.n_times()
            || lev_idx >= self.n_levels()
            || lat_idx >= self.lats.len()
            || lon_idx >= self.lons.len()
        {
            return None;
        }
        let idx = ((t_idx * self.n_levels() + lev_idx) * self.lats.len() + lat_idx)
            * self.lons.len()
            + lon_idx;
        values.get(idx).copied()
    }

    /// Indices of axis entries falling inside `[min, max]` (inclusive)
    pub fn axis_indices_within(axis: &[f64], min: f64, max: f64) -> Vec<usize> {
        axis.iter()
            .enumerate()
            .filter(|(_, v)| **v >= min && **v <= max)
            .map(|(i, _)| i)
            .collect()
    }

    fn expected_len(&self) -> usize {
        self.n_times() * self.n_levels() * self.lats.len() * self.lons.len()
    }

    // Reorder incoming rows/columns when the caller's axes were descending,
    // so stored data always matches the ascending axes.
    fn reorient(&self, values: Vec<f64>) -> Vec<f64> {
        if !self.lat_reversed && !self.lon_reversed {
            return values;
        }
        let (ny, nx) = (self.lats.len(), self.lons.len());
        let blocks = self.n_times() * self.n_levels();
        let mut out = vec![0.0; values.len()];
        for b in 0..blocks {
            let base = b * ny * nx;
            for y in 0..ny {
                let sy = if self.lat_reversed { ny - 1 - y } else { y };
                for x in 0..nx {
                    let sx = if self.lon_reversed { nx - 1 - x } else { x };
                    out[base + y * nx + x] = values[base + sy * nx + sx];
                }
            }
        }
        out
    }
}

/// Validate monotonicity and flip a descending axis to ascending.
/// Returns the ascending axis and whether it was reversed.
fn normalize_axis(axis: Vec<f64>, name: &'static str) -> Result<(Vec<f64>, bool), AnalysisError> {
    if axis.is_empty() {
        return Err(AnalysisError::EmptyAxis { axis: name });
    }
    if axis.len() == 1 {
        return Ok((axis, false));
    }
    let ascending = axis.windows(2).all(|w| w[1] > w[0]);
    let descending = axis.windows(2).all(|w| w[1] < w[0]);
    if ascending {
        Ok((axis, false))
    } else if descending {
        let mut axis = axis;
        axis.reverse();
        Ok((axis, true))
    } else {
        Err(AnalysisError::AxisNotMonotonic { axis: name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn times(n: usize) -> Vec<DateTime<Utc>> {
        (0..n)
            .map(|i| Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap()
                + chrono::Duration::hours(6 * i as i64))
            .collect()
    }

    #[test]
    fn test_shape_validation() {
        let mut field = GriddedField::new("gfs", vec![30.0, 31.0], vec![-75.0, -74.0]).unwrap();
        assert!(field.add_variable(VAR_U10, vec![1.0; 3]).is_err());
        assert!(field.add_variable(VAR_U10, vec![1.0; 4]).is_ok());
        assert_eq!(field.value(VAR_U10, 0, 0, 1, 1), Some(1.0));
    }

    #[test]
    fn test_descending_latitude_normalized() {
        // Rows arrive north-to-south; value(0,0) must still be the southern row
        let mut field = GriddedField::new("gfs", vec![31.0, 30.0], vec![-75.0, -74.0]).unwrap();
        field
            .add_variable(VAR_U10, vec![10.0, 11.0, 20.0, 21.0])
            .unwrap();
        assert_eq!(field.lats(), &[30.0, 31.0]);
        // Southern row (lat 30) was the second supplied row
        assert_eq!(field.value(VAR_U10, 0, 0, 0, 0), Some(20.0));
        assert_eq!(field.value(VAR_U10, 0, 0, 1, 1), Some(11.0));
    }

    #[test]
    fn test_non_monotonic_axis_rejected() {
        assert!(GriddedField::new("gfs", vec![30.0, 32.0, 31.0], vec![-75.0]).is_err());
    }

    #[test]
    fn test_nearest_level_and_time() {
        let field = GriddedField::new("gfs", vec![30.0], vec![-75.0])
            .unwrap()
            .with_levels(vec![1000.0, 500.0, 300.0])
            .unwrap()
            .with_times(times(3))
            .unwrap();
        assert_eq!(field.nearest_level(480.0), Some(1));
        assert_eq!(field.nearest_level(250.0), Some(2));
        let t = Utc.with_ymd_and_hms(2024, 11, 1, 7, 0, 0).unwrap();
        assert_eq!(field.nearest_time(t), Some(1));
    }

    #[test]
    fn test_empty_time_axis_allowed() {
        let mut field = GriddedField::new("gfs", vec![30.0], vec![-75.0])
            .unwrap()
            .with_times(vec![])
            .unwrap();
        assert_eq!(field.n_times(), 0);
        assert!(field.add_variable(VAR_U10, vec![]).is_ok());
    }

    #[test]
    fn test_variable_aliases() {
        let mut field = GriddedField::new("ww3", vec![30.0], vec![-75.0]).unwrap();
        field.add_variable("swh", vec![2.5]).unwrap();
        assert_eq!(field.resolve_variable(WAVE_HEIGHT_VARS), Some("swh"));
        assert_eq!(field.resolve_variable(WAVE_PERIOD_VARS), None);
    }
}
