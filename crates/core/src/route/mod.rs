//! Offshore routes: waypoints, great-circle geometry, vessel timing
//!
//! A [`Route`] is an ordered sequence of waypoints. Geometry here is purely
//! kinematic: distances, bearings, positions at a distance fraction, and
//! constant-speed timestamped waypoints for the sampler. Nothing in this
//! module reads weather data.

pub mod variants;

pub use variants::{create_variants, RouteVariant};

use crate::core_types::Vessel;
use crate::error::AnalysisError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Earth radius in nautical miles
const EARTH_RADIUS_NM: f64 = 3440.065;

/// Position on a route, optionally with an ETA
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    /// Expected time at this position, when the route has been timed
    pub time: Option<DateTime<Utc>>,
}

impl Waypoint {
    /// Untimed waypoint
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            time: None,
        }
    }

    /// Waypoint with an ETA
    pub fn timed(lat: f64, lon: f64, time: DateTime<Utc>) -> Self {
        Self {
            lat,
            lon,
            time: Some(time),
        }
    }
}

/// Which tactical variant of a base route this is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteVariantKind {
    /// The unmodified base track
    Direct,
    /// North-biased track (cross the Gulf Stream early, exit north)
    Northern,
    /// South-biased track
    Southern,
    /// Break the passage at Bermuda
    ViaBermuda,
}

/// An offshore passage as an ordered waypoint sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// Route identifier ("hampton-bermuda", "hampton-bermuda-north", ...)
    pub name: String,
    /// Variant relationship to the base track
    pub variant: RouteVariantKind,
    waypoints: Vec<Waypoint>,
}

impl Route {
    /// Build a route from waypoints.
    ///
    /// # Errors
    /// [`AnalysisError::InvalidRoute`] when fewer than two waypoints are
    /// supplied or two consecutive waypoints coincide.
    pub fn new(name: &str, waypoints: Vec<Waypoint>) -> Result<Self, AnalysisError> {
        if waypoints.len() < 2 {
            return Err(AnalysisError::InvalidRoute(format!(
                "route '{name}' needs at least 2 waypoints, got {}",
                waypoints.len()
            )));
        }
        for pair in waypoints.windows(2) {
            if pair[0].lat == pair[1].lat && pair[0].lon == pair[1].lon {
                return Err(AnalysisError::InvalidRoute(format!(
                    "route '{name}' has consecutive duplicate waypoints at ({}, {})",
                    pair[0].lat, pair[0].lon
                )));
            }
        }
        Ok(Self {
            name: name.to_string(),
            variant: RouteVariantKind::Direct,
            waypoints,
        })
    }

    pub(crate) fn with_variant(mut self, variant: RouteVariantKind) -> Self {
        self.variant = variant;
        self
    }

    /// Hampton Roads to Bermuda (~640 nm)
    pub fn hampton_bermuda() -> Self {
        Self::standard("hampton-bermuda", (37.0, -76.3), (32.3, -64.8))
    }

    /// Hampton Roads to Antigua (~1500 nm)
    pub fn hampton_antigua() -> Self {
        Self::standard("hampton-antigua", (37.0, -76.3), (17.0, -61.8))
    }

    /// Bermuda to Antigua (~850 nm)
    pub fn bermuda_antigua() -> Self {
        Self::standard("bermuda-antigua", (32.3, -64.8), (17.0, -61.8))
    }

    /// Beaufort NC to Bermuda (~580 nm)
    pub fn beaufort_bermuda() -> Self {
        Self::standard("beaufort-bermuda", (34.7, -76.7), (32.3, -64.8))
    }

    fn standard(name: &str, start: (f64, f64), end: (f64, f64)) -> Self {
        Self {
            name: name.to_string(),
            variant: RouteVariantKind::Direct,
            waypoints: vec![Waypoint::new(start.0, start.1), Waypoint::new(end.0, end.1)],
        }
    }

    /// The waypoint sequence
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Total distance along all legs (nm)
    pub fn total_distance_nm(&self) -> f64 {
        self.waypoints
            .windows(2)
            .map(|p| haversine_nm(p[0].lat, p[0].lon, p[1].lat, p[1].lon))
            .sum()
    }

    /// Position at a fractional distance along the route (0 = start,
    /// 1 = end). Fractions outside [0, 1] clamp to the endpoints.
    pub fn position_at_fraction(&self, fraction: f64) -> (f64, f64) {
        let first = self.waypoints[0];
        let last = self.waypoints[self.waypoints.len() - 1];
        if fraction <= 0.0 {
            return (first.lat, first.lon);
        }
        if fraction >= 1.0 {
            return (last.lat, last.lon);
        }

        let cumulative = self.cumulative_distances();
        let total = cumulative[cumulative.len() - 1];
        let target = fraction * total;

        for i in 1..cumulative.len() {
            if target <= cumulative[i] {
                let seg_len = cumulative[i] - cumulative[i - 1];
                let seg_frac = if seg_len > 0.0 {
                    (target - cumulative[i - 1]) / seg_len
                } else {
                    0.0
                };
                let a = self.waypoints[i - 1];
                let b = self.waypoints[i];
                return (
                    a.lat + seg_frac * (b.lat - a.lat),
                    a.lon + seg_frac * (b.lon - a.lon),
                );
            }
        }
        (last.lat, last.lon)
    }

    /// Evenly spaced (by distance) untimed waypoints along the route
    pub fn interpolate_waypoints(&self, num_points: usize) -> Vec<Waypoint> {
        if num_points < 2 {
            return vec![self.waypoints[0], self.waypoints[self.waypoints.len() - 1]];
        }
        (0..num_points)
            .map(|i| {
                let f = i as f64 / (num_points - 1) as f64;
                let (lat, lon) = self.position_at_fraction(f);
                Waypoint::new(lat, lon)
            })
            .collect()
    }

    /// Vessel positions at fixed time steps, assuming constant average speed
    /// along the track. The final waypoint is the arrival position/time.
    pub fn timed_waypoints(
        &self,
        vessel: &Vessel,
        departure: DateTime<Utc>,
        step_hours: u32,
    ) -> Vec<Waypoint> {
        let total_nm = self.total_distance_nm();
        let total_hours = total_nm / vessel.avg_speed_kn;
        let step = f64::from(step_hours.max(1));

        let mut points = Vec::new();
        let mut elapsed: f64 = 0.0;
        loop {
            let clamped = elapsed.min(total_hours);
            let fraction = (clamped * vessel.avg_speed_kn) / total_nm;
            let (lat, lon) = self.position_at_fraction(fraction);
            let eta = departure + Duration::seconds((clamped * 3600.0) as i64);
            points.push(Waypoint::timed(lat, lon, eta));
            if clamped >= total_hours {
                break;
            }
            elapsed += step;
        }
        points
    }

    /// Estimated arrival at constant average speed
    pub fn estimate_arrival(&self, vessel: &Vessel, departure: DateTime<Utc>) -> DateTime<Utc> {
        let hours = self.total_distance_nm() / vessel.avg_speed_kn;
        departure + Duration::seconds((hours * 3600.0) as i64)
    }

    /// Heading (initial great-circle bearing) toward the next point for each
    /// of the given positions along this route. The last position repeats
    /// the bearing of its predecessor so lengths match.
    pub fn leg_headings(points: &[Waypoint]) -> Vec<f64> {
        if points.len() < 2 {
            return vec![0.0; points.len()];
        }
        let mut headings: Vec<f64> = points
            .windows(2)
            .map(|p| initial_bearing_deg(p[0].lat, p[0].lon, p[1].lat, p[1].lon))
            .collect();
        let last = headings[headings.len() - 1];
        headings.push(last);
        headings
    }

    fn cumulative_distances(&self) -> Vec<f64> {
        let mut cumulative = vec![0.0];
        for pair in self.waypoints.windows(2) {
            let d = haversine_nm(pair[0].lat, pair[0].lon, pair[1].lat, pair[1].lon);
            cumulative.push(cumulative[cumulative.len() - 1] + d);
        }
        cumulative
    }
}

/// Great-circle distance between two positions in nautical miles
pub fn haversine_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    EARTH_RADIUS_NM * 2.0 * a.sqrt().asin()
}

/// Initial great-circle bearing from point 1 toward point 2 (degrees true)
pub fn initial_bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dlambda = (lon2 - lon1).to_radians();
    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();
    y.atan2(x).to_degrees().rem_euclid(360.0)
}
