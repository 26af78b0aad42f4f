//! Tactical route variants
//!
//! Produces deterministic alternates for a base track: the direct route, a
//! north-biased and a south-biased track, and a via-Bermuda option for long
//! passages. Weather never enters here; callers sample each variant and let
//! the risk engine pick.

use super::{Route, RouteVariantKind, Waypoint};
use crate::core_types::Vessel;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Latitude offset applied to the north/south intermediate waypoint
const LATERAL_OFFSET_DEG: f64 = 2.0;

/// Fraction along the direct track where the offset waypoint is inserted.
/// One third in keeps the deviation early, where the Gulf Stream crossing
/// decision is made.
const OFFSET_FRACTION: f64 = 1.0 / 3.0;

/// Passages longer than this get a via-Bermuda option (nm)
const VIA_BERMUDA_MIN_NM: f64 = 1000.0;

/// Bermuda, the mid-Atlantic bailout
const BERMUDA: (f64, f64) = (32.3, -64.8);

/// A route alternative with its recomputed geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteVariant {
    /// The alternative track
    pub route: Route,
    /// Great-circle distance along the variant (nm)
    pub distance_nm: f64,
    /// Passage time at the vessel's average speed (days)
    pub passage_days: f64,
}

impl RouteVariant {
    fn from_route(route: Route, vessel: &Vessel) -> Self {
        let distance_nm = route.total_distance_nm();
        let passage_days = distance_nm / vessel.nm_per_day();
        Self {
            route,
            distance_nm,
            passage_days,
        }
    }
}

/// Build the deterministic variant set for a base route.
///
/// Always yields Direct, Northern and Southern; adds Via-Bermuda when the
/// direct track exceeds 1000 nm. Offset variants displace a waypoint one
/// third along the track by ±2° latitude and rejoin the destination.
pub fn create_variants(base: &Route, vessel: &Vessel) -> Vec<RouteVariant> {
    let start = base.waypoints()[0];
    let end = base.waypoints()[base.waypoints().len() - 1];
    let direct_nm = base.total_distance_nm();

    let mut variants = vec![RouteVariant::from_route(
        base.clone().with_variant(RouteVariantKind::Direct),
        vessel,
    )];

    let (mid_lat, mid_lon) = base.position_at_fraction(OFFSET_FRACTION);

    for (kind, suffix, offset) in [
        (RouteVariantKind::Northern, "north", LATERAL_OFFSET_DEG),
        (RouteVariantKind::Southern, "south", -LATERAL_OFFSET_DEG),
    ] {
        let waypoints = vec![
            Waypoint::new(start.lat, start.lon),
            Waypoint::new(mid_lat + offset, mid_lon),
            Waypoint::new(end.lat, end.lon),
        ];
        // Offsets from a valid base route cannot collapse waypoints
        if let Ok(route) = Route::new(&format!("{}-{suffix}", base.name), waypoints) {
            variants.push(RouteVariant::from_route(route.with_variant(kind), vessel));
        }
    }

    if direct_nm > VIA_BERMUDA_MIN_NM {
        let waypoints = vec![
            Waypoint::new(start.lat, start.lon),
            Waypoint::new(BERMUDA.0, BERMUDA.1),
            Waypoint::new(end.lat, end.lon),
        ];
        if let Ok(route) = Route::new(&format!("{}-via-bermuda", base.name), waypoints) {
            variants.push(RouteVariant::from_route(
                route.with_variant(RouteVariantKind::ViaBermuda),
                vessel,
            ));
        }
    }

    debug!(
        "Route variants for {}: {} tracks, direct {:.0} nm",
        base.name,
        variants.len(),
        direct_nm
    );
    variants
}
