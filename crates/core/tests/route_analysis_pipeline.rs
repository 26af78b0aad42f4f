//! End-to-end route analysis on a synthetic forecast field: cut-off
//! detection with reattachment, route sampling, and composite risk.

use chrono::{DateTime, TimeZone, Utc};
use offshore_wx_core::{
    analyze_route_waves, analyze_route_winds, detect_cutoff_low, score_route_risk,
    track_cutoff_reattachment, AnalysisConfig, GriddedField, RiskLevel, Route, SampleValue,
    Vessel, Waypoint,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const NLAT: usize = 11; // 24°N to 44°N, 2° steps
const NLON: usize = 19; // 96°W to 60°W, 2° steps
const NLEV: usize = 2; // 500 and 300 hPa
const NT: usize = 5; // 24 hours at 6-hour steps

fn idx(t: usize, l: usize, y: usize, x: usize) -> usize {
    ((t * NLEV + l) * NLAT + y) * NLON + x
}

/// A forecast with a cut-off low crossing the Gulf box eastward while the
/// jet spins up, plus strong winds and high seas everywhere on the route.
fn stormy_forecast() -> GriddedField {
    let lats: Vec<f64> = (0..NLAT).map(|i| 24.0 + 2.0 * i as f64).collect();
    let lons: Vec<f64> = (0..NLON).map(|i| -96.0 + 2.0 * i as f64).collect();
    let times: Vec<DateTime<Utc>> = (0..NT)
        .map(|i| {
            Utc.with_ymd_and_hms(2024, 11, 1, 0, 0, 0).unwrap()
                + chrono::Duration::hours(6 * i as i64)
        })
        .collect();
    let mut field = GriddedField::new("gfs-synthetic", lats, lons)
        .unwrap()
        .with_levels(vec![500.0, 300.0])
        .unwrap()
        .with_times(times)
        .unwrap();

    let n = NT * NLEV * NLAT * NLON;

    // 500 hPa vorticity: a 2x2 exceedance cluster at 28-30°N marching
    // east by one column per timestep
    let mut vort = vec![1e-5; n];
    for t in 0..NT {
        for y in [2, 3] {
            for x in [t, t + 1] {
                vort[idx(t, 0, y, x)] = 1.2e-4;
            }
        }
    }
    field.add_variable("absvprs", vort).unwrap();

    // 300 hPa winds strengthening run over run; 500 hPa winds modest
    let mut u_prs = vec![10.0; n];
    for t in 0..NT {
        for y in 0..NLAT {
            for x in 0..NLON {
                u_prs[idx(t, 1, y, x)] = 20.0 + 5.0 * t as f64;
            }
        }
    }
    field.add_variable("ugrdprs", u_prs).unwrap();
    field.add_variable("vgrdprs", vec![0.0; n]).unwrap();

    // Surface: 16 m/s wind, 3.5 m seas at 6 s, everywhere
    field.add_variable("ugrd10m", vec![16.0; n]).unwrap();
    field.add_variable("vgrd10m", vec![0.0; n]).unwrap();
    field.add_variable("htsgwsfc", vec![3.5; n]).unwrap();
    field.add_variable("perpwsfc", vec![6.0; n]).unwrap();

    field
}

#[test]
fn test_stormy_forecast_scores_high_risk() {
    init_tracing();
    let field = stormy_forecast();
    let cfg = AnalysisConfig::default();

    // The cut-off is found on every timestep and tracks east
    let detection = detect_cutoff_low(&field, &cfg.detection_bbox, &cfg);
    assert!(detection.detected);
    assert_eq!(detection.time_indices, vec![0, 1, 2, 3, 4]);
    let first = detection.centroids[0];
    let last = detection.centroids[detection.centroids.len() - 1];
    assert!(last.lon > first.lon);

    // Eastward displacement past the threshold with a strengthening jet
    let track = track_cutoff_reattachment(&field, &detection, &cfg);
    assert!(track.eastward_displacement_deg > cfg.reattachment_eastward_deg);
    assert!(track.jet_strengthening);
    assert!(track.reattachment);

    // Conditions along the passage exceed both hazard thresholds
    let route = Route::hampton_bermuda();
    let vessel = Vessel::typical("Mango");
    let departure = Utc.with_ymd_and_hms(2024, 11, 1, 12, 0, 0).unwrap();
    let waypoints = route.timed_waypoints(&vessel, departure, 6);

    let wind = analyze_route_winds(&field, &waypoints, &cfg);
    assert_eq!(wind.samples_excluded, 0);
    assert!((wind.percent_above_threshold - 100.0).abs() < 1e-9);
    assert!((wind.max_wind_ms.unwrap() - 16.0).abs() < 1e-9);

    let wave = analyze_route_waves(&field, &waypoints, &cfg);
    assert!((wave.percent_above_threshold - 100.0).abs() < 1e-9);
    assert!((wave.mean_period_s.unwrap() - 6.0).abs() < 1e-9);

    // Everything maxed: 40 + 40 + 20
    let score = score_route_risk(&wind, &wave, Some((&detection, Some(&track))), &cfg);
    assert!((score.total - 100.0).abs() < 1e-9);
    assert_eq!(score.level, RiskLevel::High);
    assert!(score.factors.iter().any(|f| f.contains("reattaching")));
    assert!(score.recommendation.contains("delaying departure"));
}

#[test]
fn test_coverage_gap_shrinks_the_denominator() {
    init_tracing();
    let field = stormy_forecast();
    let cfg = AnalysisConfig::default();

    // 16 waypoints on the grid, 4 pushed far north of it
    let mut waypoints: Vec<Waypoint> = (0..16)
        .map(|i| Waypoint::new(26.0 + i as f64, -75.0))
        .collect();
    waypoints.extend((0..4).map(|i| Waypoint::new(89.0, -75.0 + i as f64)));

    let wind = analyze_route_winds(&field, &waypoints, &cfg);
    assert_eq!(wind.samples_total, 20);
    assert_eq!(wind.samples_valid, 16);
    assert_eq!(wind.samples_excluded, 4);
    // Percentages are over valid points, not the requested count
    assert!((wind.percent_above_threshold - 100.0).abs() < 1e-9);
    assert_eq!(wind.timeline[19].speed, SampleValue::OutOfDomain);
}

#[test]
fn test_quiet_forecast_scores_low_risk() {
    init_tracing();
    let lats: Vec<f64> = (0..NLAT).map(|i| 24.0 + 2.0 * i as f64).collect();
    let lons: Vec<f64> = (0..NLON).map(|i| -96.0 + 2.0 * i as f64).collect();
    let mut field = GriddedField::new("gfs-quiet", lats, lons).unwrap();
    let n = NLAT * NLON;
    field.add_variable("absvprs", vec![1e-5; n]).unwrap();
    field.add_variable("ugrd10m", vec![5.0; n]).unwrap();
    field.add_variable("vgrd10m", vec![0.0; n]).unwrap();
    field.add_variable("htsgwsfc", vec![1.0; n]).unwrap();
    field.add_variable("perpwsfc", vec![9.0; n]).unwrap();

    let cfg = AnalysisConfig::default();
    let detection = detect_cutoff_low(&field, &cfg.detection_bbox, &cfg);
    assert!(!detection.detected);

    let route = Route::hampton_bermuda();
    let waypoints = route.interpolate_waypoints(20);
    let wind = analyze_route_winds(&field, &waypoints, &cfg);
    let wave = analyze_route_waves(&field, &waypoints, &cfg);

    let score = score_route_risk(&wind, &wave, Some((&detection, None)), &cfg);
    assert!((score.total).abs() < 1e-9);
    assert_eq!(score.level, RiskLevel::Low);
    assert!(score.recommendation.contains("favorable"));
}
