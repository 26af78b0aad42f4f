//! Forecast confidence over sequences of model runs, wired through the
//! cut-off detector the way the multi-run workflow uses it.

use offshore_wx_core::{
    adjust_risk_for_confidence, analyze_cutoff_consistency, analyze_detection_runs,
    detect_cutoff_low, AnalysisConfig, ConfidenceLevel, GriddedField, Trend,
};

/// Minimal single-timestep run: vorticity either quiet or carrying one
/// strong cluster inside the Gulf search box
fn model_run(active: bool) -> GriddedField {
    let lats: Vec<f64> = (0..5).map(|i| 26.0 + 1.5 * i as f64).collect();
    let lons: Vec<f64> = (0..5).map(|i| -95.0 + 1.5 * i as f64).collect();
    let mut field = GriddedField::new("gfs-run", lats, lons).unwrap();
    let mut vort = vec![1e-5; 25];
    if active {
        vort[2 * 5 + 2] = 1.5e-4;
        vort[2 * 5 + 3] = 1.3e-4;
    }
    field.add_variable("absvprs", vort).unwrap();
    field
}

#[test]
fn test_consistent_runs_give_high_confidence() {
    let cfg = AnalysisConfig::default();
    let runs: Vec<_> = (0..10)
        .map(|_| detect_cutoff_low(&model_run(true), &cfg.detection_bbox, &cfg))
        .collect();
    let conf = analyze_detection_runs(&runs, &cfg);

    assert_eq!(conf.runs_analyzed, 10);
    assert_eq!(conf.runs_with_detection, 10);
    assert!((conf.detection_rate - 1.0).abs() < 1e-9);
    assert_eq!(conf.flip_flops, 0);
    assert_eq!(conf.level, ConfidenceLevel::High);
    assert!((conf.score - 85.0).abs() < 1e-9);

    // High confidence never inflates the risk
    let adj = adjust_risk_for_confidence(55.0, &conf);
    assert!((adj.adjusted_risk - 55.0).abs() < 1e-9);
}

#[test]
fn test_flip_flopping_runs_give_low_confidence() {
    let cfg = AnalysisConfig::default();
    let runs: Vec<_> = (0..10)
        .map(|i| detect_cutoff_low(&model_run(i % 2 == 0), &cfg.detection_bbox, &cfg))
        .collect();
    let conf = analyze_detection_runs(&runs, &cfg);

    assert_eq!(conf.flip_flops, 9);
    assert_eq!(conf.level, ConfidenceLevel::Low);
    assert!((conf.detection_rate - 0.5).abs() < 1e-9);

    // Low confidence penalty caps at 20 and clamps at 100
    let adj = adjust_risk_for_confidence(90.0, &conf);
    assert!((adj.penalty - 20.0).abs() < 1e-9);
    assert!((adj.adjusted_risk - 100.0).abs() < 1e-9);
    assert!(adj.explanation.contains("inconsistent"));
}

#[test]
fn test_feature_appearing_in_recent_runs_trends_up() {
    let cfg = AnalysisConfig::default();
    // Most recent first: the newest three runs all show the feature
    let verdicts = [true, true, true, false, false, false, false, false, false];
    let conf = analyze_cutoff_consistency(&verdicts, &cfg);
    assert_eq!(conf.trend, Trend::Increasing);
    // Instability discounts the score below the flat MODERATE value
    assert_eq!(conf.level, ConfidenceLevel::Moderate);
    assert!(conf.score < 60.0);
    assert!(conf.message.contains("increasing concern"));
}

#[test]
fn test_single_run_cannot_be_assessed() {
    let cfg = AnalysisConfig::default();
    let runs = vec![detect_cutoff_low(&model_run(true), &cfg.detection_bbox, &cfg)];
    let conf = analyze_detection_runs(&runs, &cfg);
    assert_eq!(conf.level, ConfidenceLevel::InsufficientData);

    // Unassessable forecasts still carry a penalty
    let adj = adjust_risk_for_confidence(30.0, &conf);
    assert!((adj.penalty - 15.0).abs() < 1e-9);
}
