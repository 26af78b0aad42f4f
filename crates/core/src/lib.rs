//! Offshore Weather Analysis Core Library
//!
//! Feature detection and risk analysis for offshore passage planning on
//! gridded forecast data. Detects Gulf-region cut-off lows and their
//! reattachment to the jet stream, samples wind and wave fields along
//! sailing routes, scores heading-relative sea state and crew comfort,
//! grades forecast confidence from run-to-run consistency, and folds
//! everything into a composite 0-100 route risk score.
//!
//! ## Analysis pipeline
//!
//! - Build a [`GriddedField`] from forecast axes and variables
//! - Detect features ([`detect_cutoff_low`], [`track_cutoff_reattachment`])
//! - Sample conditions along a timed route ([`analyze_route_winds`],
//!   [`analyze_route_waves`], [`analyze_passage_comfort`])
//! - Score comfort and confidence, then risk ([`score_route_risk_enhanced`])

// Core types and utilities
pub mod core_types;

pub mod config;
pub mod error;

// Analysis modules
pub mod confidence;
pub mod detect;
pub mod risk;
pub mod route;
pub mod sampling;
pub mod sea_state;

// Re-export core types
pub use config::{AnalysisConfig, ClusterTieBreak};
pub use core_types::{BoundingBox, GriddedField, SampleValue, Vessel, VesselClass};
pub use error::AnalysisError;

// Re-export analysis types
pub use confidence::{
    adjust_risk_for_confidence, analyze_cutoff_consistency, analyze_detection_runs,
    ConfidenceLevel, ConfidenceResult, RiskAdjustment, Trend,
};
pub use detect::{
    detect_cutoff_low, detect_cutoff_low_with_threshold, track_cutoff_reattachment,
    track_jet_stream, CutoffDetection, JetStreamTrack, ReattachmentTrack,
};
pub use risk::{score_route_risk, score_route_risk_enhanced, RiskLevel, RiskScore};
pub use route::{create_variants, Route, RouteVariant, RouteVariantKind, Waypoint};
pub use sampling::{
    analyze_route_waves, analyze_route_winds, sample_route, sample_scalar, RouteSampleTimeline,
    RouteWaveAnalysis, RouteWindAnalysis,
};
pub use sea_state::{
    aggregate_passage_comfort, analyze_heading_relative_waves, analyze_heading_relative_wind,
    analyze_passage_comfort, combined_discomfort, ComfortCategory, CombinedDiscomfort,
    GulfStreamCurrent, PassageComfort, PassageComfortAnalysis, PassagePointComfort,
    RelativePosition, SteepnessClass, WaveComfort, WindComfort,
};
