//! Composite route risk scoring
//!
//! Folds the per-route wind and wave statistics, cut-off detection,
//! forecast confidence and passage comfort into one 0-100 score with a
//! vessel-aware recommendation.

use crate::config::AnalysisConfig;
use crate::confidence::{confidence_penalty, ConfidenceLevel, ConfidenceResult};
use crate::core_types::{Vessel, VesselClass};
use crate::detect::{CutoffDetection, ReattachmentTrack};
use crate::sampling::{RouteWaveAnalysis, RouteWindAnalysis};
use crate::sea_state::PassageComfort;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Banded route risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Score below 30
    Low,
    /// Score 30 to 60
    Moderate,
    /// Score above 60
    High,
}

impl RiskLevel {
    fn from_score(score: f64) -> Self {
        if score < 30.0 {
            Self::Low
        } else if score <= 60.0 {
            Self::Moderate
        } else {
            Self::High
        }
    }
}

/// Composite risk assessment for one route and vessel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    /// Total score, clamped to [0, 100]
    pub total: f64,
    /// Banded level
    pub level: RiskLevel,
    /// Wind contribution (0-40)
    pub wind_component: f64,
    /// Wave contribution (0-40)
    pub wave_component: f64,
    /// Cut-off low contribution (0, 10 or 20)
    pub cutoff_component: f64,
    /// Forecast uncertainty penalty (0-20)
    pub confidence_penalty: f64,
    /// Heading-relative discomfort penalty (0-20)
    pub discomfort_penalty: f64,
    /// Contributing factors, human readable
    pub factors: Vec<String>,
    /// Sailing recommendation
    pub recommendation: String,
}

/// Cut-off detection evidence feeding the score
pub type CutoffEvidence<'a> = (&'a CutoffDetection, Option<&'a ReattachmentTrack>);

/// Score a route from wind, wave and cut-off evidence.
///
/// Monotone non-decreasing in the wind and wave exceedance percentages.
/// A detected cut-off that is reattaching to the jet scores double the
/// points of a merely detected one: reattachment is what turns a stalled
/// low into a developing coastal system.
#[must_use]
pub fn score_route_risk(
    wind: &RouteWindAnalysis,
    wave: &RouteWaveAnalysis,
    cutoff: Option<CutoffEvidence<'_>>,
    _cfg: &AnalysisConfig,
) -> RiskScore {
    let mut factors = Vec::new();

    let wind_component = (wind.percent_above_threshold * 0.4).min(40.0);
    if wind_component > 20.0 {
        factors.push(format!("High wind risk ({wind_component:.0}/40)"));
    }

    let wave_component = (wave.percent_above_threshold * 0.4).min(40.0);
    if wave_component > 20.0 {
        factors.push(format!("High wave risk ({wave_component:.0}/40)"));
    }

    let cutoff_component = match cutoff {
        Some((detection, reattachment)) if detection.detected => {
            if reattachment.is_some_and(|r| r.reattachment) {
                factors.push("Cut-off low detected, reattaching to jet stream".to_string());
                20.0
            } else {
                factors.push("Cut-off low detected".to_string());
                10.0
            }
        }
        _ => 0.0,
    };

    let total = (wind_component + wave_component + cutoff_component).clamp(0.0, 100.0);
    let level = RiskLevel::from_score(total);
    info!("Route risk assessment: {level:?} ({total:.1}/100)");

    let recommendation = base_recommendation(level).to_string();
    RiskScore {
        total,
        level,
        wind_component,
        wave_component,
        cutoff_component,
        confidence_penalty: 0.0,
        discomfort_penalty: 0.0,
        factors,
        recommendation,
    }
}

/// Score a route with confidence and comfort folded in.
///
/// Adds a discomfort penalty when a large share of the passage is
/// miserable, then the forecast uncertainty penalty, re-clamps and
/// re-levels, and swaps the recommendation for a vessel-specific one.
#[must_use]
pub fn score_route_risk_enhanced(
    wind: &RouteWindAnalysis,
    wave: &RouteWaveAnalysis,
    cutoff: Option<CutoffEvidence<'_>>,
    confidence: Option<&ConfidenceResult>,
    comfort: Option<&PassageComfort>,
    vessel: &Vessel,
    cfg: &AnalysisConfig,
) -> RiskScore {
    let mut score = score_route_risk(wind, wave, cutoff, cfg);

    let discomfort_penalty = comfort.map_or(0.0, |passage| {
        if passage.percent_miserable > 20.0 {
            let penalty = (passage.percent_miserable * 0.5).min(20.0);
            score.factors.push(format!(
                "Heading-relative discomfort: {:.0}% miserable conditions",
                passage.percent_miserable
            ));
            penalty
        } else {
            0.0
        }
    });

    let uncertainty_penalty = confidence.map_or(0.0, |conf| {
        let penalty = confidence_penalty(conf);
        if penalty > 0.0 {
            score.factors.push(format!(
                "Forecast uncertainty: +{penalty:.0} points ({:?} confidence)",
                conf.level
            ));
        }
        penalty
    });

    score.discomfort_penalty = discomfort_penalty;
    score.confidence_penalty = uncertainty_penalty;
    score.total = (score.total + discomfort_penalty + uncertainty_penalty).clamp(0.0, 100.0);
    score.level = RiskLevel::from_score(score.total);
    score.recommendation = vessel_recommendation(score.level, vessel, confidence, comfort);

    info!(
        "Enhanced risk for {}: {:?} ({:.1}/100)",
        vessel.name, score.level, score.total
    );
    score
}

fn base_recommendation(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "Conditions favorable for departure. Monitor forecasts for changes.",
        RiskLevel::Moderate => {
            "Conditions marginal. Consider delaying departure or preparing for challenging conditions."
        }
        RiskLevel::High => {
            "Conditions hazardous. Strongly recommend delaying departure until conditions improve."
        }
    }
}

/// Per-vessel recommendation, keyed by risk level and speed class
fn vessel_recommendation(
    level: RiskLevel,
    vessel: &Vessel,
    confidence: Option<&ConfidenceResult>,
    comfort: Option<&PassageComfort>,
) -> String {
    let base = match (level, vessel.class) {
        (RiskLevel::Low, VesselClass::Slow) => {
            "Acceptable conditions for slow boats, but monitor forecasts. Passage will take 5-6 days."
        }
        (RiskLevel::Low, VesselClass::Typical) => {
            "Favorable conditions for typical cruising boats. 4-5 day passage."
        }
        (RiskLevel::Low, VesselClass::Fast) => {
            "Good window for fast boats. Can outrun developing systems. 3-4 day passage."
        }
        (RiskLevel::Moderate, VesselClass::Slow) => {
            "MODERATE RISK for slow boats. Extended passage time increases exposure to weather. Monitor closely and consider Bermuda bailout."
        }
        (RiskLevel::Moderate, VesselClass::Typical) => {
            "MODERATE RISK for typical boats. Conditions marginal but manageable for experienced crews."
        }
        (RiskLevel::Moderate, VesselClass::Fast) => {
            "MODERATE RISK for fast boats. Speed advantage helps but conditions still challenging."
        }
        (RiskLevel::High, VesselClass::Slow) => {
            "HIGH RISK for slow boats. Strong recommendation to delay departure or consider stopping in Bermuda to avoid extended exposure."
        }
        (RiskLevel::High, VesselClass::Typical) => {
            "HIGH RISK for typical cruising boats. Recommend delaying departure."
        }
        (RiskLevel::High, VesselClass::Fast) => {
            "HIGH RISK even for fast boats. Recommend delaying departure."
        }
    };

    let mut parts = vec![base.to_string()];
    if let Some(conf) = confidence {
        match conf.level {
            ConfidenceLevel::Low => parts.push(
                "Forecast confidence is LOW - models showing inconsistent behavior. Wait for 2-3 more runs showing agreement before final decision."
                    .to_string(),
            ),
            ConfidenceLevel::Moderate => parts.push(
                "Forecast confidence is MODERATE - some run-to-run variation. Monitor next forecast cycle."
                    .to_string(),
            ),
            _ => {}
        }
    }
    if let Some(passage) = comfort {
        if passage.percent_miserable > 30.0 {
            parts.push(format!(
                "Expect {:.0}% of passage in severely uncomfortable conditions (head seas, short period waves).",
                passage.percent_miserable
            ));
        }
    }
    parts.join(" ")
}
