//! Forecast confidence from multi-run consistency
//!
//! A single model run says what one forecast thinks; the run-to-run
//! history says how much to trust it. This module scores agreement across
//! successive runs of the cut-off detector and converts poor agreement
//! into a risk penalty.

use crate::config::AnalysisConfig;
use crate::detect::CutoffDetection;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Agreement level across model runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    /// Strong agreement, few flip-flops
    High,
    /// Workable agreement
    Moderate,
    /// Mixed signals or frequent flip-flops
    Low,
    /// Fewer than two runs to compare
    InsufficientData,
}

/// Direction the detection rate is moving across recent runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    /// Recent runs detect the feature more often than older ones
    Increasing,
    /// Recent runs detect the feature less often
    Decreasing,
    /// No meaningful shift
    Stable,
}

/// Multi-run consistency assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceResult {
    /// Banded confidence level
    pub level: ConfidenceLevel,
    /// Share of runs detecting the feature (0-1)
    pub detection_rate: f64,
    /// Adjacent run pairs that disagree
    pub flip_flops: usize,
    /// Runs compared
    pub runs_analyzed: usize,
    /// Runs that detected the feature
    pub runs_with_detection: usize,
    /// Recent-versus-older detection trend
    pub trend: Trend,
    /// 0-100 confidence score
    pub score: f64,
    /// Human-readable summary
    pub message: String,
}

/// Risk adjusted for forecast uncertainty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAdjustment {
    /// Risk before the penalty
    pub base_risk: f64,
    /// Uncertainty penalty applied
    pub penalty: f64,
    /// Penalized risk, clamped to 100
    pub adjusted_risk: f64,
    /// Why the adjustment was (or was not) made
    pub explanation: String,
}

/// Score run-to-run agreement of cut-off detection.
///
/// `detections` is ordered most recent first. Agreement is symmetric: ten
/// runs all saying "no cut-off" are as confident as ten all saying "yes".
#[must_use]
pub fn analyze_cutoff_consistency(
    detections: &[bool],
    cfg: &AnalysisConfig,
) -> ConfidenceResult {
    let runs = detections.len();
    if runs < 2 {
        return ConfidenceResult {
            level: ConfidenceLevel::InsufficientData,
            detection_rate: 0.0,
            flip_flops: 0,
            runs_analyzed: runs,
            runs_with_detection: detections.iter().filter(|d| **d).count(),
            trend: Trend::Stable,
            score: 0.0,
            message: "Cannot assess confidence: insufficient data.".to_string(),
        };
    }

    let with_detection = detections.iter().filter(|d| **d).count();
    let rate = with_detection as f64 / runs as f64;
    let flip_flops = detections.windows(2).filter(|w| w[0] != w[1]).count();
    let trend = detection_trend(detections, cfg.trend_delta);

    // Agreement measures consensus in either direction
    let agreement = rate.max(1.0 - rate);
    let level = if agreement >= 0.8 && flip_flops <= 2 {
        ConfidenceLevel::High
    } else if (0.4..=0.6).contains(&rate) || flip_flops >= 5 {
        ConfidenceLevel::Low
    } else {
        ConfidenceLevel::Moderate
    };

    let mut score = match level {
        ConfidenceLevel::High => 85.0,
        ConfidenceLevel::Moderate => 60.0,
        ConfidenceLevel::Low => 30.0,
        ConfidenceLevel::InsufficientData => 0.0,
    };
    if flip_flops > 2 {
        score *= 0.8;
    }
    if trend != Trend::Stable {
        score *= 0.9;
    }

    let message = confidence_message(level, rate, flip_flops, trend);
    info!(
        "Forecast confidence: {level:?} ({score:.0}/100), detection rate={:.0}%, flip_flops={flip_flops}",
        rate * 100.0
    );

    ConfidenceResult {
        level,
        detection_rate: rate,
        flip_flops,
        runs_analyzed: runs,
        runs_with_detection: with_detection,
        trend,
        score,
        message,
    }
}

/// Convenience wrapper over per-run detector output, most recent first
#[must_use]
pub fn analyze_detection_runs(
    runs: &[CutoffDetection],
    cfg: &AnalysisConfig,
) -> ConfidenceResult {
    let verdicts: Vec<bool> = runs.iter().map(|r| r.detected).collect();
    analyze_cutoff_consistency(&verdicts, cfg)
}

/// Convert forecast uncertainty into a risk penalty. Low confidence
/// raises perceived risk: an unreliable forecast is itself a hazard.
#[must_use]
pub fn adjust_risk_for_confidence(
    base_risk: f64,
    confidence: &ConfidenceResult,
) -> RiskAdjustment {
    let penalty = confidence_penalty(confidence);
    let adjusted_risk = (base_risk + penalty).min(100.0);

    let explanation = if penalty == 0.0 {
        "No adjustment: forecast confidence is high.".to_string()
    } else {
        match confidence.level {
            ConfidenceLevel::Low => format!(
                "Risk increased by {penalty:.0} points due to LOW forecast confidence. Model runs are inconsistent."
            ),
            ConfidenceLevel::Moderate => format!(
                "Risk increased by {penalty:.0} points due to MODERATE forecast confidence. Some run-to-run variation observed."
            ),
            _ => format!("Risk adjusted by {penalty:.0} points for forecast uncertainty."),
        }
    };

    RiskAdjustment {
        base_risk,
        penalty,
        adjusted_risk,
        explanation,
    }
}

/// Uncertainty penalty for a confidence result. Low confidence scales
/// with flip-flop count up to a cap.
#[must_use]
pub fn confidence_penalty(confidence: &ConfidenceResult) -> f64 {
    match confidence.level {
        ConfidenceLevel::High => 0.0,
        ConfidenceLevel::Moderate => 10.0,
        ConfidenceLevel::Low => (12.0 + 2.0 * confidence.flip_flops as f64).min(20.0),
        ConfidenceLevel::InsufficientData => 15.0,
    }
}

/// Most-recent third versus oldest third, needs at least 6 runs
fn detection_trend(detections: &[bool], delta: f64) -> Trend {
    let n = detections.len();
    if n < 6 {
        return Trend::Stable;
    }
    let third = n / 3;
    let rate = |slice: &[bool]| {
        slice.iter().filter(|d| **d).count() as f64 / slice.len() as f64
    };
    let recent = rate(&detections[..third]);
    let oldest = rate(&detections[n - third..]);
    if recent > oldest + delta {
        Trend::Increasing
    } else if recent < oldest - delta {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn confidence_message(
    level: ConfidenceLevel,
    rate: f64,
    flip_flops: usize,
    trend: Trend,
) -> String {
    let mut msg = match level {
        ConfidenceLevel::High => {
            if rate > 0.8 {
                "HIGH confidence: All recent runs consistently show the cut-off low.".to_string()
            } else if rate < 0.2 {
                "HIGH confidence: All recent runs consistently show NO cut-off low.".to_string()
            } else {
                "HIGH confidence: Consistent model behavior across runs.".to_string()
            }
        }
        ConfidenceLevel::Moderate => {
            let mut m = format!(
                "MODERATE confidence: {:.0}% of runs show the feature.",
                rate * 100.0
            );
            if flip_flops > 0 {
                m.push_str(&format!(
                    " Some run-to-run variation ({flip_flops} flip-flops)."
                ));
            }
            m
        }
        ConfidenceLevel::Low => format!(
            "LOW confidence: Inconsistent model behavior. Detection rate={:.0}%, {flip_flops} flip-flops.",
            rate * 100.0
        ),
        ConfidenceLevel::InsufficientData => {
            "Cannot assess confidence: insufficient data.".to_string()
        }
    };
    match trend {
        Trend::Increasing => msg.push_str(" Recent runs show increasing concern."),
        Trend::Decreasing => msg.push_str(" Recent runs show decreasing concern."),
        Trend::Stable => {}
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cfg() -> AnalysisConfig {
        AnalysisConfig::default()
    }

    #[test]
    fn test_unanimous_detection_is_high_confidence() {
        let result = analyze_cutoff_consistency(&[true; 10], &cfg());
        assert_eq!(result.level, ConfidenceLevel::High);
        assert_relative_eq!(result.detection_rate, 1.0, epsilon = 1e-9);
        assert_eq!(result.flip_flops, 0);
        assert_relative_eq!(result.score, 85.0, epsilon = 1e-9);
        assert!(result.message.contains("consistently show the cut-off low"));
    }

    #[test]
    fn test_unanimous_absence_is_also_high_confidence() {
        let result = analyze_cutoff_consistency(&[false; 8], &cfg());
        assert_eq!(result.level, ConfidenceLevel::High);
        assert_relative_eq!(result.detection_rate, 0.0, epsilon = 1e-9);
        assert!(result.message.contains("NO cut-off low"));
    }

    #[test]
    fn test_alternating_runs_are_low_confidence() {
        let runs: Vec<bool> = (0..10).map(|i| i % 2 == 0).collect();
        let result = analyze_cutoff_consistency(&runs, &cfg());
        assert_eq!(result.flip_flops, 9);
        assert_eq!(result.level, ConfidenceLevel::Low);
        assert_relative_eq!(result.detection_rate, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_single_run_is_insufficient() {
        let result = analyze_cutoff_consistency(&[true], &cfg());
        assert_eq!(result.level, ConfidenceLevel::InsufficientData);
        assert_eq!(result.runs_analyzed, 1);
    }

    #[test]
    fn test_trend_detection() {
        // Most recent first: feature appearing in newer runs only
        let runs = [true, true, true, false, false, false, false, false, false];
        let result = analyze_cutoff_consistency(&runs, &cfg());
        assert_eq!(result.trend, Trend::Increasing);
        assert!(result.message.contains("increasing concern"));

        let reversed: Vec<bool> = runs.iter().rev().copied().collect();
        let result = analyze_cutoff_consistency(&reversed, &cfg());
        assert_eq!(result.trend, Trend::Decreasing);
    }

    #[test]
    fn test_trend_needs_six_runs() {
        let result = analyze_cutoff_consistency(&[true, true, false, false, false], &cfg());
        assert_eq!(result.trend, Trend::Stable);
    }

    #[test]
    fn test_flip_flops_discount_the_score() {
        // 80% agreement but churned: high agreement path blocked by
        // flip-flop count
        let runs = [true, false, true, false, true, true, true, true, true, true];
        let result = analyze_cutoff_consistency(&runs, &cfg());
        assert_eq!(result.flip_flops, 4);
        assert_eq!(result.level, ConfidenceLevel::Moderate);
        assert!(result.score < 60.0);
    }

    #[test]
    fn test_low_confidence_penalty_scales_and_caps() {
        let runs: Vec<bool> = (0..10).map(|i| i % 2 == 0).collect();
        let low = analyze_cutoff_consistency(&runs, &cfg());
        let adj = adjust_risk_for_confidence(50.0, &low);
        // 12 + 2*9 caps at 20
        assert_relative_eq!(adj.penalty, 20.0, epsilon = 1e-9);
        assert_relative_eq!(adj.adjusted_risk, 70.0, epsilon = 1e-9);
        assert!(adj.explanation.contains("LOW"));
    }

    #[test]
    fn test_high_confidence_leaves_risk_alone() {
        let high = analyze_cutoff_consistency(&[true; 6], &cfg());
        let adj = adjust_risk_for_confidence(42.0, &high);
        assert_relative_eq!(adj.penalty, 0.0, epsilon = 1e-9);
        assert_relative_eq!(adj.adjusted_risk, 42.0, epsilon = 1e-9);
    }

    #[test]
    fn test_adjusted_risk_is_clamped() {
        let runs = [true, true, false, true];
        let moderate = analyze_cutoff_consistency(&runs, &cfg());
        assert_eq!(moderate.level, ConfidenceLevel::Moderate);
        let adj = adjust_risk_for_confidence(95.0, &moderate);
        assert_relative_eq!(adj.adjusted_risk, 100.0, epsilon = 1e-9);
    }
}
