//! Heading-relative sea state and comfort analysis
//!
//! Wind and waves are scored relative to the vessel's heading: the same
//! 20 kt breeze reads very differently on the nose and from astern. Wave
//! scoring also folds in period (short-period seas are steep seas) and
//! the Gulf Stream's wind-against-current amplification.

use crate::config::AnalysisConfig;
use crate::core_types::grid::{GriddedField, VAR_U10, VAR_V10, WAVE_HEIGHT_VARS, WAVE_PERIOD_VARS};
use crate::core_types::Vessel;
use crate::route::{Route, Waypoint};
use crate::sampling::sample_scalar;
use crate::sampling::stats::direction_from_deg;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const KT_PER_MS: f64 = 1.943_84;
const FT_PER_M: f64 = 3.280_84;
/// Assumed dominant period (s) when the wave model carries none
const DEFAULT_WAVE_PERIOD_S: f64 = 8.0;

/// Where a wind or wave train sits relative to the bow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelativePosition {
    /// Less than 45° off the bow
    Head,
    /// 45° to 135° off the bow
    Beam,
    /// More than 135° off the bow
    Stern,
}

impl RelativePosition {
    fn from_relative_angle(angle: f64) -> Self {
        if angle < 45.0 {
            Self::Head
        } else if angle <= 135.0 {
            Self::Beam
        } else {
            Self::Stern
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Head => "on the nose",
            Self::Beam => "on the beam",
            Self::Stern => "from astern",
        }
    }
}

/// Deep-water wave steepness class, height over wavelength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SteepnessClass {
    /// Ratio below 0.02
    Gentle,
    /// Ratio below 0.035
    Moderate,
    /// Ratio below 0.05
    Steep,
    /// Ratio 0.05 and up
    VerySteep,
}

impl SteepnessClass {
    fn from_ratio(steepness: f64) -> Self {
        if steepness < 0.02 {
            Self::Gentle
        } else if steepness < 0.035 {
            Self::Moderate
        } else if steepness < 0.05 {
            Self::Steep
        } else {
            Self::VerySteep
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Gentle => "gentle seas",
            Self::Moderate => "moderate seas",
            Self::Steep => "steep seas",
            Self::VerySteep => "very steep seas",
        }
    }
}

/// Combined-discomfort band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComfortCategory {
    /// Discomfort below 25
    Comfortable,
    /// Discomfort below 50
    Acceptable,
    /// Discomfort below 70
    Uncomfortable,
    /// Discomfort 70 and up
    Miserable,
}

impl ComfortCategory {
    fn from_discomfort(discomfort: f64) -> Self {
        if discomfort < 25.0 {
            Self::Comfortable
        } else if discomfort < 50.0 {
            Self::Acceptable
        } else if discomfort < 70.0 {
            Self::Uncomfortable
        } else {
            Self::Miserable
        }
    }

    /// Human-readable description of the band
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Comfortable => "Comfortable conditions for passage making.",
            Self::Acceptable => {
                "Acceptable but somewhat uncomfortable. Manageable for experienced crews."
            }
            Self::Uncomfortable => {
                "Uncomfortable conditions. Challenging for crew, slow progress."
            }
            Self::Miserable => {
                "Miserable conditions. Safety concerns, crew fatigue, potential equipment stress."
            }
        }
    }
}

/// Surface current acting on the wave field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GulfStreamCurrent {
    /// Set speed (knots)
    pub speed_kn: f64,
    /// Set direction, degrees TOWARD which the current flows
    pub direction_deg: f64,
}

/// Heading-relative wind assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindComfort {
    /// True wind speed (m/s)
    pub wind_speed_ms: f64,
    /// True wind speed (knots)
    pub wind_speed_kt: f64,
    /// Meteorological wind direction (degrees FROM)
    pub direction_from: f64,
    /// Vessel heading (degrees)
    pub vessel_heading: f64,
    /// Vessel speed through the water (knots)
    pub vessel_speed_kn: f64,
    /// Angle off the bow, folded to [0°, 180°]
    pub relative_angle: f64,
    /// Head, beam or stern classification
    pub position: RelativePosition,
    /// Comfort score, 0-100, higher is better
    pub comfort: f64,
    /// One-line summary
    pub assessment: String,
}

/// Heading-relative wave assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveComfort {
    /// Significant wave height as sampled (m)
    pub wave_height_m: f64,
    /// Height after any current amplification (m)
    pub effective_height_m: f64,
    /// Dominant wave period (s)
    pub wave_period_s: f64,
    /// Wave direction (degrees FROM)
    pub direction_from: f64,
    /// Vessel heading (degrees)
    pub vessel_heading: f64,
    /// Angle off the bow, folded to [0°, 180°]
    pub relative_angle: f64,
    /// Head, beam or stern classification
    pub position: RelativePosition,
    /// Height over deep-water wavelength, after amplification
    pub steepness: f64,
    /// Steepness class, after amplification
    pub steepness_class: SteepnessClass,
    /// Current amplification factor applied to height
    pub amplification: f64,
    /// Comfort score, 0-100, higher is better
    pub comfort: f64,
    /// One-line summary
    pub assessment: String,
}

/// Combined wind-and-wave discomfort at one point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedDiscomfort {
    /// Combined discomfort, 0-100, higher is worse
    pub discomfort: f64,
    /// 100 minus the discomfort
    pub comfort: f64,
    /// Banded category
    pub category: ComfortCategory,
    /// Wind's share before weighting (0-100)
    pub wind_contribution: f64,
    /// Waves' share before weighting (0-100)
    pub wave_contribution: f64,
}

/// Passage-wide comfort summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageComfort {
    /// Worst combined discomfort seen
    pub max_discomfort: f64,
    /// Mean combined discomfort
    pub mean_discomfort: f64,
    /// Share of samples with discomfort above 50 (0-100)
    pub percent_uncomfortable: f64,
    /// Share of samples with discomfort above 70 (0-100)
    pub percent_miserable: f64,
    /// Index of the worst sample, when any exist
    pub worst_index: Option<usize>,
    /// Samples aggregated
    pub samples: usize,
}

/// Assess wind relative to the vessel's heading.
///
/// Headings are periodic: θ and θ + 360° give identical results.
#[must_use]
pub fn analyze_heading_relative_wind(
    wind_speed_ms: f64,
    wind_direction_from: f64,
    vessel_heading: f64,
    vessel_speed_kn: f64,
    _cfg: &AnalysisConfig,
) -> WindComfort {
    let relative_angle = relative_angle_deg(wind_direction_from, vessel_heading);
    let position = RelativePosition::from_relative_angle(relative_angle);
    let wind_speed_kt = wind_speed_ms * KT_PER_MS;

    let base = if wind_speed_kt < 15.0 {
        90.0
    } else if wind_speed_kt < 25.0 {
        70.0
    } else if wind_speed_kt < 35.0 {
        45.0
    } else {
        20.0
    };
    let position_penalty = match position {
        RelativePosition::Head => 30.0,
        RelativePosition::Beam => 10.0,
        RelativePosition::Stern => 0.0,
    };
    let comfort = f64::max(base - position_penalty, 0.0);

    let severity = if comfort > 70.0 {
        "Favorable"
    } else if comfort > 50.0 {
        "Manageable"
    } else if comfort > 30.0 {
        "Challenging"
    } else {
        "Difficult"
    };
    let assessment = format!("{severity}: {wind_speed_kt:.0} kt {}", position.describe());

    WindComfort {
        wind_speed_ms,
        wind_speed_kt,
        direction_from: wind_direction_from,
        vessel_heading,
        vessel_speed_kn,
        relative_angle,
        position,
        comfort,
        assessment,
    }
}

/// Assess waves relative to the vessel's heading.
///
/// When a current is supplied, wave height is amplified where the current
/// opposes wave travel and flattened where it follows, then the amplified
/// height feeds steepness and comfort.
#[must_use]
pub fn analyze_heading_relative_waves(
    wave_height_m: f64,
    wave_direction_from: f64,
    wave_period_s: f64,
    vessel_heading: f64,
    gulf_stream: Option<GulfStreamCurrent>,
    cfg: &AnalysisConfig,
) -> WaveComfort {
    let relative_angle = relative_angle_deg(wave_direction_from, vessel_heading);
    let position = RelativePosition::from_relative_angle(relative_angle);

    let amplification = gulf_stream.map_or(1.0, |current| {
        gulf_stream_amplification(wave_period_s, wave_direction_from, current, cfg)
    });
    let effective_height_m = wave_height_m * amplification;
    if amplification > 1.0 {
        debug!(
            "Gulf Stream amplifies {wave_height_m:.1} m waves by {amplification:.2} to {effective_height_m:.1} m"
        );
    }

    let steepness = wave_steepness(effective_height_m, wave_period_s);
    let steepness_class = SteepnessClass::from_ratio(steepness);

    let height_ft = effective_height_m * FT_PER_M;
    let base = if height_ft < 4.0 {
        85.0
    } else if height_ft < 8.0 {
        65.0
    } else if height_ft < 12.0 {
        40.0
    } else {
        15.0
    };
    let period_penalty = if wave_period_s < cfg.short_period_s {
        20.0
    } else if wave_period_s < cfg.moderate_period_s {
        10.0
    } else {
        0.0
    };
    let position_penalty = match position {
        RelativePosition::Head => 25.0,
        RelativePosition::Beam => 10.0,
        RelativePosition::Stern => 0.0,
    };
    let comfort = f64::max(base - period_penalty - position_penalty, 0.0);

    let severity = if comfort > 70.0 {
        "Comfortable"
    } else if comfort > 50.0 {
        "Tolerable"
    } else if comfort > 30.0 {
        "Uncomfortable"
    } else {
        "Severe"
    };
    let assessment = format!(
        "{severity}: {height_ft:.0} ft @ {wave_period_s:.0}s {} ({})",
        position.describe(),
        steepness_class.describe()
    );

    WaveComfort {
        wave_height_m,
        effective_height_m,
        wave_period_s,
        direction_from: wave_direction_from,
        vessel_heading,
        relative_angle,
        position,
        steepness,
        steepness_class,
        amplification,
        comfort,
        assessment,
    }
}

/// Blend wind and wave comfort into a single discomfort index.
///
/// Waves dominate the mix, and simultaneous head wind and head seas
/// amplify the result.
#[must_use]
pub fn combined_discomfort(
    wind: &WindComfort,
    wave: &WaveComfort,
    cfg: &AnalysisConfig,
) -> CombinedDiscomfort {
    let wind_contribution = 100.0 - wind.comfort;
    let wave_contribution = 100.0 - wave.comfort;

    let mut discomfort =
        wave_contribution * cfg.wave_weight + wind_contribution * cfg.wind_weight;
    if wind.position == RelativePosition::Head && wave.position == RelativePosition::Head {
        discomfort *= 1.2;
    }
    let discomfort = discomfort.min(100.0);

    CombinedDiscomfort {
        discomfort,
        comfort: 100.0 - discomfort,
        category: ComfortCategory::from_discomfort(discomfort),
        wind_contribution,
        wave_contribution,
    }
}

/// Summarize per-point discomfort over a passage
#[must_use]
pub fn aggregate_passage_comfort(samples: &[CombinedDiscomfort]) -> PassageComfort {
    if samples.is_empty() {
        return PassageComfort {
            max_discomfort: 0.0,
            mean_discomfort: 0.0,
            percent_uncomfortable: 0.0,
            percent_miserable: 0.0,
            worst_index: None,
            samples: 0,
        };
    }

    let n = samples.len();
    let mut worst_index = 0;
    let mut sum = 0.0;
    let mut uncomfortable = 0usize;
    let mut miserable = 0usize;
    for (i, sample) in samples.iter().enumerate() {
        sum += sample.discomfort;
        if sample.discomfort > samples[worst_index].discomfort {
            worst_index = i;
        }
        if sample.discomfort > 50.0 {
            uncomfortable += 1;
        }
        if sample.discomfort > 70.0 {
            miserable += 1;
        }
    }

    PassageComfort {
        max_discomfort: samples[worst_index].discomfort,
        mean_discomfort: sum / n as f64,
        percent_uncomfortable: 100.0 * uncomfortable as f64 / n as f64,
        percent_miserable: 100.0 * miserable as f64 / n as f64,
        worst_index: Some(worst_index),
        samples: n,
    }
}

/// Comfort assessment at one passage point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassagePointComfort {
    /// The route point (with its ETA, when timed)
    pub waypoint: Waypoint,
    /// Vessel heading toward the next point (degrees)
    pub heading: f64,
    /// Heading-relative wind assessment
    pub wind: WindComfort,
    /// Heading-relative wave assessment, absent on a wind-only run
    pub wave: Option<WaveComfort>,
    /// Combined discomfort at this point
    pub combined: CombinedDiscomfort,
}

/// Heading-relative comfort along a whole passage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageComfortAnalysis {
    /// Per-point detail in route order; excluded points are omitted
    pub timeline: Vec<PassagePointComfort>,
    /// Aggregate over the timeline
    pub summary: PassageComfort,
    /// Waypoints skipped for lack of usable wind data
    pub samples_excluded: usize,
}

/// Walk a route and score heading-relative comfort at every point.
///
/// Headings are the leg bearings toward each next waypoint. Wind comes
/// from the 10 m u/v components of `wind_field`; waves, when a wave field
/// carrying a height variable is supplied, are assumed to run with the
/// wind and fall back to an 8 s period when the model reports none.
/// Points without usable wind data are skipped and counted.
#[must_use]
pub fn analyze_passage_comfort(
    wind_field: &GriddedField,
    wave_field: Option<&GriddedField>,
    waypoints: &[Waypoint],
    vessel: &Vessel,
    gulf_stream: Option<GulfStreamCurrent>,
    cfg: &AnalysisConfig,
) -> PassageComfortAnalysis {
    let headings = Route::leg_headings(waypoints);
    let height_var = wave_field.and_then(|f| f.resolve_variable(WAVE_HEIGHT_VARS));
    let period_var = wave_field.and_then(|f| f.resolve_variable(WAVE_PERIOD_VARS));

    let mut timeline = Vec::with_capacity(waypoints.len());
    let mut discomforts = Vec::with_capacity(waypoints.len());
    let mut excluded = 0usize;

    for (wp, heading) in waypoints.iter().zip(headings) {
        let u = sample_scalar(wind_field, VAR_U10, wp.lat, wp.lon, wp.time);
        let v = sample_scalar(wind_field, VAR_V10, wp.lat, wp.lon, wp.time);
        let (Some(u), Some(v)) = (u.value(), v.value()) else {
            debug!("Skipping point ({}, {}): no usable wind", wp.lat, wp.lon);
            excluded += 1;
            continue;
        };
        let wind_speed_ms = Vector2::new(u, v).norm();
        let wind_dir = direction_from_deg(u, v);
        let wind = analyze_heading_relative_wind(
            wind_speed_ms,
            wind_dir,
            heading,
            vessel.avg_speed_kn,
            cfg,
        );

        let wave = height_var.and_then(|hv| {
            let field = wave_field?;
            let height = sample_scalar(field, hv, wp.lat, wp.lon, wp.time).value()?;
            let period = period_var
                .and_then(|pv| sample_scalar(field, pv, wp.lat, wp.lon, wp.time).value())
                .unwrap_or(DEFAULT_WAVE_PERIOD_S);
            // Wave direction approximated by the wind direction
            Some(analyze_heading_relative_waves(
                height,
                wind_dir,
                period,
                heading,
                gulf_stream,
                cfg,
            ))
        });

        let combined = match &wave {
            Some(wave) => combined_discomfort(&wind, wave, cfg),
            None => wind_only_discomfort(&wind),
        };
        discomforts.push(combined.clone());
        timeline.push(PassagePointComfort {
            waypoint: *wp,
            heading,
            wind,
            wave,
            combined,
        });
    }

    let summary = aggregate_passage_comfort(&discomforts);
    info!(
        "Passage comfort: max discomfort {:.1}, {:.1}% miserable ({} of {} points)",
        summary.max_discomfort,
        summary.percent_miserable,
        summary.samples,
        waypoints.len()
    );
    PassageComfortAnalysis {
        timeline,
        summary,
        samples_excluded: excluded,
    }
}

/// Discomfort from wind alone, for routes without wave data
fn wind_only_discomfort(wind: &WindComfort) -> CombinedDiscomfort {
    let discomfort = 100.0 - wind.comfort;
    CombinedDiscomfort {
        discomfort,
        comfort: wind.comfort,
        category: ComfortCategory::from_discomfort(discomfort),
        wind_contribution: discomfort,
        wave_contribution: 0.0,
    }
}

/// Angle off the bow, folded into [0°, 180°]
fn relative_angle_deg(direction_from: f64, vessel_heading: f64) -> f64 {
    let relative = (direction_from - vessel_heading).rem_euclid(360.0);
    if relative > 180.0 {
        360.0 - relative
    } else {
        relative
    }
}

/// Height over deep-water wavelength (1.56 · T²)
fn wave_steepness(height_m: f64, period_s: f64) -> f64 {
    if period_s <= 0.0 {
        return 0.0;
    }
    height_m / (1.56 * period_s * period_s)
}

/// Amplification of wave height by a current. Opposition is measured
/// between the wave TRAVEL direction (FROM plus 180°) and the current's
/// set; more than 90° apart means the current opposes the waves.
fn gulf_stream_amplification(
    wave_period_s: f64,
    wave_direction_from: f64,
    current: GulfStreamCurrent,
    cfg: &AnalysisConfig,
) -> f64 {
    if current.speed_kn <= 0.0 {
        return 1.0;
    }
    let travel = (wave_direction_from + 180.0).rem_euclid(360.0);
    let diff = relative_angle_deg(travel, current.direction_deg);
    // Short-period waves respond more strongly to the same current
    let k = if wave_period_s < cfg.short_period_s {
        0.15
    } else {
        0.08
    };
    let opposition = -diff.to_radians().cos();
    (1.0 + current.speed_kn * k * opposition).clamp(0.8, 1.5)
}
