//! Error types for the analysis engine
//!
//! Only contract violations surface as errors. Data-availability conditions
//! (missing variable, missing level, waypoint outside the grid) are soft and
//! are reported inside result records instead, so callers can always tell
//! "no data" apart from a genuine zero.

/// Errors raised for malformed inputs. These indicate caller bugs and must
/// not be retried.
#[derive(Debug)]
pub enum AnalysisError {
    /// A latitude/longitude/time axis is not monotonic
    AxisNotMonotonic {
        /// Name of the offending axis
        axis: &'static str,
    },
    /// A required axis has no entries
    EmptyAxis {
        /// Name of the offending axis
        axis: &'static str,
    },
    /// A named array does not match the field's axis lengths
    ShapeMismatch {
        /// Variable being added
        variable: String,
        /// Expected flattened length (`nt * nlev * nlat * nlon`)
        expected: usize,
        /// Actual length supplied
        actual: usize,
    },
    /// A route violates its construction invariants
    InvalidRoute(String),
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::AxisNotMonotonic { axis } => {
                write!(f, "Axis '{axis}' is not monotonic")
            }
            AnalysisError::EmptyAxis { axis } => write!(f, "Axis '{axis}' is empty"),
            AnalysisError::ShapeMismatch {
                variable,
                expected,
                actual,
            } => write!(
                f,
                "Variable '{variable}' has {actual} values, expected {expected}"
            ),
            AnalysisError::InvalidRoute(msg) => write!(f, "Invalid route: {msg}"),
        }
    }
}

impl std::error::Error for AnalysisError {}
