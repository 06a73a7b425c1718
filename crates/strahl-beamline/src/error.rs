//! Error types for beamline assembly.

use std::error::Error;
use std::fmt;

/// Errors detected while assembling or querying a beamline.
#[derive(Clone, Debug, PartialEq)]
pub enum ValidationError {
    /// Two element extents overlap and overlap correction is disabled.
    Overlap {
        /// Name of the element already in the beamline.
        existing: String,
        /// Name of the element whose insertion was rejected.
        inserted: String,
    },
    /// An element extends past the end of a bounded beamline.
    BeyondBeamline {
        /// Name of the offending element.
        name: String,
        /// End position of the offending element, in m.
        extent: f64,
        /// Length bound of the beamline, in m.
        max_length: f64,
    },
    /// A lookup pattern is not a valid regular expression.
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Parser diagnostics for the rejection.
        reason: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overlap { existing, inserted } => write!(
                f,
                "elements overlap with '{existing}' detected while adding '{inserted}'"
            ),
            Self::BeyondBeamline {
                name,
                extent,
                max_length,
            } => write!(
                f,
                "element '{name}' is too far away for this beamline: \
                 beamline length {max_length} m, this element ends at {extent} m"
            ),
            Self::InvalidPattern { pattern, reason } => {
                write!(f, "invalid regular expression '{pattern}': {reason}")
            }
        }
    }
}

impl Error for ValidationError {}
