//! Error types for element matrix evaluation.

use std::error::Error;
use std::fmt;

/// Errors from field-strength rescaling or transfer-matrix construction.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementError {
    /// A focusing strength with the wrong sign was supplied to a plane-locked
    /// quadrupole (horizontal quadrupoles require a negative strength,
    /// vertical ones a positive strength).
    WrongSignStrength {
        /// Name of the offending element.
        name: String,
        /// The effective strength that was rejected.
        strength: f64,
        /// `true` for a horizontal quadrupole, `false` for a vertical one.
        horizontal: bool,
    },
    /// The energy loss fed into the field-strength rescaling is negative.
    InvalidEnergyLoss {
        /// The offending value, in GeV.
        value: f64,
    },
    /// The traversing particle has no momentum left after the requested
    /// energy loss; the field rescaling is undefined.
    VanishingMomentum {
        /// Name of the element being traversed.
        name: String,
        /// Remaining energy after the loss, in GeV.
        remaining_energy: f64,
    },
    /// A bending or focusing formula was asked for a non-positive length.
    InvalidLength {
        /// Name of the offending element.
        name: String,
        /// The rejected length, in m.
        length: f64,
    },
}

impl fmt::Display for ElementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongSignStrength {
                name,
                strength,
                horizontal,
            } => {
                let (plane, sign) = if *horizontal {
                    ("horizontal", "negative")
                } else {
                    ("vertical", "positive")
                };
                write!(
                    f,
                    "magnetic strength for {plane} quadrupole '{name}' should be {sign}: \
                     value = {strength}"
                )
            }
            Self::InvalidEnergyLoss { value } => {
                write!(f, "invalid energy loss: {value} GeV")
            }
            Self::VanishingMomentum {
                name,
                remaining_energy,
            } => write!(
                f,
                "invalid particle momentum in '{name}': \
                 remaining energy {remaining_energy} GeV is below the rest mass"
            ),
            Self::InvalidLength { name, length } => {
                write!(f, "element '{name}' needs a positive length, got {length} m")
            }
        }
    }
}

impl Error for ElementError {}
