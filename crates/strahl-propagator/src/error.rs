//! Error types for propagation and beam production.

use std::error::Error;
use std::fmt;

use strahl_core::ParticleError;
use strahl_elements::ElementError;

/// Errors raised while propagating one particle.
///
/// Note that a particle absorbed by the beam pipe is not an error: aperture
/// stops are reported through
/// [`Propagation::Stopped`](crate::Propagation::Stopped).
#[derive(Clone, Debug, PartialEq)]
pub enum PropagationError {
    /// An element's transfer matrix could not be evaluated.
    Element {
        /// Name of the element being traversed.
        element: String,
        /// The underlying element error.
        source: ElementError,
    },
    /// Trajectory bookkeeping failed.
    Particle(ParticleError),
}

impl fmt::Display for PropagationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element { element, source } => {
                write!(f, "propagation through '{element}' failed: {source}")
            }
            Self::Particle(source) => write!(f, "trajectory error: {source}"),
        }
    }
}

impl Error for PropagationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Element { source, .. } => Some(source),
            Self::Particle(source) => Some(source),
        }
    }
}

impl From<ParticleError> for PropagationError {
    fn from(source: ParticleError) -> Self {
        Self::Particle(source)
    }
}

/// Errors from the beam-producer particle sources.
#[derive(Clone, Debug, PartialEq)]
pub enum BeamError {
    /// A linear scanner was asked for more particles than it was set up for.
    Exhausted {
        /// Number of particles the scanner was configured to produce.
        capacity: u32,
    },
}

impl fmt::Display for BeamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { capacity } => {
                write!(f, "scanner exhausted after {capacity} particles")
            }
        }
    }
}

impl Error for BeamError {}
