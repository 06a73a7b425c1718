//! Stepwise particle propagation through a sequenced beamline.
//!
//! The [`Propagator`] walks the `(previous, current)` element pairs of a
//! gap-free beamline, applies each element's transfer matrix in the
//! element's local frame, records a trajectory sample at every element end,
//! and enforces aperture acceptance. Particles absorbed by the beam pipe are
//! reported through the [`Propagation::Stopped`] result variant, not through
//! an error: losing particles to the aperture is the expected fate of a
//! large fraction of any realistic beam.
//!
//! The [`beam`] module supplies deterministic particle sources to feed the
//! propagation: a Gaussian-smeared gun and linear coordinate scanners.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod beam;
mod error;
mod propagator;

pub use error::{BeamError, PropagationError};
pub use propagator::{Propagation, Propagator, StoppedAt};
