//! Core types for the Strahl beamline transport library.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! fundamental abstractions used throughout the Strahl workspace: phase-space
//! state vectors, particles and their recorded trajectories, the beam
//! configuration, kinematics helpers, typed ids, and core error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod id;
pub mod kinematics;
mod particle;
mod state;

pub use config::BeamParameters;
pub use error::{ConfigError, ParticleError};
pub use id::ElementId;
pub use particle::Particle;
pub use state::StateVector;

/// A 6x6 transfer matrix mapping a [`StateVector`] across one optics element.
pub type Matrix = nalgebra::Matrix6<f64>;

/// The raw 6-component phase-space vector underlying a [`StateVector`].
pub type Vector = nalgebra::Vector6<f64>;

/// A transverse (x, y) point or offset, in metres.
pub type TwoVector = nalgebra::Vector2<f64>;

/// A four-momentum `[px, py, pz, E]`, in GeV.
pub type FourMomentum = nalgebra::Vector4<f64>;
