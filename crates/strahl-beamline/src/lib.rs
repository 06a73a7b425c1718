//! Beamline assembly and sequencing.
//!
//! A [`Beamline`] is an ordered collection of optics elements along the
//! longitudinal coordinate. Insertion detects geometric overlaps between
//! element extents and, when overlap correction is enabled, resolves them by
//! splitting the earlier element around the inserted one. Sequencing
//! materialises the implicit gaps between elements as explicit drifts so a
//! propagator can walk the line without holes.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod beamline;
mod error;

pub use beamline::Beamline;
pub use error::ValidationError;
