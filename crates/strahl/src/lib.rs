//! Strahl: linear-optics transport of charged particles through an
//! accelerator beamline.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Strahl sub-crates. For most users, adding `strahl` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use strahl::prelude::*;
//!
//! let params = BeamParameters::default();
//!
//! // Assemble a small beamline: interaction point, a drift, a focusing
//! // quadrupole, and a collimator with a circular opening.
//! let mut line = Beamline::new(30.0);
//! let ip = Element::new(ElementKind::Marker, "ip5", 0.0, 0.0).unwrap();
//! line.set_interaction_point(ip.clone());
//! line.add(&params, ip).unwrap();
//!
//! let mut quad = Element::new(ElementKind::VerticalQuadrupole, "mqxa.1", 10.0, 6.0).unwrap();
//! quad.set_magnetic_strength(0.01);
//! line.add(&params, quad).unwrap();
//!
//! let mut coll = Element::new(ElementKind::CircularCollimator, "tcl.4", 25.0, 1.0).unwrap();
//! coll.set_aperture(Some(Aperture::circular(0.02, TwoVector::zeros())));
//! line.add(&params, coll).unwrap();
//!
//! // Materialise the gaps and walk a proton through the line.
//! let sequenced = Beamline::sequenced(&params, &line);
//! let propagator = Propagator::new(&sequenced, &params);
//!
//! let mut proton = GaussianGun::builder(&params)
//!     .seed(42)
//!     .smear_x(0.0, 10e-6)
//!     .smear_angle_x(0.0, 30e-6)
//!     .build()
//!     .shoot();
//! match propagator.propagate(&mut proton, 30.0).unwrap() {
//!     Propagation::Reached => assert!(proton.last_s() >= 30.0),
//!     Propagation::Stopped(stop) => println!("absorbed by {}", stop.element),
//! }
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strahl-core` | State vectors, particles, configuration, kinematics |
//! | [`elements`] | `strahl-elements` | Apertures, elements, transfer-matrix formulas |
//! | [`beamline`] | `strahl-beamline` | Beamline assembly, overlap resolution, sequencing |
//! | [`propagator`] | `strahl-propagator` | Propagation engine and beam producers |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// State vectors, particles, configuration, and kinematics (`strahl-core`).
pub use strahl_core as types;

/// Apertures, optics elements, and per-kind transfer-matrix formulas
/// (`strahl-elements`).
pub use strahl_elements as elements;

/// Beamline assembly, overlap resolution, and sequencing
/// (`strahl-beamline`).
pub use strahl_beamline as beamline;

/// The propagation engine and deterministic beam producers
/// (`strahl-propagator`).
pub use strahl_propagator as propagator;

/// Common imports for typical Strahl usage.
///
/// ```rust
/// use strahl::prelude::*;
/// ```
pub mod prelude {
    pub use strahl_beamline::{Beamline, ValidationError};
    pub use strahl_core::{
        BeamParameters, ConfigError, Matrix, Particle, ParticleError, StateVector, TwoVector,
        Vector,
    };
    pub use strahl_elements::{Aperture, ApertureShape, Element, ElementError, ElementKind};
    pub use strahl_propagator::beam::{GaussianGun, LinearScanner, ScanCoordinate};
    pub use strahl_propagator::{Propagation, PropagationError, Propagator, StoppedAt};
}
