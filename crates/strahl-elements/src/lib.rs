//! Optics elements and their transfer matrices.
//!
//! An [`Element`] is one piece of an accelerator beamline: a drift, a
//! bending dipole, a focusing quadrupole, a corrector kicker, a collimator,
//! or one of the passive marker kinds. Each element knows its geometry, its
//! nominal magnetic strength, an optional transverse [`Aperture`], and how to
//! compute the 6x6 transfer matrix a traversing particle is mapped by.
//!
//! The matrix formulas live in one module per magnet family
//! ([`drift`], [`dipole`], [`quadrupole`], [`kicker`]) and are dispatched
//! from [`Element::matrix`] on the closed [`ElementKind`] tag.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod aperture;
pub mod dipole;
pub mod drift;
mod element;
mod error;
pub mod kicker;
pub mod quadrupole;

pub use aperture::{Aperture, ApertureShape};
pub use element::{Element, ElementKind};
pub use error::ElementError;
