//! Corrector kicker transfer matrices.
//!
//! A kicker is a drift plus a thin angular kick fed through the homogeneous
//! coordinate: the deflected plane's angle picks up the kick `k` and its
//! position the average displacement `(L/2)·tan k` accumulated over the
//! magnet. Kickers are gated by the `enable_kickers` configuration flag at
//! the dispatch level.

use strahl_core::{Matrix, StateVector};

use crate::drift;

/// Transfer matrix of a horizontal kicker of the given length and kick.
pub fn horizontal(length: f64, ke: f64) -> Matrix {
    let mut mat = drift::matrix(length);
    mat[(StateVector::X, StateVector::K)] = 0.5 * length * ke.tan();
    mat[(StateVector::TX, StateVector::K)] = ke;
    mat
}

/// Transfer matrix of a vertical kicker of the given length and kick.
pub fn vertical(length: f64, ke: f64) -> Matrix {
    let mut mat = drift::matrix(length);
    mat[(StateVector::Y, StateVector::K)] = 0.5 * length * ke.tan();
    mat[(StateVector::TY, StateVector::K)] = ke;
    mat
}
