//! Quadrupole transfer matrices.
//!
//! A quadrupole focuses in one transverse plane and defocuses in the other.
//! With `ω = √|k|·L`, the focusing plane gets the trigonometric Twiss block
//! and the defocusing plane its hyperbolic analogue. The sign of the
//! effective strength selects the plane: horizontal quadrupoles require
//! `k < 0`, vertical ones `k > 0`; [`Element::matrix`](crate::Element::matrix)
//! enforces the sign before dispatching here.

use strahl_core::{Matrix, StateVector};

use crate::drift;

/// Transfer matrix of a horizontally-focusing quadrupole
/// (effective strength `ke < 0`).
pub fn horizontal(length: f64, ke: f64) -> Matrix {
    let mut mat = drift::matrix(length);

    let sq_k = (-ke).sqrt();
    let inv_sq_k = 1.0 / sq_k;
    let omega = sq_k * length;
    let (s_omega, c_omega) = omega.sin_cos();
    let (sh_omega, ch_omega) = (omega.sinh(), omega.cosh());

    // Focusing Twiss block for the horizontal plane.
    mat[(StateVector::X, StateVector::X)] = c_omega;
    mat[(StateVector::X, StateVector::TX)] = s_omega * inv_sq_k;
    mat[(StateVector::TX, StateVector::X)] = -s_omega * sq_k;
    mat[(StateVector::TX, StateVector::TX)] = c_omega;
    // Defocusing block for the vertical plane.
    mat[(StateVector::Y, StateVector::Y)] = ch_omega;
    mat[(StateVector::Y, StateVector::TY)] = sh_omega * inv_sq_k;
    mat[(StateVector::TY, StateVector::Y)] = sh_omega * sq_k;
    mat[(StateVector::TY, StateVector::TY)] = ch_omega;

    mat
}

/// Transfer matrix of a vertically-focusing quadrupole
/// (effective strength `ke > 0`).
pub fn vertical(length: f64, ke: f64) -> Matrix {
    let mut mat = drift::matrix(length);

    let sq_k = ke.sqrt();
    let inv_sq_k = 1.0 / sq_k;
    let omega = sq_k * length;
    let (s_omega, c_omega) = omega.sin_cos();
    let (sh_omega, ch_omega) = (omega.sinh(), omega.cosh());

    // Defocusing block for the horizontal plane.
    mat[(StateVector::X, StateVector::X)] = ch_omega;
    mat[(StateVector::X, StateVector::TX)] = sh_omega * inv_sq_k;
    mat[(StateVector::TX, StateVector::X)] = sh_omega * sq_k;
    mat[(StateVector::TX, StateVector::TX)] = ch_omega;
    // Focusing Twiss block for the vertical plane.
    mat[(StateVector::Y, StateVector::Y)] = c_omega;
    mat[(StateVector::Y, StateVector::TY)] = s_omega * inv_sq_k;
    mat[(StateVector::TY, StateVector::Y)] = -s_omega * sq_k;
    mat[(StateVector::TY, StateVector::TY)] = c_omega;

    mat
}
