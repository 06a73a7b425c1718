//! Bending dipole transfer matrices.
//!
//! Both dipole kinds bend in the horizontal plane with bending angle
//! `θ = L·k` and bending radius `r = 1/k`. In relative-energy mode an affine
//! dispersion column couples the energy component into the horizontal plane;
//! its `(1 − cos θ)` factor is evaluated through the half-angle identity
//! `2·sin²(θ/2)` to avoid cancellation at small bending angles.
//!
//! The rectangular dipole adds the thin edge-focusing matrices of its flat
//! entry and exit faces around the sector map.

use strahl_core::{BeamParameters, Matrix, StateVector};

use crate::drift;

/// Transfer matrix of a sector dipole of length `length` and effective
/// strength `ke` (both non-zero).
pub fn sector(length: f64, ke: f64, params: &BeamParameters) -> Matrix {
    let mut mat = drift::matrix(length);

    let radius = 1.0 / ke;
    let theta = length * ke;
    let (s_theta, c_theta) = theta.sin_cos();

    mat[(StateVector::X, StateVector::X)] = c_theta;
    mat[(StateVector::X, StateVector::TX)] = s_theta * radius;
    mat[(StateVector::TX, StateVector::X)] = -ke * s_theta;
    mat[(StateVector::TX, StateVector::TX)] = c_theta;

    if params.use_relative_energy {
        let inv_energy = 1.0 / params.beam_energy;
        // stable form of (r/E0)*(1 - cos θ)
        let simp = 2.0 * radius * (0.5 * theta).sin().powi(2) * inv_energy;
        mat[(StateVector::X, StateVector::E)] = simp;
        mat[(StateVector::TX, StateVector::E)] = s_theta * inv_energy;
    }
    mat
}

/// Transfer matrix of a rectangular dipole: the sector map sandwiched
/// between the edge-focusing corrections of its flat faces.
pub fn rectangular(length: f64, ke: f64, params: &BeamParameters) -> Matrix {
    let mat = sector(length, ke, params);

    let theta = length * ke;
    let t_half = ke * (0.5 * theta).tan();
    let mut edge = Matrix::identity();
    edge[(StateVector::TX, StateVector::X)] = t_half;
    edge[(StateVector::TY, StateVector::Y)] = -t_half;

    edge * mat * edge
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use strahl_core::Vector;

    fn no_relative_energy() -> BeamParameters {
        BeamParameters {
            use_relative_energy: false,
            ..Default::default()
        }
    }

    #[test]
    fn sector_bends_an_angled_trajectory() {
        // θ = 0.1 rad over 1 m, probe with unit horizontal angle tangent.
        let (length, ke) = (1.0, 0.1);
        let mat = sector(length, ke, &no_relative_energy());
        let mut vec = Vector::zeros();
        vec[StateVector::TX] = 1.0;
        let out = mat * vec;
        let radius = 1.0 / ke;
        assert_relative_eq!(out[StateVector::X], radius * 0.1f64.sin(), epsilon = 1e-12);
        assert_relative_eq!(out[StateVector::TX], 0.1f64.cos(), epsilon = 1e-12);
        assert_eq!(out[StateVector::Y], 0.0);
    }

    #[test]
    fn sector_leaves_the_vertical_plane_alone() {
        let mat = sector(1.0, 0.3, &BeamParameters::default());
        assert_eq!(mat[(StateVector::Y, StateVector::Y)], 1.0);
        assert_eq!(mat[(StateVector::Y, StateVector::TY)], 1.0);
        assert_eq!(mat[(StateVector::TY, StateVector::TY)], 1.0);
        assert_eq!(mat[(StateVector::TY, StateVector::Y)], 0.0);
    }

    #[test]
    fn horizontal_block_is_symplectic() {
        let mat = sector(1.0, 0.25, &BeamParameters::default());
        let det = mat[(StateVector::X, StateVector::X)] * mat[(StateVector::TX, StateVector::TX)]
            - mat[(StateVector::X, StateVector::TX)] * mat[(StateVector::TX, StateVector::X)];
        assert_relative_eq!(det, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn dispersion_column_only_in_relative_energy_mode() {
        let with = sector(1.0, 0.1, &BeamParameters::default());
        let without = sector(1.0, 0.1, &no_relative_energy());
        assert!(with[(StateVector::X, StateVector::E)] != 0.0);
        assert_eq!(without[(StateVector::X, StateVector::E)], 0.0);
        assert_eq!(without[(StateVector::TX, StateVector::E)], 0.0);
    }

    #[test]
    fn dispersion_column_uses_the_stable_half_angle_form() {
        let params = BeamParameters::default();
        let (length, ke) = (1.0, 1e-3);
        let mat = sector(length, ke, &params);
        let theta: f64 = length * ke;
        let expected = (1.0 - theta.cos()) / ke / params.beam_energy;
        assert_relative_eq!(
            mat[(StateVector::X, StateVector::E)],
            expected,
            max_relative = 1e-9
        );
        // At a bending angle where the naive (1 - cos θ) rounds to zero,
        // the half-angle form still resolves the dispersion.
        let tiny = sector(1.0, 1e-9, &params);
        assert!(tiny[(StateVector::X, StateVector::E)] > 0.0);
    }

    #[test]
    fn rectangular_edge_focusing_acts_on_both_planes() {
        let params = no_relative_energy();
        let (length, ke) = (1.0, 0.2);
        let rect = rectangular(length, ke, &params);
        let t_half = ke * (0.5 * length * ke).tan();
        // Vertical plane: edge * drift * edge, so the angular row picks up
        // -t·(2 + L·t) on the position column.
        let expected_ty_y = -t_half * (2.0 - length * t_half);
        assert_relative_eq!(
            rect[(StateVector::TY, StateVector::Y)],
            expected_ty_y,
            epsilon = 1e-12
        );
        // Horizontal focusing is weakened by the entry/exit faces.
        assert!(
            rect[(StateVector::TX, StateVector::X)]
                > sector(length, ke, &params)[(StateVector::TX, StateVector::X)]
        );
    }
}
