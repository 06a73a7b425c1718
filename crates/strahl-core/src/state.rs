//! The 6-component phase-space state vector.

use std::fmt;

use crate::kinematics::longitudinal_momentum;
use crate::{FourMomentum, TwoVector, Vector};

/// Phase-space coordinates of a particle at one longitudinal position.
///
/// The underlying vector is `[x, x', y, y', E, k]`: transverse positions in
/// metres, transverse angles, energy in GeV, and a fixed homogeneous
/// coordinate `k = 1` that affine transfer-matrix columns (kicks, dispersion)
/// couple to.
///
/// The angle slots store the tangent of the trajectory angle; [`angles`] and
/// [`set_angles`] convert between radians and the stored tangents at the
/// boundary. Transfer matrices act on the stored tangents directly.
///
/// The rest mass rides along with the vector but is not part of it: no linear
/// map changes a particle's mass.
///
/// [`angles`]: StateVector::angles
/// [`set_angles`]: StateVector::set_angles
#[derive(Clone, Debug, PartialEq)]
pub struct StateVector {
    vec: Vector,
    mass: f64,
}

impl StateVector {
    /// Index of the horizontal position component, in m.
    pub const X: usize = 0;
    /// Index of the horizontal angle component (stored as a tangent).
    pub const TX: usize = 1;
    /// Index of the vertical position component, in m.
    pub const Y: usize = 2;
    /// Index of the vertical angle component (stored as a tangent).
    pub const TY: usize = 3;
    /// Index of the energy component, in GeV.
    pub const E: usize = 4;
    /// Index of the homogeneous kick coordinate.
    pub const K: usize = 5;

    /// Build a state vector from its raw 6-component form and a rest mass.
    pub fn new(vec: Vector, mass: f64) -> Self {
        Self { vec, mass }
    }

    /// Build a state vector from transverse position, angles (in radians),
    /// energy, and the homogeneous kick coordinate.
    pub fn from_parts(position: TwoVector, angles: TwoVector, energy: f64, kick: f64) -> Self {
        let mut sv = Self {
            vec: Vector::zeros(),
            mass: 0.0,
        };
        sv.set_position(position);
        sv.set_angles(angles);
        sv.set_energy(energy);
        sv.vec[Self::K] = kick;
        sv
    }

    /// Build a state vector from a four-momentum `[px, py, pz, E]` and a
    /// transverse position. The rest mass is the invariant mass of the
    /// four-momentum and the kick coordinate is set to 1.
    pub fn from_momentum(momentum: FourMomentum, position: TwoVector) -> Self {
        let mut sv = Self {
            vec: Vector::zeros(),
            mass: 0.0,
        };
        sv.set_position(position);
        sv.set_momentum(momentum);
        sv.vec[Self::K] = 1.0;
        sv
    }

    /// The raw 6-component vector.
    pub fn vector(&self) -> Vector {
        self.vec
    }

    /// Rest mass, in GeV.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Set the rest mass, in GeV.
    ///
    /// The energy component is left untouched; trajectory bookkeeping in
    /// [`Particle`](crate::Particle) rejects samples whose mass drifts.
    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass;
    }

    /// Transverse position `(x, y)`, in m.
    pub fn position(&self) -> TwoVector {
        TwoVector::new(self.vec[Self::X], self.vec[Self::Y])
    }

    /// Set the transverse position, in m.
    pub fn set_position(&mut self, position: TwoVector) {
        self.vec[Self::X] = position.x;
        self.vec[Self::Y] = position.y;
    }

    /// Trajectory angles `(x', y')`, in radians.
    pub fn angles(&self) -> TwoVector {
        TwoVector::new(self.vec[Self::TX].atan(), self.vec[Self::TY].atan())
    }

    /// Set the trajectory angles from radians; the tangents are stored.
    pub fn set_angles(&mut self, angles: TwoVector) {
        self.vec[Self::TX] = angles.x.tan();
        self.vec[Self::TY] = angles.y.tan();
    }

    /// Raw angle tangents `(tan x', tan y')` as stored in the vector.
    pub fn angle_tangents(&self) -> TwoVector {
        TwoVector::new(self.vec[Self::TX], self.vec[Self::TY])
    }

    /// Energy, in GeV.
    pub fn energy(&self) -> f64 {
        self.vec[Self::E]
    }

    /// Set the energy, in GeV.
    pub fn set_energy(&mut self, energy: f64) {
        self.vec[Self::E] = energy;
    }

    /// The homogeneous kick coordinate.
    pub fn kick(&self) -> f64 {
        self.vec[Self::K]
    }

    /// Four-momentum `[px, py, pz, E]` reconstructed from the stored angle
    /// tangents, energy, and rest mass, in GeV.
    pub fn momentum(&self) -> FourMomentum {
        let (tx, ty) = (self.vec[Self::TX], self.vec[Self::TY]);
        let pz = longitudinal_momentum(self.energy(), self.mass, tx, ty);
        FourMomentum::new(pz * tx, pz * ty, pz, self.energy())
    }

    /// Set angles, energy, and rest mass from a four-momentum.
    pub fn set_momentum(&mut self, momentum: FourMomentum) {
        let (px, py, pz, e) = (momentum.x, momentum.y, momentum.z, momentum.w);
        if pz != 0.0 {
            self.vec[Self::TX] = px / pz;
            self.vec[Self::TY] = py / pz;
        }
        self.vec[Self::E] = e;
        self.mass = (e * e - (px * px + py * py + pz * pz)).max(0.0).sqrt();
    }
}

impl Default for StateVector {
    /// An on-axis state vector with zero energy, zero mass, and `k = 1`.
    fn default() -> Self {
        let mut vec = Vector::zeros();
        vec[Self::K] = 1.0;
        Self { vec, mass: 0.0 }
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ x = {:+.4e} m, x' = {:+.3e} rad, y = {:+.4e} m, y' = {:+.3e} rad, \
             k = {:.1}, E = {:.3e} GeV }}",
            self.vec[Self::X],
            self.vec[Self::TX],
            self.vec[Self::Y],
            self.vec[Self::TY],
            self.vec[Self::K],
            self.vec[Self::E],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_has_unit_kick() {
        let sv = StateVector::default();
        assert_eq!(sv.kick(), 1.0);
        assert_eq!(sv.position(), TwoVector::zeros());
    }

    #[test]
    fn angles_round_trip_through_tangent_storage() {
        let mut sv = StateVector::default();
        let ang = TwoVector::new(1.5e-4, -2.0e-4);
        sv.set_angles(ang);
        let back = sv.angles();
        assert_relative_eq!(back.x, ang.x, epsilon = 1e-12);
        assert_relative_eq!(back.y, ang.y, epsilon = 1e-12);
    }

    #[test]
    fn momentum_round_trip_preserves_mass_and_energy() {
        let mom = FourMomentum::new(0.13, -0.08, 6499.9, 6500.0);
        let sv = StateVector::from_momentum(mom, TwoVector::zeros());
        let back = sv.momentum();
        assert_relative_eq!(back.x, mom.x, max_relative = 1e-9);
        assert_relative_eq!(back.y, mom.y, max_relative = 1e-9);
        assert_relative_eq!(back.z, mom.z, max_relative = 1e-9);
        assert_eq!(back.w, mom.w);
    }

    #[test]
    fn on_axis_momentum_is_longitudinal() {
        let sv = StateVector::from_parts(TwoVector::zeros(), TwoVector::zeros(), 6500.0, 1.0);
        let mom = sv.momentum();
        assert_eq!(mom.x, 0.0);
        assert_eq!(mom.y, 0.0);
        assert_relative_eq!(mom.z, 6500.0, max_relative = 1e-12);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Paraxial angles survive the tangent storage round trip.
            #[test]
            fn angle_round_trip(ax in -0.1f64..0.1, ay in -0.1f64..0.1) {
                let mut sv = StateVector::default();
                sv.set_angles(TwoVector::new(ax, ay));
                let back = sv.angles();
                prop_assert!((back.x - ax).abs() < 1e-12);
                prop_assert!((back.y - ay).abs() < 1e-12);
            }

            // The reconstructed four-momentum satisfies the mass-shell
            // relation for any physical energy above the proton mass.
            #[test]
            fn momentum_is_on_shell(
                energy in 1.0f64..7000.0,
                tx in -1e-3f64..1e-3,
                ty in -1e-3f64..1e-3,
            ) {
                let mut vec = Vector::zeros();
                vec[StateVector::TX] = tx;
                vec[StateVector::TY] = ty;
                vec[StateVector::E] = energy;
                vec[StateVector::K] = 1.0;
                let sv = StateVector::new(vec, 0.938272046);
                let p = sv.momentum();
                let m2 = p.w * p.w - (p.x * p.x + p.y * p.y + p.z * p.z);
                prop_assert!((m2 - 0.938272046f64.powi(2)).abs() < 1e-6);
            }
        }
    }
}
