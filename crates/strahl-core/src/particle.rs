//! A particle and its recorded trajectory through a beamline.

use std::fmt;

use crate::error::ParticleError;
use crate::state::StateVector;
use crate::{FourMomentum, TwoVector};

/// A charged particle with an ordered trajectory of phase-space samples.
///
/// The trajectory maps longitudinal positions (s, in m) to [`StateVector`]s
/// and is kept sorted at all times. A particle is created with one initial
/// sample; the propagator appends samples at increasing s as the particle
/// crosses element boundaries.
///
/// Every insertion enforces mass conservation: a sample whose rest mass
/// differs from the last recorded one is rejected with
/// [`ParticleError::NonConservedMass`].
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    charge: i32,
    pdg_id: i64,
    physical: bool,
    trajectory: Vec<(f64, StateVector)>,
}

impl Particle {
    /// Create a particle from its initial state vector at position `s0`.
    pub fn new(s0: f64, sv0: StateVector) -> Self {
        Self {
            charge: 0,
            pdg_id: 0,
            physical: true,
            trajectory: vec![(s0, sv0)],
        }
    }

    /// Create an on-axis particle of the given rest mass and charge at s = 0.
    pub fn from_mass_charge(mass: f64, charge: i32) -> Self {
        let sv = StateVector::new(crate::Vector::zeros(), mass);
        let mut part = Self::new(0.0, sv);
        part.charge = charge;
        part
    }

    /// Create a particle from a four-momentum and transverse position at s = 0.
    pub fn from_momentum(momentum: FourMomentum, position: TwoVector, charge: i32) -> Self {
        let mut part = Self::new(0.0, StateVector::from_momentum(momentum, position));
        part.charge = charge;
        part
    }

    /// Electric charge, in units of e.
    pub fn charge(&self) -> i32 {
        self.charge
    }

    /// Set the electric charge, in units of e.
    pub fn set_charge(&mut self, charge: i32) {
        self.charge = charge;
    }

    /// PDG identifier of the particle species.
    pub fn pdg_id(&self) -> i64 {
        self.pdg_id
    }

    /// Set the PDG identifier of the particle species.
    pub fn set_pdg_id(&mut self, pdg_id: i64) {
        self.pdg_id = pdg_id;
    }

    /// Whether the particle corresponds to a physical final-state object.
    pub fn physical(&self) -> bool {
        self.physical
    }

    /// Mark the particle as physical or virtual.
    pub fn set_physical(&mut self, physical: bool) {
        self.physical = physical;
    }

    /// Longitudinal position of the first recorded sample, in m.
    pub fn first_s(&self) -> f64 {
        self.trajectory[0].0
    }

    /// Longitudinal position of the last recorded sample, in m.
    pub fn last_s(&self) -> f64 {
        self.trajectory[self.trajectory.len() - 1].0
    }

    /// The first recorded state vector.
    pub fn first_state_vector(&self) -> &StateVector {
        &self.trajectory[0].1
    }

    /// The last recorded state vector.
    pub fn last_state_vector(&self) -> &StateVector {
        &self.trajectory[self.trajectory.len() - 1].1
    }

    /// Number of recorded samples.
    pub fn len(&self) -> usize {
        self.trajectory.len()
    }

    /// Always `false`: a particle carries at least its initial sample.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over `(s, state vector)` samples in s order.
    pub fn samples(&self) -> impl Iterator<Item = (f64, &StateVector)> {
        self.trajectory.iter().map(|(s, sv)| (*s, sv))
    }

    /// Truncate the trajectory back to its first sample.
    pub fn clear(&mut self) {
        self.trajectory.truncate(1);
    }

    /// Record a sample at position `s`, keeping the trajectory sorted.
    ///
    /// A sample at an already-recorded position is a silent no-op, keeping
    /// the earlier record. Rejects samples that would change the particle's
    /// rest mass.
    pub fn add_position(&mut self, s: f64, sv: StateVector) -> Result<(), ParticleError> {
        let last_mass = self.last_state_vector().mass();
        if sv.mass() != last_mass {
            return Err(ParticleError::NonConservedMass {
                previous: last_mass,
                new: sv.mass(),
            });
        }
        match self
            .trajectory
            .binary_search_by(|(s_i, _)| s_i.total_cmp(&s))
        {
            Ok(_) => {}
            Err(idx) => self.trajectory.insert(idx, (s, sv)),
        }
        Ok(())
    }

    /// State vector at position `s`, interpolating between recorded samples.
    ///
    /// An exact match returns the stored sample. Otherwise the two samples
    /// bracketing `s` are taken and the transverse position is interpolated
    /// linearly between them; angles, energy, and mass are copied from the
    /// earlier bracket unchanged.
    pub fn state_vector_at(&self, s: f64) -> Result<StateVector, ParticleError> {
        let idx = match self
            .trajectory
            .binary_search_by(|(s_i, _)| s_i.total_cmp(&s))
        {
            Ok(idx) => return Ok(self.trajectory[idx].1.clone()),
            Err(idx) => idx,
        };
        if idx == 0 || idx == self.trajectory.len() {
            return Err(ParticleError::InterpolationOutOfRange { s });
        }

        let (s_before, sv_before) = &self.trajectory[idx - 1];
        let (s_after, sv_after) = &self.trajectory[idx];
        let width = s_after - s_before;
        if width == 0.0 {
            return Err(ParticleError::DegenerateBracket { s });
        }

        let pos_before = sv_before.position();
        let pos_after = sv_after.position();
        let pos = pos_before + (pos_after - pos_before) * ((s - s_before) / width);

        let mut out = sv_before.clone();
        out.set_position(pos);
        Ok(out)
    }

    /// Four-momentum at position `s`, from the interpolated state vector.
    pub fn momentum_at(&self, s: f64) -> Result<FourMomentum, ParticleError> {
        Ok(self.state_vector_at(s)?.momentum())
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "particle of charge {}", self.charge)?;
        for (s, sv) in self.samples() {
            writeln!(f, "  s = {s:8.3} m: {sv}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector;
    use approx::assert_relative_eq;

    fn sample(x: f64, y: f64, mass: f64) -> StateVector {
        let mut vec = Vector::zeros();
        vec[StateVector::X] = x;
        vec[StateVector::Y] = y;
        vec[StateVector::K] = 1.0;
        StateVector::new(vec, mass)
    }

    #[test]
    fn insertion_keeps_samples_sorted() {
        let mut part = Particle::new(0.0, sample(0.0, 0.0, 1.0));
        part.add_position(20.0, sample(2.0, 0.0, 1.0)).unwrap();
        part.add_position(10.0, sample(1.0, 0.0, 1.0)).unwrap();
        let positions: Vec<f64> = part.samples().map(|(s, _)| s).collect();
        assert_eq!(positions, vec![0.0, 10.0, 20.0]);
    }

    #[test]
    fn duplicate_position_keeps_earlier_sample() {
        let mut part = Particle::new(0.0, sample(0.0, 0.0, 1.0));
        part.add_position(10.0, sample(1.0, 0.0, 1.0)).unwrap();
        part.add_position(10.0, sample(9.0, 9.0, 1.0)).unwrap();
        assert_eq!(part.len(), 2);
        assert_eq!(part.state_vector_at(10.0).unwrap().position().x, 1.0);
    }

    #[test]
    fn mass_change_is_rejected() {
        let mut part = Particle::new(0.0, sample(0.0, 0.0, 1.0));
        let err = part.add_position(5.0, sample(0.0, 0.0, 2.0)).unwrap_err();
        assert!(matches!(err, ParticleError::NonConservedMass { .. }));
        assert_eq!(part.len(), 1);
    }

    #[test]
    fn interpolation_is_linear_in_position() {
        let mut part = Particle::new(0.0, sample(0.0, 4.0, 1.0));
        part.add_position(10.0, sample(1.0, 2.0, 1.0)).unwrap();
        let mid = part.state_vector_at(2.5).unwrap();
        assert_relative_eq!(mid.position().x, 0.25, epsilon = 1e-12);
        assert_relative_eq!(mid.position().y, 3.5, epsilon = 1e-12);
        // Everything but the position comes from the earlier bracket.
        assert_eq!(mid.mass(), 1.0);
    }

    #[test]
    fn interpolation_outside_trajectory_fails() {
        let part = Particle::new(5.0, sample(0.0, 0.0, 1.0));
        assert!(matches!(
            part.state_vector_at(4.0),
            Err(ParticleError::InterpolationOutOfRange { .. })
        ));
        assert!(matches!(
            part.state_vector_at(6.0),
            Err(ParticleError::InterpolationOutOfRange { .. })
        ));
    }

    #[test]
    fn clear_truncates_to_first_sample() {
        let mut part = Particle::new(0.0, sample(0.0, 0.0, 1.0));
        part.add_position(10.0, sample(1.0, 0.0, 1.0)).unwrap();
        part.add_position(20.0, sample(2.0, 0.0, 1.0)).unwrap();
        part.clear();
        assert_eq!(part.len(), 1);
        assert_eq!(part.first_s(), 0.0);
    }
}
