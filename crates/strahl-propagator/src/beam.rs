//! Deterministic particle sources.
//!
//! Producers build initial [`Particle`]s to feed the propagation engine:
//! a [`GaussianGun`] smears every phase-space coordinate around configured
//! means, and a [`LinearScanner`] steps one coordinate across an interval to
//! map out acceptance. Both are seeded ChaCha generators so identical
//! configurations reproduce identical beams.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use strahl_core::kinematics::xi_to_energy;
use strahl_core::{BeamParameters, Particle, StateVector, TwoVector};

use crate::error::BeamError;

/// Map an interval `[lo, hi]` to the `(mean, spread)` pair describing it.
pub fn from_limits(lo: f64, hi: f64) -> (f64, f64) {
    (0.5 * (lo + hi), 0.5 * (hi - lo))
}

// ── GaussianGun ────────────────────────────────────────────────────

/// A particle gun smearing every coordinate with Gaussian noise.
///
/// Each [`shoot`](Self::shoot) draws transverse positions, angles, and
/// energy from independent normal distributions around the configured means.
/// A zero sigma pins the coordinate to its mean.
///
/// # Examples
///
/// ```
/// use strahl_core::BeamParameters;
/// use strahl_propagator::beam::GaussianGun;
///
/// let params = BeamParameters::default();
/// let mut gun = GaussianGun::builder(&params)
///     .seed(42)
///     .smear_x(0.0, 10e-6)
///     .smear_angle_x(0.0, 30e-6)
///     .build();
/// let particle = gun.shoot();
/// assert_eq!(particle.first_s(), 0.0);
/// ```
#[derive(Clone, Debug)]
pub struct GaussianGun {
    rng: ChaCha8Rng,
    s0: f64,
    mass: f64,
    charge: i32,
    x: (f64, f64),
    y: (f64, f64),
    angle_x: (f64, f64),
    angle_y: (f64, f64),
    energy: (f64, f64),
}

/// Builder for [`GaussianGun`].
#[derive(Clone, Debug)]
pub struct GaussianGunBuilder {
    seed: u64,
    s0: f64,
    mass: f64,
    charge: i32,
    x: (f64, f64),
    y: (f64, f64),
    angle_x: (f64, f64),
    angle_y: (f64, f64),
    energy: (f64, f64),
}

impl GaussianGun {
    /// Create a builder producing reference-beam particles: every coordinate
    /// pinned to zero and the energy pinned to the beam energy.
    pub fn builder(params: &BeamParameters) -> GaussianGunBuilder {
        GaussianGunBuilder {
            seed: 0,
            s0: 0.0,
            mass: params.particle_mass,
            charge: params.particle_charge,
            x: (0.0, 0.0),
            y: (0.0, 0.0),
            angle_x: (0.0, 0.0),
            angle_y: (0.0, 0.0),
            energy: (params.beam_energy, 0.0),
        }
    }

    /// Produce the next particle of the beam.
    pub fn shoot(&mut self) -> Particle {
        let x = self.sample(self.x);
        let y = self.sample(self.y);
        let angle_x = self.sample(self.angle_x);
        let angle_y = self.sample(self.angle_y);
        let energy = self.sample(self.energy);

        let mut sv = StateVector::from_parts(
            TwoVector::new(x, y),
            TwoVector::new(angle_x, angle_y),
            energy,
            1.0,
        );
        sv.set_mass(self.mass);
        let mut particle = Particle::new(self.s0, sv);
        particle.set_charge(self.charge);
        particle
    }

    /// Produce a beam of `n` particles.
    pub fn shoot_n(&mut self, n: usize) -> Vec<Particle> {
        (0..n).map(|_| self.shoot()).collect()
    }

    fn sample(&mut self, (mean, sigma): (f64, f64)) -> f64 {
        if sigma == 0.0 {
            return mean;
        }
        let z: f64 = StandardNormal.sample(&mut self.rng);
        mean + sigma * z
    }
}

impl GaussianGunBuilder {
    /// Seed for the deterministic generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Longitudinal position particles are created at, in m.
    pub fn starting_at(mut self, s0: f64) -> Self {
        self.s0 = s0;
        self
    }

    /// Rest mass of the produced particles, in GeV.
    pub fn mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    /// Charge of the produced particles, in units of e.
    pub fn charge(mut self, charge: i32) -> Self {
        self.charge = charge;
        self
    }

    /// Smear the horizontal position, in m.
    pub fn smear_x(mut self, mean: f64, sigma: f64) -> Self {
        self.x = (mean, sigma);
        self
    }

    /// Smear the vertical position, in m.
    pub fn smear_y(mut self, mean: f64, sigma: f64) -> Self {
        self.y = (mean, sigma);
        self
    }

    /// Smear the horizontal angle, in rad.
    pub fn smear_angle_x(mut self, mean: f64, sigma: f64) -> Self {
        self.angle_x = (mean, sigma);
        self
    }

    /// Smear the vertical angle, in rad.
    pub fn smear_angle_y(mut self, mean: f64, sigma: f64) -> Self {
        self.angle_y = (mean, sigma);
        self
    }

    /// Smear the energy, in GeV.
    pub fn smear_energy(mut self, mean: f64, sigma: f64) -> Self {
        self.energy = (mean, sigma);
        self
    }

    /// Smear the fractional momentum loss; converted to an energy smear
    /// against the given reference energy.
    pub fn smear_xi(mut self, mean: f64, sigma: f64, beam_energy: f64) -> Self {
        self.energy = (xi_to_energy(mean, beam_energy), sigma * beam_energy);
        self
    }

    /// Finalise the gun.
    pub fn build(self) -> GaussianGun {
        GaussianGun {
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            s0: self.s0,
            mass: self.mass,
            charge: self.charge,
            x: self.x,
            y: self.y,
            angle_x: self.angle_x,
            angle_y: self.angle_y,
            energy: self.energy,
        }
    }
}

// ── LinearScanner ──────────────────────────────────────────────────

/// The phase-space coordinate a [`LinearScanner`] steps over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanCoordinate {
    /// Horizontal position, in m.
    X,
    /// Vertical position, in m.
    Y,
    /// Horizontal angle, in rad.
    AngleX,
    /// Vertical angle, in rad.
    AngleY,
    /// Fractional momentum loss; converted to an energy at shoot time.
    Xi,
}

/// A particle source stepping one coordinate across an interval.
///
/// Produces `num_particles` evenly spaced values from `from` to `to`
/// inclusive; asking for more is a [`BeamError::Exhausted`].
#[derive(Clone, Debug)]
pub struct LinearScanner {
    coordinate: ScanCoordinate,
    num_particles: u32,
    generated: u32,
    from: f64,
    to: f64,
    position: TwoVector,
    angles: TwoVector,
    energy: f64,
    beam_energy: f64,
    s0: f64,
    mass: f64,
    charge: i32,
}

impl LinearScanner {
    /// Create a scanner stepping `coordinate` from `from` to `to` across
    /// `num_particles` shots. Non-scanned coordinates default to the
    /// reference beam (on-axis, beam energy).
    pub fn new(
        coordinate: ScanCoordinate,
        num_particles: u32,
        from: f64,
        to: f64,
        params: &BeamParameters,
    ) -> Self {
        Self {
            coordinate,
            num_particles,
            generated: 0,
            from,
            to,
            position: TwoVector::zeros(),
            angles: TwoVector::zeros(),
            energy: params.beam_energy,
            beam_energy: params.beam_energy,
            s0: 0.0,
            mass: params.particle_mass,
            charge: params.particle_charge,
        }
    }

    /// Base transverse position for the non-scanned coordinates, in m.
    pub fn with_position(mut self, position: TwoVector) -> Self {
        self.position = position;
        self
    }

    /// Base angles for the non-scanned coordinates, in rad.
    pub fn with_angles(mut self, angles: TwoVector) -> Self {
        self.angles = angles;
        self
    }

    /// Longitudinal position particles are created at, in m.
    pub fn starting_at(mut self, s0: f64) -> Self {
        self.s0 = s0;
        self
    }

    /// Number of particles still available.
    pub fn remaining(&self) -> u32 {
        self.num_particles - self.generated
    }

    /// Produce the next particle of the scan.
    pub fn shoot(&mut self) -> Result<Particle, BeamError> {
        if self.generated >= self.num_particles {
            return Err(BeamError::Exhausted {
                capacity: self.num_particles,
            });
        }
        let step = if self.num_particles > 1 {
            (self.to - self.from) / f64::from(self.num_particles - 1)
        } else {
            0.0
        };
        let value = self.from + step * f64::from(self.generated);
        self.generated += 1;

        let mut position = self.position;
        let mut angles = self.angles;
        let mut energy = self.energy;
        match self.coordinate {
            ScanCoordinate::X => position.x = value,
            ScanCoordinate::Y => position.y = value,
            ScanCoordinate::AngleX => angles.x = value,
            ScanCoordinate::AngleY => angles.y = value,
            ScanCoordinate::Xi => energy = xi_to_energy(value, self.beam_energy),
        }

        let mut sv = StateVector::from_parts(position, angles, energy, 1.0);
        sv.set_mass(self.mass);
        let mut particle = Particle::new(self.s0, sv);
        particle.set_charge(self.charge);
        Ok(particle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> BeamParameters {
        BeamParameters::default()
    }

    #[test]
    fn same_seed_reproduces_the_same_beam() {
        let make = || {
            GaussianGun::builder(&params())
                .seed(1729)
                .smear_x(0.0, 10e-6)
                .smear_angle_x(0.0, 30e-6)
                .smear_energy(6500.0, 1.0)
                .build()
        };
        let beam_a = make().shoot_n(32);
        let beam_b = make().shoot_n(32);
        assert_eq!(beam_a, beam_b);
    }

    #[test]
    fn different_seeds_differ() {
        let shot = |seed| {
            GaussianGun::builder(&params())
                .seed(seed)
                .smear_x(0.0, 10e-6)
                .build()
                .shoot()
        };
        assert_ne!(shot(1), shot(2));
    }

    #[test]
    fn zero_sigma_pins_every_coordinate() {
        let mut gun = GaussianGun::builder(&params())
            .seed(7)
            .smear_x(1e-3, 0.0)
            .build();
        let particle = gun.shoot();
        let sv = particle.first_state_vector();
        assert_eq!(sv.position(), TwoVector::new(1e-3, 0.0));
        assert_eq!(sv.energy(), 6500.0);
        assert_eq!(sv.mass(), params().particle_mass);
        assert_eq!(particle.charge(), 1);
    }

    #[test]
    fn scanner_covers_the_interval_end_to_end() {
        let mut scan = LinearScanner::new(ScanCoordinate::X, 5, -2e-3, 2e-3, &params());
        let values: Vec<f64> = (0..5)
            .map(|_| scan.shoot().unwrap().first_state_vector().position().x)
            .collect();
        assert_eq!(values[0], -2e-3);
        assert_relative_eq!(values[2], 0.0, epsilon = 1e-18);
        assert_eq!(values[4], 2e-3);
    }

    #[test]
    fn exhausted_scanner_refuses_to_shoot() {
        let mut scan = LinearScanner::new(ScanCoordinate::Y, 2, 0.0, 1e-3, &params());
        scan.shoot().unwrap();
        scan.shoot().unwrap();
        assert_eq!(
            scan.shoot().unwrap_err(),
            BeamError::Exhausted { capacity: 2 }
        );
        assert_eq!(scan.remaining(), 0);
    }

    #[test]
    fn xi_scan_lowers_the_energy() {
        let mut scan = LinearScanner::new(ScanCoordinate::Xi, 3, 0.0, 0.1, &params());
        let energies: Vec<f64> = (0..3)
            .map(|_| scan.shoot().unwrap().first_state_vector().energy())
            .collect();
        assert_eq!(energies[0], 6500.0);
        assert!(energies[1] < energies[0]);
        assert_relative_eq!(energies[2], 6500.0 * 0.9, max_relative = 1e-12);
    }

    #[test]
    fn single_step_scanner_emits_the_lower_bound() {
        let mut scan = LinearScanner::new(ScanCoordinate::AngleX, 1, 5e-6, 9e-6, &params());
        let particle = scan.shoot().unwrap();
        assert_relative_eq!(
            particle.first_state_vector().angles().x,
            5e-6,
            epsilon = 1e-15
        );
    }
}
