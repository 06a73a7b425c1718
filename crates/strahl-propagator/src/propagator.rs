//! The stepwise propagation engine.

use strahl_beamline::Beamline;
use strahl_core::{BeamParameters, ElementId, Particle, StateVector};
use strahl_elements::Element;

use crate::error::PropagationError;

/// Identity of the element whose aperture stopped a particle.
#[derive(Clone, Debug, PartialEq)]
pub struct StoppedAt {
    /// Name of the stopping element.
    pub element: String,
    /// Instance id of the stopping element.
    pub id: ElementId,
    /// Start position of the stopping element, in m.
    pub s: f64,
}

/// Outcome of a successful propagation.
///
/// Both variants leave the particle's recorded trajectory valid up to the
/// point the propagation reached.
#[derive(Clone, Debug, PartialEq)]
pub enum Propagation {
    /// The particle reached the end of the walk (the requested position or
    /// the end of the beamline).
    Reached,
    /// The particle left the acceptance of an element's aperture and was
    /// absorbed by the beam pipe.
    Stopped(StoppedAt),
}

impl Propagation {
    /// Whether the particle was absorbed before reaching the end.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }
}

/// Steps particles through a sequenced beamline.
///
/// The beamline must be fully assembled and sequenced (gap-free) before a
/// propagator walks it; the walk advances over consecutive element pairs and
/// assumes each element starts where the previous one ends.
#[derive(Clone, Copy, Debug)]
pub struct Propagator<'a> {
    beamline: &'a Beamline,
    params: &'a BeamParameters,
}

impl<'a> Propagator<'a> {
    /// Create a propagator over a sequenced beamline.
    pub fn new(beamline: &'a Beamline, params: &'a BeamParameters) -> Self {
        Self { beamline, params }
    }

    /// The beamline this propagator walks.
    pub fn beamline(&self) -> &Beamline {
        self.beamline
    }

    /// Propagate one particle up to the longitudinal position `s_max`, in m.
    ///
    /// The particle's trajectory is first truncated back to its initial
    /// sample, then grown with one sample per traversed element end. The
    /// energy-loss argument fed to the transfer matrices is the difference
    /// to the reference beam energy in relative-energy mode, and the
    /// particle's raw energy otherwise.
    ///
    /// Returns [`Propagation::Stopped`] when an aperture test fails; every
    /// sample recorded up to that point remains valid.
    pub fn propagate(
        &self,
        particle: &mut Particle,
        s_max: f64,
    ) -> Result<Propagation, PropagationError> {
        particle.clear();

        let energy_loss = if self.params.use_relative_energy {
            self.params.beam_energy - particle.last_state_vector().energy()
        } else {
            particle.last_state_vector().energy()
        };
        let first_s = particle.first_s();
        let charge = particle.charge();

        let elements: Vec<&Element> = self.beamline.elements().collect();
        for pair in elements.windows(2) {
            let (prev, current) = (pair[0], pair[1]);
            if current.s() > s_max {
                break;
            }

            let mut advanced = false;
            if first_s > prev.s() && first_s < current.s() {
                // the walk starts inside `prev`: traverse its remaining tail
                // through a transient clipped copy before entering `current`
                log::debug!("path starts inside element '{}'", prev.name());
                let mut clipped = prev.clone();
                clipped.set_s(first_s);
                clipped.set_length(current.s() - first_s);
                let (out_s, out_sv) =
                    self.propagate_through(particle, &clipped, energy_loss, charge)?;
                particle.add_position(out_s, out_sv)?;
                advanced = true;
            }
            if first_s <= current.s() {
                let (out_s, out_sv) =
                    self.propagate_through(particle, current, energy_loss, charge)?;
                particle.add_position(out_s, out_sv)?;
                advanced = true;
            }
            if !advanced {
                continue;
            }

            if !self.params.compute_aperture_acceptance {
                continue;
            }
            if let Some(stop) = self.aperture_stop(particle, prev, first_s)? {
                log::debug!(
                    "particle stopped by aperture of '{}' at s = {} m",
                    stop.element,
                    stop.s
                );
                return Ok(Propagation::Stopped(stop));
            }
        }
        Ok(Propagation::Reached)
    }

    /// Propagate every particle of a beam, collecting per-particle outcomes.
    ///
    /// A failure on one particle does not interrupt the rest of the batch.
    pub fn propagate_all(
        &self,
        beam: &mut [Particle],
        s_max: f64,
    ) -> Vec<Result<Propagation, PropagationError>> {
        beam.iter_mut()
            .map(|particle| self.propagate(particle, s_max))
            .collect()
    }

    /// Whether the recorded trajectory violates any aperture up to `s_max`.
    ///
    /// Performs the same containment checks as [`propagate`](Self::propagate)
    /// over the already-recorded samples, without modifying the particle.
    /// A non-positive `s_max` checks the whole beamline.
    pub fn stopped(&self, particle: &Particle, s_max: f64) -> Result<bool, PropagationError> {
        let first_s = particle.first_s();
        let elements: Vec<&Element> = self.beamline.elements().collect();
        for pair in elements.windows(2) {
            let (prev, current) = (pair[0], pair[1]);
            if s_max > 0.0 && current.s() > s_max {
                return Ok(false);
            }
            if current.end() > particle.last_s() {
                // the trajectory does not reach this far
                return Ok(false);
            }
            if self.aperture_stop(particle, prev, first_s)?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Apply one element's transfer matrix to the particle's last sample.
    ///
    /// The element's static position offset and tilt enter as an affine
    /// correction around the linear map: the matrix is evaluated in the
    /// element's local frame, `out = M (in - shift) + shift`.
    fn propagate_through(
        &self,
        particle: &Particle,
        element: &Element,
        energy_loss: f64,
        charge: i32,
    ) -> Result<(f64, StateVector), PropagationError> {
        let sv_in = particle.last_state_vector();
        let shift =
            StateVector::from_parts(element.position_offset(), element.tilt_angles(), 0.0, 0.0);

        let matrix = element
            .matrix(self.params, energy_loss, sv_in.mass(), charge)
            .map_err(|source| PropagationError::Element {
                element: element.name().to_string(),
                source,
            })?;

        log::trace!(
            "propagating particle of mass {} GeV through {} '{}' at s = {} m",
            sv_in.mass(),
            element.kind(),
            element.name(),
            element.s(),
        );

        let out = matrix * (sv_in.vector() - shift.vector()) + shift.vector();
        Ok((element.end(), StateVector::new(out, sv_in.mass())))
    }

    /// Check the particle against `prev`'s aperture at the element's entry
    /// and exit planes. Returns the stop identity on the first failure.
    fn aperture_stop(
        &self,
        particle: &Particle,
        prev: &Element,
        first_s: f64,
    ) -> Result<Option<StoppedAt>, PropagationError> {
        let Some(aperture) = prev.aperture() else {
            return Ok(None);
        };
        if !aperture.is_supported() {
            return Ok(None);
        }

        // a walk that started inside the element is checked from its start
        let entry_s = prev.s().max(first_s);
        let entry = particle.state_vector_at(entry_s)?.position();
        if !aperture.contains(entry) {
            log::debug!(
                "entering '{}' at ({:.4e}, {:.4e}) m, outside aperture centred at \
                 ({:.4e}, {:.4e}) m",
                prev.name(),
                entry.x,
                entry.y,
                aperture.center().x,
                aperture.center().y,
            );
            return Ok(Some(self.stop_at(prev)));
        }

        let exit = particle.state_vector_at(prev.end())?.position();
        if !aperture.contains(exit) {
            return Ok(Some(self.stop_at(prev)));
        }
        Ok(None)
    }

    fn stop_at(&self, element: &Element) -> StoppedAt {
        StoppedAt {
            element: element.name().to_string(),
            id: element.id(),
            s: element.s(),
        }
    }
}
