//! The beamline element: geometry, physics parameters, and matrix dispatch.

use std::fmt;

use strahl_core::{BeamParameters, ElementId, Matrix, TwoVector};

use crate::aperture::Aperture;
use crate::error::ElementError;
use crate::{dipole, drift, kicker, quadrupole};

/// Closed set of element kinds an accelerator lattice is built from.
///
/// Each kind selects one transfer-matrix formula in [`Element::matrix`];
/// there is no open hierarchy to extend. Kinds without an implemented
/// formula ([`Sextupole`](Self::Sextupole), [`Multipole`](Self::Multipole),
/// [`Solenoid`](Self::Solenoid)) are transported as drifts with a logged
/// warning rather than with guessed physics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    /// Field-free gap.
    Drift,
    /// Zero-effect position label, dropped by sequencing unless it is the
    /// interaction point.
    Marker,
    /// Beam-position monitor; transported as a drift.
    Monitor,
    /// Generic measurement apparatus; transported as a drift.
    Instrument,
    /// Reserved slot in the lattice; transported as a drift.
    Placeholder,
    /// Sector bending dipole with curved entry/exit faces.
    SectorDipole,
    /// Bending dipole with flat faces and edge focusing.
    RectangularDipole,
    /// Quadrupole focusing in the horizontal plane (negative strength).
    HorizontalQuadrupole,
    /// Quadrupole focusing in the vertical plane (positive strength).
    VerticalQuadrupole,
    /// Horizontal orbit-corrector kicker.
    HorizontalKicker,
    /// Vertical orbit-corrector kicker.
    VerticalKicker,
    /// Collimator with a rectangular jaw opening.
    RectangularCollimator,
    /// Collimator with an elliptical opening.
    EllipticalCollimator,
    /// Collimator with a circular opening.
    CircularCollimator,
    /// Sextupole; no linear map is implemented.
    Sextupole,
    /// Generic multipole; no linear map is implemented.
    Multipole,
    /// Solenoid; no linear map is implemented.
    Solenoid,
}

impl ElementKind {
    /// Whether this kind deflects the beam when its strength is non-zero.
    pub fn is_magnet(self) -> bool {
        matches!(
            self,
            Self::SectorDipole
                | Self::RectangularDipole
                | Self::HorizontalQuadrupole
                | Self::VerticalQuadrupole
                | Self::HorizontalKicker
                | Self::VerticalKicker
        )
    }

    /// Whether a transfer-matrix formula exists for this kind.
    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Sextupole | Self::Multipole | Self::Solenoid)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Drift => "drift",
            Self::Marker => "marker",
            Self::Monitor => "monitor",
            Self::Instrument => "instrument",
            Self::Placeholder => "placeholder",
            Self::SectorDipole => "sector dipole",
            Self::RectangularDipole => "rectangular dipole",
            Self::HorizontalQuadrupole => "horizontal quadrupole",
            Self::VerticalQuadrupole => "vertical quadrupole",
            Self::HorizontalKicker => "horizontal kicker",
            Self::VerticalKicker => "vertical kicker",
            Self::RectangularCollimator => "rectangular collimator",
            Self::EllipticalCollimator => "elliptical collimator",
            Self::CircularCollimator => "circular collimator",
            Self::Sextupole => "sextupole",
            Self::Multipole => "multipole",
            Self::Solenoid => "solenoid",
        };
        f.write_str(name)
    }
}

/// One element of a beamline.
///
/// An element owns its geometry (start position `s` and length along the
/// design trajectory, transverse offset and tilt), its nominal magnetic
/// strength, the Twiss descriptors attached to it by the lattice source
/// (beta, dispersion, relative position), and an optional transverse
/// [`Aperture`]. Cloning deep-copies the aperture; a clone is a snapshot of
/// the same logical element and keeps its [`ElementId`].
///
/// Elements produced by the beamline's overlap splitting carry a `parent`
/// id referring to the element they were carved out of.
#[derive(Clone, Debug)]
pub struct Element {
    id: ElementId,
    kind: ElementKind,
    name: String,
    s: f64,
    length: f64,
    magnetic_strength: f64,
    position_offset: TwoVector,
    tilt: TwoVector,
    beta: TwoVector,
    dispersion: TwoVector,
    relative_position: TwoVector,
    aperture: Option<Aperture>,
    parent: Option<ElementId>,
}

impl Element {
    /// Create an element of the given kind, name, start position, and length.
    ///
    /// The length must be non-negative and finite.
    pub fn new(
        kind: ElementKind,
        name: impl Into<String>,
        s: f64,
        length: f64,
    ) -> Result<Self, ElementError> {
        let name = name.into();
        if !length.is_finite() || length < 0.0 {
            return Err(ElementError::InvalidLength { name, length });
        }
        Ok(Self {
            id: ElementId::next(),
            kind,
            name,
            s,
            length,
            magnetic_strength: 0.0,
            position_offset: TwoVector::zeros(),
            tilt: TwoVector::zeros(),
            beta: TwoVector::zeros(),
            dispersion: TwoVector::zeros(),
            relative_position: TwoVector::zeros(),
            aperture: None,
            parent: None,
        })
    }

    /// Unique instance id.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Element kind tag.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the element.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Start position along the design trajectory, in m.
    pub fn s(&self) -> f64 {
        self.s
    }

    /// Move the element along the design trajectory.
    pub fn set_s(&mut self, s: f64) {
        self.s = s;
    }

    /// Length along the design trajectory, in m.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Resize the element.
    pub fn set_length(&mut self, length: f64) {
        self.length = length;
    }

    /// End position `s + length`, in m.
    pub fn end(&self) -> f64 {
        self.s + self.length
    }

    /// Nominal magnetic strength (normalised gradient or bend).
    pub fn magnetic_strength(&self) -> f64 {
        self.magnetic_strength
    }

    /// Set the nominal magnetic strength.
    pub fn set_magnetic_strength(&mut self, strength: f64) {
        self.magnetic_strength = strength;
    }

    /// Static transverse offset of the element's axis, in m.
    pub fn position_offset(&self) -> TwoVector {
        self.position_offset
    }

    /// Tilt angles of the element's axis, in rad.
    pub fn tilt_angles(&self) -> TwoVector {
        self.tilt
    }

    /// Betatron function at the element, in m.
    pub fn beta(&self) -> TwoVector {
        self.beta
    }

    /// Set the betatron function at the element.
    pub fn set_beta(&mut self, beta: TwoVector) {
        self.beta = beta;
    }

    /// Dispersion at the element, in m.
    pub fn dispersion(&self) -> TwoVector {
        self.dispersion
    }

    /// Set the dispersion at the element.
    pub fn set_dispersion(&mut self, dispersion: TwoVector) {
        self.dispersion = dispersion;
    }

    /// Position of the element relative to the design orbit, in m.
    pub fn relative_position(&self) -> TwoVector {
        self.relative_position
    }

    /// Set the position of the element relative to the design orbit.
    pub fn set_relative_position(&mut self, relative_position: TwoVector) {
        self.relative_position = relative_position;
    }

    /// The transverse acceptance attached to this element, if any.
    pub fn aperture(&self) -> Option<&Aperture> {
        self.aperture.as_ref()
    }

    /// Attach (or clear) the transverse acceptance.
    pub fn set_aperture(&mut self, aperture: Option<Aperture>) {
        self.aperture = aperture;
    }

    /// Id of the element this one was split off from, if any.
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Record the element this one was split off from.
    pub fn set_parent(&mut self, parent: Option<ElementId>) {
        self.parent = parent;
    }

    /// Clone this element into a new logical element with a fresh id and a
    /// parent back-reference to this one. Used by the beamline's overlap
    /// resolution to carve remainder pieces out of a split element.
    pub fn fork(&self) -> Element {
        let mut copy = self.clone();
        copy.id = ElementId::next();
        copy.parent = Some(self.id);
        copy
    }

    /// Shift the element (and its aperture) transversely.
    pub fn offset(&mut self, delta: TwoVector) {
        self.position_offset += delta;
        if let Some(aperture) = self.aperture.as_mut() {
            aperture.offset(delta);
        }
    }

    /// Tilt the element's axis.
    pub fn tilt(&mut self, delta: TwoVector) {
        self.tilt += delta;
    }

    /// Effective field strength seen by a traversing particle.
    ///
    /// The nominal strength is calibrated for the reference beam; a particle
    /// that lost `energy_loss` (GeV) and has rest mass `mass` (GeV) sees it
    /// rescaled by the momentum ratio `p_ref / p_out`, and by the ratio of
    /// its charge to the reference charge. A neutral particle sees no field
    /// at all.
    pub fn field_strength(
        &self,
        params: &BeamParameters,
        energy_loss: f64,
        mass: f64,
        charge: i32,
    ) -> Result<f64, ElementError> {
        if charge == 0 {
            return Ok(0.0);
        }
        if energy_loss < 0.0 {
            return Err(ElementError::InvalidEnergyLoss { value: energy_loss });
        }

        let mut momentum_balance = 1.0;
        if energy_loss > 0.0 {
            let e_out = params.beam_energy - energy_loss;
            if e_out <= mass {
                return Err(ElementError::VanishingMomentum {
                    name: self.name.clone(),
                    remaining_energy: e_out,
                });
            }
            let p_out = ((e_out - mass) * (e_out + mass)).sqrt();
            momentum_balance = params.beam_momentum() / p_out;
        }

        Ok(self.magnetic_strength * momentum_balance
            * (f64::from(charge) / f64::from(params.particle_charge)))
    }

    /// Transfer matrix of this element for a traversing particle.
    ///
    /// Magnet kinds whose effective strength evaluates to zero (including
    /// neutral traversal and disabled dipoles/kickers) degrade to the drift
    /// map of their length. Plane-locked quadrupoles reject strengths of the
    /// wrong sign, and bending/focusing formulas reject non-positive lengths.
    pub fn matrix(
        &self,
        params: &BeamParameters,
        energy_loss: f64,
        mass: f64,
        charge: i32,
    ) -> Result<Matrix, ElementError> {
        use ElementKind::*;

        match self.kind {
            Drift | Marker | Monitor | Instrument | Placeholder | RectangularCollimator
            | EllipticalCollimator | CircularCollimator => Ok(drift::matrix(self.length)),

            Sextupole | Multipole | Solenoid => {
                log::warn!(
                    "no transfer map implemented for {} '{}'; treating it as a drift",
                    self.kind,
                    self.name
                );
                Ok(drift::matrix(self.length))
            }

            SectorDipole | RectangularDipole => {
                if !params.enable_dipoles {
                    return Ok(drift::matrix(self.length));
                }
                let ke = self.field_strength(params, energy_loss, mass, charge)?;
                if ke == 0.0 {
                    log::debug!(
                        "{} '{}' has no effect; treating it as a drift",
                        self.kind,
                        self.name
                    );
                    return Ok(drift::matrix(self.length));
                }
                self.require_positive_length()?;
                Ok(match self.kind {
                    SectorDipole => dipole::sector(self.length, ke, params),
                    _ => dipole::rectangular(self.length, ke, params),
                })
            }

            HorizontalQuadrupole => {
                let ke = self.field_strength(params, energy_loss, mass, charge)?;
                if ke > 0.0 {
                    return Err(ElementError::WrongSignStrength {
                        name: self.name.clone(),
                        strength: ke,
                        horizontal: true,
                    });
                }
                if ke == 0.0 {
                    log::debug!("quadrupole '{}' has no effect; treating it as a drift", self.name);
                    return Ok(drift::matrix(self.length));
                }
                self.require_positive_length()?;
                Ok(quadrupole::horizontal(self.length, ke))
            }

            VerticalQuadrupole => {
                let ke = self.field_strength(params, energy_loss, mass, charge)?;
                if ke < 0.0 {
                    return Err(ElementError::WrongSignStrength {
                        name: self.name.clone(),
                        strength: ke,
                        horizontal: false,
                    });
                }
                if ke == 0.0 {
                    log::debug!("quadrupole '{}' has no effect; treating it as a drift", self.name);
                    return Ok(drift::matrix(self.length));
                }
                self.require_positive_length()?;
                Ok(quadrupole::vertical(self.length, ke))
            }

            HorizontalKicker | VerticalKicker => {
                if !params.enable_kickers {
                    return Ok(drift::matrix(self.length));
                }
                let ke = -self.field_strength(params, energy_loss, mass, charge)?;
                if ke == 0.0 {
                    return Ok(drift::matrix(self.length));
                }
                Ok(match self.kind {
                    HorizontalKicker => kicker::horizontal(self.length, ke),
                    _ => kicker::vertical(self.length, ke),
                })
            }
        }
    }

    fn require_positive_length(&self) -> Result<(), ElementError> {
        if self.length <= 0.0 {
            return Err(ElementError::InvalidLength {
                name: self.name.clone(),
                length: self.length,
            });
        }
        Ok(())
    }
}

/// Structural equality over the physics content: instance id and parent
/// back-reference are bookkeeping, not physics, and are excluded.
impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.name == other.name
            && self.s == other.s
            && self.length == other.length
            && self.magnetic_strength == other.magnetic_strength
            && self.position_offset == other.position_offset
            && self.tilt == other.tilt
            && self.beta == other.beta
            && self.dispersion == other.dispersion
            && self.relative_position == other.relative_position
            && self.aperture == other.aperture
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<21} {:>17} (length = {:5.2} m) at {:6.2} < s < {:6.2} m",
            self.kind.to_string(),
            self.name,
            self.length,
            self.s,
            self.end(),
        )?;
        match &self.aperture {
            Some(aperture) => write!(f, " with aperture: {aperture}"),
            None => write!(f, " with no aperture restriction"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use strahl_core::StateVector;

    fn params() -> BeamParameters {
        BeamParameters::default()
    }

    fn dipole_elem(strength: f64) -> Element {
        let mut elem = Element::new(ElementKind::SectorDipole, "mb.test", 0.0, 1.0).unwrap();
        elem.set_magnetic_strength(strength);
        elem
    }

    #[test]
    fn negative_length_is_rejected_at_construction() {
        let err = Element::new(ElementKind::Drift, "bad", 0.0, -1.0).unwrap_err();
        assert!(matches!(err, ElementError::InvalidLength { .. }));
    }

    #[test]
    fn neutral_particle_sees_no_field() {
        let elem = dipole_elem(0.3);
        let ke = elem.field_strength(&params(), 0.0, 0.938272046, 0).unwrap();
        assert_eq!(ke, 0.0);
    }

    #[test]
    fn reference_particle_sees_the_nominal_strength() {
        let elem = dipole_elem(0.3);
        let ke = elem.field_strength(&params(), 0.0, 0.938272046, 1).unwrap();
        assert_eq!(ke, 0.3);
    }

    #[test]
    fn energy_loss_strengthens_the_effective_field() {
        let elem = dipole_elem(0.3);
        let m = 0.938272046;
        let ke = elem.field_strength(&params(), 100.0, m, 1).unwrap();
        assert!(ke > 0.3);
    }

    #[test]
    fn opposite_charge_flips_the_field() {
        let elem = dipole_elem(0.3);
        let ke = elem.field_strength(&params(), 0.0, 0.938272046, -1).unwrap();
        assert_eq!(ke, -0.3);
    }

    #[test]
    fn negative_energy_loss_is_rejected() {
        let elem = dipole_elem(0.3);
        assert!(matches!(
            elem.field_strength(&params(), -1.0, 0.938272046, 1),
            Err(ElementError::InvalidEnergyLoss { .. })
        ));
    }

    #[test]
    fn total_energy_loss_is_rejected() {
        let elem = dipole_elem(0.3);
        let p = params();
        assert!(matches!(
            elem.field_strength(&p, p.beam_energy, 0.938272046, 1),
            Err(ElementError::VanishingMomentum { .. })
        ));
    }

    #[test]
    fn zero_strength_dipole_is_exactly_a_drift() {
        let elem = dipole_elem(0.0);
        let mat = elem.matrix(&params(), 0.0, 0.938272046, 1).unwrap();
        assert_eq!(mat, drift::matrix(1.0));
    }

    #[test]
    fn disabled_dipoles_degrade_to_drifts() {
        let elem = dipole_elem(0.3);
        let p = BeamParameters {
            enable_dipoles: false,
            ..params()
        };
        assert_eq!(
            elem.matrix(&p, 0.0, 0.938272046, 1).unwrap(),
            drift::matrix(1.0)
        );
    }

    #[test]
    fn kickers_are_gated_by_configuration() {
        let mut elem = Element::new(ElementKind::HorizontalKicker, "mcbx", 0.0, 2.0).unwrap();
        elem.set_magnetic_strength(1e-4);
        let off = elem.matrix(&params(), 0.0, 0.938272046, 1).unwrap();
        assert_eq!(off, drift::matrix(2.0));
        let p = BeamParameters {
            enable_kickers: true,
            ..params()
        };
        let on = elem.matrix(&p, 0.0, 0.938272046, 1).unwrap();
        assert_relative_eq!(
            on[(StateVector::TX, StateVector::K)],
            -1e-4,
            epsilon = 1e-18
        );
    }

    #[test]
    fn horizontal_quadrupole_rejects_positive_strength() {
        let mut elem =
            Element::new(ElementKind::HorizontalQuadrupole, "mqxa", 0.0, 3.0).unwrap();
        elem.set_magnetic_strength(0.01);
        assert!(matches!(
            elem.matrix(&params(), 0.0, 0.938272046, 1),
            Err(ElementError::WrongSignStrength { .. })
        ));
    }

    #[test]
    fn vertical_quadrupole_rejects_negative_strength() {
        let mut elem = Element::new(ElementKind::VerticalQuadrupole, "mqxb", 0.0, 3.0).unwrap();
        elem.set_magnetic_strength(-0.01);
        assert!(matches!(
            elem.matrix(&params(), 0.0, 0.938272046, 1),
            Err(ElementError::WrongSignStrength { .. })
        ));
    }

    #[test]
    fn powered_zero_length_dipole_is_rejected() {
        let mut elem = Element::new(ElementKind::SectorDipole, "mb.zero", 0.0, 0.0).unwrap();
        elem.set_magnetic_strength(0.3);
        assert!(matches!(
            elem.matrix(&params(), 0.0, 0.938272046, 1),
            Err(ElementError::InvalidLength { .. })
        ));
    }

    #[test]
    fn unsupported_kinds_are_transported_as_drifts() {
        let mut elem = Element::new(ElementKind::Sextupole, "ms.x", 0.0, 1.5).unwrap();
        elem.set_magnetic_strength(0.5);
        assert_eq!(
            elem.matrix(&params(), 0.0, 0.938272046, 1).unwrap(),
            drift::matrix(1.5)
        );
    }

    #[test]
    fn collimators_impose_no_deflection() {
        let mut elem =
            Element::new(ElementKind::RectangularCollimator, "tcp", 10.0, 0.6).unwrap();
        elem.set_aperture(Some(crate::Aperture::rectangular(
            0.002,
            0.002,
            TwoVector::zeros(),
        )));
        assert_eq!(
            elem.matrix(&params(), 0.0, 0.938272046, 1).unwrap(),
            drift::matrix(0.6)
        );
    }

    #[test]
    fn equality_ignores_identity_but_not_physics() {
        let a = dipole_elem(0.3);
        let b = {
            let mut e = dipole_elem(0.3);
            e.set_parent(Some(a.id()));
            e
        };
        assert_eq!(a, b);
        let mut c = dipole_elem(0.3);
        c.set_magnetic_strength(0.4);
        assert_ne!(a, c);
    }

    #[test]
    fn clone_preserves_identity_and_deep_copies_the_aperture() {
        let mut elem = dipole_elem(0.3);
        elem.set_aperture(Some(crate::Aperture::circular(0.02, TwoVector::zeros())));
        let mut copy = elem.clone();
        assert_eq!(copy.id(), elem.id());
        copy.offset(TwoVector::new(0.01, 0.0));
        // The original's aperture is untouched by the clone's offset.
        assert_eq!(elem.aperture().unwrap().center(), TwoVector::zeros());
        assert_eq!(
            copy.aperture().unwrap().center(),
            TwoVector::new(0.01, 0.0)
        );
    }
}
