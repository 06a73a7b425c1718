//! Shared fixtures for the Strahl benchmarks.

#![deny(missing_docs)]
#![forbid(unsafe_code)]

use strahl_beamline::Beamline;
use strahl_core::{BeamParameters, TwoVector};
use strahl_elements::{Aperture, Element, ElementKind};

/// Build a sequenced FODO-style lattice of `cells` cells, each 20 m long:
/// focusing quadrupole, bending dipole, defocusing quadrupole, drift.
pub fn fodo_lattice(params: &BeamParameters, cells: usize) -> Beamline {
    let length = cells as f64 * 20.0;
    let mut line = Beamline::new(length);

    let ip = Element::new(ElementKind::Marker, "ip", 0.0, 0.0).expect("valid marker");
    line.set_interaction_point(ip.clone());
    line.add(params, ip).expect("ip fits");

    for cell in 0..cells {
        let s0 = cell as f64 * 20.0;

        let mut qf =
            Element::new(ElementKind::VerticalQuadrupole, format!("mqf.{cell}"), s0, 3.0)
                .expect("valid quadrupole");
        qf.set_magnetic_strength(0.0121);
        qf.set_aperture(Some(Aperture::circular(0.04, TwoVector::zeros())));
        line.add(params, qf).expect("qf fits");

        let mut mb =
            Element::new(ElementKind::SectorDipole, format!("mb.{cell}"), s0 + 5.0, 8.0)
                .expect("valid dipole");
        mb.set_magnetic_strength(2e-4);
        mb.set_aperture(Some(Aperture::rect_elliptic(
            0.06,
            0.04,
            0.07,
            0.05,
            TwoVector::zeros(),
        )));
        line.add(params, mb).expect("mb fits");

        let mut qd =
            Element::new(ElementKind::HorizontalQuadrupole, format!("mqd.{cell}"), s0 + 15.0, 3.0)
                .expect("valid quadrupole");
        qd.set_magnetic_strength(-0.0121);
        qd.set_aperture(Some(Aperture::circular(0.04, TwoVector::zeros())));
        line.add(params, qd).expect("qd fits");
    }

    Beamline::sequenced(params, &line)
}
