//! Transverse acceptance shapes and containment tests.

use std::fmt;

use smallvec::SmallVec;
use strahl_core::TwoVector;

/// Geometric family of an [`Aperture`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApertureShape {
    /// Axis-aligned rectangle with half-widths `(p0, p1)`.
    Rectangular,
    /// Ellipse with semi-axes `(p0, p1)`.
    Elliptic,
    /// Circle of radius `p0`.
    Circular,
    /// Intersection of a rectangle `(p0, p1)` and an ellipse `(p2, p3)`.
    RectElliptic,
    /// Intersection of a rectangle `(p0, p1)` and a circle of radius `p2`.
    RectCircular,
    /// Race-track outline. Declared for completeness; no containment formula
    /// is implemented.
    RaceTrack,
    /// Octagonal outline. Declared for completeness; no containment formula
    /// is implemented.
    Octagonal,
}

impl ApertureShape {
    /// Whether a containment formula exists for this shape.
    ///
    /// Acceptance checks skip apertures of unsupported shapes rather than
    /// guessing at their geometry.
    pub fn is_supported(self) -> bool {
        !matches!(self, Self::RaceTrack | Self::Octagonal)
    }
}

impl fmt::Display for ApertureShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rectangular => "rectangular",
            Self::Elliptic => "elliptic",
            Self::Circular => "circular",
            Self::RectElliptic => "rect-elliptic",
            Self::RectCircular => "rect-circular",
            Self::RaceTrack => "race-track",
            Self::Octagonal => "octagonal",
        };
        f.write_str(name)
    }
}

/// A transverse acceptance region attached to a beamline element.
///
/// A particle whose transverse position leaves its current element's aperture
/// is considered absorbed by the beam pipe. Shapes are described by a center
/// and up to four scalar parameters, in metres.
///
/// # Examples
///
/// ```
/// use strahl_elements::Aperture;
/// use strahl_core::TwoVector;
///
/// let aper = Aperture::circular(0.02, TwoVector::zeros());
/// assert!(aper.contains(TwoVector::new(0.01, 0.01)));
/// assert!(!aper.contains(TwoVector::new(0.03, 0.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Aperture {
    shape: ApertureShape,
    center: TwoVector,
    params: SmallVec<[f64; 4]>,
}

impl Aperture {
    /// Rectangular aperture with half-widths `(half_x, half_y)`.
    pub fn rectangular(half_x: f64, half_y: f64, center: TwoVector) -> Self {
        Self {
            shape: ApertureShape::Rectangular,
            center,
            params: SmallVec::from_slice(&[half_x, half_y]),
        }
    }

    /// Elliptic aperture with semi-axes `(semi_x, semi_y)`.
    pub fn elliptic(semi_x: f64, semi_y: f64, center: TwoVector) -> Self {
        Self {
            shape: ApertureShape::Elliptic,
            center,
            params: SmallVec::from_slice(&[semi_x, semi_y]),
        }
    }

    /// Circular aperture of the given radius.
    pub fn circular(radius: f64, center: TwoVector) -> Self {
        Self {
            shape: ApertureShape::Circular,
            center,
            params: SmallVec::from_slice(&[radius, radius]),
        }
    }

    /// Intersection of a rectangle `(half_x, half_y)` and an ellipse
    /// `(semi_x, semi_y)`, the usual LHC beam-screen outline.
    pub fn rect_elliptic(
        half_x: f64,
        half_y: f64,
        semi_x: f64,
        semi_y: f64,
        center: TwoVector,
    ) -> Self {
        Self {
            shape: ApertureShape::RectElliptic,
            center,
            params: SmallVec::from_slice(&[half_x, half_y, semi_x, semi_y]),
        }
    }

    /// Intersection of a rectangle `(half_x, half_y)` and a circle of the
    /// given radius.
    pub fn rect_circular(half_x: f64, half_y: f64, radius: f64, center: TwoVector) -> Self {
        Self {
            shape: ApertureShape::RectCircular,
            center,
            params: SmallVec::from_slice(&[half_x, half_y, radius, radius]),
        }
    }

    /// Race-track aperture. No containment formula is implemented; the shape
    /// is carried through for bookkeeping only.
    pub fn race_track(half_x: f64, half_y: f64, radius: f64, center: TwoVector) -> Self {
        Self {
            shape: ApertureShape::RaceTrack,
            center,
            params: SmallVec::from_slice(&[half_x, half_y, radius, radius]),
        }
    }

    /// Octagonal aperture. No containment formula is implemented; the shape
    /// is carried through for bookkeeping only.
    pub fn octagonal(half_x: f64, half_y: f64, cut_x: f64, cut_y: f64, center: TwoVector) -> Self {
        Self {
            shape: ApertureShape::Octagonal,
            center,
            params: SmallVec::from_slice(&[half_x, half_y, cut_x, cut_y]),
        }
    }

    /// The geometric family of this aperture.
    pub fn shape(&self) -> ApertureShape {
        self.shape
    }

    /// Center of the aperture, in m.
    pub fn center(&self) -> TwoVector {
        self.center
    }

    /// The i-th shape parameter, or 0 when the shape has fewer parameters.
    pub fn p(&self, i: usize) -> f64 {
        self.params.get(i).copied().unwrap_or(0.0)
    }

    /// Whether acceptance checks can evaluate this aperture.
    pub fn is_supported(&self) -> bool {
        self.shape.is_supported()
    }

    /// Translate the aperture center.
    pub fn offset(&mut self, delta: TwoVector) {
        self.center += delta;
    }

    /// Whether the transverse point lies inside the acceptance.
    ///
    /// Unsupported shapes impose no restriction and always return `true`.
    pub fn contains(&self, pos: TwoVector) -> bool {
        let d = pos - self.center;
        match self.shape {
            ApertureShape::Rectangular => d.x.abs() < self.p(0) && d.y.abs() < self.p(1),
            ApertureShape::Elliptic | ApertureShape::Circular => {
                ellipse_test(d, self.p(0), self.p(1))
            }
            ApertureShape::RectElliptic | ApertureShape::RectCircular => {
                d.x.abs() < self.p(0)
                    && d.y.abs() < self.p(1)
                    && ellipse_test(d, self.p(2), self.p(3))
            }
            ApertureShape::RaceTrack | ApertureShape::Octagonal => true,
        }
    }

    /// Conservative `(x, y)` half-extents of the acceptance.
    pub fn limits(&self) -> TwoVector {
        match self.shape {
            ApertureShape::RectElliptic | ApertureShape::RectCircular => TwoVector::new(
                self.p(0).min(self.p(2)),
                self.p(1).min(self.p(3)),
            ),
            _ => TwoVector::new(self.p(0), self.p(1)),
        }
    }
}

fn ellipse_test(d: TwoVector, semi_x: f64, semi_y: f64) -> bool {
    let v = TwoVector::new(d.x / semi_x, d.y / semi_y);
    v.norm_squared() < 1.0
}

impl fmt::Display for Aperture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (param. ({:.3}, {:.3}, {:.3}, {:.3}), center at ({:.4}, {:.4}))",
            self.shape,
            self.p(0),
            self.p(1),
            self.p(2),
            self.p(3),
            self.center.x,
            self.center.y,
        )
    }
}
