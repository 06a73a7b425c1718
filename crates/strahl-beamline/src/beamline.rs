//! The ordered element collection and its overlap resolution.

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use strahl_core::{BeamParameters, Matrix, TwoVector};
use strahl_elements::{Element, ElementError, ElementKind};

use crate::error::ValidationError;

/// An ordered sequence of optics elements along the design trajectory.
///
/// Elements are kept sorted by `(s, s + length)` after every mutation. Once
/// sequencing completes, no two extents overlap except zero-length elements
/// coincident with another element's boundary.
///
/// A beamline is assembled incrementally through [`add`](Self::add) and then
/// frozen: a propagator walking it must see no further mutation.
///
/// # Examples
///
/// ```
/// use strahl_beamline::Beamline;
/// use strahl_core::BeamParameters;
/// use strahl_elements::{Element, ElementKind};
///
/// let params = BeamParameters::default();
/// let mut line = Beamline::new(20.0);
/// line.add(&params, Element::new(ElementKind::Drift, "d1", 0.0, 8.0).unwrap()).unwrap();
/// line.add(&params, Element::new(ElementKind::Drift, "d2", 12.0, 8.0).unwrap()).unwrap();
/// let sequenced = Beamline::sequenced(&params, &line);
/// // the 8..12 m gap is materialised as a drift
/// assert_eq!(sequenced.len(), 3);
/// assert_eq!(sequenced.length(), 20.0);
/// ```
#[derive(Clone, Debug)]
pub struct Beamline {
    max_length: f64,
    interaction_point: Option<Element>,
    elements: Vec<Element>,
    markers: IndexMap<String, Element>,
}

impl Beamline {
    /// Create an empty beamline of the given length bound, in m.
    ///
    /// A negative bound leaves the beamline unbounded.
    pub fn new(length: f64) -> Self {
        Self {
            max_length: length,
            interaction_point: None,
            elements: Vec::new(),
            markers: IndexMap::new(),
        }
    }

    /// The length bound of the beamline, in m. Negative when unbounded.
    pub fn max_length(&self) -> f64 {
        self.max_length
    }

    /// End position of the last element, in m. Zero for an empty beamline.
    pub fn length(&self) -> f64 {
        self.elements.last().map_or(0.0, Element::end)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the beamline holds no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The interaction-point element, if one was declared.
    pub fn interaction_point(&self) -> Option<&Element> {
        self.interaction_point.as_ref()
    }

    /// Declare the interaction point. Sequencing keeps this marker while
    /// dropping every other one.
    pub fn set_interaction_point(&mut self, element: Element) {
        self.interaction_point = Some(element);
    }

    /// Iterate over the elements in s order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Register a standalone marker keyed by its name.
    ///
    /// Markers registered here are bookkeeping labels; they do not join the
    /// element sequence.
    pub fn add_marker(&mut self, marker: Element) {
        self.markers.insert(marker.name().to_string(), marker);
    }

    /// The registered markers, in insertion order.
    pub fn markers(&self) -> impl Iterator<Item = &Element> {
        self.markers.values()
    }

    /// Drop all elements, keeping the length bound and markers.
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Insert an element, resolving geometric overlaps.
    ///
    /// An element whose name is already present is silently ignored. When
    /// the new element's extent overlaps an existing one, the outcome depends
    /// on `params.correct_beamline_overlaps`: disabled, the insertion fails
    /// with [`ValidationError::Overlap`]; enabled, the existing element is
    /// truncated at the new element's start and the tail that was cut off is
    /// re-materialised as a remainder element placed after the new one, so
    /// the split pieces sum to the original length. The remainder is renamed
    /// (`name/1`, `name/2`), inherits the inserted element's Twiss
    /// descriptors, and carries a parent back-reference to the element it
    /// was carved out of.
    ///
    /// The element list is re-sorted after every insertion.
    pub fn add(&mut self, params: &BeamParameters, element: Element) -> Result<(), ValidationError> {
        if self.max_length >= 0.0 && element.end() > self.max_length {
            return Err(ValidationError::BeyondBeamline {
                name: element.name().to_string(),
                extent: element.end(),
                max_length: self.max_length,
            });
        }

        // silent no-op when the element is already present
        if self.elements.iter().any(|prev| prev.name() == element.name()) {
            return Ok(());
        }

        let mut overlapping = None;
        for (idx, prev) in self.elements.iter().enumerate() {
            if prev.s() > element.s() {
                break;
            }
            if prev.end() <= element.s() {
                continue;
            }
            if prev.length() == 0.0 {
                continue;
            }
            if prev.s() == element.s() && element.length() == 0.0 {
                continue;
            }
            overlapping = Some(idx);
            break;
        }

        match overlapping {
            None => self.elements.push(element),
            Some(idx) => {
                if !params.correct_beamline_overlaps {
                    return Err(ValidationError::Overlap {
                        existing: self.elements[idx].name().to_string(),
                        inserted: element.name().to_string(),
                    });
                }
                let remainder = self.split_around(idx, &element);
                self.elements.push(element);
                self.elements.push(remainder);
            }
        }

        self.elements
            .sort_by(|a, b| a.s().total_cmp(&b.s()).then(a.end().total_cmp(&b.end())));
        Ok(())
    }

    /// Truncate the element at `idx` in front of `element` and build the
    /// remainder covering the tail that the truncation cut off.
    fn split_around(&mut self, idx: usize, element: &Element) -> Element {
        let prev = &mut self.elements[idx];
        log::debug!(
            "{} ({}) is inside {} ({}); fixing the overlap by splitting the earlier element",
            element.name(),
            element.kind(),
            prev.name(),
            prev.kind(),
        );

        let prev_name = prev.name().to_string();
        let tail = prev.end() - element.s();

        let mut remainder = prev.fork();
        remainder.set_name(format!("{prev_name}/2"));
        remainder.set_s(element.end());
        remainder.set_length(tail);
        remainder.set_beta(element.beta());
        remainder.set_dispersion(element.dispersion());
        remainder.set_relative_position(element.relative_position());

        prev.set_name(format!("{prev_name}/1"));
        prev.set_length(element.s() - prev.s());

        remainder
    }

    /// Build a gap-free copy of `source` by materialising every implicit gap
    /// as a drift named after its start position.
    ///
    /// Markers are dropped, except the declared interaction point. A trailing
    /// drift pads the line out to its declared length when the last element
    /// falls short of it. Sequencing an already gap-free beamline returns an
    /// identical layout.
    pub fn sequenced(params: &BeamParameters, source: &Beamline) -> Beamline {
        let mut out = Beamline::new(source.max_length);
        out.interaction_point = source.interaction_point.clone();
        out.markers = source.markers.clone();

        let ip_name = source
            .interaction_point
            .as_ref()
            .map(|ip| ip.name().to_string());

        let mut pos = 0.0;
        for element in &source.elements {
            if element.kind() == ElementKind::Marker && Some(element.name()) != ip_name.as_deref()
            {
                continue;
            }
            let gap = element.s() - pos;
            if gap > 0.0 {
                out.push_drift(params, pos, gap);
            }
            if let Err(err) = out.add(params, element.clone()) {
                log::warn!("skipping element while sequencing: {err}");
            }
            pos = element.end();
        }

        if out.max_length >= 0.0 {
            let trailing = out.max_length - pos;
            if trailing > 0.0 {
                out.push_drift(params, pos, trailing);
            }
        }
        out
    }

    fn push_drift(&mut self, params: &BeamParameters, s: f64, length: f64) {
        match Element::new(ElementKind::Drift, format!("drift:{s:.4E}"), s, length) {
            Ok(drift) => {
                if let Err(err) = self.add(params, drift) {
                    log::warn!("skipping gap drift at s = {s} m: {err}");
                }
            }
            Err(err) => log::warn!("skipping gap drift at s = {s} m: {err}"),
        }
    }

    /// Aggregate transfer matrix of the whole line.
    ///
    /// Each element's matrix is composed in traversal order with every
    /// successive element applied on the left, so the product maps a state
    /// vector across the full line exactly as stepwise propagation would.
    /// Per-element positional and angular offsets are not part of this map;
    /// they are affine corrections applied only during stepwise propagation.
    pub fn matrix(
        &self,
        params: &BeamParameters,
        energy_loss: f64,
        mass: f64,
        charge: i32,
    ) -> Result<Matrix, ElementError> {
        let mut out = Matrix::identity();
        for element in &self.elements {
            out = element.matrix(params, energy_loss, mass, charge)? * out;
        }
        Ok(out)
    }

    /// First element whose name contains `name`.
    pub fn get_by_name(&self, name: &str) -> Option<&Element> {
        self.elements.iter().find(|elem| elem.name().contains(name))
    }

    /// First element whose extent contains the position `s`, in m.
    pub fn get_at(&self, s: f64) -> Option<&Element> {
        self.elements
            .iter()
            .find(|elem| elem.s() <= s && elem.end() >= s)
    }

    /// All elements whose name matches the regular expression `pattern`.
    pub fn find(&self, pattern: &str) -> Result<Vec<&Element>, ValidationError> {
        let re = Regex::new(pattern).map_err(|err| ValidationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        })?;
        Ok(self
            .elements
            .iter()
            .filter(|elem| re.is_match(elem.name()))
            .collect())
    }

    /// Shift every element at or beyond `s` transversely by `delta`.
    pub fn offset_elements_after(&mut self, s: f64, delta: TwoVector) {
        for element in &mut self.elements {
            if element.s() < s {
                continue;
            }
            element.offset(delta);
        }
    }

    /// Tilt every element at or beyond `s` by `delta`.
    pub fn tilt_elements_after(&mut self, s: f64, delta: TwoVector) {
        for element in &mut self.elements {
            if element.s() < s {
                continue;
            }
            element.tilt(delta);
        }
    }
}

impl fmt::Display for Beamline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "beamline of length {} m, {} elements:", self.length(), self.len())?;
        for element in &self.elements {
            writeln!(f, "  {element}")?;
        }
        Ok(())
    }
}
