//! Labelled coordinates and their placement on cube axes.

use ndarray::{Array1, ArrayD};
use std::fmt;

use crate::types::attributes::{AttributeValue, Attributes};
use crate::types::coord_system::CoordSystem;
use crate::types::units::Unit;

/// Relative tolerance when deciding whether points are evenly spaced.
const STEP_TOLERANCE: f64 = 1e-9;

/// The axes a coordinate spans.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AxisSpec {
    /// No axis.
    Scalar,
    /// Exactly one axis.
    Single(usize),
    /// Several axes, in coordinate-array order.
    Multi(Vec<usize>),
}

impl AxisSpec {
    /// Build from an axis list: none is scalar, one is single.
    pub fn from_axes(axes: Vec<usize>) -> Self {
        match axes.as_slice() {
            [] => AxisSpec::Scalar,
            [axis] => AxisSpec::Single(*axis),
            _ => AxisSpec::Multi(axes),
        }
    }

    pub fn axes(&self) -> Vec<usize> {
        match self {
            AxisSpec::Scalar => Vec::new(),
            AxisSpec::Single(axis) => vec![*axis],
            AxisSpec::Multi(axes) => axes.clone(),
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, AxisSpec::Scalar)
    }
}

impl fmt::Display for AxisSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisSpec::Scalar => f.write_str("scalar"),
            AxisSpec::Single(axis) => write!(f, "{}", axis),
            AxisSpec::Multi(axes) => write!(f, "{:?}", axes),
        }
    }
}

/// A labelled coordinate: names, units, points and an optional reference system.
#[derive(Debug, Clone, PartialEq)]
pub struct Coord {
    pub standard_name: Option<String>,
    pub long_name: Option<String>,
    pub var_name: Option<String>,
    pub units: Unit,
    pub points: ArrayD<f64>,
    pub coord_system: Option<CoordSystem>,
    pub attributes: Attributes,
}

impl Coord {
    pub fn new(points: ArrayD<f64>, units: Unit) -> Self {
        Self {
            standard_name: None,
            long_name: None,
            var_name: None,
            units,
            points,
            coord_system: None,
            attributes: Attributes::new(),
        }
    }

    /// A one-dimensional coordinate.
    pub fn from_vec(points: Vec<f64>, units: Unit) -> Self {
        Self::new(Array1::from(points).into_dyn(), units)
    }

    /// A single-point coordinate.
    pub fn scalar(point: f64, units: Unit) -> Self {
        Self::from_vec(vec![point], units)
    }

    pub fn with_standard_name(mut self, name: impl Into<String>) -> Self {
        self.standard_name = Some(name.into());
        self
    }

    pub fn with_long_name(mut self, name: impl Into<String>) -> Self {
        self.long_name = Some(name.into());
        self
    }

    pub fn with_var_name(mut self, name: impl Into<String>) -> Self {
        self.var_name = Some(name.into());
        self
    }

    pub fn with_coord_system(mut self, cs: CoordSystem) -> Self {
        self.coord_system = Some(cs);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// First of standard, long and var name, else `unknown`.
    pub fn name(&self) -> &str {
        self.standard_name
            .as_deref()
            .or(self.long_name.as_deref())
            .or(self.var_name.as_deref())
            .unwrap_or("unknown")
    }

    pub fn shape(&self) -> &[usize] {
        self.points.shape()
    }

    pub fn npoints(&self) -> usize {
        self.points.len()
    }

    /// Smallest point, ignoring NaN.
    pub fn min(&self) -> Option<f64> {
        self.points
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::min)
    }

    /// Largest point, ignoring NaN.
    pub fn max(&self) -> Option<f64> {
        self.points
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::max)
    }

    /// Uniform spacing of a one-dimensional coordinate with at least two points.
    pub fn step(&self) -> Option<f64> {
        if self.points.ndim() != 1 || self.points.len() < 2 {
            return None;
        }
        let points: Vec<f64> = self.points.iter().copied().collect();
        let step = points[1] - points[0];
        if !step.is_finite() {
            return None;
        }
        let tolerance = STEP_TOLERANCE * step.abs().max(1.0);
        points
            .windows(2)
            .all(|w| ((w[1] - w[0]) - step).abs() <= tolerance)
            .then_some(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn degrees() -> Unit {
        Unit::new("degrees").unwrap()
    }

    #[test]
    fn test_axis_spec_from_axes() {
        assert_eq!(AxisSpec::from_axes(vec![]), AxisSpec::Scalar);
        assert_eq!(AxisSpec::from_axes(vec![2]), AxisSpec::Single(2));
        assert_eq!(AxisSpec::from_axes(vec![0, 1]), AxisSpec::Multi(vec![0, 1]));
        assert_eq!(AxisSpec::Multi(vec![0, 1]).axes(), vec![0, 1]);
        assert_eq!(AxisSpec::Scalar.to_string(), "scalar");
    }

    #[test]
    fn test_name_precedence() {
        let coord = Coord::scalar(0.0, degrees());
        assert_eq!(coord.name(), "unknown");
        let coord = coord.with_var_name("lat");
        assert_eq!(coord.name(), "lat");
        let coord = coord.with_long_name("Latitude");
        assert_eq!(coord.name(), "Latitude");
        let coord = coord.with_standard_name("latitude");
        assert_eq!(coord.name(), "latitude");
    }

    #[test]
    fn test_min_max_step() {
        let coord = Coord::from_vec(vec![30.0, 10.0, 20.0], degrees());
        assert_eq!(coord.min(), Some(10.0));
        assert_eq!(coord.max(), Some(30.0));
        assert_eq!(coord.step(), None);

        let regular = Coord::from_vec(vec![-1.0, -0.5, 0.0, 0.5], degrees());
        assert_eq!(regular.step(), Some(0.5));

        let single = Coord::scalar(5.0, degrees());
        assert_eq!(single.step(), None);
        assert_eq!(single.min(), Some(5.0));

        let two_d = Coord::new(array![[0.0, 1.0], [2.0, 3.0]].into_dyn(), degrees());
        assert_eq!(two_d.step(), None);
        assert_eq!(two_d.npoints(), 4);
        assert_eq!(two_d.shape(), &[2, 2]);
    }
}
