//! Index/slice selectors applied to n-dimensional arrays.
//!
//! Selection follows Python indexing rules: negative indices count from the
//! end, slice bounds are clamped to the axis, and missing trailing axes are
//! taken whole.

use ndarray::{ArrayD, Axis};

use crate::error::{CodecError, Result};

/// Selection along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSelector {
    /// A single position; the axis is dropped from the result.
    Index(isize),
    /// A strided range; the axis is kept.
    Slice {
        start: Option<isize>,
        end: Option<isize>,
        step: isize,
    },
}

impl AxisSelector {
    /// The whole axis.
    pub fn full() -> Self {
        AxisSelector::Slice {
            start: None,
            end: None,
            step: 1,
        }
    }

    /// Positions selected on an axis of length `len`.
    fn positions(&self, len: usize, axis: usize) -> Result<Vec<usize>> {
        let n = len as isize;
        match *self {
            AxisSelector::Index(i) => {
                let resolved = if i < 0 { i + n } else { i };
                if resolved < 0 || resolved >= n {
                    return Err(CodecError::invalid_selector(format!(
                        "index {} is out of bounds for axis {} with size {}",
                        i, axis, len
                    )));
                }
                Ok(vec![resolved as usize])
            }
            AxisSelector::Slice { start, end, step } => {
                if step == 0 {
                    return Err(CodecError::invalid_selector(format!(
                        "slice step cannot be zero (axis {})",
                        axis
                    )));
                }
                let (lower, upper) = if step > 0 { (0, n) } else { (-1, n - 1) };
                let clamp = |bound: isize| {
                    if bound < 0 {
                        (bound + n).max(lower)
                    } else {
                        bound.min(upper)
                    }
                };
                let start = start.map(clamp).unwrap_or(if step > 0 { lower } else { upper });
                let end = end.map(clamp).unwrap_or(if step > 0 { upper } else { lower });

                let mut positions = Vec::new();
                let mut i = start;
                while (step > 0 && i < end) || (step < 0 && i > end) {
                    positions.push(i as usize);
                    i = match i.checked_add(step) {
                        Some(next) => next,
                        None => break,
                    };
                }
                Ok(positions)
            }
        }
    }
}

impl From<isize> for AxisSelector {
    fn from(index: isize) -> Self {
        AxisSelector::Index(index)
    }
}

impl From<std::ops::Range<isize>> for AxisSelector {
    fn from(range: std::ops::Range<isize>) -> Self {
        AxisSelector::Slice {
            start: Some(range.start),
            end: Some(range.end),
            step: 1,
        }
    }
}

/// A per-axis selection over an array.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    axes: Vec<AxisSelector>,
}

impl Selector {
    /// Select everything.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(axes: Vec<AxisSelector>) -> Self {
        Self { axes }
    }

    /// Append a single-position selection for the next axis.
    pub fn index(mut self, index: isize) -> Self {
        self.axes.push(AxisSelector::Index(index));
        self
    }

    /// Append a slice for the next axis.
    pub fn slice(mut self, start: Option<isize>, end: Option<isize>, step: isize) -> Self {
        self.axes.push(AxisSelector::Slice { start, end, step });
        self
    }

    /// Append a whole-axis selection for the next axis.
    pub fn full(mut self) -> Self {
        self.axes.push(AxisSelector::full());
        self
    }

    pub fn axes(&self) -> &[AxisSelector] {
        &self.axes
    }

    /// Shape of the result of applying this selector to `shape`.
    pub fn result_shape(&self, shape: &[usize]) -> Result<Vec<usize>> {
        self.check_rank(shape.len())?;
        let mut out = Vec::with_capacity(shape.len());
        for (axis, &len) in shape.iter().enumerate() {
            match self.axes.get(axis) {
                Some(sel @ AxisSelector::Slice { .. }) => out.push(sel.positions(len, axis)?.len()),
                Some(sel @ AxisSelector::Index(_)) => {
                    sel.positions(len, axis)?;
                }
                None => out.push(len),
            }
        }
        Ok(out)
    }

    /// Apply the selector, producing an owned array.
    pub fn apply<T: Clone>(&self, array: &ArrayD<T>) -> Result<ArrayD<T>> {
        self.check_rank(array.ndim())?;
        let shape = array.shape().to_vec();
        let mut out = array.to_owned();
        // Work from the last axis so dropping an axis leaves earlier axis
        // numbers unchanged.
        for (axis, sel) in self.axes.iter().enumerate().rev() {
            let positions = sel.positions(shape[axis], axis)?;
            out = match sel {
                AxisSelector::Index(_) => out.index_axis_move(Axis(axis), positions[0]),
                AxisSelector::Slice { .. } => out.select(Axis(axis), &positions),
            };
        }
        Ok(out)
    }

    fn check_rank(&self, ndim: usize) -> Result<()> {
        if self.axes.len() > ndim {
            return Err(CodecError::invalid_selector(format!(
                "{} axes selected on an array with {} dimensions",
                self.axes.len(),
                ndim
            )));
        }
        Ok(())
    }
}

impl From<Vec<AxisSelector>> for Selector {
    fn from(axes: Vec<AxisSelector>) -> Self {
        Self::new(axes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, ArrayD};

    fn grid() -> ArrayD<i32> {
        array![[0, 1, 2, 3], [10, 11, 12, 13], [20, 21, 22, 23]].into_dyn()
    }

    #[test]
    fn test_select_all() {
        let a = grid();
        assert_eq!(Selector::all().apply(&a).unwrap(), a);
    }

    #[test]
    fn test_index_drops_axis() {
        let row = Selector::all().index(1).apply(&grid()).unwrap();
        assert_eq!(row, array![10, 11, 12, 13].into_dyn());

        let col = Selector::all().full().index(-1).apply(&grid()).unwrap();
        assert_eq!(col, array![3, 13, 23].into_dyn());

        let point = Selector::all().index(2).index(0).apply(&grid()).unwrap();
        assert_eq!(point.ndim(), 0);
        assert_eq!(point.iter().copied().collect::<Vec<_>>(), vec![20]);
    }

    #[test]
    fn test_slices_clamp_and_stride() {
        let a = grid();
        let out = Selector::all()
            .slice(Some(1), Some(100), 1)
            .slice(None, None, 2)
            .apply(&a)
            .unwrap();
        assert_eq!(out, array![[10, 12], [20, 22]].into_dyn());

        let reversed = Selector::all()
            .slice(None, None, -1)
            .index(0)
            .apply(&a)
            .unwrap();
        assert_eq!(reversed, array![20, 10, 0].into_dyn());

        let tail = Selector::all()
            .full()
            .slice(Some(-2), None, 1)
            .apply(&a)
            .unwrap();
        assert_eq!(tail, array![[2, 3], [12, 13], [22, 23]].into_dyn());

        let empty = Selector::all().slice(Some(2), Some(1), 1).apply(&a).unwrap();
        assert_eq!(empty.shape(), &[0, 4]);
    }

    #[test]
    fn test_huge_step() {
        let a = array![0, 1, 2, 3, 4].into_dyn();
        let forward = Selector::all().slice(Some(1), None, isize::MAX).apply(&a).unwrap();
        assert_eq!(forward, array![1].into_dyn());

        let backward = Selector::all()
            .slice(None, None, isize::MIN + 1)
            .apply(&a)
            .unwrap();
        assert_eq!(backward, array![4].into_dyn());

        let sel = Selector::all().slice(Some(-1), None, isize::MIN);
        assert_eq!(sel.result_shape(&[5]).unwrap(), vec![1]);
    }

    #[test]
    fn test_result_shape() {
        let sel = Selector::all().index(0).slice(Some(1), Some(3), 1);
        assert_eq!(sel.result_shape(&[3, 4]).unwrap(), vec![2]);
        assert_eq!(Selector::all().result_shape(&[3, 4]).unwrap(), vec![3, 4]);
    }

    #[test]
    fn test_invalid_selectors() {
        let a = grid();
        assert!(matches!(
            Selector::all().index(3).apply(&a),
            Err(CodecError::InvalidSelector(_))
        ));
        assert!(matches!(
            Selector::all().index(-4).apply(&a),
            Err(CodecError::InvalidSelector(_))
        ));
        assert!(matches!(
            Selector::all().slice(None, None, 0).apply(&a),
            Err(CodecError::InvalidSelector(_))
        ));
        assert!(matches!(
            Selector::all().index(0).index(0).index(0).apply(&a),
            Err(CodecError::InvalidSelector(_))
        ));
    }
}
