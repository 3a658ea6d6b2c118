//! Generators for synthetic arrays and coordinate points.
//!
//! Values follow simple closed-form patterns so tests can check an element
//! without keeping a copy of the whole array.

use ndarray::{ArrayD, Dimension, IxDyn};

/// Array whose element at row-major position `i` is `i`.
///
/// ```
/// use test_utils::ramp_array;
///
/// let a = ramp_array(&[2, 3]);
/// assert_eq!(a.shape(), &[2, 3]);
/// assert_eq!(a[[1, 2].as_slice()], 5.0);
/// ```
pub fn ramp_array(shape: &[usize]) -> ArrayD<f32> {
    let mut i = 0.0f32;
    ArrayD::from_shape_simple_fn(IxDyn(shape), || {
        let value = i;
        i += 1.0;
        value
    })
}

/// Temperature-like values in Kelvin on a `(ny, nx)` grid.
///
/// Grows from 250K at the first cell by 30K across each axis.
pub fn temperature_field(ny: usize, nx: usize) -> ArrayD<f32> {
    ArrayD::from_shape_fn(IxDyn(&[ny, nx]), |idx| {
        let y_factor = idx[0] as f32 / ny.max(1) as f32;
        let x_factor = idx[1] as f32 / nx.max(1) as f32;
        250.0 + x_factor * 30.0 + y_factor * 30.0
    })
}

/// Integer precipitation counts, deterministic for a given seed.
pub fn precipitation_field(shape: &[usize], seed: u32) -> ArrayD<i32> {
    ArrayD::from_shape_fn(IxDyn(shape), |idx| {
        let hash = (0..idx.ndim()).fold(seed, |h, axis| mix(h, idx[axis] as u32));
        if hash % 4 == 0 {
            (hash % 500) as i32
        } else {
            0
        }
    })
}

fn mix(h: u32, x: u32) -> u32 {
    let mut h = h.wrapping_mul(31).wrapping_add(x);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h
}

/// Mask flagging every cell whose index sum is a multiple of `every`.
pub fn diagonal_mask(shape: &[usize], every: usize) -> ArrayD<bool> {
    let every = every.max(1);
    ArrayD::from_shape_fn(IxDyn(shape), |idx| {
        (0..idx.ndim()).map(|axis| idx[axis]).sum::<usize>() % every == 0
    })
}

/// `n` evenly spaced points from `start`.
pub fn regular_points(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_array() {
        let a = ramp_array(&[2, 3, 4]);
        assert_eq!(a.len(), 24);
        assert_eq!(a.iter().copied().last(), Some(23.0));
    }

    #[test]
    fn test_temperature_range() {
        let t = temperature_field(10, 20);
        assert!(t.iter().all(|v| (250.0..310.0).contains(v)));
    }

    #[test]
    fn test_precipitation_deterministic() {
        assert_eq!(precipitation_field(&[4, 4], 7), precipitation_field(&[4, 4], 7));
        assert!(precipitation_field(&[8, 8], 1).iter().all(|v| *v >= 0));
    }

    #[test]
    fn test_diagonal_mask() {
        let mask = diagonal_mask(&[3, 3], 2);
        assert_eq!(mask.iter().filter(|m| **m).count(), 5);
    }

    #[test]
    fn test_regular_points() {
        assert_eq!(regular_points(-1.0, 0.5, 5), vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
    }
}
