//! Linear interpolation over sorted control points.
//!
//! Used on its own and by the scheduled location resolver to move between
//! time and distance along a block.

use crate::models::types::{BlockError, Result};
use crate::search::lower_bound;

/// What to do when the query lies outside the control points
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum OutOfRange {
    /// Fail with [`BlockError::OutOfRange`]
    Exception,
    /// Clamp to the value of the nearest boundary point
    LastValue,
    /// Extend the nearest boundary segment
    #[default]
    Interpolate,
}

/// Interpolate through `(x1, y1)` and `(x2, y2)` at `x`, extrapolating past either end.
///
/// If both points share the same `x` the segment has no slope and `y1` is returned.
pub fn interpolate_pair(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    if x1 == x2 {
        return y1;
    }
    let ratio = (x - x1) / (x2 - x1);
    ratio * (y2 - y1) + y1
}

/// Interpolate over `(x, y)` points sorted by strictly increasing `x`.
pub fn interpolate(points: &[(f64, f64)], x: f64, out_of_range: OutOfRange) -> Result<f64> {
    interpolate_by(points.len(), |i| points[i].0, |i| points[i].1, x, out_of_range)
}

/// Interpolate over parallel `keys`/`values` arrays, `keys` strictly increasing.
pub fn interpolate_sorted(
    keys: &[f64],
    values: &[f64],
    x: f64,
    out_of_range: OutOfRange,
) -> Result<f64> {
    if keys.len() != values.len() {
        return Err(BlockError::InvalidData(format!(
            "{} interpolation keys but {} values",
            keys.len(),
            values.len()
        )));
    }
    interpolate_by(keys.len(), |i| keys[i], |i| values[i], x, out_of_range)
}

fn interpolate_by(
    n: usize,
    key: impl Fn(usize) -> f64,
    value: impl Fn(usize) -> f64,
    x: f64,
    out_of_range: OutOfRange,
) -> Result<f64> {
    if n == 0 {
        return Err(BlockError::InvalidData("no interpolation control points".into()));
    }
    if x.is_nan() {
        return Err(BlockError::InvalidData("cannot interpolate at NaN".into()));
    }

    let index = lower_bound(0..n, |i| key(i) < x);

    if index < n && key(index) == x {
        return Ok(value(index));
    }

    if index > 0 && index < n {
        return Ok(interpolate_pair(
            key(index - 1),
            value(index - 1),
            key(index),
            value(index),
            x,
        ));
    }

    let below = index == 0;
    match out_of_range {
        OutOfRange::Exception => Err(BlockError::OutOfRange {
            value: x,
            min: key(0),
            max: key(n - 1),
        }),
        OutOfRange::LastValue => Ok(if below { value(0) } else { value(n - 1) }),
        OutOfRange::Interpolate if n == 1 => Ok(value(0)),
        OutOfRange::Interpolate => {
            let (a, b) = if below { (0, 1) } else { (n - 2, n - 1) };
            Ok(interpolate_pair(key(a), value(a), key(b), value(b), x))
        }
    }
}
