//! Struct-of-arrays interval encodings for chains of trips, layovers and
//! frequency windows.
//!
//! Each block stores one slot per chain member, in chain order. Because
//! chains are time-monotonic every column is non-decreasing, so range
//! queries are a pair of binary searches.

pub mod frequency;
pub mod layover;
pub mod service;

use std::ops::Range;

use crate::models::types::{BlockError, Result};
use crate::search::lower_bound;

pub use frequency::FrequencyServiceIntervalBlock;
pub use layover::LayoverIntervalBlock;
pub use service::{ServiceInterval, ServiceIntervalBlock};

/// Members whose `[starts[i], ends[i]]` window meets `[from, to]`.
///
/// Both columns must be non-decreasing.
fn overlapping_windows(starts: &[u32], ends: &[u32], from: u32, to: u32) -> Range<usize> {
    let first = lower_bound(0..ends.len(), |i| ends[i] < from);
    let last = lower_bound(first..starts.len(), |i| starts[i] <= to);
    first..last
}

fn check_columns(name: &str, columns: &[&[u32]]) -> Result<()> {
    let len = columns.first().map(|c| c.len()).unwrap_or(0);
    if columns.iter().any(|column| column.len() != len) {
        return Err(BlockError::InvalidData(format!("{name}: columns differ in length")));
    }
    if let Some(column) = columns
        .iter()
        .position(|column| column.windows(2).any(|pair| pair[1] < pair[0]))
    {
        return Err(BlockError::InvalidData(format!(
            "{name}: column {column} is not sorted"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_windows() {
        let starts = [100, 200, 300, 400];
        let ends = [150, 260, 350, 480];

        assert_eq!(overlapping_windows(&starts, &ends, 0, 99), 0..0);
        assert_eq!(overlapping_windows(&starts, &ends, 0, 100), 0..1);
        assert_eq!(overlapping_windows(&starts, &ends, 250, 310), 1..3);
        assert_eq!(overlapping_windows(&starts, &ends, 151, 199), 1..1);
        assert_eq!(overlapping_windows(&starts, &ends, 480, 1000), 3..4);
        assert_eq!(overlapping_windows(&starts, &ends, 481, 1000), 4..4);
    }

    #[test]
    fn test_check_columns() {
        assert!(check_columns("ok", &[&[1, 2], &[3, 3]]).is_ok());
        assert!(check_columns("ragged", &[&[1, 2], &[3]]).is_err());
        assert!(check_columns("unsorted", &[&[1, 2], &[4, 3]]).is_err());
    }
}
