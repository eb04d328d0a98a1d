//! Layover interval block.

use std::ops::Range;

use super::{check_columns, overlapping_windows};
use crate::models::types::Result;

/// Start/end of the layover before each trip of a chain
///
/// A layover runs from the previous trip's last departure to the trip's
/// first departure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoverIntervalBlock {
    start_times: Vec<u32>,
    end_times: Vec<u32>,
}

impl LayoverIntervalBlock {
    pub fn new(start_times: Vec<u32>, end_times: Vec<u32>) -> Result<Self> {
        check_columns("layover interval block", &[&start_times, &end_times])?;
        Ok(Self {
            start_times,
            end_times,
        })
    }

    pub(crate) fn from_windows(windows: impl IntoIterator<Item = (u32, u32)>) -> Self {
        let (start_times, end_times) = windows.into_iter().unzip();
        Self {
            start_times,
            end_times,
        }
    }

    pub fn len(&self) -> usize {
        self.start_times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start_times.is_empty()
    }

    pub fn start_times(&self) -> &[u32] {
        &self.start_times
    }

    pub fn end_times(&self) -> &[u32] {
        &self.end_times
    }

    /// Layovers in progress at some point of `[from, to]`
    pub fn overlapping(&self, from: u32, to: u32) -> Range<usize> {
        overlapping_windows(&self.start_times, &self.end_times, from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layover_queries() {
        let block = LayoverIntervalBlock::from_windows([(100, 200), (150, 260), (400, 420)]);
        assert_eq!(block.len(), 3);
        assert_eq!(block.start_times(), &[100, 150, 400]);
        assert_eq!(block.end_times(), &[200, 260, 420]);

        assert_eq!(block.overlapping(210, 230), 1..2);
        assert_eq!(block.overlapping(160, 160), 0..2);
        assert_eq!(block.overlapping(300, 350), 2..2);
    }

    #[test]
    fn test_new_rejects_unsorted() {
        assert!(LayoverIntervalBlock::new(vec![100, 50], vec![200, 300]).is_err());
        assert!(LayoverIntervalBlock::new(vec![100], vec![200, 300]).is_err());
        assert!(LayoverIntervalBlock::new(vec![], vec![]).unwrap().is_empty());
    }
}
