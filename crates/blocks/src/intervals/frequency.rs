//! Frequency service interval block.

use std::ops::Range;

use super::{check_columns, overlapping_windows};
use crate::models::types::{FrequencyEntry, Result};

/// Service windows of a chain of frequency entries
///
/// Windows in a chain never overlap, so both columns interleave:
/// `start[i] <= end[i] <= start[i + 1]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrequencyServiceIntervalBlock {
    start_times: Vec<u32>,
    end_times: Vec<u32>,
}

impl FrequencyServiceIntervalBlock {
    pub fn new(start_times: Vec<u32>, end_times: Vec<u32>) -> Result<Self> {
        check_columns("frequency interval block", &[&start_times, &end_times])?;
        Ok(Self {
            start_times,
            end_times,
        })
    }

    pub(crate) fn from_frequencies<'a>(
        frequencies: impl IntoIterator<Item = &'a FrequencyEntry>,
    ) -> Self {
        let (start_times, end_times) = frequencies
            .into_iter()
            .map(|frequency| (frequency.start_time, frequency.end_time))
            .unzip();
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

    /// Windows active at some point of `[from, to]`
    pub fn overlapping(&self, from: u32, to: u32) -> Range<usize> {
        overlapping_windows(&self.start_times, &self.end_times, from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_windows() {
        let frequencies = [
            FrequencyEntry::new(6 * 3600, 9 * 3600, 600),
            FrequencyEntry::new(9 * 3600, 15 * 3600, 1200),
            FrequencyEntry::new(16 * 3600, 19 * 3600, 600),
        ];
        let block = FrequencyServiceIntervalBlock::from_frequencies(&frequencies);

        assert_eq!(block.len(), 3);
        assert_eq!(block.overlapping(7 * 3600, 7 * 3600), 0..1);
        // Boundary instant belongs to both adjacent windows
        assert_eq!(block.overlapping(9 * 3600, 9 * 3600), 0..2);
        assert_eq!(block.overlapping(15 * 3600 + 1, 16 * 3600 - 1), 2..2);
        assert_eq!(block.overlapping(0, 24 * 3600), 0..3);
    }
}
