//! Service interval block for chains of scheduled trips.

use std::ops::Range;

use super::{check_columns, overlapping_windows};
use crate::models::graph::BlockStopTime;
use crate::models::types::Result;
use crate::search::lower_bound;

/// Arrival/departure bounds of a single trip
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceInterval {
    pub min_arrival: u32,
    pub min_departure: u32,
    pub max_arrival: u32,
    pub max_departure: u32,
}

impl ServiceInterval {
    pub fn new(arrival: u32, departure: u32) -> Self {
        Self {
            min_arrival: arrival,
            min_departure: departure,
            max_arrival: arrival,
            max_departure: departure,
        }
    }

    pub fn extend(self, arrival: u32, departure: u32) -> Self {
        Self {
            min_arrival: self.min_arrival.min(arrival),
            min_departure: self.min_departure.min(departure),
            max_arrival: self.max_arrival.max(arrival),
            max_departure: self.max_departure.max(departure),
        }
    }

    /// Interval spanned by the first and last of `stop_times`
    pub fn from_stop_times(stop_times: &[BlockStopTime]) -> Option<Self> {
        let first = stop_times.first()?;
        let last = stop_times.last()?;
        Some(Self::new(first.arrival, first.departure).extend(last.arrival, last.departure))
    }
}

/// Parallel arrays of [`ServiceInterval`]s, one slot per trip in a chain
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceIntervalBlock {
    min_arrivals: Vec<u32>,
    min_departures: Vec<u32>,
    max_arrivals: Vec<u32>,
    max_departures: Vec<u32>,
}

impl ServiceIntervalBlock {
    /// Build from raw columns.
    ///
    /// Returns `Err` if the columns differ in length or any is unsorted.
    pub fn new(
        min_arrivals: Vec<u32>,
        min_departures: Vec<u32>,
        max_arrivals: Vec<u32>,
        max_departures: Vec<u32>,
    ) -> Result<Self> {
        check_columns(
            "service interval block",
            &[&min_arrivals, &min_departures, &max_arrivals, &max_departures],
        )?;
        Ok(Self {
            min_arrivals,
            min_departures,
            max_arrivals,
            max_departures,
        })
    }

    /// Build from intervals already in chain order
    pub(crate) fn from_intervals(intervals: impl IntoIterator<Item = ServiceInterval>) -> Self {
        let mut block = Self::default();
        for interval in intervals {
            block.min_arrivals.push(interval.min_arrival);
            block.min_departures.push(interval.min_departure);
            block.max_arrivals.push(interval.max_arrival);
            block.max_departures.push(interval.max_departure);
        }
        block
    }

    pub fn len(&self) -> usize {
        self.min_arrivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.min_arrivals.is_empty()
    }

    pub fn min_arrivals(&self) -> &[u32] {
        &self.min_arrivals
    }

    pub fn min_departures(&self) -> &[u32] {
        &self.min_departures
    }

    pub fn max_arrivals(&self) -> &[u32] {
        &self.max_arrivals
    }

    pub fn max_departures(&self) -> &[u32] {
        &self.max_departures
    }

    pub fn interval(&self, index: usize) -> Option<ServiceInterval> {
        Some(ServiceInterval {
            min_arrival: *self.min_arrivals.get(index)?,
            min_departure: self.min_departures[index],
            max_arrival: self.max_arrivals[index],
            max_departure: self.max_departures[index],
        })
    }

    /// Members in service at some point of `[from, to]`
    pub fn overlapping(&self, from: u32, to: u32) -> Range<usize> {
        overlapping_windows(&self.min_arrivals, &self.max_departures, from, to)
    }

    /// First member that has not finished by `time`
    pub fn index_of_first_max_departure_at_or_after(&self, time: u32) -> usize {
        lower_bound(0..self.len(), |i| self.max_departures[i] < time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::StopIdentifier;

    fn block_stop(arrival: u32, departure: u32) -> BlockStopTime {
        BlockStopTime {
            stop_id: StopIdentifier::new("s"),
            arrival,
            departure,
            distance_along_block: 0.0,
            trip_sequence: 0,
            block_sequence: 0,
        }
    }

    fn sample() -> ServiceIntervalBlock {
        ServiceIntervalBlock::from_intervals([
            ServiceInterval::new(100, 110).extend(500, 510),
            ServiceInterval::new(200, 210).extend(600, 610),
            ServiceInterval::new(300, 310).extend(700, 710),
        ])
    }

    #[test]
    fn test_interval_from_stop_times() {
        let stop_times = [block_stop(100, 120), block_stop(200, 200), block_stop(300, 330)];
        let interval = ServiceInterval::from_stop_times(&stop_times).unwrap();
        assert_eq!(
            interval,
            ServiceInterval {
                min_arrival: 100,
                min_departure: 120,
                max_arrival: 300,
                max_departure: 330,
            }
        );
        assert!(ServiceInterval::from_stop_times(&[]).is_none());
    }

    #[test]
    fn test_columns() {
        let block = sample();
        assert_eq!(block.len(), 3);
        assert_eq!(block.min_arrivals(), &[100, 200, 300]);
        assert_eq!(block.min_departures(), &[110, 210, 310]);
        assert_eq!(block.max_arrivals(), &[500, 600, 700]);
        assert_eq!(block.max_departures(), &[510, 610, 710]);
        assert_eq!(block.interval(1).unwrap().max_arrival, 600);
        assert!(block.interval(3).is_none());
    }

    #[test]
    fn test_overlapping() {
        let block = sample();
        assert_eq!(block.overlapping(0, 50), 0..0);
        assert_eq!(block.overlapping(0, 150), 0..1);
        assert_eq!(block.overlapping(520, 550), 1..3);
        assert_eq!(block.overlapping(650, 900), 2..3);
        assert_eq!(block.overlapping(711, 900), 3..3);
    }

    #[test]
    fn test_point_searches() {
        let block = sample();
        assert_eq!(block.index_of_first_max_departure_at_or_after(0), 0);
        assert_eq!(block.index_of_first_max_departure_at_or_after(511), 1);
        assert_eq!(block.index_of_first_max_departure_at_or_after(800), 3);
    }

    #[test]
    fn test_new_validates() {
        assert!(ServiceIntervalBlock::new(vec![1, 2], vec![1, 2], vec![3, 4], vec![3, 4]).is_ok());
        assert!(ServiceIntervalBlock::new(vec![2, 1], vec![1, 2], vec![3, 4], vec![3, 4]).is_err());
        assert!(ServiceIntervalBlock::new(vec![1], vec![1, 2], vec![3, 4], vec![3, 4]).is_err());
    }
}
