//! Built index families and the range queries over them.

use std::collections::HashMap;
use std::fmt;

use crate::grouping::{FrequencyItem, LayoverItem, TripItem};
use crate::identifiers::StopIdentifier;
use crate::intervals::{
    FrequencyServiceIntervalBlock, LayoverIntervalBlock, ServiceInterval, ServiceIntervalBlock,
};
use crate::models::graph::{BlockGraph, BlockTripRef};
use crate::models::types::FrequencyEntry;
use crate::search::lower_bound;

/// The three chain kinds an index can be built from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockIndexKind {
    Trip,
    Layover,
    Frequency,
}

impl fmt::Display for BlockIndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Trip => "trip",
            Self::Layover => "layover",
            Self::Frequency => "frequency",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Index types
// ============================================================================

/// A chain of same-pattern trips plus their service intervals
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockTripIndex {
    trips: Vec<BlockTripRef>,
    stops: Vec<StopIdentifier>,
    service_intervals: ServiceIntervalBlock,
}

impl BlockTripIndex {
    pub(crate) fn from_chain(stops: Vec<StopIdentifier>, chain: Vec<TripItem<'_>>) -> Self {
        let mut trips = Vec::with_capacity(chain.len());
        let mut intervals = Vec::with_capacity(chain.len());
        for item in chain {
            if let Some(interval) = ServiceInterval::from_stop_times(item.stop_times) {
                trips.push(item.trip);
                intervals.push(interval);
            }
        }
        Self {
            trips,
            stops,
            service_intervals: ServiceIntervalBlock::from_intervals(intervals),
        }
    }

    /// Trips in chain order
    pub fn trips(&self) -> &[BlockTripRef] {
        &self.trips
    }

    /// Stop pattern shared by every trip
    pub fn stops(&self) -> &[StopIdentifier] {
        &self.stops
    }

    pub fn service_interval_block(&self) -> &ServiceIntervalBlock {
        &self.service_intervals
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// Trips in service at some point of `[from, to]`
    pub fn trips_overlapping(&self, from: u32, to: u32) -> &[BlockTripRef] {
        &self.trips[self.service_intervals.overlapping(from, to)]
    }
}

/// A chain of layovers at the same stop
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockLayoverIndex {
    /// Trip following each layover
    trips: Vec<BlockTripRef>,
    stop: StopIdentifier,
    layover_intervals: LayoverIntervalBlock,
}

impl BlockLayoverIndex {
    pub(crate) fn from_chain(stop: StopIdentifier, chain: Vec<LayoverItem>) -> Self {
        let trips = chain.iter().map(|item| item.trip).collect();
        let layover_intervals =
            LayoverIntervalBlock::from_windows(chain.iter().map(|item| (item.start, item.end)));
        Self {
            trips,
            stop,
            layover_intervals,
        }
    }

    pub fn trips(&self) -> &[BlockTripRef] {
        &self.trips
    }

    /// Stop the vehicles lay over at
    pub fn stop(&self) -> &StopIdentifier {
        &self.stop
    }

    pub fn layover_interval_block(&self) -> &LayoverIntervalBlock {
        &self.layover_intervals
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn trips_overlapping(&self, from: u32, to: u32) -> &[BlockTripRef] {
        &self.trips[self.layover_intervals.overlapping(from, to)]
    }
}

/// A chain of non-overlapping frequency windows of same-pattern trips
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrequencyBlockTripIndex {
    trips: Vec<BlockTripRef>,
    frequencies: Vec<FrequencyEntry>,
    stops: Vec<StopIdentifier>,
    service_intervals: FrequencyServiceIntervalBlock,
}

impl FrequencyBlockTripIndex {
    pub(crate) fn from_chain(stops: Vec<StopIdentifier>, chain: Vec<FrequencyItem>) -> Self {
        let (trips, frequencies): (Vec<_>, Vec<_>) =
            chain.into_iter().map(|item| (item.trip, item.frequency)).unzip();
        let service_intervals = FrequencyServiceIntervalBlock::from_frequencies(&frequencies);
        Self {
            trips,
            frequencies,
            stops,
            service_intervals,
        }
    }

    pub fn trips(&self) -> &[BlockTripRef] {
        &self.trips
    }

    /// Frequency window of each trip, parallel to [`Self::trips`]
    pub fn frequencies(&self) -> &[FrequencyEntry] {
        &self.frequencies
    }

    pub fn stops(&self) -> &[StopIdentifier] {
        &self.stops
    }

    pub fn service_interval_block(&self) -> &FrequencyServiceIntervalBlock {
        &self.service_intervals
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn entries_overlapping(
        &self,
        from: u32,
        to: u32,
    ) -> impl Iterator<Item = (BlockTripRef, &FrequencyEntry)> + '_ {
        let range = self.service_intervals.overlapping(from, to);
        self.trips[range.clone()]
            .iter()
            .copied()
            .zip(&self.frequencies[range])
    }
}

// ============================================================================
// Index collection
// ============================================================================

/// A scheduled departure found by [`BlockIndices::departures_at_stop`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduledDeparture {
    pub trip: BlockTripRef,
    /// Position of the stop time within its block configuration
    pub block_sequence: usize,
    pub arrival: u32,
    pub departure: u32,
}

#[derive(Clone, Copy, Debug)]
struct StopSlot {
    index: usize,
    position: usize,
}

/// All three index families of a bundle
///
/// Immutable once built. Trip references point into the [`BlockGraph`]
/// the indices were built from.
#[derive(Clone, Debug, Default)]
pub struct BlockIndices {
    trip_indices: Vec<BlockTripIndex>,
    layover_indices: Vec<BlockLayoverIndex>,
    frequency_indices: Vec<FrequencyBlockTripIndex>,

    // Lookup map
    stop_slots: HashMap<StopIdentifier, Vec<StopSlot>>,
}

impl BlockIndices {
    pub fn new(
        trip_indices: Vec<BlockTripIndex>,
        layover_indices: Vec<BlockLayoverIndex>,
        frequency_indices: Vec<FrequencyBlockTripIndex>,
    ) -> Self {
        let mut stop_slots: HashMap<StopIdentifier, Vec<StopSlot>> = HashMap::new();
        for (index, trip_index) in trip_indices.iter().enumerate() {
            for (position, stop) in trip_index.stops.iter().enumerate() {
                stop_slots
                    .entry(stop.clone())
                    .or_default()
                    .push(StopSlot { index, position });
            }
        }

        Self {
            trip_indices,
            layover_indices,
            frequency_indices,
            stop_slots,
        }
    }

    pub fn trip_indices(&self) -> &[BlockTripIndex] {
        &self.trip_indices
    }

    pub fn layover_indices(&self) -> &[BlockLayoverIndex] {
        &self.layover_indices
    }

    pub fn frequency_indices(&self) -> &[FrequencyBlockTripIndex] {
        &self.frequency_indices
    }

    pub fn len(&self, kind: BlockIndexKind) -> usize {
        match kind {
            BlockIndexKind::Trip => self.trip_indices.len(),
            BlockIndexKind::Layover => self.layover_indices.len(),
            BlockIndexKind::Frequency => self.frequency_indices.len(),
        }
    }

    /// Scheduled trips in service at some point of `[from, to]`
    pub fn active_trips(&self, from: u32, to: u32) -> impl Iterator<Item = BlockTripRef> + '_ {
        self.trip_indices
            .iter()
            .flat_map(move |index| index.trips_overlapping(from, to).iter().copied())
    }

    /// Trips whose preceding layover overlaps `[from, to]`
    pub fn active_layovers(&self, from: u32, to: u32) -> impl Iterator<Item = BlockTripRef> + '_ {
        self.layover_indices
            .iter()
            .flat_map(move |index| index.trips_overlapping(from, to).iter().copied())
    }

    /// Frequency windows active at some point of `[from, to]`
    pub fn active_frequency_trips(
        &self,
        from: u32,
        to: u32,
    ) -> impl Iterator<Item = (BlockTripRef, &FrequencyEntry)> + '_ {
        self.frequency_indices
            .iter()
            .flat_map(move |index| index.entries_overlapping(from, to))
    }

    /// Every scheduled departure from `stop` within `[from, to]`, ordered by
    /// departure time.
    ///
    /// Departures at a given stop position are non-decreasing along each
    /// chain, so each chain is binary searched instead of scanned.
    pub fn departures_at_stop(
        &self,
        graph: &BlockGraph,
        stop: &StopIdentifier,
        from: u32,
        to: u32,
    ) -> Vec<ScheduledDeparture> {
        let Some(slots) = self.stop_slots.get(stop) else {
            return Vec::new();
        };

        let mut departures = Vec::new();
        for slot in slots {
            let trips = &self.trip_indices[slot.index].trips;
            let departure_of = |i: usize| {
                graph
                    .block_trip_stop_times(trips[i])
                    .get(slot.position)
                    .map(|st| st.departure)
            };

            let start = lower_bound(0..trips.len(), |i| departure_of(i).is_some_and(|d| d < from));
            for &trip in &trips[start..] {
                let Some(stop_time) = graph.block_trip_stop_times(trip).get(slot.position) else {
                    continue;
                };
                if stop_time.departure > to {
                    break;
                }
                if stop_time.departure < from {
                    continue;
                }
                departures.push(ScheduledDeparture {
                    trip,
                    block_sequence: stop_time.block_sequence,
                    arrival: stop_time.arrival,
                    departure: stop_time.departure,
                });
            }
        }

        departures.sort_by_key(|d| (d.departure, d.trip));
        departures
    }
}
