//! Arena-backed block graph.
//!
//! Trips, blocks and block configurations live in flat vectors and refer to
//! each other through integer handles. [`BlockGraphBuilder::build`] is the
//! one-shot pass that flattens every configuration's stop times and computes
//! distances along the block, so nothing is rebuilt lazily on read.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use crate::identifiers::*;
use crate::models::service_ids::ServiceIdActivation;
use crate::models::types::*;

// ============================================================================
// Entries
// ============================================================================

/// A scheduled trip, shared by every block configuration that runs it
#[derive(Clone, Debug, PartialEq)]
pub struct TripEntry {
    pub id: TripIdentifier,
    pub stop_times: Vec<StopTime>,
    /// Length of the trip's path in meters
    pub total_distance: f64,
}

impl TripEntry {
    /// Trip whose length is the distance of its last stop
    pub fn new(id: TripIdentifier, stop_times: Vec<StopTime>) -> Self {
        let total_distance = stop_times
            .last()
            .map(|stop_time| stop_time.distance_along_trip)
            .unwrap_or(0.0);
        Self {
            id,
            stop_times,
            total_distance,
        }
    }

    /// Override the trip length, e.g. when the shape runs past the last stop
    pub fn with_total_distance(self, total_distance: f64) -> Self {
        Self {
            total_distance,
            ..self
        }
    }
}

/// A vehicle's chain of trips for one service day
#[derive(Clone, Debug)]
pub struct BlockEntry {
    pub id: BlockIdentifier,
    configurations: Vec<BlockConfigurationId>,
}

impl BlockEntry {
    pub fn configurations(&self) -> &[BlockConfigurationId] {
        &self.configurations
    }
}

/// A trip as it appears inside one block configuration
#[derive(Clone, Debug)]
pub struct BlockTrip {
    pub trip: TripId,
    /// Position of the trip within the configuration
    pub sequence: usize,
    /// Distance along the block at which the trip starts
    pub distance_along_block: f64,
    stop_times: Range<usize>,
}

impl BlockTrip {
    /// Range of this trip's entries in [`BlockConfiguration::stop_times`]
    pub fn stop_time_range(&self) -> Range<usize> {
        self.stop_times.clone()
    }
}

/// A stop time positioned along a whole block configuration
#[derive(Clone, Debug, PartialEq)]
pub struct BlockStopTime {
    pub stop_id: StopIdentifier,
    pub arrival: u32,
    pub departure: u32,
    pub distance_along_block: f64,
    /// Position of the owning trip within the configuration
    pub trip_sequence: usize,
    /// Position of this stop time within the configuration
    pub block_sequence: usize,
}

/// One realization of a block under a specific service id activation
#[derive(Clone, Debug)]
pub struct BlockConfiguration {
    id: BlockConfigurationId,
    block: BlockId,
    service_ids: ServiceIdActivation,
    trips: Vec<BlockTrip>,
    stop_times: Vec<BlockStopTime>,
    frequencies: Vec<FrequencyEntry>,
}

impl BlockConfiguration {
    pub fn id(&self) -> BlockConfigurationId {
        self.id
    }

    pub fn block(&self) -> BlockId {
        self.block
    }

    pub fn service_ids(&self) -> &ServiceIdActivation {
        &self.service_ids
    }

    pub fn trips(&self) -> &[BlockTrip] {
        &self.trips
    }

    /// Every stop time of every trip, in block order
    pub fn stop_times(&self) -> &[BlockStopTime] {
        &self.stop_times
    }

    pub fn frequencies(&self) -> &[FrequencyEntry] {
        &self.frequencies
    }

    pub fn is_frequency_based(&self) -> bool {
        !self.frequencies.is_empty()
    }

    /// Stop times of the trip at `trip_sequence`, empty if out of range
    pub fn trip_stop_times(&self, trip_sequence: usize) -> &[BlockStopTime] {
        self.trips
            .get(trip_sequence)
            .map(|trip| &self.stop_times[trip.stop_time_range()])
            .unwrap_or(&[])
    }

    /// Distance along the block of the last stop
    pub fn total_distance(&self) -> f64 {
        self.stop_times
            .last()
            .map(|stop_time| stop_time.distance_along_block)
            .unwrap_or(0.0)
    }
}

/// Handle to a trip inside a particular block configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockTripRef {
    pub configuration: BlockConfigurationId,
    pub trip_sequence: u32,
}

impl BlockTripRef {
    /// `trip_sequence` fits in `u32`: the builder rejects longer configurations
    pub(crate) fn new(configuration: BlockConfigurationId, trip_sequence: usize) -> Self {
        debug_assert!(u32::try_from(trip_sequence).is_ok());
        Self {
            configuration,
            trip_sequence: trip_sequence as u32,
        }
    }
}

impl fmt::Display for BlockTripRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.configuration, self.trip_sequence)
    }
}

// ============================================================================
// Graph
// ============================================================================

/// Immutable store of all trips, blocks and block configurations of a bundle
#[derive(Clone, Debug, Default)]
pub struct BlockGraph {
    trips: Vec<TripEntry>,
    blocks: Vec<BlockEntry>,
    configurations: Vec<BlockConfiguration>,

    trip_map: HashMap<TripIdentifier, TripId>,
    block_map: HashMap<BlockIdentifier, BlockId>,
}

impl BlockGraph {
    pub fn trip(&self, id: TripId) -> Option<&TripEntry> {
        self.trips.get(id.index())
    }

    pub fn block(&self, id: BlockId) -> Option<&BlockEntry> {
        self.blocks.get(id.index())
    }

    pub fn configuration(&self, id: BlockConfigurationId) -> Option<&BlockConfiguration> {
        self.configurations.get(id.index())
    }

    pub fn trip_by_identifier(&self, id: &TripIdentifier) -> Option<TripId> {
        self.trip_map.get(id).copied()
    }

    pub fn block_by_identifier(&self, id: &BlockIdentifier) -> Option<BlockId> {
        self.block_map.get(id).copied()
    }

    pub fn blocks(&self) -> impl Iterator<Item = (BlockId, &BlockEntry)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, block)| (BlockId::from_index(index), block))
    }

    pub fn configurations(&self) -> &[BlockConfiguration] {
        &self.configurations
    }

    /// A block counts as frequency-based when its first configuration is
    pub fn is_frequency_based(&self, block: &BlockEntry) -> bool {
        block
            .configurations
            .first()
            .and_then(|id| self.configuration(*id))
            .map(BlockConfiguration::is_frequency_based)
            .unwrap_or(false)
    }

    pub fn block_trip(&self, trip: BlockTripRef) -> Option<&BlockTrip> {
        self.configuration(trip.configuration)?
            .trips
            .get(trip.trip_sequence as usize)
    }

    /// Stop times of a referenced trip, empty if the handle is dangling
    pub fn block_trip_stop_times(&self, trip: BlockTripRef) -> &[BlockStopTime] {
        self.configuration(trip.configuration)
            .map(|config| config.trip_stop_times(trip.trip_sequence as usize))
            .unwrap_or(&[])
    }

    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }
}

// ============================================================================
// Builder
// ============================================================================

struct PendingConfiguration {
    block: BlockId,
    service_ids: ServiceIdActivation,
    trips: Vec<TripId>,
    frequencies: Vec<FrequencyEntry>,
}

/// Bulk loader for a [`BlockGraph`]
#[derive(Default)]
pub struct BlockGraphBuilder {
    trips: Vec<TripEntry>,
    blocks: Vec<BlockEntry>,
    configurations: Vec<PendingConfiguration>,

    trip_map: HashMap<TripIdentifier, TripId>,
    block_map: HashMap<BlockIdentifier, BlockId>,
}

impl BlockGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trip.
    ///
    /// Returns `Err` for duplicate ids, for a stop departing before it
    /// arrives, for times or distances that go backwards between stops, and
    /// for a total distance short of the last stop.
    pub fn add_trip(&mut self, trip: TripEntry) -> Result<TripId> {
        if self.trip_map.contains_key(&trip.id) {
            return Err(BlockError::InvalidData(format!("Duplicate trip: {}", trip.id)));
        }

        if let Some(stop_time) = trip.stop_times.iter().find(|st| st.departure < st.arrival) {
            return Err(BlockError::InvalidData(format!(
                "Trip {} departs stop {} at {} before arriving at {}",
                trip.id, stop_time.stop_id, stop_time.departure, stop_time.arrival
            )));
        }

        if let Some(pair) = trip
            .stop_times
            .windows(2)
            .find(|pair| pair[1].arrival < pair[0].departure)
        {
            return Err(BlockError::InvalidData(format!(
                "Trip {} arrives at {} ({}) before leaving {} ({})",
                trip.id, pair[1].stop_id, pair[1].arrival, pair[0].stop_id, pair[0].departure
            )));
        }

        if let Some(pair) = trip
            .stop_times
            .windows(2)
            .find(|pair| pair[1].distance_along_trip < pair[0].distance_along_trip)
        {
            return Err(BlockError::InvalidData(format!(
                "Trip {} goes backwards between stops {} ({}m) and {} ({}m)",
                trip.id,
                pair[0].stop_id,
                pair[0].distance_along_trip,
                pair[1].stop_id,
                pair[1].distance_along_trip
            )));
        }

        if let Some(last) = trip.stop_times.last() {
            if trip.total_distance < last.distance_along_trip {
                return Err(BlockError::InvalidData(format!(
                    "Trip {} is {}m long but its last stop is at {}m",
                    trip.id, trip.total_distance, last.distance_along_trip
                )));
            }
        }

        let id = TripId::try_from_index(self.trips.len()).ok_or_else(|| arena_full("trips"))?;
        self.trip_map.insert(trip.id.clone(), id);
        self.trips.push(trip);
        Ok(id)
    }

    pub fn add_block(&mut self, id: BlockIdentifier) -> Result<BlockId> {
        if self.block_map.contains_key(&id) {
            return Err(BlockError::InvalidData(format!("Duplicate block: {}", id)));
        }

        let handle = BlockId::try_from_index(self.blocks.len())
            .ok_or_else(|| arena_full("blocks"))?;
        self.block_map.insert(id.clone(), handle);
        self.blocks.push(BlockEntry {
            id,
            configurations: Vec::new(),
        });
        Ok(handle)
    }

    /// Attach a configuration running `trips` in order to `block`.
    ///
    /// Returns `Err` for unknown handles and when a trip starts before the
    /// previous one has left its last stop.
    pub fn add_configuration(
        &mut self,
        block: BlockId,
        service_ids: ServiceIdActivation,
        trips: Vec<TripId>,
        frequencies: Vec<FrequencyEntry>,
    ) -> Result<BlockConfigurationId> {
        if block.index() >= self.blocks.len() {
            return Err(BlockError::BlockNotFound(block));
        }
        if let Some(missing) = trips.iter().find(|trip| trip.index() >= self.trips.len()) {
            return Err(BlockError::TripNotFound(*missing));
        }
        if u32::try_from(trips.len()).is_err() {
            return Err(arena_full("configuration trips"));
        }

        let mut previous: Option<&TripEntry> = None;
        for trip in trips.iter().map(|id| &self.trips[id.index()]) {
            let Some(first) = trip.stop_times.first() else {
                continue;
            };
            if let Some(prev) = previous {
                let last_departure = prev.stop_times.last().map_or(0, |st| st.departure);
                if first.arrival < last_departure {
                    return Err(BlockError::InvalidData(format!(
                        "Trip {} starts at {} before trip {} leaves at {}",
                        trip.id, first.arrival, prev.id, last_departure
                    )));
                }
            }
            previous = Some(trip);
        }

        let id = BlockConfigurationId::try_from_index(self.configurations.len())
            .ok_or_else(|| arena_full("configurations"))?;
        self.blocks[block.index()].configurations.push(id);
        self.configurations.push(PendingConfiguration {
            block,
            service_ids,
            trips,
            frequencies,
        });
        Ok(id)
    }

    /// Flatten every configuration and freeze the graph
    pub fn build(self) -> BlockGraph {
        let configurations = self
            .configurations
            .into_iter()
            .enumerate()
            .map(|(index, pending)| {
                flatten_configuration(BlockConfigurationId::from_index(index), pending, &self.trips)
            })
            .collect();

        BlockGraph {
            trips: self.trips,
            blocks: self.blocks,
            configurations,
            trip_map: self.trip_map,
            block_map: self.block_map,
        }
    }
}

fn arena_full(kind: &str) -> BlockError {
    BlockError::InvalidData(format!("Too many {} for a u32 handle", kind))
}

fn flatten_configuration(
    id: BlockConfigurationId,
    pending: PendingConfiguration,
    trips: &[TripEntry],
) -> BlockConfiguration {
    let mut block_trips = Vec::with_capacity(pending.trips.len());
    let mut stop_times = Vec::new();
    let mut distance_offset = 0.0;

    for (sequence, trip_id) in pending.trips.iter().enumerate() {
        let trip = &trips[trip_id.index()];
        let start = stop_times.len();

        for stop_time in &trip.stop_times {
            stop_times.push(BlockStopTime {
                stop_id: stop_time.stop_id.clone(),
                arrival: stop_time.arrival,
                departure: stop_time.departure,
                distance_along_block: distance_offset + stop_time.distance_along_trip,
                trip_sequence: sequence,
                block_sequence: stop_times.len(),
            });
        }

        block_trips.push(BlockTrip {
            trip: *trip_id,
            sequence,
            distance_along_block: distance_offset,
            stop_times: start..stop_times.len(),
        });
        distance_offset += trip.total_distance;
    }

    BlockConfiguration {
        id,
        block: pending.block,
        service_ids: pending.service_ids,
        trips: block_trips,
        stop_times,
        frequencies: pending.frequencies,
    }
}
