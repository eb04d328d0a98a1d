//! Graph fixtures shared by the index tests.

use crate::identifiers::*;
use crate::models::graph::{BlockGraph, BlockGraphBuilder, BlockTripRef, TripEntry};
use crate::models::service_ids::ServiceIdActivation;
use crate::models::types::{FrequencyEntry, StopTime};

/// `(stop, time)` pairs; each stop arrives and departs at `time`, 1km apart
pub type Stops<'a> = &'a [(&'a str, u32)];

pub struct Fixture {
    builder: BlockGraphBuilder,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            builder: BlockGraphBuilder::new(),
        }
    }

    pub fn weekday(&self) -> ServiceIdActivation {
        ServiceIdActivation::active([ServiceIdentifier::new("weekday")])
    }

    pub fn weekend(&self) -> ServiceIdActivation {
        ServiceIdActivation::active([ServiceIdentifier::new("weekend")])
    }

    fn trip(&mut self, name: &str, stops: Stops<'_>) -> TripId {
        let stop_times = stops
            .iter()
            .enumerate()
            .map(|(i, &(stop, time))| {
                StopTime::new(StopIdentifier::new(stop), time, time, i as f64 * 1000.0)
            })
            .collect();
        self.builder
            .add_trip(TripEntry::new(TripIdentifier::new(name), stop_times))
            .unwrap()
    }

    /// Block with one scheduled configuration running `trips` in order
    pub fn block(
        &mut self,
        name: &str,
        service_ids: ServiceIdActivation,
        trips: &[(&str, Stops<'_>)],
    ) -> BlockId {
        let block = self.builder.add_block(BlockIdentifier::new(name)).unwrap();
        self.configuration(block, service_ids, trips, &[]);
        block
    }

    /// Block running one trip repeatedly over each `(start, end)` window
    pub fn frequency_block(
        &mut self,
        name: &str,
        service_ids: ServiceIdActivation,
        trip: (&str, Stops<'_>),
        windows: &[(u32, u32)],
    ) -> BlockId {
        let block = self.builder.add_block(BlockIdentifier::new(name)).unwrap();
        self.configuration(block, service_ids, &[trip], windows);
        block
    }

    /// Extra configuration on `block`, frequency-based when `windows` is non-empty
    pub fn configuration(
        &mut self,
        block: BlockId,
        service_ids: ServiceIdActivation,
        trips: &[(&str, Stops<'_>)],
        windows: &[(u32, u32)],
    ) -> BlockConfigurationId {
        let trips = trips
            .iter()
            .map(|&(trip, stops)| self.trip(trip, stops))
            .collect();
        let frequencies = windows
            .iter()
            .map(|&(start, end)| FrequencyEntry::new(start, end, 600))
            .collect();
        self.builder
            .add_configuration(block, service_ids, trips, frequencies)
            .unwrap()
    }

    pub fn empty_block(&mut self, name: &str) {
        self.builder.add_block(BlockIdentifier::new(name)).unwrap();
    }

    pub fn build(self) -> BlockGraph {
        self.builder.build()
    }
}

/// Identifier of the trip behind `trip`
pub fn trip_name(graph: &BlockGraph, trip: BlockTripRef) -> &str {
    let block_trip = graph.block_trip(trip).unwrap();
    graph.trip(block_trip.trip).unwrap().id.as_str()
}

/// `routes` stop patterns, each run by `trips_per_route` single-trip blocks
/// spaced ten minutes apart
pub fn grid_fixture(routes: usize, trips_per_route: usize) -> BlockGraph {
    let mut fixture = Fixture::new();
    let weekday = fixture.weekday();

    for route in 0..routes {
        let stops: Vec<String> = (0..4).map(|stop| format!("r{route}_s{stop}")).collect();
        for n in 0..trips_per_route {
            let start = 6 * 3600 + (n as u32) * 600;
            let times: Vec<(&str, u32)> = stops
                .iter()
                .enumerate()
                .map(|(i, stop)| (stop.as_str(), start + i as u32 * 300))
                .collect();
            let trip = format!("r{route}_t{n}");
            let block = format!("r{route}_b{n}");
            fixture.block(&block, weekday.clone(), &[(trip.as_str(), times.as_slice())]);
        }
    }

    fixture.build()
}
