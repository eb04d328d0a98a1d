//! Resolve a schedule time or a distance to a position along a block.
//!
//! Every query falls into one of three cases: before the first stop, at
//! or between stops, or past the last stop. The last one has no answer and
//! resolves to `Ok(None)`.

use crate::identifiers::BlockConfigurationId;
use crate::interpolation::interpolate_pair;
use crate::location::scheduled::ScheduledBlockLocation;
use crate::models::graph::{BlockConfiguration, BlockGraph, BlockStopTime, BlockTripRef};
use crate::models::types::{BlockError, Result};
use crate::search::{gallop_lower_bound, lower_bound};

/// Scheduled position lookups by configuration handle
pub trait ScheduledBlockLocationService {
    /// Position at `scheduled_time`, `None` once the last stop has departed
    fn location_from_scheduled_time(
        &self,
        configuration: BlockConfigurationId,
        scheduled_time: u32,
    ) -> Result<Option<ScheduledBlockLocation>>;

    /// Same answer as [`Self::location_from_scheduled_time`], searching
    /// forward from `previous` when it lies before `scheduled_time`
    fn location_from_scheduled_time_after(
        &self,
        previous: &ScheduledBlockLocation,
        scheduled_time: u32,
    ) -> Result<Option<ScheduledBlockLocation>>;

    /// Position at `distance` meters along the block, `None` outside the block
    fn location_from_distance(
        &self,
        configuration: BlockConfigurationId,
        distance: f64,
    ) -> Result<Option<ScheduledBlockLocation>>;

    fn location_from_distance_after(
        &self,
        previous: &ScheduledBlockLocation,
        distance: f64,
    ) -> Result<Option<ScheduledBlockLocation>>;
}

impl ScheduledBlockLocationService for BlockGraph {
    fn location_from_scheduled_time(
        &self,
        configuration: BlockConfigurationId,
        scheduled_time: u32,
    ) -> Result<Option<ScheduledBlockLocation>> {
        location_from_scheduled_time(require(self, configuration)?, scheduled_time)
    }

    fn location_from_scheduled_time_after(
        &self,
        previous: &ScheduledBlockLocation,
        scheduled_time: u32,
    ) -> Result<Option<ScheduledBlockLocation>> {
        let config = require(self, previous.configuration)?;
        location_from_scheduled_time_after(config, previous, scheduled_time)
    }

    fn location_from_distance(
        &self,
        configuration: BlockConfigurationId,
        distance: f64,
    ) -> Result<Option<ScheduledBlockLocation>> {
        location_from_distance(require(self, configuration)?, distance)
    }

    fn location_from_distance_after(
        &self,
        previous: &ScheduledBlockLocation,
        distance: f64,
    ) -> Result<Option<ScheduledBlockLocation>> {
        let config = require(self, previous.configuration)?;
        location_from_distance_after(config, previous, distance)
    }
}

fn require(graph: &BlockGraph, id: BlockConfigurationId) -> Result<&BlockConfiguration> {
    graph
        .configuration(id)
        .ok_or(BlockError::ConfigurationNotFound(id))
}

fn non_empty_stop_times(config: &BlockConfiguration) -> Result<&[BlockStopTime]> {
    match config.stop_times() {
        [] => Err(BlockError::EmptyBlockConfiguration(config.id())),
        stop_times => Ok(stop_times),
    }
}

// ============================================================================
// Time queries
// ============================================================================

pub fn location_from_scheduled_time(
    config: &BlockConfiguration,
    scheduled_time: u32,
) -> Result<Option<ScheduledBlockLocation>> {
    let stop_times = non_empty_stop_times(config)?;
    let index = lower_bound(0..stop_times.len(), |i| {
        stop_times[i].departure < scheduled_time
    });
    Ok(locate_at_time(config, stop_times, index, scheduled_time))
}

pub fn location_from_scheduled_time_after(
    config: &BlockConfiguration,
    previous: &ScheduledBlockLocation,
    scheduled_time: u32,
) -> Result<Option<ScheduledBlockLocation>> {
    let stop_times = non_empty_stop_times(config)?;
    let is_before = |i: usize| stop_times[i].departure < scheduled_time;
    let index = hinted_lower_bound(config, previous, stop_times.len(), is_before);
    Ok(locate_at_time(config, stop_times, index, scheduled_time))
}

fn locate_at_time(
    config: &BlockConfiguration,
    stop_times: &[BlockStopTime],
    index: usize,
    time: u32,
) -> Option<ScheduledBlockLocation> {
    let next = stop_times.get(index)?;

    if next.arrival <= time {
        return Some(at_stop(config, stop_times, index, time));
    }

    if index == 0 {
        let distance = match first_leg_velocity(stop_times) {
            Some(velocity) => {
                let elapsed = f64::from(next.arrival - time);
                (next.distance_along_block - velocity * elapsed).max(0.0)
            }
            None => next.distance_along_block,
        };
        return Some(before_first_stop(config, stop_times, distance, time));
    }

    // prev.departure < time < next.arrival
    let prev = &stop_times[index - 1];
    let ratio = f64::from(time - prev.departure) / f64::from(next.arrival - prev.departure);
    let distance = interpolate_pair(
        f64::from(prev.departure),
        prev.distance_along_block,
        f64::from(next.arrival),
        next.distance_along_block,
        f64::from(time),
    );
    Some(between_stops(config, stop_times, index, ratio, distance, time))
}

// ============================================================================
// Distance queries
// ============================================================================

pub fn location_from_distance(
    config: &BlockConfiguration,
    distance: f64,
) -> Result<Option<ScheduledBlockLocation>> {
    let stop_times = non_empty_stop_times(config)?;
    if !(distance >= 0.0) {
        return Ok(None);
    }
    let index = lower_bound(0..stop_times.len(), |i| {
        stop_times[i].distance_along_block < distance
    });
    Ok(locate_at_distance(config, stop_times, index, distance))
}

pub fn location_from_distance_after(
    config: &BlockConfiguration,
    previous: &ScheduledBlockLocation,
    distance: f64,
) -> Result<Option<ScheduledBlockLocation>> {
    let stop_times = non_empty_stop_times(config)?;
    if !(distance >= 0.0) {
        return Ok(None);
    }
    let is_before = |i: usize| stop_times[i].distance_along_block < distance;
    let index = hinted_lower_bound(config, previous, stop_times.len(), is_before);
    Ok(locate_at_distance(config, stop_times, index, distance))
}

fn locate_at_distance(
    config: &BlockConfiguration,
    stop_times: &[BlockStopTime],
    index: usize,
    distance: f64,
) -> Option<ScheduledBlockLocation> {
    let next = stop_times.get(index)?;

    if next.distance_along_block == distance {
        return Some(at_stop(config, stop_times, index, next.arrival));
    }

    if index == 0 {
        let time = match first_leg_velocity(stop_times) {
            Some(velocity) => {
                let elapsed = (next.distance_along_block - distance) / velocity;
                (f64::from(next.arrival) - elapsed).max(0.0).round() as u32
            }
            None => next.arrival,
        };
        return Some(before_first_stop(config, stop_times, distance, time));
    }

    // prev.distance < distance < next.distance
    let prev = &stop_times[index - 1];
    let ratio = (distance - prev.distance_along_block)
        / (next.distance_along_block - prev.distance_along_block);
    let time = interpolate_pair(
        prev.distance_along_block,
        f64::from(prev.departure),
        next.distance_along_block,
        f64::from(next.arrival),
        distance,
    );
    Some(between_stops(config, stop_times, index, ratio, distance, time.round() as u32))
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Lower bound that gallops from `previous` when its index is still a valid
/// starting point, and searches everything otherwise
fn hinted_lower_bound(
    config: &BlockConfiguration,
    previous: &ScheduledBlockLocation,
    len: usize,
    is_before: impl Fn(usize) -> bool + Copy,
) -> usize {
    let hint = previous.stop_time_index;
    let usable = previous.configuration == config.id()
        && hint <= len
        && (hint == 0 || is_before(hint - 1));

    if usable {
        gallop_lower_bound(hint..len, is_before)
    } else {
        lower_bound(0..len, is_before)
    }
}

/// Meters per second between the first stop's departure and the second
/// stop's arrival
fn first_leg_velocity(stop_times: &[BlockStopTime]) -> Option<f64> {
    let (first, second) = (stop_times.first()?, stop_times.get(1)?);
    if second.arrival <= first.departure
        || second.distance_along_block <= first.distance_along_block
    {
        return None;
    }
    let seconds = f64::from(second.arrival - first.departure);
    Some((second.distance_along_block - first.distance_along_block) / seconds)
}

fn offset(stop_time: u32, time: u32) -> i64 {
    i64::from(stop_time) - i64::from(time)
}

fn at_stop(
    config: &BlockConfiguration,
    stop_times: &[BlockStopTime],
    index: usize,
    time: u32,
) -> ScheduledBlockLocation {
    let stop = &stop_times[index];
    ScheduledBlockLocation {
        configuration: config.id(),
        previous_stop: index.checked_sub(1),
        next_stop: index,
        next_stop_time_offset: offset(stop.arrival, time),
        closest_stop: index,
        closest_stop_time_offset: offset(stop.arrival, time),
        active_trip: BlockTripRef::new(config.id(), stop.trip_sequence),
        ratio: 1.0,
        distance_along_block: stop.distance_along_block,
        scheduled_time: time,
        in_service: true,
        stop_time_index: index,
    }
}

fn before_first_stop(
    config: &BlockConfiguration,
    stop_times: &[BlockStopTime],
    distance: f64,
    time: u32,
) -> ScheduledBlockLocation {
    let first = &stop_times[0];
    ScheduledBlockLocation {
        configuration: config.id(),
        previous_stop: None,
        next_stop: 0,
        next_stop_time_offset: offset(first.arrival, time),
        closest_stop: 0,
        closest_stop_time_offset: offset(first.arrival, time),
        active_trip: BlockTripRef::new(config.id(), first.trip_sequence),
        ratio: 0.0,
        distance_along_block: distance,
        scheduled_time: time,
        in_service: false,
        stop_time_index: 0,
    }
}

fn between_stops(
    config: &BlockConfiguration,
    stop_times: &[BlockStopTime],
    index: usize,
    ratio: f64,
    distance: f64,
    time: u32,
) -> ScheduledBlockLocation {
    let (prev, next) = (&stop_times[index - 1], &stop_times[index]);
    let (closest_stop, closest_time) = if ratio < 0.5 {
        (index - 1, prev.departure)
    } else {
        (index, next.arrival)
    };

    ScheduledBlockLocation {
        configuration: config.id(),
        previous_stop: Some(index - 1),
        next_stop: index,
        next_stop_time_offset: offset(next.arrival, time),
        closest_stop,
        closest_stop_time_offset: offset(closest_time, time),
        active_trip: BlockTripRef::new(config.id(), next.trip_sequence),
        ratio,
        distance_along_block: distance,
        scheduled_time: time,
        in_service: true,
        stop_time_index: index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::StopIdentifier;
    use crate::models::graph::{BlockGraphBuilder, TripEntry};
    use crate::models::service_ids::ServiceIdActivation;
    use crate::models::types::StopTime;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn stop(name: &str, arrival: u32, departure: u32, distance: f64) -> StopTime {
        StopTime::new(StopIdentifier::new(name), arrival, departure, distance)
    }

    /// Two trips: the first starts 500m into its shape, the second is
    /// offset by the first's 2600m length
    ///
    /// ```text
    /// idx stop arr  dep  dist
    ///  0   a   1000 1060  500
    ///  1   b   1200 1200 1500
    ///  2   c   1400 1460 2500
    ///  3   c   1600 1600 2600
    ///  4   d   1900 1900 3800
    /// ```
    fn two_trip_graph() -> (BlockGraph, BlockConfigurationId) {
        let mut builder = BlockGraphBuilder::new();
        let outbound = builder
            .add_trip(
                TripEntry::new(
                    "t1".into(),
                    vec![
                        stop("a", 1000, 1060, 500.0),
                        stop("b", 1200, 1200, 1500.0),
                        stop("c", 1400, 1460, 2500.0),
                    ],
                )
                .with_total_distance(2600.0),
            )
            .unwrap();
        let inbound = builder
            .add_trip(TripEntry::new(
                "t2".into(),
                vec![stop("c", 1600, 1600, 0.0), stop("d", 1900, 1900, 1200.0)],
            ))
            .unwrap();
        let block = builder.add_block("b1".into()).unwrap();
        let config = builder
            .add_configuration(
                block,
                ServiceIdActivation::default(),
                vec![outbound, inbound],
                vec![],
            )
            .unwrap();
        (builder.build(), config)
    }

    fn at_time(
        graph: &BlockGraph,
        config: BlockConfigurationId,
        time: u32,
    ) -> ScheduledBlockLocation {
        graph
            .location_from_scheduled_time(config, time)
            .unwrap()
            .unwrap()
    }

    fn at_distance(
        graph: &BlockGraph,
        config: BlockConfigurationId,
        distance: f64,
    ) -> ScheduledBlockLocation {
        graph
            .location_from_distance(config, distance)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_time_at_stop() {
        let (graph, config) = two_trip_graph();

        let location = at_time(&graph, config, 1030);
        assert_eq!(location.previous_stop, None);
        assert_eq!(location.next_stop, 0);
        assert_eq!(location.closest_stop, 0);
        assert_eq!(location.closest_stop_time_offset, -30);
        assert_eq!(location.distance_along_block, 500.0);
        assert!(location.in_service);

        let location = at_time(&graph, config, 1200);
        assert_eq!(location.previous_stop, Some(0));
        assert_eq!(location.closest_stop, 1);
        assert_eq!(location.distance_along_block, 1500.0);
    }

    #[test]
    fn test_time_between_stops() {
        let (graph, config) = two_trip_graph();

        let location = at_time(&graph, config, 1130);
        assert_eq!(location.previous_stop, Some(0));
        assert_eq!(location.next_stop, 1);
        assert_eq!(location.ratio, 0.5);
        assert_eq!(location.distance_along_block, 1000.0);
        assert_eq!(location.closest_stop, 1);
        assert_eq!(location.closest_stop_time_offset, 70);
        assert_eq!(location.next_stop_time_offset, 70);

        let location = at_time(&graph, config, 1100);
        assert_eq!(location.closest_stop, 0);
        assert_eq!(location.closest_stop_time_offset, -40);
        assert_relative_eq!(
            location.distance_along_block,
            500.0 + 1000.0 * 40.0 / 140.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_time_during_layover() {
        let (graph, config) = two_trip_graph();

        let location = at_time(&graph, config, 1530);
        assert_eq!(location.previous_stop, Some(2));
        assert_eq!(location.next_stop, 3);
        assert_eq!(location.active_trip, BlockTripRef::new(config, 1));
        assert_eq!(location.distance_along_block, 2550.0);
    }

    #[test]
    fn test_time_before_first_stop_extrapolates() {
        let (graph, config) = two_trip_graph();

        // First leg runs 1000m in 140s
        let location = at_time(&graph, config, 965);
        assert!(!location.in_service);
        assert_eq!(location.previous_stop, None);
        assert_eq!(location.next_stop_time_offset, 35);
        assert_relative_eq!(location.distance_along_block, 250.0, epsilon = 1e-9);

        // Never before the start of the block
        let location = at_time(&graph, config, 0);
        assert_eq!(location.distance_along_block, 0.0);
    }

    #[test]
    fn test_time_after_last_stop() {
        let (graph, config) = two_trip_graph();

        let location = at_time(&graph, config, 1900);
        assert_eq!(location.next_stop, 4);
        assert_eq!(location.distance_along_block, 3800.0);

        assert_eq!(graph.location_from_scheduled_time(config, 1901).unwrap(), None);
        assert_eq!(graph.location_from_scheduled_time(config, u32::MAX).unwrap(), None);
    }

    #[test]
    fn test_distance_queries() {
        let (graph, config) = two_trip_graph();

        let location = at_distance(&graph, config, 1000.0);
        assert_eq!(location.scheduled_time, 1130);
        assert_eq!(location.ratio, 0.5);

        let location = at_distance(&graph, config, 500.0);
        assert_eq!(location.scheduled_time, 1000);
        assert_eq!(location.closest_stop, 0);

        let location = at_distance(&graph, config, 250.0);
        assert!(!location.in_service);
        assert_eq!(location.scheduled_time, 965);

        let location = at_distance(&graph, config, 2550.0);
        assert_eq!(location.scheduled_time, 1530);
        assert_eq!(location.active_trip, BlockTripRef::new(config, 1));

        let location = at_distance(&graph, config, 3800.0);
        assert_eq!(location.scheduled_time, 1900);
        assert_eq!(location.next_stop, 4);
    }

    #[test]
    fn test_distance_outside_block() {
        let (graph, config) = two_trip_graph();
        assert_eq!(graph.location_from_distance(config, 3800.5).unwrap(), None);
        assert_eq!(graph.location_from_distance(config, -1.0).unwrap(), None);
        assert_eq!(graph.location_from_distance(config, f64::NAN).unwrap(), None);
    }

    #[test]
    fn test_time_and_distance_agree() {
        let (graph, config) = two_trip_graph();
        for time in [1000, 1100, 1130, 1250, 1530, 1750, 1900] {
            let by_time = at_time(&graph, config, time);
            let by_distance = at_distance(&graph, config, by_time.distance_along_block);
            assert!(by_distance.scheduled_time.abs_diff(time) <= 1, "time {time}");
        }
    }

    #[test]
    fn test_schedule_deviation() {
        let (graph, config) = two_trip_graph();
        let location = at_time(&graph, config, 1130);
        assert_eq!(location.schedule_deviation(1190), 60);
        assert_eq!(location.schedule_deviation(1100), -30);

        let next = location.next_stop_time(graph.configuration(config).unwrap()).unwrap();
        assert_eq!(next.stop_id.as_str(), "b");
    }

    #[test]
    fn test_single_stop_clamps() {
        let mut builder = BlockGraphBuilder::new();
        let trip = builder
            .add_trip(TripEntry::new("t1".into(), vec![stop("a", 500, 600, 120.0)]))
            .unwrap();
        let block = builder.add_block("b1".into()).unwrap();
        let config = builder
            .add_configuration(block, ServiceIdActivation::default(), vec![trip], vec![])
            .unwrap();
        let graph = builder.build();

        assert_eq!(at_time(&graph, config, 100).distance_along_block, 120.0);
        assert_eq!(at_distance(&graph, config, 60.0).scheduled_time, 500);
        assert_eq!(graph.location_from_scheduled_time(config, 601).unwrap(), None);
    }

    #[test]
    fn test_errors() {
        let mut builder = BlockGraphBuilder::new();
        let trip = builder.add_trip(TripEntry::new("t1".into(), vec![])).unwrap();
        let block = builder.add_block("b1".into()).unwrap();
        let config = builder
            .add_configuration(block, ServiceIdActivation::default(), vec![trip], vec![])
            .unwrap();
        let graph = builder.build();

        assert!(matches!(
            graph.location_from_scheduled_time(config, 0),
            Err(BlockError::EmptyBlockConfiguration(id)) if id == config
        ));
        assert!(matches!(
            graph.location_from_distance(config, 0.0),
            Err(BlockError::EmptyBlockConfiguration(_))
        ));

        let missing = BlockConfigurationId::from_index(7);
        assert!(matches!(
            graph.location_from_scheduled_time(missing, 0),
            Err(BlockError::ConfigurationNotFound(id)) if id == missing
        ));
    }

    #[test]
    fn test_hint_from_other_configuration_is_ignored() {
        let (graph, config) = two_trip_graph();
        let mut previous = at_time(&graph, config, 1500);
        previous.configuration = BlockConfigurationId::from_index(3);

        let config_entry = graph.configuration(config).unwrap();
        let location = location_from_scheduled_time_after(config_entry, &previous, 1100).unwrap();
        assert_eq!(location, graph.location_from_scheduled_time(config, 1100).unwrap());
    }

    proptest! {
        #[test]
        fn incremental_time_matches_full(first in 800u32..2000, second in 800u32..2000) {
            let (graph, config) = two_trip_graph();
            if let Some(previous) = graph.location_from_scheduled_time(config, first).unwrap() {
                let incremental =
                    graph.location_from_scheduled_time_after(&previous, second).unwrap();
                let full = graph.location_from_scheduled_time(config, second).unwrap();
                prop_assert_eq!(incremental, full);
            }
        }

        #[test]
        fn incremental_distance_matches_full(
            first in 0.0f64..4000.0,
            second in -10.0f64..4000.0,
        ) {
            let (graph, config) = two_trip_graph();
            if let Some(previous) = graph.location_from_distance(config, first).unwrap() {
                let incremental = graph.location_from_distance_after(&previous, second).unwrap();
                let full = graph.location_from_distance(config, second).unwrap();
                prop_assert_eq!(incremental, full);
            }
        }

        #[test]
        fn polling_forward_matches_full(
            mut times in proptest::collection::vec(900u32..1950, 1..20)
        ) {
            let (graph, config) = two_trip_graph();
            times.sort_unstable();

            let mut previous: Option<ScheduledBlockLocation> = None;
            for time in times {
                let full = graph.location_from_scheduled_time(config, time).unwrap();
                let resolved = match &previous {
                    Some(previous) => {
                        graph.location_from_scheduled_time_after(previous, time).unwrap()
                    }
                    None => full.clone(),
                };
                prop_assert_eq!(&resolved, &full);
                if resolved.is_some() {
                    previous = resolved;
                }
            }
        }

        #[test]
        fn resolving_is_idempotent(time in 0u32..2500) {
            let (graph, config) = two_trip_graph();
            prop_assert_eq!(
                graph.location_from_scheduled_time(config, time).unwrap(),
                graph.location_from_scheduled_time(config, time).unwrap()
            );
        }
    }
}
