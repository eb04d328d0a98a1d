use crate::identifiers::BlockConfigurationId;
use crate::models::graph::{BlockConfiguration, BlockStopTime, BlockTripRef};

/// Where a vehicle is scheduled to be along a block configuration.
///
/// Stops are positions in [`BlockConfiguration::stop_times`]. Time offsets
/// are seconds from `scheduled_time` to the stop's scheduled time, negative
/// when the stop is already behind the vehicle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduledBlockLocation {
    pub configuration: BlockConfigurationId,
    /// Last stop departed, `None` before the first stop
    pub previous_stop: Option<usize>,
    /// Stop the vehicle is at or heading to
    pub next_stop: usize,
    pub next_stop_time_offset: i64,
    pub closest_stop: usize,
    pub closest_stop_time_offset: i64,
    pub active_trip: BlockTripRef,
    /// Progress from the previous stop to the next one, in `[0, 1]`
    pub ratio: f64,
    pub distance_along_block: f64,
    pub scheduled_time: u32,
    /// False before the block's first stop
    pub in_service: bool,
    /// Lower-bound position the location was found at, reused as a search hint
    pub stop_time_index: usize,
}

impl ScheduledBlockLocation {
    /// Seconds the vehicle is behind schedule when observed here at `observed_time`
    pub fn schedule_deviation(&self, observed_time: u32) -> i64 {
        i64::from(observed_time) - i64::from(self.scheduled_time)
    }

    pub fn next_stop_time<'a>(&self, config: &'a BlockConfiguration) -> Option<&'a BlockStopTime> {
        config.stop_times().get(self.next_stop)
    }

    pub fn previous_stop_time<'a>(
        &self,
        config: &'a BlockConfiguration,
    ) -> Option<&'a BlockStopTime> {
        self.previous_stop
            .and_then(|index| config.stop_times().get(index))
    }

    pub fn closest_stop_time<'a>(
        &self,
        config: &'a BlockConfiguration,
    ) -> Option<&'a BlockStopTime> {
        config.stop_times().get(self.closest_stop)
    }
}
