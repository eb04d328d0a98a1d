//! Core data types and errors for schedule data.

use crate::identifiers::*;

// ============================================================================
// Data Structures
// ============================================================================

/// A single scheduled stop of a trip (arrival/departure at a stop)
///
/// Times are stored as seconds since midnight of the service day.
/// GTFS times can exceed 24 hours for trips past midnight
/// (e.g., 25:30:00 = 91800 seconds for 1:30am the next day).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopTime {
    pub stop_id: StopIdentifier,
    pub arrival: u32,   // Seconds since midnight (service day start)
    pub departure: u32, // Seconds since midnight (service day start)
    /// Meters travelled along the trip's own path when reaching the stop
    pub distance_along_trip: f64,
}

impl StopTime {
    pub fn new(
        stop_id: StopIdentifier,
        arrival: u32,
        departure: u32,
        distance_along_trip: f64,
    ) -> Self {
        Self {
            stop_id,
            arrival,
            departure,
            distance_along_trip,
        }
    }

    /// Seconds the vehicle dwells at the stop
    pub fn slack_time(&self) -> u32 {
        self.departure.saturating_sub(self.arrival)
    }
}

/// A headway-based service window, replacing fixed stop times
///
/// A vehicle leaves roughly every `headway_secs` between `start_time`
/// and `end_time`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrequencyEntry {
    pub start_time: u32,
    pub end_time: u32,
    pub headway_secs: u32,
    /// Whether departures happen exactly on the headway grid
    pub exact_times: bool,
}

impl FrequencyEntry {
    pub fn new(start_time: u32, end_time: u32, headway_secs: u32) -> Self {
        Self {
            start_time,
            end_time,
            headway_secs,
            exact_times: false,
        }
    }

    pub fn with_exact_times(self, exact_times: bool) -> Self {
        Self { exact_times, ..self }
    }

    /// Whether `time` falls within the service window
    pub fn contains(&self, time: u32) -> bool {
        self.start_time <= time && time <= self.end_time
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    #[error("Value {value} is outside the interpolation range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("Block configuration has no stop times: {0}")]
    EmptyBlockConfiguration(BlockConfigurationId),

    #[error("Block configuration not found: {0}")]
    ConfigurationNotFound(BlockConfigurationId),

    #[error("Trip not found: {0}")]
    TripNotFound(TripId),

    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, BlockError>;
