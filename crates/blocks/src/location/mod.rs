//! Scheduled vehicle positions along block configurations.

pub mod resolver;
pub mod scheduled;

pub use resolver::{
    location_from_distance, location_from_distance_after, location_from_scheduled_time,
    location_from_scheduled_time_after, ScheduledBlockLocationService,
};
pub use scheduled::ScheduledBlockLocation;
