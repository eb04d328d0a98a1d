//! # transit-blocks
//!
//! Schedule indexing and position resolution for vehicle blocks.
//!
//! ## Features
//!
//! - **Arena graph**: trips, blocks and block configurations addressed by handle
//! - **Chain indices**: time-monotonic chains of trips, layovers and frequency
//!   windows with binary-searchable interval blocks
//! - **Scheduled locations**: where a vehicle should be at a given time or distance
//! - **Parallel builds**: key groups processed with rayon (optional)
//!
//! ## Example
//!
//! ```
//! use transit_blocks::prelude::*;
//!
//! let mut builder = BlockGraphBuilder::new();
//! let trip = builder
//!     .add_trip(TripEntry::new(
//!         TripIdentifier::new("trip_1"),
//!         vec![
//!             StopTime::new(StopIdentifier::new("a"), 28_800, 28_800, 0.0),
//!             StopTime::new(StopIdentifier::new("b"), 29_400, 29_460, 4_000.0),
//!         ],
//!     ))
//!     .unwrap();
//! let block = builder.add_block(BlockIdentifier::new("block_1")).unwrap();
//! let config = builder
//!     .add_configuration(block, ServiceIdActivation::default(), vec![trip], vec![])
//!     .unwrap();
//! let graph = builder.build();
//!
//! // Index the graph
//! let (indices, report) = BlockIndicesFactory::default().build(&graph);
//! assert!(report.is_clean());
//! assert_eq!(indices.active_trips(29_000, 29_100).count(), 1);
//!
//! // Halfway between the two stops
//! let location = graph
//!     .location_from_scheduled_time(config, 29_100)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(location.distance_along_block, 2_000.0);
//! ```

pub mod grouping;
pub mod identifiers;
pub mod indices;
pub mod interpolation;
pub mod intervals;
pub mod location;
pub mod models;
pub mod search;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::indices::{
        BlockBundle, BlockIndices, BlockIndicesFactory, BuildDefect, BuildReport,
        IndexBuildOptions, SharedBlockIndices,
    };
    pub use crate::interpolation::{interpolate, interpolate_pair, OutOfRange};
    pub use crate::location::{ScheduledBlockLocation, ScheduledBlockLocationService};
    pub use crate::models::graph::*;
    pub use crate::models::service_ids::ServiceIdActivation;
    pub use crate::models::types::*;
}

pub use prelude::*;
