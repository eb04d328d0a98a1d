//! Schedule data models, the block graph, and error types.

pub mod graph;
pub mod service_ids;
pub mod types;

// Re-exports for convenience
pub use graph::{
    BlockConfiguration, BlockEntry, BlockGraph, BlockGraphBuilder, BlockStopTime, BlockTrip,
    BlockTripRef, TripEntry,
};
pub use service_ids::ServiceIdActivation;
pub use types::{BlockError, FrequencyEntry, Result, StopTime};
