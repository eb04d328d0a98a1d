//! Chain indices over the block graph: keys, the built index families,
//! the offline factory, and publication to readers.

pub mod factory;
pub mod index;
pub mod keys;
pub mod shared;

pub use factory::{BlockIndicesFactory, BuildDefect, BuildOutput, BuildReport, IndexBuildOptions};
pub use index::{
    BlockIndexKind, BlockIndices, BlockLayoverIndex, BlockTripIndex, FrequencyBlockTripIndex,
    ScheduledDeparture,
};
pub use keys::{LayoverSequenceKey, TripSequenceKey};
pub use shared::{BlockBundle, SharedBlockIndices};
