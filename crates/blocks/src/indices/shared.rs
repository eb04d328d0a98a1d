//! Swap-on-completion publication of built indices.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::indices::factory::{BlockIndicesFactory, BuildReport};
use crate::indices::index::BlockIndices;
use crate::models::graph::BlockGraph;

/// A graph with the indices built from it
///
/// Index entries hold handles into `graph`, so the two are only ever
/// published together.
#[derive(Debug, Default)]
pub struct BlockBundle {
    pub graph: BlockGraph,
    pub indices: BlockIndices,
    pub report: BuildReport,
}

impl BlockBundle {
    pub fn build(graph: BlockGraph, factory: &BlockIndicesFactory) -> Self {
        let (indices, report) = factory.build(&graph);
        Self {
            graph,
            indices,
            report,
        }
    }
}

/// Current bundle shared between readers and a rebuilding writer
#[derive(Debug, Default)]
pub struct SharedBlockIndices {
    current: RwLock<Arc<BlockBundle>>,
}

impl SharedBlockIndices {
    pub fn new(bundle: BlockBundle) -> Self {
        Self {
            current: RwLock::new(Arc::new(bundle)),
        }
    }

    /// Snapshot of the latest published bundle
    pub fn current(&self) -> Arc<BlockBundle> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the bundle, returning the previous one
    pub fn publish(&self, bundle: BlockBundle) -> Arc<BlockBundle> {
        let bundle = Arc::new(bundle);
        info!(
            trip_indices = bundle.report.trip_indices,
            defects = bundle.report.defects.len(),
            "publishing block bundle"
        );
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, bundle)
    }
}
