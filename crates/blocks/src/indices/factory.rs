//! Offline construction of block indices from a [`BlockGraph`].
//!
//! Runs once per bundle build. Blocks with configuration defects are
//! reported and skipped without affecting the rest of the build.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, info, warn};

use crate::grouping::{
    partition_into_chains, FrequencyItem, FrequencyOrdering, LayoverItem, LayoverOrdering,
    TripItem, TripOrdering,
};
use crate::identifiers::{BlockConfigurationId, BlockIdentifier, TripIdentifier};
use crate::indices::index::{
    BlockIndexKind, BlockIndices, BlockLayoverIndex, BlockTripIndex, FrequencyBlockTripIndex,
};
use crate::indices::keys::{KeyedGroups, LayoverSequenceKey, TripSequenceKey};
use crate::models::graph::{BlockConfiguration, BlockGraph, BlockTripRef};

/// Knobs for [`BlockIndicesFactory`]
#[derive(Clone, Debug)]
pub struct IndexBuildOptions {
    /// Log grouping progress at info level
    pub verbose: bool,
    /// Groups between progress lines when verbose
    pub progress_interval: usize,
}

impl Default for IndexBuildOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            progress_interval: 100,
        }
    }
}

/// A data problem that excluded a block from index construction
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BuildDefect {
    NoActiveConfigurations { block: BlockIdentifier },
    TripWithoutStopTimes { block: BlockIdentifier, trip: TripIdentifier },
    MixedFrequencyConfiguration {
        block: BlockIdentifier,
        configuration: BlockConfigurationId,
    },
}

impl fmt::Display for BuildDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActiveConfigurations { block } => {
                write!(f, "block has no active configurations: {}", block)
            }
            Self::TripWithoutStopTimes { block, trip } => {
                write!(f, "block {} has trip with no stop times: {}", block, trip)
            }
            Self::MixedFrequencyConfiguration {
                block,
                configuration,
            } => write!(
                f,
                "block {} configuration {} disagrees with the block on frequencies",
                block, configuration
            ),
        }
    }
}

/// Indices of one family plus the defects met while building them
#[derive(Clone, Debug)]
pub struct BuildOutput<T> {
    pub indices: Vec<T>,
    pub defects: Vec<BuildDefect>,
}

/// Summary of a full build
#[derive(Clone, Debug, Default)]
pub struct BuildReport {
    /// Distinct defects, in the order they were found
    pub defects: Vec<BuildDefect>,
    pub trip_indices: usize,
    pub layover_indices: usize,
    pub frequency_indices: usize,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.defects.is_empty()
    }
}

/// Builds trip, layover and frequency-trip indices
#[derive(Clone, Debug, Default)]
pub struct BlockIndicesFactory {
    options: IndexBuildOptions,
}

impl BlockIndicesFactory {
    pub fn new(options: IndexBuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IndexBuildOptions {
        &self.options
    }

    /// Build all three index families
    pub fn build(&self, graph: &BlockGraph) -> (BlockIndices, BuildReport) {
        let trips = self.create_trip_indices(graph);
        let layovers = self.create_layover_indices(graph);
        let frequencies = self.create_frequency_trip_indices(graph);

        // The same block defect is met once per family
        let mut seen = HashSet::new();
        let defects = [trips.defects, layovers.defects, frequencies.defects]
            .into_iter()
            .flatten()
            .filter(|defect| seen.insert(defect.clone()))
            .collect();

        let report = BuildReport {
            defects,
            trip_indices: trips.indices.len(),
            layover_indices: layovers.indices.len(),
            frequency_indices: frequencies.indices.len(),
        };
        info!(
            trip_indices = report.trip_indices,
            layover_indices = report.layover_indices,
            frequency_indices = report.frequency_indices,
            defects = report.defects.len(),
            "built block indices"
        );

        let indices = BlockIndices::new(trips.indices, layovers.indices, frequencies.indices);
        (indices, report)
    }

    pub fn create_trip_indices(&self, graph: &BlockGraph) -> BuildOutput<BlockTripIndex> {
        let kind = BlockIndexKind::Trip;
        let mut defects = Vec::new();
        let configurations = eligible_configurations(graph, kind, &mut defects);

        let mut groups = KeyedGroups::new();
        for config in configurations {
            for trip in config.trips() {
                let stop_times = &config.stop_times()[trip.stop_time_range()];
                let key = TripSequenceKey::new(config.service_ids().clone(), stop_times);
                groups.push(
                    key,
                    TripItem {
                        trip: BlockTripRef::new(config.id(), trip.sequence),
                        stop_times,
                    },
                );
            }
        }

        let indices = self.chain_groups(kind, groups, |key, items| {
            partition_into_chains(items, &TripOrdering)
                .into_iter()
                .map(|chain| BlockTripIndex::from_chain(key.stops.clone(), chain))
                .collect()
        });
        BuildOutput { indices, defects }
    }

    pub fn create_layover_indices(&self, graph: &BlockGraph) -> BuildOutput<BlockLayoverIndex> {
        let kind = BlockIndexKind::Layover;
        let mut defects = Vec::new();
        let configurations = eligible_configurations(graph, kind, &mut defects);

        let mut groups = KeyedGroups::new();
        for config in configurations {
            for pair in config.trips().windows(2) {
                let (prev, trip) = (&pair[0], &pair[1]);
                let prev_stop_times = config.trip_stop_times(prev.sequence);
                let stop_times = config.trip_stop_times(trip.sequence);
                let (Some(last), Some(first)) = (prev_stop_times.last(), stop_times.first()) else {
                    continue;
                };

                let key = LayoverSequenceKey {
                    service_ids: config.service_ids().clone(),
                    first_stop: first.stop_id.clone(),
                };
                groups.push(
                    key,
                    LayoverItem {
                        trip: BlockTripRef::new(config.id(), trip.sequence),
                        start: last.departure,
                        end: first.departure,
                    },
                );
            }
        }

        let indices = self.chain_groups(kind, groups, |key, items| {
            partition_into_chains(items, &LayoverOrdering)
                .into_iter()
                .map(|chain| BlockLayoverIndex::from_chain(key.first_stop.clone(), chain))
                .collect()
        });
        BuildOutput { indices, defects }
    }

    pub fn create_frequency_trip_indices(
        &self,
        graph: &BlockGraph,
    ) -> BuildOutput<FrequencyBlockTripIndex> {
        let kind = BlockIndexKind::Frequency;
        let mut defects = Vec::new();
        let configurations = eligible_configurations(graph, kind, &mut defects);

        let mut groups = KeyedGroups::new();
        for config in configurations {
            for trip in config.trips() {
                let stop_times = &config.stop_times()[trip.stop_time_range()];
                let key = TripSequenceKey::new(config.service_ids().clone(), stop_times);
                for frequency in config.frequencies() {
                    groups.push(
                        key.clone(),
                        FrequencyItem {
                            trip: BlockTripRef::new(config.id(), trip.sequence),
                            frequency: *frequency,
                        },
                    );
                }
            }
        }

        let indices = self.chain_groups(kind, groups, |key, items| {
            partition_into_chains(items, &FrequencyOrdering)
                .into_iter()
                .map(|chain| FrequencyBlockTripIndex::from_chain(key.stops.clone(), chain))
                .collect()
        });
        BuildOutput { indices, defects }
    }

    /// Chain every group, keeping group order in the output
    fn chain_groups<K, V, I, F>(
        &self,
        kind: BlockIndexKind,
        groups: KeyedGroups<K, V>,
        chain: F,
    ) -> Vec<I>
    where
        K: Clone + Eq + std::hash::Hash + Send + Sync,
        V: Send,
        I: Send,
        F: Fn(&K, Vec<V>) -> Vec<I> + Sync,
    {
        let group_count = groups.len();
        if self.options.verbose {
            info!("{} groups found: {} out of items: {}", kind, group_count, groups.item_count());
        }

        #[cfg(feature = "parallel")]
        let indices: Vec<I> = {
            use rayon::prelude::*;
            use std::sync::atomic::{AtomicUsize, Ordering};

            let processed = AtomicUsize::new(0);
            let interval = self.options.progress_interval.max(1);
            groups
                .into_groups()
                .into_par_iter()
                .map(|(key, items)| {
                    let chained = chain(&key, items);
                    let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                    if self.options.verbose && done % interval == 0 {
                        info!("{} groups processed: {}/{}", kind, done, group_count);
                    }
                    chained
                })
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .collect()
        };

        #[cfg(not(feature = "parallel"))]
        let indices: Vec<I> = {
            let mut indices = Vec::new();
            for (count, (key, items)) in groups.into_groups().into_iter().enumerate() {
                if self.options.verbose && count % self.options.progress_interval.max(1) == 0 {
                    info!("{} groups processed: {}/{}", kind, count, group_count);
                }
                indices.extend(chain(&key, items));
            }
            indices
        };

        debug!("{} indices: {} from {} groups", kind, indices.len(), group_count);
        indices
    }
}

/// Configurations of blocks that belong in `kind`'s indices
fn eligible_configurations<'g>(
    graph: &'g BlockGraph,
    kind: BlockIndexKind,
    defects: &mut Vec<BuildDefect>,
) -> Vec<&'g BlockConfiguration> {
    let want_frequency_based = kind == BlockIndexKind::Frequency;
    let mut configurations = Vec::new();

    for (_, block) in graph.blocks() {
        if block.configurations().is_empty() {
            let defect = BuildDefect::NoActiveConfigurations {
                block: block.id.clone(),
            };
            warn!("{}", defect);
            defects.push(defect);
            continue;
        }

        if graph.is_frequency_based(block) != want_frequency_based {
            continue;
        }

        let mut block_configurations: Vec<&BlockConfiguration> = block
            .configurations()
            .iter()
            .filter_map(|id| graph.configuration(*id))
            .collect();

        // Only configurations matching the block's own kind are indexed
        block_configurations.retain(|config| {
            if config.frequencies().is_empty() != want_frequency_based {
                return true;
            }
            let defect = BuildDefect::MixedFrequencyConfiguration {
                block: block.id.clone(),
                configuration: config.id(),
            };
            warn!("{}", defect);
            defects.push(defect);
            false
        });

        let mut skip = false;
        for config in &block_configurations {
            for trip in config.trips() {
                if !trip.stop_time_range().is_empty() {
                    continue;
                }
                let trip_id = graph
                    .trip(trip.trip)
                    .map(|entry| entry.id.clone())
                    .unwrap_or_else(|| TripIdentifier::new(trip.trip.to_string()));
                let defect = BuildDefect::TripWithoutStopTimes {
                    block: block.id.clone(),
                    trip: trip_id,
                };
                if !defects.contains(&defect) {
                    warn!("{}", defect);
                    defects.push(defect);
                }
                skip = true;
            }
        }

        if !skip {
            configurations.extend(block_configurations);
        }
    }

    configurations
}
