//! Greedy first-fit partitioning of items into time-monotonic chains.
//!
//! Items are pre-sorted with a loose comparator, then each one joins the
//! first open chain whose last member is strictly compatible with it, or
//! opens a new chain. The result is not guaranteed to be a minimum chain
//! cover, but every chain is monotonic by construction and the output only
//! depends on the input order.

use std::cmp::Ordering;

use crate::models::graph::{BlockStopTime, BlockTripRef};
use crate::models::types::FrequencyEntry;

/// How items of one chain kind are ordered and chained
pub trait ChainOrdering<T> {
    /// Pre-sort order; only affects how well first-fit packs chains
    fn loose_cmp(&self, a: &T, b: &T) -> Ordering;

    /// Whether `next` may directly follow `prev` in a chain
    fn is_compatible(&self, prev: &T, next: &T) -> bool;
}

/// Partition `items` into chains where every adjacent pair is compatible.
///
/// The loose sort is stable, so ties keep their input order and the
/// output is deterministic.
pub fn partition_into_chains<T, O>(mut items: Vec<T>, ordering: &O) -> Vec<Vec<T>>
where
    O: ChainOrdering<T> + ?Sized,
{
    items.sort_by(|a, b| ordering.loose_cmp(a, b));

    let mut chains: Vec<Vec<T>> = Vec::new();
    for item in items {
        let open = chains.iter_mut().find(|chain| {
            chain
                .last()
                .map_or(true, |last| ordering.is_compatible(last, &item))
        });
        match open {
            Some(chain) => chain.push(item),
            None => chains.push(vec![item]),
        }
    }
    chains
}

// ============================================================================
// Chain members
// ============================================================================

/// A scheduled trip with its stop times
#[derive(Clone, Copy, Debug)]
pub struct TripItem<'a> {
    pub trip: BlockTripRef,
    pub stop_times: &'a [BlockStopTime],
}

/// The layover preceding a trip
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoverItem {
    pub trip: BlockTripRef,
    pub start: u32,
    pub end: u32,
}

/// One frequency window of a frequency-based trip
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrequencyItem {
    pub trip: BlockTripRef,
    pub frequency: FrequencyEntry,
}

// ============================================================================
// Orderings
// ============================================================================

/// Trips sharing a stop pattern.
///
/// Loose: first-stop departure. Strict: at every stop position the earlier
/// trip arrives and departs no later than the next one, so trips that
/// overtake each other never share a chain.
#[derive(Clone, Copy, Debug, Default)]
pub struct TripOrdering;

impl ChainOrdering<TripItem<'_>> for TripOrdering {
    fn loose_cmp(&self, a: &TripItem<'_>, b: &TripItem<'_>) -> Ordering {
        let first_departure = |item: &TripItem<'_>| item.stop_times.first().map(|st| st.departure);
        first_departure(a).cmp(&first_departure(b))
    }

    fn is_compatible(&self, prev: &TripItem<'_>, next: &TripItem<'_>) -> bool {
        prev.stop_times.len() == next.stop_times.len()
            && prev
                .stop_times
                .iter()
                .zip(next.stop_times)
                .all(|(p, n)| p.arrival <= n.arrival && p.departure <= n.departure)
    }
}

/// Layovers at the same first stop
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoverOrdering;

impl ChainOrdering<LayoverItem> for LayoverOrdering {
    fn loose_cmp(&self, a: &LayoverItem, b: &LayoverItem) -> Ordering {
        (a.start, a.end).cmp(&(b.start, b.end))
    }

    fn is_compatible(&self, prev: &LayoverItem, next: &LayoverItem) -> bool {
        prev.start <= next.start && prev.end <= next.end
    }
}

/// Frequency windows; windows in one chain never overlap
#[derive(Clone, Copy, Debug, Default)]
pub struct FrequencyOrdering;

impl ChainOrdering<FrequencyItem> for FrequencyOrdering {
    fn loose_cmp(&self, a: &FrequencyItem, b: &FrequencyItem) -> Ordering {
        (a.frequency.start_time, a.frequency.end_time)
            .cmp(&(b.frequency.start_time, b.frequency.end_time))
    }

    fn is_compatible(&self, prev: &FrequencyItem, next: &FrequencyItem) -> bool {
        prev.frequency.end_time <= next.frequency.start_time
    }
}
