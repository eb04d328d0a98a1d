//! Sequence keys deciding which trips may share a chain.

use std::collections::HashMap;
use std::hash::Hash;

use crate::identifiers::StopIdentifier;
use crate::models::graph::BlockStopTime;
use crate::models::service_ids::ServiceIdActivation;

/// Trips with the same activation visiting the same stops in the same order
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TripSequenceKey {
    pub service_ids: ServiceIdActivation,
    pub stops: Vec<StopIdentifier>,
}

impl TripSequenceKey {
    pub fn new(service_ids: ServiceIdActivation, stop_times: &[BlockStopTime]) -> Self {
        Self {
            service_ids,
            stops: stop_times.iter().map(|st| st.stop_id.clone()).collect(),
        }
    }
}

/// Layovers with the same activation ending at the same stop
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LayoverSequenceKey {
    pub service_ids: ServiceIdActivation,
    pub first_stop: StopIdentifier,
}

/// Items grouped by key, remembering the order keys were first seen in
pub(crate) struct KeyedGroups<K, V> {
    positions: HashMap<K, usize>,
    groups: Vec<(K, Vec<V>)>,
}

impl<K: Clone + Eq + Hash, V> KeyedGroups<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            positions: HashMap::new(),
            groups: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, key: K, value: V) {
        match self.positions.get(&key) {
            Some(&position) => self.groups[position].1.push(value),
            None => {
                self.positions.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![value]));
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.groups.len()
    }

    pub(crate) fn item_count(&self) -> usize {
        self.groups.iter().map(|(_, values)| values.len()).sum()
    }

    pub(crate) fn into_groups(self) -> Vec<(K, Vec<V>)> {
        self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::ServiceIdentifier;

    #[test]
    fn test_groups_keep_first_seen_order() {
        let mut groups = KeyedGroups::new();
        groups.push("b", 1);
        groups.push("a", 2);
        groups.push("b", 3);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups.item_count(), 3);
        assert_eq!(groups.into_groups(), vec![("b", vec![1, 3]), ("a", vec![2])]);
    }

    #[test]
    fn test_trip_keys_depend_on_activation_and_pattern() {
        let stop = |name: &str| BlockStopTime {
            stop_id: StopIdentifier::new(name),
            arrival: 0,
            departure: 0,
            distance_along_block: 0.0,
            trip_sequence: 0,
            block_sequence: 0,
        };
        let weekday = ServiceIdActivation::active([ServiceIdentifier::new("weekday")]);
        let weekend = ServiceIdActivation::active([ServiceIdentifier::new("weekend")]);

        let ab = [stop("a"), stop("b")];
        let ba = [stop("b"), stop("a")];

        assert_eq!(
            TripSequenceKey::new(weekday.clone(), &ab),
            TripSequenceKey::new(weekday.clone(), &ab)
        );
        assert_ne!(
            TripSequenceKey::new(weekday.clone(), &ab),
            TripSequenceKey::new(weekday.clone(), &ba)
        );
        assert_ne!(
            TripSequenceKey::new(weekday, &ab),
            TripSequenceKey::new(weekend, &ab)
        );
    }
}
