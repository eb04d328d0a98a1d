//! Service id activation: the calendar combination a block configuration runs under.

use std::fmt;

use crate::identifiers::ServiceIdentifier;

/// The set of service ids that must be active (and inactive) for a block
/// configuration to apply on a given service day.
///
/// Only used as a grouping key by the index builder, so it is never
/// evaluated against a calendar here. Both sets are kept sorted and
/// deduplicated so equal activations compare and hash equal regardless of
/// insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceIdActivation {
    active: Vec<ServiceIdentifier>,
    inactive: Vec<ServiceIdentifier>,
}

impl ServiceIdActivation {
    pub fn new(
        active: impl IntoIterator<Item = ServiceIdentifier>,
        inactive: impl IntoIterator<Item = ServiceIdentifier>,
    ) -> Self {
        Self {
            active: normalized(active),
            inactive: normalized(inactive),
        }
    }

    /// Activation with only active service ids
    pub fn active(ids: impl IntoIterator<Item = ServiceIdentifier>) -> Self {
        Self::new(ids, std::iter::empty())
    }

    pub fn active_service_ids(&self) -> &[ServiceIdentifier] {
        &self.active
    }

    pub fn inactive_service_ids(&self) -> &[ServiceIdentifier] {
        &self.inactive
    }
}

fn normalized(ids: impl IntoIterator<Item = ServiceIdentifier>) -> Vec<ServiceIdentifier> {
    let mut ids: Vec<_> = ids.into_iter().collect();
    ids.sort();
    ids.dedup();
    ids
}

impl fmt::Display for ServiceIdActivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |ids: &[ServiceIdentifier]| {
            ids.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(",")
        };
        write!(f, "active=[{}] inactive=[{}]", join(&self.active), join(&self.inactive))
    }
}
