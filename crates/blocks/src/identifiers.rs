//! Type-safe identifiers for transit entities.
//!
//! String identifiers use Arc<str> for cheap cloning and minimal memory overhead.
//! Arena handles are plain integer indices into a [`BlockGraph`](crate::models::graph::BlockGraph).

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

macro_rules! impl_identifier {
    ($name:ident) => {
        #[derive(Clone, Debug)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(s: impl AsRef<str>) -> Self {
                Self(s.as_ref().into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
            }
        }

        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.cmp(&other.0)
            }
        }

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.hash(state);
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                String::deserialize(deserializer).map(Self::from)
            }
        }
    };
}

impl_identifier!(StopIdentifier);
impl_identifier!(TripIdentifier);
impl_identifier!(BlockIdentifier);
impl_identifier!(ServiceIdentifier);

macro_rules! impl_handle {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(u32);

        impl $name {
            /// Handle for `index`, `None` once the arena outgrows `u32`
            pub(crate) fn try_from_index(index: usize) -> Option<Self> {
                u32::try_from(index).ok().map(Self)
            }

            /// Handle for an index the builder has already bounded
            pub(crate) fn from_index(index: usize) -> Self {
                debug_assert!(u32::try_from(index).is_ok(), "handle index {index} overflows u32");
                Self(index as u32)
            }

            /// Position of the entity in its arena
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

impl_handle!(TripId);
impl_handle!(BlockId);
impl_handle!(BlockConfigurationId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_equality() {
        let id1 = StopIdentifier::new("stop_123");
        let id2 = StopIdentifier::new("stop_123");
        let id3 = id1.clone();

        assert_eq!(id1, id2);
        assert_eq!(id1, id3);
        assert!(Arc::ptr_eq(&id1.0, &id3.0)); // Clone shares Arc
    }

    #[test]
    fn test_identifier_hash() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(StopIdentifier::new("test"), 42);

        assert_eq!(map.get(&StopIdentifier::new("test")), Some(&42));
    }

    #[test]
    fn test_identifier_ordering() {
        let mut ids = vec![
            ServiceIdentifier::new("weekend"),
            ServiceIdentifier::new("holiday"),
            ServiceIdentifier::new("weekday"),
        ];
        ids.sort();

        let names: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(names, ["holiday", "weekday", "weekend"]);
    }

    #[test]
    fn test_handle_display() {
        let handle = BlockConfigurationId::from_index(7);
        assert_eq!(handle.index(), 7);
        assert_eq!(format!("{}", handle), "BlockConfigurationId#7");
    }

    #[test]
    fn test_handle_range() {
        assert_eq!(TripId::try_from_index(3).map(TripId::index), Some(3));
        assert!(TripId::try_from_index(u32::MAX as usize).is_some());
        assert!(TripId::try_from_index(u32::MAX as usize + 1).is_none());
    }

    #[test]
    fn test_identifier_conversions() {
        let _id1: TripIdentifier = "trip_1".into();
        let _id2: BlockIdentifier = String::from("block_2").into();
    }
}
