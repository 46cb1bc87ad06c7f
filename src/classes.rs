// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Class filtering for detector outputs.
//!
//! A [`ClassFilter`] maps detector class IDs to labels. Only anchors whose best
//! class is a key of the filter survive decoding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// COCO class IDs and labels for road vehicles.
pub const COCO_VEHICLES: [(usize, &str); 4] =
    [(2, "car"), (3, "motorcycle"), (5, "bus"), (7, "truck")];

/// Read-only mapping from detector class ID to a human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassFilter {
    names: BTreeMap<usize, String>,
}

impl ClassFilter {
    /// Build a filter from `(class_id, label)` pairs.
    pub fn new<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, S)>,
        S: Into<String>,
    {
        Self {
            names: pairs
                .into_iter()
                .map(|(id, label)| (id, label.into()))
                .collect(),
        }
    }

    /// The COCO vehicle classes: car, motorcycle, bus and truck.
    #[must_use]
    pub fn vehicles() -> Self {
        Self::new(COCO_VEHICLES)
    }

    /// Label for `class_id`, if the class is retained.
    #[must_use]
    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.names.get(&class_id).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, class_id: usize) -> bool {
        self.names.contains_key(&class_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Highest retained class ID.
    #[must_use]
    pub fn max_class_id(&self) -> Option<usize> {
        self.names.keys().next_back().copied()
    }

    /// Iterate `(class_id, label)` pairs in ascending class order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.names.iter().map(|(&id, label)| (id, label.as_str()))
    }
}

impl Default for ClassFilter {
    fn default() -> Self {
        Self::vehicles()
    }
}
