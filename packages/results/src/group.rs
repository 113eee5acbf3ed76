//! Address-keyed grouping of inspections for map display.
//!
//! The grouping key is the literal address string. Two rows whose
//! addresses differ only in formatting land in separate groups even when
//! their coordinates are identical; the map relies on that cardinality to
//! decide how to frame its camera (see [`CameraTarget`]).

use std::collections::BTreeMap;

use atx_health_inspection_models::{Coordinate, InspectionRecord, ProximityGroup};
use serde::Serialize;

/// Camera distance in meters used when framing a single group.
pub const CENTER_DISTANCE_METERS: f64 = 1000.0;

/// Proximity groups in the order their addresses were first seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProximityGroups {
    groups: Vec<ProximityGroup>,
    /// address -> position in `groups`
    #[serde(skip)]
    index: BTreeMap<String, usize>,
}

impl ProximityGroups {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `record` to the group for its address, creating the group if
    /// needed.
    ///
    /// Returns `false` (and adds nothing) if the record has no coordinate.
    pub fn insert(&mut self, record: &InspectionRecord) -> bool {
        let Some(coordinate) = record.coordinate else {
            return false;
        };

        let position = match self.index.get(&record.address) {
            Some(&position) => position,
            None => {
                self.groups
                    .push(ProximityGroup::new(record.address.clone(), coordinate));
                let position = self.groups.len() - 1;
                self.index.insert(record.address.clone(), position);
                position
            }
        };
        self.groups[position].data.push(record.summary());
        true
    }

    /// Looks up the group for an exact address string.
    #[must_use]
    pub fn get(&self, address: &str) -> Option<&ProximityGroup> {
        self.index.get(address).map(|&i| &self.groups[i])
    }

    /// Number of distinct addresses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns `true` if there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The first group inserted.
    #[must_use]
    pub fn first(&self) -> Option<&ProximityGroup> {
        self.groups.first()
    }

    /// Iterates groups in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, ProximityGroup> {
        self.groups.iter()
    }

    /// Addresses in insertion order.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.address.as_str())
    }

    /// Total number of summaries across all groups.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.groups.iter().map(|g| g.data.len()).sum()
    }

    /// Removes every group.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.index.clear();
    }

    /// Consumes the collection, returning the groups in insertion order.
    #[must_use]
    pub fn into_vec(self) -> Vec<ProximityGroup> {
        self.groups
    }
}

impl<'a> IntoIterator for &'a ProximityGroups {
    type Item = &'a ProximityGroup;
    type IntoIter = std::slice::Iter<'a, ProximityGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

/// Groups records by their literal address string.
///
/// Records without a coordinate are left out. Within a group, summaries
/// keep the order of `records`; each group's coordinate is that of its
/// first record.
#[must_use]
pub fn group_by_address(records: &[InspectionRecord]) -> ProximityGroups {
    let mut groups = ProximityGroups::new();
    let skipped = records.iter().filter(|r| !groups.insert(r)).count();

    log::debug!(
        "Grouped {} records into {} addresses ({skipped} without coordinates)",
        records.len() - skipped,
        groups.len()
    );
    groups
}

/// Wraps one record as a single-group result, e.g. to show a name search
/// hit on the map.
///
/// Returns `None` if the record has no coordinate.
#[must_use]
pub fn single_group(record: &InspectionRecord) -> Option<ProximityGroups> {
    let mut groups = ProximityGroups::new();
    groups.insert(record).then_some(groups)
}

/// How a map should frame a set of groups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", content = "coordinate", rename_all = "camelCase")]
pub enum CameraTarget {
    /// Center tightly on the only group, [`CENTER_DISTANCE_METERS`] away.
    Center(Coordinate),
    /// Zoom out to show every group.
    Overview,
}

impl CameraTarget {
    /// Picks the camera framing for `groups`: `None` for no groups,
    /// [`Self::Center`] for exactly one, [`Self::Overview`] for more.
    #[must_use]
    pub fn for_groups(groups: &ProximityGroups) -> Option<Self> {
        match groups.len() {
            0 => None,
            1 => groups.first().map(|g| Self::Center(g.coordinate)),
            _ => Some(Self::Overview),
        }
    }
}
