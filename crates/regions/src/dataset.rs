use std::collections::BTreeSet;

use crate::record::RegionRecord;

/// The full set of region records currently supplied by the host.
///
/// Within one level every id is unique; a non-null `parent_id` at level L is
/// expected to reference a record at level L-1. The dataset itself does not
/// enforce either; navigation self-heals around inconsistencies instead.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RegionDataset {
    records: Vec<RegionRecord>,
}

impl RegionDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<RegionRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[RegionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn levels(&self) -> BTreeSet<i64> {
        self.records.iter().map(|r| r.level).collect()
    }

    pub fn has_level(&self, level: i64) -> bool {
        self.records.iter().any(|r| r.level == level)
    }

    /// Smallest level present, or `None` for an empty dataset.
    pub fn min_level(&self) -> Option<i64> {
        self.records.iter().map(|r| r.level).min()
    }

    pub fn find(&self, id: &str) -> Option<&RegionRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn children_of(&self, parent_id: &str) -> Vec<&RegionRecord> {
        self.records
            .iter()
            .filter(|r| r.parent_id.as_deref() == Some(parent_id))
            .collect()
    }

    pub fn has_children(&self, id: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.parent_id.as_deref() == Some(id))
    }

    pub fn parent_of(&self, child_id: &str) -> Option<&RegionRecord> {
        let child = self.find(child_id)?;
        let parent_id = child.parent_id.as_deref()?;
        self.find(parent_id)
    }

    pub fn at_level(&self, level: i64) -> Vec<&RegionRecord> {
        self.records.iter().filter(|r| r.level == level).collect()
    }
}
