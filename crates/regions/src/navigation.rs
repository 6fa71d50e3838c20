//! Drill-down/roll-up navigation over the region hierarchy.
//!
//! The state must always reference a level/parent pair that exists in the
//! active dataset. When the dataset changes underneath it (a host filter
//! removed the drilled-into subtree, a level vanished), the state repairs
//! itself to a known-good level instead of producing an empty or erroring
//! view.

use tracing::warn;

use crate::dataset::RegionDataset;
use crate::record::RegionRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub current_level: i64,
    pub current_parent_id: Option<String>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            current_level: 1,
            current_parent_id: None,
        }
    }
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initial(&self) -> bool {
        self.current_level == 1 && self.current_parent_id.is_none()
    }

    /// Drills into a region's children.
    ///
    /// Returns `false` (state unchanged) when the region has no children in
    /// the dataset.
    pub fn to_children(&mut self, region: &RegionRecord, data: &RegionDataset) -> bool {
        if !data.has_children(&region.id) {
            return false;
        }
        self.current_level = region.level + 1;
        self.current_parent_id = Some(region.id.clone());
        true
    }

    /// Rolls up one level; no-op at level 1.
    ///
    /// A missing parent record means the hierarchy is inconsistent; the state
    /// falls back to the root rather than walking a broken chain.
    pub fn to_parent(&mut self, data: &RegionDataset) -> bool {
        if self.current_level == 1 {
            return false;
        }
        match self
            .current_parent_id
            .as_deref()
            .and_then(|id| data.find(id))
        {
            Some(parent) => {
                self.current_level -= 1;
                self.current_parent_id = parent.parent_id.clone();
            }
            None => {
                warn!(
                    parent = self.current_parent_id.as_deref().unwrap_or("<none>"),
                    "parent record missing while rolling up; resetting to root"
                );
                *self = Self::default();
            }
        }
        true
    }

    /// Resets to the smallest level present in the dataset, unscoped.
    pub fn to_min_level(&mut self, data: &RegionDataset) {
        self.current_level = data.min_level().unwrap_or(1);
        self.current_parent_id = None;
    }

    /// Whether a "return to start" affordance makes sense (the state is more
    /// than one level below the dataset's top).
    pub fn can_return_to_min(&self, data: &RegionDataset) -> bool {
        match data.min_level() {
            Some(min) => self.current_level > min + 1,
            None => false,
        }
    }

    /// Re-validates the state after a dataset change.
    ///
    /// Returns `true` when the state had to be repaired.
    pub fn revalidate(&mut self, data: &RegionDataset) -> bool {
        if data.is_empty() {
            return false;
        }
        let level_exists = data.has_level(self.current_level);
        let parent_exists = match self.current_parent_id.as_deref() {
            Some(id) => data.find(id).is_some(),
            None => true,
        };
        if level_exists && parent_exists {
            return false;
        }
        warn!(
            level = self.current_level,
            parent = self.current_parent_id.as_deref().unwrap_or("<none>"),
            "navigation state no longer matches dataset; resetting"
        );
        if data.has_level(1) {
            *self = Self::default();
        } else {
            self.current_level = data.min_level().unwrap_or(1);
            self.current_parent_id = None;
        }
        true
    }

    /// The records drawn at this state.
    ///
    /// Falls back to the dataset's minimum level when the state cannot be
    /// satisfied: the initial state against a dataset that does not start at
    /// level 1, a level that vanished, or a stale parent id.
    pub fn visible<'a>(&self, data: &'a RegionDataset) -> Vec<&'a RegionRecord> {
        let Some(min_level) = data.min_level() else {
            return Vec::new();
        };

        if self.is_initial() && !data.has_level(1) {
            return data.at_level(min_level);
        }
        if !data.has_level(self.current_level) {
            warn!(
                level = self.current_level,
                "active level absent from dataset; showing minimum level"
            );
            return data.at_level(min_level);
        }
        if let Some(parent_id) = self.current_parent_id.as_deref()
            && data.find(parent_id).is_none()
        {
            warn!(parent = parent_id, "stale parent id; showing minimum level");
            return data.at_level(min_level);
        }

        data.records()
            .iter()
            .filter(|r| {
                r.level == self.current_level
                    && match self.current_parent_id.as_deref() {
                        None => true,
                        Some(parent_id) => r.parent_id.as_deref() == Some(parent_id),
                    }
            })
            .collect()
    }
}
