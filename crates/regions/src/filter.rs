//! Cross-filter intents toward the host dashboard.
//!
//! Selecting a region from the detail view emits an equality filter on the
//! region-name field; selecting the already-active value clears it. Single
//! value toggle semantics, not multi-select.

use serde::Serialize;

/// The field every cross-filter targets.
pub const FILTER_COLUMN: &str = "region_name";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum FilterOp {
    #[serde(rename = "IN")]
    In,
}

/// One filter clause submitted to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterIntent {
    #[serde(rename = "col")]
    pub column: String,
    pub op: FilterOp,
    #[serde(rename = "val")]
    pub values: Vec<String>,
}

/// Display state mirroring the current selection, submitted alongside the
/// filter clauses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterDisplayState {
    pub value: Option<Vec<String>>,
    pub selected_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrossFilterUpdate {
    /// Empty when the toggle cleared the selection.
    pub filters: Vec<FilterIntent>,
    pub display: FilterDisplayState,
    /// True when the toggled value was the active selection (i.e. this update
    /// clears it).
    pub was_selected: bool,
}

/// Toggles `region_name` against the current selection.
pub fn toggle_region_filter(region_name: &str, selected: &[String]) -> CrossFilterUpdate {
    let was_selected = selected.iter().any(|s| s == region_name);
    let values: Vec<String> = if was_selected {
        Vec::new()
    } else {
        vec![region_name.to_string()]
    };

    let filters = if values.is_empty() {
        Vec::new()
    } else {
        vec![FilterIntent {
            column: FILTER_COLUMN.to_string(),
            op: FilterOp::In,
            values: values.clone(),
        }]
    };

    let display = if values.is_empty() {
        FilterDisplayState {
            value: None,
            selected_values: None,
        }
    } else {
        FilterDisplayState {
            value: Some(values.clone()),
            selected_values: Some(vec![region_name.to_string()]),
        }
    };

    CrossFilterUpdate {
        filters,
        display,
        was_selected,
    }
}
