use std::collections::BTreeMap;

use regions::RegionRecord;

use crate::symbology::region_color;

/// Side of the map the legend docks to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LegendPosition {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

impl LegendPosition {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// One legend row.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub id: String,
    pub name: String,
    pub color: String,
    pub value: f64,
}

/// Legend rows for the visible regions, in dataset order.
///
/// Colors come from the resolved color map; a region missing from the map
/// falls back to its identity color.
pub fn build_legend(
    visible: &[&RegionRecord],
    colors: &BTreeMap<String, String>,
) -> Vec<LegendItem> {
    visible
        .iter()
        .enumerate()
        .map(|(index, record)| LegendItem {
            id: record.id.clone(),
            name: record.display_name(index),
            color: colors
                .get(&record.id)
                .cloned()
                .unwrap_or_else(|| region_color(record)),
            value: record.metric_value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{LegendPosition, build_legend};
    use crate::symbology::deterministic_color;
    use regions::RegionRecord;
    use serde_json::Map;
    use std::collections::BTreeMap;

    fn record(id: &str, name: Option<&str>, value: f64) -> RegionRecord {
        RegionRecord {
            id: id.to_string(),
            geojson: serde_json::Value::Null,
            region_name: name.map(str::to_string),
            message_html: None,
            level: 1,
            parent_id: None,
            metric_value: value,
            color: None,
            extras: Map::new(),
        }
    }

    #[test]
    fn items_follow_dataset_order_with_resolved_colors() {
        let a = record("a", Some("Alpha"), 10.0);
        let b = record("b", None, 20.0);
        let mut colors = BTreeMap::new();
        colors.insert("a".to_string(), "#112233BB".to_string());

        let items = build_legend(&[&a, &b], &colors);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Alpha");
        assert_eq!(items[0].color, "#112233BB");
        assert_eq!(items[1].name, "Region 2");
        assert_eq!(items[1].color, deterministic_color("region_b"));
        assert_eq!(items[1].value, 20.0);
    }

    #[test]
    fn position_parses() {
        assert_eq!(LegendPosition::parse("left"), Some(LegendPosition::Left));
        assert_eq!(LegendPosition::parse("center"), None);
    }
}
