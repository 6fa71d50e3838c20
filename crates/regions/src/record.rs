use serde_json::{Map, Value};

/// One input data row describing a drawable region with a hierarchy position.
///
/// `geojson` keeps the raw payload (object or string form); parsing happens
/// per render pass. Columns not covered by the declared mapping are preserved
/// untyped in `extras`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRecord {
    pub id: String,
    pub geojson: Value,
    pub region_name: Option<String>,
    pub message_html: Option<String>,
    pub level: i64,
    pub parent_id: Option<String>,
    pub metric_value: f64,
    pub color: Option<String>,
    pub extras: Map<String, Value>,
}

impl RegionRecord {
    /// Display label; absent names are synthesized from the position within
    /// the visible set.
    pub fn display_name(&self, index: usize) -> String {
        match &self.region_name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Region {}", index + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RegionRecord;
    use serde_json::Map;

    fn record(name: Option<&str>) -> RegionRecord {
        RegionRecord {
            id: "r1".into(),
            geojson: serde_json::Value::Null,
            region_name: name.map(str::to_string),
            message_html: None,
            level: 1,
            parent_id: None,
            metric_value: 0.0,
            color: None,
            extras: Map::new(),
        }
    }

    #[test]
    fn display_name_prefers_region_name() {
        assert_eq!(record(Some("Bavaria")).display_name(4), "Bavaria");
    }

    #[test]
    fn display_name_synthesizes_when_absent_or_empty() {
        assert_eq!(record(None).display_name(0), "Region 1");
        assert_eq!(record(Some("")).display_name(2), "Region 3");
    }
}
