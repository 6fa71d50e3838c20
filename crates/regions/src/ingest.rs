//! Input-row normalization.
//!
//! The host delivers rows with dataset-specific column names. A declared
//! [`ColumnMapping`] turns each row into a strictly-typed [`RegionRecord`];
//! columns outside the mapping are kept untyped in the record's side map
//! instead of being merged into the typed fields.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::record::RegionRecord;

/// Input column name → canonical field mapping, declared by the host.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnMapping {
    pub id: String,
    pub geojson: String,
    pub region_name: String,
    pub message_html: String,
    pub level: String,
    pub parent_id: String,
    pub metric: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            id: "id".into(),
            geojson: "geojson".into(),
            region_name: "region_name".into(),
            message_html: "message_html".into(),
            level: "level".into(),
            parent_id: "parent_id".into(),
            metric: "value".into(),
            color: None,
        }
    }
}

/// Outcome of one ingest run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IngestResult {
    pub records: Vec<RegionRecord>,
    /// Number of rows dropped for missing id/geojson/level.
    pub skipped: usize,
}

/// Converts raw rows into typed records, skipping unusable rows with a
/// warning rather than failing the batch.
pub fn ingest_rows(rows: &[Map<String, Value>], mapping: &ColumnMapping) -> IngestResult {
    let mut out = IngestResult::default();
    for (index, row) in rows.iter().enumerate() {
        match ingest_row(row, mapping) {
            Some(record) => out.records.push(record),
            None => {
                warn!(index, "dropping row without usable id/geojson/level");
                out.skipped += 1;
            }
        }
    }
    out
}

fn ingest_row(row: &Map<String, Value>, mapping: &ColumnMapping) -> Option<RegionRecord> {
    let id = string_value(row.get(mapping.id.as_str())?)?;
    let geojson = row.get(mapping.geojson.as_str())?.clone();
    if geojson.is_null() {
        return None;
    }
    let level = integer_value(row.get(mapping.level.as_str())?)?;

    let region_name = row.get(mapping.region_name.as_str()).and_then(string_value);
    let message_html = row
        .get(mapping.message_html.as_str())
        .and_then(string_value);
    let parent_id = row.get(mapping.parent_id.as_str()).and_then(string_value);
    let metric_value = row
        .get(mapping.metric.as_str())
        .map(numeric_value)
        .unwrap_or(0.0);
    let color = mapping
        .color
        .as_deref()
        .and_then(|col| row.get(col))
        .and_then(string_value);

    let mapped: Vec<&str> = mapping_columns(mapping);
    let mut extras = Map::new();
    for (key, value) in row {
        if !mapped.contains(&key.as_str()) {
            extras.insert(key.clone(), value.clone());
        }
    }

    Some(RegionRecord {
        id,
        geojson,
        region_name,
        message_html,
        level,
        parent_id,
        metric_value,
        color,
        extras,
    })
}

fn mapping_columns(mapping: &ColumnMapping) -> Vec<&str> {
    let mut cols = vec![
        mapping.id.as_str(),
        mapping.geojson.as_str(),
        mapping.region_name.as_str(),
        mapping.message_html.as_str(),
        mapping.level.as_str(),
        mapping.parent_id.as_str(),
        mapping.metric.as_str(),
    ];
    if let Some(color) = &mapping.color {
        cols.push(color.as_str());
    }
    cols
}

fn string_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Numeric coercion with the host's `Number(x) || 0` semantics: anything that
/// does not parse to a finite number counts as zero.
fn numeric_value(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
