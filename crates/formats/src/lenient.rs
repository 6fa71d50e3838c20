//! Lenient parser for string-encoded region payloads.
//!
//! Upstream exports deliver the region payload either as a structured object
//! or as a Python-repr-like string (single quotes, `True`/`False`/`None`).
//! The string form is not valid JSON, so the id is located by pattern match
//! and the geometry object by brace matching before token rewriting hands the
//! span to a structured parser. Every failure is reported as `None`; callers
//! skip the record and keep rendering.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Id and raw geometry object extracted from one region payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionPayload {
    pub id: String,
    pub geometry: Value,
}

static ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"'id'\s*:\s*'([^']+)'|"id"\s*:\s*"([^"]+)""#).expect("id pattern")
});

static GEOMETRY_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"'geometry'|"geometry""#).expect("geometry key pattern"));

/// Extracts `{id, geometry}` from a payload value.
///
/// Accepts a structured object carrying `id` and `geometry` fields, or a
/// loosely Python-quoted string. Anything else, and any extraction failure,
/// yields `None`.
pub fn parse_region_payload(payload: &Value) -> Option<RegionPayload> {
    match payload {
        Value::Object(obj) => {
            let id = match obj.get("id") {
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => return None,
            };
            let geometry = obj.get("geometry")?;
            if geometry.is_null() {
                return None;
            }
            Some(RegionPayload {
                id,
                geometry: geometry.clone(),
            })
        }
        Value::String(s) => parse_payload_str(s),
        _ => None,
    }
}

fn parse_payload_str(payload: &str) -> Option<RegionPayload> {
    let caps = ID_PATTERN.captures(payload)?;
    let id = caps
        .get(1)
        .or_else(|| caps.get(2))?
        .as_str()
        .to_string();

    let key = GEOMETRY_KEY.find(payload)?;
    let rel_start = payload[key.start()..].find('{')?;
    let start = key.start() + rel_start;
    let span = balanced_brace_span(payload, start)?;

    let geometry: Value = serde_json::from_str(&rewrite_python_tokens(span)).ok()?;
    Some(RegionPayload { id, geometry })
}

/// Returns the `{...}` span starting at `start` whose braces balance.
///
/// Matching is naive: braces inside string literals count too, exactly like
/// the exports this parser has to accept.
fn balanced_brace_span(payload: &str, start: usize) -> Option<&str> {
    let bytes = payload.as_bytes();
    let mut depth = 0usize;
    for (offset, &b) in bytes[start..].iter().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&payload[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn rewrite_python_tokens(span: &str) -> String {
    span.replace('\'', "\"")
        .replace("True", "true")
        .replace("False", "false")
        .replace("None", "null")
}
