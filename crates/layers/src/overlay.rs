//! Render-scoped overlay ownership.
//!
//! Each data or level change builds a fresh [`RenderPass`]: one owned
//! collection of overlays and markers keyed by region id, rebuilt wholesale.
//! The previous pass must be torn down through the adapter before the next
//! one is applied, so no overlay handle survives across renders.

use std::collections::BTreeMap;

use foundation::LatLon;
use formats::{compute_centroid, normalize_geometry, parse_region_payload};
use formats::geometry::NormalizedGeometry;
use regions::RegionRecord;

use crate::format::number_format;
use crate::labels::{INFO_OFFSET_PX, LabelPosition, label_offset};
use crate::symbology::{HeatmapPalette, darken_color};

/// Fill/stroke attributes handed to the map provider.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_width: f64,
    pub fill_opacity: f64,
    pub stroke_opacity: f64,
}

pub const IDENTITY_STROKE_COLOR: &str = "#4159ba";
const HOVER_STROKE_COLOR: &str = "#506fdd";

/// Inputs shared by every overlay style derivation in one pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleParams {
    pub heatmap: bool,
    pub palette: HeatmapPalette,
    /// Thinner strokes and no hover emphasis growth on small/touch layouts.
    pub compact: bool,
}

/// Resting style for a region fill.
pub fn base_style(fill_color: &str, params: &StyleParams) -> OverlayStyle {
    if params.heatmap {
        OverlayStyle {
            fill_color: fill_color.to_string(),
            stroke_color: darken_color(&params.palette.base_color, 0.3),
            stroke_width: 1.0,
            fill_opacity: params.palette.opacity,
            stroke_opacity: 0.9,
        }
    } else {
        OverlayStyle {
            fill_color: fill_color.to_string(),
            stroke_color: IDENTITY_STROKE_COLOR.to_string(),
            stroke_width: if params.compact { 1.2 } else { 2.0 },
            fill_opacity: 0.72,
            stroke_opacity: 0.9,
        }
    }
}

/// Emphasized style applied while a region is hovered or touched.
pub fn hover_style(style: &OverlayStyle, params: &StyleParams) -> OverlayStyle {
    OverlayStyle {
        fill_color: style.fill_color.clone(),
        stroke_color: if params.heatmap {
            darken_color(&style.stroke_color, 0.1)
        } else {
            HOVER_STROKE_COLOR.to_string()
        },
        stroke_width: style.stroke_width * if params.compact { 1.0 } else { 1.25 },
        fill_opacity: (style.fill_opacity + 0.15).min(1.0),
        stroke_opacity: 1.0,
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MarkerKind {
    /// Info card carrying the tooltip body.
    Info,
    /// Plain region-name label.
    Label,
}

/// A point marker anchored at a region's centroid.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub id: String,
    pub kind: MarkerKind,
    pub position: LatLon,
    pub text: String,
    pub offset_px: [f64; 2],
}

/// One drawable region overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionOverlay {
    pub id: String,
    pub name: String,
    pub geometry: NormalizedGeometry,
    pub centroid: LatLon,
    pub style: OverlayStyle,
    /// Untrusted tooltip body, passed through for the host to sanitize.
    pub info_html: String,
    pub metric_value: f64,
    pub metric_text: String,
}

/// The overlay set owned by one render.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderPass {
    overlays: BTreeMap<String, RegionOverlay>,
    markers: BTreeMap<String, MarkerSpec>,
}

impl RenderPass {
    /// Builds the pass for the visible records.
    ///
    /// Returns the pass plus the ids of records whose payload or geometry
    /// could not be parsed (skipped, never fatal).
    pub fn build(
        visible: &[&RegionRecord],
        colors: &BTreeMap<String, String>,
        params: &StyleParams,
        label_position: LabelPosition,
    ) -> (RenderPass, Vec<String>) {
        let mut pass = RenderPass::default();
        let mut skipped = Vec::new();

        for (index, record) in visible.iter().enumerate() {
            let Some(payload) = parse_region_payload(&record.geojson) else {
                skipped.push(record.id.clone());
                continue;
            };
            let Some(geometry) = normalize_geometry(&payload.geometry) else {
                skipped.push(record.id.clone());
                continue;
            };

            let name = record.display_name(index);
            let centroid = compute_centroid(&geometry);
            let fill = colors
                .get(&record.id)
                .cloned()
                .unwrap_or_else(|| crate::symbology::region_color(record));
            let info_html = record.message_html.clone().unwrap_or_default();
            let metric_text = number_format(record.metric_value);

            pass.markers.insert(
                info_marker_id(&record.id),
                MarkerSpec {
                    id: info_marker_id(&record.id),
                    kind: MarkerKind::Info,
                    position: centroid,
                    text: info_html.clone(),
                    offset_px: INFO_OFFSET_PX,
                },
            );
            pass.markers.insert(
                label_marker_id(&record.id),
                MarkerSpec {
                    id: label_marker_id(&record.id),
                    kind: MarkerKind::Label,
                    position: centroid,
                    text: name.clone(),
                    offset_px: label_offset(label_position, &name),
                },
            );

            pass.overlays.insert(
                record.id.clone(),
                RegionOverlay {
                    id: record.id.clone(),
                    name,
                    geometry,
                    centroid,
                    style: base_style(&fill, params),
                    info_html,
                    metric_value: record.metric_value,
                    metric_text,
                },
            );
        }

        (pass, skipped)
    }

    pub fn overlays(&self) -> impl Iterator<Item = &RegionOverlay> {
        self.overlays.values()
    }

    pub fn overlay(&self, id: &str) -> Option<&RegionOverlay> {
        self.overlays.get(id)
    }

    pub fn overlay_ids(&self) -> impl Iterator<Item = &str> {
        self.overlays.keys().map(String::as_str)
    }

    pub fn markers(&self) -> impl Iterator<Item = &MarkerSpec> {
        self.markers.values()
    }

    pub fn markers_of_kind(&self, kind: MarkerKind) -> impl Iterator<Item = &MarkerSpec> {
        self.markers.values().filter(move |m| m.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

pub fn info_marker_id(region_id: &str) -> String {
    format!("info:{region_id}")
}

pub fn label_marker_id(region_id: &str) -> String {
    format!("label:{region_id}")
}

#[cfg(test)]
mod tests {
    use super::{MarkerKind, RenderPass, StyleParams, base_style, hover_style};
    use crate::labels::LabelPosition;
    use crate::symbology::HeatmapPalette;
    use regions::RegionRecord;
    use serde_json::{Map, json};
    use std::collections::BTreeMap;

    fn record(id: &str, name: &str) -> RegionRecord {
        RegionRecord {
            id: id.to_string(),
            geojson: json!({
                "id": id,
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[37.0, 55.0], [38.0, 55.0], [38.0, 56.0], [37.0, 56.0]]],
                },
            }),
            region_name: Some(name.to_string()),
            message_html: Some(format!("<b>{name}</b>")),
            level: 1,
            parent_id: None,
            metric_value: 1500.0,
            color: None,
            extras: Map::new(),
        }
    }

    fn broken(id: &str) -> RegionRecord {
        RegionRecord {
            geojson: json!("{'geometry': 'nope'}"),
            ..record(id, id)
        }
    }

    #[test]
    fn builds_overlays_and_markers_keyed_by_region_id() {
        let a = record("a", "Alpha");
        let b = record("b", "Beta");
        let (pass, skipped) = RenderPass::build(
            &[&a, &b],
            &BTreeMap::new(),
            &StyleParams::default(),
            LabelPosition::Top,
        );
        assert!(skipped.is_empty());
        assert_eq!(pass.len(), 2);

        let overlay = pass.overlay("a").expect("overlay a");
        assert_eq!(overlay.name, "Alpha");
        assert_eq!(overlay.metric_text, "1 500");
        assert_eq!(overlay.centroid.lat_deg, 55.5);

        assert_eq!(pass.markers_of_kind(MarkerKind::Info).count(), 2);
        assert_eq!(pass.markers_of_kind(MarkerKind::Label).count(), 2);
        let label = pass
            .markers_of_kind(MarkerKind::Label)
            .find(|m| m.id == "label:a")
            .expect("label marker");
        assert_eq!(label.text, "Alpha");
    }

    #[test]
    fn unparseable_records_are_reported_and_skipped() {
        let good = record("good", "Good");
        let bad = broken("bad");
        let (pass, skipped) = RenderPass::build(
            &[&good, &bad],
            &BTreeMap::new(),
            &StyleParams::default(),
            LabelPosition::Top,
        );
        assert_eq!(pass.len(), 1);
        assert_eq!(skipped, vec!["bad".to_string()]);
    }

    #[test]
    fn identity_style_constants() {
        let style = base_style("#112233BB", &StyleParams::default());
        assert_eq!(style.stroke_color, "#4159ba");
        assert_eq!(style.stroke_width, 2.0);
        assert_eq!(style.fill_opacity, 0.72);

        let compact = base_style(
            "#112233BB",
            &StyleParams {
                compact: true,
                ..StyleParams::default()
            },
        );
        assert_eq!(compact.stroke_width, 1.2);
    }

    #[test]
    fn heatmap_style_uses_the_palette() {
        let params = StyleParams {
            heatmap: true,
            palette: HeatmapPalette {
                base_color: "#FF6D00".into(),
                opacity: 0.85,
            },
            compact: false,
        };
        let style = base_style("#80330dd9", &params);
        assert_eq!(style.stroke_width, 1.0);
        assert_eq!(style.fill_opacity, 0.85);
        // darken(#FF6D00, 0.3)
        assert_eq!(style.stroke_color, "#b24c00");
    }

    #[test]
    fn hover_emphasizes_without_exceeding_full_opacity() {
        let params = StyleParams::default();
        let style = base_style("#112233BB", &params);
        let hovered = hover_style(&style, &params);
        assert_eq!(hovered.stroke_color, "#506fdd");
        assert_eq!(hovered.stroke_width, 2.5);
        assert!((hovered.fill_opacity - 0.87).abs() < 1e-12);
        assert_eq!(hovered.stroke_opacity, 1.0);

        let nearly_opaque = super::OverlayStyle {
            fill_opacity: 0.95,
            ..style
        };
        assert_eq!(hover_style(&nearly_opaque, &params).fill_opacity, 1.0);
    }
}
