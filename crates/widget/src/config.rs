//! Widget configuration parsed from the host's form-data object.
//!
//! The form surface is tolerant: missing fields take documented defaults,
//! color values may arrive as strings or `{r, g, b}` objects, and the metric
//! is named by whatever shape the host's metric picker produced.

use foundation::LatLon;
use layers::{HeatmapPalette, LabelPosition, LegendPosition, safe_color};
use regions::ColumnMapping;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetConfig {
    pub show_info: bool,
    pub show_heatmap: bool,
    pub show_labels: bool,
    pub show_legend: bool,
    pub heatmap_palette: HeatmapPalette,
    pub legend_position: LegendPosition,
    pub label_position: LabelPosition,
    pub initial_center: LatLon,
    pub initial_zoom: u8,
    /// Pin the rendered zoom to `initial_zoom` instead of the computed one.
    pub use_initial_zoom: bool,
    /// Explicit info-card scale; `None` scales with zoom.
    pub info_scale: Option<f64>,
    pub compact: bool,
    pub metric_name: Option<String>,
    pub columns: ColumnMapping,
    pub emit_cross_filters: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            show_info: true,
            show_heatmap: false,
            show_labels: false,
            show_legend: false,
            heatmap_palette: HeatmapPalette::default(),
            legend_position: LegendPosition::Top,
            label_position: LabelPosition::Top,
            initial_center: LatLon::new(55.75, 37.61),
            initial_zoom: 4,
            use_initial_zoom: false,
            info_scale: None,
            compact: false,
            metric_name: None,
            columns: ColumnMapping::default(),
            emit_cross_filters: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FormData {
    show_info: Option<bool>,
    show_heatmap: Option<bool>,
    show_labels: Option<bool>,
    show_legend: Option<bool>,
    heatmap_color: Option<Value>,
    heatmap_opacity: Option<f64>,
    legend_position: Option<String>,
    label_position: Option<String>,
    initial_center_lat: Option<f64>,
    initial_center_lon: Option<f64>,
    initial_zoom: Option<f64>,
    use_initial_zoom: Option<bool>,
    info_scale: Option<f64>,
    compact: Option<bool>,
    metrics: Option<Value>,
    emit_cross_filters: Option<bool>,
    id_column: Option<String>,
    geojson_column: Option<String>,
    region_name_column: Option<String>,
    message_html_column: Option<Value>,
    level_column: Option<String>,
    parent_id_column: Option<String>,
    color_column: Option<String>,
}

impl WidgetConfig {
    /// Builds a config from the host's form-data object. A form that does
    /// not deserialize at all yields the full default config.
    pub fn from_form_data(form: &Value) -> Self {
        let raw: FormData = serde_json::from_value(form.clone()).unwrap_or_default();
        let defaults = Self::default();

        let metric_name = raw.metrics.as_ref().and_then(metric_name);
        let default_columns = ColumnMapping::default();
        let columns = ColumnMapping {
            id: raw.id_column.unwrap_or(default_columns.id),
            geojson: raw.geojson_column.unwrap_or(default_columns.geojson),
            region_name: raw
                .region_name_column
                .unwrap_or(default_columns.region_name),
            message_html: raw
                .message_html_column
                .as_ref()
                .and_then(column_label)
                .unwrap_or(default_columns.message_html),
            level: raw.level_column.unwrap_or(default_columns.level),
            parent_id: raw.parent_id_column.unwrap_or(default_columns.parent_id),
            metric: metric_name.clone().unwrap_or(default_columns.metric),
            color: raw.color_column.filter(|c| !c.is_empty()),
        };

        Self {
            show_info: raw.show_info.unwrap_or(defaults.show_info),
            show_heatmap: raw.show_heatmap.unwrap_or(defaults.show_heatmap),
            show_labels: raw.show_labels.unwrap_or(defaults.show_labels),
            show_legend: raw.show_legend.unwrap_or(defaults.show_legend),
            heatmap_palette: HeatmapPalette {
                base_color: raw
                    .heatmap_color
                    .as_ref()
                    .map(color_string)
                    .unwrap_or_else(|| defaults.heatmap_palette.base_color.clone()),
                opacity: raw
                    .heatmap_opacity
                    .unwrap_or(defaults.heatmap_palette.opacity),
            },
            legend_position: raw
                .legend_position
                .as_deref()
                .and_then(LegendPosition::parse)
                .unwrap_or(defaults.legend_position),
            label_position: raw
                .label_position
                .as_deref()
                .and_then(LabelPosition::parse)
                .unwrap_or(defaults.label_position),
            initial_center: LatLon::new(
                raw.initial_center_lat
                    .unwrap_or(defaults.initial_center.lat_deg),
                raw.initial_center_lon
                    .unwrap_or(defaults.initial_center.lon_deg),
            ),
            initial_zoom: raw
                .initial_zoom
                .map(|z| z.clamp(0.0, 255.0) as u8)
                .unwrap_or(defaults.initial_zoom),
            use_initial_zoom: raw.use_initial_zoom.unwrap_or(defaults.use_initial_zoom),
            info_scale: raw.info_scale,
            compact: raw.compact.unwrap_or(defaults.compact),
            metric_name,
            columns,
            emit_cross_filters: raw
                .emit_cross_filters
                .unwrap_or(defaults.emit_cross_filters),
        }
    }
}

/// The active metric's column name, from whatever shape the metric picker
/// produced (plain string, labeled object, adhoc column, list of any of
/// those).
fn metric_name(metrics: &Value) -> Option<String> {
    let first = match metrics {
        Value::Array(items) => items.first()?,
        other => other,
    };
    if let Some(label) = first.get("label").and_then(Value::as_str)
        && !label.is_empty()
    {
        return Some(label.to_string());
    }
    extract_column_name(first)
}

fn extract_column_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items.first().and_then(extract_column_name),
        Value::Object(obj) => {
            for key in ["column_name", "label", "name", "value"] {
                if let Some(s) = obj.get(key).and_then(Value::as_str)
                    && !s.is_empty()
                {
                    return Some(s.to_string());
                }
            }
            let column = obj.get("column")?;
            for key in ["column_name", "verbose_name"] {
                if let Some(s) = column.get(key).and_then(Value::as_str)
                    && !s.is_empty()
                {
                    return Some(s.to_string());
                }
            }
            None
        }
        _ => None,
    }
}

/// Column pickers deliver either a bare name or a labeled object.
fn column_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(obj) => obj
            .get("label")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

/// Color pickers deliver a hex string or an `{r, g, b}` object; anything
/// else is replaced by the safe default.
fn color_string(value: &Value) -> String {
    match value {
        Value::String(s) => safe_color(s),
        Value::Object(obj) => {
            let channel = |key: &str| {
                obj.get(key)
                    .and_then(Value::as_f64)
                    .map(|v| v.round().clamp(0.0, 255.0) as u8)
            };
            match (channel("r"), channel("g"), channel("b")) {
                (Some(r), Some(g), Some(b)) => format!("#{r:02x}{g:02x}{b:02x}"),
                _ => safe_color(""),
            }
        }
        _ => safe_color(""),
    }
}

#[cfg(test)]
mod tests {
    use super::WidgetConfig;
    use layers::{DEFAULT_COLOR, LabelPosition, LegendPosition};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn empty_form_yields_defaults() {
        let config = WidgetConfig::from_form_data(&json!({}));
        assert_eq!(config, WidgetConfig::default());
        assert!(config.show_info);
        assert_eq!(config.initial_zoom, 4);
        assert_eq!(config.heatmap_palette.base_color, DEFAULT_COLOR);
    }

    #[test]
    fn full_form_round_trips() {
        let config = WidgetConfig::from_form_data(&json!({
            "show_info": false,
            "show_heatmap": true,
            "show_labels": true,
            "show_legend": true,
            "heatmap_color": "#123456",
            "heatmap_opacity": 0.5,
            "legend_position": "right",
            "label_position": "bottom",
            "initial_center_lat": 48.1,
            "initial_center_lon": 11.5,
            "initial_zoom": 7,
            "use_initial_zoom": true,
            "info_scale": 0.8,
            "compact": true,
            "metrics": [{"label": "SUM(sales_volume)"}],
            "emit_cross_filters": true,
            "id_column": "code",
            "geojson_column": "shape",
            "region_name_column": "title",
            "message_html_column": {"label": "tooltip_html"},
            "level_column": "depth",
            "parent_id_column": "parent_code",
            "color_column": "brand_color",
        }));

        assert!(!config.show_info);
        assert!(config.show_heatmap);
        assert_eq!(config.heatmap_palette.base_color, "#123456");
        assert_eq!(config.heatmap_palette.opacity, 0.5);
        assert_eq!(config.legend_position, LegendPosition::Right);
        assert_eq!(config.label_position, LabelPosition::Bottom);
        assert_eq!(config.initial_center.lat_deg, 48.1);
        assert_eq!(config.initial_zoom, 7);
        assert!(config.use_initial_zoom);
        assert_eq!(config.info_scale, Some(0.8));
        assert_eq!(config.metric_name.as_deref(), Some("SUM(sales_volume)"));
        assert_eq!(config.columns.metric, "SUM(sales_volume)");
        assert_eq!(config.columns.message_html, "tooltip_html");
        assert_eq!(config.columns.color.as_deref(), Some("brand_color"));
        assert!(config.emit_cross_filters);
    }

    #[test]
    fn rgb_object_colors_coerce_to_hex() {
        let config = WidgetConfig::from_form_data(&json!({
            "heatmap_color": {"r": 255.0, "g": 109.0, "b": 0.0},
        }));
        assert_eq!(config.heatmap_palette.base_color, "#ff6d00");
    }

    #[test]
    fn invalid_colors_fall_back_to_the_default() {
        let config = WidgetConfig::from_form_data(&json!({"heatmap_color": "chartreuse"}));
        assert_eq!(config.heatmap_palette.base_color, DEFAULT_COLOR);

        let config = WidgetConfig::from_form_data(&json!({"heatmap_color": {"r": 1.0}}));
        assert_eq!(config.heatmap_palette.base_color, DEFAULT_COLOR);
    }

    #[test]
    fn metric_name_accepts_picker_shapes() {
        for metrics in [
            json!({"metrics": "sales"}),
            json!({"metrics": ["sales"]}),
            json!({"metrics": [{"label": "sales"}]}),
            json!({"metrics": [{"column": {"column_name": "sales"}}]}),
        ] {
            let config = WidgetConfig::from_form_data(&metrics);
            assert_eq!(config.metric_name.as_deref(), Some("sales"), "{metrics}");
        }
    }

    #[test]
    fn empty_color_column_is_treated_as_unset() {
        let config = WidgetConfig::from_form_data(&json!({"color_column": ""}));
        assert_eq!(config.columns.color, None);
    }
}
