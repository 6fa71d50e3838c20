//! Region fill/stroke color resolution.
//!
//! Colors come from three places, in priority order: an explicit color
//! column, the metric-driven heatmap shade, or a deterministic hash of the
//! region name. Every externally supplied color string is gated through
//! [`safe_color`] before use, so downstream consumers never see a malformed
//! color.

use std::collections::BTreeMap;

use compute::{MetricRange, normalize_value};
use once_cell::sync::Lazy;
use regex::Regex;
use regions::RegionRecord;

/// Substituted for any invalid external color; also the default heatmap base.
pub const DEFAULT_COLOR: &str = "#FF6D00";

/// Alpha byte appended to identity-mode region fills.
const REGION_ALPHA: &str = "BB";

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3}|[A-Fa-f0-9]{8})$").expect("hex color pattern")
});

/// Heatmap palette supplied by the host configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapPalette {
    pub base_color: String,
    pub opacity: f64,
}

impl Default for HeatmapPalette {
    fn default() -> Self {
        Self {
            base_color: DEFAULT_COLOR.to_string(),
            opacity: 0.8,
        }
    }
}

pub fn is_valid_color(color: &str) -> bool {
    HEX_COLOR.is_match(color)
}

/// Returns `color` unchanged when valid, the documented default otherwise.
pub fn safe_color(color: &str) -> String {
    if is_valid_color(color) {
        color.to_string()
    } else {
        DEFAULT_COLOR.to_string()
    }
}

/// Stable color derived from a seed string.
///
/// The additive 32-bit hash runs over UTF-16 code units and folds into the
/// RGB channels; the same seed always yields the same color, which keeps
/// region colors stable across re-renders without persisted state.
pub fn deterministic_color(seed: &str) -> String {
    let mut hash: i32 = 0;
    for unit in seed.encode_utf16() {
        hash = (unit as i32).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash));
    }
    let r = (hash & 0xFF0000) >> 16;
    let g = (hash & 0x00FF00) >> 8;
    let b = hash & 0x0000FF;
    format!("#{r:02x}{g:02x}{b:02x}{REGION_ALPHA}")
}

/// Identity-mode fill color for a region.
///
/// A valid explicit color wins; 6-digit forms get the standard alpha
/// appended, 3- and 8-digit forms pass through. Everything else falls back
/// to the deterministic hash of the region name (or `region_<id>`).
pub fn region_color(record: &RegionRecord) -> String {
    if let Some(color) = &record.color
        && is_valid_color(color)
    {
        return if color.len() == 7 {
            format!("{color}{REGION_ALPHA}")
        } else {
            color.clone()
        };
    }
    let seed = match &record.region_name {
        Some(name) if !name.is_empty() => name.clone(),
        _ => format!("region_{}", record.id),
    };
    deterministic_color(&seed)
}

/// Metric-driven fill color.
///
/// Keeps the base color's hue and saturation, replaces lightness with
/// `0.9 - normalized * 0.8` (higher metric -> darker shade) and appends an
/// alpha byte from the opacity clamped to [0.8, 1.0].
pub fn heatmap_color(normalized: f64, base_color: &str, opacity: f64) -> String {
    let safe_opacity = opacity.clamp(0.8, 1.0);
    let base = safe_color(base_color);
    let (r, g, b) = rgb_from_hex(&base).unwrap_or((255, 109, 0));

    let (h, s, _) = rgb_to_hsl(r, g, b);
    let lightness = 0.9 - normalized * 0.8;
    let (nr, ng, nb) = hsl_to_rgb(h, s, lightness);

    let alpha = (safe_opacity * 255.0).round() as u8;
    format!("#{nr:02x}{ng:02x}{nb:02x}{alpha:02x}")
}

/// Scales each RGB channel down by `factor`, floored at 0.
pub fn darken_color(color: &str, factor: f64) -> String {
    let base = safe_color(color);
    let (r, g, b) = rgb_from_hex(&base).unwrap_or((255, 109, 0));
    let dark = |c: u8| ((c as f64) * (1.0 - factor)).floor().max(0.0) as u8;
    format!("#{:02x}{:02x}{:02x}", dark(r), dark(g), dark(b))
}

/// Resolved color per visible region id.
pub fn resolve_colors(
    visible: &[&RegionRecord],
    heatmap: bool,
    palette: &HeatmapPalette,
    range: MetricRange,
) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for record in visible {
        let color = if heatmap {
            let normalized = normalize_value(record.metric_value, range.min, range.max);
            heatmap_color(normalized, &palette.base_color, palette.opacity)
        } else {
            region_color(record)
        };
        out.insert(record.id.clone(), color);
    }
    out
}

fn rgb_from_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    // 3-digit shorthand expands before channel math.
    let expanded: String = if hex.len() == 3 {
        hex.chars().flat_map(|c| [c, c]).collect()
    } else {
        hex.to_string()
    };
    if expanded.len() < 6 || !expanded.is_char_boundary(6) {
        return None;
    }
    let r = u8::from_str_radix(&expanded[0..2], 16).ok()?;
    let g = u8::from_str_radix(&expanded[2..4], 16).ok()?;
    let b = u8::from_str_radix(&expanded[4..6], 16).ok()?;
    Some((r, g, b))
}

pub(crate) fn lightness_of(color: &str) -> Option<f64> {
    let (r, g, b) = rgb_from_hex(color)?;
    Some(rgb_to_hsl(r, g, b).2)
}

fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h / 6.0, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let to_byte = |x: f64| (x * 255.0).round().clamp(0.0, 255.0) as u8;

    if s == 0.0 {
        let v = to_byte(l);
        return (v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    (
        to_byte(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        to_byte(hue_to_rgb(p, q, h)),
        to_byte(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let mut t = t;
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 1.0 / 2.0 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}
