//! Placement offsets for region labels and info cards.

/// Side of the anchor point a region label hangs from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LabelPosition {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

impl LabelPosition {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Fixed pixel offset of the info card from its anchor.
pub const INFO_OFFSET_PX: [f64; 2] = [-110.0, -110.0];

/// Pixel offset of a region label.
///
/// The base 40px offset grows along the placement axis with the label text,
/// capped at 15px, so long names clear the region outline.
pub fn label_offset(position: LabelPosition, name: &str) -> [f64; 2] {
    let adjust = ((name.encode_utf16().count() as f64) * 0.7).min(15.0);
    match position {
        LabelPosition::Top => [0.0, -40.0 - adjust],
        LabelPosition::Bottom => [0.0, 40.0 + adjust],
        LabelPosition::Left => [-40.0 - adjust, 0.0],
        LabelPosition::Right => [40.0 + adjust, 0.0],
    }
}

/// Scale factor for info cards at the given zoom.
///
/// An explicit override wins. Otherwise the factor ramps linearly from 0.2
/// at zoom 5 to 1.0 at zoom 13 so cards shrink out of the way on zoomed-out
/// views.
pub fn info_scale(zoom: f64, override_scale: Option<f64>) -> f64 {
    if let Some(scale) = override_scale {
        return scale;
    }
    const MIN_ZOOM: f64 = 5.0;
    const MAX_ZOOM: f64 = 13.0;
    if zoom <= MIN_ZOOM {
        0.2
    } else if zoom >= MAX_ZOOM {
        1.0
    } else {
        let progress = (zoom - MIN_ZOOM) / (MAX_ZOOM - MIN_ZOOM);
        0.2 + 0.8 * progress
    }
}
