//! Optimal zoom estimation from bounds and viewport size.
//!
//! Uses the standard web-map tile relation (360° across `viewport/256`
//! tiles at zoom 0) independently for each axis, takes the tighter
//! constraint, then damps large regions in steps so continent-scale
//! choropleths do not end up half off-screen.

use foundation::ViewportSize;

use crate::analysis::bounds::BoundsResult;

/// Zoom used when no bounds are available.
pub const DEFAULT_ZOOM: u8 = 6;
pub const MIN_ZOOM: u8 = 2;
pub const MAX_ZOOM: u8 = 15;

const TILE_SIZE_PX: f64 = 256.0;

/// Integer zoom in [`MIN_ZOOM`, `MAX_ZOOM`] fitting `bounds` into
/// `viewport`. Deterministic: identical inputs always produce the identical
/// zoom.
pub fn calculate_optimal_zoom(bounds: Option<&BoundsResult>, viewport: ViewportSize) -> u8 {
    let Some(bounds) = bounds else {
        return DEFAULT_ZOOM;
    };

    let size = viewport.or_default();
    let lon_span = bounds.width_deg;
    let lat_span = bounds.height_deg;

    if bounds.crosses_antimeridian {
        if bounds.is_very_large_region {
            return 3;
        }
        let damped = (6.0 - lat_span / 90.0).floor();
        return damped.clamp(2.0, 5.0) as u8;
    }

    let lon_zoom = (360.0 * (size.width_px / TILE_SIZE_PX) / lon_span).log2();
    let lat_zoom = (180.0 * (size.height_px / TILE_SIZE_PX) / lat_span).log2();
    let mut zoom = lon_zoom.min(lat_zoom);

    if bounds.is_very_large_region {
        zoom = zoom.min(4.0);
    } else if lon_span > 60.0 || lat_span > 40.0 {
        zoom = zoom.min(5.0);
    } else if lon_span > 30.0 || lat_span > 20.0 {
        zoom = zoom.min(6.0);
    } else if lon_span > 15.0 || lat_span > 10.0 {
        zoom = zoom.min(7.0);
    }

    zoom.clamp(MIN_ZOOM as f64, MAX_ZOOM as f64).floor() as u8
}
