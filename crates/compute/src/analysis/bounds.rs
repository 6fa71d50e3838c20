//! Overall bounding box of the visible region set.
//!
//! Longitudes are wrapped into [-180, 180] before min/max tracking. Spans
//! that exceed half the globe (or regions classified very large) are
//! recomputed on the +360-shifted branch so a dataset straddling the
//! antimeridian keeps its center inside the actual landmass instead of
//! drifting toward 0°.

use foundation::{GeoRect, LatLon, shift_antimeridian, unshift_center, wrap_longitude};
use formats::{ParsedGeometry, parse_geometry, parse_region_payload};
use regions::RegionRecord;
use tracing::warn;

pub const VERY_LARGE_LON_SPAN_DEG: f64 = 100.0;
pub const VERY_LARGE_LAT_SPAN_DEG: f64 = 60.0;

/// Derived bounds of the active region set; recomputed on every dataset or
/// level change, never mutated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundsResult {
    pub rect: GeoRect,
    pub center: LatLon,
    pub width_deg: f64,
    pub height_deg: f64,
    pub crosses_antimeridian: bool,
    pub is_very_large_region: bool,
}

/// Computes the overall bounds of `records`.
///
/// Records whose payload or geometry fails to parse are skipped with a
/// warning. Returns `None` when no vertex survives (empty input or every
/// record unparseable).
pub fn compute_overall_bounds(records: &[&RegionRecord]) -> Option<BoundsResult> {
    let geometries: Vec<ParsedGeometry> = records
        .iter()
        .filter_map(|record| {
            let Some(payload) = parse_region_payload(&record.geojson) else {
                warn!(id = %record.id, "skipping record: unparseable geometry payload");
                return None;
            };
            let Some(geometry) = parse_geometry(&payload.geometry) else {
                warn!(id = %record.id, "skipping record: unsupported geometry");
                return None;
            };
            Some(geometry)
        })
        .collect();

    let mut seen = false;
    let mut min_lon = f64::INFINITY;
    let mut max_lon = f64::NEG_INFINITY;
    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;

    for geometry in &geometries {
        geometry.visit_vertices(|p| {
            let lon = wrap_longitude(p.lon_deg);
            seen = true;
            min_lon = min_lon.min(lon);
            max_lon = max_lon.max(lon);
            min_lat = min_lat.min(p.lat_deg);
            max_lat = max_lat.max(p.lat_deg);
        });
    }
    if !seen {
        return None;
    }

    let lon_span = max_lon - min_lon;
    let lat_span = max_lat - min_lat;
    let is_very_large_region =
        lon_span > VERY_LARGE_LON_SPAN_DEG || lat_span > VERY_LARGE_LAT_SPAN_DEG;

    if lon_span > 180.0 || is_very_large_region {
        // Second pass on the shifted branch; raw longitudes, negatives moved
        // east by one revolution.
        let mut shifted_min = f64::INFINITY;
        let mut shifted_max = f64::NEG_INFINITY;
        for geometry in &geometries {
            geometry.visit_vertices(|p| {
                let lon = shift_antimeridian(p.lon_deg);
                shifted_min = shifted_min.min(lon);
                shifted_max = shifted_max.max(lon);
            });
        }
        let center_lon = unshift_center((shifted_min + shifted_max) / 2.0);

        return Some(BoundsResult {
            rect: GeoRect::new(min_lat, -180.0, max_lat, 180.0),
            center: LatLon::new((min_lat + max_lat) / 2.0, center_lon),
            width_deg: 360.0,
            height_deg: lat_span,
            crosses_antimeridian: true,
            is_very_large_region,
        });
    }

    let rect = GeoRect::new(min_lat, min_lon, max_lat, max_lon);
    Some(BoundsResult {
        center: rect.center(),
        width_deg: lon_span,
        height_deg: lat_span,
        rect,
        crosses_antimeridian: false,
        is_very_large_region,
    })
}

#[cfg(test)]
pub(crate) mod testutil {
    use regions::RegionRecord;
    use serde_json::{Map, json};

    /// Record whose polygon is a single ring of `[lon, lat]` pairs.
    pub fn polygon_record(id: &str, ring: &[(f64, f64)]) -> RegionRecord {
        let coords: Vec<_> = ring.iter().map(|&(lon, lat)| json!([lon, lat])).collect();
        RegionRecord {
            id: id.to_string(),
            geojson: json!({
                "id": id,
                "geometry": {"type": "Polygon", "coordinates": [coords]},
            }),
            region_name: Some(id.to_string()),
            message_html: None,
            level: 1,
            parent_id: None,
            metric_value: 0.0,
            color: None,
            extras: Map::new(),
        }
    }

    pub fn broken_record(id: &str) -> RegionRecord {
        RegionRecord {
            geojson: json!("{'no_id_here': 1}"),
            ..polygon_record(id, &[])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::compute_overall_bounds;
    use super::testutil::{broken_record, polygon_record};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn empty_and_unparseable_inputs_yield_none() {
        assert!(compute_overall_bounds(&[]).is_none());

        let broken = [broken_record("A"), broken_record("B")];
        let refs: Vec<_> = broken.iter().collect();
        assert!(compute_overall_bounds(&refs).is_none());
    }

    #[test]
    fn single_polygon_box() {
        let record = polygon_record(
            "RU-MOW",
            &[(37.0, 55.0), (38.0, 55.0), (38.0, 56.0), (37.0, 56.0)],
        );
        let bounds = compute_overall_bounds(&[&record]).expect("bounds");
        assert!(!bounds.crosses_antimeridian);
        assert!(!bounds.is_very_large_region);
        assert_eq!(bounds.rect.west, 37.0);
        assert_eq!(bounds.rect.east, 38.0);
        assert_eq!(bounds.rect.south, 55.0);
        assert_eq!(bounds.rect.north, 56.0);
        assert_close(bounds.center.lat_deg, 55.5, 1e-12);
        assert_close(bounds.center.lon_deg, 37.5, 1e-12);
        assert_close(bounds.width_deg, 1.0, 1e-12);
        assert_close(bounds.height_deg, 1.0, 1e-12);
    }

    #[test]
    fn unparseable_records_are_skipped_not_fatal() {
        let good = polygon_record("A", &[(10.0, 10.0), (11.0, 11.0)]);
        let bad = broken_record("B");
        let bounds = compute_overall_bounds(&[&bad, &good]).expect("bounds");
        assert_eq!(bounds.rect.west, 10.0);
        assert_eq!(bounds.rect.east, 11.0);
    }

    #[test]
    fn out_of_range_longitudes_wrap_before_tracking() {
        let record = polygon_record("A", &[(370.0, 10.0), (371.0, 11.0)]);
        let bounds = compute_overall_bounds(&[&record]).expect("bounds");
        assert_eq!(bounds.rect.west, 10.0);
        assert_eq!(bounds.rect.east, 11.0);
    }

    #[test]
    fn straddling_the_antimeridian_recenters_on_the_shifted_branch() {
        let record = polygon_record(
            "RU-CHU",
            &[(179.0, 64.0), (-179.0, 64.0), (-179.0, 66.0), (179.0, 66.0)],
        );
        let bounds = compute_overall_bounds(&[&record]).expect("bounds");
        assert!(bounds.crosses_antimeridian);
        // The wrapped span (358°) also exceeds the very-large threshold.
        assert!(bounds.is_very_large_region);
        // Bounds pin to the full longitude range; the center stays on the
        // landmass at 180°, not at 0°.
        assert_eq!(bounds.rect.west, -180.0);
        assert_eq!(bounds.rect.east, 180.0);
        assert_eq!(bounds.width_deg, 360.0);
        assert_close(bounds.center.lon_deg, 180.0, 1e-12);
        assert_close(bounds.center.lat_deg, 65.0, 1e-12);
        assert_close(bounds.height_deg, 2.0, 1e-12);
    }

    #[test]
    fn shifted_center_west_of_the_line_renormalizes_negative() {
        // 170..-160 shifted becomes 170..200, center 185 -> -175.
        let record = polygon_record("A", &[(170.0, 0.0), (-160.0, 10.0)]);
        let bounds = compute_overall_bounds(&[&record]).expect("bounds");
        assert!(bounds.crosses_antimeridian);
        assert_close(bounds.center.lon_deg, -175.0, 1e-12);
    }

    #[test]
    fn very_large_region_takes_the_antimeridian_path_without_crossing() {
        let record = polygon_record("A", &[(0.0, 0.0), (120.0, 30.0)]);
        let bounds = compute_overall_bounds(&[&record]).expect("bounds");
        assert!(bounds.is_very_large_region);
        // The classification alone routes through the antimeridian handling.
        assert!(bounds.crosses_antimeridian);
        assert_eq!(bounds.width_deg, 360.0);
        assert_close(bounds.center.lon_deg, 60.0, 1e-12);
    }

    #[test]
    fn tall_region_is_very_large_by_latitude() {
        let record = polygon_record("A", &[(10.0, -40.0), (20.0, 40.0)]);
        let bounds = compute_overall_bounds(&[&record]).expect("bounds");
        assert!(bounds.is_very_large_region);
        assert_close(bounds.height_deg, 80.0, 1e-12);
    }
}
