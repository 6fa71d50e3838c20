use foundation::LatLon;

use crate::geometry::NormalizedGeometry;

/// Representative point used when a geometry has no usable vertices.
pub const FALLBACK_CENTER: LatLon = LatLon::new(55.75, 37.61);

/// Representative point of a normalized geometry, for label/info placement.
///
/// Polygon: arithmetic mean of the outer ring's vertices. MultiPolygon:
/// bounding-box center of the part whose bounding box is largest. The two
/// branches intentionally approximate "center" differently; label placement
/// downstream is tuned to this behavior.
pub fn compute_centroid(geometry: &NormalizedGeometry) -> LatLon {
    match geometry {
        NormalizedGeometry::Polygon(rings) => {
            let Some(outer) = rings.first() else {
                return FALLBACK_CENTER;
            };
            if outer.is_empty() {
                return FALLBACK_CENTER;
            }
            let mut lat_sum = 0.0;
            let mut lon_sum = 0.0;
            for p in outer {
                lat_sum += p.lat_deg;
                lon_sum += p.lon_deg;
            }
            let n = outer.len() as f64;
            LatLon::new(lat_sum / n, lon_sum / n)
        }
        NormalizedGeometry::MultiPolygon(polys) => {
            // A part only wins with a strictly positive bbox area, so a fully
            // degenerate multipolygon falls back rather than centering on a
            // zero-extent part.
            let mut largest: Option<&[LatLon]> = None;
            let mut max_area = 0.0;
            for poly in polys {
                let Some(outer) = poly.first() else { continue };
                let Some(bbox) = ring_bbox(outer) else { continue };
                let area = (bbox.2 - bbox.0) * (bbox.3 - bbox.1);
                if area > max_area {
                    largest = Some(outer);
                    max_area = area;
                }
            }
            let Some(outer) = largest else {
                return FALLBACK_CENTER;
            };
            let Some((min_lat, min_lon, max_lat, max_lon)) = ring_bbox(outer) else {
                return FALLBACK_CENTER;
            };
            LatLon::new((min_lat + max_lat) / 2.0, (min_lon + max_lon) / 2.0)
        }
    }
}

fn ring_bbox(ring: &[LatLon]) -> Option<(f64, f64, f64, f64)> {
    let first = ring.first()?;
    let mut min_lat = first.lat_deg;
    let mut min_lon = first.lon_deg;
    let mut max_lat = first.lat_deg;
    let mut max_lon = first.lon_deg;
    for p in ring.iter().skip(1) {
        min_lat = min_lat.min(p.lat_deg);
        min_lon = min_lon.min(p.lon_deg);
        max_lat = max_lat.max(p.lat_deg);
        max_lon = max_lon.max(p.lon_deg);
    }
    Some((min_lat, min_lon, max_lat, max_lon))
}
