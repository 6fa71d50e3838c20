use foundation::LatLon;
use serde_json::Value;

/// A coordinate pair exactly as it appears in GeoJSON: `[lon, lat]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub const fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }
}

/// Geometry parsed from a payload, still in GeoJSON coordinate order.
///
/// Only the two drawable kinds are supported; everything else is treated
/// as absent rather than as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedGeometry {
    Polygon(Vec<Vec<LonLat>>),
    MultiPolygon(Vec<Vec<Vec<LonLat>>>),
}

/// Geometry with every pair swapped to `[lat, lon]` for map consumption.
///
/// Owned by the render pass that produced it and discarded on re-render.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedGeometry {
    Polygon(Vec<Vec<LatLon>>),
    MultiPolygon(Vec<Vec<Vec<LatLon>>>),
}

impl ParsedGeometry {
    /// Visits every vertex of every ring, in document order.
    pub fn visit_vertices(&self, mut f: impl FnMut(LonLat)) {
        match self {
            ParsedGeometry::Polygon(rings) => {
                for ring in rings {
                    for p in ring {
                        f(*p);
                    }
                }
            }
            ParsedGeometry::MultiPolygon(polys) => {
                for poly in polys {
                    for ring in poly {
                        for p in ring {
                            f(*p);
                        }
                    }
                }
            }
        }
    }
}

/// Parses a GeoJSON geometry object into [`ParsedGeometry`].
///
/// Returns `None` for geometry kinds other than Polygon/MultiPolygon and for
/// structurally malformed coordinates.
pub fn parse_geometry(value: &Value) -> Option<ParsedGeometry> {
    let obj = value.as_object()?;
    let ty = obj.get("type")?.as_str()?;
    let coords = obj.get("coordinates")?;

    match ty {
        "Polygon" => Some(ParsedGeometry::Polygon(parse_rings(coords)?)),
        "MultiPolygon" => {
            let polys = coords.as_array()?;
            let mut out = Vec::with_capacity(polys.len());
            for poly in polys {
                out.push(parse_rings(poly)?);
            }
            Some(ParsedGeometry::MultiPolygon(out))
        }
        _ => None,
    }
}

/// Swaps every coordinate pair to `[lat, lon]`, preserving nesting depth and
/// ring lengths.
pub fn normalize(geometry: &ParsedGeometry) -> NormalizedGeometry {
    match geometry {
        ParsedGeometry::Polygon(rings) => {
            NormalizedGeometry::Polygon(rings.iter().map(|r| swap_ring(r)).collect())
        }
        ParsedGeometry::MultiPolygon(polys) => NormalizedGeometry::MultiPolygon(
            polys
                .iter()
                .map(|poly| poly.iter().map(|r| swap_ring(r)).collect())
                .collect(),
        ),
    }
}

/// Combined parse + swap, the per-record normalization entry point.
pub fn normalize_geometry(value: &Value) -> Option<NormalizedGeometry> {
    parse_geometry(value).map(|g| normalize(&g))
}

fn swap_ring(ring: &[LonLat]) -> Vec<LatLon> {
    ring.iter()
        .map(|p| LatLon::new(p.lat_deg, p.lon_deg))
        .collect()
}

fn parse_rings(coords: &Value) -> Option<Vec<Vec<LonLat>>> {
    let rings = coords.as_array()?;
    let mut out = Vec::with_capacity(rings.len());
    for ring in rings {
        out.push(parse_ring(ring)?);
    }
    Some(out)
}

fn parse_ring(ring: &Value) -> Option<Vec<LonLat>> {
    let arr = ring.as_array()?;
    let mut out = Vec::with_capacity(arr.len());
    for pair in arr {
        out.push(parse_position(pair)?);
    }
    Some(out)
}

fn parse_position(pair: &Value) -> Option<LonLat> {
    let arr = pair.as_array()?;
    if arr.len() < 2 {
        return None;
    }
    // Extra dimensions (altitude) are dropped.
    let lon = arr[0].as_f64()?;
    let lat = arr[1].as_f64()?;
    Some(LonLat::new(lon, lat))
}

#[cfg(test)]
mod tests {
    use super::{NormalizedGeometry, ParsedGeometry, normalize_geometry, parse_geometry};
    use serde_json::json;

    #[test]
    fn parses_polygon_in_lon_lat_order() {
        let value = json!({
            "type": "Polygon",
            "coordinates": [[[37.0, 55.0], [38.0, 55.0], [38.0, 56.0], [37.0, 56.0]]],
        });
        let geom = parse_geometry(&value).expect("polygon");
        let ParsedGeometry::Polygon(rings) = geom else {
            panic!("expected polygon");
        };
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0][0].lon_deg, 37.0);
        assert_eq!(rings[0][0].lat_deg, 55.0);
    }

    #[test]
    fn normalize_swaps_each_pair_preserving_shape() {
        let value = json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[10.0, 1.0], [11.0, 2.0], [12.0, 3.0]]],
                [[[20.0, 4.0], [21.0, 5.0], [22.0, 6.0]], [[23.0, 7.0], [24.0, 8.0], [25.0, 9.0]]],
            ],
        });
        let norm = normalize_geometry(&value).expect("multipolygon");
        let NormalizedGeometry::MultiPolygon(polys) = norm else {
            panic!("expected multipolygon");
        };
        assert_eq!(polys.len(), 2);
        assert_eq!(polys[1].len(), 2);
        assert_eq!(polys[0][0].len(), 3);
        assert_eq!(polys[0][0][0].lat_deg, 1.0);
        assert_eq!(polys[0][0][0].lon_deg, 10.0);
        assert_eq!(polys[1][1][2].lat_deg, 9.0);
        assert_eq!(polys[1][1][2].lon_deg, 25.0);
    }

    #[test]
    fn unsupported_kinds_yield_none() {
        for value in [
            json!({"type": "Point", "coordinates": [37.0, 55.0]}),
            json!({"type": "LineString", "coordinates": [[37.0, 55.0], [38.0, 56.0]]}),
            json!({"type": "GeometryCollection", "geometries": []}),
            json!("not an object"),
        ] {
            assert_eq!(normalize_geometry(&value), None, "value: {value}");
        }
    }

    #[test]
    fn malformed_coordinates_yield_none() {
        let short_pair = json!({"type": "Polygon", "coordinates": [[[37.0]]]});
        assert_eq!(parse_geometry(&short_pair), None);

        let non_numeric = json!({"type": "Polygon", "coordinates": [[["x", "y"]]]});
        assert_eq!(parse_geometry(&non_numeric), None);
    }

    #[test]
    fn altitude_dimension_is_dropped() {
        let value = json!({
            "type": "Polygon",
            "coordinates": [[[37.0, 55.0, 120.0], [38.0, 56.0, 130.0]]],
        });
        let geom = parse_geometry(&value).expect("polygon");
        let ParsedGeometry::Polygon(rings) = geom else {
            panic!("expected polygon");
        };
        assert_eq!(rings[0].len(), 2);
        assert_eq!(rings[0][1].lat_deg, 56.0);
    }
}
