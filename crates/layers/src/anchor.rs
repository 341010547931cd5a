//! Camera anchor resolution for layers.

use foundation::math::LonLat;
use serde_json::Value;

use crate::layer::{Layer, Metadata};

/// Metadata keys holding the centroid text, most specific first.
pub const CENTROID_KEYS: [&str; 2] = ["GEOMETRY CENTROID", "centroid"];
pub const REQUEST_CENTER_LON_KEY: &str = "REQUEST_CENTER_LON";
pub const REQUEST_CENTER_LAT_KEY: &str = "REQUEST_CENTER_LAT";

/// Where a resolved anchor came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AnchorSource {
    Centroid,
    LayerAnchor,
    RequestCenter,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Anchor {
    pub at: LonLat,
    pub source: AnchorSource,
}

/// Picks the coordinate to center the camera on.
///
/// Priority: metadata centroid text, then `layer.anchor`, then the
/// request-center pair in metadata. Invalid candidates are skipped.
pub fn resolve_anchor(layer: &Layer) -> Option<Anchor> {
    let centroid = CENTROID_KEYS
        .iter()
        .filter_map(|key| layer.metadata.get(*key))
        .filter_map(Value::as_str)
        .find_map(parse_centroid);
    if let Some(at) = centroid {
        return Some(Anchor {
            at,
            source: AnchorSource::Centroid,
        });
    }

    if let Some(at) = layer.anchor.filter(|p| is_valid(*p)) {
        return Some(Anchor {
            at,
            source: AnchorSource::LayerAnchor,
        });
    }

    request_center(&layer.metadata).map(|at| Anchor {
        at,
        source: AnchorSource::RequestCenter,
    })
}

/// Parses `"lon,lat"` or labelled `"Lon: X, Lat: Y"` (either order).
pub fn parse_centroid(text: &str) -> Option<LonLat> {
    let mut parts = text.split(',');
    let first = split_label(parts.next()?)?;
    let second = split_label(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }

    let (lon, lat) = match (first.0, second.0) {
        (Some(Axis::Lat), Some(Axis::Lon)) => (second.1, first.1),
        (None | Some(Axis::Lon), None | Some(Axis::Lat)) => (first.1, second.1),
        _ => return None,
    };
    let at = LonLat::new(lon, lat);
    is_valid(at).then_some(at)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Axis {
    Lon,
    Lat,
}

fn split_label(part: &str) -> Option<(Option<Axis>, f64)> {
    let part = part.trim();
    let (axis, value) = match part.split_once(':') {
        Some((label, value)) => {
            let label = label.trim().to_ascii_lowercase();
            let axis = if label.starts_with("lon") || label == "lng" {
                Axis::Lon
            } else if label.starts_with("lat") {
                Axis::Lat
            } else {
                return None;
            };
            (Some(axis), value.trim())
        }
        None => (None, part),
    };
    Some((axis, value.parse().ok()?))
}

fn request_center(metadata: &Metadata) -> Option<LonLat> {
    let lon = metadata_number(metadata, REQUEST_CENTER_LON_KEY)?;
    let lat = metadata_number(metadata, REQUEST_CENTER_LAT_KEY)?;
    let at = LonLat::new(lon, lat);
    is_valid(at).then_some(at)
}

/// Numbers may arrive as JSON numbers or numeric strings.
fn metadata_number(metadata: &Metadata, key: &str) -> Option<f64> {
    match metadata.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_valid(at: LonLat) -> bool {
    at.is_finite() && (-180.0..=180.0).contains(&at.lon) && (-90.0..=90.0).contains(&at.lat)
}

#[cfg(test)]
mod tests {
    use super::{AnchorSource, parse_centroid, resolve_anchor};
    use crate::layer::{Layer, Metadata};
    use crate::processing::ProcessingType;
    use foundation::math::LonLat;
    use serde_json::json;

    fn layer(meta: serde_json::Value) -> Layer {
        let metadata: Metadata = serde_json::from_value(meta).unwrap();
        Layer::new("l", "https://t/{z}/{x}/{y}", "Somewhere", ProcessingType::Ndvi)
            .with_metadata(metadata)
    }

    #[test]
    fn centroid_text_formats() {
        assert_eq!(parse_centroid("36.8,-1.3"), Some(LonLat::new(36.8, -1.3)));
        assert_eq!(
            parse_centroid("Lon: 36.8219, Lat: -1.2921"),
            Some(LonLat::new(36.8219, -1.2921))
        );
        assert_eq!(
            parse_centroid("Lat: -1.2921, Lon: 36.8219"),
            Some(LonLat::new(36.8219, -1.2921))
        );
        assert_eq!(parse_centroid("Error calculating centroid"), None);
        assert_eq!(parse_centroid("1,2,3"), None);
        assert_eq!(parse_centroid("10,95"), None);
    }

    #[test]
    fn centroid_wins_over_anchor_and_request_center() {
        let l = layer(json!({
            "GEOMETRY CENTROID": "Lon: 1.0, Lat: 2.0",
            "REQUEST_CENTER_LON": 5.0,
            "REQUEST_CENTER_LAT": 6.0,
        }))
        .with_anchor(LonLat::new(3.0, 4.0));
        let anchor = resolve_anchor(&l).unwrap();
        assert_eq!(anchor.at, LonLat::new(1.0, 2.0));
        assert_eq!(anchor.source, AnchorSource::Centroid);
    }

    #[test]
    fn falls_back_in_priority_order() {
        let l = layer(json!({
            "centroid": "not a coordinate",
            "REQUEST_CENTER_LON": "5.5",
            "REQUEST_CENTER_LAT": 6.0,
        }));
        let with_anchor = l.clone().with_anchor(LonLat::new(3.0, 4.0));
        assert_eq!(
            resolve_anchor(&with_anchor).unwrap().source,
            AnchorSource::LayerAnchor
        );

        let anchor = resolve_anchor(&l).unwrap();
        assert_eq!(anchor.source, AnchorSource::RequestCenter);
        assert_eq!(anchor.at, LonLat::new(5.5, 6.0));
    }

    #[test]
    fn nothing_usable_resolves_to_none() {
        assert_eq!(resolve_anchor(&layer(json!({}))), None);
        let nan = layer(json!({})).with_anchor(LonLat::new(f64::NAN, 0.0));
        assert_eq!(resolve_anchor(&nan), None);
    }
}
