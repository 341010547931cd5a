use std::fmt;

use foundation::math::LonLat;
use map::spec::GeometryFilter;
use serde_json::{Map, Value, json};

use crate::mode::DrawType;

/// Identifier of a committed feature. Allocated from a per-engine sequence
/// and never reused, even after undo.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub u64);

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(LonLat),
    LineString(Vec<LonLat>),
    /// Single closed exterior ring.
    Polygon(Vec<LonLat>),
}

impl Geometry {
    pub fn kind(&self) -> GeometryFilter {
        match self {
            Geometry::Point(_) => GeometryFilter::Point,
            Geometry::LineString(_) => GeometryFilter::LineString,
            Geometry::Polygon(_) => GeometryFilter::Polygon,
        }
    }

    pub fn positions(&self) -> &[LonLat] {
        match self {
            Geometry::Point(p) => std::slice::from_ref(p),
            Geometry::LineString(pts) | Geometry::Polygon(pts) => pts,
        }
    }

    pub fn to_geojson(&self) -> Value {
        match self {
            Geometry::Point(p) => json!({ "type": "Point", "coordinates": p.to_array() }),
            Geometry::LineString(pts) => json!({
                "type": "LineString",
                "coordinates": positions(pts),
            }),
            Geometry::Polygon(ring) => json!({
                "type": "Polygon",
                "coordinates": [positions(ring)],
            }),
        }
    }
}

fn positions(pts: &[LonLat]) -> Vec<[f64; 2]> {
    pts.iter().map(|p| p.to_array()).collect()
}

/// A committed annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnFeature {
    pub id: FeatureId,
    pub draw_type: DrawType,
    pub geometry: Geometry,
    /// Cumulative length, measurements only.
    pub measurement_km: Option<f64>,
    /// Circles only.
    pub radius_km: Option<f64>,
    pub center: Option<LonLat>,
}

impl DrawnFeature {
    pub fn color(&self) -> &'static str {
        self.draw_type.color()
    }

    pub fn to_geojson(&self) -> Value {
        let mut props = Map::new();
        props.insert("drawType".into(), self.draw_type.as_str().into());
        props.insert("color".into(), self.color().into());
        if let Some(km) = self.measurement_km {
            props.insert("measurement".into(), km.into());
        }
        if let Some(km) = self.radius_km {
            props.insert("radius".into(), km.into());
        }
        if let Some(center) = self.center {
            props.insert("center".into(), json!(center.to_array()));
        }
        json!({
            "type": "Feature",
            "id": self.id.to_string(),
            "geometry": self.geometry.to_geojson(),
            "properties": props,
        })
    }
}

/// The transient geometry following the pointer while drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub draw_type: DrawType,
    pub geometry: Geometry,
}

impl Preview {
    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "Feature",
            "geometry": self.geometry.to_geojson(),
            "properties": {
                "drawType": self.draw_type.as_str(),
                "color": self.draw_type.color(),
                "isPreview": true,
            },
        })
    }
}

/// `FeatureCollection` of `features`, in the given order.
pub fn feature_collection<'a>(features: impl IntoIterator<Item = &'a DrawnFeature>) -> Value {
    let features: Vec<Value> = features.into_iter().map(DrawnFeature::to_geojson).collect();
    json!({ "type": "FeatureCollection", "features": features })
}

#[cfg(test)]
mod tests {
    use super::{DrawnFeature, FeatureId, Geometry, feature_collection};
    use crate::mode::DrawType;
    use foundation::math::LonLat;
    use serde_json::json;

    #[test]
    fn circle_feature_carries_radius_and_center() {
        let f = DrawnFeature {
            id: FeatureId(7),
            draw_type: DrawType::Circle,
            geometry: Geometry::Polygon(vec![
                LonLat::new(0.0, 0.0),
                LonLat::new(1.0, 0.0),
                LonLat::new(0.0, 1.0),
                LonLat::new(0.0, 0.0),
            ]),
            measurement_km: None,
            radius_km: Some(2.0),
            center: Some(LonLat::new(0.5, 0.5)),
        };
        let value = f.to_geojson();
        assert_eq!(value["id"], json!("7"));
        assert_eq!(value["geometry"]["type"], json!("Polygon"));
        assert_eq!(value["geometry"]["coordinates"][0][3], json!([0.0, 0.0]));
        assert_eq!(
            value["properties"],
            json!({
                "drawType": "CIRCLE",
                "color": "#FFCE33",
                "radius": 2.0,
                "center": [0.5, 0.5],
            })
        );
    }

    #[test]
    fn empty_collection_is_still_valid_geojson() {
        let v = feature_collection(&[]);
        assert_eq!(v, json!({ "type": "FeatureCollection", "features": [] }));
    }
}
