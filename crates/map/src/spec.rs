use std::collections::BTreeMap;

use foundation::math::LonLat;
use serde_json::Value;

/// Paint property holding a raster layer's opacity.
pub const RASTER_OPACITY: &str = "raster-opacity";
/// Layout property toggling a layer on and off.
pub const VISIBILITY: &str = "visibility";
pub const VISIBILITY_VISIBLE: &str = "visible";
pub const VISIBILITY_NONE: &str = "none";

#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    /// XYZ raster tiles; `tiles` holds URL templates with `{z}/{x}/{y}`.
    Raster { tiles: Vec<String>, tile_size: u32 },
    /// Inline GeoJSON (a `FeatureCollection`).
    GeoJson { data: Value },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Raster,
    Circle,
    Line,
    Fill,
}

/// Restricts a vector layer to one geometry type of its source.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryFilter {
    Point,
    LineString,
    Polygon,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    pub kind: LayerKind,
    pub filter: Option<GeometryFilter>,
    pub paint: BTreeMap<String, Value>,
    pub layout: BTreeMap<String, Value>,
}

impl LayerSpec {
    pub fn new(id: impl Into<String>, source: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            kind,
            filter: None,
            paint: BTreeMap::new(),
            layout: BTreeMap::new(),
        }
    }

    pub fn with_paint(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.paint.insert(name.into(), value.into());
        self
    }

    pub fn with_layout(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.layout.insert(name.into(), value.into());
        self
    }

    pub fn with_filter(mut self, filter: GeometryFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraTarget {
    pub center: LonLat,
    pub zoom: f64,
    pub duration_ms: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PointerEventKind {
    Click,
    DoubleClick,
    MouseDown,
    MouseMove,
    MouseUp,
}

impl PointerEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PointerEventKind::Click => "click",
            PointerEventKind::DoubleClick => "dblclick",
            PointerEventKind::MouseDown => "mousedown",
            PointerEventKind::MouseMove => "mousemove",
            PointerEventKind::MouseUp => "mouseup",
        }
    }

    /// Accepts the renderer's event names; `double_click` is an alias.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "click" => Some(PointerEventKind::Click),
            "dblclick" | "double_click" => Some(PointerEventKind::DoubleClick),
            "mousedown" => Some(PointerEventKind::MouseDown),
            "mousemove" => Some(PointerEventKind::MouseMove),
            "mouseup" => Some(PointerEventKind::MouseUp),
            _ => None,
        }
    }
}

/// A pointer event already projected to map coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub at: LonLat,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, at: LonLat) -> Self {
        Self { kind, at }
    }

    pub fn click(at: LonLat) -> Self {
        Self::new(PointerEventKind::Click, at)
    }

    pub fn double_click(at: LonLat) -> Self {
        Self::new(PointerEventKind::DoubleClick, at)
    }

    pub fn down(at: LonLat) -> Self {
        Self::new(PointerEventKind::MouseDown, at)
    }

    pub fn moved(at: LonLat) -> Self {
        Self::new(PointerEventKind::MouseMove, at)
    }

    pub fn up(at: LonLat) -> Self {
        Self::new(PointerEventKind::MouseUp, at)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        GeometryFilter, LayerKind, LayerSpec, PointerEventKind, RASTER_OPACITY, VISIBILITY,
    };
    use serde_json::json;

    #[test]
    fn builder_collects_properties() {
        let spec = LayerSpec::new("l", "s", LayerKind::Raster)
            .with_paint(RASTER_OPACITY, 0.5)
            .with_layout(VISIBILITY, "none")
            .with_filter(GeometryFilter::Polygon);
        assert_eq!(spec.paint.get(RASTER_OPACITY), Some(&json!(0.5)));
        assert_eq!(spec.layout.get(VISIBILITY), Some(&json!("none")));
        assert_eq!(spec.filter, Some(GeometryFilter::Polygon));
    }

    #[test]
    fn pointer_kinds_parse_their_event_names() {
        for kind in [
            PointerEventKind::Click,
            PointerEventKind::DoubleClick,
            PointerEventKind::MouseDown,
            PointerEventKind::MouseMove,
            PointerEventKind::MouseUp,
        ] {
            assert_eq!(PointerEventKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(
            PointerEventKind::parse("Double_Click"),
            Some(PointerEventKind::DoubleClick)
        );
        assert_eq!(PointerEventKind::parse("wheel"), None);
    }
}
