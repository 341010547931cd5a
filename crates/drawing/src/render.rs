//! Renderer bookkeeping for annotations.
//!
//! Committed features share one GeoJSON source with a layer per geometry
//! group; the preview lives under its own fixed ids. Both are rebuilt by
//! remove-then-add, never patched in place.

use map::engine::{MapEngine, MapError};
use map::session::MapSession;
use map::spec::{GeometryFilter, LayerKind, LayerSpec, SourceSpec};
use serde_json::{Value, json};
use tracing::warn;

use crate::feature::{DrawnFeature, Preview, feature_collection};

pub const COMMITTED_SOURCE: &str = "draw-source";
pub const POINTS_LAYER: &str = "draw-layer-points";
pub const LINES_LAYER: &str = "draw-layer-lines";
pub const POLYGON_FILL_LAYER: &str = "draw-layer-polygons-fill";
pub const POLYGON_OUTLINE_LAYER: &str = "draw-layer-polygons-outline";

pub const PREVIEW_SOURCE: &str = "temp-source";
pub const PREVIEW_LAYER: &str = "temp-layer";
pub const PREVIEW_OUTLINE_LAYER: &str = "temp-layer-outline";

const COMMITTED_LAYERS: [&str; 4] = [
    POINTS_LAYER,
    LINES_LAYER,
    POLYGON_FILL_LAYER,
    POLYGON_OUTLINE_LAYER,
];

fn color() -> Value {
    json!(["get", "color"])
}

fn points(id: &str, source: &str) -> LayerSpec {
    LayerSpec::new(id, source, LayerKind::Circle)
        .with_filter(GeometryFilter::Point)
        .with_paint("circle-radius", 6)
        .with_paint("circle-color", color())
        .with_paint("circle-stroke-width", 2)
        .with_paint("circle-stroke-color", "#ffffff")
}

fn lines(id: &str, source: &str) -> LayerSpec {
    LayerSpec::new(id, source, LayerKind::Line)
        .with_filter(GeometryFilter::LineString)
        .with_paint("line-color", color())
        .with_paint("line-width", 3)
}

fn polygon_fill(id: &str, source: &str) -> LayerSpec {
    LayerSpec::new(id, source, LayerKind::Fill)
        .with_filter(GeometryFilter::Polygon)
        .with_paint("fill-color", color())
        .with_paint("fill-opacity", 0.3)
}

fn polygon_outline(id: &str, source: &str) -> LayerSpec {
    LayerSpec::new(id, source, LayerKind::Line)
        .with_filter(GeometryFilter::Polygon)
        .with_paint("line-color", color())
        .with_paint("line-width", 2)
}

/// Replaces the committed annotation layers with `features`. An empty
/// history leaves nothing registered.
pub fn render_committed<E: MapEngine>(map: &mut MapSession<E>, features: &[DrawnFeature]) {
    clear_committed(map);
    if features.is_empty() {
        return;
    }
    if let Err(err) = add_committed(map, features) {
        warn!("annotation render failed: {err}");
        clear_committed(map);
    }
}

fn add_committed<E: MapEngine>(
    map: &mut MapSession<E>,
    features: &[DrawnFeature],
) -> Result<(), MapError> {
    map.add_source(
        COMMITTED_SOURCE,
        SourceSpec::GeoJson {
            data: feature_collection(features),
        },
    )?;
    let has = |kind: GeometryFilter| features.iter().any(|f| f.geometry.kind() == kind);
    if has(GeometryFilter::Point) {
        map.add_layer(points(POINTS_LAYER, COMMITTED_SOURCE))?;
    }
    if has(GeometryFilter::LineString) {
        map.add_layer(lines(LINES_LAYER, COMMITTED_SOURCE))?;
    }
    if has(GeometryFilter::Polygon) {
        map.add_layer(polygon_fill(POLYGON_FILL_LAYER, COMMITTED_SOURCE))?;
        map.add_layer(polygon_outline(POLYGON_OUTLINE_LAYER, COMMITTED_SOURCE))?;
    }
    Ok(())
}

pub fn clear_committed<E: MapEngine>(map: &mut MapSession<E>) {
    for id in COMMITTED_LAYERS {
        map.remove_layer_if_present(id);
    }
    map.remove_source_if_present(COMMITTED_SOURCE);
}

/// Shows `preview` as the single transient feature.
pub fn render_preview<E: MapEngine>(map: &mut MapSession<E>, preview: &Preview) {
    clear_preview(map);
    if let Err(err) = add_preview(map, preview) {
        warn!("preview render failed: {err}");
        clear_preview(map);
    }
}

fn add_preview<E: MapEngine>(map: &mut MapSession<E>, preview: &Preview) -> Result<(), MapError> {
    map.add_source(
        PREVIEW_SOURCE,
        SourceSpec::GeoJson {
            data: json!({ "type": "FeatureCollection", "features": [preview.to_geojson()] }),
        },
    )?;
    match preview.geometry.kind() {
        GeometryFilter::Point => map.add_layer(points(PREVIEW_LAYER, PREVIEW_SOURCE)),
        GeometryFilter::LineString => map.add_layer(lines(PREVIEW_LAYER, PREVIEW_SOURCE)),
        GeometryFilter::Polygon => {
            map.add_layer(polygon_fill(PREVIEW_LAYER, PREVIEW_SOURCE))?;
            map.add_layer(polygon_outline(PREVIEW_OUTLINE_LAYER, PREVIEW_SOURCE))
        }
    }
}

pub fn clear_preview<E: MapEngine>(map: &mut MapSession<E>) {
    map.remove_layer_if_present(PREVIEW_OUTLINE_LAYER);
    map.remove_layer_if_present(PREVIEW_LAYER);
    map.remove_source_if_present(PREVIEW_SOURCE);
}

/// True for renderer ids owned by the drawing tools.
pub fn is_annotation_id(id: &str) -> bool {
    id.starts_with("draw-") || id.starts_with("temp-")
}
