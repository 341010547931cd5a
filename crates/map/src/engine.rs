use foundation::math::LonLat;
use serde_json::Value;

use crate::spec::{CameraTarget, LayerSpec, SourceSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    NotLoaded,
    DuplicateSource(String),
    DuplicateLayer(String),
    UnknownSource(String),
    UnknownLayer(String),
    /// A source cannot be removed while a layer still draws from it.
    SourceInUse { source: String, layer: String },
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::NotLoaded => write!(f, "map is not loaded yet"),
            MapError::DuplicateSource(id) => write!(f, "source already exists: {id}"),
            MapError::DuplicateLayer(id) => write!(f, "layer already exists: {id}"),
            MapError::UnknownSource(id) => write!(f, "unknown source: {id}"),
            MapError::UnknownLayer(id) => write!(f, "unknown layer: {id}"),
            MapError::SourceInUse { source, layer } => {
                write!(f, "source {source} is still used by layer {layer}")
            }
        }
    }
}

impl std::error::Error for MapError {}

/// The tile-based map surface.
///
/// Calls are synchronous. Layers added later draw above layers added
/// earlier. Adding an id twice or removing an unknown id is an error; the
/// idempotent variants live on [`crate::MapSession`].
pub trait MapEngine {
    /// False until the style and base map finished loading.
    fn is_loaded(&self) -> bool;

    fn add_source(&mut self, id: &str, source: SourceSpec) -> Result<(), MapError>;
    fn remove_source(&mut self, id: &str) -> Result<(), MapError>;
    fn has_source(&self, id: &str) -> bool;

    fn add_layer(&mut self, layer: LayerSpec) -> Result<(), MapError>;
    fn remove_layer(&mut self, id: &str) -> Result<(), MapError>;
    fn has_layer(&self, id: &str) -> bool;

    fn set_paint_property(&mut self, layer: &str, name: &str, value: Value)
    -> Result<(), MapError>;
    fn set_layout_property(&mut self, layer: &str, name: &str, value: Value)
    -> Result<(), MapError>;
    fn layout_property(&self, layer: &str, name: &str) -> Option<Value>;

    fn fly_to(&mut self, target: CameraTarget);
    /// Current camera zoom.
    fn zoom(&self) -> f64;

    fn add_marker(&mut self, id: &str, at: LonLat);
    fn remove_marker(&mut self, id: &str) -> bool;
}
