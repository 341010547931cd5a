use std::collections::BTreeMap;

use foundation::math::LonLat;
use serde_json::Value;

use crate::engine::{MapEngine, MapError};
use crate::spec::{CameraTarget, LayerSpec, SourceSpec};

/// Zoom of a freshly created map (whole-world view).
pub const INITIAL_ZOOM: f64 = 2.0;

/// One mutating call received by a [`RecordingMap`].
#[derive(Debug, Clone, PartialEq)]
pub enum MapCommand {
    AddSource { id: String },
    RemoveSource { id: String },
    AddLayer { id: String },
    RemoveLayer { id: String },
    SetPaint { layer: String, name: String, value: Value },
    SetLayout { layer: String, name: String, value: Value },
    FlyTo(CameraTarget),
    AddMarker { id: String, at: LonLat },
    RemoveMarker { id: String },
}

/// In-memory map engine.
///
/// Keeps the registered sources, the layer draw order (bottom first) and a
/// log of every mutating call. Used headless by the CLI and by tests.
#[derive(Debug, Clone)]
pub struct RecordingMap {
    loaded: bool,
    sources: BTreeMap<String, SourceSpec>,
    layers: Vec<LayerSpec>,
    camera: Option<CameraTarget>,
    markers: BTreeMap<String, LonLat>,
    log: Vec<MapCommand>,
}

impl Default for RecordingMap {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingMap {
    /// A map that is already loaded.
    pub fn new() -> Self {
        Self {
            loaded: true,
            sources: BTreeMap::new(),
            layers: Vec::new(),
            camera: None,
            markers: BTreeMap::new(),
            log: Vec::new(),
        }
    }

    /// A map still loading its style; every mutation fails with `NotLoaded`.
    pub fn unloaded() -> Self {
        Self {
            loaded: false,
            ..Self::new()
        }
    }

    pub fn set_loaded(&mut self, loaded: bool) {
        self.loaded = loaded;
    }

    /// Layer ids from bottom to top.
    pub fn render_order(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    pub fn source_ids(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }

    pub fn source(&self, id: &str) -> Option<&SourceSpec> {
        self.sources.get(id)
    }

    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn camera(&self) -> Option<CameraTarget> {
        self.camera
    }

    pub fn markers(&self) -> &BTreeMap<String, LonLat> {
        &self.markers
    }

    pub fn commands(&self) -> &[MapCommand] {
        &self.log
    }

    fn ensure_loaded(&self) -> Result<(), MapError> {
        if self.loaded {
            Ok(())
        } else {
            Err(MapError::NotLoaded)
        }
    }

    fn layer_mut(&mut self, id: &str) -> Result<&mut LayerSpec, MapError> {
        self.layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| MapError::UnknownLayer(id.to_string()))
    }
}

impl MapEngine for RecordingMap {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn add_source(&mut self, id: &str, source: SourceSpec) -> Result<(), MapError> {
        self.ensure_loaded()?;
        if self.sources.contains_key(id) {
            return Err(MapError::DuplicateSource(id.to_string()));
        }
        self.sources.insert(id.to_string(), source);
        self.log.push(MapCommand::AddSource { id: id.to_string() });
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<(), MapError> {
        self.ensure_loaded()?;
        if !self.sources.contains_key(id) {
            return Err(MapError::UnknownSource(id.to_string()));
        }
        if let Some(layer) = self.layers.iter().find(|l| l.source == id) {
            return Err(MapError::SourceInUse {
                source: id.to_string(),
                layer: layer.id.clone(),
            });
        }
        self.sources.remove(id);
        self.log.push(MapCommand::RemoveSource { id: id.to_string() });
        Ok(())
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn add_layer(&mut self, layer: LayerSpec) -> Result<(), MapError> {
        self.ensure_loaded()?;
        if self.has_layer(&layer.id) {
            return Err(MapError::DuplicateLayer(layer.id));
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(MapError::UnknownSource(layer.source));
        }
        self.log.push(MapCommand::AddLayer {
            id: layer.id.clone(),
        });
        self.layers.push(layer);
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), MapError> {
        self.ensure_loaded()?;
        let Some(pos) = self.layers.iter().position(|l| l.id == id) else {
            return Err(MapError::UnknownLayer(id.to_string()));
        };
        self.layers.remove(pos);
        self.log.push(MapCommand::RemoveLayer { id: id.to_string() });
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.iter().any(|l| l.id == id)
    }

    fn set_paint_property(
        &mut self,
        layer: &str,
        name: &str,
        value: Value,
    ) -> Result<(), MapError> {
        self.ensure_loaded()?;
        self.layer_mut(layer)?
            .paint
            .insert(name.to_string(), value.clone());
        self.log.push(MapCommand::SetPaint {
            layer: layer.to_string(),
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    fn set_layout_property(
        &mut self,
        layer: &str,
        name: &str,
        value: Value,
    ) -> Result<(), MapError> {
        self.ensure_loaded()?;
        self.layer_mut(layer)?
            .layout
            .insert(name.to_string(), value.clone());
        self.log.push(MapCommand::SetLayout {
            layer: layer.to_string(),
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    fn layout_property(&self, layer: &str, name: &str) -> Option<Value> {
        self.layer(layer).and_then(|l| l.layout.get(name).cloned())
    }

    fn fly_to(&mut self, target: CameraTarget) {
        self.camera = Some(target);
        self.log.push(MapCommand::FlyTo(target));
    }

    fn zoom(&self) -> f64 {
        self.camera.map_or(INITIAL_ZOOM, |c| c.zoom)
    }

    fn add_marker(&mut self, id: &str, at: LonLat) {
        self.markers.insert(id.to_string(), at);
        self.log.push(MapCommand::AddMarker {
            id: id.to_string(),
            at,
        });
    }

    fn remove_marker(&mut self, id: &str) -> bool {
        let removed = self.markers.remove(id).is_some();
        if removed {
            self.log.push(MapCommand::RemoveMarker { id: id.to_string() });
        }
        removed
    }
}
