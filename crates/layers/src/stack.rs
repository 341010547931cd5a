use std::collections::BTreeSet;
use std::fmt;

use foundation::math::{LonLat, clamp_unit};
use map::engine::MapEngine;
use map::session::MapSession;
use map::spec::{CameraTarget, RASTER_OPACITY, VISIBILITY};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::anchor::{Anchor, resolve_anchor};
use crate::layer::{Layer, LayerId, Visibility};
use crate::raster::{self, map_layer_id};
use crate::symbology::focus_zoom;
use crate::tiles::is_tile_template;

/// Renderer id of the single location marker.
pub const LOCATION_MARKER_ID: &str = "location-marker";

/// `fly_to_location` keeps the current zoom from this level up.
pub const KEEP_ZOOM_FROM: f64 = 8.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LayerStackConfig {
    /// Raster tile edge in pixels.
    pub tile_size: u32,
    /// Camera flight when focusing a layer.
    pub fly_duration_ms: u32,
    /// Zoom used by `fly_to_location` when the camera is further out.
    pub location_zoom: f64,
    pub location_fly_duration_ms: u32,
}

impl Default for LayerStackConfig {
    fn default() -> Self {
        Self {
            tile_size: 256,
            fly_duration_ms: 1000,
            location_zoom: 10.0,
            location_fly_duration_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderError {
    LengthMismatch { expected: usize, got: usize },
    UnknownLayer(LayerId),
    DuplicateLayer(LayerId),
}

impl fmt::Display for ReorderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReorderError::LengthMismatch { expected, got } => {
                write!(f, "reorder needs {expected} layer ids, got {got}")
            }
            ReorderError::UnknownLayer(id) => write!(f, "reorder names unknown layer {id}"),
            ReorderError::DuplicateLayer(id) => write!(f, "reorder names layer {id} twice"),
        }
    }
}

impl std::error::Error for ReorderError {}

/// Last place the camera was sent to by `fly_to_location`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationFix {
    pub label: String,
    pub at: LonLat,
}

/// Ordered imagery layers, top of the visual stack first.
///
/// Every layer in the sequence owns exactly one raster source and one
/// raster layer on the renderer, registered so that the first entry renders
/// topmost. The renderer draws later registrations above earlier ones, so
/// new layers are prepended and bulk re-registration walks the sequence
/// back to front.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
    pending: Vec<Layer>,
    config: LayerStackConfig,
    marker: Option<LonLat>,
    last_location: Option<LocationFix>,
}

impl LayerStack {
    pub fn new(config: LayerStackConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LayerStackConfig {
        &self.config
    }

    /// Layers from top to bottom.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn ids(&self) -> Vec<&LayerId> {
        self.layers.iter().map(|l| &l.id).collect()
    }

    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| &l.id == id)
    }

    pub fn top(&self) -> Option<&Layer> {
        self.layers.first()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers waiting for the renderer to finish loading.
    pub fn pending(&self) -> &[Layer] {
        &self.pending
    }

    pub fn marker(&self) -> Option<LonLat> {
        self.marker
    }

    pub fn last_location(&self) -> Option<&LocationFix> {
        self.last_location.as_ref()
    }

    /// Registers `layer` and makes it the top of the stack. An existing
    /// layer with the same id is torn down first.
    ///
    /// While the renderer is still loading the layer is parked until
    /// [`flush_pending`](Self::flush_pending).
    pub fn add_layer<E: MapEngine>(&mut self, map: &mut MapSession<E>, layer: Layer) {
        if !is_tile_template(&layer.tile_url_template) {
            warn!(layer = %layer.id, url = %layer.tile_url_template, "tile url lacks {{z}}/{{x}}/{{y}}");
        }
        if !map.is_ready() {
            debug!(layer = %layer.id, "renderer not ready, deferring layer");
            self.pending.retain(|p| p.id != layer.id);
            self.pending.push(layer);
            return;
        }

        let id = layer.id.clone();
        if raster::unregister(map, &id) {
            debug!(layer = %id, "replacing existing registration");
        }
        self.layers.retain(|l| l.id != id);

        match raster::register(map, &layer, self.config.tile_size) {
            Ok(()) => {
                info!(layer = %id, kind = %layer.processing_type, "layer added");
                self.layers.insert(0, layer);
            }
            Err(err) => {
                warn!(layer = %id, "layer registration failed: {err}");
                raster::unregister(map, &id);
            }
        }
    }

    /// Registers every parked layer in arrival order. Returns how many were
    /// flushed; `0` while the renderer is still loading.
    pub fn flush_pending<E: MapEngine>(&mut self, map: &mut MapSession<E>) -> usize {
        if !map.is_ready() || self.pending.is_empty() {
            return 0;
        }
        let pending = std::mem::take(&mut self.pending);
        let count = pending.len();
        for layer in pending {
            self.add_layer(map, layer);
        }
        debug!(count, "flushed pending layers");
        count
    }

    /// Removes the layer and its renderer pair. Returns `false` if absent.
    pub fn remove_layer<E: MapEngine>(&mut self, map: &mut MapSession<E>, id: &LayerId) -> bool {
        let was_pending = self.pending.len();
        self.pending.retain(|p| &p.id != id);
        if !map.is_ready() {
            return self.pending.len() != was_pending;
        }

        let Some(pos) = self.layers.iter().position(|l| &l.id == id) else {
            return self.pending.len() != was_pending;
        };
        raster::unregister(map, id);
        self.layers.remove(pos);
        info!(layer = %id, "layer removed");
        true
    }

    /// Removes every layer and the location marker.
    pub fn clear_all<E: MapEngine>(&mut self, map: &mut MapSession<E>) {
        self.pending.clear();
        if !map.is_ready() {
            return;
        }
        for layer in &self.layers {
            raster::unregister(map, &layer.id);
        }
        let count = self.layers.len();
        self.layers.clear();
        self.clear_markers(map);
        info!(count, "cleared layer stack");
    }

    /// Flips visibility. Returns the new state, or `None` if nothing changed.
    pub fn toggle_visibility<E: MapEngine>(
        &mut self,
        map: &mut MapSession<E>,
        id: &LayerId,
    ) -> Option<Visibility> {
        if !map.is_ready() {
            return None;
        }
        let layer = self.layers.iter_mut().find(|l| &l.id == id)?;
        let next = layer.visibility.toggled();
        match map.set_layout(
            &map_layer_id(id),
            VISIBILITY,
            Value::from(next.layout_value()),
        ) {
            Ok(()) => {
                layer.visibility = next;
                debug!(layer = %id, visibility = next.layout_value(), "visibility toggled");
                Some(next)
            }
            Err(err) => {
                warn!(layer = %id, "visibility update failed: {err}");
                None
            }
        }
    }

    /// Sets opacity clamped to `[0, 1]`. Returns the applied value.
    pub fn set_opacity<E: MapEngine>(
        &mut self,
        map: &mut MapSession<E>,
        id: &LayerId,
        opacity: f64,
    ) -> Option<f64> {
        if !map.is_ready() {
            return None;
        }
        let layer = self.layers.iter_mut().find(|l| &l.id == id)?;
        let opacity = clamp_unit(opacity);
        match map.set_paint(&map_layer_id(id), RASTER_OPACITY, Value::from(opacity)) {
            Ok(()) => {
                layer.opacity = opacity;
                Some(opacity)
            }
            Err(err) => {
                warn!(layer = %id, "opacity update failed: {err}");
                None
            }
        }
    }

    /// Adopts `order` (top first), which must name every layer exactly once,
    /// and re-registers all pairs so the renderer matches.
    pub fn reorder<E: MapEngine>(
        &mut self,
        map: &mut MapSession<E>,
        order: &[LayerId],
    ) -> Result<(), ReorderError> {
        if order.len() != self.layers.len() {
            return Err(ReorderError::LengthMismatch {
                expected: self.layers.len(),
                got: order.len(),
            });
        }
        let mut seen = BTreeSet::new();
        for id in order {
            if self.get(id).is_none() {
                return Err(ReorderError::UnknownLayer(id.clone()));
            }
            if !seen.insert(id) {
                return Err(ReorderError::DuplicateLayer(id.clone()));
            }
        }
        if !map.is_ready() {
            return Ok(());
        }

        for layer in &self.layers {
            raster::unregister(map, &layer.id);
        }
        let mut old = std::mem::take(&mut self.layers);
        let mut reordered = Vec::with_capacity(order.len());
        for id in order {
            if let Some(pos) = old.iter().position(|l| &l.id == id) {
                reordered.push(old.swap_remove(pos));
            }
        }

        // Bottom first so the head of `order` is registered last.
        let mut registered = Vec::with_capacity(reordered.len());
        for layer in reordered.into_iter().rev() {
            match raster::register(map, &layer, self.config.tile_size) {
                Ok(()) => registered.push(layer),
                Err(err) => {
                    warn!(layer = %layer.id, "re-registration failed, dropping layer: {err}");
                    raster::unregister(map, &layer.id);
                }
            }
        }
        registered.reverse();
        self.layers = registered;
        debug!(order = ?self.ids(), "layers reordered");
        Ok(())
    }

    pub fn resolve_anchor(&self, id: &LayerId) -> Option<Anchor> {
        self.get(id).and_then(resolve_anchor)
    }

    /// Flies to the layer's anchor at the zoom of its processing type.
    /// Returns the camera target, or `None` when no anchor resolves.
    pub fn focus_on<E: MapEngine>(
        &self,
        map: &mut MapSession<E>,
        id: &LayerId,
    ) -> Option<CameraTarget> {
        if !map.is_ready() {
            return None;
        }
        let Some(layer) = self.get(id) else {
            warn!(layer = %id, "focus on unknown layer");
            return None;
        };
        let Some(anchor) = resolve_anchor(layer) else {
            warn!(layer = %id, "no usable coordinates for layer");
            return None;
        };
        let target = CameraTarget {
            center: anchor.at,
            zoom: focus_zoom(&layer.processing_type),
            duration_ms: self.config.fly_duration_ms,
        };
        map.fly_to(target);
        Some(target)
    }

    /// Shows the location marker at `at`, replacing any previous one.
    pub fn set_marker<E: MapEngine>(&mut self, map: &mut MapSession<E>, at: LonLat) {
        map.remove_marker(LOCATION_MARKER_ID);
        map.add_marker(LOCATION_MARKER_ID, at);
        self.marker = Some(at);
    }

    pub fn clear_markers<E: MapEngine>(&mut self, map: &mut MapSession<E>) {
        map.remove_marker(LOCATION_MARKER_ID);
        self.marker = None;
    }

    /// Flies to a geocoded place. Zoomed-in views keep their zoom.
    pub fn fly_to_location<E: MapEngine>(
        &mut self,
        map: &mut MapSession<E>,
        label: &str,
        at: LonLat,
    ) -> CameraTarget {
        let current = map.zoom();
        let zoom = if current >= KEEP_ZOOM_FROM {
            current
        } else {
            self.config.location_zoom
        };
        let target = CameraTarget {
            center: at,
            zoom,
            duration_ms: self.config.location_fly_duration_ms,
        };
        map.fly_to(target);
        self.last_location = Some(LocationFix {
            label: label.to_string(),
            at,
        });
        target
    }
}
