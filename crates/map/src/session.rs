use std::collections::{BTreeMap, BTreeSet};

use foundation::math::LonLat;
use serde_json::Value;
use tracing::{debug, warn};

use crate::engine::{MapEngine, MapError};
use crate::recording::RecordingMap;
use crate::spec::{CameraTarget, LayerSpec, PointerEventKind, SourceSpec};

/// The single long-lived map instance of an application session.
///
/// Owned by the application and passed by `&mut` into every component that
/// touches the map. Components register under their own id prefixes; the
/// session adds idempotent helpers and a per-owner pointer listener registry
/// on top of the raw [`MapEngine`].
#[derive(Debug)]
pub struct MapSession<E: MapEngine = RecordingMap> {
    engine: E,
    listeners: BTreeMap<String, BTreeSet<PointerEventKind>>,
}

impl<E: MapEngine + Default> Default for MapSession<E> {
    fn default() -> Self {
        Self::new(E::default())
    }
}

impl<E: MapEngine> MapSession<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            listeners: BTreeMap::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_loaded()
    }

    pub fn has_source(&self, id: &str) -> bool {
        self.engine.has_source(id)
    }

    pub fn has_layer(&self, id: &str) -> bool {
        self.engine.has_layer(id)
    }

    pub fn add_source(&mut self, id: &str, source: SourceSpec) -> Result<(), MapError> {
        debug!(source = id, "add source");
        self.engine.add_source(id, source)
    }

    pub fn add_layer(&mut self, layer: LayerSpec) -> Result<(), MapError> {
        debug!(layer = %layer.id, source = %layer.source, "add layer");
        self.engine.add_layer(layer)
    }

    /// Removes `id` if registered. Returns `true` if something was removed.
    pub fn remove_layer_if_present(&mut self, id: &str) -> bool {
        if !self.engine.has_layer(id) {
            return false;
        }
        match self.engine.remove_layer(id) {
            Ok(()) => true,
            Err(err) => {
                warn!(layer = id, "remove layer failed: {err}");
                false
            }
        }
    }

    /// Removes `id` if registered. Layers drawing from it must be gone first.
    pub fn remove_source_if_present(&mut self, id: &str) -> bool {
        if !self.engine.has_source(id) {
            return false;
        }
        match self.engine.remove_source(id) {
            Ok(()) => true,
            Err(err) => {
                warn!(source = id, "remove source failed: {err}");
                false
            }
        }
    }

    pub fn set_paint(&mut self, layer: &str, name: &str, value: Value) -> Result<(), MapError> {
        self.engine.set_paint_property(layer, name, value)
    }

    pub fn set_layout(&mut self, layer: &str, name: &str, value: Value) -> Result<(), MapError> {
        self.engine.set_layout_property(layer, name, value)
    }

    pub fn layout(&self, layer: &str, name: &str) -> Option<Value> {
        self.engine.layout_property(layer, name)
    }

    pub fn fly_to(&mut self, target: CameraTarget) {
        debug!(
            lon = target.center.lon,
            lat = target.center.lat,
            zoom = target.zoom,
            "fly to"
        );
        self.engine.fly_to(target);
    }

    pub fn zoom(&self) -> f64 {
        self.engine.zoom()
    }

    pub fn add_marker(&mut self, id: &str, at: LonLat) {
        self.engine.add_marker(id, at);
    }

    pub fn remove_marker(&mut self, id: &str) -> bool {
        self.engine.remove_marker(id)
    }

    /// Replaces the pointer events `owner` listens to. An empty set
    /// unregisters the owner.
    pub fn listen(&mut self, owner: &str, kinds: &[PointerEventKind]) {
        if kinds.is_empty() {
            self.unlisten(owner);
            return;
        }
        let set: BTreeSet<PointerEventKind> = kinds.iter().copied().collect();
        debug!(owner, events = ?set, "pointer listeners");
        self.listeners.insert(owner.to_string(), set);
    }

    pub fn unlisten(&mut self, owner: &str) {
        if self.listeners.remove(owner).is_some() {
            debug!(owner, "pointer listeners removed");
        }
    }

    pub fn is_listening(&self, owner: &str, kind: PointerEventKind) -> bool {
        self.listeners
            .get(owner)
            .is_some_and(|set| set.contains(&kind))
    }

    pub fn listeners(&self, owner: &str) -> Vec<PointerEventKind> {
        self.listeners
            .get(owner)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::MapSession;
    use crate::recording::RecordingMap;
    use crate::spec::{LayerKind, LayerSpec, PointerEventKind, SourceSpec};
    use serde_json::json;

    #[test]
    fn idempotent_removal_tolerates_missing_ids() {
        let mut session = MapSession::new(RecordingMap::new());
        assert!(!session.remove_layer_if_present("nope"));
        assert!(!session.remove_source_if_present("nope"));

        session
            .add_source("s", SourceSpec::GeoJson { data: json!({}) })
            .unwrap();
        session
            .add_layer(LayerSpec::new("l", "s", LayerKind::Fill))
            .unwrap();
        // Source still referenced by "l".
        assert!(!session.remove_source_if_present("s"));
        assert!(session.remove_layer_if_present("l"));
        assert!(session.remove_source_if_present("s"));
        assert!(session.engine().source_ids().is_empty());
    }

    #[test]
    fn listeners_are_replaced_per_owner() {
        let mut session: MapSession = MapSession::default();
        session.listen("draw", &[PointerEventKind::Click]);
        assert!(session.is_listening("draw", PointerEventKind::Click));

        session.listen(
            "draw",
            &[PointerEventKind::MouseDown, PointerEventKind::MouseUp],
        );
        assert!(!session.is_listening("draw", PointerEventKind::Click));
        assert_eq!(
            session.listeners("draw"),
            vec![PointerEventKind::MouseDown, PointerEventKind::MouseUp]
        );

        session.listen("draw", &[]);
        assert!(session.listeners("draw").is_empty());
    }
}
