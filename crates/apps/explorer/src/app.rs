use backend::{resolve_prompt, BackendError, QueryBackend, ResolvedQuery};
use catalog::{LayerRecord, LayerStore};
use compute::{HashSampler, Inspector, PixelReading, PixelSampler};
use drawing::{DrawConfig, DrawEngine, DrawError, DrawMode, DrawOutcome, DrawnFeature};
use foundation::math::LonLat;
use layers::{Layer, LayerId, LayerStack, Visibility};
use map::recording::RecordingMap;
use map::session::MapSession;
use map::spec::{CameraTarget, PointerEvent};
use runtime::{Advisory, AdvisoryLevel, ChatMessage, EventBus, SubscriberId};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::ExplorerConfig;

/// One interactive session: the map, everything drawn on it and the
/// channel the panels listen on.
///
/// Every failure ends up as an [`Advisory`] on the bus; no operation
/// leaves the session unusable.
pub struct App {
    config: ExplorerConfig,
    map: MapSession,
    stack: LayerStack,
    draw: DrawEngine,
    inspector: Inspector,
    bus: EventBus,
    sampler: Box<dyn PixelSampler>,
    store: Box<dyn LayerStore>,
}

impl App {
    pub fn new(config: ExplorerConfig, store: Box<dyn LayerStore>) -> Self {
        Self::with_map(config, MapSession::new(RecordingMap::new()), store)
    }

    pub fn with_map(config: ExplorerConfig, map: MapSession, store: Box<dyn LayerStore>) -> Self {
        let stack = LayerStack::new(config.stack_config());
        Self {
            config,
            map,
            stack,
            draw: DrawEngine::new(DrawConfig::default()),
            inspector: Inspector::new(),
            bus: EventBus::new(),
            sampler: Box::new(HashSampler),
            store,
        }
    }

    pub fn map(&self) -> &MapSession {
        &self.map
    }

    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    pub fn subscribe(&mut self) -> SubscriberId {
        self.bus.subscribe()
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    fn advise(&mut self, advisory: Advisory) {
        match advisory.level {
            AdvisoryLevel::Error | AdvisoryLevel::Warning => warn!("{advisory}"),
            AdvisoryLevel::Info | AdvisoryLevel::Success => info!("{advisory}"),
        }
        self.bus.advise(advisory);
    }

    /// The renderer finished loading: layers added meanwhile are registered.
    pub fn map_loaded(&mut self) -> usize {
        self.map.engine_mut().set_loaded(true);
        self.stack.flush_pending(&mut self.map)
    }

    /// Re-adds the user's saved layers, oldest first so the newest ends on
    /// top.
    pub fn restore_saved(&mut self) -> usize {
        let records = match self.store.list(&self.config.user_id) {
            Ok(records) => records,
            Err(err) => {
                self.advise(Advisory::error(format!("Could not load saved layers: {err}")));
                return 0;
            }
        };
        let mut restored = 0;
        for record in records {
            match record.into_layer() {
                Ok(layer) => {
                    self.stack.add_layer(&mut self.map, layer);
                    restored += 1;
                }
                Err(err) => warn!("skipping saved layer: {err}"),
            }
        }
        restored
    }

    pub async fn submit_prompt(
        &mut self,
        backend: &dyn QueryBackend,
        prompt: &str,
    ) -> Option<LayerId> {
        if !prompt.trim().is_empty() {
            self.bus.chat(ChatMessage::prompt(prompt.trim()));
        }
        let result = resolve_prompt(backend, prompt, self.config.default_opacity).await;
        self.apply_query(result)
    }

    /// Stacks a resolved query, or reports why there is nothing to stack.
    pub fn apply_query(&mut self, result: Result<ResolvedQuery, BackendError>) -> Option<LayerId> {
        let ResolvedQuery { layer, location } = match result {
            Ok(resolved) => resolved,
            Err(err) => {
                self.bus.chat(ChatMessage::response(err.to_string()));
                self.advise(Advisory::error(err.to_string()));
                return None;
            }
        };

        let id = layer.id.clone();
        let added = format!("Added layer: {}", layer.label());
        self.add_layer(layer);
        if let Some(fix) = location {
            self.stack.set_marker(&mut self.map, fix.at);
            self.stack.fly_to_location(&mut self.map, &fix.label, fix.at);
        }
        self.bus.chat(ChatMessage::response(added.clone()));
        self.advise(Advisory::success(added));
        Some(id)
    }

    /// Stacks `layer` on top and saves it for the user.
    pub fn add_layer(&mut self, layer: Layer) {
        self.persist(&layer);
        self.stack.add_layer(&mut self.map, layer);
    }

    fn persist(&mut self, layer: &Layer) {
        let saved = self
            .store
            .save(&self.config.user_id, layer.id.as_str(), LayerRecord::from(layer));
        if let Err(err) = saved {
            self.advise(Advisory::warning(format!("Layer {} not saved: {err}", layer.id)));
        }
    }

    fn persist_current(&mut self, id: &LayerId) {
        if let Some(layer) = self.stack.get(id).cloned() {
            self.persist(&layer);
        }
    }

    pub fn remove_layer(&mut self, id: &LayerId) -> bool {
        let removed = self.stack.remove_layer(&mut self.map, id);
        self.inspector.retain_stack(&self.stack);
        if let Err(err) = self.store.delete(&self.config.user_id, id.as_str()) {
            self.advise(Advisory::warning(format!("Saved copy of {id} kept: {err}")));
        }
        removed
    }

    pub fn clear_layers(&mut self) {
        self.stack.clear_all(&mut self.map);
        self.inspector.clear_all();
        match self.store.clear_all(&self.config.user_id) {
            Ok(_) => self.advise(Advisory::info("All layers cleared")),
            Err(err) => self.advise(Advisory::warning(format!("Saved layers kept: {err}"))),
        }
    }

    pub fn toggle_layer(&mut self, id: &LayerId) -> Option<Visibility> {
        let visibility = self.stack.toggle_visibility(&mut self.map, id)?;
        self.persist_current(id);
        Some(visibility)
    }

    pub fn set_opacity(&mut self, id: &LayerId, opacity: f64) -> Option<f64> {
        let applied = self.stack.set_opacity(&mut self.map, id, opacity)?;
        self.persist_current(id);
        Some(applied)
    }

    /// `order` lists every layer id, top first.
    pub fn reorder(&mut self, order: &[LayerId]) -> bool {
        match self.stack.reorder(&mut self.map, order) {
            Ok(()) => true,
            Err(err) => {
                self.advise(Advisory::error(format!("Cannot reorder layers: {err}")));
                false
            }
        }
    }

    /// A layer without a usable anchor leaves the camera where it is.
    pub fn focus(&mut self, id: &LayerId) -> Option<CameraTarget> {
        self.stack.focus_on(&mut self.map, id)
    }

    pub fn select_mode(&mut self, mode: DrawMode) -> Option<DrawMode> {
        self.draw.select_mode(&mut self.map, mode)
    }

    /// Routes a pointer event to the drawing tools.
    pub fn pointer(&mut self, event: PointerEvent) -> Option<DrawOutcome> {
        match self.draw.handle_pointer(&mut self.map, event) {
            Ok(DrawOutcome::Committed(id)) => {
                let measured = self.draw.feature(id).and_then(|f| f.measurement_km);
                if let Some(km) = measured {
                    self.advise(Advisory::info(format!("Total distance: {km:.2} km")));
                }
                Some(DrawOutcome::Committed(id))
            }
            Ok(outcome) => Some(outcome),
            Err(err @ DrawError::NoActiveMode) => {
                self.advise(Advisory::info(format!("Ignored {}: {err}", event.kind.as_str())));
                None
            }
            Err(err) => {
                self.advise(Advisory::error(err.to_string()));
                None
            }
        }
    }

    pub fn undo(&mut self) -> Option<DrawnFeature> {
        let undone = self.draw.undo(&mut self.map);
        match undone {
            Some(_) => self.advise(Advisory::info("Last action undone")),
            None => self.advise(Advisory::info("Nothing to undo")),
        }
        undone
    }

    /// Drops the shape in progress, whether clicked or dragged.
    pub fn cancel_drawing(&mut self) {
        let session = self.draw.session();
        if session.is_drawing() || !session.buffer().is_empty() {
            self.draw.cancel_current(&mut self.map);
            self.advise(Advisory::info("Drawing cancelled"));
        }
    }

    pub fn clear_drawings(&mut self) {
        self.draw.clear_all(&mut self.map);
    }

    /// Distance measured so far, including the segment to the pointer.
    pub fn measurement_km(&self) -> Option<f64> {
        self.draw.live_measurement()
    }

    pub fn inspect(&mut self, id: &LayerId, at: LonLat) -> Option<PixelReading> {
        let reading = self
            .inspector
            .inspect(self.sampler.as_ref(), &self.stack, id, at)
            .cloned();
        match reading {
            Ok(reading) => Some(reading),
            Err(err) => {
                self.advise(Advisory::error(err.to_string()));
                None
            }
        }
    }

    pub fn export_geojson(&self) -> Value {
        self.draw.export_geojson()
    }
}
