//! Scripted sessions: a JSON list of user actions replayed against the
//! in-memory map.

use backend::{QueryResponse, StaticBackend};
use catalog::{InMemoryLayerStore, LayerRecord};
use drawing::DrawMode;
use foundation::math::LonLat;
use layers::LayerId;
use map::recording::RecordingMap;
use map::session::MapSession;
use map::spec::{PointerEvent, PointerEventKind};
use runtime::{Advisory, BusMessage};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::app::App;
use crate::config::ExplorerConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Start with a renderer that is still loading; a `map_loaded` action
    /// finishes it.
    #[serde(default)]
    pub map_loads_late: bool,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    MapLoaded,
    /// Submits `prompt`; the service answers with `response`.
    Query {
        prompt: String,
        response: QueryResponse,
    },
    AddLayer {
        layer: LayerRecord,
    },
    RemoveLayer {
        id: LayerId,
    },
    ToggleLayer {
        id: LayerId,
    },
    SetOpacity {
        id: LayerId,
        opacity: f64,
    },
    Reorder {
        ids: Vec<LayerId>,
    },
    Focus {
        id: LayerId,
    },
    ClearLayers,
    SelectMode {
        mode: String,
    },
    Pointer {
        event: String,
        lon: f64,
        lat: f64,
    },
    Undo,
    Cancel,
    ClearDrawings,
    Sample {
        id: LayerId,
        lon: f64,
        lat: f64,
    },
}

/// What a replay left behind.
#[derive(Debug, Clone)]
pub struct ReplayReport {
    pub actions: usize,
    /// Stack ids, top first.
    pub layers: Vec<String>,
    /// Renderer layer ids, bottom first.
    pub render_order: Vec<String>,
    pub messages: Vec<BusMessage>,
    /// One line per pixel sample taken.
    pub samples: Vec<String>,
    pub measurement_km: Option<f64>,
    pub export: Value,
}

pub fn parse(raw: &str) -> Result<Script, serde_json::Error> {
    serde_json::from_str(raw)
}

pub async fn replay(config: ExplorerConfig, script: Script) -> ReplayReport {
    let engine = if script.map_loads_late {
        RecordingMap::unloaded()
    } else {
        RecordingMap::new()
    };
    let mut app = App::with_map(
        config,
        MapSession::new(engine),
        Box::new(InMemoryLayerStore::new()),
    );
    let console = app.subscribe();
    let mut samples = Vec::new();
    let actions = script.actions.len();

    for (step, action) in script.actions.into_iter().enumerate() {
        debug!(step, ?action, "replay");
        match action {
            Action::MapLoaded => {
                app.map_loaded();
            }
            Action::Query { prompt, response } => {
                let backend = StaticBackend::new().with_answer(&prompt, response);
                app.submit_prompt(&backend, &prompt).await;
            }
            Action::AddLayer { layer } => match layer.into_layer() {
                Ok(layer) => app.add_layer(layer),
                Err(err) => {
                    app.bus_mut().advise(Advisory::error(err.to_string()));
                }
            },
            Action::RemoveLayer { id } => {
                app.remove_layer(&id);
            }
            Action::ToggleLayer { id } => {
                app.toggle_layer(&id);
            }
            Action::SetOpacity { id, opacity } => {
                app.set_opacity(&id, opacity);
            }
            Action::Reorder { ids } => {
                app.reorder(&ids);
            }
            Action::Focus { id } => {
                app.focus(&id);
            }
            Action::ClearLayers => app.clear_layers(),
            Action::SelectMode { mode } => match DrawMode::parse(&mode) {
                Some(mode) => {
                    app.select_mode(mode);
                }
                None => {
                    app.bus_mut()
                        .advise(Advisory::error(format!("Unknown drawing mode: {mode}")));
                }
            },
            Action::Pointer { event, lon, lat } => match PointerEventKind::parse(&event) {
                Some(kind) => {
                    app.pointer(PointerEvent::new(kind, LonLat::new(lon, lat)));
                }
                None => {
                    app.bus_mut()
                        .advise(Advisory::error(format!("Unknown pointer event: {event}")));
                }
            },
            Action::Undo => {
                app.undo();
            }
            Action::Cancel => app.cancel_drawing(),
            Action::ClearDrawings => app.clear_drawings(),
            Action::Sample { id, lon, lat } => {
                if let Some(reading) = app.inspect(&id, LonLat::new(lon, lat)) {
                    samples.push(format!("{} @ {}: {}", reading.layer, reading.at, reading.sample));
                }
            }
        }
    }

    let messages = app
        .bus_mut()
        .drain(console)
        .into_iter()
        .map(|e| e.message)
        .collect();
    ReplayReport {
        actions,
        layers: app.stack().ids().iter().map(|id| id.to_string()).collect(),
        render_order: app
            .map()
            .engine()
            .render_order()
            .into_iter()
            .map(str::to_string)
            .collect(),
        messages,
        samples,
        measurement_km: app.measurement_km(),
        export: app.export_geojson(),
    }
}
