use std::fmt;

use foundation::bounds::LonLatBounds;
use foundation::math::{
    DEFAULT_CIRCLE_STEPS, LonLat, close_polygon, cumulative_distance_km, distance_km,
    geodesic_circle,
};
use map::engine::MapEngine;
use map::session::MapSession;
use map::spec::{PointerEvent, PointerEventKind};
use serde_json::Value;
use tracing::{debug, info};

use crate::feature::{DrawnFeature, FeatureId, Geometry, Preview, feature_collection};
use crate::mode::{DrawMode, DrawType};
use crate::render;
use crate::session::{DrawSession, Phase};

/// Owner id of the drawing tools in the map's pointer listener registry.
pub const LISTENER_OWNER: &str = "draw";

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawConfig {
    /// Vertices of a circle ring, closing vertex excluded.
    pub circle_steps: usize,
    /// Rectangles narrower than this on both axes (degrees) are discarded.
    pub rectangle_epsilon_deg: f64,
    /// Circles below this radius are discarded.
    pub min_circle_radius_km: f64,
    /// A click this close to the last vertex is a repeat, not a new vertex.
    pub duplicate_click_epsilon_deg: f64,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            circle_steps: DEFAULT_CIRCLE_STEPS,
            rectangle_epsilon_deg: 1e-4,
            min_circle_radius_km: 0.01,
            duplicate_click_epsilon_deg: 1e-9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    NoActiveMode,
    TooFewPoints {
        draw_type: DrawType,
        needed: usize,
        got: usize,
    },
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawError::NoActiveMode => write!(f, "no drawing tool selected"),
            DrawError::TooFewPoints {
                draw_type,
                needed,
                got,
            } => write!(
                f,
                "need at least {needed} points to create a {}, got {got}",
                draw_type.as_str().to_ascii_lowercase()
            ),
        }
    }
}

impl std::error::Error for DrawError {}

/// What a pointer event did.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DrawOutcome {
    /// Not consumed by the active mode.
    Ignored,
    /// Buffer or preview changed.
    Updated,
    Committed(FeatureId),
    /// Degenerate gesture dropped without a trace.
    Discarded,
    /// Click seen in select mode.
    Acknowledged,
}

/// Multi-mode drawing state machine with undo history.
///
/// Committed features are append-only until undone or cleared. The engine
/// owns the `draw-*` and `temp-*` ids on the renderer and nothing else.
#[derive(Debug, Clone, Default)]
pub struct DrawEngine {
    config: DrawConfig,
    session: DrawSession,
    history: Vec<DrawnFeature>,
    next_id: u64,
}

impl DrawEngine {
    pub fn new(config: DrawConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    pub fn session(&self) -> &DrawSession {
        &self.session
    }

    pub fn active_mode(&self) -> Option<DrawMode> {
        self.session.mode
    }

    /// Committed features, oldest first.
    pub fn features(&self) -> &[DrawnFeature] {
        &self.history
    }

    pub fn feature(&self, id: FeatureId) -> Option<&DrawnFeature> {
        self.history.iter().find(|f| f.id == id)
    }

    /// Selects `mode`, or returns to idle if it is already active. Either
    /// way the shape in progress is dropped. Returns the new mode.
    pub fn select_mode<E: MapEngine>(
        &mut self,
        map: &mut MapSession<E>,
        mode: DrawMode,
    ) -> Option<DrawMode> {
        let next = if self.session.mode == Some(mode) {
            None
        } else {
            Some(mode)
        };
        self.set_mode(map, next);
        next
    }

    fn set_mode<E: MapEngine>(&mut self, map: &mut MapSession<E>, mode: Option<DrawMode>) {
        self.discard_in_progress(map);
        self.session.mode = mode;
        match mode {
            Some(m) => map.listen(LISTENER_OWNER, m.listened_events()),
            None => map.unlisten(LISTENER_OWNER),
        }
        debug!(mode = mode.map_or("idle", DrawMode::as_str), "draw mode");
    }

    /// Feeds one pointer event through the active mode.
    pub fn handle_pointer<E: MapEngine>(
        &mut self,
        map: &mut MapSession<E>,
        event: PointerEvent,
    ) -> Result<DrawOutcome, DrawError> {
        let Some(mode) = self.session.mode else {
            return Err(DrawError::NoActiveMode);
        };
        if !mode.listens_to(event.kind) {
            return Ok(DrawOutcome::Ignored);
        }
        let Some(draw_type) = mode.draw_type() else {
            debug!(at = %event.at, "select click");
            return Ok(DrawOutcome::Acknowledged);
        };

        use PointerEventKind::*;
        let outcome = match (draw_type, event.kind) {
            (DrawType::Point, Click) => {
                let id = self.commit(map, DrawType::Point, Geometry::Point(event.at), None, None);
                DrawOutcome::Committed(id)
            }
            (_, Click) => self.append_vertex(map, draw_type, event.at),
            (_, DoubleClick) => return self.finish_shape(map, draw_type),
            (t, MouseMove) if t.accumulates() => self.track_pointer(map, draw_type, event.at),
            (_, MouseDown) => {
                self.discard_in_progress(map);
                self.session.drag_origin = Some(event.at);
                DrawOutcome::Updated
            }
            (_, MouseMove) => self.drag_to(map, draw_type, event.at),
            (_, MouseUp) => self.release(map, draw_type, event.at),
        };
        Ok(outcome)
    }

    fn append_vertex<E: MapEngine>(
        &mut self,
        map: &mut MapSession<E>,
        draw_type: DrawType,
        at: LonLat,
    ) -> DrawOutcome {
        let repeat = self
            .session
            .buffer
            .last()
            .is_some_and(|last| last.approx_eq(at, self.config.duplicate_click_epsilon_deg));
        if repeat {
            return DrawOutcome::Ignored;
        }
        self.session.buffer.push(at);
        let preview = sketch(draw_type, &self.session.buffer);
        self.show_preview(map, preview);
        DrawOutcome::Updated
    }

    fn track_pointer<E: MapEngine>(
        &mut self,
        map: &mut MapSession<E>,
        draw_type: DrawType,
        at: LonLat,
    ) -> DrawOutcome {
        if self.session.buffer.is_empty() {
            return DrawOutcome::Ignored;
        }
        self.session.pointer = Some(at);
        let mut points = self.session.buffer.clone();
        points.push(at);
        self.show_preview(map, sketch(draw_type, &points));
        DrawOutcome::Updated
    }

    fn finish_shape<E: MapEngine>(
        &mut self,
        map: &mut MapSession<E>,
        draw_type: DrawType,
    ) -> Result<DrawOutcome, DrawError> {
        let got = self.session.buffer.len();
        let needed = draw_type.min_points();
        if got < needed {
            return Err(DrawError::TooFewPoints {
                draw_type,
                needed,
                got,
            });
        }

        let points = std::mem::take(&mut self.session.buffer);
        let (geometry, measurement) = match draw_type {
            DrawType::Polygon => {
                // Finished polygons are always closed, two vertices included.
                let mut ring = points;
                ring.push(ring[0]);
                (Geometry::Polygon(ring), None)
            }
            DrawType::Measure => {
                let km = cumulative_distance_km(&points);
                (Geometry::LineString(points), Some(km))
            }
            _ => (Geometry::LineString(points), None),
        };
        let id = self.commit(map, draw_type, geometry, measurement, None);
        Ok(DrawOutcome::Committed(id))
    }

    fn drag_to<E: MapEngine>(
        &mut self,
        map: &mut MapSession<E>,
        draw_type: DrawType,
        at: LonLat,
    ) -> DrawOutcome {
        let Some(origin) = self.session.drag_origin else {
            return DrawOutcome::Ignored;
        };
        self.session.pointer = Some(at);
        let geometry = match draw_type {
            DrawType::Circle => {
                let radius = distance_km(origin, at);
                Geometry::Polygon(geodesic_circle(origin, radius, self.config.circle_steps))
            }
            _ => Geometry::Polygon(LonLatBounds::from_corners(origin, at).ring()),
        };
        self.show_preview(
            map,
            Some(Preview {
                draw_type,
                geometry,
            }),
        );
        DrawOutcome::Updated
    }

    fn release<E: MapEngine>(
        &mut self,
        map: &mut MapSession<E>,
        draw_type: DrawType,
        at: LonLat,
    ) -> DrawOutcome {
        let Some(origin) = self.session.drag_origin else {
            return DrawOutcome::Ignored;
        };

        let committed = match draw_type {
            DrawType::Circle => {
                let radius = distance_km(origin, at);
                (radius >= self.config.min_circle_radius_km).then(|| {
                    let ring = geodesic_circle(origin, radius, self.config.circle_steps);
                    (Geometry::Polygon(ring), Some((radius, origin)))
                })
            }
            _ => {
                let bounds = LonLatBounds::from_corners(origin, at);
                (!bounds.is_degenerate(self.config.rectangle_epsilon_deg))
                    .then(|| (Geometry::Polygon(bounds.ring()), None))
            }
        };

        match committed {
            Some((geometry, circle)) => {
                let id = self.commit(map, draw_type, geometry, None, circle);
                DrawOutcome::Committed(id)
            }
            None => {
                debug!(shape = %draw_type, "degenerate gesture discarded");
                self.discard_in_progress(map);
                DrawOutcome::Discarded
            }
        }
    }

    fn commit<E: MapEngine>(
        &mut self,
        map: &mut MapSession<E>,
        draw_type: DrawType,
        geometry: Geometry,
        measurement_km: Option<f64>,
        circle: Option<(f64, LonLat)>,
    ) -> FeatureId {
        self.next_id += 1;
        let id = FeatureId(self.next_id);
        self.history.push(DrawnFeature {
            id,
            draw_type,
            geometry,
            measurement_km,
            radius_km: circle.map(|(r, _)| r),
            center: circle.map(|(_, c)| c),
        });
        info!(feature = %id, shape = %draw_type, "feature committed");

        self.discard_in_progress(map);
        render::render_committed(map, &self.history);
        id
    }

    fn show_preview<E: MapEngine>(&mut self, map: &mut MapSession<E>, preview: Option<Preview>) {
        match &preview {
            Some(p) => render::render_preview(map, p),
            None => render::clear_preview(map),
        }
        self.session.preview = preview;
    }

    fn discard_in_progress<E: MapEngine>(&mut self, map: &mut MapSession<E>) {
        self.session.reset();
        render::clear_preview(map);
    }

    /// Removes the most recent feature. `None` when the history is empty.
    pub fn undo<E: MapEngine>(&mut self, map: &mut MapSession<E>) -> Option<DrawnFeature> {
        let undone = self.history.pop()?;
        render::render_committed(map, &self.history);
        info!(feature = %undone.id, "feature undone");
        Some(undone)
    }

    /// Drops every feature and the shape in progress; the mode is kept.
    pub fn clear_all<E: MapEngine>(&mut self, map: &mut MapSession<E>) {
        self.history.clear();
        self.discard_in_progress(map);
        render::clear_committed(map);
        info!("annotations cleared");
    }

    /// Aborts the shape in progress. History is untouched.
    pub fn cancel_current<E: MapEngine>(&mut self, map: &mut MapSession<E>) {
        self.discard_in_progress(map);
    }

    /// Committed features as a `FeatureCollection`, oldest first.
    pub fn export_geojson(&self) -> Value {
        feature_collection(&self.history)
    }

    /// Length of the measurement in progress including the pointer leg.
    pub fn live_measurement(&self) -> Option<f64> {
        if self.session.mode != Some(DrawMode::Draw(DrawType::Measure))
            || self.session.buffer.is_empty()
        {
            return None;
        }
        let mut points = self.session.buffer.clone();
        points.extend(self.session.pointer);
        Some(cumulative_distance_km(&points))
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }
}

/// Preview geometry for a vertex buffer.
fn sketch(draw_type: DrawType, points: &[LonLat]) -> Option<Preview> {
    let geometry = match points {
        [] => return None,
        [p] => Geometry::Point(*p),
        _ if draw_type == DrawType::Polygon && points.len() > 2 => {
            Geometry::Polygon(close_polygon(points))
        }
        _ => Geometry::LineString(points.to_vec()),
    };
    Some(Preview {
        draw_type,
        geometry,
    })
}
