use foundation::math::LonLat;

use crate::feature::Preview;
use crate::mode::DrawMode;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Collecting vertices, or waiting for the next click.
    Accumulating,
    /// Between press and release of a rectangle or circle gesture.
    Dragging,
}

/// Ephemeral interaction state of the drawing tools.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawSession {
    pub(crate) mode: Option<DrawMode>,
    pub(crate) buffer: Vec<LonLat>,
    pub(crate) drag_origin: Option<LonLat>,
    pub(crate) pointer: Option<LonLat>,
    pub(crate) preview: Option<Preview>,
}

impl DrawSession {
    pub fn mode(&self) -> Option<DrawMode> {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        match (self.mode, self.drag_origin) {
            (None, _) => Phase::Idle,
            (Some(_), Some(_)) => Phase::Dragging,
            (Some(_), None) => Phase::Accumulating,
        }
    }

    /// Vertices collected for the shape in progress.
    pub fn buffer(&self) -> &[LonLat] {
        &self.buffer
    }

    pub fn is_drawing(&self) -> bool {
        self.drag_origin.is_some()
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    /// Last pointer position seen while a shape was in progress.
    pub fn pointer(&self) -> Option<LonLat> {
        self.pointer
    }

    /// Drops the shape in progress; the mode is kept.
    pub(crate) fn reset(&mut self) {
        self.buffer.clear();
        self.drag_origin = None;
        self.pointer = None;
        self.preview = None;
    }
}
