use std::fmt;

use map::spec::PointerEventKind;

/// Geometry kinds a user can author.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DrawType {
    Point,
    Line,
    Polygon,
    Rectangle,
    Circle,
    Measure,
}

impl DrawType {
    pub const ALL: [DrawType; 6] = [
        DrawType::Point,
        DrawType::Line,
        DrawType::Polygon,
        DrawType::Rectangle,
        DrawType::Circle,
        DrawType::Measure,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DrawType::Point => "POINT",
            DrawType::Line => "LINE",
            DrawType::Polygon => "POLYGON",
            DrawType::Rectangle => "RECTANGLE",
            DrawType::Circle => "CIRCLE",
            DrawType::Measure => "MEASURE",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(raw))
    }

    /// Stroke/fill color of features of this type.
    pub fn color(self) -> &'static str {
        match self {
            DrawType::Point => "#FF5733",
            DrawType::Line => "#33A1FF",
            DrawType::Polygon => "#33FF57",
            DrawType::Rectangle => "#FF33E9",
            DrawType::Circle => "#FFCE33",
            DrawType::Measure => "#33FFCE",
        }
    }

    /// Built from a vertex buffer closed by double-click.
    pub fn accumulates(self) -> bool {
        matches!(self, DrawType::Line | DrawType::Polygon | DrawType::Measure)
    }

    /// Built from a press-drag-release gesture.
    pub fn drags(self) -> bool {
        matches!(self, DrawType::Rectangle | DrawType::Circle)
    }

    /// Vertices needed before a double-click can finish the shape.
    pub fn min_points(self) -> usize {
        match self {
            DrawType::Polygon | DrawType::Line | DrawType::Measure => 2,
            DrawType::Point | DrawType::Rectangle | DrawType::Circle => 1,
        }
    }
}

impl fmt::Display for DrawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tool selected in the drawing toolbar.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DrawMode {
    Draw(DrawType),
    /// Feature selection; clicks are acknowledged only.
    Select,
}

impl DrawMode {
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().eq_ignore_ascii_case("SELECT") {
            return Some(DrawMode::Select);
        }
        DrawType::parse(raw).map(DrawMode::Draw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DrawMode::Draw(t) => t.as_str(),
            DrawMode::Select => "SELECT",
        }
    }

    pub fn draw_type(self) -> Option<DrawType> {
        match self {
            DrawMode::Draw(t) => Some(t),
            DrawMode::Select => None,
        }
    }

    /// Pointer events this mode consumes; everything else is ignored.
    pub fn listened_events(self) -> &'static [PointerEventKind] {
        use PointerEventKind::*;

        match self {
            DrawMode::Select | DrawMode::Draw(DrawType::Point) => &[Click],
            DrawMode::Draw(DrawType::Line | DrawType::Polygon | DrawType::Measure) => {
                &[Click, MouseMove, DoubleClick]
            }
            DrawMode::Draw(DrawType::Rectangle | DrawType::Circle) => {
                &[MouseDown, MouseMove, MouseUp]
            }
        }
    }

    pub fn listens_to(self, kind: PointerEventKind) -> bool {
        self.listened_events().contains(&kind)
    }
}

impl fmt::Display for DrawMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{DrawMode, DrawType};
    use map::spec::PointerEventKind;

    #[test]
    fn modes_parse_case_insensitively() {
        assert_eq!(DrawMode::parse("polygon"), Some(DrawMode::Draw(DrawType::Polygon)));
        assert_eq!(DrawMode::parse(" Select "), Some(DrawMode::Select));
        assert_eq!(DrawMode::parse("lasso"), None);
    }

    #[test]
    fn drag_modes_never_listen_for_clicks() {
        for t in [DrawType::Rectangle, DrawType::Circle] {
            let mode = DrawMode::Draw(t);
            assert!(!mode.listens_to(PointerEventKind::Click));
            assert!(mode.listens_to(PointerEventKind::MouseDown));
        }
        assert!(DrawMode::Draw(DrawType::Measure).listens_to(PointerEventKind::DoubleClick));
        assert!(!DrawMode::Draw(DrawType::Point).listens_to(PointerEventKind::MouseMove));
    }
}
