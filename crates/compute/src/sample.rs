use std::fmt;

use foundation::math::LonLat;
use layers::LayerId;
use serde::Serialize;

/// Land-cover classes reported by categorical samples, by class id.
pub const LULC_CLASSES: [&str; 10] = [
    "Cultivated Land",
    "Forest",
    "Grassland",
    "Shrubland",
    "Water",
    "Wetlands",
    "Tundra",
    "Artificial Surface",
    "Bareland",
    "Snow and Ice",
];

/// Name of land-cover class `class_id` (1-based).
pub fn lulc_class_name(class_id: u8) -> Option<&'static str> {
    LULC_CLASSES.get(usize::from(class_id).checked_sub(1)?).copied()
}

/// One reading of one layer at one coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PixelSample {
    Continuous {
        label: &'static str,
        value: f64,
        unit: &'static str,
        min: f64,
        max: f64,
        /// Decimals shown when displayed.
        #[serde(skip)]
        precision: usize,
    },
    Categorical {
        label: &'static str,
        class_id: u8,
        class_name: &'static str,
    },
    Rgb {
        r: u8,
        g: u8,
        b: u8,
    },
    /// Products without a known value scale.
    Raw { label: String, value: f64 },
}

impl fmt::Display for PixelSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelSample::Continuous {
                label,
                value,
                unit,
                precision,
                ..
            } => {
                write!(f, "{label}: {value:.precision$}")?;
                if !unit.is_empty() {
                    write!(f, " {unit}")?;
                }
                Ok(())
            }
            PixelSample::Categorical {
                label,
                class_id,
                class_name,
            } => write!(f, "{label}: {class_name} (class {class_id})"),
            PixelSample::Rgb { r, g, b } => write!(f, "RGB Values: R {r}, G {g}, B {b}"),
            PixelSample::Raw { label, value } => write!(f, "{label}: {value:.3}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SampleError {
    UnknownLayer(LayerId),
    InvalidCoordinate(LonLat),
    /// A substituted sampler could not produce a value.
    Unavailable(String),
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleError::UnknownLayer(id) => write!(f, "layer {id} not found"),
            SampleError::InvalidCoordinate(at) => write!(f, "cannot sample at {at}"),
            SampleError::Unavailable(msg) => write!(f, "pixel value unavailable: {msg}"),
        }
    }
}

impl std::error::Error for SampleError {}
