//! Per-processing-type presentation table: focus zoom and legend.

use crate::processing::ProcessingType;

/// Zoom used for types without a dedicated entry.
pub const DEFAULT_FOCUS_ZOOM: f64 = 10.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LegendCategory {
    pub color: &'static str,
    pub label: &'static str,
}

impl LegendCategory {
    pub const fn new(color: &'static str, label: &'static str) -> Self {
        Self { color, label }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LegendScale {
    /// Continuous color ramp, low to high.
    Gradient {
        stops: &'static [&'static str],
        min: &'static str,
        max: &'static str,
    },
    Categories(&'static [LegendCategory]),
    /// True-color products need no scale.
    None,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Legend {
    pub title: &'static str,
    pub scale: LegendScale,
    pub description: &'static str,
}

/// Everything the front end shows for one processing type.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Symbology {
    pub focus_zoom: f64,
    pub legend: Option<Legend>,
}

const NDVI_STOPS: &[&str] = &[
    "#CE7E45", "#DF923D", "#F1B555", "#FCD163", "#99B718", "#74A901", "#66A000", "#529400",
    "#3E8601", "#056201", "#004C00",
];
const WATER_STOPS: &[&str] = &[
    "#ffffff", "#d4e7ff", "#a8d1ff", "#7cbaff", "#51a3ff", "#258cff", "#0075ff", "#005ebf",
    "#004080",
];
const LST_STOPS: &[&str] = &[
    "#040274", "#307ef3", "#30c8e2", "#86e26f", "#ffd611", "#ff8b13", "#ff0000",
];
const BUILDING_STOPS: &[&str] = &[
    "#0000FF", "#00FFFF", "#00FF00", "#FFFF00", "#FF8C00", "#FF0000",
];
const LOSS_STOPS: &[&str] = &["#ffff00", "#ffaa00", "#ff5500", "#ff0000"];
const TREE_STOPS: &[&str] = &["#FFFFCC", "#C2E699", "#78C679", "#31A354", "#006837"];

const LULC_CLASSES: &[LegendCategory] = &[
    LegendCategory::new("#006400", "Tree cover"),
    LegendCategory::new("#ffbb22", "Shrubland"),
    LegendCategory::new("#ffff4c", "Grassland"),
    LegendCategory::new("#f096ff", "Cropland"),
    LegendCategory::new("#fa0000", "Built-up"),
    LegendCategory::new("#b4b4b4", "Bare/sparse"),
    LegendCategory::new("#0064c8", "Water"),
];
const GAIN_CLASSES: &[LegendCategory] = &[LegendCategory::new("#00FF00", "Forest Gain")];
const SAR_CLASSES: &[LegendCategory] = &[
    LegendCategory::new("#FFFFFF", "High backscatter"),
    LegendCategory::new("#888888", "Medium backscatter"),
    LegendCategory::new("#000000", "Low backscatter"),
];
const FLOOD_CLASSES: &[LegendCategory] = &[LegendCategory::new("#0000FF", "Detected Water")];

/// Looks up the table entry for `pt`. Unknown types get the default zoom
/// and no legend.
pub fn symbology(pt: &ProcessingType) -> Symbology {
    use ProcessingType as P;

    let (focus_zoom, legend) = match pt {
        P::Rgb => (
            12.0,
            Legend {
                title: "RGB Imagery",
                scale: LegendScale::None,
                description: "True color imagery shows Earth as it would appear to the human eye from space.",
            },
        ),
        P::Ndvi => (
            11.0,
            Legend {
                title: "Vegetation Index (NDVI)",
                scale: LegendScale::Gradient {
                    stops: NDVI_STOPS,
                    min: "-0.2",
                    max: "0.8",
                },
                description: "NDVI measures vegetation density and health using near-infrared and red light reflectance.",
            },
        ),
        P::SurfaceWater => (
            9.0,
            Legend {
                title: "Surface Water",
                scale: LegendScale::Gradient {
                    stops: WATER_STOPS,
                    min: "None",
                    max: "Permanent",
                },
                description: "Surface water detection shows water presence and extent over time.",
            },
        ),
        P::Lulc => (
            10.0,
            Legend {
                title: "Land Use/Land Cover",
                scale: LegendScale::Categories(LULC_CLASSES),
                description: "Land Use/Land Cover classification shows different surface types and uses.",
            },
        ),
        P::Lst => (
            9.0,
            Legend {
                title: "Land Surface Temperature",
                scale: LegendScale::Gradient {
                    stops: LST_STOPS,
                    min: "0°C",
                    max: "50°C",
                },
                description: "Land Surface Temperature shows Earth surface thermal conditions.",
            },
        ),
        P::OpenBuildings => (
            14.0,
            Legend {
                title: "Building Heights",
                scale: LegendScale::Gradient {
                    stops: BUILDING_STOPS,
                    min: "Low",
                    max: "Tall",
                },
                description: "Building heights data shows the vertical extent of structures.",
            },
        ),
        P::ForestLoss => (
            DEFAULT_FOCUS_ZOOM,
            Legend {
                title: "Forest Loss Year",
                scale: LegendScale::Gradient {
                    stops: LOSS_STOPS,
                    min: "1 (2001)",
                    max: "23 (2023)",
                },
                description: "Year of forest loss detection, from 2001 to 2023.",
            },
        ),
        P::ForestGain => (
            DEFAULT_FOCUS_ZOOM,
            Legend {
                title: "Forest Gain",
                scale: LegendScale::Categories(GAIN_CLASSES),
                description: "Areas of forest gain from the Global Forest Change dataset.",
            },
        ),
        P::Sar => (
            DEFAULT_FOCUS_ZOOM,
            Legend {
                title: "SAR Imagery",
                scale: LegendScale::Categories(SAR_CLASSES),
                description: "Synthetic Aperture Radar imagery that can see through clouds and darkness.",
            },
        ),
        P::SarFlood => (
            DEFAULT_FOCUS_ZOOM,
            Legend {
                title: "SAR Flood Detection",
                scale: LegendScale::Categories(FLOOD_CLASSES),
                description: "Sentinel-1 SAR-based flood detection using Otsu thresholding.",
            },
        ),
        P::TreeCover => (
            DEFAULT_FOCUS_ZOOM,
            Legend {
                title: "Tree Cover Percentage",
                scale: LegendScale::Gradient {
                    stops: TREE_STOPS,
                    min: "0%",
                    max: "100%",
                },
                description: "Tree canopy cover percentage, representing the density of trees across the landscape.",
            },
        ),
        P::Other(_) => {
            return Symbology {
                focus_zoom: DEFAULT_FOCUS_ZOOM,
                legend: None,
            };
        }
    };

    Symbology {
        focus_zoom,
        legend: Some(legend),
    }
}

/// Camera zoom used when focusing a layer of type `pt`.
pub fn focus_zoom(pt: &ProcessingType) -> f64 {
    symbology(pt).focus_zoom
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_FOCUS_ZOOM, LegendScale, focus_zoom, symbology};
    use crate::processing::ProcessingType;

    #[test]
    fn focus_zoom_table() {
        assert_eq!(focus_zoom(&ProcessingType::Rgb), 12.0);
        assert_eq!(focus_zoom(&ProcessingType::SurfaceWater), 9.0);
        assert_eq!(focus_zoom(&ProcessingType::OpenBuildings), 14.0);
        assert_eq!(focus_zoom(&ProcessingType::Lulc), DEFAULT_FOCUS_ZOOM);
        assert_eq!(
            focus_zoom(&ProcessingType::Other("NIGHT_LIGHTS".into())),
            DEFAULT_FOCUS_ZOOM
        );
    }

    #[test]
    fn lulc_legend_lists_categories() {
        let legend = symbology(&ProcessingType::Lulc).legend.unwrap();
        let LegendScale::Categories(classes) = legend.scale else {
            panic!("expected categories, got {:?}", legend.scale);
        };
        assert_eq!(classes.len(), 7);
        assert_eq!(classes[0].label, "Tree cover");
    }

    #[test]
    fn unknown_types_have_no_legend() {
        assert!(symbology(&ProcessingType::parse("mystery")).legend.is_none());
    }
}
