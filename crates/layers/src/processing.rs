use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of imagery product a layer shows.
///
/// Parsing is lenient: case is ignored and spaces or hyphens count as
/// underscores, so `"surface water"` and `"SURFACE_WATER"` are the same
/// type. Names outside the known set are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProcessingType {
    Rgb,
    Ndvi,
    SurfaceWater,
    Lulc,
    Lst,
    OpenBuildings,
    ForestLoss,
    ForestGain,
    Sar,
    SarFlood,
    TreeCover,
    Other(String),
}

impl ProcessingType {
    pub fn parse(raw: &str) -> Self {
        let key: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();
        match key.as_str() {
            "RGB" => Self::Rgb,
            "NDVI" => Self::Ndvi,
            "SURFACE_WATER" | "WATER" => Self::SurfaceWater,
            "LULC" | "LAND_COVER" => Self::Lulc,
            "LST" => Self::Lst,
            "OPEN_BUILDINGS" | "BUILDINGS" => Self::OpenBuildings,
            "FOREST_LOSS" | "LOSSYEAR" => Self::ForestLoss,
            "FOREST_GAIN" => Self::ForestGain,
            "SAR" => Self::Sar,
            "SAR_FLOOD" | "FLOOD" => Self::SarFlood,
            "TREE_COVER" | "TREECOVER2000" => Self::TreeCover,
            _ => Self::Other(raw.trim().to_string()),
        }
    }

    /// Canonical wire name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rgb => "RGB",
            Self::Ndvi => "NDVI",
            Self::SurfaceWater => "SURFACE_WATER",
            Self::Lulc => "LULC",
            Self::Lst => "LST",
            Self::OpenBuildings => "OPEN_BUILDINGS",
            Self::ForestLoss => "FOREST_LOSS",
            Self::ForestGain => "FOREST_GAIN",
            Self::Sar => "SAR",
            Self::SarFlood => "SAR_FLOOD",
            Self::TreeCover => "TREE_COVER",
            Self::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for ProcessingType {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for ProcessingType {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<ProcessingType> for String {
    fn from(pt: ProcessingType) -> Self {
        match pt {
            ProcessingType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ProcessingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ProcessingType;

    #[test]
    fn parsing_normalizes_case_and_separators() {
        assert_eq!(ProcessingType::parse("surface water"), ProcessingType::SurfaceWater);
        assert_eq!(ProcessingType::parse("SURFACE_WATER"), ProcessingType::SurfaceWater);
        assert_eq!(ProcessingType::parse("Open-Buildings"), ProcessingType::OpenBuildings);
        assert_eq!(ProcessingType::parse(" ndvi "), ProcessingType::Ndvi);
        assert_eq!(ProcessingType::parse("lossyear"), ProcessingType::ForestLoss);
        assert_eq!(ProcessingType::parse("SAR FLOOD"), ProcessingType::SarFlood);
    }

    #[test]
    fn unknown_names_pass_through_verbatim() {
        let pt = ProcessingType::parse("Night Lights");
        assert_eq!(pt, ProcessingType::Other("Night Lights".to_string()));
        assert!(!pt.is_known());
        assert_eq!(pt.to_string(), "Night Lights");
    }

    #[test]
    fn serde_uses_the_wire_name() {
        let json = serde_json::to_string(&ProcessingType::SurfaceWater).unwrap();
        assert_eq!(json, "\"SURFACE_WATER\"");
        let back: ProcessingType = serde_json::from_str("\"SURFACE WATER\"").unwrap();
        assert_eq!(back, ProcessingType::SurfaceWater);
    }
}
