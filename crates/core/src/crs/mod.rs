//! Coordinate Reference System handling

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether map coordinates are angles on the spheroid or planar lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrsModel {
    /// Longitude/latitude in degrees
    Geographic,
    /// Projected coordinates in linear units
    Projected,
}

/// Coordinate Reference System as far as ground distances need it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crs {
    model: CrsModel,
    /// EPSG code if known
    epsg: Option<u32>,
}

impl Crs {
    /// Create a CRS from an EPSG code.
    ///
    /// Codes in the 4000-4999 block are geographic 2D systems, anything else is
    /// taken as projected.
    pub fn from_epsg(code: u32) -> Self {
        let model = if (4000..5000).contains(&code) {
            CrsModel::Geographic
        } else {
            CrsModel::Projected
        };
        Self {
            model,
            epsg: Some(code),
        }
    }

    /// CRS with a known model but no EPSG code
    pub fn from_model(model: CrsModel) -> Self {
        Self { model, epsg: None }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    pub fn model(&self) -> CrsModel {
        self.model
    }

    pub fn is_geographic(&self) -> bool {
        self.model == CrsModel::Geographic
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        match (self.epsg, self.model) {
            (Some(code), _) => format!("EPSG:{}", code),
            (None, CrsModel::Geographic) => "geographic".to_string(),
            (None, CrsModel::Projected) => "projected".to_string(),
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}
