/// Core data types for the GLOBE Observer utilities.
///
/// This module defines the shared domain model imported by all other modules:
/// protocols, the lat/lon bounding box, and the crate-wide error type.
/// Tabular data itself lives in `table`.

use std::fmt;
use std::str::FromStr;

use crate::table::TableError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Integer stand-in for missing values in numeric columns after rounding.
pub const NULL_SENTINEL: i64 = -9999;

/// Earliest date the GLOBE Observer app data is requested from by default.
pub const DEFAULT_START_DATE: &str = "2017-05-31";

// ---------------------------------------------------------------------------
// Protocols
// ---------------------------------------------------------------------------

/// A GLOBE Observer app protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    MosquitoHabitatMapper,
    LandCovers,
    SkyConditions,
    TreeHeights,
}

impl Protocol {
    pub const ALL: [Protocol; 4] = [
        Protocol::MosquitoHabitatMapper,
        Protocol::LandCovers,
        Protocol::SkyConditions,
        Protocol::TreeHeights,
    ];

    /// Name used by the GLOBE API `protocols` parameter.
    pub fn api_name(&self) -> &'static str {
        match self {
            Protocol::MosquitoHabitatMapper => "mosquito_habitat_mapper",
            Protocol::LandCovers => "land_covers",
            Protocol::SkyConditions => "sky_conditions",
            Protocol::TreeHeights => "tree_heights",
        }
    }

    /// Prefix the API puts in front of protocol-specific columns
    /// (the API name without underscores).
    pub fn column_prefix(&self) -> String {
        self.api_name().replace('_', "")
    }

    /// Short prefix used for cleaned column names, e.g. `mhm_LarvaeCount`.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Protocol::MosquitoHabitatMapper => "mhm",
            Protocol::LandCovers => "lc",
            Protocol::SkyConditions => "sky",
            Protocol::TreeHeights => "tree",
        }
    }

    /// Raw column holding the measurement timestamp, e.g.
    /// `mosquitohabitatmapperMeasuredAt`.
    pub fn measured_at_column(&self) -> String {
        format!("{}MeasuredAt", self.column_prefix())
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

impl FromStr for Protocol {
    type Err = GoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mosquito_habitat_mapper" | "mosquito" | "mhm" => Ok(Protocol::MosquitoHabitatMapper),
            "land_covers" | "landcover" | "lc" => Ok(Protocol::LandCovers),
            "sky_conditions" => Ok(Protocol::SkyConditions),
            "tree_heights" => Ok(Protocol::TreeHeights),
            other => Err(GoError::InvalidProtocol(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Bounding box
// ---------------------------------------------------------------------------

/// Latitude/longitude bounding box for a data request, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLonBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Default for LatLonBox {
    /// The whole globe.
    fn default() -> Self {
        LatLonBox {
            min_lat: -90.0,
            max_lat: 90.0,
            min_lon: -180.0,
            max_lon: 180.0,
        }
    }
}

impl LatLonBox {
    /// A box is valid when each minimum is below its maximum and all bounds
    /// lie within [-90, 90] / [-180, 180].
    pub fn is_valid(&self) -> bool {
        let valid_lat = self.min_lat < self.max_lat && self.max_lat <= 90.0 && self.min_lat >= -90.0;
        let valid_lon =
            self.min_lon < self.max_lon && self.max_lon <= 180.0 && self.min_lon >= -180.0;
        valid_lat && valid_lon
    }

    /// Inclusive containment check.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

impl FromStr for LatLonBox {
    type Err = GoError;

    /// Parses `"min lat, min lon, max lat, max lon"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let coords = s
            .split(',')
            .map(|c| c.trim().parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|e| GoError::InvalidBox(format!("{}: {}", s, e)))?;

        match coords.as_slice() {
            [min_lat, min_lon, max_lat, max_lon] => Ok(LatLonBox {
                min_lat: *min_lat,
                max_lat: *max_lat,
                min_lon: *min_lon,
                max_lon: *max_lon,
            }),
            _ => Err(GoError::InvalidBox(format!(
                "expected 4 coordinates, got {}",
                coords.len()
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when downloading or processing GLOBE Observer data.
#[derive(Debug, thiserror::Error)]
pub enum GoError {
    /// Non-2xx HTTP response from the GLOBE API.
    #[error(
        "Failed to get data from the API. Double check your specified settings to make sure they are valid. (HTTP {0})"
    )]
    HttpError(u16),

    /// The response did not contain a `results` array.
    #[error("Data Download Failed. The GLOBE API is most likely down.")]
    ApiDown,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error(
        "Invalid protocol '{0}', currently only 'mosquito_habitat_mapper' and 'land_covers' are supported."
    )]
    InvalidProtocol(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid bounding box: {0}")]
    InvalidBox(String),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
