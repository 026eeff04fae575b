use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::geo::Coordinate;

pub const MIN_QUERY_LEN: usize = 2;
pub const MAX_SEARCH_RESULTS: usize = 5;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read airport catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse airport catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unknown airport: {0}")]
    UnknownAirport(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Airport {
    pub iata: String,
    pub name: String,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
}

impl Airport {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// One entry of the upstream catalog, keyed by ICAO code in the file.
#[derive(Debug, Deserialize)]
struct RawAirport {
    #[serde(default)]
    iata: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    city: String,
    #[serde(deserialize_with = "number_or_string")]
    lat: f64,
    #[serde(deserialize_with = "number_or_string")]
    lon: f64,
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Immutable, already-validated set of airports with a 3-letter IATA code.
#[derive(Debug, Clone, Default)]
pub struct AirportCatalog {
    airports: Vec<Airport>,
}

impl AirportCatalog {
    pub fn new(mut airports: Vec<Airport>) -> Self {
        airports.retain(|ap| ap.iata.len() == 3);
        Self { airports }
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&text)?;
        info!(path = %path.display(), airports = catalog.len(), "loaded airport catalog");
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: HashMap<String, RawAirport> = serde_json::from_str(json)?;
        let mut airports: Vec<Airport> = raw
            .into_values()
            .filter_map(|ap| {
                let iata = ap.iata?.trim().to_uppercase();
                (iata.len() == 3).then(|| Airport {
                    iata,
                    name: ap.name,
                    city: ap.city,
                    lat: ap.lat,
                    lon: ap.lon,
                })
            })
            .collect();
        // HashMap order is random; keep search results stable
        airports.sort_by(|a, b| a.iata.cmp(&b.iata));
        debug!(airports = airports.len(), "parsed airport catalog");
        Ok(Self::new(airports))
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    pub fn find(&self, iata: &str) -> Result<&Airport, CatalogError> {
        self.airports
            .iter()
            .find(|ap| ap.iata.eq_ignore_ascii_case(iata))
            .ok_or_else(|| CatalogError::UnknownAirport(iata.to_string()))
    }

    /// Autocomplete over city names and IATA codes.
    pub fn search(&self, query: &str) -> Vec<&Airport> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }
        self.airports
            .iter()
            .filter(|ap| {
                ap.city.to_lowercase().contains(&query) || ap.iata.to_lowercase().contains(&query)
            })
            .take(MAX_SEARCH_RESULTS)
            .collect()
    }
}
