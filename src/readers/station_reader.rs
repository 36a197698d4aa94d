use crate::error::{ProcessingError, Result};
use crate::models::{StationCatalog, StationRecord};
use crate::utils::constants::{STATION_COL_COUNTRY, STATION_COL_USAF, STATION_COL_WBAN};
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, info, warn};
use validator::Validate;

pub struct StationReader {
    skip_headers: bool,
}

/// Rows read from a station file, plus what was left out.
#[derive(Debug, Default)]
pub struct StationLoad {
    pub stations: Vec<StationRecord>,
    pub malformed: usize,
    pub without_country: usize,
}

impl StationReader {
    pub fn new() -> Self {
        Self { skip_headers: true }
    }

    pub fn with_skip_headers(skip_headers: bool) -> Self {
        Self { skip_headers }
    }

    /// Load the station history file and index it by (USAF, WBAN).
    ///
    /// An unreadable file is fatal; malformed rows are skipped with a warning.
    pub fn read_catalog(&self, path: &Path) -> Result<StationCatalog> {
        let load = self.read_stations(path)?;
        info!(
            path = %path.display(),
            stations = load.stations.len(),
            malformed = load.malformed,
            without_country = load.without_country,
            "Loaded station catalog"
        );
        Ok(StationCatalog::from_records(load.stations))
    }

    pub fn read_stations(&self, path: &Path) -> Result<StationLoad> {
        let bytes = std::fs::read(path).map_err(|source| ProcessingError::CatalogUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let text = decode_station_bytes(&bytes);
        Ok(self.parse_stations(&text))
    }

    /// Parse station history CSV content. Exactly one header row is skipped
    /// when header skipping is on.
    pub fn parse_stations(&self, text: &str) -> StationLoad {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.skip_headers)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut load = StationLoad::default();
        for (index, row) in reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!(row = index + 1, error = %e, "Skipping unreadable station row");
                    load.malformed += 1;
                    continue;
                }
            };

            match parse_station_row(&row) {
                StationRow::Station(station) => load.stations.push(station),
                StationRow::NoCountry => {
                    debug!(row = index + 1, "Station has no country, leaving it out of the catalog");
                    load.without_country += 1;
                }
                StationRow::Malformed(reason) => {
                    warn!(row = index + 1, reason = %reason, "Skipping malformed station row");
                    load.malformed += 1;
                }
            }
        }

        load
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}

enum StationRow {
    Station(StationRecord),
    NoCountry,
    Malformed(String),
}

fn parse_station_row(row: &csv::StringRecord) -> StationRow {
    let (Some(usaf), Some(wban), Some(country)) = (
        row.get(STATION_COL_USAF),
        row.get(STATION_COL_WBAN),
        row.get(STATION_COL_COUNTRY),
    ) else {
        return StationRow::Malformed(format!("expected at least 4 columns, got {}", row.len()));
    };

    if country.is_empty() {
        return StationRow::NoCountry;
    }

    let station = StationRecord::new(usaf.to_string(), wban.to_string(), country.to_string());
    match station.validate() {
        Ok(()) => StationRow::Station(station),
        Err(e) => StationRow::Malformed(e.to_string()),
    }
}

/// Station names in older history files are Latin-1 encoded.
fn decode_station_bytes(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            text
        }
    }
}
