use crate::models::{EnrichedObservation, StationCatalog, WeatherObservation};
use crate::utils::constants::UNKNOWN_COUNTRY;
use std::sync::Arc;

/// Attaches the station's country to observations.
#[derive(Debug, Clone)]
pub struct Enricher {
    catalog: Arc<StationCatalog>,
}

impl Enricher {
    pub fn new(catalog: Arc<StationCatalog>) -> Self {
        Self { catalog }
    }

    pub fn enrich(&self, observation: WeatherObservation) -> EnrichedObservation {
        enrich(observation, &self.catalog)
    }
}

/// Never fails: stations missing from the catalog get the "unknown" country.
pub fn enrich(observation: WeatherObservation, catalog: &StationCatalog) -> EnrichedObservation {
    let country = catalog
        .lookup(&observation.usaf, &observation.wban)
        .unwrap_or(UNKNOWN_COUNTRY)
        .to_string();
    EnrichedObservation {
        observation,
        country,
    }
}

impl EnrichedObservation {
    pub fn is_unknown_station(&self) -> bool {
        self.country == UNKNOWN_COUNTRY
    }
}
