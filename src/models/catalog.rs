use std::collections::HashMap;

use crate::models::{StationKey, StationRecord};

/// Station reference table, immutable once built.
///
/// Share it as `Arc<StationCatalog>`; reads need no synchronisation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationCatalog {
    countries: HashMap<StationKey, String>,
}

impl StationCatalog {
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = StationRecord>,
    {
        let countries = records
            .into_iter()
            .map(|record| (record.key(), record.country))
            .collect();
        Self { countries }
    }

    pub fn lookup(&self, usaf: &str, wban: &str) -> Option<&str> {
        self.lookup_key(&StationKey::new(usaf, wban))
    }

    pub fn lookup_key(&self, key: &StationKey) -> Option<&str> {
        self.countries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}
