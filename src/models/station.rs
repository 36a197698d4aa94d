use serde::{Deserialize, Serialize};
use validator::Validate;

/// Composite station identifier.
///
/// Kept as a pair rather than a concatenated string so that two stations
/// sharing a USAF id but differing in WBAN can never alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StationKey {
    pub usaf: String,
    pub wban: String,
}

impl StationKey {
    pub fn new(usaf: impl Into<String>, wban: impl Into<String>) -> Self {
        Self {
            usaf: usaf.into(),
            wban: wban.into(),
        }
    }
}

impl std::fmt::Display for StationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.usaf, self.wban)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StationRecord {
    #[validate(length(equal = 6))]
    pub station_usaf: String,

    #[validate(length(equal = 5))]
    pub station_wban: String,

    #[validate(length(min = 1))]
    pub country: String,
}

impl StationRecord {
    pub fn new(station_usaf: String, station_wban: String, country: String) -> Self {
        Self {
            station_usaf,
            station_wban,
            country,
        }
    }

    pub fn key(&self) -> StationKey {
        StationKey::new(self.station_usaf.clone(), self.station_wban.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_validation() {
        let station = StationRecord::new("725300".into(), "94846".into(), "US".into());
        assert!(station.validate().is_ok());

        let short_usaf = StationRecord::new("72530".into(), "94846".into(), "US".into());
        assert!(short_usaf.validate().is_err());

        let no_country = StationRecord::new("725300".into(), "94846".into(), String::new());
        assert!(no_country.validate().is_err());
    }

    #[test]
    fn test_keys_do_not_alias() {
        let a = StationKey::new("725300", "94846");
        let b = StationKey::new("725300", "14846");
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "725300-94846");
    }
}
