use serde::{Deserialize, Serialize};

use crate::utils::constants::{MAX_SENTINEL, MIN_SENTINEL, QUALITY_VALID};

/// One ISD observation, values kept in the source's fixed-point scale
/// (air temperature in tenths of °C, wind speed in tenths of m/s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub usaf: String,
    pub wban: String,
    /// `YYYYMMDD`
    pub date: String,
    pub air_temperature: i32,
    pub air_temperature_quality: u8,
    pub wind_speed: i32,
    pub wind_speed_quality: u8,
}

impl WeatherObservation {
    /// First four characters of the date.
    pub fn year(&self) -> &str {
        self.date.get(..4).unwrap_or(&self.date)
    }

    pub fn has_valid_temperature(&self) -> bool {
        self.air_temperature_quality == QUALITY_VALID
    }

    pub fn has_valid_wind_speed(&self) -> bool {
        self.wind_speed_quality == QUALITY_VALID
    }

    pub fn temperature_min_candidate(&self) -> i32 {
        if self.has_valid_temperature() {
            self.air_temperature
        } else {
            MIN_SENTINEL
        }
    }

    pub fn temperature_max_candidate(&self) -> i32 {
        if self.has_valid_temperature() {
            self.air_temperature
        } else {
            MAX_SENTINEL
        }
    }

    pub fn wind_min_candidate(&self) -> i32 {
        if self.has_valid_wind_speed() {
            self.wind_speed
        } else {
            MIN_SENTINEL
        }
    }

    pub fn wind_max_candidate(&self) -> i32 {
        if self.has_valid_wind_speed() {
            self.wind_speed
        } else {
            MAX_SENTINEL
        }
    }
}

/// An observation joined with the country of its station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedObservation {
    pub observation: WeatherObservation,
    pub country: String,
}

impl EnrichedObservation {
    pub fn year(&self) -> &str {
        self.observation.year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(temp: i32, temp_q: u8, wind: i32, wind_q: u8) -> WeatherObservation {
        WeatherObservation {
            usaf: "725300".into(),
            wban: "94846".into(),
            date: "20130101".into(),
            air_temperature: temp,
            air_temperature_quality: temp_q,
            wind_speed: wind,
            wind_speed_quality: wind_q,
        }
    }

    #[test]
    fn test_year_is_date_prefix() {
        assert_eq!(observation(0, 1, 0, 1).year(), "2013");
    }

    #[test]
    fn test_invalid_quality_uses_sentinels() {
        let obs = observation(50, 9, 31, 1);
        assert_eq!(obs.temperature_min_candidate(), MIN_SENTINEL);
        assert_eq!(obs.temperature_max_candidate(), MAX_SENTINEL);
        assert_eq!(obs.wind_min_candidate(), 31);
        assert_eq!(obs.wind_max_candidate(), 31);
    }

    #[test]
    fn test_quality_zero_is_not_valid() {
        let obs = observation(50, 0, 31, 5);
        assert!(!obs.has_valid_temperature());
        assert!(!obs.has_valid_wind_speed());
    }
}
