use crate::error::RecordParseError;
use crate::models::WeatherObservation;
use crate::utils::constants::{
    ISD_AIR_TEMPERATURE, ISD_AIR_TEMPERATURE_QUALITY, ISD_DATE, ISD_MIN_LINE_LEN, ISD_USAF,
    ISD_WBAN, ISD_WIND_SPEED, ISD_WIND_SPEED_QUALITY,
};
use chrono::NaiveDate;

/// Parses the mandatory section of fixed-width ISD observation lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservationParser;

impl ObservationParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, line: &str) -> std::result::Result<WeatherObservation, RecordParseError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.len() < ISD_MIN_LINE_LEN {
            return Err(RecordParseError::TooShort {
                actual: line.len(),
                required: ISD_MIN_LINE_LEN,
            });
        }

        let usaf = field(line, ISD_USAF, "usaf")?;
        let wban = field(line, ISD_WBAN, "wban")?;

        let date = field(line, ISD_DATE, "date")?;
        NaiveDate::parse_from_str(date, "%Y%m%d")
            .map_err(|_| RecordParseError::BadDate(date.to_string()))?;

        let wind_speed = numeric(line, ISD_WIND_SPEED, "wind_speed")?;
        let wind_speed_quality = quality(line, ISD_WIND_SPEED_QUALITY, "wind_speed")?;
        let air_temperature = numeric(line, ISD_AIR_TEMPERATURE, "air_temperature")?;
        let air_temperature_quality =
            quality(line, ISD_AIR_TEMPERATURE_QUALITY, "air_temperature")?;

        Ok(WeatherObservation {
            usaf: usaf.to_string(),
            wban: wban.to_string(),
            date: date.to_string(),
            air_temperature,
            air_temperature_quality,
            wind_speed,
            wind_speed_quality,
        })
    }
}

fn field<'a>(
    line: &'a str,
    (start, end): (usize, usize),
    name: &'static str,
) -> std::result::Result<&'a str, RecordParseError> {
    match line.get(start..end) {
        Some(value) if value.is_ascii() => Ok(value),
        _ => Err(RecordParseError::NotAscii { field: name }),
    }
}

// Signed fixed-point values such as "+0050" or "-0123".
fn numeric(
    line: &str,
    range: (usize, usize),
    name: &'static str,
) -> std::result::Result<i32, RecordParseError> {
    let raw = field(line, range, name)?;
    raw.parse::<i32>().map_err(|_| RecordParseError::NotNumeric {
        field: name,
        value: raw.to_string(),
    })
}

fn quality(
    line: &str,
    position: usize,
    name: &'static str,
) -> std::result::Result<u8, RecordParseError> {
    let raw = field(line, (position, position + 1), name)?;
    match raw.as_bytes() {
        [digit @ b'0'..=b'9'] => Ok(digit - b'0'),
        _ => Err(RecordParseError::BadQuality {
            field: name,
            value: raw.to_string(),
        }),
    }
}
