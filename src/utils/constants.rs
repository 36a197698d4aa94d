/// Quality flag value marking a measurement as usable
pub const QUALITY_VALID: u8 = 1;

/// Substituted for rejected measurements so they can never win an extremum
pub const MIN_SENTINEL: i32 = 9999;
pub const MAX_SENTINEL: i32 = -9999;

/// Country reported for stations absent from the catalog
pub const UNKNOWN_COUNTRY: &str = "unknown";

/// ISD mandatory section byte ranges (zero-based, end exclusive)
pub const ISD_USAF: (usize, usize) = (4, 10);
pub const ISD_WBAN: (usize, usize) = (10, 15);
pub const ISD_DATE: (usize, usize) = (15, 23);
pub const ISD_WIND_SPEED: (usize, usize) = (65, 69);
pub const ISD_WIND_SPEED_QUALITY: usize = 69;
pub const ISD_AIR_TEMPERATURE: (usize, usize) = (87, 92);
pub const ISD_AIR_TEMPERATURE_QUALITY: usize = 92;
pub const ISD_MIN_LINE_LEN: usize = 93;

/// Station history CSV columns
pub const STATION_COL_USAF: usize = 0;
pub const STATION_COL_WBAN: usize = 1;
pub const STATION_COL_COUNTRY: usize = 3;

/// Window defaults
pub const DEFAULT_WINDOW_LENGTH_MS: u64 = 10_000;
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;

/// Processing defaults
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const DEFAULT_PORT: u16 = 9977;
pub const MALFORMED_WARN_EVERY: u64 = 1000;

/// Environment prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "WEATHER_STREAM";
