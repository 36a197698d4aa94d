//! Layered settings for the streaming engine: defaults, then an optional
//! config file, then `WEATHER_STREAM_*` environment variables, then CLI flags.

use crate::error::Result;
use crate::processors::{OverflowPolicy, WindowSettings};
use crate::utils::constants::{
    CONFIG_ENV_PREFIX, DEFAULT_TICK_INTERVAL_MS, DEFAULT_WINDOW_LENGTH_MS,
};
use crate::writers::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_cadence"))]
pub struct StreamConfig {
    #[validate(range(min = 1))]
    pub window_length_ms: u64,

    #[validate(range(min = 1))]
    pub tick_interval_ms: u64,

    #[validate(range(min = 1))]
    pub max_buffered: Option<usize>,

    pub overflow_policy: OverflowPolicy,

    pub output_format: OutputFormat,
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub window_length_ms: Option<u64>,
    pub tick_interval_ms: Option<u64>,
    pub max_buffered: Option<usize>,
    pub overflow_policy: Option<OverflowPolicy>,
    pub output_format: Option<OutputFormat>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            window_length_ms: DEFAULT_WINDOW_LENGTH_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            max_buffered: None,
            overflow_policy: OverflowPolicy::default(),
            output_format: OutputFormat::default(),
        }
    }
}

fn validate_cadence(config: &StreamConfig) -> std::result::Result<(), ValidationError> {
    if config.tick_interval_ms > config.window_length_ms {
        let mut error = ValidationError::new("tick_longer_than_window");
        error.message = Some("tick_interval_ms must not exceed window_length_ms".into());
        return Err(error);
    }
    Ok(())
}

impl StreamConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(CONFIG_ENV_PREFIX).try_parsing(true),
        );

        let config: StreamConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(value) = overrides.window_length_ms {
            self.window_length_ms = value;
        }
        if let Some(value) = overrides.tick_interval_ms {
            self.tick_interval_ms = value;
        }
        if overrides.max_buffered.is_some() {
            self.max_buffered = overrides.max_buffered;
        }
        if let Some(value) = overrides.overflow_policy {
            self.overflow_policy = value;
        }
        if let Some(value) = overrides.output_format {
            self.output_format = value;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn window_length(&self) -> Duration {
        Duration::from_millis(self.window_length_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn window_settings(&self) -> WindowSettings {
        WindowSettings::new(self.window_length())
            .with_max_buffered(self.max_buffered, self.overflow_policy)
    }
}
