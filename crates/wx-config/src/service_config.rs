//! Weather service configuration
//!
//! Parses the `weather:`, `graphite:` and `alerts:` sections of
//! configuration.yaml.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::path::Path;
use wx_core::SignalKind;

use crate::error::{ConfigError, ConfigResult};
use crate::loader::load_yaml;

/// Main configuration file name
pub const CONFIG_FILE: &str = "configuration.yaml";

/// Device ids of the outdoor sensors
///
/// A sensor left unset disables monitoring of that signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutsideSensors {
    #[serde(default)]
    pub rain: Option<String>,
    #[serde(default)]
    pub temp: Option<String>,
    #[serde(default)]
    pub wind: Option<String>,
    #[serde(default)]
    pub humidity: Option<String>,
}

impl OutsideSensors {
    /// Resolve a device id to the signal kind it reports
    pub fn kind_of(&self, device: &str) -> Option<SignalKind> {
        self.configured()
            .find(|(_, id)| *id == device)
            .map(|(kind, _)| kind)
    }

    /// Iterate over the configured (kind, device id) pairs
    pub fn configured(&self) -> impl Iterator<Item = (SignalKind, &str)> {
        [
            (SignalKind::Rain, &self.rain),
            (SignalKind::Temperature, &self.temp),
            (SignalKind::Wind, &self.wind),
            (SignalKind::Humidity, &self.humidity),
        ]
        .into_iter()
        .filter_map(|(kind, id)| id.as_deref().map(|id| (kind, id)))
    }
}

/// The `weather:` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default)]
    pub outside: OutsideSensors,

    /// Smoothed wind speed (m/s) above which a windy alert is raised
    #[serde(default = "default_windy")]
    pub windy: f64,

    /// Time-series name of the outdoor temperature sensor
    #[serde(default = "default_temperature_series")]
    pub temperature_series: String,

    /// Local time of day the digest is sent, as `HH:MM`
    #[serde(default = "default_digest_at")]
    pub digest_at: String,
}

impl WeatherConfig {
    /// The digest time of day
    pub fn digest_time(&self) -> ConfigResult<NaiveTime> {
        let parsed = NaiveTime::parse_from_str(&self.digest_at, "%H:%M");
        parsed.map_err(|e| ConfigError::InvalidValue {
            key: "weather.digest_at".to_string(),
            reason: e.to_string(),
        })
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            outside: OutsideSensors::default(),
            windy: default_windy(),
            temperature_series: default_temperature_series(),
            digest_at: default_digest_at(),
        }
    }
}

/// The `graphite:` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphiteConfig {
    /// Base URL of the Graphite web API
    #[serde(default = "default_graphite_host")]
    pub host: String,
}

impl Default for GraphiteConfig {
    fn default() -> Self {
        Self {
            host: default_graphite_host(),
        }
    }
}

/// The `alerts:` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Delivery target named on outgoing alert events
    #[serde(default = "default_alert_target")]
    pub target: String,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            target: default_alert_target(),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub graphite: GraphiteConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
}

fn default_windy() -> f64 {
    8.0
}

fn default_temperature_series() -> String {
    "garden.temp".to_string()
}

fn default_digest_at() -> String {
    "08:00".to_string()
}

fn default_graphite_host() -> String {
    "http://localhost:8080".to_string()
}

fn default_alert_target() -> String {
    "twitter".to_string()
}

impl ServiceConfig {
    /// Load configuration from a config directory
    pub fn load(config_dir: impl AsRef<Path>) -> ConfigResult<Self> {
        let yaml = load_yaml(config_dir.as_ref(), CONFIG_FILE)?;
        Self::from_yaml(&yaml)
    }

    /// Parse and validate configuration from a YAML value
    pub fn from_yaml(yaml: &Value) -> ConfigResult<Self> {
        if !yaml.is_mapping() {
            return Err(ConfigError::InvalidValue {
                key: "root".to_string(),
                reason: "configuration must be a mapping".to_string(),
            });
        }

        let config: ServiceConfig =
            serde_yaml::from_value(yaml.clone()).map_err(ConfigError::Layout)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde can't express
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.weather.windy.is_finite() && self.weather.windy > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "weather.windy".to_string(),
                reason: format!("must be a positive number, got {}", self.weather.windy),
            });
        }
        if self.weather.temperature_series.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "weather.temperature_series".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        self.weather.digest_time()?;
        Ok(())
    }
}
