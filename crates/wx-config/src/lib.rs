//! YAML configuration loading for the weather monitor
//!
//! Configuration lives in `configuration.yaml` inside a config directory.
//! The loader understands three custom tags:
//!
//! - `!include path` - Include another YAML file
//! - `!secret key` - Substitute from secrets.yaml
//! - `!env_var VAR` - Environment variable substitution
//!
//! # Example
//!
//! ```ignore
//! use wx_config::ServiceConfig;
//!
//! let config = ServiceConfig::load("/etc/weather")?;
//! println!("windy above {} m/s", config.weather.windy);
//! ```

mod error;
mod loader;
mod secrets;
mod service_config;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_yaml, YamlLoader};
pub use secrets::Secrets;
pub use service_config::{
    AlertsConfig, GraphiteConfig, OutsideSensors, ServiceConfig, WeatherConfig, CONFIG_FILE,
};
