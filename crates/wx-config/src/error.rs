use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors; all of them are fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid YAML: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document parsed but doesn't have the expected shape
    #[error("configuration does not match the expected layout: {0}")]
    Layout(#[source] serde_yaml::Error),

    #[error("no secret named '{key}'")]
    SecretNotFound { key: String },

    #[error("include target {path} does not exist")]
    IncludeNotFound { path: PathBuf },

    #[error("{path} includes itself")]
    CircularInclude { path: PathBuf },

    #[error("environment variable '{var}' is not set")]
    EnvVarNotFound { var: String },

    /// A custom tag whose argument isn't a plain string
    #[error("{tag} expects a string argument")]
    TagArgument { tag: String },

    #[error("weather config '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}
