//! YAML loader with tag substitution
//!
//! Supported tags:
//! - `!include path` - Replace the node with the contents of another YAML file
//! - `!secret key` - Substitute a value from secrets.yaml
//! - `!env_var VAR` - Substitute an environment variable

use crate::error::{ConfigError, ConfigResult};
use crate::secrets::Secrets;
use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// YAML loader that resolves custom tags relative to a config directory
pub struct YamlLoader {
    config_dir: PathBuf,
    secrets: Secrets,
    /// Files currently being loaded, for circular include detection
    loading: HashSet<PathBuf>,
}

impl YamlLoader {
    /// Create a loader for the given config directory, loading its secrets
    pub fn new(config_dir: impl Into<PathBuf>) -> ConfigResult<Self> {
        let config_dir = config_dir.into();
        let secrets = Secrets::load(&config_dir)?;
        Ok(Self::with_secrets(config_dir, secrets))
    }

    /// Create a loader with pre-loaded secrets
    pub fn with_secrets(config_dir: impl Into<PathBuf>, secrets: Secrets) -> Self {
        Self {
            config_dir: config_dir.into(),
            secrets,
            loading: HashSet::new(),
        }
    }

    /// Load and resolve a YAML file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ConfigResult<Value> {
        let path = self.resolve(path.as_ref());
        debug!("Loading YAML file: {:?}", path);

        if self.loading.contains(&path) {
            return Err(ConfigError::CircularInclude { path });
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadFile {
            path: path.clone(),
            source: e,
        })?;

        self.loading.insert(path.clone());
        let result = self.load_str(&content, &path);
        self.loading.remove(&path);
        result
    }

    /// Load and resolve YAML from a string
    ///
    /// `source` is used for error messages and for resolving relative includes.
    pub fn load_str(&mut self, content: &str, source: &Path) -> ConfigResult<Value> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
            path: source.to_path_buf(),
            source: e,
        })?;
        self.resolve_value(value, source)
    }

    fn resolve_value(&mut self, value: Value, source: &Path) -> ConfigResult<Value> {
        match value {
            Value::Tagged(tagged) => self.resolve_tag(*tagged, source),
            Value::Mapping(map) => {
                let mut resolved = Mapping::with_capacity(map.len());
                for (k, v) in map {
                    resolved.insert(k, self.resolve_value(v, source)?);
                }
                Ok(Value::Mapping(resolved))
            }
            Value::Sequence(seq) => seq
                .into_iter()
                .map(|v| self.resolve_value(v, source))
                .collect::<ConfigResult<Vec<_>>>()
                .map(Value::Sequence),
            other => Ok(other),
        }
    }

    fn resolve_tag(&mut self, tagged: TaggedValue, source: &Path) -> ConfigResult<Value> {
        let tag = tagged.tag.to_string();
        trace!("Resolving tag '{}'", tag);

        match tag.as_str() {
            "!include" => {
                let name = tag_argument(&tag, &tagged.value)?;
                let base = source.parent().unwrap_or(&self.config_dir);
                let path = if Path::new(name).is_absolute() {
                    PathBuf::from(name)
                } else {
                    base.join(name)
                };
                if !path.exists() {
                    return Err(ConfigError::IncludeNotFound { path });
                }
                self.load_file(path)
            }
            "!secret" => {
                let key = tag_argument(&tag, &tagged.value)?;
                let secret = self.secrets.get(key)?;
                debug!("Substituted secret: {}", key);
                Ok(Value::String(secret.to_string()))
            }
            "!env_var" => {
                let var = tag_argument(&tag, &tagged.value)?;
                let value = std::env::var(var).map_err(|_| ConfigError::EnvVarNotFound {
                    var: var.to_string(),
                })?;
                debug!("Substituted env var: {}", var);
                Ok(Value::String(value))
            }
            _ => {
                let value = self.resolve_value(tagged.value, source)?;
                Ok(Value::Tagged(Box::new(TaggedValue {
                    tag: tagged.tag,
                    value,
                })))
            }
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config_dir.join(path)
        }
    }
}

fn tag_argument<'a>(tag: &str, value: &'a Value) -> ConfigResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| ConfigError::TagArgument {
            tag: tag.to_string(),
        })
}

/// Load a YAML file from a config directory with full tag resolution
pub fn load_yaml(config_dir: impl Into<PathBuf>, file: impl AsRef<Path>) -> ConfigResult<Value> {
    YamlLoader::new(config_dir)?.load_file(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn get<'a>(value: &'a Value, key: &str) -> &'a Value {
        value.as_mapping().unwrap().get(key).unwrap()
    }

    #[test]
    fn test_load_simple_yaml() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "configuration.yaml",
            "weather:\n  windy: 8.0\n",
        );

        let value = load_yaml(dir.path(), "configuration.yaml").unwrap();
        assert_eq!(get(get(&value, "weather"), "windy").as_f64(), Some(8.0));
    }

    #[test]
    fn test_include() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "outside.yaml", "rain: rain.garden\n");
        write_file(
            dir.path(),
            "configuration.yaml",
            "weather:\n  outside: !include outside.yaml\n",
        );

        let value = load_yaml(dir.path(), "configuration.yaml").unwrap();
        let outside = get(get(&value, "weather"), "outside");
        assert_eq!(get(outside, "rain").as_str(), Some("rain.garden"));
    }

    #[test]
    fn test_missing_include() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "configuration.yaml",
            "weather: !include nope.yaml\n",
        );

        let result = load_yaml(dir.path(), "configuration.yaml");
        assert!(matches!(result, Err(ConfigError::IncludeNotFound { .. })));
    }

    #[test]
    fn test_secret() {
        let dir = TempDir::new().unwrap();
        write_file(
            dir.path(),
            "secrets.yaml",
            "graphite: http://10.0.0.2:8080\n",
        );
        write_file(
            dir.path(),
            "configuration.yaml",
            "graphite:\n  host: !secret graphite\n",
        );

        let value = load_yaml(dir.path(), "configuration.yaml").unwrap();
        assert_eq!(
            get(get(&value, "graphite"), "host").as_str(),
            Some("http://10.0.0.2:8080")
        );
    }

    #[test]
    fn test_missing_secret() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "secrets.yaml", "existing: value\n");
        write_file(
            dir.path(),
            "configuration.yaml",
            "host: !secret nonexistent\n",
        );

        let result = load_yaml(dir.path(), "configuration.yaml");
        assert!(matches!(result, Err(ConfigError::SecretNotFound { .. })));
    }

    #[test]
    fn test_env_var() {
        let dir = TempDir::new().unwrap();
        std::env::set_var("TEST_WX_CONFIG_TARGET", "mastodon");
        write_file(
            dir.path(),
            "configuration.yaml",
            "target: !env_var TEST_WX_CONFIG_TARGET\n",
        );

        let value = load_yaml(dir.path(), "configuration.yaml").unwrap();
        assert_eq!(get(&value, "target").as_str(), Some("mastodon"));

        std::env::remove_var("TEST_WX_CONFIG_TARGET");
    }

    #[test]
    fn test_circular_include_detection() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "a.yaml", "b: !include b.yaml\n");
        write_file(dir.path(), "b.yaml", "a: !include a.yaml\n");

        let result = load_yaml(dir.path(), "a.yaml");
        assert!(matches!(result, Err(ConfigError::CircularInclude { .. })));
    }
}
