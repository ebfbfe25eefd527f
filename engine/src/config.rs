//! Engine configuration.
//!
//! Controls result reporting and logging. Every field has a default, so an
//! empty document is a valid configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! report:
//!   print_return: true
//!   format: yaml
//! log:
//!   debug: false
//!   console: true
//!   level: info
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::debug;

use crate::error::ConfigFileError;
use crate::report::ReportOptions;

/// Logging settings, applied by the binary that installs a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Forces the `debug` level.
    pub debug: bool,
    /// Log to the console (stderr).
    pub console: bool,
    /// Level or filter directive used when `debug` is off.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            console: true,
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Filter directive for the subscriber.
    pub fn filter(&self) -> &str {
        if self.debug { "debug" } else { self.level.as_str() }
    }
}

/// Top-level engine configuration.
///
/// # Examples
///
/// ```
/// use cmdspec_engine::{EngineConfig, ResultFormat};
///
/// let config = EngineConfig::from_yaml_str("report: { print_return: true, format: yaml }").unwrap();
/// assert!(config.report.print_return);
/// assert_eq!(config.report.format, ResultFormat::Yaml);
/// assert_eq!(config.log.level, "info");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub report: ReportOptions,
    pub log: LogConfig,
}

impl EngineConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::Io`] if the file cannot be read, or
    /// [`ConfigFileError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigFileError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let value: Value = serde_yaml::from_reader(reader)?;
        Self::from_value(value)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigFileError> {
        Self::from_value(serde_yaml::from_str(yaml)?)
    }

    /// Loads every existing file in order; later files override earlier keys.
    ///
    /// Missing files are skipped. With no files at all the defaults apply.
    pub fn load_layered<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ConfigFileError> {
        let mut merged = Value::Null;
        for path in paths {
            let path = path.as_ref();
            if !path.is_file() {
                continue;
            }
            debug!(path = %path.display(), "loading configuration layer");
            let file = std::fs::File::open(path)?;
            let layer: Value = serde_yaml::from_reader(BufReader::new(file))?;
            merge(&mut merged, layer);
        }
        Self::from_value(merged)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigFileError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    fn from_value(value: Value) -> Result<Self, ConfigFileError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_value(value)?)
    }
}

/// Deep-merges `overlay` into `base`. Mappings merge key by key; anything
/// else replaces. A null overlay (empty file) changes nothing.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ResultFormat;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(EngineConfig::from_yaml_str("").unwrap(), EngineConfig::default());
        assert_eq!(EngineConfig::from_yaml_str("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_debug_overrides_level() {
        let config = EngineConfig::from_yaml_str("log: { debug: true, level: warn }").unwrap();
        assert_eq!(config.log.filter(), "debug");
        assert!(config.log.console);
    }

    #[test]
    fn test_layers_merge_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let global = dir.path().join("global.yaml");
        let user = dir.path().join("user.yaml");
        std::fs::write(&global, "report:\n  print_return: true\nlog:\n  level: warn\n").unwrap();
        std::fs::write(&user, "report:\n  format: yaml\n").unwrap();
        let missing = dir.path().join("missing.yaml");

        let config = EngineConfig::load_layered(&[global, missing, user]).unwrap();
        assert!(config.report.print_return);
        assert_eq!(config.report.format, ResultFormat::Yaml);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut config = EngineConfig::default();
        config.report.print_return = true;
        config.save(&path).unwrap();

        assert_eq!(EngineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let err = EngineConfig::from_yaml_str("report: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigFileError::Yaml(_)));
    }
}
