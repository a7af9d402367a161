//! Configuration file loading.
//!
//! The configuration is a TOML file declaring every model:
//!
//! ```toml
//! version = "1.0"
//!
//! [[models]]
//! trigger = "home_docs"
//! label = "Home documents"
//! sources = ["~/Documents"]
//! target = "/mnt/backup"
//! ignore = ["*.tmp"]
//! ```

use crate::constants::{CONFIG_NAME, LOG_DIR_NAME, PKG_NAME};
use crate::model::Model;
use crate::outcome::RunLog;
use crate::registry::ModelRegistry;
use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

/// Loads configuration, registering every declared model.
///
/// Called exactly once per invocation. Problems that do not prevent loading
/// are recorded as warnings in `log`.
pub trait LoadConfig {
    fn load_config(&self, registry: &mut ModelRegistry, log: &mut RunLog) -> anyhow::Result<()>;
}

impl<F> LoadConfig for F
where
    F: Fn(&mut ModelRegistry, &mut RunLog) -> anyhow::Result<()>,
{
    fn load_config(&self, registry: &mut ModelRegistry, log: &mut RunLog) -> anyhow::Result<()> {
        self(registry, log)
    }
}

/// Contents of the configuration file.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    /// Configuration file version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Declared models, in declaration order.
    #[serde(default)]
    pub models: Vec<Model>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            models: vec![],
        }
    }
}

impl Config {
    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        let config = toml::from_str(toml_str)?;
        Ok(config)
    }

    /// Checks every model, returning warnings for suspicious declarations.
    ///
    /// # Errors
    /// A trigger that is empty or contains `*` or `,` cannot be selected on
    /// the command line and is rejected.
    pub fn validate(&self) -> anyhow::Result<Vec<String>> {
        let mut warnings = vec![];
        let mut seen = HashSet::new();
        for (index, model) in self.models.iter().enumerate() {
            let trigger = model.trigger.as_str();
            if trigger.is_empty() {
                bail!("Model #{} ('{}') has an empty trigger", index + 1, model.label);
            }
            if trigger.contains('*') || trigger.contains(',') {
                bail!("Trigger '{trigger}' must not contain '*' or ','");
            }
            if model.dsl.sources.is_empty() {
                warnings.push(format!("Model {model} has no sources"));
            }
            if model.dsl.target.is_empty() {
                warnings.push(format!("Model {model} has no target"));
            }
            if !seen.insert((trigger, model.label.as_str())) {
                warnings.push(format!("Model {model} is declared more than once"));
            }
        }
        Ok(warnings)
    }
}

/// Loads models from a TOML file on disk.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn read(&self) -> anyhow::Result<Config> {
        if !self.path.is_file() {
            bail!("Could not find configuration file: '{}'", self.path.display());
        }
        let toml_str = fs::read_to_string(&self.path)
            .with_context(|| format!("Error reading config file '{}'", self.path.display()))?;
        Config::from_toml(&toml_str)
            .with_context(|| format!("Error parsing config file '{}'", self.path.display()))
    }
}

impl LoadConfig for ConfigFile {
    fn load_config(&self, registry: &mut ModelRegistry, log: &mut RunLog) -> anyhow::Result<()> {
        tracing::debug!(path = %self.path.display(), "loading configuration");
        let config = self.read()?;
        for warning in config.validate()? {
            log.warn(warning);
        }
        for model in config.models {
            registry.register(model);
        }
        Ok(())
    }
}

/// Filesystem locations used by one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub root_path: PathBuf,
    pub config_file: PathBuf,
    pub log_path: PathBuf,
}

impl Paths {
    /// Resolves the locations, falling back to `<root>/config.toml` and
    /// `<root>/log`.
    pub fn resolve(
        root_path: Option<PathBuf>,
        config_file: Option<PathBuf>,
        log_path: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let root_path = match root_path {
            Some(path) => absolute(path),
            None => default_root_path().context("Couldn't get the home directory!!!")?,
        };
        let config_file = config_file
            .map(absolute)
            .unwrap_or_else(|| root_path.join(CONFIG_NAME));
        let log_path = log_path
            .map(absolute)
            .unwrap_or_else(|| root_path.join(LOG_DIR_NAME));
        Ok(Self {
            root_path,
            config_file,
            log_path,
        })
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    crate::path::expand_path(&path.to_string_lossy())
}

/// Returns the default root directory for the application, platform-specific.
#[cfg(not(target_os = "macos"))]
pub fn default_root_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(PKG_NAME))
}

/// Returns the default root directory for the application, platform-specific.
#[cfg(target_os = "macos")]
pub fn default_root_path() -> Option<PathBuf> {
    dirs::home_dir().map(|dir| dir.join(".config").join(PKG_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
version = "1.0"

[[models]]
trigger = "test_trigger_a"
label = "test label a"
sources = ["/tmp/a"]
target = "/mnt/backup"

[[models]]
trigger = "test_trigger_b"
label = "test label b"
sources = ["/tmp/b"]
target = "/mnt/backup"
ignore = ["*.log"]
"#;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert!(config.models.is_empty());
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.version, "1.0");
    }

    #[test]
    fn test_config_file_registers_models_in_order() {
        let file = write_config(SAMPLE);
        let mut registry = ModelRegistry::new();
        let mut log = RunLog::new();
        ConfigFile::new(file.path())
            .load_config(&mut registry, &mut log)
            .unwrap();

        assert_eq!(registry.len(), 2);
        let labels: Vec<_> = registry.iter().map(|(_, m)| m.label.as_str()).collect();
        assert_eq!(labels, vec!["test label a", "test label b"]);
        assert!(!log.has_warnings());
    }

    #[test]
    fn test_config_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut registry = ModelRegistry::new();
        let err = ConfigFile::new(&path)
            .load_config(&mut registry, &mut RunLog::new())
            .unwrap_err();
        assert!(err.to_string().contains("Could not find configuration file"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_config_file_parse_error() {
        let file = write_config("[[models]]\ntrigger = ");
        let err = ConfigFile::new(file.path())
            .load_config(&mut ModelRegistry::new(), &mut RunLog::new())
            .unwrap_err();
        assert!(format!("{err:#}").contains("Error parsing config file"));
    }

    #[test]
    fn test_validate_warnings() {
        let file = write_config(
            r#"
[[models]]
trigger = "a"
label = "no sources"
target = "/mnt"

[[models]]
trigger = "a"
label = "no sources"
sources = ["/tmp"]
target = "/mnt"
"#,
        );
        let mut log = RunLog::new();
        let mut registry = ModelRegistry::new();
        ConfigFile::new(file.path())
            .load_config(&mut registry, &mut log)
            .unwrap();
        assert_eq!(registry.len(), 2);
        assert!(log.has_warnings());
        let messages: Vec<_> = log.entries().iter().map(|e| e.message.clone()).collect();
        assert!(messages[0].contains("has no sources"));
        assert!(messages[1].contains("declared more than once"));
    }

    #[test]
    fn test_validate_rejects_wildcard_trigger() {
        let config = Config {
            version: default_version(),
            models: vec![Model::new("db_*", "bad")],
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must not contain"));

        let config = Config {
            version: default_version(),
            models: vec![Model::new("", "empty")],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_closure_loader() {
        let loader = |registry: &mut ModelRegistry, _: &mut RunLog| -> anyhow::Result<()> {
            registry.register(Model::new("a", "label a"));
            Ok(())
        };
        let mut registry = ModelRegistry::new();
        loader.load_config(&mut registry, &mut RunLog::new()).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_paths_defaults_under_root() {
        let paths = Paths::resolve(Some(PathBuf::from("/srv/mbackup")), None, None).unwrap();
        assert_eq!(paths.config_file, PathBuf::from("/srv/mbackup/config.toml"));
        assert_eq!(paths.log_path, PathBuf::from("/srv/mbackup/log"));

        let paths = Paths::resolve(
            Some(PathBuf::from("/srv/mbackup")),
            Some(PathBuf::from("/etc/mbackup.toml")),
            Some(PathBuf::from("/var/log/mbackup")),
        )
        .unwrap();
        assert_eq!(paths.config_file, PathBuf::from("/etc/mbackup.toml"));
        assert_eq!(paths.log_path, PathBuf::from("/var/log/mbackup"));
    }

    #[test]
    fn test_default_root_path() {
        let root = default_root_path().unwrap();
        assert!(root.ends_with("mbackup"));
    }
}
