use super::app_config::{APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, AppConfig};
use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration loading and saving errors.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("failed to determine config directory")]
    ConfigDirNotFound,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Outcome of reading the configuration file.
#[derive(Debug)]
pub struct LoadedConfig {
    /// Effective configuration.
    pub config: AppConfig,
    /// File the configuration was read from or created at.
    pub path: PathBuf,
    /// The file was missing and defaults were written to it.
    pub created: bool,
    /// Why the file was ignored in favour of defaults.
    pub parse_error: Option<toml::de::Error>,
}

impl LoadedConfig {
    /// Logs how the configuration was obtained.
    pub fn report(&self) {
        if self.created {
            info!(path = %self.path.display(), "Config file not found, created default");
        }
        if let Some(e) = &self.parse_error {
            warn!(path = %self.path.display(), error = %e, "Failed to parse config file, using defaults");
        }
    }
}

/// Reads and writes the TOML configuration file.
pub struct StorageManager {
    config_dir: PathBuf,
}

impl StorageManager {
    /// Create a new `StorageManager`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration directory cannot be determined.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(ConfigError::ConfigDirNotFound)?;

        Ok(Self { config_dir })
    }

    /// Creates a new `StorageManager` with a specific directory (useful for testing).
    #[must_use]
    pub fn with_dir(path: PathBuf) -> Self {
        Self { config_dir: path }
    }

    /// Returns the configuration directory path.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Ensures the configuration directory exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the directory cannot be created.
    pub fn ensure_config_dir(&self) -> Result<(), ConfigError> {
        if !self.config_dir.exists() {
            info!("Creating configuration directory at {:?}", self.config_dir);
            fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Returns the configuration file used when no override is given.
    #[must_use]
    pub fn default_config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    /// Loads the application configuration, writing defaults if none exists.
    ///
    /// A file that fails to parse is left untouched and defaults are used;
    /// the parse error is kept in the result so it can be logged once a
    /// subscriber is installed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or the default cannot be written.
    pub fn load_config(&self, path_override: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        let path = path_override.map_or_else(|| self.default_config_path(), Path::to_path_buf);

        if !path.exists() {
            let config = AppConfig::default();
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            Self::save_to_file(&path, &config)?;
            return Ok(LoadedConfig {
                config,
                path,
                created: true,
                parse_error: None,
            });
        }

        let content = fs::read_to_string(&path)?;
        let (config, parse_error) = match toml::from_str::<AppConfig>(&content) {
            Ok(config) => (config, None),
            Err(e) => (AppConfig::default(), Some(e)),
        };
        Ok(LoadedConfig {
            config,
            path,
            created: false,
            parse_error,
        })
    }

    /// Saves the application configuration to `path_override` or the default file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be written.
    pub fn save_config(&self, config: &AppConfig, path_override: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let path = match path_override {
            Some(path) => path.to_path_buf(),
            None => {
                self.ensure_config_dir()?;
                self.default_config_path()
            }
        };
        Self::save_to_file(&path, config)?;
        Ok(path)
    }

    fn save_to_file<T: serde::Serialize>(path: &Path, data: &T) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(data)?;

        let parent = match path.parent() {
            Some(p) if p.as_os_str().is_empty() => Path::new("."),
            Some(p) => p,
            None => return Err(std::io::Error::other("Invalid path").into()),
        };
        let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.persist(path).map_err(|e| e.error)?;

        Ok(())
    }
}
