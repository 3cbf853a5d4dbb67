//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::infrastructure::image::{DEFAULT_JPEG_QUALITY, DEFAULT_MAX_PIXELS, DEFAULT_TIMEOUT_SECS};

pub(crate) const APP_NAME: &str = "htpc-manager";
pub(crate) const APP_QUALIFIER: &str = "com";
pub(crate) const APP_ORGANIZATION: &str = "htpc";

/// Relative location of the faded placeholder inside the run directory.
const PLACEHOLDER_ASSET: &str = "interfaces/default/img/fff_20.png";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Development mode: template errors render a diagnostic page.
    #[serde(default)]
    pub dev: bool,

    /// Directory holding the image cache and generated certificates.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Installation directory containing `interfaces/`.
    #[serde(default)]
    pub run_dir: Option<PathBuf>,

    /// Theme name under `interfaces/`.
    #[serde(default = "default_app_template")]
    pub app_template: String,

    /// Image cache configuration.
    #[serde(default)]
    pub images: ImagesConfig,

    /// Certificate configuration.
    #[serde(default)]
    pub tls: TlsConfig,
}

/// Image cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Allow resize/opacity/mode transforms.
    #[serde(default = "default_true")]
    pub enable_transforms: bool,

    /// Download timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// JPEG quality of derived variants.
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Largest resize target in pixels; bigger requests serve the original.
    #[serde(default = "default_max_pixels")]
    pub max_pixels: u64,

    /// Image served for faded requests when transforms are unavailable.
    #[serde(default)]
    pub placeholder: Option<PathBuf>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            enable_transforms: true,
            timeout_secs: default_timeout_secs(),
            jpeg_quality: default_jpeg_quality(),
            max_pixels: default_max_pixels(),
            placeholder: None,
        }
    }
}

/// Certificate configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TlsConfig {
    /// PEM certificate path.
    #[serde(default)]
    pub cert_file: Option<PathBuf>,

    /// PEM private key path.
    #[serde(default)]
    pub key_file: Option<PathBuf>,
}

fn default_app_template() -> String {
    "default".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_max_pixels() -> u64 {
    DEFAULT_MAX_PIXELS
}

use super::args::CliArgs;

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if args.dev {
            self.dev = true;
        }
        if let Some(data_dir) = &args.data_dir {
            self.data_dir = Some(data_dir.clone());
        }
        if let Some(run_dir) = &args.run_dir {
            self.run_dir = Some(run_dir.clone());
        }
        if let Some(template) = &args.app_template {
            self.app_template.clone_from(template);
        }
        if args.no_transforms {
            self.images.enable_transforms = false;
        }
    }

    /// Returns true when diagnostics should reach the user.
    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.dev || self.log_level == LogLevel::Debug
    }

    /// Returns default data directory.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME).map_or_else(
            || std::env::temp_dir().join(APP_NAME),
            |dirs| dirs.data_dir().to_path_buf(),
        )
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("htpc-helpers.log"))
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }

    /// Returns effective data directory.
    #[must_use]
    pub fn effective_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(Self::default_data_dir)
    }

    /// Returns effective run directory, falling back to the working directory.
    #[must_use]
    pub fn effective_run_dir(&self) -> PathBuf {
        self.run_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Returns the image cache directory.
    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.effective_data_dir().join("images")
    }

    /// Returns the placeholder served for faded images without transforms.
    #[must_use]
    pub fn placeholder_path(&self) -> PathBuf {
        self.images
            .placeholder
            .clone()
            .unwrap_or_else(|| self.effective_run_dir().join(PLACEHOLDER_ASSET))
    }

    /// Returns the certificate path.
    #[must_use]
    pub fn cert_path(&self) -> PathBuf {
        self.tls
            .cert_file
            .clone()
            .unwrap_or_else(|| self.effective_data_dir().join("certs").join("htpc.crt"))
    }

    /// Returns the private key path.
    #[must_use]
    pub fn key_path(&self) -> PathBuf {
        self.tls
            .key_file
            .clone()
            .unwrap_or_else(|| self.effective_data_dir().join("certs").join("htpc.key"))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            dev: false,
            data_dir: None,
            run_dir: None,
            app_template: default_app_template(),
            images: ImagesConfig::default(),
            tls: TlsConfig::default(),
        }
    }
}
