use super::app_config::LogLevel;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "htpc-helpers",
    version,
    about = "Image cache, templates and certificates for the HTPC dashboard",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Development mode.
    #[arg(long, global = true)]
    pub dev: bool,

    /// Data directory (image cache, certificates).
    #[arg(long, value_name = "PATH", global = true, env = "HTPC_DATADIR")]
    pub data_dir: Option<PathBuf>,

    /// Installation directory containing `interfaces/`.
    #[arg(long, value_name = "PATH", global = true)]
    pub run_dir: Option<PathBuf>,

    /// Theme name.
    #[arg(long, global = true)]
    pub app_template: Option<String>,

    /// Disable image transforms.
    #[arg(long, global = true)]
    pub no_transforms: bool,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Operator commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch an image through the cache, optionally transformed.
    Image(ImageArgs),

    /// Create a self-signed certificate and private key.
    Certs {
        /// Certificate output path.
        #[arg(long, value_name = "PATH")]
        cert: Option<PathBuf>,

        /// Private key output path.
        #[arg(long, value_name = "PATH")]
        key: Option<PathBuf>,
    },

    /// Render a theme template to stdout.
    Render {
        /// Template name relative to the theme's html directory.
        name: String,

        /// Template variable as KEY=VALUE.
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        vars: Vec<(String, String)>,
    },

    /// Print the effective configuration as TOML.
    Config {
        /// Also write it back to the configuration file.
        #[arg(long)]
        write: bool,
    },
}

/// Arguments of the `image` command.
#[derive(Debug, Args)]
pub struct ImageArgs {
    /// Source URL.
    pub url: String,

    /// Target width in pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Target height in pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Opacity from 0 to 100.
    #[arg(long, default_value_t = 100.0)]
    pub opacity: f32,

    /// Color mode (1, L, LA, P, RGB, RGBA).
    #[arg(long)]
    pub mode: Option<String>,

    /// Basic auth user name.
    #[arg(long, requires = "password")]
    pub username: Option<String>,

    /// Basic auth password.
    #[arg(long, env = "HTPC_IMAGE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Extra request header as NAME=VALUE.
    #[arg(long = "header", value_name = "NAME=VALUE", value_parser = parse_key_val)]
    pub headers: Vec<(String, String)>,

    /// Ask the remote server not to answer from its cache.
    #[arg(long)]
    pub no_cache: bool,

    /// Copy the served bytes to this file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))
}
