use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, bail, eyre};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use htpc_helpers::application::services::basic_auth;
use htpc_helpers::application::{TemplateService, create_https_certificates};
use htpc_helpers::domain::ImageRequest;
use htpc_helpers::infrastructure::config::{ImageArgs, LoadedConfig};
use htpc_helpers::infrastructure::{
    AppConfig, CliArgs, Command, HandlebarsTheme, ImageService, RcgenCertificateBackend,
    StorageManager,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn storage_for(args: &CliArgs) -> Result<StorageManager> {
    Ok(match &args.config {
        Some(path) => {
            StorageManager::with_dir(path.parent().map(Path::to_path_buf).unwrap_or_default())
        }
        None => StorageManager::new()?,
    })
}

fn load_config(storage: &StorageManager, args: &CliArgs) -> Result<LoadedConfig> {
    let mut loaded = storage.load_config(args.config.as_deref())?;
    loaded.config.merge_with_args(args);
    Ok(loaded)
}

async fn run_image(config: &AppConfig, args: ImageArgs) -> Result<()> {
    let service = ImageService::from_config(config)?;

    let mut request = ImageRequest::new(args.url);
    request.params.width = args.width;
    request.params.height = args.height;
    request.params.opacity = args.opacity;
    request.params.mode = args.mode;
    request.fetch.headers = args.headers;
    request.fetch.bypass_remote_cache = args.no_cache;
    if let (Some(user), Some(password)) = (&args.username, &args.password) {
        request.fetch.auth = Some(basic_auth(user, password));
    }

    let Some(served) = service.get_image(&request).await else {
        bail!("no image available for {}", request.fetch.url);
    };

    if let Some(output) = args.output {
        tokio::fs::write(&output, &served.bytes).await?;
    }
    println!(
        "{}\t{}\t{}",
        served.content_type,
        served.source,
        served.path.display()
    );
    Ok(())
}

fn run_certs(
    config: &AppConfig,
    cert: Option<PathBuf>,
    key: Option<PathBuf>,
) -> Result<()> {
    let cert = cert.unwrap_or_else(|| config.cert_path());
    let key = key.unwrap_or_else(|| config.key_path());

    if !create_https_certificates(&RcgenCertificateBackend, &cert, &key) {
        bail!("failed to create certificates, see the log for details");
    }
    println!("{}\n{}", cert.display(), key.display());
    Ok(())
}

fn run_config(
    storage: &StorageManager,
    config: &AppConfig,
    path: Option<&Path>,
    write: bool,
) -> Result<()> {
    if write {
        let path = storage.save_config(config, path)?;
        info!(path = %path.display(), "Saved configuration");
    }
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn run_render(config: &AppConfig, name: &str, vars: Vec<(String, String)>) -> Result<()> {
    let theme = HandlebarsTheme::new(&config.effective_run_dir(), &config.app_template);
    let service = TemplateService::new(Arc::new(theme), config.is_debug());

    let context: serde_json::Map<String, serde_json::Value> = vars
        .into_iter()
        .map(|(k, v)| (k, serde_json::Value::String(v)))
        .collect();

    let html = service
        .serve_template(name, &serde_json::Value::Object(context))
        .ok_or_else(|| eyre!("failed to render {name}"))?;
    print!("{html}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let storage = storage_for(&args)?;
    let loaded = load_config(&storage, &args)?;
    let config = &loaded.config;

    init_logging(config)?;

    info!(version = htpc_helpers::VERSION, "Starting {}", htpc_helpers::NAME);
    loaded.report();

    match args.command {
        Command::Image(image) => run_image(config, image).await,
        Command::Certs { cert, key } => run_certs(config, cert, key),
        Command::Render { name, vars } => run_render(config, &name, vars),
        Command::Config { write } => run_config(&storage, config, args.config.as_deref(), write),
    }
}
