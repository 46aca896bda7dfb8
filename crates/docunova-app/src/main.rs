mod app_state;
mod cli;

use std::process::ExitCode;

use docunova_common::DocunovaError;
use docunova_config::schema::{DocunovaConfig, LogLevel};
use tracing_subscriber::EnvFilter;

use app_state::{DocunovaApp, StateLocation};

/// Load environment variables from a .env file (KEY=VALUE lines).
fn load_dotenv() {
    let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let candidates = [
        // Workspace root, two levels up from crates/docunova-app/
        manifest_dir.join("..").join("..").join(".env"),
        std::path::PathBuf::from(".env"),
    ];

    for path in &candidates {
        if let Ok(contents) = std::fs::read_to_string(path) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim().trim_matches('"').trim_matches('\'');
                    if std::env::var(key).is_err() {
                        std::env::set_var(key, value);
                    }
                }
            }
            return;
        }
    }
}

/// Logs go to stderr so streamed answers on stdout stay clean.
fn init_logging(directive: &str) {
    let filter = match directive.parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(e) => {
            eprintln!("invalid log directive '{directive}': {e}");
            EnvFilter::from_default_env()
        }
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: cli::Args, config: DocunovaConfig) -> Result<bool, DocunovaError> {
    let location = StateLocation::resolve(args.ephemeral, args.state_file, &config)?;
    if location != StateLocation::Memory {
        if let Err(e) = docunova_platform::ensure_dirs() {
            tracing::warn!("Failed to create directories: {e}");
        }
    }
    let store = location.open()?;

    let app = DocunovaApp::new(config, store)?;
    let token = args
        .token
        .or_else(|| std::env::var(docunova_config::TOKEN_ENV).ok());
    if let Some(token) = token {
        app.seed_token(&token)?;
    }
    tracing::debug!(?app, "client ready");

    let answered = match args.ask {
        Some(question) => app.ask(&question).await,
        None => app.run().await.map(|()| true)?,
    };
    app.shutdown();
    Ok(answered)
}

fn main() -> ExitCode {
    load_dotenv();

    let args = cli::parse();

    let loaded = docunova_config::load_config(args.config.as_deref());
    let directive = args.log_level.clone().unwrap_or_else(|| match &loaded {
        Ok(config) => config.logging.level.directive(),
        Err(_) => LogLevel::default().directive(),
    });
    init_logging(&directive);

    tracing::info!("DocuNova v{} starting", env!("CARGO_PKG_VERSION"));

    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        docunova_config::fallback_config()
    });
    tracing::info!(base_url = %config.api.base_url, "Config loaded");

    if args.print_config {
        println!("{}", docunova_config::config_to_json(&config));
        return ExitCode::SUCCESS;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args, config)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
