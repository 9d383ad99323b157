use anyhow::{Context, Result};
use clap::Parser;
use langroute::app::{self, report_error};
use langroute::cli::Cli;
use langroute::config::Config;
use langroute::defaults::exit_code;
use langroute::logging;
use std::process::exit;

#[tokio::main]
async fn main() {
    // Credentials may live in a local .env file.
    dotenvy::dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not errors.
            let code = if e.use_stderr() {
                exit_code::USAGE_ERROR
            } else {
                exit_code::SUCCESS
            };
            e.print().ok();
            exit(code);
        }
    };

    if let Err(e) = cli.validate() {
        report_error(&e.to_string());
        exit(e.exit_code());
    }

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            report_error(&format!("{e:#}"));
            exit(exit_code::USAGE_ERROR);
        }
    };
    cli.apply_to(&mut config);
    if let Err(e) = config.validate() {
        report_error(&e.to_string());
        exit(e.exit_code());
    }

    let log_dir = config
        .logging
        .file_logging
        .then(|| config.logging.log_dir.clone());
    match logging::init(logging::level_for(cli.debug, cli.quiet), log_dir.as_deref()) {
        Ok(Some(path)) => log::debug!("Logging to {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            report_error(&format!("{e:#}"));
            exit(exit_code::USAGE_ERROR);
        }
    }
    log::debug!("langroute {}", langroute::version_string());

    exit(app::run(&cli, &config).await);
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/langroute/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&std::path::Path>) -> Result<Config> {
    let config = match (custom_path, Config::default_path()) {
        (Some(path), _) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        (None, Some(default_path)) => Config::load_or_default(&default_path)?,
        (None, None) => Config::default(),
    };

    Ok(config.with_env_overrides())
}
