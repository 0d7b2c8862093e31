// src/main.rs
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use scenario_forecast::adapter::ForecastCoordinator;
use scenario_forecast::config::Config;
use scenario_forecast::domain::errors::{AppError, AppResult};

/// Scenario-adjusted forecasts from tabular data
#[derive(Debug, Parser)]
#[command(name = "scenario-forecast", version, about)]
struct Cli {
    /// JSON forecast request; reads stdin when omitted or "-"
    request: Option<PathBuf>,

    /// JSON configuration file; environment variables are used otherwise
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Print remaining requests for this user after the forecast
    #[arg(long)]
    show_quota: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            if e.is_user_visible() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    // Load configuration
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    // Initialize logging
    config.init_logging()?;

    log::info!("Starting scenario-forecast v{}", env!("CARGO_PKG_VERSION"));

    let body = read_request(cli.request.as_ref())?;
    let user_id = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("user_id").and_then(|u| u.as_str()).map(str::to_string))
        .unwrap_or_else(|| "anonymous".to_string());

    let coordinator = ForecastCoordinator::from_config(&config);
    let output = coordinator.handle_json(&body).await?;
    println!("{}", output);

    if cli.show_quota {
        let remaining = coordinator.remaining_requests(&user_id).await?;
        log::info!("Remaining requests for {}: {}", user_id, remaining);
        eprintln!("remaining requests for {}: {}", user_id, remaining);
    }

    Ok(())
}

fn read_request(path: Option<&PathBuf>) -> AppResult<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path).map_err(|e| {
            AppError::Validation(format!("cannot read request {}: {}", path.display(), e))
        }),
        _ => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            Ok(body)
        }
    }
}
