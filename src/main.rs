use agentsim::cli::{self, Cli, Commands, OutputMode};
use agentsim::config::{AppConfig, LoggingConfig};
use agentsim::tui;
use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_DIR: &str = "logs";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load_from(&cli.config)?;
    if let Err(errors) = config.validate() {
        bail!("invalid configuration: {}", errors.join("; "));
    }
    let mode = OutputMode::from_json_flag(cli.json);

    match &cli.command {
        None | Some(Commands::Dashboard) => {
            // The terminal belongs to the dashboard, so logs only go to file
            init_logging(&config.logging, false);
            info!(
                provider_configured = config.strategy_provider.is_configured(),
                tick_interval_ms = config.simulation.tick_interval_ms,
                "starting dashboard"
            );
            tui::run_dashboard(&config).await?;
        }
        Some(Commands::Simulate {
            agents,
            seconds,
            balance,
            seed,
        }) => {
            init_logging(&config.logging, true);
            cli::simulate(&config, *agents, *seconds, balance, *seed, mode).await?;
        }
        Some(Commands::Strategies) => {
            init_logging_simple();
            cli::list_strategies(mode)?;
        }
        Some(Commands::Generate { goal }) => {
            init_logging_simple();
            if !config.strategy_provider.is_configured() {
                warn!("no strategy provider key configured, using the local template");
            }
            cli::generate(&config, goal, mode).await?;
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig, console: bool) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},agentsim=debug", config.level)));

    let log_dir = config
        .directory
        .clone()
        .or_else(|| std::env::var("AGENTSIM_LOG_DIR").ok())
        .unwrap_or_else(|| DEFAULT_LOG_DIR.to_string());

    // `rolling::daily` panics if it cannot create the first file, so check
    // writability before building the appender.
    let file_layer = if std::fs::create_dir_all(&log_dir).is_ok() {
        let test_path = std::path::Path::new(&log_dir).join(".agentsim_write_test");
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&test_path)
        {
            Ok(_) => {
                let _ = std::fs::remove_file(&test_path);

                let file_appender = tracing_appender::rolling::daily(&log_dir, "agentsim.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                Box::leak(Box::new(guard));

                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true),
                )
            }
            Err(e) => {
                eprintln!(
                    "Warning: Could not write to log directory {} ({}), file logging disabled",
                    log_dir, e
                );
                None
            }
        }
    } else {
        eprintln!(
            "Warning: Could not create log directory {}, file logging disabled",
            log_dir
        );
        None
    };

    let (console_plain, console_json) = match (console, config.json) {
        (false, _) => (None, None),
        (true, false) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            ),
            None,
        ),
        (true, true) => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
        ),
    };

    let file_logging_enabled = file_layer.is_some();
    tracing_subscriber::registry()
        .with(filter)
        .with(console_plain)
        .with(console_json)
        .with(file_layer)
        .init();

    if file_logging_enabled && console {
        eprintln!("Logging to: {}/agentsim.log", log_dir);
    }
}

fn init_logging_simple() {
    // Minimal logging for one-shot commands
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .try_init();
}
