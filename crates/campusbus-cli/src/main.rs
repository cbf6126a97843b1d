//! campusbus - issue requests against the campus bus backend from a terminal.
//!
//! Requests go through the same cached, notifying client the application
//! pages use, so GET responses are cached for the session and mutating calls
//! show a toast.

mod args;

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use campusbus_core::{ApiClient, ChannelNotifier, Config, Notification, Severity};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::Args;

/// Initialize the tracing subscriber for logging.
/// Logs go to stderr unless a log file is given. The returned guard must be
/// held until exit so buffered file output is flushed.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            Ok(None)
        }
    }
}

/// Render queued notifications as one-line toasts on stderr
fn show_toasts(rx: &mut mpsc::UnboundedReceiver<Notification>) {
    while let Ok(toast) = rx.try_recv() {
        let marker = match toast.severity {
            Severity::Success => "[ok]",
            Severity::Error => "[error]",
        };
        eprintln!("{} {}", marker, toast.message);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let guard = init_tracing(args.log_file.as_deref())?;

    let mut config = Config::load()?;
    if let Some(ref token) = args.token {
        // Persist only the file's own settings, not environment overrides
        let mut stored = Config::load_from(&Config::config_path()?)?;
        stored.token = Some(token.clone());
        stored.save()?;
        info!("Saved token to config file");
        config.token = Some(token.clone());
    }
    info!(base_url = %config.base_url, cache_ttl_ms = config.cache_ttl_ms, "campusbus starting");

    let (notifier, mut toasts) = ChannelNotifier::channel();
    let client = ApiClient::from_config(&config, Arc::new(notifier))?;
    let request = args.to_request()?;

    let mut failed = false;
    for attempt in 1..=args.repeat {
        let result = client.execute(request.clone()).await;
        show_toasts(&mut toasts);

        match result {
            Ok(response) => {
                let source = if response.is_cached() { "cache" } else { "network" };
                info!(attempt, status = response.status(), source, "Request finished");
                if args.repeat > 1 {
                    eprintln!("#{} {} from {}", attempt, response.status(), source);
                }
                println!("{}", serde_json::to_string_pretty(&response.into_data())?);
            }
            Err(e) => {
                if args.quiet {
                    eprintln!("Error: {}", e.message());
                }
                failed = true;
            }
        }
    }

    info!(cached_entries = client.cache().len(), "campusbus finished");

    if failed {
        // exit() skips destructors, so flush the log writer first
        drop(guard);
        std::process::exit(1);
    }
    Ok(())
}
