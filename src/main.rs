mod config;
mod error;
mod ip;
mod locator;
mod notify;
mod provider;
mod reconcile;
mod run;
#[cfg(test)]
mod testing;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use notify::{Notify, SmtpNotifier};
use provider::cloudflare::CloudflareClient;
use reconcile::Reconciler;

#[derive(Parser, Debug)]
#[command(name = "ddns-updater")]
#[command(about = "Keeps Cloudflare DNS records pointed at the current public IP")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log intended changes without modifying any record
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match try_main().await {
        Ok(code) => code,
        Err(e) => {
            // The logger may not be up yet if the config failed to load.
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn try_main() -> Result<ExitCode> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration first (before logger init)
    let mut config = config::Config::load(&args.config)?;
    config.dry_run |= args.dry_run;

    // Initialize logger with config log level (env var takes precedence)
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.log_level)
    ).init();

    info!("Loaded configuration from: {}", args.config);
    info!("Watching {} record(s): {:?}", config.records.len(), config.records);

    let resolver = ip::IpResolver::new(&config.ip)?;
    let api = CloudflareClient::new(&config.cloudflare)?;
    let reconciler = Reconciler::new(api, config.on_duplicate, config.dry_run);
    let notifier = config
        .notify
        .as_ref()
        .map(SmtpNotifier::new)
        .transpose()
        .context("Invalid notify configuration")?;

    let current_ip = resolver
        .current_ip()
        .await
        .context("Could not determine the current public IP")?;
    info!("Current public IP: {}", current_ip);

    let summary = run::run(
        &reconciler,
        notifier.as_ref().map(|n| n as &dyn Notify),
        &config.records,
        &current_ip,
    )
    .await;

    info!(
        "Done: {} updated, {} would update, {} unchanged, {} failed",
        summary.updated.len(),
        summary.would_update.len(),
        summary.unchanged.len(),
        summary.failed.len()
    );

    if summary.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}
