//! costwatch - Azure cost alerts and monthly cost reports.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use costwatch::config::AppConfig;
use costwatch::run::{CostMonitor, RunOutcome};
use costwatch::schedule::{run_scheduled, Job};
use costwatch::{Cli, Mode};
use costwatch_cost::AzureCostProvider;
use costwatch_report::Composer;
use notify::{EmailChannel, NotifyChannel, Notifier, StdoutChannel};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    let config = AppConfig::load(cli.config.as_deref()).context("Invalid configuration")?;
    let monitor = build_monitor(&config, cli.dry_run_channel())?;

    let mode = cli.mode();
    info!(
        mode = ?mode,
        dry_run = cli.dry_run,
        threshold = %config.threshold,
        recipients = config.recipients.len(),
        "Starting costwatch"
    );

    match mode {
        Mode::Once => run_once(&monitor, Job::DailyCheck).await,
        Mode::Monthly => run_once(&monitor, Job::MonthlyReport).await,
        Mode::Scheduled => {
            run_scheduled(&monitor, config.schedule).await;
            Ok(())
        }
    }
}

fn build_monitor(config: &AppConfig, dry_run: Option<StdoutChannel>) -> Result<CostMonitor> {
    let provider = AzureCostProvider::new(
        config.azure.credentials.clone(),
        config.azure.subscription_id.clone(),
    )
    .context("Failed to create Azure cost provider")?;

    let composer = Composer::new().context("Failed to load message templates")?;

    let channel: Arc<dyn NotifyChannel> = if let Some(stdout) = dry_run {
        warn!("Dry run: messages are printed, not emailed");
        Arc::new(stdout)
    } else {
        Arc::new(EmailChannel::new(config.smtp.clone()).context("Invalid email settings")?)
    };
    let notifier = Notifier::with_channels(vec![channel], config.recipients.clone());

    Ok(CostMonitor::new(
        Arc::new(provider),
        composer,
        notifier,
        config.threshold,
    ))
}

async fn run_once(monitor: &CostMonitor, job: Job) -> Result<()> {
    let today = Local::now().date_naive();
    let outcome = monitor
        .run(job, today)
        .await
        .with_context(|| format!("{job} run failed"))?;

    match outcome {
        RunOutcome::Sent => info!(job = %job, "Done"),
        other => info!(job = %job, outcome = ?other, "Done, nothing sent"),
    }
    Ok(())
}
