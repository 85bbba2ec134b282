//! Run orchestration: fetch, aggregate, compose, send.

use std::sync::Arc;

use chrono::NaiveDate;
use costwatch_cost::{
    collect_records, format_amount, CostProvider, CostProviderError, DailySummary,
    MonthlySummary, ReportPeriod, TagScope, TOP_RESOURCE_LIMIT,
};
use costwatch_report::{Composer, ReportError};
use notify::{ChannelError, Notifier};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::schedule::Job;

/// Why a run produced no notification, or that it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A message was delivered.
    Sent,
    /// The daily total did not exceed the threshold.
    BelowThreshold { total: Decimal, threshold: Decimal },
    /// The data source returned no cost rows for the day.
    NoData,
}

/// A run that failed. Nothing is retried; the next run starts fresh.
#[derive(Debug, Error)]
pub enum RunError {
    /// Cost data or tags could not be fetched
    #[error("Cost data source unavailable: {0}")]
    DataSource(#[from] CostProviderError),

    /// The message could not be rendered
    #[error("Failed to compose message: {0}")]
    Compose(#[from] ReportError),

    /// The message could not be delivered
    #[error("Failed to send notification: {0}")]
    Notification(#[from] ChannelError),
}

/// Ties a cost data source to the composer and notifier.
pub struct CostMonitor {
    provider: Arc<dyn CostProvider>,
    composer: Composer,
    notifier: Notifier,
    threshold: Decimal,
}

impl CostMonitor {
    pub fn new(
        provider: Arc<dyn CostProvider>,
        composer: Composer,
        notifier: Notifier,
        threshold: Decimal,
    ) -> Self {
        Self {
            provider,
            composer,
            notifier,
            threshold,
        }
    }

    /// Run `job` as if the current date were `today`.
    pub async fn run(&self, job: Job, today: NaiveDate) -> Result<RunOutcome, RunError> {
        match job {
            Job::DailyCheck => self.run_daily_check(today).await,
            Job::MonthlyReport => self.run_monthly_report(today).await,
        }
    }

    /// Check yesterday's total against the threshold and alert if exceeded.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn run_daily_check(&self, today: NaiveDate) -> Result<RunOutcome, RunError> {
        let period = ReportPeriod::yesterday(today);
        let records = collect_records(
            self.provider.as_ref(),
            &period,
            TagScope::Top(TOP_RESOURCE_LIMIT),
        )
        .await?;

        if records.is_empty() {
            warn!(date = %period, "No cost data for the day, skipping threshold check");
            return Ok(RunOutcome::NoData);
        }

        let summary = DailySummary::build(period, &records, self.threshold);
        let total = summary.threshold.total_cost;
        info!(
            date = %summary.period,
            total = %format_amount(total, &summary.currency),
            threshold = %format_amount(self.threshold, &summary.currency),
            resources = summary.resource_count,
            "Daily cost computed"
        );

        if !summary.exceeded() {
            info!("Daily cost within threshold, no alert sent");
            return Ok(RunOutcome::BelowThreshold {
                total,
                threshold: self.threshold,
            });
        }

        let message = self.composer.compose_daily_alert(&summary)?;
        self.notifier.send(&message).await?;

        info!(
            overage = %format_amount(summary.threshold.overage, &summary.currency),
            recipients = self.notifier.recipients().len(),
            "Cost alert sent"
        );
        Ok(RunOutcome::Sent)
    }

    /// Report last month's spend per creator.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn run_monthly_report(&self, today: NaiveDate) -> Result<RunOutcome, RunError> {
        let period = ReportPeriod::previous_month(today);
        let records = collect_records(self.provider.as_ref(), &period, TagScope::All).await?;

        let summary = MonthlySummary::build(period, &records);
        if summary.is_empty() {
            warn!(month = %summary.period, "No cost data for the month, sending empty report");
        } else {
            info!(
                month = %summary.period,
                total = %format_amount(summary.total_cost, &summary.currency),
                creators = summary.creator_count(),
                resources = summary.resource_count,
                "Monthly cost aggregated"
            );
        }

        let message = self.composer.compose_monthly_report(&summary)?;
        self.notifier.send(&message).await?;

        info!(
            recipients = self.notifier.recipients().len(),
            "Monthly report sent"
        );
        Ok(RunOutcome::Sent)
    }
}
