//! Integration tests for run orchestration.
//!
//! These drive `CostMonitor` end to end with an in-memory cost source and a
//! channel that records what would have been sent.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use costwatch::{run_scheduled_until, CostMonitor, Job, RunError, RunOutcome, Schedule};
use costwatch_cost::{CostProvider, CostProviderError, CostRow, ReportPeriod};
use costwatch_report::Composer;
use notify::{ChannelError, Message, NotifyChannel, Notifier};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// =============================================================================
// Test doubles
// =============================================================================

/// Cost source backed by fixed rows and tags.
#[derive(Default)]
struct StaticProvider {
    rows: Vec<CostRow>,
    tags: HashMap<String, HashMap<String, String>>,
    fail_query: bool,
    /// Periods queried, as labels.
    queried: Mutex<Vec<String>>,
}

impl StaticProvider {
    fn with_resource(mut self, name: &str, cost: Decimal, tags: &[(&str, &str)]) -> Self {
        let id = format!("/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Compute/virtualMachines/{name}");
        self.tags.insert(
            id.clone(),
            tags.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        );
        self.rows.push(CostRow {
            resource_id: id,
            resource_type: "Microsoft.Compute/virtualMachines".to_string(),
            resource_group: "rg".to_string(),
            cost,
            currency: "USD".to_string(),
        });
        self
    }
}

#[async_trait]
impl CostProvider for StaticProvider {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn query_costs(&self, period: &ReportPeriod) -> Result<Vec<CostRow>, CostProviderError> {
        self.queried.lock().unwrap().push(period.label.clone());
        if self.fail_query {
            return Err(CostProviderError::Auth("token expired".to_string()));
        }
        Ok(self.rows.clone())
    }

    async fn resource_tags(
        &self,
        resource_id: &str,
    ) -> Result<HashMap<String, String>, CostProviderError> {
        Ok(self.tags.get(resource_id).cloned().unwrap_or_default())
    }
}

/// Cost source whose query never completes.
#[derive(Default)]
struct StalledProvider {
    started: AtomicUsize,
}

#[async_trait]
impl CostProvider for StalledProvider {
    fn name(&self) -> &'static str {
        "stalled"
    }

    async fn query_costs(&self, _period: &ReportPeriod) -> Result<Vec<CostRow>, CostProviderError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }

    async fn resource_tags(
        &self,
        _resource_id: &str,
    ) -> Result<HashMap<String, String>, CostProviderError> {
        Ok(HashMap::new())
    }
}

/// Channel that keeps every message it is given.
#[derive(Default)]
struct RecordingChannel {
    sent: Mutex<Vec<Message>>,
    fail: bool,
}

#[async_trait]
impl NotifyChannel for RecordingChannel {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn enabled(&self) -> bool {
        true
    }

    async fn send(&self, message: &Message, _recipients: &[String]) -> Result<(), ChannelError> {
        if self.fail {
            return Err(ChannelError::Other("relay refused".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

fn monitor(
    provider: StaticProvider,
    channel: &Arc<RecordingChannel>,
    threshold: Decimal,
) -> (CostMonitor, Arc<StaticProvider>) {
    let provider = Arc::new(provider);
    let notifier = Notifier::with_channels(
        vec![channel.clone() as Arc<dyn NotifyChannel>],
        vec!["ops@example.com".to_string()],
    );
    let monitor = CostMonitor::new(
        provider.clone(),
        Composer::new().unwrap(),
        notifier,
        threshold,
    );
    (monitor, provider)
}

fn example_provider() -> StaticProvider {
    StaticProvider::default()
        .with_resource("A", dec!(60), &[("Owner", "alice")])
        .with_resource("B", dec!(40), &[("creator", "bob")])
        .with_resource("C", dec!(10), &[])
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

// =============================================================================
// Daily check
// =============================================================================

#[tokio::test]
async fn test_daily_check_sends_alert_when_exceeded() {
    let channel = Arc::new(RecordingChannel::default());
    let (monitor, provider) = monitor(example_provider(), &channel, dec!(90));

    let outcome = monitor.run(Job::DailyCheck, today()).await.unwrap();
    assert_eq!(outcome, RunOutcome::Sent);
    assert_eq!(*provider.queried.lock().unwrap(), vec!["2024-02-29".to_string()]);

    let sent = channel.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].subject,
        "Azure Cost Alert - 2024-02-29 Cost Exceeded Threshold"
    );
    assert!(sent[0].text.contains("Exceeded Amount: $20.00"));
    assert!(sent[0].text.contains("Creator: alice"));
}

#[tokio::test]
async fn test_daily_check_below_threshold_sends_nothing() {
    let channel = Arc::new(RecordingChannel::default());
    let (monitor, _) = monitor(example_provider(), &channel, dec!(110));

    let outcome = monitor.run_daily_check(today()).await.unwrap();
    assert_eq!(
        outcome,
        RunOutcome::BelowThreshold {
            total: dec!(110),
            threshold: dec!(110),
        }
    );
    assert!(channel.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_daily_check_without_data() {
    let channel = Arc::new(RecordingChannel::default());
    let (monitor, _) = monitor(StaticProvider::default(), &channel, dec!(50));

    let outcome = monitor.run_daily_check(today()).await.unwrap();
    assert_eq!(outcome, RunOutcome::NoData);
    assert!(channel.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_data_source_failure_sends_nothing() {
    let channel = Arc::new(RecordingChannel::default());
    let provider = StaticProvider {
        fail_query: true,
        ..example_provider()
    };
    let (monitor, _) = monitor(provider, &channel, dec!(0));

    let err = monitor.run_daily_check(today()).await.unwrap_err();
    assert!(matches!(
        err,
        RunError::DataSource(CostProviderError::Auth(_))
    ));
    assert!(channel.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_notification_failure_is_reported() {
    let channel = Arc::new(RecordingChannel {
        fail: true,
        ..RecordingChannel::default()
    });
    let (monitor, _) = monitor(example_provider(), &channel, dec!(1));

    let err = monitor.run_daily_check(today()).await.unwrap_err();
    assert!(matches!(err, RunError::Notification(_)));
}

// =============================================================================
// Monthly report
// =============================================================================

#[tokio::test]
async fn test_monthly_report_groups_by_creator() {
    let channel = Arc::new(RecordingChannel::default());
    let (monitor, provider) = monitor(example_provider(), &channel, dec!(0));

    let outcome = monitor.run(Job::MonthlyReport, today()).await.unwrap();
    assert_eq!(outcome, RunOutcome::Sent);
    assert_eq!(*provider.queried.lock().unwrap(), vec!["2024-02".to_string()]);

    let sent = channel.sent.lock().unwrap();
    assert_eq!(sent[0].subject, "Azure Monthly Cost Report - 2024-02");

    let text = &sent[0].text;
    let alice = text.find("1. alice").unwrap();
    let bob = text.find("2. bob").unwrap();
    let unknown = text.find("3. Unknown").unwrap();
    assert!(alice < bob && bob < unknown);
    assert!(text.contains("Percentage: 54.5%"));
    assert!(text.contains("Percentage: 36.4%"));
    assert!(text.contains("Percentage: 9.1%"));
}

#[tokio::test]
async fn test_monthly_report_without_data_is_still_sent() {
    let channel = Arc::new(RecordingChannel::default());
    let (monitor, _) = monitor(StaticProvider::default(), &channel, dec!(50));

    let outcome = monitor.run_monthly_report(today()).await.unwrap();
    assert_eq!(outcome, RunOutcome::Sent);

    let sent = channel.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.contains("No cost data for this period"));
    assert!(sent[0].text.contains("Total Cost: $0.00"));
}

// =============================================================================
// Scheduled mode
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_shutdown_interrupts_running_job() {
    let channel = Arc::new(RecordingChannel::default());
    let provider = Arc::new(StalledProvider::default());
    let monitor = CostMonitor::new(
        provider.clone(),
        Composer::new().unwrap(),
        Notifier::with_channels(
            vec![channel.clone() as Arc<dyn NotifyChannel>],
            vec!["ops@example.com".to_string()],
        ),
        dec!(0),
    );
    let schedule = Schedule {
        daily_at: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        monthly_at: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
    };

    // The first firing is at most a day away; shut down a day after that.
    let shutdown = tokio::time::sleep(Duration::from_secs(48 * 60 * 60));
    run_scheduled_until(&monitor, schedule, shutdown).await;

    assert_eq!(provider.started.load(Ordering::SeqCst), 1);
    assert!(channel.sent.lock().unwrap().is_empty());
}
