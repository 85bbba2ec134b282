//! Recurring job schedule.
//!
//! Times are wall-clock local times. The daily check fires every day at
//! `daily_at`; the monthly report fires on the 1st at `monthly_at`.

use std::future::Future;

use chrono::{Datelike, Days, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{error, info};

use crate::run::{CostMonitor, RunOutcome};

/// A scheduled unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Threshold check for yesterday's spend.
    DailyCheck,
    /// Per-creator report for the previous month.
    MonthlyReport,
}

impl Job {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DailyCheck => "daily-check",
            Self::MonthlyReport => "monthly-report",
        }
    }
}

impl std::fmt::Display for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When each job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub daily_at: NaiveTime,
    pub monthly_at: NaiveTime,
}

impl Schedule {
    /// First daily check strictly after `now`.
    pub fn next_daily(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.daily_at);
        if today > now {
            today
        } else {
            next_day(now.date()).and_time(self.daily_at)
        }
    }

    /// First monthly report strictly after `now`.
    pub fn next_monthly(&self, now: NaiveDateTime) -> NaiveDateTime {
        let first = first_of_month(now.date());
        let this_month = first.and_time(self.monthly_at);
        if this_month > now {
            this_month
        } else {
            first
                .checked_add_months(Months::new(1))
                .unwrap_or(first)
                .and_time(self.monthly_at)
        }
    }

    /// The next firing time and the jobs due then, daily check first.
    pub fn next_run(&self, now: NaiveDateTime) -> (NaiveDateTime, Vec<Job>) {
        let daily = self.next_daily(now);
        let monthly = self.next_monthly(now);

        match daily.cmp(&monthly) {
            std::cmp::Ordering::Less => (daily, vec![Job::DailyCheck]),
            std::cmp::Ordering::Greater => (monthly, vec![Job::MonthlyReport]),
            std::cmp::Ordering::Equal => (daily, vec![Job::DailyCheck, Job::MonthlyReport]),
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}

/// Run jobs on `schedule` until Ctrl-C.
///
/// A failed run is logged and the loop moves on to the next firing.
pub async fn run_scheduled(monitor: &CostMonitor, schedule: Schedule) {
    run_scheduled_until(monitor, schedule, async {
        tokio::signal::ctrl_c().await.ok();
        info!("Received SIGINT, shutting down");
    })
    .await;
}

/// Run jobs on `schedule` until `shutdown` completes.
///
/// Shutdown is honoured while waiting and while a job is in flight; an
/// interrupted job sends nothing.
pub async fn run_scheduled_until<F>(monitor: &CostMonitor, schedule: Schedule, shutdown: F)
where
    F: Future<Output = ()>,
{
    info!(
        daily_at = %schedule.daily_at.format("%H:%M"),
        monthly_at = %schedule.monthly_at.format("%H:%M"),
        "Starting scheduled mode"
    );

    tokio::select! {
        () = run_forever(monitor, schedule) => {}
        () = shutdown => {
            info!("Scheduler stopped");
        }
    }
}

async fn run_forever(monitor: &CostMonitor, schedule: Schedule) {
    loop {
        let now = Local::now().naive_local();
        let (at, jobs) = schedule.next_run(now);
        let wait = (at - now).to_std().unwrap_or_default();
        info!(next_run = %at, jobs = ?jobs, "Waiting for next scheduled run");
        tokio::time::sleep(wait).await;

        for job in jobs {
            match monitor.run(job, at.date()).await {
                Ok(RunOutcome::Sent) => info!(job = %job, "Scheduled run complete"),
                Ok(outcome) => info!(job = %job, outcome = ?outcome, "Scheduled run complete, nothing sent"),
                Err(e) => error!(job = %job, error = %e, "Scheduled run failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> Schedule {
        Schedule {
            daily_at: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            monthly_at: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_next_daily() {
        let s = schedule();
        assert_eq!(s.next_daily(at(2024, 3, 5, 8, 59)), at(2024, 3, 5, 9, 0));
        assert_eq!(s.next_daily(at(2024, 3, 5, 9, 0)), at(2024, 3, 6, 9, 0));
        assert_eq!(s.next_daily(at(2024, 12, 31, 23, 0)), at(2025, 1, 1, 9, 0));
    }

    #[test]
    fn test_next_monthly() {
        let s = schedule();
        assert_eq!(s.next_monthly(at(2024, 3, 1, 9, 30)), at(2024, 3, 1, 10, 0));
        assert_eq!(s.next_monthly(at(2024, 3, 1, 10, 0)), at(2024, 4, 1, 10, 0));
        assert_eq!(s.next_monthly(at(2024, 12, 15, 0, 0)), at(2025, 1, 1, 10, 0));
    }

    #[test]
    fn test_next_run_picks_earliest() {
        let s = schedule();

        let (when, jobs) = s.next_run(at(2024, 3, 1, 0, 0));
        assert_eq!(when, at(2024, 3, 1, 9, 0));
        assert_eq!(jobs, vec![Job::DailyCheck]);

        let (when, jobs) = s.next_run(at(2024, 3, 1, 9, 0));
        assert_eq!(when, at(2024, 3, 1, 10, 0));
        assert_eq!(jobs, vec![Job::MonthlyReport]);

        let (when, jobs) = s.next_run(at(2024, 3, 1, 10, 0));
        assert_eq!(when, at(2024, 3, 2, 9, 0));
        assert_eq!(jobs, vec![Job::DailyCheck]);
    }

    #[test]
    fn test_same_time_runs_both() {
        let s = Schedule {
            daily_at: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            monthly_at: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        };
        let (when, jobs) = s.next_run(at(2024, 2, 29, 12, 0));
        assert_eq!(when, at(2024, 3, 1, 9, 0));
        assert_eq!(jobs, vec![Job::DailyCheck, Job::MonthlyReport]);
    }
}
