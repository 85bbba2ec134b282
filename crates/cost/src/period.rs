//! Reporting periods for cost queries.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// An inclusive range of calendar days a report covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    /// First day of the period.
    pub start: NaiveDate,
    /// Last day of the period (inclusive).
    pub end: NaiveDate,
    /// Human-readable label (`2024-01-15` for a day, `2024-01` for a month).
    pub label: String,
}

impl ReportPeriod {
    /// The single day before `today`.
    #[must_use]
    pub fn yesterday(today: NaiveDate) -> Self {
        let day = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        Self::day(day)
    }

    /// A single calendar day.
    #[must_use]
    pub fn day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
            label: day.format("%Y-%m-%d").to_string(),
        }
    }

    /// The full calendar month before the month containing `today`.
    #[must_use]
    pub fn previous_month(today: NaiveDate) -> Self {
        let first_of_this_month = today.with_day(1).unwrap_or(today);
        let start = first_of_this_month
            .checked_sub_months(Months::new(1))
            .unwrap_or(first_of_this_month);
        let end = first_of_this_month
            .checked_sub_days(Days::new(1))
            .unwrap_or(first_of_this_month);

        Self {
            start,
            end,
            label: start.format("%Y-%m").to_string(),
        }
    }

    /// Start of the period as an RFC 3339 UTC timestamp.
    #[must_use]
    pub fn start_timestamp(&self) -> String {
        format!("{}T00:00:00Z", self.start.format("%Y-%m-%d"))
    }

    /// End of the period (last second of the last day) as an RFC 3339 UTC timestamp.
    #[must_use]
    pub fn end_timestamp(&self) -> String {
        format!("{}T23:59:59Z", self.end.format("%Y-%m-%d"))
    }

    /// Number of days covered.
    #[must_use]
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl std::fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}
