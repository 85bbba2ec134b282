//! Azure cost monitor.
//!
//! Runs a daily threshold check on yesterday's spend and a monthly report
//! that breaks last month's spend down by resource creator.

pub mod cli;
pub mod config;
pub mod run;
pub mod schedule;

pub use cli::{Cli, Mode};
pub use config::AppConfig;
pub use run::{CostMonitor, RunError, RunOutcome};
pub use schedule::{run_scheduled, run_scheduled_until, Job, Schedule};
