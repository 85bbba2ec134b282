//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;
use notify::StdoutChannel;

/// Azure cost monitor: daily threshold alerts and monthly creator reports.
#[derive(Debug, Parser)]
#[command(name = "costwatch")]
#[command(about = "Azure cost alerts and monthly cost reports")]
#[command(version)]
pub struct Cli {
    /// Run the daily threshold check once and exit
    #[arg(long, conflicts_with = "monthly")]
    pub once: bool,

    /// Generate the monthly report once and exit
    #[arg(long)]
    pub monthly: bool,

    /// Print messages to stdout instead of sending email
    #[arg(long)]
    pub dry_run: bool,

    /// With --dry-run, also print the HTML body
    #[arg(long, requires = "dry_run")]
    pub html: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Optional TOML configuration file (environment variables take precedence)
    #[arg(long, env = "COSTWATCH_CONFIG")]
    pub config: Option<PathBuf>,
}

/// What an invocation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Daily check now.
    Once,
    /// Monthly report now.
    Monthly,
    /// Run both jobs on their schedule until interrupted.
    Scheduled,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.once {
            Mode::Once
        } else if self.monthly {
            Mode::Monthly
        } else {
            Mode::Scheduled
        }
    }

    /// Console channel for a dry run, or `None` when email goes out.
    pub fn dry_run_channel(&self) -> Option<StdoutChannel> {
        self.dry_run
            .then(|| StdoutChannel::new().with_html(self.html))
    }

    /// Default log filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "costwatch=debug,info"
        } else {
            "costwatch=info,warn"
        }
    }
}
