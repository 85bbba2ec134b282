//! Rendering of cost summaries into notification messages.
//!
//! [`Composer`] turns a [`DailySummary`](costwatch_cost::DailySummary) into a
//! threshold alert and a [`MonthlySummary`](costwatch_cost::MonthlySummary)
//! into a per-creator report. Each message carries a subject, a plain-text
//! body and an HTML body. Composition does no I/O.

pub mod composer;
pub mod context;
pub mod error;

pub use composer::Composer;
pub use error::ReportError;
