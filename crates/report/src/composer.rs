//! Message composition using Handlebars.
//!
//! Templates are compiled into the binary. Plain-text bodies are rendered
//! without escaping; HTML bodies escape every interpolated value.

use handlebars::{no_escape, Handlebars};
use notify::Message;
use serde::Serialize;
use tracing::debug;

use costwatch_cost::{DailySummary, MonthlySummary};

use crate::context::{DailyAlertContext, MonthlyReportContext};
use crate::error::ReportError;

const DAILY_ALERT: &str = "daily_alert";
const MONTHLY_REPORT: &str = "monthly_report";
const STYLES_PARTIAL: &str = "styles";

const TEXT_TEMPLATES: [(&str, &str); 2] = [
    (DAILY_ALERT, include_str!("../templates/daily_alert.txt.hbs")),
    (MONTHLY_REPORT, include_str!("../templates/monthly_report.txt.hbs")),
];

const HTML_TEMPLATES: [(&str, &str); 2] = [
    (DAILY_ALERT, include_str!("../templates/daily_alert.html.hbs")),
    (MONTHLY_REPORT, include_str!("../templates/monthly_report.html.hbs")),
];

const STYLES: &str = include_str!("../templates/styles.html.hbs");

/// Renders summaries into subject, text and HTML.
pub struct Composer {
    text: Handlebars<'static>,
    html: Handlebars<'static>,
}

impl Composer {
    /// Create a composer with the bundled templates registered.
    pub fn new() -> Result<Self, ReportError> {
        let mut text = Handlebars::new();
        text.set_strict_mode(true);
        text.register_escape_fn(no_escape);

        let mut html = Handlebars::new();
        html.set_strict_mode(true);
        html.register_partial(STYLES_PARTIAL, STYLES)
            .map_err(|e| ReportError::Template {
                name: STYLES_PARTIAL,
                source: Box::new(e),
            })?;

        for (registry, templates) in [(&mut text, TEXT_TEMPLATES), (&mut html, HTML_TEMPLATES)] {
            for (name, source) in templates {
                registry
                    .register_template_string(name, source)
                    .map_err(|e| ReportError::Template {
                        name,
                        source: Box::new(e),
                    })?;
            }
        }

        debug!(
            templates = TEXT_TEMPLATES.len() + HTML_TEMPLATES.len(),
            "Registered message templates"
        );

        Ok(Self { text, html })
    }

    /// Compose the threshold alert for a day.
    pub fn compose_daily_alert(&self, summary: &DailySummary) -> Result<Message, ReportError> {
        let context = DailyAlertContext::new(summary);
        let subject = format!(
            "Azure Cost Alert - {} Cost Exceeded Threshold",
            summary.period.label
        );
        self.compose(DAILY_ALERT, subject, &context)
    }

    /// Compose the per-creator report for a month.
    pub fn compose_monthly_report(
        &self,
        summary: &MonthlySummary,
    ) -> Result<Message, ReportError> {
        let context = MonthlyReportContext::new(summary);
        let subject = format!("Azure Monthly Cost Report - {}", summary.period.label);
        self.compose(MONTHLY_REPORT, subject, &context)
    }

    fn compose<T: Serialize>(
        &self,
        name: &'static str,
        subject: String,
        context: &T,
    ) -> Result<Message, ReportError> {
        let render = |registry: &Handlebars<'static>| {
            registry
                .render(name, context)
                .map_err(|e| ReportError::Render {
                    name,
                    source: Box::new(e),
                })
        };

        let text = render(&self.text)?;
        let html = render(&self.html)?;
        debug!(template = name, subject = %subject, "Composed message");

        Ok(Message {
            subject,
            text,
            html,
        })
    }
}
