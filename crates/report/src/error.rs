//! Error types for message composition.

use thiserror::Error;

/// Errors raised while rendering a message.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A bundled template failed to parse
    #[error("Invalid template {name}: {source}")]
    Template {
        name: &'static str,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    /// Rendering failed
    #[error("Failed to render {name}: {source}")]
    Render {
        name: &'static str,
        #[source]
        source: Box<handlebars::RenderError>,
    },
}
