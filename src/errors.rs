//! Unified error types for the maintenance gate.
//!
//! The gate decision itself never fails; these errors come from the ambient
//! layers around it (configuration, the option store, template rendering).

use thiserror::Error;

/// Errors raised by configuration loading, the option store and the web host.
#[derive(Debug, Error)]
pub enum Error {
    /// Application configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// The option store reported a failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem or socket failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A page template failed to render
    #[error("Template render error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// A page template failed to compile
    #[error("Template syntax error: {0}")]
    TemplateSyntax(Box<handlebars::TemplateError>),
}

impl From<handlebars::TemplateError> for Error {
    fn from(value: handlebars::TemplateError) -> Self {
        Self::TemplateSyntax(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
