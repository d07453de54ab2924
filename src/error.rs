//! Error types for the CTC breakdown engine.
//!
//! Two kinds of failure exist. [`EngineError`] covers genuine faults such as a
//! missing or malformed template catalog. [`NotComputable`] covers the
//! expected "skip this employee for this month" outcomes, which batch callers
//! record and move past.

use thiserror::Error;

use crate::models::PayMonth;

/// The main error type for the CTC breakdown engine.
///
/// # Example
///
/// ```
/// use ctc_breakdown::error::EngineError;
///
/// let error = EngineError::TemplatesNotFound {
///     path: "/missing/templates".to_string(),
/// };
/// assert_eq!(error.to_string(), "Template catalog not found: /missing/templates");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// The template catalog directory or a template file was not found.
    #[error("Template catalog not found: {path}")]
    TemplatesNotFound {
        /// The path that was not found.
        path: String,
    },

    /// A template file could not be parsed.
    #[error("Failed to parse template file '{path}': {message}")]
    TemplateParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A template parsed but its content is inconsistent.
    #[error("Invalid template '{template_id}': {message}")]
    InvalidTemplate {
        /// The id of the offending template.
        template_id: String,
        /// A description of what made the template invalid.
        message: String,
    },

    /// Two templates in one catalog share an id.
    #[error("Duplicate template id: {template_id}")]
    DuplicateTemplate {
        /// The repeated id.
        template_id: String,
    },

    /// A year/month pair does not name a calendar month.
    #[error("Invalid pay month {year}-{month}")]
    InvalidPeriod {
        /// The requested year.
        year: i32,
        /// The requested month (expected 1-12).
        month: u32,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

/// Reasons a breakdown cannot be produced for an employee and month.
///
/// None of these are faults: the employee is skipped for the month and the
/// reason recorded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotComputable {
    /// No monthly CTC could be determined.
    #[error("no monthly CTC available")]
    MissingCtc,

    /// The monthly CTC is negative.
    #[error("monthly CTC {ctc} is negative")]
    NegativeCtc {
        /// The rejected CTC, rendered as text.
        ctc: String,
    },

    /// No template was supplied to the solver.
    #[error("no salary template supplied")]
    MissingTemplate,

    /// The template is the reserved custom kind whose pay is managed manually.
    #[error("template '{template_id}' is a custom structure and is not auto-computed")]
    CustomTemplate {
        /// The id of the custom template.
        template_id: String,
    },

    /// The employee's template tracking has no entry on or before the month.
    #[error("no template assigned on or before {period}")]
    NoTemplateForPeriod {
        /// The requested month.
        period: PayMonth,
    },

    /// The tracked template id does not exist in the catalog.
    #[error("template '{template_id}' is not in the catalog")]
    UnknownTemplate {
        /// The id that could not be found.
        template_id: String,
    },
}
