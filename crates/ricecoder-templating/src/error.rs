//! Error types for template rendering
//!
//! Rendering follows a two-tier policy. Security and resource guards
//! (path traversal, include cycles, include depth, loop budget) and grammar
//! errors abort the whole render. Missing data (unknown variables, null
//! values, absent loop collections) is not an error and degrades in the
//! output instead.

use thiserror::Error;

/// Result type for templating operations
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Errors that can occur while loading, parsing or rendering templates
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Blank template or include name, or a name with a `..` segment
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed tag grammar
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        /// Line of the offending tag
        line: usize,
        /// Column of the offending tag
        column: usize,
        /// Error message describing the syntax issue
        message: String,
    },

    /// The content provider could not resolve a name
    #[error("Template not found: {0}")]
    NotFound(String),

    /// An include re-entered a file already on the active include chain
    #[error("Circular include detected: {}", chain.join(" -> "))]
    CircularDependency {
        /// Full include chain, ending with the file that closed the cycle
        chain: Vec<String>,
    },

    /// Include nesting went past the configured maximum
    #[error("Include depth exceeded maximum of {max}")]
    DepthExceeded {
        /// Configured maximum include depth
        max: usize,
    },

    /// The render evaluated more loop constructs than its budget allows
    #[error("Loop evaluation limit of {limit} exceeded")]
    IterationLimit {
        /// Configured loop evaluation budget
        limit: usize,
    },

    /// IO error while reading template content
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Data could not be converted into template values
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration values are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TemplateError {
    /// Create a syntax error at the given position
    pub fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    /// Whether this error came from a security or resource guard
    pub fn is_guard_violation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::CircularDependency { .. }
                | Self::DepthExceeded { .. }
                | Self::IterationLimit { .. }
        )
    }
}
