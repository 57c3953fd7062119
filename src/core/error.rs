//! Error handling for stylegraph
//!
//! This module provides the error types used across the component pipeline and
//! the user-friendly reporting used by the CLI. The error system follows two rules:
//! 1. **Strongly-typed errors** at module seams callers need to match on
//!    (registry lookups, compilation, snapshots)
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`StylegraphError`] - Enumerated error kinds for every failure in the pipeline
//! - [`ErrorContext`] - Wrapper that adds suggestions and details for display
//! - [`user_friendly_error`] - Converts any [`anyhow::Error`] into an [`ErrorContext`]
//!
//! # Failure Semantics
//!
//! - [`StylegraphError::UnknownComponent`] aborts a single render or lookup.
//! - [`StylegraphError::CompileFailure`] aborts the whole build pass. The error
//!   carries the source location when the compiler reported one.
//! - [`StylegraphError::MissingBundle`] is a contract violation inside a build pass
//!   (artifacts written without a prior compile step).
//! - [`StylegraphError::SnapshotCorrupt`] is raised by snapshot loading; the pipeline
//!   logs it and falls back to a full rebuild.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stylegraph::core::{StylegraphError, user_friendly_error};
//!
//! let error = StylegraphError::UnknownComponent {
//!     id: "./src/missing.vue".to_string(),
//! };
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Position in a component source file reported by the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file the error points at
    pub file: String,
    /// 1-based line number
    pub line: usize,
    /// 1-based column number
    pub column: usize,
}

impl SourceLocation {
    /// Create a location from a file and a 1-based line/column pair.
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    /// Compute the 1-based line/column of a byte offset inside `source`.
    ///
    /// Offsets past the end of the source clamp to the last position.
    pub fn from_offset(file: impl Into<String>, source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        Self::new(file, line, column)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

fn describe_location(location: &Option<SourceLocation>) -> String {
    location.as_ref().map(|loc| format!(" at {loc}")).unwrap_or_default()
}

/// The main error type for stylegraph operations
///
/// # Error Categories
///
/// ## Component lookup
/// - [`UnknownComponent`] - No artifact registered for a component identifier
/// - [`ArtifactLoadError`] - The compiled artifact exists in the registry but cannot be loaded
/// - [`RenderFailure`] - The renderer rejected a compiled component
///
/// ## Build pass
/// - [`CompileFailure`] - The compiler rejected a source file
/// - [`MissingBundle`] - Artifacts requested without a compile step
/// - [`InvalidPattern`] - A discovery or ignore glob failed to parse
///
/// ## Persistence and configuration
/// - [`SnapshotCorrupt`] - A persisted snapshot failed to parse or validate
/// - [`ConfigError`] / [`ConfigParseError`] - Invalid plugin options
/// - [`FileSystemError`], [`IoError`], [`JsonError`], [`TomlError`]
///
/// [`UnknownComponent`]: StylegraphError::UnknownComponent
/// [`ArtifactLoadError`]: StylegraphError::ArtifactLoadError
/// [`RenderFailure`]: StylegraphError::RenderFailure
/// [`CompileFailure`]: StylegraphError::CompileFailure
/// [`MissingBundle`]: StylegraphError::MissingBundle
/// [`InvalidPattern`]: StylegraphError::InvalidPattern
/// [`SnapshotCorrupt`]: StylegraphError::SnapshotCorrupt
/// [`ConfigError`]: StylegraphError::ConfigError
/// [`ConfigParseError`]: StylegraphError::ConfigParseError
/// [`FileSystemError`]: StylegraphError::FileSystemError
/// [`IoError`]: StylegraphError::IoError
/// [`JsonError`]: StylegraphError::JsonError
/// [`TomlError`]: StylegraphError::TomlError
#[derive(Error, Debug)]
pub enum StylegraphError {
    /// A component identifier has no registered artifact.
    ///
    /// Raised by registry lookups and page renders. Fatal to that single call.
    #[error("\"{id}\" is not a valid component")]
    UnknownComponent {
        /// The normalized component identifier that was requested
        id: String,
    },

    /// The compiler rejected a source file.
    ///
    /// Fatal to the current build pass. Registry and graph state is left as it
    /// was when the failure propagated.
    #[error("Component compilation failed{}: {message}", describe_location(.location))]
    CompileFailure {
        /// Compiler message
        message: String,
        /// Source position when the compiler reported one
        location: Option<SourceLocation>,
    },

    /// Artifacts were requested from a build pass that never compiled a bundle.
    #[error("No bundle available: compile must run before artifacts are written")]
    MissingBundle,

    /// A persisted snapshot could not be parsed or failed validation.
    #[error("Snapshot {file} is corrupt: {reason}")]
    SnapshotCorrupt {
        /// Snapshot file that failed to load
        file: String,
        /// Parse or validation failure
        reason: String,
    },

    /// A compiled artifact could not be loaded from the cache directory.
    #[error("Failed to load compiled artifact {path}: {reason}")]
    ArtifactLoadError {
        /// Absolute path of the artifact
        path: String,
        /// Reason for the failure
        reason: String,
    },

    /// The renderer failed to produce markup for a component.
    #[error("Failed to render component '{component}': {reason}")]
    RenderFailure {
        /// Component or artifact name being rendered
        component: String,
        /// Renderer message
        reason: String,
    },

    /// A glob pattern could not be compiled.
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The rejected pattern
        pattern: String,
        /// Parser message
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Configuration file parse error
    #[error("Invalid configuration file syntax in {file}")]
    ConfigParseError {
        /// Path to the configuration file
        file: String,
        /// Specific reason for the parsing failure
        reason: String,
    },

    /// File system error
    #[error("File system error: {operation}")]
    FileSystemError {
        /// The file system operation that failed
        operation: String,
        /// Path where the error occurred
        path: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl StylegraphError {
    /// Build a [`StylegraphError::CompileFailure`] without location information.
    pub fn compile(message: impl Into<String>) -> Self {
        Self::CompileFailure {
            message: message.into(),
            location: None,
        }
    }

    /// Build a [`StylegraphError::CompileFailure`] pointing at a source position.
    pub fn compile_at(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::CompileFailure {
            message: message.into(),
            location: Some(location),
        }
    }

    /// Attach a source location to a compile failure that lacks one.
    ///
    /// Other error kinds are returned unchanged.
    #[must_use]
    pub fn with_location(self, location: SourceLocation) -> Self {
        match self {
            Self::CompileFailure {
                message,
                location: None,
            } => Self::CompileFailure {
                message,
                location: Some(location),
            },
            other => other,
        }
    }

    /// Returns `true` for errors that abort a whole build pass.
    pub const fn is_fatal_to_build(&self) -> bool {
        matches!(self, Self::CompileFailure { .. } | Self::MissingBundle)
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Wraps a [`StylegraphError`] with an optional suggestion and details. When
/// displayed, the error is shown in red, details in yellow and the suggestion
/// in green.
///
/// ```rust,no_run
/// use stylegraph::core::{ErrorContext, StylegraphError};
///
/// let context = ErrorContext::new(StylegraphError::MissingBundle)
///     .with_suggestion("Run a full build")
///     .with_details("The build pass was driven out of order");
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: StylegraphError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: StylegraphError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`StylegraphError`] anywhere in the error chain, then plain
/// [`std::io::Error`]s. Anything else is wrapped as [`StylegraphError::Other`]
/// with the full context chain as details.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(sg_error) = cause.downcast_ref::<StylegraphError>() {
            let message = sg_error.to_string();
            return create_error_context(sg_error, message, &error);
        }
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return ErrorContext::new(StylegraphError::FileSystemError {
            operation: io_error.kind().to_string(),
            path: "unknown".to_string(),
        })
        .with_details(format!("{error:#}"))
        .with_suggestion("Check that the file or directory exists and is accessible");
    }

    ErrorContext::new(StylegraphError::Other {
        message: error.to_string(),
    })
    .with_details(format!("{error:#}"))
}

fn create_error_context(
    error: &StylegraphError,
    message: String,
    full: &anyhow::Error,
) -> ErrorContext {
    let context = ErrorContext::new(StylegraphError::Other {
        message,
    });
    let chain = format!("{full:#}");

    match error {
        StylegraphError::UnknownComponent {
            ..
        } => context
            .with_suggestion("Check the path and make sure the component lives under the input directory")
            .with_details(chain),
        StylegraphError::CompileFailure {
            location: Some(location),
            ..
        } => context
            .with_suggestion(format!("Fix the component source at {location} and rebuild")),
        StylegraphError::CompileFailure {
            ..
        } => context.with_suggestion("Fix the component source and rebuild"),
        StylegraphError::MissingBundle => context
            .with_details("Artifacts were requested before the compile step produced a bundle")
            .with_suggestion("Run a full build"),
        StylegraphError::SnapshotCorrupt {
            file,
            ..
        } => context
            .with_suggestion(format!("Delete {file} and rebuild to regenerate the snapshot")),
        StylegraphError::ConfigError {
            ..
        }
        | StylegraphError::ConfigParseError {
            ..
        } => context
            .with_suggestion("Check stylegraph.toml for typos and invalid values")
            .with_details(chain),
        StylegraphError::ArtifactLoadError {
            ..
        } => context
            .with_suggestion("Run 'stylegraph build' to regenerate the cache directory"),
        _ => context.with_details(chain),
    }
}
