//! Error handling for dashvars
//!
//! This module provides the error types and user-facing error reporting for
//! the resolver and its command line interface. Two kinds of failure exist:
//!
//! 1. **Structural errors** ([`DashvarError`]) that make a variable set or a
//!    request unusable: duplicate names, unknown variables, dependency cycles,
//!    malformed snapshot or configuration files.
//! 2. **Per-variable runtime failures** that never abort a session. Those are
//!    plain values ([`ExecutionFailure`](crate::executor::ExecutionFailure) and
//!    [`ParseFailure`](crate::options::ParseFailure)) kept in the variable's
//!    state instead of being propagated.
//!
//! Use [`user_friendly_error`] to convert any error into an [`ErrorContext`]
//! with a suggestion for the CLI.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dashvars::core::{DashvarError, ErrorContext};
//!
//! let context = ErrorContext::new(DashvarError::DuplicateVariable {
//!     name: "region".to_string(),
//! })
//! .with_suggestion("Rename one of the variables")
//! .with_details("Variable names must be unique within a dashboard");
//!
//! context.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for dashvars operations
///
/// # Error Categories
///
/// ## Variable definitions
/// - [`DuplicateVariable`] - Two variables share a name
/// - [`InvalidVariableName`] - Name cannot be referenced from a template
/// - [`VariableNotFound`] - Lookup of a name that is not in the set
/// - [`CircularDependency`] - Templates reference each other in a cycle
///
/// ## Selections
/// - [`SelectionNotInOptions`] - A pick outside the current option set
/// - [`InvalidSelection`] - Selection shape does not fit the variable
///
/// ## Files and configuration
/// - [`ConfigError`] - Resolver configuration issues
/// - [`SnapshotParseError`] - Dashboard snapshot could not be read
/// - [`TomlError`] - Malformed snapshot TOML before a file name is attached
///
/// [`DuplicateVariable`]: DashvarError::DuplicateVariable
/// [`InvalidVariableName`]: DashvarError::InvalidVariableName
/// [`VariableNotFound`]: DashvarError::VariableNotFound
/// [`CircularDependency`]: DashvarError::CircularDependency
/// [`SelectionNotInOptions`]: DashvarError::SelectionNotInOptions
/// [`InvalidSelection`]: DashvarError::InvalidSelection
/// [`ConfigError`]: DashvarError::ConfigError
/// [`SnapshotParseError`]: DashvarError::SnapshotParseError
/// [`TomlError`]: DashvarError::TomlError
#[derive(Error, Debug)]
pub enum DashvarError {
    /// A variable with the same name is already part of the set
    #[error("Variable '{name}' is defined more than once")]
    DuplicateVariable {
        /// The duplicated name
        name: String,
    },

    /// A variable name that no template could ever reference
    #[error("Invalid variable name '{name}': {reason}")]
    InvalidVariableName {
        /// The rejected name
        name: String,
        /// Why the name was rejected
        reason: String,
    },

    /// A variable was looked up by a name that is not in the set
    ///
    /// `suggestions` holds up to three similarly spelled names.
    #[error("Variable '{name}' not found")]
    VariableNotFound {
        /// The requested name
        name: String,
        /// Closest existing names
        suggestions: Vec<String>,
    },

    /// Variable templates reference each other in a cycle
    #[error("Circular dependency detected: {chain}")]
    CircularDependency {
        /// Cycle path, e.g. `a → b → a`
        chain: String,
    },

    /// A discrete pick that is not part of the variable's current options
    #[error("Value '{value}' is not an option of variable '{variable}'")]
    SelectionNotInOptions {
        /// Variable receiving the pick
        variable: String,
        /// The offending value
        value: String,
    },

    /// A selection whose shape does not fit the variable
    #[error("Invalid selection for variable '{variable}': {reason}")]
    InvalidSelection {
        /// Variable receiving the selection
        variable: String,
        /// Why the selection was rejected
        reason: String,
    },

    /// Resolver configuration issues
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// Dashboard snapshot file could not be parsed
    #[error("Invalid dashboard snapshot {file}: {reason}")]
    SnapshotParseError {
        /// Path of the snapshot
        file: String,
        /// Parser message
        reason: String,
    },

    /// The session command queue is gone
    #[error("Dashboard session is no longer running")]
    SessionClosed,

    /// TOML parsing error from [`toml::de::Error`]
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Generic error for cases not covered by specific variants
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for DashvarError {
    fn clone(&self) -> Self {
        match self {
            Self::DuplicateVariable {
                name,
            } => Self::DuplicateVariable {
                name: name.clone(),
            },
            Self::InvalidVariableName {
                name,
                reason,
            } => Self::InvalidVariableName {
                name: name.clone(),
                reason: reason.clone(),
            },
            Self::VariableNotFound {
                name,
                suggestions,
            } => Self::VariableNotFound {
                name: name.clone(),
                suggestions: suggestions.clone(),
            },
            Self::CircularDependency {
                chain,
            } => Self::CircularDependency {
                chain: chain.clone(),
            },
            Self::SelectionNotInOptions {
                variable,
                value,
            } => Self::SelectionNotInOptions {
                variable: variable.clone(),
                value: value.clone(),
            },
            Self::InvalidSelection {
                variable,
                reason,
            } => Self::InvalidSelection {
                variable: variable.clone(),
                reason: reason.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            Self::SnapshotParseError {
                file,
                reason,
            } => Self::SnapshotParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::SessionClosed => Self::SessionClosed,
            // toml errors are not Clone; keep the message.
            Self::TomlError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error wrapper adding a suggestion and details for terminal display
///
/// # Examples
///
/// ```rust,no_run
/// use dashvars::core::{DashvarError, ErrorContext};
///
/// let context = ErrorContext::new(DashvarError::SessionClosed)
///     .with_suggestion("Restart the dashboard session");
/// assert!(context.suggestion.is_some());
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: DashvarError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: DashvarError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error, shown in green.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error, shown in yellow.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error, details, and suggestion to stderr with colors.
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

/// Convert any error into an [`ErrorContext`] with a helpful suggestion.
///
/// Known [`DashvarError`] variants get tailored suggestions. I/O and TOML
/// errors are mapped onto the closest variant. Anything else is reported as
/// [`DashvarError::Other`] with its full cause chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(dashvar_error) = error.downcast_ref::<DashvarError>() {
        return create_error_context(dashvar_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::NotFound {
            return ErrorContext::new(DashvarError::Other {
                message: error.to_string(),
            })
            .with_suggestion("Check that the file exists and the path is correct");
        }
    }

    // The outermost context names the file being parsed
    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(DashvarError::Other {
            message: format!("{error}: {}", toml_error.message()),
        })
        .with_suggestion("Check the TOML syntax of that file: quotes, brackets, and tables");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(DashvarError::Other {
        message,
    })
}

fn create_error_context(error: DashvarError) -> ErrorContext {
    match &error {
        DashvarError::DuplicateVariable {
            name,
        } => ErrorContext::new(error.clone())
            .with_suggestion(format!("Rename one of the variables called '{name}'"))
            .with_details("Templates reference variables by name, so names must be unique"),

        DashvarError::InvalidVariableName {
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Use a name without whitespace or braces")
            .with_details("Templates reference variables as {{.name}}"),

        DashvarError::VariableNotFound {
            suggestions,
            ..
        } => {
            let ctx = ErrorContext::new(error.clone());
            if suggestions.is_empty() {
                ctx.with_suggestion("Run 'dashvars deps' to list the variables in this dashboard")
            } else {
                ctx.with_suggestion(format!("Did you mean: {}?", suggestions.join(", ")))
            }
        }

        DashvarError::CircularDependency {
            chain,
        } => ErrorContext::new(error.clone())
            .with_suggestion("Remove one of the template references that closes the cycle")
            .with_details(format!(
                "Variables {chain} reference each other, so none of them can be resolved first"
            )),

        DashvarError::ConfigError {
            ..
        } => ErrorContext::new(error.clone()).with_suggestion(
            "Fix the resolver config file (--config, DASHVARS_CONFIG_PATH, or the default location)",
        ),

        DashvarError::SelectionNotInOptions {
            variable,
            ..
        } => ErrorContext::new(error.clone()).with_suggestion(format!(
            "Run 'dashvars resolve' to see the current options of '{variable}'"
        )),

        _ => ErrorContext::new(error.clone()),
    }
}
