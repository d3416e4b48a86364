//! Error handling for ingot.
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** ([`IngotError`]) for precise handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! Fatal conditions in the install pipeline (bad specifier, self-install,
//! environment mismatch, registry resolution failure) all abort before any
//! project mutation. The single exception is [`IngotError::DependencyFetchFailed`],
//! which occurs after the manifest has been updated: the project is left in a
//! mutated-but-unfetched state and the error message says so, rather than
//! masking the partial commit.
//!
//! At the CLI boundary, any error is converted through [`user_friendly_error`]
//! into an [`ErrorContext`] that renders a colored message plus an optional
//! suggestion and details block.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for ingot operations.
///
/// Each variant represents a specific failure mode with enough context to
/// produce a message that names the offending input. Variants carry owned
/// strings so the whole enum stays [`Clone`] for error-context construction.
#[derive(Error, Debug, Clone)]
pub enum IngotError {
    /// A package specifier did not match the accepted grammar.
    ///
    /// Raised for malformed names, versions, git/github refs, and
    /// unrecognized directives. Always names the offending specifier.
    #[error("invalid package specifier `{specifier}`: {reason}")]
    InvalidSpecifier {
        /// The raw specifier as supplied by the caller
        specifier: String,
        /// Why the specifier was rejected
        reason: String,
    },

    /// The request asked ingot to install its own package.
    #[error("cannot install `ingot` with itself; add it to the manifest manually")]
    SelfInstallRejected,

    /// The `--only` filter excludes the environment the command runs in.
    #[error(
        "the current environment `{current}` is not in the requested scope; \
         re-run the command in one of: {allowed}"
    )]
    EnvironmentMismatch {
        /// The environment the command is running in
        current: String,
        /// Comma-joined list of environments the request was scoped to
        allowed: String,
    },

    /// The registry lookup for a bare package name failed.
    ///
    /// Covers transport errors, non-2xx responses, malformed bodies, and an
    /// empty release list. One attempt is made; the whole install request
    /// aborts rather than proceeding with a partial descriptor list.
    #[error("could not determine source for requested package `{name}`: {reason}")]
    RegistryResolutionFailed {
        /// The package whose latest release could not be determined
        name: String,
        /// Transport- or payload-level failure description
        reason: String,
    },

    /// The dependency fetch step failed after the manifest was updated.
    #[error(
        "failed to fetch dependencies: {reason}\n\
         the manifest was already updated; fix the problem and re-run the fetch"
    )]
    DependencyFetchFailed {
        /// Output or cause reported by the fetch command
        reason: String,
    },

    /// An installer task exited unsuccessfully.
    #[error("installer task `{task}` failed: {reason}")]
    TaskFailed {
        /// Installer task identifier
        task: String,
        /// Exit status or spawn failure description
        reason: String,
    },

    /// Composing an installer task into the working context failed.
    #[error("could not compose installer task `{task}`: {reason}")]
    TaskCompositionFailed {
        /// Installer task identifier
        task: String,
        /// Why composition was rejected
        reason: String,
    },

    /// No `ingot.toml` was found in the current directory or any parent.
    #[error("manifest file ingot.toml not found in current directory or any parent directory")]
    ManifestNotFound,

    /// The manifest exists but could not be parsed.
    #[error("invalid manifest syntax in {file}: {reason}")]
    ManifestParseError {
        /// Path to the manifest that failed to parse
        file: String,
        /// Specific parse failure
        reason: String,
    },

    /// `ingot init` refused to overwrite an existing manifest.
    #[error("manifest already exists at {path}")]
    ManifestAlreadyExists {
        /// Path of the existing manifest
        path: String,
    },

    /// A filesystem operation failed.
    #[error("file system error during {operation}: {reason}")]
    FileSystemError {
        /// The operation that failed (e.g. "read manifest", "scan tasks")
        operation: String,
        /// Underlying I/O failure
        reason: String,
    },
}

impl From<std::io::Error> for IngotError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystemError {
            operation: "file access".to_string(),
            reason: err.to_string(),
        }
    }
}

/// An [`IngotError`] enriched with a suggestion and details for CLI display.
///
/// The error message says what went wrong; the suggestion (green) says what
/// the user can do about it; the details (yellow) explain the surrounding
/// behavior. Both extras are optional.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying ingot error
    pub error: IngotError,
    /// Optional actionable suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a bare context with no suggestion or details.
    #[must_use]
    pub const fn new(error: IngotError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attach an actionable suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach explanatory details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the context to stderr with terminal colors.
    ///
    /// Error in red, details in yellow, suggestion in green.
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

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Recognized [`IngotError`] variants get tailored suggestions; TOML parse
/// errors get syntax guidance; everything else is wrapped with its message
/// preserved.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(ingot_error) = error.downcast_ref::<IngotError>() {
        return create_error_context(ingot_error.clone());
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(IngotError::ManifestParseError {
            file: crate::constants::MANIFEST_FILE.to_string(),
            reason: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax in your ingot.toml: quotes, brackets, and table headers");
    }

    // Generic fallback: keep the full error chain in the message.
    let mut message = error.to_string();
    for cause in error.chain().skip(1) {
        message.push_str(&format!("\n  caused by: {cause}"));
    }
    ErrorContext::new(IngotError::FileSystemError {
        operation: "operation".to_string(),
        reason: message,
    })
}

/// Build an [`ErrorContext`] with variant-specific suggestions.
fn create_error_context(error: IngotError) -> ErrorContext {
    match &error {
        IngotError::InvalidSpecifier { .. } => ErrorContext::new(error.clone()).with_details(
            "accepted forms: `name`, `name@1.2.3`, `name@~1.2`, `name@git:url[@ref]`, \
             `name@github:org/project[@ref]`, `name@path:../local`",
        ),
        IngotError::ManifestNotFound => ErrorContext::new(error.clone())
            .with_suggestion("Run `ingot init` to create an ingot.toml in this project"),
        IngotError::RegistryResolutionFailed { name, .. } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Check the spelling of `{name}`, or pin a source explicitly \
                 (e.g. `{name}@git:<url>`)"
            )),
        IngotError::EnvironmentMismatch { allowed, .. } => ErrorContext::new(error.clone())
            .with_suggestion(format!(
                "Set INGOT_ENV to one of: {allowed}, then re-run the install"
            )),
        IngotError::DependencyFetchFailed { .. } => ErrorContext::new(error.clone()).with_details(
            "the new dependencies are recorded in ingot.toml but were not fetched; \
             no installer tasks were run",
        ),
        IngotError::ManifestAlreadyExists { .. } => ErrorContext::new(error.clone())
            .with_suggestion("Edit the existing manifest instead, or remove it first"),
        _ => ErrorContext::new(error.clone()),
    }
}
