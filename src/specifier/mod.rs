//! Package specifier parsing.
//!
//! A *specifier* is the human-friendly textual form of a dependency request:
//! `name` or `name@versionOrDirective`. Splitting on the first `@` yields at
//! most two parts; any further `@` is only meaningful inside git/github ref
//! syntax. The directive grammar, matched by ordered prefix:
//!
//! | Form                             | Result                                     |
//! |----------------------------------|--------------------------------------------|
//! | `ash`                            | bare name, resolved against the registry   |
//! | `ash@2.0.1`                      | registry source, exact constraint `=2.0.1` |
//! | `ash@~2.0`                       | registry source, general requirement       |
//! | `foo@git:https://x/y@feature`    | git source pinned to ref `feature`         |
//! | `foo@git:https://x/y`            | git source, override (no pin)              |
//! | `foo@github:org/proj@v1`         | github source pinned to ref `v1`           |
//! | `foo@github:org/proj`            | github source, override (no pin)           |
//! | `foo@path:../local/foo`          | local path source, override                |
//!
//! Each directive variant has its own parse function returning a typed
//! [`SpecifierError`] instead of falling through: the caller surfaces the
//! failure as a fatal message naming the offending specifier, and nothing
//! here performs any I/O. Bare names come back as [`ParsedSpecifier::Bare`]
//! so the registry lookup stays out of the parser.
//!
//! Every successfully parsed descriptor re-serializes through [`std::fmt::Display`]
//! to a canonical specifier that parses back to an equal descriptor.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

use crate::version::VersionConstraint;

/// Valid package names: lowercase identifier tokens.
static PACKAGE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid package name regex"));

/// Typed parse failure for a single specifier.
///
/// The variants mirror the grammar branches; all are surfaced to the user
/// through [`IngotError::InvalidSpecifier`](crate::core::IngotError::InvalidSpecifier)
/// with the raw specifier attached.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecifierError {
    /// The specifier (or a segment of it) was empty.
    #[error("specifier is empty")]
    Empty,

    /// The name segment is not a lowercase identifier token.
    #[error("invalid package name `{name}` (expected a lowercase identifier)")]
    InvalidName {
        /// The rejected name segment
        name: String,
    },

    /// A `git:` directive had an empty url or ref segment.
    #[error("malformed git reference `{directive}` (expected `url` or `url@ref`)")]
    InvalidGitRef {
        /// The directive text after `git:`
        directive: String,
    },

    /// A `github:` directive did not split into `org/project[@ref]`.
    #[error("malformed github reference `{directive}` (expected `org/project` or `org/project@ref`)")]
    InvalidGitHubRef {
        /// The directive text after `github:`
        directive: String,
    },

    /// A `path:` directive with no path.
    #[error("`path:` directive is missing a path")]
    EmptyPath,

    /// The directive parsed neither as a version nor as a requirement.
    #[error("`{requirement}` is not a valid version or version requirement")]
    InvalidVersion {
        /// The rejected version text
        requirement: String,
    },
}

/// Where a dependency comes from; exactly one variant per descriptor.
///
/// `is_override` is set whenever a git/github/path source carries no
/// explicit ref: an unpinned source always takes precedence over any other
/// requirement recorded for the same package name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencySource {
    /// Fetched from the package registry under a version constraint.
    Registry {
        /// The normalized version constraint
        constraint: VersionConstraint,
    },

    /// Fetched from an arbitrary git URL, optionally pinned to a ref.
    Git {
        /// Repository URL
        url: String,
        /// Branch, tag, or commit to pin to
        reference: Option<String>,
        /// True when no ref pin was given
        is_override: bool,
    },

    /// Fetched from a GitHub `org/project`, optionally pinned to a ref.
    GitHub {
        /// GitHub organization or user
        org: String,
        /// Repository name
        project: String,
        /// Branch, tag, or commit to pin to
        reference: Option<String>,
        /// True when no ref pin was given
        is_override: bool,
    },

    /// A local path dependency; always an override.
    Path {
        /// Path relative to the project root (or absolute)
        path: String,
        /// Always true for path sources
        is_override: bool,
    },
}

/// A parsed, structured dependency request.
///
/// Created once per specifier during normalization, consumed immutably by
/// the orchestrator, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyDescriptor {
    /// Package identifier (lowercase identifier token)
    pub name: String,
    /// Source the package is taken from
    pub source: DependencySource,
}

impl DependencyDescriptor {
    /// Build a registry-sourced descriptor.
    #[must_use]
    pub fn registry(name: impl Into<String>, constraint: VersionConstraint) -> Self {
        Self {
            name: name.into(),
            source: DependencySource::Registry { constraint },
        }
    }
}

impl fmt::Display for DependencyDescriptor {
    /// Canonical specifier form; parsing it back yields an equal descriptor.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            DependencySource::Registry { constraint } => {
                write!(f, "{}@{constraint}", self.name)
            }
            DependencySource::Git { url, reference, .. } => {
                write!(f, "{}@git:{url}", self.name)?;
                if let Some(reference) = reference {
                    write!(f, "@{reference}")?;
                }
                Ok(())
            }
            DependencySource::GitHub {
                org,
                project,
                reference,
                ..
            } => {
                write!(f, "{}@github:{org}/{project}", self.name)?;
                if let Some(reference) = reference {
                    write!(f, "@{reference}")?;
                }
                Ok(())
            }
            DependencySource::Path { path, .. } => {
                write!(f, "{}@path:{path}", self.name)
            }
        }
    }
}

/// Outcome of parsing one specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedSpecifier {
    /// A bare package name; the caller must resolve a constraint from the
    /// registry before a descriptor exists.
    Bare {
        /// The validated package name
        name: String,
    },

    /// A fully determined descriptor (explicit version or source directive).
    Resolved(DependencyDescriptor),
}

/// Parse a single specifier into a descriptor or a bare-name marker.
///
/// # Errors
///
/// Returns a [`SpecifierError`] for an empty input, an invalid name
/// segment, a malformed git/github directive, or a version text that fails
/// both the strict and the loose parse.
pub fn parse_specifier(specifier: &str) -> Result<ParsedSpecifier, SpecifierError> {
    let specifier = specifier.trim();
    if specifier.is_empty() {
        return Err(SpecifierError::Empty);
    }

    let Some((name, directive)) = specifier.split_once('@') else {
        let name = validate_name(specifier)?;
        return Ok(ParsedSpecifier::Bare { name });
    };

    let name = validate_name(name)?;
    let source = parse_directive(directive)?;
    Ok(ParsedSpecifier::Resolved(DependencyDescriptor {
        name,
        source,
    }))
}

fn validate_name(name: &str) -> Result<String, SpecifierError> {
    if PACKAGE_NAME_RE.is_match(name) {
        Ok(name.to_string())
    } else {
        Err(SpecifierError::InvalidName {
            name: name.to_string(),
        })
    }
}

/// Dispatch on the directive prefix, in order; the version branch is the
/// fallback for anything unprefixed.
fn parse_directive(directive: &str) -> Result<DependencySource, SpecifierError> {
    if let Some(rest) = directive.strip_prefix("git:") {
        parse_git(rest)
    } else if let Some(rest) = directive.strip_prefix("github:") {
        parse_github(rest)
    } else if let Some(rest) = directive.strip_prefix("path:") {
        parse_path(rest)
    } else {
        parse_version(directive)
    }
}

fn parse_git(rest: &str) -> Result<DependencySource, SpecifierError> {
    if rest.is_empty() {
        return Err(SpecifierError::InvalidGitRef {
            directive: rest.to_string(),
        });
    }

    // The last `@` separates the ref; URLs may contain their own `@`.
    match rest.rsplit_once('@') {
        Some((url, reference)) => {
            if url.is_empty() || reference.is_empty() {
                return Err(SpecifierError::InvalidGitRef {
                    directive: rest.to_string(),
                });
            }
            Ok(DependencySource::Git {
                url: url.to_string(),
                reference: Some(reference.to_string()),
                is_override: false,
            })
        }
        None => Ok(DependencySource::Git {
            url: rest.to_string(),
            reference: None,
            is_override: true,
        }),
    }
}

fn parse_github(rest: &str) -> Result<DependencySource, SpecifierError> {
    let malformed = || SpecifierError::InvalidGitHubRef {
        directive: rest.to_string(),
    };

    if rest.contains('@') {
        // `org/project@ref`: splitting on both separators must yield
        // exactly three non-empty tokens, `/` before `@`.
        let tokens: Vec<&str> = rest.split(['/', '@']).collect();
        match tokens.as_slice() {
            [org, project, reference]
                if !org.is_empty() && !project.is_empty() && !reference.is_empty() =>
            {
                Ok(DependencySource::GitHub {
                    org: (*org).to_string(),
                    project: (*project).to_string(),
                    reference: Some((*reference).to_string()),
                    is_override: false,
                })
            }
            _ => Err(malformed()),
        }
    } else {
        let tokens: Vec<&str> = rest.split('/').collect();
        match tokens.as_slice() {
            [org, project] if !org.is_empty() && !project.is_empty() => {
                Ok(DependencySource::GitHub {
                    org: (*org).to_string(),
                    project: (*project).to_string(),
                    reference: None,
                    is_override: true,
                })
            }
            _ => Err(malformed()),
        }
    }
}

fn parse_path(rest: &str) -> Result<DependencySource, SpecifierError> {
    if rest.is_empty() {
        return Err(SpecifierError::EmptyPath);
    }
    Ok(DependencySource::Path {
        path: rest.to_string(),
        is_override: true,
    })
}

fn parse_version(directive: &str) -> Result<DependencySource, SpecifierError> {
    VersionConstraint::parse(directive)
        .map(|constraint| DependencySource::Registry { constraint })
        .map_err(|_| SpecifierError::InvalidVersion {
            requirement: directive.to_string(),
        })
}
