//! Version constraint parsing and normalization for ingot dependencies.
//!
//! Two constraint shapes exist:
//!
//! - **Exact**: produced when a specifier carries a full semantic version
//!   (`foo@1.2.3`). Matches exactly that version and renders as `=1.2.3`.
//! - **Requirement**: a "general requirement" accepting partial versions and
//!   range shorthand (`~1.2`, `^1`, `>=1.0, <2.0`), backed by
//!   [`semver::VersionReq`]. This is also the form a registry's latest
//!   release is loosened into when a bare name is resolved.
//!
//! No solving or backtracking happens here: a constraint is normalized once
//! at parse time and then only displayed or matched against single versions.
//!
//! # Examples
//!
//! ```
//! use ingot::version::VersionConstraint;
//! use semver::Version;
//!
//! let exact = VersionConstraint::parse("1.2.3").unwrap();
//! assert_eq!(exact.to_string(), "=1.2.3");
//!
//! let loose = VersionConstraint::parse("~1.2").unwrap();
//! assert!(loose.matches(&Version::new(1, 2, 9)));
//! ```

use semver::{Op, Version, VersionReq};
use std::fmt;

/// A version constraint attached to a registry-sourced dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    /// Exact version match (e.g. `=1.2.3`)
    Exact(Version),

    /// Semantic version requirement (e.g. `~1.2`, `^1.0.0`, `>=1, <2`)
    Requirement(VersionReq),
}

impl VersionConstraint {
    /// Parse a constraint string, strict first, then loose.
    ///
    /// A string that parses as a full semantic version becomes an
    /// [`Exact`](Self::Exact) constraint. Anything else is attempted as a
    /// general requirement; a requirement that pins one full version with
    /// the `=` operator is normalized back to `Exact` so the canonical text
    /// round-trips to an equal constraint.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`semver::Error`] when the input is neither a
    /// version nor a parseable requirement.
    pub fn parse(input: &str) -> Result<Self, semver::Error> {
        let trimmed = input.trim();

        if let Ok(version) = Version::parse(trimmed) {
            return Ok(Self::Exact(version));
        }

        let req = VersionReq::parse(trimmed)?;
        Ok(Self::normalize(req))
    }

    /// Parse a loose "general requirement" without the strict-version step.
    ///
    /// Accepts partial versions (`1`, `1.2`) and range shorthand. Used for
    /// registry release normalization and directive fallback parsing.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`semver::Error`] for unparseable input.
    pub fn parse_requirement(input: &str) -> Result<Self, semver::Error> {
        let req = VersionReq::parse(input.trim())?;
        Ok(Self::normalize(req))
    }

    /// Loosen a concrete released version into a general requirement.
    ///
    /// The registry's newest release `2.3.4` becomes `^2.3`: future patch
    /// and minor releases stay acceptable without re-resolving, while a
    /// major bump does not slip in silently.
    #[must_use]
    pub fn loosened_from(version: &Version) -> Self {
        let req = VersionReq::parse(&format!("^{}.{}", version.major, version.minor))
            .unwrap_or_else(|_| unreachable!("caret requirement from version components"));
        Self::Requirement(req)
    }

    /// Check whether a concrete version satisfies this constraint.
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            Self::Exact(exact) => exact == version,
            Self::Requirement(req) => req.matches(version),
        }
    }

    /// Collapse a single-comparator `=x.y.z` requirement into `Exact`.
    fn normalize(req: VersionReq) -> Self {
        if req.comparators.len() == 1 {
            let cmp = &req.comparators[0];
            if cmp.op == Op::Exact {
                if let (Some(minor), Some(patch)) = (cmp.minor, cmp.patch) {
                    let mut version = Version::new(cmp.major, minor, patch);
                    version.pre = cmp.pre.clone();
                    return Self::Exact(version);
                }
            }
        }
        Self::Requirement(req)
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(version) => write!(f, "={version}"),
            Self::Requirement(req) => write!(f, "{req}"),
        }
    }
}
