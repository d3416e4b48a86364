//! Package registry client.
//!
//! Resolves the latest released version of a bare-name package via the
//! registry's metadata endpoint:
//!
//! ```text
//! GET <registry>/api/packages/<name>
//! User-Agent: ingot/<version>
//! ```
//!
//! The response is JSON of the form
//! `{"releases": [{"version": "2.3.4"}, ...]}` ordered newest-first; the
//! head entry is loosened into a general requirement (see
//! [`VersionConstraint::loosened_from`]). Exactly one attempt is made per
//! lookup, bounded by [`REGISTRY_TIMEOUT`]: any transport failure, non-2xx
//! status, malformed body, or empty release list collapses into
//! [`IngotError::RegistryResolutionFailed`], which aborts the whole install
//! request before anything is mutated.

use serde::Deserialize;
use tracing::debug;

use crate::constants::{REGISTRY_BASE_URL, REGISTRY_TIMEOUT, REGISTRY_USER_AGENT};
use crate::core::IngotError;
use crate::version::VersionConstraint;

/// Registry metadata payload for one package.
#[derive(Debug, Deserialize)]
struct PackageMetadata {
    /// Released versions, newest first
    releases: Vec<Release>,
}

/// One released version of a package.
#[derive(Debug, Deserialize)]
struct Release {
    version: String,
}

/// HTTP client for the package registry.
///
/// Construct with [`RegistryClient::new`] for the production registry, or
/// [`RegistryClient::with_base_url`] to point at a test server.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    /// Create a client against the default registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self, IngotError> {
        Self::with_base_url(REGISTRY_BASE_URL)
    }

    /// Create a client against a custom registry base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, IngotError> {
        let client = reqwest::Client::builder()
            .user_agent(REGISTRY_USER_AGENT)
            .timeout(REGISTRY_TIMEOUT)
            .build()
            .map_err(|err| IngotError::RegistryResolutionFailed {
                name: String::new(),
                reason: format!("could not build HTTP client: {err}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Resolve the latest released version of `name` into a loose constraint.
    ///
    /// # Errors
    ///
    /// Returns [`IngotError::RegistryResolutionFailed`] on any transport
    /// failure, non-success status, malformed body, unparseable version, or
    /// empty release list. No retries are performed.
    pub async fn resolve_latest(&self, name: &str) -> Result<VersionConstraint, IngotError> {
        let url = format!("{}/api/packages/{name}", self.base_url);
        debug!(package = name, url = %url, "resolving latest release from registry");

        let failed = |reason: String| IngotError::RegistryResolutionFailed {
            name: name.to_string(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| failed(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("registry returned {status}")));
        }

        let metadata: PackageMetadata = response
            .json()
            .await
            .map_err(|err| failed(format!("malformed registry response: {err}")))?;

        let release = metadata
            .releases
            .first()
            .ok_or_else(|| failed("package has no released versions".to_string()))?;

        debug!(package = name, version = %release.version, "latest release found");

        match semver::Version::parse(&release.version) {
            Ok(version) => Ok(VersionConstraint::loosened_from(&version)),
            Err(_) => VersionConstraint::parse_requirement(&release.version).map_err(|err| {
                failed(format!(
                    "release version `{}` is not parseable: {err}",
                    release.version
                ))
            }),
        }
    }
}
