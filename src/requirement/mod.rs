//! Requirement normalization.
//!
//! Wraps the specifier parser and the registry resolver behind one entry
//! point: whatever shape the caller supplies — a comma-joined string, a
//! list of specifier strings, or pre-built descriptors — [`normalize`]
//! yields the same uniform `Vec<DependencyDescriptor>` in caller order.
//!
//! Normalization fails fast: the first unparseable specifier aborts the
//! whole request with a message naming the offending input, and no partial
//! descriptor list is ever returned. A request that names ingot's own
//! package is rejected outright — a self-install is always an error.

use tracing::debug;

use crate::constants::SELF_PACKAGE_NAME;
use crate::core::IngotError;
use crate::registry::RegistryClient;
use crate::specifier::{DependencyDescriptor, ParsedSpecifier, parse_specifier};

/// The three input shapes accepted by [`normalize`].
#[derive(Debug, Clone)]
pub enum InstallInput {
    /// One comma-delimited string of specifiers (`"ash,ash_postgres@~2.0"`)
    CommaDelimited(String),

    /// A list of specifier strings; elements may themselves contain commas
    List(Vec<String>),

    /// Pre-built descriptors from a programmatic caller, passed through
    Descriptors(Vec<DependencyDescriptor>),
}

/// Normalize caller input into a uniform descriptor list.
///
/// Bare names are resolved through `registry` into a loose constraint on
/// the latest released version; one lookup per bare name, no lookups for
/// anything else. Output order matches request order.
///
/// # Errors
///
/// - [`IngotError::InvalidSpecifier`] for the first specifier that fails to
///   parse (all-or-nothing: no partial list is returned)
/// - [`IngotError::RegistryResolutionFailed`] when a bare name cannot be
///   resolved
/// - [`IngotError::SelfInstallRejected`] when the request names ingot itself
pub async fn normalize(
    input: InstallInput,
    registry: &RegistryClient,
) -> Result<Vec<DependencyDescriptor>, IngotError> {
    let descriptors = match input {
        InstallInput::CommaDelimited(joined) => {
            parse_all(&split_segments(&[joined]), registry).await?
        }
        InstallInput::List(specifiers) => parse_all(&split_segments(&specifiers), registry).await?,
        InstallInput::Descriptors(descriptors) => descriptors,
    };

    reject_self_install(&descriptors)?;
    Ok(descriptors)
}

/// Reject any descriptor list naming ingot's own package.
///
/// # Errors
///
/// Returns [`IngotError::SelfInstallRejected`] before any mutation happens.
pub fn reject_self_install(descriptors: &[DependencyDescriptor]) -> Result<(), IngotError> {
    if descriptors.iter().any(|d| d.name == SELF_PACKAGE_NAME) {
        return Err(IngotError::SelfInstallRejected);
    }
    Ok(())
}

/// Split every element on `,`, dropping empty segments.
fn split_segments<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .flat_map(|s| s.as_ref().split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

async fn parse_all(
    specifiers: &[String],
    registry: &RegistryClient,
) -> Result<Vec<DependencyDescriptor>, IngotError> {
    let mut descriptors = Vec::with_capacity(specifiers.len());

    for specifier in specifiers {
        let parsed = parse_specifier(specifier).map_err(|err| IngotError::InvalidSpecifier {
            specifier: specifier.clone(),
            reason: err.to_string(),
        })?;

        let descriptor = match parsed {
            ParsedSpecifier::Resolved(descriptor) => descriptor,
            ParsedSpecifier::Bare { name } => {
                debug!(package = %name, "bare name, consulting registry for latest release");
                let constraint = registry.resolve_latest(&name).await?;
                DependencyDescriptor::registry(name, constraint)
            }
        };
        descriptors.push(descriptor);
    }

    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specifier::DependencySource;
    use crate::version::VersionConstraint;

    fn offline_registry() -> RegistryClient {
        // Never contacted in these tests; any lookup would fail loudly.
        RegistryClient::with_base_url("http://127.0.0.1:1").unwrap()
    }

    #[tokio::test]
    async fn comma_string_and_list_normalize_identically() {
        let registry = offline_registry();
        let from_string = normalize(
            InstallInput::CommaDelimited("ash@1.0.0,ash_postgres@~2.0".to_string()),
            &registry,
        )
        .await
        .unwrap();
        let from_list = normalize(
            InstallInput::List(vec![
                "ash@1.0.0".to_string(),
                "ash_postgres@~2.0".to_string(),
            ]),
            &registry,
        )
        .await
        .unwrap();

        assert_eq!(from_string, from_list);
        assert_eq!(from_string[0].name, "ash");
        assert_eq!(from_string[1].name, "ash_postgres");
    }

    #[tokio::test]
    async fn first_bad_specifier_aborts_with_its_name() {
        let registry = offline_registry();
        let err = normalize(
            InstallInput::List(vec![
                "good@1.0.0".to_string(),
                "Bad Name".to_string(),
                "also_good@1.0.0".to_string(),
            ]),
            &registry,
        )
        .await
        .unwrap_err();

        match err {
            IngotError::InvalidSpecifier { specifier, .. } => assert_eq!(specifier, "Bad Name"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn descriptors_pass_through_unchanged() {
        let registry = offline_registry();
        let prebuilt = vec![DependencyDescriptor::registry(
            "ash",
            VersionConstraint::parse("1.0.0").unwrap(),
        )];

        let normalized = normalize(InstallInput::Descriptors(prebuilt.clone()), &registry)
            .await
            .unwrap();
        assert_eq!(normalized, prebuilt);
    }

    #[tokio::test]
    async fn self_install_is_rejected_in_every_shape() {
        let registry = offline_registry();
        let err = normalize(
            InstallInput::CommaDelimited("ash@1.0.0,ingot@1.0.0".to_string()),
            &registry,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, IngotError::SelfInstallRejected));

        let err = normalize(
            InstallInput::Descriptors(vec![DependencyDescriptor::registry(
                "ingot",
                VersionConstraint::parse("1.0.0").unwrap(),
            )]),
            &registry,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, IngotError::SelfInstallRejected));
    }

    #[tokio::test]
    async fn bare_name_is_resolved_through_the_registry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/packages/ash")
            .with_status(200)
            .with_body(r#"{"releases": [{"version": "2.1.0"}]}"#)
            .expect(1)
            .create_async()
            .await;
        let registry = RegistryClient::with_base_url(server.url()).unwrap();

        let descriptors = normalize(
            InstallInput::List(vec!["ash".to_string(), "pinned@1.0.0".to_string()]),
            &registry,
        )
        .await
        .unwrap();

        match &descriptors[0].source {
            DependencySource::Registry { constraint } => {
                assert_eq!(constraint.to_string(), "^2.1");
            }
            other => panic!("unexpected source: {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_segments_are_dropped() {
        let registry = offline_registry();
        let descriptors = normalize(
            InstallInput::CommaDelimited("ash@1.0.0,,".to_string()),
            &registry,
        )
        .await
        .unwrap();
        assert_eq!(descriptors.len(), 1);
    }
}
