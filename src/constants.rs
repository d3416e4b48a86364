//! Global constants used throughout the ingot codebase.
//!
//! Registry endpoints, timeouts, and well-known names live here so the
//! magic values stay discoverable and consistent across modules.

use std::time::Duration;

/// Base URL of the package registry queried for bare-name specifiers.
///
/// The metadata endpoint for a package is
/// `<REGISTRY_BASE_URL>/api/packages/<name>`.
pub const REGISTRY_BASE_URL: &str = "https://packages.ingot.dev";

/// `User-Agent` header sent with every registry request.
pub const REGISTRY_USER_AGENT: &str = concat!("ingot/", env!("CARGO_PKG_VERSION"));

/// Timeout for a single registry metadata request (30 seconds).
///
/// The registry lookup is a single blocking step in the install pipeline;
/// a hung connection must not stall the whole command indefinitely.
/// A timeout is reported the same way as any other resolution failure.
pub const REGISTRY_TIMEOUT: Duration = Duration::from_secs(30);

/// Name of ingot's own package. Installing it into a project through
/// ingot itself is always rejected.
pub const SELF_PACKAGE_NAME: &str = "ingot";

/// Suffix appended to a package name to derive its installer task
/// identifier (e.g. `ash` -> `ash.install`).
pub const INSTALLER_TASK_SUFFIX: &str = ".install";

/// Project manifest file name.
pub const MANIFEST_FILE: &str = "ingot.toml";

/// Directory under the project root scanned for installer task scripts.
pub const TASKS_DIR: &str = "tasks";
