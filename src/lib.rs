//! Ingot - project-aware package installer.
//!
//! Ingot turns human-friendly package *specifiers* (`ash`,
//! `ash_postgres@~2.0`, `foo@git:url@ref`) into structured dependency
//! descriptors, consults a remote package registry for the latest release
//! when no version is given, records the dependencies in the project's
//! `ingot.toml`, fetches them through a configurable external command, and
//! then discovers and runs each package's installer task in a
//! deterministic, request-ordered sequence — with a dry-run preview mode
//! and an environment-scoping guard.
//!
//! # Pipeline
//!
//! ```text
//! specifiers -> [requirement] normalize -> [installer] orchestrate
//!                  |  uses                      |  uses
//!            [specifier] parse           [project] fetch collaborator
//!            [registry] resolve latest   [task] capability table
//!            [version] constraints       executor (dry-run / apply)
//! ```
//!
//! # Modules
//!
//! - [`cli`] - command-line interface (`install`, `init`, `tasks`)
//! - [`core`] - error types and user-facing error presentation
//! - [`specifier`] - specifier grammar and dependency descriptors
//! - [`version`] - version constraint parsing and normalization
//! - [`registry`] - package registry HTTP client
//! - [`requirement`] - input normalization and the self-install guard
//! - [`task`] - installer capability table and environment model
//! - [`installer`] - the six-stage installation orchestrator
//! - [`project`] - `ingot.toml` manifest handling and the fetch collaborator
//! - [`constants`] - shared endpoints, timeouts, and well-known names

pub mod cli;
pub mod constants;
pub mod core;
pub mod installer;
pub mod project;
pub mod registry;
pub mod requirement;
pub mod specifier;
pub mod task;
pub mod version;
