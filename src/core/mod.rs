//! Core types and error handling for ingot.
//!
//! This module hosts the crate-wide error type ([`IngotError`]), the
//! user-facing error presentation layer ([`ErrorContext`] and
//! [`user_friendly_error`]), and nothing else: domain logic lives in the
//! modules that own it.

pub mod error;

pub use error::{ErrorContext, IngotError, user_friendly_error};
