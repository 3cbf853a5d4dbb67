//! htpc-helpers - helper routines for a home-theater-PC dashboard.
//!
//! This crate provides a disk-backed image cache with resize, opacity and
//! color-mode transforms, small string utilities, a theme template renderer
//! and a self-signed certificate generator.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing services and text utilities.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external capabilities.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "htpc-helpers";
