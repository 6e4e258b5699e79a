//! Clonebox - clone git repositories into isolated sessions and serve their files.
//!
//! The crate exposes the session store, the git cloner, and the HTTP layer
//! so the binary and the integration tests can assemble them.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]

/// HTTP handlers and routes.
pub mod api;
/// Infrastructure components (config, server, telemetry, audit).
pub mod infrastructure;
/// Shared handler state.
pub mod state;
/// Repository cloning backends.
pub mod vcs;
/// Session directories and safe file access.
pub mod workspace;
