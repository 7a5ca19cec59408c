//! # Juno Core
//!
//! Core types shared by every Juno crate.
//! Provides the unified error taxonomy, the host platform descriptor and an
//! explicit snapshot of the process environment.

pub mod env;
pub mod error;
pub mod platform;

pub use env::Environment;
pub use error::{ConnectionError, Error, ResolutionError, Result, SessionError};
pub use platform::{IdfRootCandidate, OsFamily, Platform};

/// Name of the per-project working directory that holds cache and override files
pub const WORKDIR_NAME: &str = ".juno";
