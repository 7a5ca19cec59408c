//! Build pipeline collaborators
//!
//! The host-side steps between a validated configuration and a device
//! session, each behind a small trait:
//!
//! - [`ProjectScaffolder`] writes the ESP-IDF project skeleton
//! - [`ScriptEmitter`] writes the platform build-and-flash script
//! - [`BuildRunner`] executes the script and reports pass/fail

pub mod runner;
pub mod scaffold;
pub mod script;

pub use runner::{BuildOutcome, BuildRunner, ShellRunner};
pub use scaffold::{Esp32Scaffolder, ProjectScaffolder, PROJECT_NAME};
pub use script::{IdfScriptEmitter, ScriptAction, ScriptEmitter};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the pipeline collaborators
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A mandatory configuration value was empty when the script was emitted
    #[error("Missing configuration value: {0}")]
    MissingValue(&'static str),

    /// The script to run does not exist
    #[error("Script not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    /// The interpreter could not be started
    #[error("Failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error while writing files or reading output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
