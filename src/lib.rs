//! # Juno
//!
//! Host tool that prepares a developer machine to build, flash and talk to
//! ESP32 firmware:
//! - Detects the ESP-IDF toolchain, Python environment and USB serial port
//! - Layers operator overrides over detection and caches the result
//! - Scaffolds an ESP-IDF project, then builds and flashes it through the
//!   platform shell
//! - Runs a line-oriented request/response session with the device
//!
//! ## Architecture
//!
//! Juno is organized as a workspace with multiple crates:
//!
//! 1. **juno-core** - Error taxonomy, platform descriptor, environment snapshot
//! 2. **juno-toolchain** - Tool path resolution and validation
//! 3. **juno-settings** - Configuration record, override file, cache, lifecycle
//! 4. **juno-communication** - Port detection and the device session
//! 5. **juno** - Build pipeline, CLI and the binary that ties them together

pub mod app;
pub mod cli;
pub mod pipeline;

pub use app::App;
pub use cli::{Cli, Command};

pub use juno_communication::{DeviceSession, PortDetector, SessionConfig, SessionEnd};
pub use juno_core::{ConnectionError, Environment, Error, Platform, ResolutionError, Result, SessionError};
pub use juno_settings::{ConfigStore, SettingsError, ToolchainConfiguration};
pub use juno_toolchain::{DetectionReport, PathResolver, ToolKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Logs go to stderr so stdout stays clean for device output and reports.
/// `RUST_LOG` overrides the default level, which is INFO or DEBUG when
/// `verbose` is set.
pub fn init_logging(verbose: bool, json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(verbose)
                    .with_level(true)
                    .with_line_number(verbose),
            )
            .try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}
