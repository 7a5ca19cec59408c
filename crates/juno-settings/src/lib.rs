//! # Juno Settings
//!
//! The toolchain configuration and its lifecycle.
//!
//! Provides:
//! - [`ToolchainConfiguration`], every resolved path plus the serial port
//! - JSON/TOML cache persistence under `<workdir>/.juno`
//! - The `juno.properties` override file (template, parsing, layering)
//! - [`ConfigurationController`], which loads, layers, refreshes the port
//!   and validates mandatory fields

pub mod config;
pub mod controller;
pub mod error;
pub mod overrides;
pub mod persistence;

pub use config::{is_unset, ConfigField, ToolchainConfiguration};
pub use controller::{
    ConfigOrigin, ConfigurationController, FixedPort, LoadedConfiguration, PortSource,
};
pub use error::{SettingsError, SettingsResult};
pub use overrides::{OverrideFile, Overrides};
pub use persistence::ConfigStore;
