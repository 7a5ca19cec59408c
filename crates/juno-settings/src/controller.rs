//! Configuration lifecycle
//!
//! Runs once at startup:
//!
//! 1. Load the cache, or detect every tool when there is none
//! 2. Re-detect the serial port, clearing it when no device is attached
//! 3. Layer the override file under detection (also when a cached value is missing)
//! 4. Validate mandatory fields, then persist

use juno_communication::PortDetector;
use juno_toolchain::PathResolver;

use crate::config::{ConfigField, ToolchainConfiguration};
use crate::error::SettingsResult;
use crate::persistence::ConfigStore;

/// Supplies the serial port for the refresh step
pub trait PortSource {
    /// Currently attached device port, if any
    fn detect_port(&self) -> Option<String>;
}

impl PortSource for PortDetector {
    fn detect_port(&self) -> Option<String> {
        self.detect()
    }
}

/// A port chosen up front, e.g. from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedPort(pub Option<String>);

impl PortSource for FixedPort {
    fn detect_port(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Where the non-port fields came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Trusted cache file
    Cache,
    /// Fresh detection pass
    Detected,
}

/// Result of the startup lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfiguration {
    /// Validated configuration
    pub config: ToolchainConfiguration,
    /// Cache or detection
    pub origin: ConfigOrigin,
    /// Fields filled from the override file
    pub overridden: Vec<ConfigField>,
}

/// Drives load, layering, port refresh and validation
pub struct ConfigurationController<'a> {
    store: &'a ConfigStore,
    resolver: PathResolver<'a>,
    ports: &'a dyn PortSource,
}

impl<'a> ConfigurationController<'a> {
    /// Create a controller
    pub fn new(
        store: &'a ConfigStore,
        resolver: PathResolver<'a>,
        ports: &'a dyn PortSource,
    ) -> Self {
        Self {
            store,
            resolver,
            ports,
        }
    }

    /// Produce a validated configuration
    ///
    /// A missing mandatory field yields `SettingsError::Resolution`; nothing
    /// is persisted in that case. Save failures are logged and ignored.
    pub fn load(&self) -> SettingsResult<LoadedConfiguration> {
        let (mut config, origin) = match self.store.load_cache()? {
            Some(config) => (config, ConfigOrigin::Cache),
            None => {
                tracing::info!("Config not found, running auto-detection");
                let report = self.resolver.detect_all();
                (
                    ToolchainConfiguration::from_detection(&report, None),
                    ConfigOrigin::Detected,
                )
            }
        };

        self.refresh_port(&mut config);

        let mut overridden = Vec::new();
        if origin == ConfigOrigin::Detected || !config.missing_mandatory().is_empty() {
            overridden = self.layer_overrides(&mut config)?;
        }

        config.validate(self.store.override_file().path())?;

        if let Err(e) = self.store.save_cache(&config) {
            tracing::warn!("Failed to save config: {}", e);
        }

        Ok(LoadedConfiguration {
            config,
            origin,
            overridden,
        })
    }

    /// Fill unset fields from the override file, creating its template first
    pub fn layer_overrides(
        &self,
        config: &mut ToolchainConfiguration,
    ) -> SettingsResult<Vec<ConfigField>> {
        let file = self.store.override_file();
        if let Err(e) = file.ensure_template() {
            tracing::warn!("Failed to create override template: {}", e);
        }
        let overrides = file.load()?;
        let filled = overrides.apply(config);
        if !filled.is_empty() {
            tracing::info!(
                "Loaded {} manual overrides from {}",
                filled.len(),
                file.path().display()
            );
        }
        Ok(filled)
    }

    /// Replace the serial port with the currently attached device
    ///
    /// When nothing is detected the port is cleared, so only the override
    /// file can supply it before validation.
    pub fn refresh_port(&self, config: &mut ToolchainConfiguration) {
        match self.ports.detect_port().map(|p| p.trim().to_string()) {
            Some(port) if !port.is_empty() => {
                tracing::info!("Serial port updated to {}", port);
                config.serial_port = Some(port);
            }
            _ => {
                tracing::warn!("No ESP32 serial port detected");
                config.serial_port = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use juno_core::{Environment, OsFamily, Platform};
    use std::path::Path;

    fn configured(port: &str) -> ToolchainConfiguration {
        let mut config = ToolchainConfiguration::new();
        config.serial_port = Some(port.to_string());
        config
    }

    #[test]
    fn test_fixed_port_source() {
        assert_eq!(FixedPort(Some("COM3".into())).detect_port().as_deref(), Some("COM3"));
        assert_eq!(FixedPort::default().detect_port(), None);
    }

    #[test]
    fn test_refresh_port_clears_when_nothing_detected() {
        let platform = Platform::for_family(OsFamily::Linux, "/home/dev");
        let env = Environment::empty();
        let store = ConfigStore::new(Path::new("/work"));
        let ports = FixedPort(Some("  ".to_string()));
        let controller = ConfigurationController::new(&store, PathResolver::new(&platform, &env), &ports);

        let mut config = configured("COM7");
        controller.refresh_port(&mut config);
        assert_eq!(config.serial_port, None);
    }

    #[test]
    fn test_refresh_port_replaces_configured_value() {
        let platform = Platform::for_family(OsFamily::Linux, "/home/dev");
        let env = Environment::empty();
        let store = ConfigStore::new(Path::new("/work"));
        let ports = FixedPort(Some(" /dev/ttyUSB1 ".to_string()));
        let controller = ConfigurationController::new(&store, PathResolver::new(&platform, &env), &ports);

        let mut config = configured("COM7");
        controller.refresh_port(&mut config);
        assert_eq!(config.serial_port.as_deref(), Some("/dev/ttyUSB1"));
    }
}
