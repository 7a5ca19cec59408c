//! Command handlers
//!
//! Each subcommand runs the same strictly sequential pipeline up to the
//! point it needs: configuration, then build/flash, then the device session.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use juno_communication::communication::select_port;
use juno_communication::{
    list_ports, start_session, PortDetector, SessionConfig, SessionEnd, StdConsole,
};
use juno_core::{Environment, Error as CoreError, Platform, SessionError};
use juno_settings::{
    ConfigStore, ConfigurationController, FixedPort, LoadedConfiguration, PortSource,
};
use juno_toolchain::PathResolver;

use crate::pipeline::{
    BuildRunner, Esp32Scaffolder, IdfScriptEmitter, ProjectScaffolder, ScriptAction,
    ScriptEmitter, ShellRunner,
};

/// Values built once at startup and passed to every command
#[derive(Debug, Clone)]
pub struct App {
    platform: Platform,
    env: Environment,
    store: ConfigStore,
    session: SessionConfig,
}

impl App {
    /// Create an app rooted at `base`
    pub fn new(platform: Platform, env: Environment, base: PathBuf) -> Self {
        Self {
            platform,
            env,
            store: ConfigStore::new(&base),
            session: SessionConfig::default(),
        }
    }

    /// Platform descriptor
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Cache and override file locations
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    fn resolver(&self) -> PathResolver<'_> {
        PathResolver::new(&self.platform, &self.env)
    }

    /// Run the configuration lifecycle with `ports` as the port source
    pub fn load_configuration(&self, ports: &dyn PortSource) -> Result<LoadedConfiguration> {
        let controller = ConfigurationController::new(&self.store, self.resolver(), ports);
        let loaded = controller.load()?;
        Ok(loaded)
    }

    fn port_source(port: Option<String>) -> Box<dyn PortSource> {
        match port {
            Some(port) => Box::new(FixedPort(Some(port))),
            None => Box::new(PortDetector::new()),
        }
    }

    /// Configure, scaffold, build, flash, then open a device session
    pub fn run(&self) -> Result<()> {
        let loaded = self.load_configuration(&PortDetector::new())?;
        let port = loaded
            .config
            .serial_port
            .clone()
            .context("serial port missing after validation")?;

        self.build_and_flash(&loaded, &port, ScriptAction::BuildAndFlash)?;
        self.session(Some(&port))
    }

    /// Flash the generated project without rebuilding first
    pub fn flash(&self, port: Option<String>) -> Result<()> {
        let ports = Self::port_source(port);
        let loaded = self.load_configuration(ports.as_ref())?;
        let port = loaded
            .config
            .serial_port
            .clone()
            .context("serial port missing after validation")?;

        self.build_and_flash(&loaded, &port, ScriptAction::FlashOnly)
    }

    fn build_and_flash(
        &self,
        loaded: &LoadedConfiguration,
        port: &str,
        action: ScriptAction,
    ) -> Result<()> {
        let project = Esp32Scaffolder
            .scaffold(self.store.workdir())
            .context("Failed to create project")?;
        let script = IdfScriptEmitter::new(&self.platform)
            .emit(&loaded.config, &project, port, action)
            .context("Failed to write build script")?;

        let outcome = ShellRunner::new(self.platform.is_windows())
            .run(&script, &project)
            .context("Failed to run build script")?;
        if !outcome.success() {
            bail!("Flashing failed with exit code {:?}", outcome.exit_code);
        }
        println!("Flashing finished successfully.");
        Ok(())
    }

    /// Port for a device session: `port`, else the cached port
    ///
    /// `None` leaves the choice to port detection. An unreadable cache is an
    /// error.
    pub fn session_port(&self, port: Option<&str>) -> Result<Option<String>> {
        if let Some(port) = port {
            return Ok(Some(port.to_string()));
        }
        let cached = self
            .store
            .load_cache()
            .with_context(|| format!("Failed to load {}", self.store.cache_path().display()))?;
        Ok(cached.and_then(|config| config.serial_port))
    }

    /// Open a device session on `port`, the cached port, or a detected one
    ///
    /// A failed handshake is reported and is not an error for the process.
    pub fn session(&self, port: Option<&str>) -> Result<()> {
        let port = self.session_port(port)?;

        let mut console = StdConsole::new();
        settle_session(start_session(
            self.session.clone(),
            port.as_deref(),
            &mut console,
        ))
    }

    /// Print every detected tool and the attached serial ports
    pub fn detect(&self, json: bool) -> Result<()> {
        let report = self.resolver().detect_all();
        let ports = list_ports().unwrap_or_else(|e| {
            tracing::warn!("Serial port detection failed: {}", e);
            Vec::new()
        });
        let selected = select_port(&ports).map(|p| p.port_name.clone());

        if json {
            let value = serde_json::json!({
                "platform": self.platform.family,
                "tools": report.tools,
                "serialPort": selected,
                "ports": ports,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            print!("{report}");
            println!(
                "{:<22} -> {}",
                "Serial Port",
                selected.as_deref().unwrap_or("null")
            );
            for port in &ports {
                let marker = if Some(&port.port_name) == selected.as_ref() {
                    '*'
                } else {
                    ' '
                };
                println!("  {marker} {port}");
            }
        }
        Ok(())
    }

    /// Print the validated configuration or the file locations
    pub fn config(&self, path: bool) -> Result<()> {
        if path {
            println!("cache    = {}", self.store.cache_path().display());
            println!("override = {}", self.store.override_file().path().display());
            return Ok(());
        }
        let loaded = self.load_configuration(&PortDetector::new())?;
        println!("{}", serde_json::to_string_pretty(&loaded.config)?);
        Ok(())
    }
}

/// Map the end of a device session to the process result
///
/// Handshake failures are reported and swallowed; every other failure
/// propagates.
fn settle_session(result: juno_core::Result<SessionEnd>) -> Result<()> {
    match result {
        Ok(end) => {
            tracing::info!("Session ended: {:?}", end);
            Ok(())
        }
        Err(CoreError::Session(
            e @ (SessionError::HandshakeFailed { .. } | SessionError::HandshakeTimeout { .. }),
        )) => {
            eprintln!("ESP32 did not complete the handshake: {e}");
            Ok(())
        }
        Err(e) => Err(e).context("ESP32 session failed"),
    }
}
