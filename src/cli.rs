//! Command-line interface definition.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Prepare the host, build and flash ESP32 firmware, then talk to it
#[derive(Parser, Debug)]
#[command(name = "juno")]
#[command(about = "ESP32 toolchain detection, build/flash and serial session")]
#[command(version)]
pub struct Cli {
    /// Directory that holds the `.juno` working directory (defaults to the current directory)
    #[arg(long, global = true)]
    pub workdir: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Resolve configuration, build and flash, then open a device session (default)
    Run,

    /// Print every detected tool path without touching any file
    Detect {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the validated configuration
    Config {
        /// Print the cache and override file locations instead
        #[arg(long)]
        path: bool,
    },

    /// Flash the generated project
    Flash {
        /// Serial port (auto-detected when omitted)
        #[arg(short, long)]
        port: Option<String>,
    },

    /// Open a device session only
    Monitor {
        /// Serial port (configured or auto-detected when omitted)
        #[arg(short, long)]
        port: Option<String>,
    },

    /// Show version and build date
    Version,
}

impl Cli {
    /// Subcommand to run, `run` when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}
