//! Error handling for Juno
//!
//! Provides error types for the layers of the host tool:
//! - Resolution errors (mandatory toolchain paths that could not be found)
//! - Connection errors (opening and enumerating serial ports)
//! - Session errors (handshake and interactive protocol)
//!
//! All error types use `thiserror` for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Resolution error type
///
/// Raised by the configuration validation gate when a mandatory field is
/// still empty after detection and override layering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// A mandatory field has no usable value
    #[error("Missing required path: {key}")]
    MissingMandatory {
        /// Fully qualified override key, e.g. `juno.idfPath`.
        key: String,
        /// Override file the operator can edit.
        override_file: PathBuf,
    },
}

impl ResolutionError {
    /// The override key that failed validation
    pub fn key(&self) -> &str {
        match self {
            ResolutionError::MissingMandatory { key, .. } => key,
        }
    }

    /// Operator-facing diagnostic naming the key and both remediation options
    pub fn diagnostic(&self) -> String {
        match self {
            ResolutionError::MissingMandatory { key, override_file } => format!(
                "Configuration Error:\n\
                 Missing required path: {key}\n\
                 Please fix this issue by one of the following options:\n\n  \
                 1. Open the generated file at:\n     {file}\n     -> Set the value for: {key}\n     \
                 -> Example for Windows:\n        juno.idfPath=C:/Espressif/frameworks/esp-idf-v5.3.1\n\n  \
                 2. Or, ensure your ESP-IDF environment is properly set in your system \
                 (IDF_PATH, IDF_TOOLS_PATH and PATH).\n\n\
                 Tip: This file is auto-generated and can be edited manually anytime.",
                file = override_file.display()
            ),
        }
    }
}

/// Connection error type
///
/// Represents errors related to serial port discovery and opening.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// No serial adapter matched the known USB-to-serial signatures
    #[error("No candidate serial port found")]
    NoCandidatePort,

    /// Port not found
    #[error("Port not found: {port}")]
    PortNotFound {
        /// The name of the port that was not found.
        port: String,
    },

    /// Failed to open port
    #[error("Failed to open port {port}: {reason}")]
    FailedToOpen {
        /// The name of the port that failed to open.
        port: String,
        /// The reason the port failed to open.
        reason: String,
    },

    /// Port enumeration failed
    #[error("Failed to enumerate ports: {reason}")]
    EnumerationFailed {
        /// The reason enumeration failed.
        reason: String,
    },

    /// Serial port error
    #[error("Serial port error: {reason}")]
    SerialError {
        /// The reason for the serial port error.
        reason: String,
    },
}

/// Session error type
///
/// Represents failures of the device handshake and the interactive line
/// protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Device answered the handshake with something other than `thunder`
    #[error("Handshake failed: expected 'thunder', got '{reply}'")]
    HandshakeFailed {
        /// The trimmed reply line.
        reply: String,
    },

    /// Device did not answer the handshake in time
    #[error("Handshake timed out after {timeout_ms}ms")]
    HandshakeTimeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Operation requires a different session state
    #[error("Invalid session state: expected {expected}, was {actual}")]
    InvalidState {
        /// The state the operation requires.
        expected: String,
        /// The state the session is in.
        actual: String,
    },

    /// A bounded read reached its deadline
    #[error("Read timed out after {timeout_ms}ms")]
    ReadTimeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The byte stream ended
    #[error("Device stream closed")]
    StreamClosed,

    /// Reading was cancelled through the session token
    #[error("Session cancelled")]
    Cancelled,

    /// Sending a line to the device failed
    #[error("Failed to send: {reason}")]
    SendFailed {
        /// The reason the write failed.
        reason: String,
    },

    /// Reading from the device failed
    #[error("Failed to read line: {reason}")]
    ReadFailed {
        /// The reason the read failed.
        reason: String,
    },
}

/// Main error type for Juno
///
/// A unified error type that can represent any error from the core layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Resolution error
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Connection error
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// Session error
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a fatal configuration error
    pub fn is_resolution_error(&self) -> bool {
        matches!(self, Error::Resolution(_))
    }

    /// Check if this is a connection error
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Error::Connection(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Session(SessionError::HandshakeTimeout { .. })
                | Error::Session(SessionError::ReadTimeout { .. })
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_names_key_and_both_remedies() {
        let err = ResolutionError::MissingMandatory {
            key: "juno.idfPath".to_string(),
            override_file: PathBuf::from(".juno/juno.properties"),
        };
        let text = err.diagnostic();
        assert!(text.contains("juno.idfPath"));
        assert!(text.contains(".juno/juno.properties"));
        assert!(text.contains("1. Open the generated file"));
        assert!(text.contains("2. Or, ensure your ESP-IDF environment"));
        assert_eq!(err.key(), "juno.idfPath");
        assert_eq!(err.to_string(), "Missing required path: juno.idfPath");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = SessionError::HandshakeTimeout { timeout_ms: 500 }.into();
        assert!(err.is_timeout());
        assert!(!err.is_connection_error());

        let err: Error = ConnectionError::NoCandidatePort.into();
        assert!(err.is_connection_error());

        let err: Error = ResolutionError::MissingMandatory {
            key: "juno.serialPort".to_string(),
            override_file: PathBuf::new(),
        }
        .into();
        assert!(err.is_resolution_error());
    }

    #[test]
    fn test_session_error_display() {
        let err = SessionError::HandshakeFailed {
            reply: "nope".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Handshake failed: expected 'thunder', got 'nope'"
        );
    }
}
