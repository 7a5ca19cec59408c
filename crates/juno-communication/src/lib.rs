//! # Juno Communication
//!
//! Serial side of the Juno host tool.
//!
//! - `communication`: port enumeration, the [`SerialChannel`] seam and the
//!   ESP32 [`PortDetector`]
//! - `session`: the [`DeviceSession`] handshake and interactive loop

pub mod communication;
pub mod session;

pub use communication::{
    list_ports, PortDetector, RealSerialPort, SerialChannel, SerialPortInfo,
};
pub use session::{
    start_session, CancellationToken, DeviceSession, OperatorConsole, SessionConfig, SessionEnd,
    SessionState, StdConsole,
};
