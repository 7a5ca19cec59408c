//! Serial port enumeration, channels and ESP32 port detection

pub mod detect;
pub mod serial;

pub use detect::{is_candidate, select_port, PortDetector};
pub use serial::{list_ports, RealSerialPort, SerialChannel, SerialPortInfo};
