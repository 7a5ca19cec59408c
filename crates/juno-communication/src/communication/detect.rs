//! ESP32 port detection
//!
//! A port is a candidate when its description names a known USB-to-serial
//! bridge chip or its system identifier follows a USB-serial naming
//! convention. The first candidate in enumeration order wins; several
//! attached boards are not told apart.

use super::serial::{list_ports, SerialPortInfo};
use juno_core::ConnectionError;

/// Bridge chip signatures matched against the lowercased description
pub const BRIDGE_SIGNATURES: [&str; 5] = ["ch340", "usb serial", "cp210x", "silicon labs", "ftdi"];

/// Fragments matched against the lowercased system identifier
pub const NAME_PATTERNS: [&str; 3] = ["usbserial", "ttyusb", "cu.usbserial"];

/// Check whether a port looks like an ESP32 development board
pub fn is_candidate(port: &SerialPortInfo) -> bool {
    let description = port.description.to_lowercase();
    let name = port.port_name.to_lowercase();
    BRIDGE_SIGNATURES.iter().any(|sig| description.contains(sig))
        || NAME_PATTERNS.iter().any(|pattern| name.contains(pattern))
}

/// Pick the first candidate from an enumerated port list
pub fn select_port(ports: &[SerialPortInfo]) -> Option<&SerialPortInfo> {
    ports.iter().find(|port| is_candidate(port))
}

/// Enumerates host serial ports and applies the candidate heuristics
#[derive(Debug, Default, Clone, Copy)]
pub struct PortDetector;

impl PortDetector {
    /// Create a new detector
    pub fn new() -> Self {
        Self
    }

    /// System identifier of the first candidate port, or `None`
    ///
    /// Enumeration failures are logged and reported as no candidate.
    pub fn detect(&self) -> Option<String> {
        match self.try_detect() {
            Ok(port) => Some(port),
            Err(ConnectionError::NoCandidatePort) => {
                tracing::warn!("No ESP32 serial port detected");
                None
            }
            Err(e) => {
                tracing::warn!("Serial port detection failed: {}", e);
                None
            }
        }
    }

    /// Like [`detect`](Self::detect) but reports why nothing was found
    pub fn try_detect(&self) -> Result<String, ConnectionError> {
        let ports = list_ports()?;
        tracing::debug!("Enumerated {} serial ports", ports.len());
        select_port(&ports)
            .map(|port| {
                tracing::info!("Detected ESP32 on {} ({})", port.port_name, port.description);
                port.port_name.clone()
            })
            .ok_or(ConnectionError::NoCandidatePort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_signatures() {
        for description in [
            "USB-SERIAL CH340",
            "Silicon Labs CP210x USB to UART Bridge",
            "FTDI FT232R USB UART",
            "USB Serial Device",
        ] {
            let port = SerialPortInfo::new("COM7", description);
            assert!(is_candidate(&port), "{description}");
        }
    }

    #[test]
    fn test_name_patterns() {
        assert!(is_candidate(&SerialPortInfo::new("/dev/ttyUSB0", "Serial Port")));
        assert!(is_candidate(&SerialPortInfo::new(
            "/dev/cu.usbserial-0001",
            "Serial Port"
        )));
        assert!(!is_candidate(&SerialPortInfo::new("/dev/ttyS0", "Serial Port")));
        assert!(!is_candidate(&SerialPortInfo::new("COM1", "Communications Port")));
    }

    #[test]
    fn test_first_candidate_wins() {
        let ports = vec![
            SerialPortInfo::new("/dev/ttyS0", "Serial Port"),
            SerialPortInfo::new("/dev/ttyUSB1", "USB CH340"),
            SerialPortInfo::new("/dev/ttyUSB0", "USB CP210x"),
        ];
        assert_eq!(select_port(&ports).map(|p| p.port_name.as_str()), Some("/dev/ttyUSB1"));
        assert_eq!(select_port(&ports[..1]), None);
        assert_eq!(select_port(&[]), None);
    }
}
