//! Serial port access
//!
//! Provides the low-level serial operations the device session needs:
//!
//! - Port enumeration with a human readable description per port
//! - The [`SerialChannel`] seam the session reads and writes through
//! - [`RealSerialPort`], the `serialport` backed channel

use juno_core::ConnectionError;
use serde::Serialize;
use std::fmt;
use std::io::{self, Read, Write};
use std::time::Duration;

/// Information about an available serial port
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerialPortInfo {
    /// System identifier (e.g., "/dev/ttyUSB0", "COM3")
    pub port_name: String,

    /// Descriptive name (e.g., "USB Silicon Labs CP2102 USB to UART Bridge")
    pub description: String,

    /// Manufacturer name if available
    pub manufacturer: Option<String>,

    /// USB vendor ID if applicable
    pub vid: Option<u16>,

    /// USB product ID if applicable
    pub pid: Option<u16>,
}

impl SerialPortInfo {
    /// Create a new port info
    pub fn new(port_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            description: description.into(),
            manufacturer: None,
            vid: None,
            pid: None,
        }
    }

    /// Set manufacturer
    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    /// Set USB IDs
    pub fn with_usb_ids(mut self, vid: u16, pid: u16) -> Self {
        self.vid = Some(vid);
        self.pid = Some(pid);
        self
    }

    /// USB IDs as `vid:pid` in hex, when known
    pub fn usb_ids(&self) -> Option<String> {
        match (self.vid, self.pid) {
            (Some(vid), Some(pid)) => Some(format!("{vid:04x}:{pid:04x}")),
            _ => None,
        }
    }
}

impl fmt::Display for SerialPortInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.port_name, self.description)?;
        if let Some(ids) = self.usb_ids() {
            write!(f, " [{ids}]")?;
        }
        if let Some(manufacturer) = &self.manufacturer {
            write!(f, " by {manufacturer}")?;
        }
        Ok(())
    }
}

/// List every serial port the host exposes, in enumeration order
pub fn list_ports() -> Result<Vec<SerialPortInfo>, ConnectionError> {
    match serialport::available_ports() {
        Ok(ports) => Ok(ports
            .iter()
            .map(|port| {
                let info = SerialPortInfo::new(&port.port_name, get_port_description(port));
                match &port.port_type {
                    serialport::SerialPortType::UsbPort(usb_info) => {
                        let info = info.with_usb_ids(usb_info.vid, usb_info.pid);
                        match &usb_info.manufacturer {
                            Some(mfg) => info.with_manufacturer(mfg),
                            None => info,
                        }
                    }
                    _ => info,
                }
            })
            .collect()),
        Err(e) => {
            tracing::error!("Failed to enumerate serial ports: {}", e);
            Err(ConnectionError::EnumerationFailed {
                reason: e.to_string(),
            })
        }
    }
}

/// Get a user-friendly description for a port
fn get_port_description(port: &serialport::SerialPortInfo) -> String {
    match &port.port_type {
        serialport::SerialPortType::UsbPort(usb_info) => {
            format!(
                "USB {} {}",
                usb_info.manufacturer.as_deref().unwrap_or("Device"),
                usb_info.product.as_deref().unwrap_or("Serial Port")
            )
        }
        serialport::SerialPortType::BluetoothPort => "Bluetooth Serial".to_string(),
        serialport::SerialPortType::PciPort => "PCI Serial".to_string(),
        _ => "Serial Port".to_string(),
    }
}

/// Byte channel to a device
///
/// Exclusively owned by one session. `bytes_available` must not block.
pub trait SerialChannel: Send {
    /// Port identifier
    fn name(&self) -> &str;

    /// Number of bytes that can be read without blocking
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Read into `buf`, returning `Ok(0)` at end of stream
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write all of `data`
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Flush pending output
    fn flush(&mut self) -> io::Result<()>;

    /// Release the underlying port
    fn close(&mut self) -> io::Result<()>;
}

/// Real serial port implementation using serialport crate
pub struct RealSerialPort {
    name: String,
    port: Option<Box<dyn serialport::SerialPort>>,
}

impl RealSerialPort {
    /// Open `port_name` at `baud_rate` with a bounded read/write timeout
    pub fn open(
        port_name: &str,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<Self, ConnectionError> {
        match serialport::new(port_name, baud_rate).timeout(timeout).open() {
            Ok(port) => Ok(Self {
                name: port_name.to_string(),
                port: Some(port),
            }),
            Err(e) => {
                tracing::warn!("Failed to open serial port {}: {}", port_name, e);
                Err(match e.kind() {
                    serialport::ErrorKind::NoDevice => ConnectionError::PortNotFound {
                        port: port_name.to_string(),
                    },
                    _ => ConnectionError::FailedToOpen {
                        port: port_name.to_string(),
                        reason: e.to_string(),
                    },
                })
            }
        }
    }

    fn port(&mut self) -> io::Result<&mut Box<dyn serialport::SerialPort>> {
        self.port
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "port closed"))
    }
}

impl SerialChannel for RealSerialPort {
    fn name(&self) -> &str {
        &self.name
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        let count = self.port()?.bytes_to_read().map_err(io::Error::from)?;
        Ok(count as usize)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Read::read(self.port()?, buf)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        Write::write_all(self.port()?, data)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(self.port()?)
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(port) = self.port.take() {
            drop(port);
            tracing::debug!("Closed serial port {}", self.name);
        }
        Ok(())
    }
}
