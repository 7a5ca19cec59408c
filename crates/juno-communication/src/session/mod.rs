//! Device session
//!
//! Owns one serial channel from open to close and drives the line protocol:
//!
//! - `flash` / `thunder` handshake with a bounded read
//! - Interactive loop relaying device lines to the operator
//! - Operator prompt whenever the device sends `juno_read`
//!
//! A session is single-owner and never shared across threads; only its
//! [`CancellationToken`] may be handed out.

pub mod cancel;
pub mod config;
pub mod console;
pub mod protocol;
pub mod state;

pub use cancel::CancellationToken;
pub use config::SessionConfig;
pub use console::{OperatorConsole, StdConsole};
pub use state::SessionState;

use crate::communication::{PortDetector, RealSerialPort, SerialChannel};
use juno_core::{ConnectionError, SessionError};
use std::time::{Duration, Instant};

/// How the interactive loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Operator typed `exit`
    OperatorExit,
    /// Operator input stream closed
    InputClosed,
}

/// A line-oriented session with ESP32 firmware
pub struct DeviceSession {
    config: SessionConfig,
    state: SessionState,
    channel: Option<Box<dyn SerialChannel>>,
    buffer: Vec<u8>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for DeviceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceSession")
            .field("state", &self.state)
            .field("port", &self.port_name())
            .field("buffered", &self.buffer.len())
            .finish()
    }
}

impl DeviceSession {
    /// Create a disconnected session
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Disconnected,
            channel: None,
            buffer: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Name of the open port, if any
    pub fn port_name(&self) -> Option<&str> {
        self.channel.as_ref().map(|c| c.name())
    }

    /// Token that stops blocking reads when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Session parameters
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Open `port` at the configured baud rate
    ///
    /// On failure the session stays `Disconnected`; there is no retry.
    pub fn connect(&mut self, port: &str) -> Result<(), ConnectionError> {
        self.expect_state(SessionState::Disconnected)
            .map_err(|e| ConnectionError::SerialError {
                reason: e.to_string(),
            })?;
        let channel = RealSerialPort::open(port, self.config.baud_rate, self.config.timeout)?;
        tracing::info!("Opened {} at {} baud", port, self.config.baud_rate);
        self.attach(Box::new(channel));
        Ok(())
    }

    /// Open the configured port, or the detected one when none is configured
    ///
    /// Returns the port that was opened.
    pub fn connect_detected(
        &mut self,
        configured: Option<&str>,
        detector: &PortDetector,
    ) -> Result<String, ConnectionError> {
        let port = match configured.map(str::trim).filter(|p| !p.is_empty()) {
            Some(port) => port.to_string(),
            None => {
                let port = detector.try_detect()?;
                tracing::warn!("Using auto-detected port: {}", port);
                port
            }
        };
        self.connect(&port)?;
        Ok(port)
    }

    /// Adopt an already open channel
    pub fn attach(&mut self, channel: Box<dyn SerialChannel>) {
        self.channel = Some(channel);
        self.buffer.clear();
        self.state = SessionState::Connected;
    }

    /// Send `flash` and wait one timeout for `thunder`
    ///
    /// Any other reply, a timeout or an I/O error closes the session.
    pub fn handshake(&mut self) -> Result<(), SessionError> {
        self.expect_state(SessionState::Connected)?;
        self.state = SessionState::Handshaking;

        let timeout = self.config.timeout;
        let result = self
            .send(protocol::FLASH)
            .and_then(|()| self.read_line(Some(timeout)));

        match result {
            Ok(reply) if protocol::is_handshake_reply(&reply) => {
                tracing::info!("ESP32 is connected and ready (thunder received)");
                self.state = SessionState::Ready;
                Ok(())
            }
            Ok(reply) => {
                tracing::warn!("Unexpected handshake reply: {:?}", reply);
                self.close();
                Err(SessionError::HandshakeFailed {
                    reply: reply.trim().to_string(),
                })
            }
            Err(SessionError::ReadTimeout { timeout_ms }) => {
                tracing::warn!("No handshake reply within {}ms", timeout_ms);
                self.close();
                Err(SessionError::HandshakeTimeout { timeout_ms })
            }
            Err(e) => {
                self.close();
                Err(e)
            }
        }
    }

    /// Relay device lines until the operator exits
    ///
    /// Read failures are reported and retried after a short pause. The
    /// session is closed when this returns, whatever the outcome.
    pub fn run(&mut self, console: &mut dyn OperatorConsole) -> Result<SessionEnd, SessionError> {
        self.expect_state(SessionState::Ready)?;
        let result = self.relay(console);
        self.close();
        result
    }

    fn relay(&mut self, console: &mut dyn OperatorConsole) -> Result<SessionEnd, SessionError> {
        loop {
            let line = match self.read_line(None) {
                Ok(line) => line,
                Err(SessionError::Cancelled) => return Err(SessionError::Cancelled),
                Err(e) => {
                    self.transient_failure(&e);
                    continue;
                }
            };

            if line.is_empty() {
                continue;
            }
            if !protocol::is_ready_sentinel(&line) {
                console.device_line(&line);
                continue;
            }

            self.state = SessionState::AwaitingDeviceReady;
            let Some(input) = console.prompt() else {
                tracing::info!("Operator input closed");
                return Ok(SessionEnd::InputClosed);
            };
            if protocol::is_exit(&input) {
                return Ok(SessionEnd::OperatorExit);
            }

            if let Err(e) = self.send(&input) {
                console.warn(&format!("Failed to send: {e}"));
                self.state = SessionState::Ready;
                continue;
            }
            match self.read_line(None) {
                Ok(reply) if reply.is_empty() => console.warn("ESP32 did not reply after command."),
                Ok(reply) if protocol::is_ready_sentinel(&reply) => {}
                Ok(reply) => console.device_line(&reply),
                Err(SessionError::Cancelled) => return Err(SessionError::Cancelled),
                Err(e) => self.transient_failure(&e),
            }
            self.state = SessionState::Ready;
        }
    }

    fn transient_failure(&self, error: &SessionError) {
        tracing::warn!("Read failed, retrying: {}", error);
        std::thread::sleep(self.config.transient_pause);
    }

    /// Write `line` plus one newline and flush
    pub fn send(&mut self, line: &str) -> Result<(), SessionError> {
        let channel = self.channel_mut()?;
        let bytes = protocol::encode_line(line);
        channel
            .write_all(&bytes)
            .and_then(|()| channel.flush())
            .map_err(|e| SessionError::SendFailed {
                reason: e.to_string(),
            })?;
        tracing::trace!("Sent {:?}", line);
        Ok(())
    }

    /// Read one line, without `\r` and surrounding whitespace
    ///
    /// Polls for available bytes, sleeping between checks. With no
    /// `timeout` the call blocks until a line arrives or the session is
    /// cancelled.
    pub fn read_line(&mut self, timeout: Option<Duration>) -> Result<String, SessionError> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let poll_interval = self.config.poll_interval;

        loop {
            if let Some(line) = self.take_buffered_line() {
                return Ok(line);
            }
            if self.cancel.is_cancelled() {
                return Err(SessionError::Cancelled);
            }
            if let (Some(deadline), Some(timeout)) = (deadline, timeout) {
                if Instant::now() >= deadline {
                    return Err(SessionError::ReadTimeout {
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
            }

            let channel = self.channel_mut()?;
            let available = channel.bytes_available().map_err(|e| SessionError::ReadFailed {
                reason: e.to_string(),
            })?;
            if available == 0 {
                std::thread::sleep(poll_interval);
                continue;
            }

            let mut chunk = vec![0u8; available];
            let read = channel.read(&mut chunk).map_err(|e| SessionError::ReadFailed {
                reason: e.to_string(),
            })?;
            if read == 0 {
                return Err(SessionError::StreamClosed);
            }
            self.buffer.extend_from_slice(&chunk[..read]);
        }
    }

    fn take_buffered_line(&mut self) -> Option<String> {
        let newline = self.buffer.iter().position(|b| *b == protocol::LINE_END)?;
        let raw: Vec<u8> = self.buffer.drain(..=newline).collect();
        let text: String = String::from_utf8_lossy(&raw[..newline])
            .chars()
            .filter(|c| *c != '\r')
            .collect();
        Some(text.trim().to_string())
    }

    /// Release the channel; closing twice is a no-op
    pub fn close(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            let _ = channel.flush();
            let _ = channel.close();
            tracing::info!("Port {} closed", channel.name());
        }
        self.buffer.clear();
        if self.state.is_open() {
            self.state = SessionState::Closed;
        }
    }

    fn channel_mut(&mut self) -> Result<&mut Box<dyn SerialChannel>, SessionError> {
        let state = self.state;
        self.channel
            .as_mut()
            .ok_or_else(|| SessionError::InvalidState {
                expected: "open channel".to_string(),
                actual: state.to_string(),
            })
    }

    fn expect_state(&self, expected: SessionState) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                expected: expected.to_string(),
                actual: self.state.to_string(),
            })
        }
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Settle, connect, handshake and run the interactive loop
///
/// Handshake failure ends the session without entering the loop.
pub fn start_session(
    config: SessionConfig,
    configured_port: Option<&str>,
    console: &mut dyn OperatorConsole,
) -> juno_core::Result<SessionEnd> {
    std::thread::sleep(config.settle_delay);
    let mut session = DeviceSession::new(config);
    session.connect_detected(configured_port, &PortDetector::new())?;
    session.handshake()?;
    Ok(session.run(console)?)
}
