//! Serial session parameters

use std::time::Duration;

/// Timing and line settings for a device session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Baud rate
    pub baud_rate: u32,
    /// Port read/write timeout and handshake read deadline
    pub timeout: Duration,
    /// Sleep between availability checks while waiting for bytes
    pub poll_interval: Duration,
    /// Pause after a failed read in the interactive loop
    pub transient_pause: Duration,
    /// Delay before opening the port, letting the board reboot after flashing
    pub settle_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            baud_rate: 115_200,
            timeout: Duration::from_millis(500),
            poll_interval: Duration::from_millis(10),
            transient_pause: Duration::from_millis(100),
            settle_delay: Duration::from_millis(500),
        }
    }
}

impl SessionConfig {
    /// Set the baud rate
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the port and handshake timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set every delay to `interval`, for fast tests
    pub fn with_intervals(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self.transient_pause = interval;
        self.settle_delay = interval;
        self
    }
}
