//! Session lifecycle states

use std::fmt;

/// Where a [`DeviceSession`](super::DeviceSession) is in its lifecycle
///
/// `Disconnected → Connected → Handshaking → Ready → {AwaitingDeviceReady ⇄ Ready} → Closed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No channel open
    #[default]
    Disconnected,
    /// Channel open, handshake not yet attempted
    Connected,
    /// `flash` sent, waiting for `thunder`
    Handshaking,
    /// Handshake accepted, relaying device lines
    Ready,
    /// Device sent `juno_read`, waiting on operator input
    AwaitingDeviceReady,
    /// Channel released
    Closed,
}

impl SessionState {
    /// Check if the session holds an open channel
    pub fn is_open(self) -> bool {
        matches!(
            self,
            Self::Connected | Self::Handshaking | Self::Ready | Self::AwaitingDeviceReady
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "Disconnected",
            Self::Connected => "Connected",
            Self::Handshaking => "Handshaking",
            Self::Ready => "Ready",
            Self::AwaitingDeviceReady => "AwaitingDeviceReady",
            Self::Closed => "Closed",
        };
        f.write_str(name)
    }
}
