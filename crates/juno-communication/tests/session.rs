//! Device session protocol against a scripted in-memory channel

use juno_communication::{
    CancellationToken, DeviceSession, OperatorConsole, SerialChannel, SessionConfig, SessionEnd,
    SessionState,
};
use juno_core::SessionError;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

enum Incoming {
    Bytes(Vec<u8>),
    Error,
}

// Mock channel that replays scripted device output
struct MockChannel {
    incoming: VecDeque<Incoming>,
    sent: Arc<Mutex<Vec<u8>>>,
    closed: Arc<Mutex<bool>>,
    on_drained: Option<CancellationToken>,
}

impl MockChannel {
    fn new(lines: &[&str]) -> Self {
        Self {
            incoming: lines
                .iter()
                .map(|l| Incoming::Bytes(l.as_bytes().to_vec()))
                .collect(),
            sent: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(Mutex::new(false)),
            on_drained: None,
        }
    }

    fn cancel_when_drained(mut self, token: CancellationToken) -> Self {
        self.on_drained = Some(token);
        self
    }

    fn push_error(mut self) -> Self {
        self.incoming.push_back(Incoming::Error);
        self
    }

    fn push(mut self, line: &str) -> Self {
        self.incoming.push_back(Incoming::Bytes(line.as_bytes().to_vec()));
        self
    }
}

impl SerialChannel for MockChannel {
    fn name(&self) -> &str {
        "mock"
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        match self.incoming.front() {
            Some(Incoming::Bytes(bytes)) => Ok(bytes.len()),
            Some(Incoming::Error) => {
                self.incoming.pop_front();
                Err(io::Error::new(io::ErrorKind::Other, "scripted failure"))
            }
            None => match &self.on_drained {
                Some(token) => {
                    token.cancel();
                    Err(io::Error::new(io::ErrorKind::BrokenPipe, "drained"))
                }
                None => Ok(0),
            },
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.incoming.pop_front() {
            Some(Incoming::Bytes(bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    self.incoming.push_front(Incoming::Bytes(bytes[n..].to_vec()));
                }
                Ok(n)
            }
            _ => Ok(0),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.sent.lock().unwrap().extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}

#[derive(Default)]
struct ScriptedConsole {
    inputs: VecDeque<String>,
    lines: Vec<String>,
    warnings: Vec<String>,
    prompts: usize,
}

impl ScriptedConsole {
    fn with_inputs(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl OperatorConsole for ScriptedConsole {
    fn device_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn prompt(&mut self) -> Option<String> {
        self.prompts += 1;
        self.inputs.pop_front()
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}

fn fast_config() -> SessionConfig {
    SessionConfig::default()
        .with_timeout(Duration::from_millis(30))
        .with_intervals(Duration::from_millis(1))
}

fn sent_text(sent: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8(sent.lock().unwrap().clone()).unwrap()
}

#[test]
fn test_handshake_reaches_ready() {
    let mut session = DeviceSession::new(fast_config());
    let mock = MockChannel::new(&["thunder\n"]);
    let sent = mock.sent.clone();
    session.attach(Box::new(mock));
    assert_eq!(session.state(), SessionState::Connected);

    session.handshake().unwrap();

    assert_eq!(session.state(), SessionState::Ready);
    assert_eq!(sent_text(&sent), "flash\n");
}

#[test]
fn test_handshake_tolerates_case_and_fragments() {
    let mut session = DeviceSession::new(fast_config());
    session.attach(Box::new(MockChannel::new(&["THUN", "der\r\n"])));

    session.handshake().unwrap();
    assert_eq!(session.state(), SessionState::Ready);
}

#[test]
fn test_wrong_reply_fails_and_closes() {
    let mut session = DeviceSession::new(fast_config());
    let mock = MockChannel::new(&["nope\n"]);
    let closed = mock.closed.clone();
    session.attach(Box::new(mock));

    let err = session.handshake().unwrap_err();

    assert_eq!(
        err,
        SessionError::HandshakeFailed {
            reply: "nope".to_string()
        }
    );
    assert_eq!(session.state(), SessionState::Closed);
    assert!(*closed.lock().unwrap());

    let mut console = ScriptedConsole::default();
    assert!(session.run(&mut console).is_err());
    assert_eq!(console.prompts, 0);
}

#[test]
fn test_silent_device_times_out() {
    let mut session = DeviceSession::new(fast_config());
    session.attach(Box::new(MockChannel::new(&[])));

    let err = session.handshake().unwrap_err();

    assert_eq!(err, SessionError::HandshakeTimeout { timeout_ms: 30 });
    assert_eq!(session.state(), SessionState::Closed);
}

#[test]
fn test_exit_closes_without_sending() {
    let mut session = DeviceSession::new(fast_config());
    let mock = MockChannel::new(&["thunder\n", "juno_read\n"]);
    let sent = mock.sent.clone();
    let closed = mock.closed.clone();
    session.attach(Box::new(mock));
    session.handshake().unwrap();

    let mut console = ScriptedConsole::with_inputs(&["exit"]);
    let end = session.run(&mut console).unwrap();

    assert_eq!(end, SessionEnd::OperatorExit);
    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(sent_text(&sent), "flash\n");
    assert!(*closed.lock().unwrap());
}

#[test]
fn test_command_round_trip() {
    let mut session = DeviceSession::new(fast_config());
    let token = session.cancellation_token();
    let mock = MockChannel::new(&["thunder\n", "booted\n", "\n", "juno_read\n", "pong\n"])
        .cancel_when_drained(token);
    let sent = mock.sent.clone();
    session.attach(Box::new(mock));
    session.handshake().unwrap();

    let mut console = ScriptedConsole::with_inputs(&["ping"]);
    let result = session.run(&mut console);

    assert_eq!(result, Err(SessionError::Cancelled));
    assert_eq!(console.lines, vec!["booted", "pong"]);
    assert_eq!(console.prompts, 1);
    assert_eq!(sent_text(&sent), "flash\nping\n");
    assert_eq!(session.state(), SessionState::Closed);
}

#[test]
fn test_sentinel_reply_is_suppressed() {
    let mut session = DeviceSession::new(fast_config());
    let token = session.cancellation_token();
    let mock = MockChannel::new(&["thunder\n", "juno_read\n", "JUNO_READ\n"])
        .cancel_when_drained(token);
    session.attach(Box::new(mock));
    session.handshake().unwrap();

    let mut console = ScriptedConsole::with_inputs(&["led on"]);
    let _ = session.run(&mut console);

    assert!(console.lines.is_empty());
    assert!(console.warnings.is_empty());
}

#[test]
fn test_blank_reply_warns() {
    let mut session = DeviceSession::new(fast_config());
    let token = session.cancellation_token();
    let mock = MockChannel::new(&["thunder\n", "juno_read\n", "\r\n"]).cancel_when_drained(token);
    session.attach(Box::new(mock));
    session.handshake().unwrap();

    let mut console = ScriptedConsole::with_inputs(&["status"]);
    let _ = session.run(&mut console);

    assert_eq!(console.warnings.len(), 1);
    assert!(console.warnings[0].contains("did not reply"));
}

#[test]
fn test_read_error_does_not_end_loop() {
    let mut session = DeviceSession::new(fast_config());
    let token = session.cancellation_token();
    let mock = MockChannel::new(&["thunder\n"])
        .push_error()
        .push("still here\n")
        .cancel_when_drained(token);
    session.attach(Box::new(mock));
    session.handshake().unwrap();

    let mut console = ScriptedConsole::default();
    let _ = session.run(&mut console);

    assert_eq!(console.lines, vec!["still here"]);
}

#[test]
fn test_closed_input_ends_session() {
    let mut session = DeviceSession::new(fast_config());
    session.attach(Box::new(MockChannel::new(&["thunder\n", "juno_read\n"])));
    session.handshake().unwrap();

    let mut console = ScriptedConsole::default();
    assert_eq!(session.run(&mut console), Ok(SessionEnd::InputClosed));
    assert_eq!(session.state(), SessionState::Closed);
}

#[test]
fn test_bounded_read_times_out() {
    let mut session = DeviceSession::new(fast_config());
    session.attach(Box::new(MockChannel::new(&[])));

    let err = session.read_line(Some(Duration::from_millis(5))).unwrap_err();
    assert!(matches!(err, SessionError::ReadTimeout { timeout_ms: 5 }));
}

#[test]
fn test_close_is_idempotent() {
    let mut session = DeviceSession::new(fast_config());
    session.attach(Box::new(MockChannel::new(&[])));

    session.close();
    session.close();

    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(session.port_name(), None);
}

#[test]
fn test_send_requires_open_channel() {
    let mut session = DeviceSession::new(fast_config());
    let err = session.send("flash").unwrap_err();
    assert!(matches!(err, SessionError::InvalidState { .. }));
}

#[test]
fn test_failed_open_stays_disconnected() {
    let mut session = DeviceSession::new(fast_config());
    assert!(session.connect("/dev/juno-port-that-does-not-exist").is_err());
    assert_eq!(session.state(), SessionState::Disconnected);
}
