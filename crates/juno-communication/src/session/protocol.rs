//! Device wire protocol tokens
//!
//! Plain ASCII lines terminated by `\n`. Replies are compared
//! case-insensitively after trimming.

/// Sent by the host to open the handshake
pub const FLASH: &str = "flash";

/// Expected handshake reply from the firmware
pub const THUNDER: &str = "thunder";

/// Sent by the firmware when it is ready for operator input
pub const JUNO_READ: &str = "juno_read";

/// Operator input that ends the session
pub const EXIT: &str = "exit";

/// Line terminator appended to every send
pub const LINE_END: u8 = b'\n';

/// Check if a handshake reply accepts the connection
pub fn is_handshake_reply(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(THUNDER)
}

/// Check if a device line is the ready-for-input sentinel
pub fn is_ready_sentinel(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(JUNO_READ)
}

/// Check if operator input asks to leave the session
pub fn is_exit(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(EXIT)
}

/// Encode one outgoing line
pub fn encode_line(line: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(line.len() + 1);
    bytes.extend_from_slice(line.as_bytes());
    bytes.push(LINE_END);
    bytes
}
