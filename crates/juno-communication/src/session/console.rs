//! Operator-facing side of the interactive loop

use std::io::{self, BufRead, Write};

/// Prompt shown when the device asks for input
pub const PROMPT: &str = ">> ";

/// Prefix for lines relayed from the device
pub const DEVICE_PREFIX: &str = "esp32: ";

/// Operator input and output used by the session loop
pub trait OperatorConsole {
    /// Show a line received from the device
    fn device_line(&mut self, line: &str);

    /// Prompt for one line of input; `None` when input is closed
    fn prompt(&mut self) -> Option<String>;

    /// Show a warning to the operator
    fn warn(&mut self, message: &str);
}

/// Terminal console over stdin and stdout
#[derive(Debug, Default)]
pub struct StdConsole;

impl StdConsole {
    /// Create a new terminal console
    pub fn new() -> Self {
        Self
    }
}

impl OperatorConsole for StdConsole {
    fn device_line(&mut self, line: &str) {
        println!("{DEVICE_PREFIX}{line}");
    }

    fn prompt(&mut self) -> Option<String> {
        print!("{PROMPT}");
        let _ = io::stdout().flush();

        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(0) => None,
            Ok(_) => Some(input.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::warn!("Failed to read operator input: {}", e);
                None
            }
        }
    }

    fn warn(&mut self, message: &str) {
        eprintln!("{message}");
    }
}
