//! Script execution

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};

use super::PipelineError;

/// Exit status of a build script run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Process exit code, `None` when killed by a signal
    pub exit_code: Option<i32>,
    /// Number of output lines streamed to the operator
    pub lines: usize,
}

impl BuildOutcome {
    /// Check if the script exited with status 0
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs an emitted script
pub trait BuildRunner {
    /// Execute `script` with `dir` as working directory, streaming its output
    fn run(&self, script: &Path, dir: &Path) -> Result<BuildOutcome, PipelineError>;
}

/// Runs scripts through `bash` or `cmd.exe /c`
#[derive(Debug, Clone, Copy)]
pub struct ShellRunner {
    windows: bool,
}

impl ShellRunner {
    /// Runner for the given platform
    pub fn new(windows: bool) -> Self {
        Self { windows }
    }

    fn command(&self, script: &Path) -> Command {
        if self.windows {
            let mut cmd = Command::new("cmd.exe");
            cmd.arg("/c").arg(script);
            cmd
        } else {
            let mut cmd = Command::new("bash");
            cmd.arg(script);
            cmd
        }
    }
}

fn forward<R: Read>(reader: R, mut emit: impl FnMut(&str)) -> usize {
    BufReader::new(reader)
        .lines()
        .map_while(Result::ok)
        .inspect(|line| emit(line))
        .count()
}

impl BuildRunner for ShellRunner {
    fn run(&self, script: &Path, dir: &Path) -> Result<BuildOutcome, PipelineError> {
        if !script.is_file() {
            return Err(PipelineError::ScriptNotFound(script.to_path_buf()));
        }

        let mut cmd = self.command(script);
        let program = cmd.get_program().to_string_lossy().into_owned();
        tracing::info!("Running {}", script.display());

        let mut child = cmd
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| PipelineError::Spawn { program, source })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let lines = std::thread::scope(|scope| {
            let errors = scope.spawn(move || {
                stderr.map_or(0, |err| forward(err, |line| eprintln!("{line}")))
            });
            let out = stdout.map_or(0, |out| forward(out, |line| println!("{line}")));
            out + errors.join().unwrap_or(0)
        });

        let status = child.wait()?;
        let outcome = BuildOutcome {
            exit_code: status.code(),
            lines,
        };
        if outcome.success() {
            tracing::info!("Script finished successfully");
        } else {
            tracing::error!("Script failed with exit code {:?}", outcome.exit_code);
        }
        Ok(outcome)
    }
}
