use crate::extract::backend::BackendError;
use std::{
    fs::{self, File},
    io::ErrorKind,
    path::Path,
    process::{Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Check if a program resolves, either as a path or through `PATH`.
pub fn check_binary(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Run `cmd` to completion with stdout/stderr captured under `scratch`.
///
/// With a timeout the whole child is killed once the deadline passes; the
/// call never returns half of a backend's output.
pub fn run_tool(
    backend: &str,
    mut cmd: Command,
    scratch: &Path,
    timeout: Option<Duration>,
) -> Result<(), BackendError> {
    let stdout_path = scratch.join("stdout.log");
    let stderr_path = scratch.join("stderr.log");
    cmd.stdin(Stdio::null())
        .stdout(Stdio::from(File::create(&stdout_path)?))
        .stderr(Stdio::from(File::create(&stderr_path)?));

    debug!(backend, command = ?cmd, "spawning detection backend");
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(BackendError::Unavailable(format!(
                "{} (executable not found)",
                backend
            )))
        }
        Err(e) => return Err(BackendError::Io(e)),
    };

    let status: ExitStatus = match timeout {
        None => child.wait()?,
        Some(limit) => {
            let deadline = Instant::now() + limit;
            loop {
                if let Some(status) = child.try_wait()? {
                    break status;
                }
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(BackendError::TimedOut {
                        backend: backend.to_string(),
                        timeout: limit,
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
        }
    };

    if status.success() {
        Ok(())
    } else {
        let stderr = fs::read_to_string(&stderr_path).unwrap_or_default();
        Err(BackendError::ParseFailure {
            backend: backend.to_string(),
            message: format!("exited with {}: {}", status, last_lines(&stderr, 5)),
        })
    }
}

/// Tracebacks are long; the tail carries the actual exception.
fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(n)..].join(" / ")
}
