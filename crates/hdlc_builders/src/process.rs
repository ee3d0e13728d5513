//! Subprocess invocation with a polling bounded wait.
//!
//! Every adapter spawns a fresh child process and consumes its stdout/stderr
//! to completion; stdin is never used. There is no `wait-timeout` or async
//! runtime dependency here — [`run_with_timeout`] polls [`Child::try_wait`]
//! with a short sleep backoff, which is all a 60-second default timeout
//! needs.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

/// The captured result of a subprocess run that completed before its
/// timeout elapsed.
pub struct CapturedOutput {
    /// The process's exit status.
    pub status: ExitStatus,
    /// Everything written to stdout, lossily decoded as UTF-8.
    pub stdout: String,
    /// Everything written to stderr, lossily decoded as UTF-8.
    pub stderr: String,
}

/// Failure modes of [`run_with_timeout`].
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The child process could not be spawned at all (tool not on `PATH`,
    /// permission denied, etc).
    #[error("failed to spawn process: {0}")]
    Spawn(#[source] std::io::Error),
    /// Waiting on the child process failed at the OS level (distinct from
    /// the child simply taking too long).
    #[error("failed to wait on process: {0}")]
    Wait(#[source] std::io::Error),
    /// The child did not exit within the allotted timeout and was killed.
    /// Whatever it had already written to stdout/stderr is still returned,
    /// since partial output can still carry diagnostics worth keeping.
    #[error("process timed out")]
    TimedOut {
        /// stdout captured before the kill.
        stdout: String,
        /// stderr captured before the kill.
        stderr: String,
    },
}

/// Spawns `cmd`, reading stdout/stderr on background threads so a full pipe
/// buffer can never deadlock the poll loop, and waits up to `timeout` before
/// killing the child and reporting [`RunError::TimedOut`].
pub fn run_with_timeout(mut cmd: Command, timeout: Duration) -> Result<CapturedOutput, RunError> {
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child: Child = cmd.spawn().map_err(RunError::Spawn)?;
    let mut stdout_pipe = child.stdout.take().expect("stdout was piped");
    let mut stderr_pipe = child.stderr.take().expect("stderr was piped");

    let stdout_reader = std::thread::spawn(move || {
        let mut buf = String::new();
        let _ = stdout_pipe.read_to_string(&mut buf);
        buf
    });
    let stderr_reader = std::thread::spawn(move || {
        let mut buf = String::new();
        let _ = stderr_pipe.read_to_string(&mut buf);
        buf
    });

    let start = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait().map_err(RunError::Wait)? {
            break Some(status);
        }
        if start.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            break None;
        }
        std::thread::sleep(Duration::from_millis(25));
    };

    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    match status {
        Some(status) => Ok(CapturedOutput { status, stdout, stderr }),
        None => Err(RunError::TimedOut { stdout, stderr }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_of_a_quick_process() {
        let mut cmd = Command::new("echo");
        cmd.arg("hello");
        let out = run_with_timeout(cmd, Duration::from_secs(5)).unwrap();
        assert!(out.status.success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn times_out_a_slow_process() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let err = run_with_timeout(cmd, Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, RunError::TimedOut { .. }));
    }

    #[test]
    fn reports_spawn_failure_for_missing_binary() {
        let cmd = Command::new("hdlc-this-binary-does-not-exist");
        let err = run_with_timeout(cmd, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, RunError::Spawn(_)));
    }
}
