//! Sidecar Renderer Process
//!
//! Server-side SVG rendering is delegated to an external program. The
//! runner writes one JSON [`SidecarRequest`] to the child's stdin and reads
//! the SVG document from its stdout. A child that outlives the timeout gets
//! SIGTERM, a short grace period, then SIGKILL.
//!
//! The timeout covers the whole exchange. Pipes are drained on helper
//! threads that the runner waits for only until the same deadline, so a
//! descendant that inherits the pipes cannot hold a render open.

use serde::Serialize;
use serde_json::Value;
use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(5);
const TERM_GRACE: Duration = Duration::from_millis(50);

/// Failure of the external renderer
#[derive(Debug, Error)]
pub enum SidecarError {
    /// The process could not be started
    #[error("failed to spawn renderer {program}: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying spawn error
        #[source]
        source: io::Error,
    },

    /// Talking to the process over its pipes failed
    #[error("renderer I/O error: {0}")]
    Io(#[from] io::Error),

    /// The process outlived the configured timeout
    #[error("renderer timed out after {after_ms} ms")]
    Timeout {
        /// Configured timeout in milliseconds
        after_ms: u64,
    },

    /// The process exited unsuccessfully
    #[error("renderer exited with status {code:?}: {stderr}")]
    Failed {
        /// Exit code, absent when killed by a signal
        code: Option<i32>,
        /// Everything the process wrote to stderr
        stderr: String,
    },

    /// Stdout did not hold an SVG document
    #[error("renderer produced no SVG document: {0}")]
    InvalidOutput(String),

    /// The request could not be encoded
    #[error("failed to encode render request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// How to launch the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct SidecarConfig {
    /// Executable to run
    pub program: String,
    /// Arguments passed before the request is written
    pub args: Vec<String>,
    /// Longest time a render may take
    pub timeout: Duration,
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
}

impl SidecarConfig {
    /// Run `program` with default timeout and canvas size
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(60),
            width: 1280,
            height: 720,
        }
    }

    /// Append command-line arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Override the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Document sent to the renderer on stdin
#[derive(Debug, Clone, Serialize)]
pub struct SidecarRequest {
    /// Chart option document
    pub option: Value,
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
}

/// Send SIGTERM to a process
#[cfg(unix)]
fn send_sigterm(pid: u32) -> Result<(), io::Error> {
    // SAFETY: kill(2) only delivers a signal; pid is our own unreaped child.
    let ret = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Child process that is terminated when dropped
struct ChildGuard {
    child: Child,
}

impl ChildGuard {
    fn is_alive(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    fn terminate(&mut self) {
        if !self.is_alive() {
            return;
        }
        #[cfg(unix)]
        {
            let _ = send_sigterm(self.child.id());
            let deadline = Instant::now() + TERM_GRACE;
            while self.is_alive() && Instant::now() < deadline {
                thread::sleep(POLL_INTERVAL);
            }
        }
        if self.is_alive() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }

    fn wait_until(&mut self, deadline: Instant) -> Result<Option<ExitStatus>, io::Error> {
        loop {
            if let Some(status) = self.child.try_wait()? {
                return Ok(Some(status));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.terminate();
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<io::Result<Vec<u8>>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = pipe.read_to_end(&mut buf).map(|_| buf);
        let _ = tx.send(result);
    });
    rx
}

/// Wait for a helper thread's result until `deadline`; `None` on timeout
fn collect<T>(rx: &Receiver<T>, deadline: Instant, pipe: &str) -> Result<Option<T>, io::Error> {
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(value) => Ok(Some(value)),
        Err(RecvTimeoutError::Timeout) => Ok(None),
        Err(RecvTimeoutError::Disconnected) => Err(io::Error::other(format!("{pipe} thread panicked"))),
    }
}

/// Runs one renderer process per request
#[derive(Debug, Clone)]
pub struct SidecarRunner {
    config: SidecarConfig,
}

impl SidecarRunner {
    /// Runner for `config`
    pub fn new(config: SidecarConfig) -> Self {
        Self { config }
    }

    /// Launch settings
    pub fn config(&self) -> &SidecarConfig {
        &self.config
    }

    /// Render `request` and return the SVG document
    pub fn render(&self, request: &SidecarRequest) -> Result<String, SidecarError> {
        let body = serde_json::to_vec(request)?;

        let child = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SidecarError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;
        let mut guard = ChildGuard { child };
        tracing::debug!(program = %self.config.program, pid = guard.child.id(), "renderer spawned");

        let mut stdin = guard
            .child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("renderer stdin not captured"))?;
        let stdout = guard
            .child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("renderer stdout not captured"))?;
        let stderr = guard
            .child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("renderer stderr not captured"))?;

        // Dropping stdin at the end of the writer closes the pipe
        let (written_tx, written) = mpsc::channel();
        thread::spawn(move || {
            let _ = written_tx.send(stdin.write_all(&body));
        });
        let stdout = drain(stdout);
        let stderr = drain(stderr);

        let deadline = Instant::now() + self.config.timeout;
        let timed_out = || {
            tracing::warn!(program = %self.config.program, "renderer timed out");
            SidecarError::Timeout {
                after_ms: self.config.timeout.as_millis() as u64,
            }
        };
        let Some(status) = guard.wait_until(deadline)? else {
            guard.terminate();
            return Err(timed_out());
        };

        match collect(&written, deadline, "stdin")? {
            // The renderer may exit without consuming its input
            Some(Err(e)) => tracing::debug!(error = %e, "renderer closed stdin early"),
            Some(Ok(())) => {}
            None => tracing::debug!("stdin still open after the renderer exited"),
        }
        let stdout = collect(&stdout, deadline, "stdout")?.ok_or_else(timed_out)??;
        let stderr = collect(&stderr, deadline, "stderr")?.ok_or_else(timed_out)??;

        if !status.success() {
            return Err(SidecarError::Failed {
                code: status.code(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        let svg = String::from_utf8(stdout)
            .map_err(|_| SidecarError::InvalidOutput("output is not UTF-8".to_string()))?;
        if !svg.contains("<svg") {
            let preview: String = svg.chars().take(80).collect();
            return Err(SidecarError::InvalidOutput(preview));
        }
        Ok(svg)
    }
}
