//! # Process Runner
//!
//! Runs one shell command at a time and reports what happens to it.
//!
//! ## Architecture
//!
//! - The command line is executed with `sh -c` inside the store directory
//! - Two reader threads copy stdout and stderr into shared buffers and send a
//!   [`ProcessEvent::ReadyRead`] notification for every chunk
//! - A waiter thread joins the readers, waits for the child and sends
//!   [`ProcessEvent::Finished`]
//! - The main event loop drains events with [`ProcessRunner::poll_events`]
//!   and pulls buffered output with [`ProcessRunner::read_all_standard_error`]
//!   and [`ProcessRunner::read_all_standard_output`]
//!
//! Only one session is tracked. Starting a new one drops the previous
//! session's buffers and channel; the caller is expected not to start while
//! [`ProcessRunner::is_running`] is true.

use super::command::{command_line, SHELL};
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Ways a process can fail, with the text shown to the user.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProcessError {
    #[error("The process failed to start. Check the configured executable paths.")]
    FailedToStart,
    #[error("The process crashed.")]
    Crashed,
    #[error("The process timed out.")]
    Timedout,
    #[error("An error occurred while reading the process output.")]
    ReadError,
    #[error("An error occurred while writing to the process.")]
    WriteError,
    #[error("An unknown process error occurred.")]
    UnknownError,
}

/// How a finished process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    Normal,
    /// Killed by a signal; there is no exit code.
    Crash,
}

/// Something that happened to the running process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    /// New output is buffered on stdout and/or stderr.
    ReadyRead,
    /// The process failed; no further output is expected from this failure.
    Error(ProcessError),
    /// The process has exited and all of its output has been buffered.
    Finished { code: i32, kind: ExitKind },
}

impl ProcessEvent {
    /// Whether a `Finished` event describes a failed run.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ProcessEvent::Finished { code, kind } if *kind != ExitKind::Normal || *code != 0
        )
    }
}

/// Output buffered since it was last read.
type SharedBuffer = Arc<Mutex<Vec<u8>>>;

struct Session {
    events: Receiver<ProcessEvent>,
    stdout: SharedBuffer,
    stderr: SharedBuffer,
    started_at: Instant,
    running: bool,
}

/// A handle around at most one external process.
#[derive(Default)]
pub struct ProcessRunner {
    session: Option<Session>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launch `sh -c "<program> <args>"` with `working_dir` as the current
    /// directory.
    ///
    /// Launch failures are returned rather than delivered as an event.
    pub fn start(
        &mut self,
        program: &str,
        args: &str,
        working_dir: &Path,
    ) -> Result<(), ProcessError> {
        let line = command_line(program, args);
        debug!("launching `{} -c` in {}", SHELL, working_dir.display());

        let mut child = Command::new(SHELL)
            .arg("-c")
            .arg(&line)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                warn!("failed to start {}: {}", program, e);
                ProcessError::FailedToStart
            })?;

        let (tx, rx) = mpsc::channel();
        let stdout = Arc::new(Mutex::new(Vec::new()));
        let stderr = Arc::new(Mutex::new(Vec::new()));

        let mut readers = Vec::with_capacity(2);
        if let Some(out) = child.stdout.take() {
            readers.push(spawn_reader(out, Arc::clone(&stdout), tx.clone()));
        }
        if let Some(err) = child.stderr.take() {
            readers.push(spawn_reader(err, Arc::clone(&stderr), tx.clone()));
        }
        spawn_waiter(child, readers, tx);

        info!("started {}", program);
        self.session = Some(Session {
            events: rx,
            stdout,
            stderr,
            started_at: Instant::now(),
            running: true,
        });
        Ok(())
    }

    /// Whether a launched process has not reported `Finished` yet.
    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.running)
    }

    /// When the current session was started.
    pub fn started_at(&self) -> Option<Instant> {
        self.session.as_ref().map(|s| s.started_at)
    }

    /// Drain every event delivered since the last poll, in order.
    pub fn poll_events(&mut self) -> Vec<ProcessEvent> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };

        let mut events = Vec::new();
        loop {
            match session.events.try_recv() {
                Ok(event) => {
                    if matches!(event, ProcessEvent::Finished { .. }) {
                        session.running = false;
                    }
                    events.push(event);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if session.running {
                        session.running = false;
                        events.push(ProcessEvent::Error(ProcessError::UnknownError));
                    }
                    break;
                }
            }
        }
        events
    }

    /// Take everything buffered on stdout.
    pub fn read_all_standard_output(&self) -> String {
        self.session
            .as_ref()
            .map(|s| take_buffer(&s.stdout))
            .unwrap_or_default()
    }

    /// Take everything buffered on stderr.
    pub fn read_all_standard_error(&self) -> String {
        self.session
            .as_ref()
            .map(|s| take_buffer(&s.stderr))
            .unwrap_or_default()
    }
}

fn take_buffer(buffer: &SharedBuffer) -> String {
    match buffer.lock() {
        Ok(mut bytes) => {
            let taken = std::mem::take(&mut *bytes);
            String::from_utf8_lossy(&taken).into_owned()
        }
        Err(_) => String::new(),
    }
}

fn spawn_reader<R: Read + Send + 'static>(
    mut pipe: R,
    buffer: SharedBuffer,
    events: Sender<ProcessEvent>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            match pipe.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if let Ok(mut b) = buffer.lock() {
                        b.extend_from_slice(&buf[..n]);
                    }
                    if events.send(ProcessEvent::ReadyRead).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("failed to read process output: {}", e);
                    let _ = events.send(ProcessEvent::Error(ProcessError::ReadError));
                    break;
                }
            }
        }
    })
}

fn spawn_waiter(mut child: Child, readers: Vec<JoinHandle<()>>, events: Sender<ProcessEvent>) {
    std::thread::spawn(move || {
        // Drain both pipes before reporting the exit so no output trails it.
        for reader in readers {
            let _ = reader.join();
        }

        match child.wait() {
            Ok(status) => {
                let finished = match status.code() {
                    Some(code) => ProcessEvent::Finished {
                        code,
                        kind: ExitKind::Normal,
                    },
                    None => {
                        let _ = events.send(ProcessEvent::Error(ProcessError::Crashed));
                        ProcessEvent::Finished {
                            code: -1,
                            kind: ExitKind::Crash,
                        }
                    }
                };
                info!("process exited: {}", status);
                let _ = events.send(finished);
            }
            Err(e) => {
                warn!("failed to wait for process: {}", e);
                let _ = events.send(ProcessEvent::Error(ProcessError::UnknownError));
                let _ = events.send(ProcessEvent::Finished {
                    code: -1,
                    kind: ExitKind::Crash,
                });
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Poll until the runner reports `Finished`, collecting every event.
    fn run_to_completion(runner: &mut ProcessRunner) -> Vec<ProcessEvent> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut events = Vec::new();
        while Instant::now() < deadline {
            let batch = runner.poll_events();
            let done = batch
                .iter()
                .any(|e| matches!(e, ProcessEvent::Finished { .. }));
            events.extend(batch);
            if done {
                return events;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("process did not finish in time: {:?}", events);
    }

    #[test]
    fn test_runs_command_and_collects_stdout() {
        let dir = TempDir::new().expect("create temp dir");
        let mut runner = ProcessRunner::new();

        runner
            .start("printf", "'first\\nsecond\\n'", dir.path())
            .expect("start");
        assert!(runner.is_running());

        let events = run_to_completion(&mut runner);
        assert!(!runner.is_running());
        assert!(events.contains(&ProcessEvent::ReadyRead));
        assert_eq!(
            events.last(),
            Some(&ProcessEvent::Finished {
                code: 0,
                kind: ExitKind::Normal
            })
        );
        assert_eq!(runner.read_all_standard_output(), "first\nsecond\n");
        assert_eq!(runner.read_all_standard_error(), "");
        // Buffers are drained by reading.
        assert_eq!(runner.read_all_standard_output(), "");
    }

    #[test]
    fn test_collects_stderr_and_exit_code() {
        let dir = TempDir::new().expect("create temp dir");
        let mut runner = ProcessRunner::new();

        runner
            .start("echo", "oops 1>&2; exit 3", dir.path())
            .expect("start");
        let events = run_to_completion(&mut runner);

        let finished = events.last().expect("finished event");
        assert!(finished.is_failure());
        assert_eq!(
            finished,
            &ProcessEvent::Finished {
                code: 3,
                kind: ExitKind::Normal
            }
        );
        assert_eq!(runner.read_all_standard_error(), "oops\n");
    }

    #[test]
    fn test_runs_in_working_directory() {
        let dir = TempDir::new().expect("create temp dir");
        std::fs::write(dir.path().join("marker.gpg"), "x").expect("write");
        let mut runner = ProcessRunner::new();

        runner.start("ls", "", dir.path()).expect("start");
        run_to_completion(&mut runner);
        assert_eq!(runner.read_all_standard_output(), "marker.gpg\n");
    }

    #[test]
    fn test_missing_working_directory_fails_to_start() {
        let mut runner = ProcessRunner::new();
        let result = runner.start("true", "", Path::new("/nonexistent/store/dir"));
        assert_eq!(result, Err(ProcessError::FailedToStart));
        assert!(!runner.is_running());
    }

    #[test]
    fn test_crash_is_reported() {
        let dir = TempDir::new().expect("create temp dir");
        let mut runner = ProcessRunner::new();

        runner.start("kill", "-9 $$", dir.path()).expect("start");
        let events = run_to_completion(&mut runner);

        assert!(events.contains(&ProcessEvent::Error(ProcessError::Crashed)));
        assert!(events.last().is_some_and(ProcessEvent::is_failure));
    }

    #[test]
    fn test_poll_without_session_is_empty() {
        let mut runner = ProcessRunner::new();
        assert!(runner.poll_events().is_empty());
        assert_eq!(runner.read_all_standard_output(), "");
        assert!(runner.started_at().is_none());
    }

    #[test]
    fn test_error_messages_are_distinct() {
        let all = [
            ProcessError::FailedToStart,
            ProcessError::Crashed,
            ProcessError::Timedout,
            ProcessError::ReadError,
            ProcessError::WriteError,
            ProcessError::UnknownError,
        ];
        let messages: std::collections::HashSet<String> =
            all.iter().map(ToString::to_string).collect();
        assert_eq!(messages.len(), all.len());
    }
}
