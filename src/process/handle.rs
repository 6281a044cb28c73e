//! # ProcessHandle: one recorder process and its event stream.
//!
//! [`ProcessHandle::start`] spawns the recorder asynchronously and returns
//! immediately with a live handle plus a bounded receiver of
//! [`ProcessEvent`]s. A single monitor task owns the child, reads its stderr
//! line by line, and forwards everything in emission order.
//!
//! ## Event flow
//! ```text
//! ProcessHandle::start(cmd)
//!       │
//!       ├─ spawn ok ──► monitor task
//!       │                 ├─► StderrLine(line)          (every line)
//!       │                 ├─► Progress(snapshot)        (lines that parse)
//!       │                 └─► End | Error(message)      (exactly one, last)
//!       │
//!       └─ spawn err ──► Error(launch message)          (terminal)
//! ```
//!
//! ## Stop semantics
//! - [`request_quit`](ProcessHandle::request_quit) writes `q` to the child's
//!   stdin: the recorder winds down and flushes output cleanly. Best-effort
//!   and asynchronous; the terminal event may arrive seconds later.
//! - [`request_interrupt`](ProcessHandle::request_interrupt) writes ETX
//!   (`\x03`), the stronger interrupt token, after the quit token.
//! - [`kill_after`](ProcessHandle::kill_after) schedules an OS-level kill
//!   once the grace window elapses. The timer is cancelled if the process
//!   exits first, so an already-exited process never receives a kill.
//!
//! ## Rules
//! - Events are delivered in emission order; nothing follows the terminal one.
//! - The monitor blocks on a full channel: backpressure stays per-process.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::error::RecorderError;

use super::command::RecorderCommand;
use super::progress::Progress;

/// Graceful wind-down token written to the recorder's stdin.
const QUIT_TOKEN: &[u8] = b"q";

/// Stronger interrupt token (ETX, the SIGINT-equivalent character).
const INTERRUPT_TOKEN: &[u8] = b"\x03";

/// Event emitted by a recorder process.
#[derive(Clone, Debug)]
pub enum ProcessEvent {
    /// A parsed progress snapshot.
    Progress(Progress),
    /// One raw stderr line.
    StderrLine(String),
    /// Terminal: the process failed to launch or exited abnormally.
    Error(String),
    /// Terminal: the process exited cleanly.
    End,
}

/// Live handle to one recorder process.
///
/// The handle only signals; the child itself is owned by the monitor task,
/// which keeps reading stderr and reaps the exit status even after the
/// handle is dropped.
pub struct ProcessHandle {
    stdin: Mutex<Option<ChildStdin>>,
    kill: CancellationToken,
    done: CancellationToken,
}

impl ProcessHandle {
    /// Spawns the recorder and returns a handle plus its event stream.
    ///
    /// Never fails synchronously: a launch failure is delivered as a single
    /// terminal [`ProcessEvent::Error`] on the stream, keeping the interface
    /// uniform with runtime failures.
    pub fn start(
        cmd: RecorderCommand,
        channel_capacity: usize,
    ) -> (ProcessHandle, mpsc::Receiver<ProcessEvent>) {
        let (tx, rx) = mpsc::channel(channel_capacity.max(1));
        let kill = CancellationToken::new();
        let done = CancellationToken::new();

        let spawned = Command::new(cmd.binary())
            .args(cmd.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn();

        match spawned {
            Ok(mut child) => {
                let stdin = child.stdin.take();
                let handle = ProcessHandle {
                    stdin: Mutex::new(stdin),
                    kill: kill.clone(),
                    done: done.clone(),
                };
                tokio::spawn(monitor(child, tx, kill, done));
                (handle, rx)
            }
            Err(source) => {
                let message = RecorderError::Launch {
                    binary: cmd.binary().to_path_buf(),
                    source,
                }
                .as_message();
                tracing::warn!(binary = %cmd.binary().display(), "recorder launch failed");
                let handle = ProcessHandle {
                    stdin: Mutex::new(None),
                    kill,
                    done: done.clone(),
                };
                tokio::spawn(async move {
                    let _ = tx.send(ProcessEvent::Error(message)).await;
                    done.cancel();
                });
                (handle, rx)
            }
        }
    }

    /// Writes the graceful quit token to the child's stdin.
    pub async fn request_quit(&self) {
        self.write_token(QUIT_TOKEN).await;
    }

    /// Writes the stronger interrupt token to the child's stdin.
    pub async fn request_interrupt(&self) {
        self.write_token(INTERRUPT_TOKEN).await;
    }

    /// Schedules an OS-level kill after the grace window.
    ///
    /// The timer is cancelled when the process exits before the window
    /// elapses; calling this on an already-finished handle is a no-op.
    pub fn kill_after(&self, grace: Duration) {
        let kill = self.kill.clone();
        let done = self.done.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = done.cancelled() => {}
                _ = tokio::time::sleep(grace) => {
                    tracing::debug!("grace window elapsed, hard-killing recorder");
                    kill.cancel();
                }
            }
        });
    }

    /// Returns true once the terminal event has been emitted.
    pub fn is_finished(&self) -> bool {
        self.done.is_cancelled()
    }

    async fn write_token(&self, token: &[u8]) {
        let mut stdin = self.stdin.lock().await;
        if let Some(pipe) = stdin.as_mut() {
            if pipe.write_all(token).await.is_err() || pipe.flush().await.is_err() {
                // Child already gone; drop the pipe so later tokens are no-ops.
                *stdin = None;
            }
        }
    }
}

/// Owns the child: drains stderr, honors the hard-kill trigger, reaps the
/// exit status, and emits exactly one terminal event.
async fn monitor(
    mut child: Child,
    tx: mpsc::Sender<ProcessEvent>,
    kill: CancellationToken,
    done: CancellationToken,
) {
    if let Some(stderr) = child.stderr.take() {
        let mut lines = BufReader::new(stderr).lines();
        loop {
            tokio::select! {
                biased;
                _ = kill.cancelled() => {
                    let _ = child.start_kill();
                    break;
                }
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        let parsed = Progress::parse(&line);
                        if tx.send(ProcessEvent::StderrLine(line)).await.is_err() {
                            break;
                        }
                        if let Some(progress) = parsed {
                            if tx.send(ProcessEvent::Progress(progress)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Ok(None) | Err(_) => break,
                }
            }
        }
    }

    let status = tokio::select! {
        status = child.wait() => status,
        _ = kill.cancelled() => {
            let _ = child.start_kill();
            child.wait().await
        }
    };

    let terminal = match status {
        Ok(status) if status.success() => ProcessEvent::End,
        Ok(status) => {
            let message = match status.code() {
                Some(code) => format!("recorder exited with code {code}"),
                None => "recorder terminated by signal".to_string(),
            };
            ProcessEvent::Error(RecorderError::Runtime { message }.as_message())
        }
        Err(e) => ProcessEvent::Error(
            RecorderError::Runtime {
                message: format!("failed to await recorder exit: {e}"),
            }
            .as_message(),
        ),
    };
    let _ = tx.send(terminal).await;
    done.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{OptionsPatch, RecordingOptions};

    fn command_for(binary: &str) -> RecorderCommand {
        let options = RecordingOptions::default().apply(&OptionsPatch {
            split_timeout: Some(0.0),
            ..OptionsPatch::default()
        });
        RecorderCommand::new(binary, "rtsp://test", "/tmp", options)
    }

    async fn drain(mut rx: mpsc::Receiver<ProcessEvent>) -> Vec<ProcessEvent> {
        let mut events = Vec::new();
        while let Some(ev) = rx.recv().await {
            events.push(ev);
        }
        events
    }

    #[tokio::test]
    async fn test_launch_failure_is_single_terminal_error() {
        let (handle, rx) = ProcessHandle::start(command_for("/no/such/recorder"), 8);
        let events = drain(rx).await;
        assert_eq!(events.len(), 1);
        match &events[0] {
            ProcessEvent::Error(msg) => assert!(msg.contains("failed to launch")),
            other => panic!("expected launch error, got {other:?}"),
        }
        assert!(handle.is_finished());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_clean_exit_emits_end_last() {
        let (handle, rx) = ProcessHandle::start(command_for("/bin/true"), 8);
        let events = drain(rx).await;
        assert!(matches!(events.last(), Some(ProcessEvent::End)));
        assert!(handle.is_finished());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_emits_error_last() {
        let (_handle, rx) = ProcessHandle::start(command_for("/bin/false"), 8);
        let events = drain(rx).await;
        match events.last() {
            Some(ProcessEvent::Error(msg)) => assert!(msg.contains("exited with code 1")),
            other => panic!("expected exit error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    mod script {
        use super::*;
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        pub fn fake_recorder(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
            let path = dir.join("fake-recorder.sh");
            let mut file = std::fs::File::create(&path).expect("create script");
            writeln!(file, "#!/bin/sh\n{body}").expect("write script");
            let mut perms = file.metadata().expect("script metadata").permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).expect("chmod script");
            path
        }

        #[tokio::test]
        async fn test_stderr_lines_precede_parsed_progress_and_terminal() {
            let dir = tempfile::tempdir().expect("tempdir");
            let script = fake_recorder(
                dir.path(),
                r#"echo "Press [q] to stop" >&2
echo "frame=10 fps=30 time=00:00:01.00" >&2
exit 0"#,
            );
            let (_handle, rx) =
                ProcessHandle::start(command_for(&script.to_string_lossy()), 8);
            let events = drain(rx).await;

            assert!(matches!(&events[0], ProcessEvent::StderrLine(l) if l.contains("Press")));
            assert!(matches!(&events[1], ProcessEvent::StderrLine(l) if l.contains("frame=10")));
            match &events[2] {
                ProcessEvent::Progress(p) => {
                    assert_eq!(p.frames, 10);
                    assert_eq!(p.timemark, "00:00:01.00");
                }
                other => panic!("expected progress, got {other:?}"),
            }
            assert!(matches!(events.last(), Some(ProcessEvent::End)));
        }

        #[tokio::test]
        async fn test_hard_kill_fires_after_grace_window() {
            let dir = tempfile::tempdir().expect("tempdir");
            let script = fake_recorder(dir.path(), "sleep 30");
            let (handle, rx) = ProcessHandle::start(command_for(&script.to_string_lossy()), 8);

            handle.request_quit().await; // the fake recorder ignores stdin
            handle.request_interrupt().await;
            handle.kill_after(Duration::from_millis(100));

            let events = tokio::time::timeout(Duration::from_secs(5), drain(rx))
                .await
                .expect("killed within grace + margin");
            match events.last() {
                Some(ProcessEvent::Error(msg)) => assert!(msg.contains("signal")),
                other => panic!("expected signal termination, got {other:?}"),
            }
            assert!(handle.is_finished());
        }

        #[tokio::test]
        async fn test_kill_timer_cancelled_when_process_exits_first() {
            let dir = tempfile::tempdir().expect("tempdir");
            let script = fake_recorder(dir.path(), "exit 0");
            let (handle, rx) = ProcessHandle::start(command_for(&script.to_string_lossy()), 8);
            handle.kill_after(Duration::from_secs(30));

            let events = tokio::time::timeout(Duration::from_secs(5), drain(rx))
                .await
                .expect("exits on its own");
            assert!(matches!(events.last(), Some(ProcessEvent::End)));
        }
    }
}
