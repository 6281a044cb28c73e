//! # Reply events delivered to the caller-facing event sink.
//!
//! [`ReplyKind`] classifies the four task-scoped events a recording emits:
//!
//! - `progress-reply` — a fresh progress snapshot
//! - `stderr-reply` — one raw diagnostic line from the recorder
//! - `error-reply` — a launch or runtime failure (terminal)
//! - `stop-reply` — clean completion (terminal)
//!
//! ## Ordering guarantees
//! Per task: zero or more progress/stderr replies followed by exactly one
//! terminal reply (`stop-reply` xor `error-reply`); nothing after the
//! terminal one. Each event carries a globally unique, monotonically
//! increasing sequence number (`seq`) to restore order across tasks.
//!
//! ## Example
//! ```
//! use recvisor::{ReplyEvent, ReplyKind};
//!
//! let ev = ReplyEvent::error("cam-1", "rtsp timeout");
//! assert_eq!(ev.kind, ReplyKind::ErrorReply);
//! assert_eq!(ev.name(), "error-reply");
//! assert_eq!(ev.channel("rec"), "error-reply@rec");
//! assert_eq!(ev.payload()["taskId"], "cam-1");
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use serde_json::json;

use crate::process::Progress;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of caller-facing reply events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// A fresh progress snapshot for a running task.
    ///
    /// Sets: `task`, `progress`, `at`, `seq`.
    ProgressReply,

    /// One raw stderr line from the recorder process.
    ///
    /// Sets: `task`, `line`, `at`, `seq`.
    StderrReply,

    /// The task failed to launch or terminated abnormally. Terminal.
    ///
    /// Sets: `task`, `reason`, `at`, `seq`.
    ErrorReply,

    /// The task's process ended cleanly. Terminal.
    ///
    /// Sets: `task`, `at`, `seq`.
    StopReply,
}

impl ReplyKind {
    /// Returns the stable wire name of this event kind.
    pub fn name(&self) -> &'static str {
        match self {
            ReplyKind::ProgressReply => "progress-reply",
            ReplyKind::StderrReply => "stderr-reply",
            ReplyKind::ErrorReply => "error-reply",
            ReplyKind::StopReply => "stop-reply",
        }
    }
}

/// Task-scoped reply event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`ReplyKind`]
#[derive(Clone, Debug)]
pub struct ReplyEvent {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: ReplyKind,
    /// Task the event belongs to.
    pub task: Arc<str>,
    /// Progress snapshot (progress replies only).
    pub progress: Option<Progress>,
    /// Raw stderr line (stderr replies only).
    pub line: Option<Arc<str>>,
    /// Failure message (error replies only).
    pub reason: Option<Arc<str>>,
}

impl ReplyEvent {
    fn new(kind: ReplyKind, task: impl Into<Arc<str>>) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: task.into(),
            progress: None,
            line: None,
            reason: None,
        }
    }

    /// Creates a `progress-reply` event.
    pub fn progress(task: impl Into<Arc<str>>, progress: Progress) -> Self {
        let mut ev = Self::new(ReplyKind::ProgressReply, task);
        ev.progress = Some(progress);
        ev
    }

    /// Creates a `stderr-reply` event.
    pub fn stderr_line(task: impl Into<Arc<str>>, line: impl Into<Arc<str>>) -> Self {
        let mut ev = Self::new(ReplyKind::StderrReply, task);
        ev.line = Some(line.into());
        ev
    }

    /// Creates a terminal `error-reply` event.
    pub fn error(task: impl Into<Arc<str>>, reason: impl Into<Arc<str>>) -> Self {
        let mut ev = Self::new(ReplyKind::ErrorReply, task);
        ev.reason = Some(reason.into());
        ev
    }

    /// Creates a terminal `stop-reply` event.
    pub fn stop(task: impl Into<Arc<str>>) -> Self {
        Self::new(ReplyKind::StopReply, task)
    }

    /// Returns the stable wire name of the event (`progress-reply`, ...).
    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Formats the host delivery channel for this event: `<name>@<plugin>`.
    pub fn channel(&self, plugin_id: &str) -> String {
        format!("{}@{plugin_id}", self.name())
    }

    /// Returns true for the two terminal kinds.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, ReplyKind::ErrorReply | ReplyKind::StopReply)
    }

    /// Builds the wire payload for this event.
    ///
    /// Shapes per kind:
    /// - `progress-reply`: `{taskId, progress}`
    /// - `stderr-reply`: `{taskId, stderrLine}`
    /// - `error-reply`: `{taskId, error}`
    /// - `stop-reply`: `{taskId}`
    pub fn payload(&self) -> serde_json::Value {
        match self.kind {
            ReplyKind::ProgressReply => json!({
                "taskId": &*self.task,
                "progress": self.progress,
            }),
            ReplyKind::StderrReply => json!({
                "taskId": &*self.task,
                "stderrLine": self.line.as_deref(),
            }),
            ReplyKind::ErrorReply => json!({
                "taskId": &*self.task,
                "error": self.reason.as_deref(),
            }),
            ReplyKind::StopReply => json!({
                "taskId": &*self.task,
            }),
        }
    }
}
