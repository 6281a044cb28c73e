//! Error types used by the recvisor runtime.
//!
//! [`RecorderError`] classifies the failures a recording task can hit:
//!
//! - *launch failure* — the recorder binary could not be found or spawned;
//! - *runtime failure* — the process exited abnormally or was terminated;
//! - *invalid request* — the caller supplied an unusable request.
//!
//! All of these are surfaced to the caller as `error-reply` events, never as
//! synchronous faults from the request entry points. The helper methods
//! (`as_label`, `as_message`) produce stable strings for logs and payloads.

use std::path::PathBuf;

use thiserror::Error;

/// # Errors produced by recording tasks and the supervisor.
///
/// These never propagate out of [`RecordingSupervisor`](crate::RecordingSupervisor)
/// entry points; they are converted into `error-reply` events.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RecorderError {
    /// The recorder binary could not be located or spawned.
    #[error("failed to launch {binary:?}: {source}")]
    Launch {
        /// Path of the binary that failed to start.
        binary: PathBuf,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The recorder process exited abnormally or was terminated by a signal.
    #[error("recorder failed: {message}")]
    Runtime {
        /// The underlying failure message (exit code, signal, I/O error).
        message: String,
    },

    /// The request itself was unusable (empty task id or url).
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// What was wrong with the request.
        message: String,
    },
}

impl RecorderError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use recvisor::RecorderError;
    ///
    /// let err = RecorderError::Runtime { message: "exited with code 1".into() };
    /// assert_eq!(err.as_label(), "runtime_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RecorderError::Launch { .. } => "launch_failed",
            RecorderError::Runtime { .. } => "runtime_failed",
            RecorderError::InvalidRequest { .. } => "invalid_request",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RecorderError::Launch { binary, source } => {
                format!("failed to launch {}: {source}", binary.display())
            }
            RecorderError::Runtime { message } => message.clone(),
            RecorderError::InvalidRequest { message } => format!("invalid request: {message}"),
        }
    }
}
