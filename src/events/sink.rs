//! # Caller-facing event sink trait.
//!
//! [`EventSink`] is the extension point through which the supervisor pushes
//! named, task-scoped events to the host system. Implementations typically
//! forward [`ReplyEvent::payload`] over IPC on the channel returned by
//! [`ReplyEvent::channel`].
//!
//! ## Rules
//! - `emit` is awaited inline by the per-task relay, so a slow sink applies
//!   backpressure to that one recording only, never to the supervisor.
//! - Handle errors internally; do not panic.
//!
//! ## Example
//! ```no_run
//! use async_trait::async_trait;
//! use recvisor::{EventSink, ReplyEvent};
//!
//! struct IpcSink { plugin_id: String }
//!
//! #[async_trait]
//! impl EventSink for IpcSink {
//!     async fn emit(&self, ev: &ReplyEvent) {
//!         let channel = ev.channel(&self.plugin_id);
//!         let payload = ev.payload();
//!         // send_to_client(channel, payload)...
//!         let _ = (channel, payload);
//!     }
//! }
//! ```

use async_trait::async_trait;

use super::event::ReplyEvent;

/// Receives task-scoped reply events from the supervisor.
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    /// Delivers a single event. Events for one task arrive in emission order.
    async fn emit(&self, event: &ReplyEvent);

    /// Returns the sink name used in logs.
    ///
    /// Prefer short, descriptive names (e.g., "ipc", "ws", "log").
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Default sink that discards every event.
pub(crate) struct NullSink;

#[async_trait]
impl EventSink for NullSink {
    async fn emit(&self, _event: &ReplyEvent) {}

    fn name(&self) -> &'static str {
        "null"
    }
}

/// Simple stdout logging sink.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`EventSink`] for
/// real IPC delivery or structured logging.
#[cfg(feature = "logging")]
pub struct LogSink;

#[cfg(feature = "logging")]
#[async_trait]
impl EventSink for LogSink {
    async fn emit(&self, e: &ReplyEvent) {
        use super::event::ReplyKind;

        match e.kind {
            ReplyKind::ProgressReply => {
                if let Some(p) = &e.progress {
                    println!(
                        "[progress-reply] task={} frames={} fps={} time={}",
                        e.task, p.frames, p.current_fps, p.timemark
                    );
                }
            }
            ReplyKind::StderrReply => {
                println!("[stderr-reply] task={} line={:?}", e.task, e.line);
            }
            ReplyKind::ErrorReply => {
                println!("[error-reply] task={} err={:?}", e.task, e.reason);
            }
            ReplyKind::StopReply => {
                println!("[stop-reply] task={}", e.task);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
