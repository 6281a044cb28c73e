//! Caller-facing events: types and delivery trait.
//!
//! This module groups the reply-event **data model** and the **sink** trait
//! through which the supervisor pushes events to the host system.
//!
//! ## Contents
//! - [`ReplyKind`], [`ReplyEvent`] event classification and payloads
//! - [`EventSink`] delivery trait implemented by the host
//!
//! ## Quick reference
//! - **Publisher**: the per-task relay inside
//!   [`RecordingSupervisor`](crate::RecordingSupervisor).
//! - **Consumers**: host sinks (IPC bridges, loggers, test collectors).

mod event;
mod sink;

pub use event::{ReplyEvent, ReplyKind};
pub use sink::EventSink;

#[cfg(feature = "logging")]
pub use sink::LogSink;

pub(crate) use sink::NullSink;
