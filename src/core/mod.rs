//! Runtime core: orchestration and task state.
//!
//! The public API from this module is [`RecordingSupervisor`], which starts
//! and stops recorder processes, plus the [`TaskRegistry`] it coordinates.
//!
//! Internal modules:
//! - [`registry`]: concurrent map from task id to recording state;
//! - [`supervisor`]: request handling, process wiring, event relays;
//! - [`builder`]: supervisor construction with injectable parts.

mod builder;
mod registry;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use registry::{TaskEntry, TaskRegistry};
pub use supervisor::{RecordRequest, RecordingSupervisor, StopRequest};
