//! Recorder process layer: invocation, spawning, and event streaming.
//!
//! Internal structure:
//! - [`command`]: pure argument/output-path construction;
//! - [`progress`]: stderr statistics parsing;
//! - [`handle`]: process ownership, signaling, and the event stream.

mod command;
mod handle;
mod progress;

pub use command::RecorderCommand;
pub use handle::{ProcessEvent, ProcessHandle};
pub use progress::Progress;
