//! # recvisor
//!
//! **Recvisor** is a recording process supervision library for Rust.
//!
//! It launches, tracks, and gracefully or forcefully stops external
//! recording/transcoding (ffmpeg) processes, one per logical task, and
//! multiplexes their asynchronous progress, diagnostic, and completion
//! events back to the caller through an [`EventSink`].
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ record("t1") │   │ record("t2") │   │ record("t3") │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  RecordingSupervisor                                              │
//! │  - Config (kill grace, channel capacity, default options)         │
//! │  - TaskRegistry (task id → handle + latest progress)              │
//! │  - FfmpegLocator (binary resolution from host settings)           │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ ProcessHandle│   │ ProcessHandle│   │ ProcessHandle│
//!     │ (one ffmpeg) │   │ (one ffmpeg) │   │ (one ffmpeg) │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ Emits:            │                  │
//!      │ - Progress        │                  │
//!      │ - StderrLine      │                  │
//!      │ - End | Error     │ (terminal, last) │
//!      ▼                   ▼                  ▼
//!   per-task relay ──► TaskRegistry (progress cache)
//!                  └─► EventSink (progress-reply / stderr-reply /
//!                                 error-reply / stop-reply)
//! ```
//!
//! ### Task lifecycle
//! ```text
//! record(id, url, dir, patch)
//!   ├─► merge patch over defaults (shallow, key by key)
//!   ├─► resolve binary, build args (+ segment muxer options)
//!   ├─► spawn process, register task
//!   └─► relay events until the terminal one
//!
//! stop(id, force)
//!   ├─► registry entry removed immediately ("gone" to the caller)
//!   ├─► graceful quit token ('q' on stdin)
//!   └─► force: interrupt token (ETX) + OS kill after the grace window
//!              (cancelled if the process exits first)
//! ```
//!
//! ## Features
//! | Area            | Description                                          | Key types / traits                     |
//! |-----------------|------------------------------------------------------|----------------------------------------|
//! | **Supervision** | Start, track, and stop recording tasks.              | [`RecordingSupervisor`]                |
//! | **Registry**    | Concurrent task state, injectable for tests.         | [`TaskRegistry`], [`TaskEntry`]        |
//! | **Processes**   | One recorder process with an ordered event stream.   | [`ProcessHandle`], [`ProcessEvent`]    |
//! | **Options**     | Defaults + shallow caller patches, segmentation.     | [`RecordingOptions`], [`OptionsPatch`] |
//! | **Events**      | Task-scoped replies delivered to the host.           | [`EventSink`], [`ReplyEvent`]          |
//! | **Settings**    | Binary resolution from the host settings store.      | [`FfmpegLocator`], [`SettingsStore`]   |
//! | **Errors**      | Typed failure taxonomy, surfaced as events.          | [`RecorderError`]                      |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogSink`] _(demo/reference only)_.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use recvisor::{Config, FfmpegLocator, OptionsPatch, RecordingSupervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let sup = RecordingSupervisor::builder(Config::default())
//!         .with_locator(Arc::new(FfmpegLocator::from_env()))
//!         .build();
//!
//!     let patch = OptionsPatch {
//!         split_timeout: Some(30.0),
//!         save_format: Some("mp4".into()),
//!         ..OptionsPatch::default()
//!     };
//!     sup.record("cam-1", "rtsp://camera/stream", "/recordings", &patch).await;
//!
//!     // ... later: the task vanishes from the registry immediately,
//!     // the process winds down in the background.
//!     sup.stop("cam-1", true).await;
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod options;
mod process;
mod settings;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{
    RecordRequest, RecordingSupervisor, StopRequest, SupervisorBuilder, TaskEntry, TaskRegistry,
};
pub use error::RecorderError;
pub use events::{EventSink, ReplyEvent, ReplyKind};
pub use options::{OptionsPatch, RecordingOptions};
pub use process::{ProcessEvent, ProcessHandle, Progress, RecorderCommand};
pub use settings::{FfmpegLocator, SettingsStore};

// Optional: expose a simple built-in stdout sink (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use events::LogSink;
