//! # RecordingSupervisor: orchestrates recorder processes and event relays.
//!
//! The [`RecordingSupervisor`] owns the [`TaskRegistry`], an [`EventSink`],
//! and an [`FfmpegLocator`]. It builds invocations from merged options,
//! starts [`ProcessHandle`]s, registers them, and relays their event streams
//! back to the sink.
//!
//! ## High-level architecture
//! ```text
//! record(task_id, url, save_dir, patch)
//!   ├─ merge patch over Config::defaults
//!   ├─ FfmpegLocator::resolve() ─► RecorderCommand (args + output path)
//!   ├─ ProcessHandle::start()   ─► (handle, event stream)
//!   ├─ TaskRegistry::put()        (previous holder of the id wound down)
//!   └─ relay task:
//!        Progress(p)    ─► registry.update_progress + progress-reply
//!        StderrLine(l)  ─► stderr-reply
//!        Error(msg)     ─► evict entry, error-reply   (terminal)
//!        End            ─► evict entry, stop-reply    (terminal)
//!
//! stop(task_id, force)
//!   ├─ TaskRegistry::remove()     (task is "gone" immediately)
//!   ├─ handle.request_quit()      (graceful token, best-effort)
//!   └─ if force:
//!        ├─ handle.request_interrupt()
//!        └─ handle.kill_after(Config::kill_grace)   (cancellable safety net)
//! ```
//!
//! ## Rules
//! - Request entry points never fault synchronously; failures surface as
//!   `error-reply` events.
//! - At most one live handle per task id: re-recording under an id quietly
//!   winds down the previous process (stop-then-start).
//! - Any terminal event evicts the registry entry if still present; eviction
//!   is guarded by handle identity so orphaned processes cannot evict a
//!   successor.
//! - `stop`/`stop_all` are fire-and-forget; the delayed kill is the only
//!   bound on process lifetime after a forced stop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::error::RecorderError;
use crate::events::{EventSink, ReplyEvent};
use crate::options::OptionsPatch;
use crate::process::{ProcessEvent, ProcessHandle, Progress, RecorderCommand};
use crate::settings::FfmpegLocator;

use super::builder::SupervisorBuilder;
use super::registry::{TaskEntry, TaskRegistry};

/// Wire shape of a `record` request.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRequest {
    /// Caller-chosen task identifier, unique per supervisor instance.
    pub task_id: String,
    /// Input stream url.
    pub url: String,
    /// Writable directory the output files land in.
    pub save_dir: PathBuf,
    /// Partial options merged over the supervisor defaults.
    #[serde(default)]
    pub options: OptionsPatch,
}

/// Wire shape of a `stop` request. An absent id stops every task.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopRequest {
    /// Task to stop; `None` means stop all.
    #[serde(default)]
    pub task_id: Option<String>,
}

/// Coordinates recorder processes, the task registry, and event delivery.
pub struct RecordingSupervisor {
    cfg: Config,
    registry: Arc<TaskRegistry>,
    sink: Arc<dyn EventSink>,
    locator: Arc<FfmpegLocator>,
}

impl RecordingSupervisor {
    /// Returns a builder for constructing a supervisor.
    pub fn builder(cfg: Config) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        registry: Arc<TaskRegistry>,
        sink: Arc<dyn EventSink>,
        locator: Arc<FfmpegLocator>,
    ) -> Self {
        Self {
            cfg,
            registry,
            sink,
            locator,
        }
    }

    /// Returns the task registry.
    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    /// Returns the binary locator.
    pub fn locator(&self) -> &Arc<FfmpegLocator> {
        &self.locator
    }

    /// Starts a recording task.
    ///
    /// Merges `patch` over the configured defaults, computes the output
    /// path, starts the recorder, registers the task, and wires its events
    /// to the sink. Returns as soon as the process is launched; all
    /// failures, including launch failures, arrive as `error-reply` events.
    ///
    /// A previous recording registered under the same id is quietly wound
    /// down and replaced.
    pub async fn record(
        &self,
        task_id: &str,
        url: &str,
        save_dir: impl AsRef<Path>,
        patch: &OptionsPatch,
    ) {
        if task_id.trim().is_empty() || url.trim().is_empty() {
            let err = RecorderError::InvalidRequest {
                message: "taskId and url must be non-empty".to_string(),
            };
            self.sink
                .emit(&ReplyEvent::error(task_id, err.as_message()))
                .await;
            return;
        }

        let options = self.cfg.defaults.apply(patch);
        let binary = self.locator.resolve().await;
        let cmd = RecorderCommand::new(binary, url, save_dir.as_ref(), options);
        tracing::info!(
            task = task_id,
            url,
            output = %cmd.output().display(),
            "starting recording"
        );

        let (handle, events) = ProcessHandle::start(cmd, self.cfg.channel_capacity_clamped());
        let handle = Arc::new(handle);

        if let Some(previous) = self
            .registry
            .put(task_id, TaskEntry::new(Arc::clone(&handle)))
            .await
        {
            tracing::warn!(task = task_id, "task id re-used while active, replacing");
            previous.handle().request_quit().await;
            previous.handle().kill_after(self.cfg.kill_grace);
        }

        self.spawn_relay(task_id, handle, events);
    }

    /// Stops a recording task. No-op (and no event) when the id is unknown.
    ///
    /// The registry entry is removed immediately; the process keeps winding
    /// down in the background and its terminal event still reaches the sink.
    pub async fn stop(&self, task_id: &str, force: bool) {
        let Some(entry) = self.registry.remove(task_id).await else {
            tracing::debug!(task = task_id, "stop for unknown task, ignoring");
            return;
        };
        tracing::info!(task = task_id, force, "stopping recording");

        let handle = entry.handle();
        handle.request_quit().await;
        if force {
            handle.request_interrupt().await;
            handle.kill_after(self.cfg.kill_grace);
        }
    }

    /// Stops every registered task. No-op when the registry is empty.
    pub async fn stop_all(&self, force: bool) {
        for task_id in self.registry.list_ids().await {
            self.stop(&task_id, force).await;
        }
    }

    /// Returns the latest cached progress snapshot for a task.
    pub async fn progress(&self, task_id: &str) -> Option<Progress> {
        self.registry.progress(task_id).await
    }

    /// Gracefully stops everything. Intended for host unload hooks.
    pub async fn shutdown(&self) {
        self.stop_all(false).await;
    }

    /// Entry point for a wire-shaped record request.
    pub async fn handle_record(&self, req: RecordRequest) {
        self.record(&req.task_id, &req.url, &req.save_dir, &req.options)
            .await;
    }

    /// Entry point for a wire-shaped stop request; absent id stops all.
    pub async fn handle_stop(&self, req: StopRequest) {
        match req.task_id {
            Some(task_id) => self.stop(&task_id, true).await,
            None => self.stop_all(true).await,
        }
    }

    /// Consumes one process's event stream: caches progress, forwards every
    /// event to the sink, and evicts the registry entry on the terminal one.
    fn spawn_relay(
        &self,
        task_id: &str,
        handle: Arc<ProcessHandle>,
        mut events: mpsc::Receiver<ProcessEvent>,
    ) {
        let registry = Arc::clone(&self.registry);
        let sink = Arc::clone(&self.sink);
        let task: Arc<str> = Arc::from(task_id);

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    ProcessEvent::Progress(progress) => {
                        registry
                            .update_progress(&task, &handle, progress.clone())
                            .await;
                        sink.emit(&ReplyEvent::progress(Arc::clone(&task), progress))
                            .await;
                    }
                    ProcessEvent::StderrLine(line) => {
                        sink.emit(&ReplyEvent::stderr_line(Arc::clone(&task), line))
                            .await;
                    }
                    ProcessEvent::Error(message) => {
                        registry.remove_if_handle(&task, &handle).await;
                        tracing::warn!(task = %task, %message, "recording failed");
                        sink.emit(&ReplyEvent::error(Arc::clone(&task), message))
                            .await;
                        break;
                    }
                    ProcessEvent::End => {
                        registry.remove_if_handle(&task, &handle).await;
                        tracing::info!(task = %task, "recording ended");
                        sink.emit(&ReplyEvent::stop(Arc::clone(&task))).await;
                        break;
                    }
                }
            }
        });
    }
}
