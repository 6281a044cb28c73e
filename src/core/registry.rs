//! # Task registry - concurrent map from task id to recording state.
//!
//! [`TaskRegistry`] is the only shared mutable state in the runtime. Each
//! entry owns the task's [`ProcessHandle`] and caches its latest
//! [`Progress`] snapshot.
//!
//! ## Rules
//! - `put` overwrites unconditionally; the displaced entry is returned so
//!   the caller can wind its process down.
//! - A task is removed the instant a stop is requested, not when the
//!   process actually exits: from the caller's perspective a task is either
//!   "known" (has an entry) or "gone".
//! - Progress updates and terminal removals are guarded by handle identity,
//!   so events from an orphaned process can never touch a successor entry
//!   registered under the same id.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::process::{ProcessHandle, Progress};

/// State of one registered recording task.
pub struct TaskEntry {
    handle: Arc<ProcessHandle>,
    progress: Option<Progress>,
}

impl TaskEntry {
    /// Creates an entry for a freshly started process.
    pub fn new(handle: Arc<ProcessHandle>) -> Self {
        Self {
            handle,
            progress: None,
        }
    }

    /// Returns the process handle.
    pub fn handle(&self) -> &Arc<ProcessHandle> {
        &self.handle
    }

    /// Returns the latest cached progress snapshot.
    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }
}

/// Concurrent-safe registry of active recording tasks.
///
/// Explicitly owned and injectable: multiple supervisors can coexist (e.g.
/// in tests) without shared state.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: RwLock<HashMap<String, TaskEntry>>,
}

impl TaskRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Inserts an entry, overwriting any existing one unconditionally.
    ///
    /// Returns the displaced entry, if any; its process is still running and
    /// the caller decides what to do with it.
    pub async fn put(&self, task_id: impl Into<String>, entry: TaskEntry) -> Option<TaskEntry> {
        let mut tasks = self.tasks.write().await;
        tasks.insert(task_id.into(), entry)
    }

    /// Returns the handle registered under `task_id`, if any.
    pub async fn handle(&self, task_id: &str) -> Option<Arc<ProcessHandle>> {
        let tasks = self.tasks.read().await;
        tasks.get(task_id).map(|entry| Arc::clone(&entry.handle))
    }

    /// Returns the latest progress snapshot for `task_id`, if any.
    pub async fn progress(&self, task_id: &str) -> Option<Progress> {
        let tasks = self.tasks.read().await;
        tasks.get(task_id).and_then(|entry| entry.progress.clone())
    }

    /// Caches a progress snapshot for `task_id`.
    ///
    /// No-op when the task was already removed (a late progress event racing
    /// a stop) or when the entry now belongs to a different handle (a late
    /// event from an orphaned process).
    pub async fn update_progress(
        &self,
        task_id: &str,
        handle: &Arc<ProcessHandle>,
        progress: Progress,
    ) {
        let mut tasks = self.tasks.write().await;
        if let Some(entry) = tasks.get_mut(task_id) {
            if Arc::ptr_eq(&entry.handle, handle) {
                entry.progress = Some(progress);
            }
        }
    }

    /// Atomically takes the entry for `task_id`.
    ///
    /// Used by stop logic to detach the handle before signaling, so a second
    /// concurrent stop for the same id is a no-op.
    pub async fn remove(&self, task_id: &str) -> Option<TaskEntry> {
        let mut tasks = self.tasks.write().await;
        tasks.remove(task_id)
    }

    /// Removes the entry for `task_id` only if it still holds `handle`.
    ///
    /// Used by terminal-event handling: an orphaned process reporting its
    /// end must not evict a successor registered under the same id.
    pub async fn remove_if_handle(
        &self,
        task_id: &str,
        handle: &Arc<ProcessHandle>,
    ) -> Option<TaskEntry> {
        let mut tasks = self.tasks.write().await;
        match tasks.get(task_id) {
            Some(entry) if Arc::ptr_eq(&entry.handle, handle) => tasks.remove(task_id),
            _ => None,
        }
    }

    /// Returns a sorted snapshot of registered task ids.
    pub async fn list_ids(&self) -> Vec<String> {
        let tasks = self.tasks.read().await;
        let mut ids: Vec<String> = tasks.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Returns true when `task_id` is registered.
    pub async fn contains(&self, task_id: &str) -> bool {
        self.tasks.read().await.contains_key(task_id)
    }

    /// Returns true when the registry is empty.
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }

    /// Returns the number of registered tasks.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }
}

#[cfg(unix)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RecordingOptions;
    use crate::process::RecorderCommand;

    fn noop_handle() -> Arc<ProcessHandle> {
        let cmd = RecorderCommand::new(
            "/bin/true",
            "rtsp://test",
            "/tmp",
            RecordingOptions::default(),
        );
        let (handle, _rx) = ProcessHandle::start(cmd, 1);
        Arc::new(handle)
    }

    fn snapshot(frames: u64) -> Progress {
        Progress {
            frames,
            timemark: "00:00:01.00".to_string(),
            ..Progress::default()
        }
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let registry = TaskRegistry::new();
        assert!(registry.is_empty().await);

        let handle = noop_handle();
        assert!(registry.put("t1", TaskEntry::new(handle.clone())).await.is_none());
        assert!(registry.contains("t1").await);
        assert_eq!(registry.len().await, 1);
        assert!(registry
            .handle("t1")
            .await
            .is_some_and(|h| Arc::ptr_eq(&h, &handle)));

        assert!(registry.remove("t1").await.is_some());
        assert!(registry.remove("t1").await.is_none());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_overwrites_and_returns_displaced_entry() {
        let registry = TaskRegistry::new();
        let first = noop_handle();
        let second = noop_handle();

        registry.put("t1", TaskEntry::new(first.clone())).await;
        let displaced = registry
            .put("t1", TaskEntry::new(second.clone()))
            .await
            .expect("first entry displaced");
        assert!(Arc::ptr_eq(displaced.handle(), &first));

        assert_eq!(registry.len().await, 1);
        assert!(registry
            .handle("t1")
            .await
            .is_some_and(|h| Arc::ptr_eq(&h, &second)));
    }

    #[tokio::test]
    async fn test_update_progress_after_remove_is_noop() {
        let registry = TaskRegistry::new();
        let handle = noop_handle();
        registry.put("t1", TaskEntry::new(handle.clone())).await;
        registry.remove("t1").await;

        registry.update_progress("t1", &handle, snapshot(5)).await;
        assert_eq!(registry.progress("t1").await, None);
        assert!(!registry.contains("t1").await);
    }

    #[tokio::test]
    async fn test_update_progress_from_orphaned_handle_is_noop() {
        let registry = TaskRegistry::new();
        let orphan = noop_handle();
        let current = noop_handle();

        registry.put("t1", TaskEntry::new(orphan.clone())).await;
        registry.put("t1", TaskEntry::new(current.clone())).await;

        registry.update_progress("t1", &orphan, snapshot(99)).await;
        assert_eq!(registry.progress("t1").await, None);

        registry.update_progress("t1", &current, snapshot(3)).await;
        assert_eq!(registry.progress("t1").await, Some(snapshot(3)));
    }

    #[tokio::test]
    async fn test_remove_if_handle_spares_successor() {
        let registry = TaskRegistry::new();
        let orphan = noop_handle();
        let current = noop_handle();

        registry.put("t1", TaskEntry::new(orphan.clone())).await;
        registry.put("t1", TaskEntry::new(current.clone())).await;

        assert!(registry.remove_if_handle("t1", &orphan).await.is_none());
        assert!(registry.contains("t1").await);

        assert!(registry.remove_if_handle("t1", &current).await.is_some());
        assert!(!registry.contains("t1").await);
    }

    #[tokio::test]
    async fn test_list_ids_is_sorted_snapshot() {
        let registry = TaskRegistry::new();
        registry.put("b", TaskEntry::new(noop_handle())).await;
        registry.put("a", TaskEntry::new(noop_handle())).await;
        registry.put("c", TaskEntry::new(noop_handle())).await;
        assert_eq!(registry.list_ids().await, vec!["a", "b", "c"]);
    }
}
