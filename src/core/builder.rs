use std::sync::Arc;

use crate::config::Config;
use crate::events::{EventSink, NullSink};
use crate::settings::FfmpegLocator;

use super::registry::TaskRegistry;
use super::supervisor::RecordingSupervisor;

/// Builder for constructing a [`RecordingSupervisor`] with injectable parts.
pub struct SupervisorBuilder {
    cfg: Config,
    sink: Option<Arc<dyn EventSink>>,
    registry: Option<Arc<TaskRegistry>>,
    locator: Option<Arc<FfmpegLocator>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            sink: None,
            registry: None,
            locator: None,
        }
    }

    /// Sets the event sink receiving task-scoped reply events.
    ///
    /// Defaults to a sink that discards everything.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Sets the task registry.
    ///
    /// Defaults to a fresh, private registry; inject one to share or inspect
    /// task state from outside the supervisor.
    pub fn with_registry(mut self, registry: Arc<TaskRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the recorder binary locator.
    ///
    /// Defaults to [`FfmpegLocator::from_env`].
    pub fn with_locator(mut self, locator: Arc<FfmpegLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Builds and returns the supervisor instance.
    pub fn build(self) -> RecordingSupervisor {
        RecordingSupervisor::new_internal(
            self.cfg,
            self.registry.unwrap_or_else(TaskRegistry::new),
            self.sink.unwrap_or_else(|| Arc::new(NullSink)),
            self.locator
                .unwrap_or_else(|| Arc::new(FfmpegLocator::from_env())),
        )
    }
}
