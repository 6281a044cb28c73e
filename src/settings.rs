//! # Recorder binary resolution from an external settings store.
//!
//! The host system owns a persistent key-value settings store; this module
//! defines the [`SettingsStore`] collaborator trait and [`FfmpegLocator`],
//! which resolves the recorder binary path from it.
//!
//! ## Resolution rules
//! - Settings live under the key `plugin.<id>.settings`.
//! - The binary path is the `ffmpeg-path` field of that object. It may be a
//!   plain string or a one-element array of strings (both host shapes exist).
//! - An absent or non-file path falls back to `ffmpeg` on the environment
//!   search path.
//! - The path is resolved once at construction and re-resolved on every
//!   [`FfmpegLocator::settings_saved`] notification, never per launch.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Key-value settings store owned by the host system.
///
/// Lookups are cheap and synchronous; the locator caches the resolved path,
/// so the store is only consulted at load time and on save notifications.
pub trait SettingsStore: Send + Sync + 'static {
    /// Returns the settings object stored under `key`, if any.
    fn get(&self, key: &str) -> Option<serde_json::Value>;
}

/// Resolves and caches the path of the recorder binary.
pub struct FfmpegLocator {
    plugin_id: String,
    store: Option<Arc<dyn SettingsStore>>,
    resolved: RwLock<PathBuf>,
}

impl FfmpegLocator {
    /// Settings field holding the configured binary path.
    pub const PATH_FIELD: &'static str = "ffmpeg-path";

    /// Fallback binary name, found via the environment search path.
    pub const DEFAULT_BINARY: &'static str = "ffmpeg";

    /// Creates a locator bound to a settings store, resolving immediately.
    pub fn with_store(plugin_id: impl Into<String>, store: Arc<dyn SettingsStore>) -> Self {
        let plugin_id = plugin_id.into();
        let key = Self::key_for(&plugin_id);
        let resolved = Self::lookup(&key, store.as_ref());
        Self {
            plugin_id,
            store: Some(store),
            resolved: RwLock::new(resolved),
        }
    }

    /// Creates a locator that always resolves to the given path.
    ///
    /// Useful for tests and for hosts that resolve the binary themselves.
    pub fn fixed(path: impl Into<PathBuf>) -> Self {
        Self {
            plugin_id: String::new(),
            store: None,
            resolved: RwLock::new(path.into()),
        }
    }

    /// Creates a locator that resolves via the environment search path.
    pub fn from_env() -> Self {
        Self::fixed(Self::DEFAULT_BINARY)
    }

    /// Returns the settings key this locator reads (`plugin.<id>.settings`).
    pub fn settings_key(&self) -> String {
        Self::key_for(&self.plugin_id)
    }

    /// Returns the currently resolved binary path.
    pub async fn resolve(&self) -> PathBuf {
        self.resolved.read().await.clone()
    }

    /// Re-resolves the binary path from the settings store.
    ///
    /// Call on every settings-saved notification. No-op for fixed locators.
    pub async fn settings_saved(&self) {
        if let Some(store) = &self.store {
            let path = Self::lookup(&self.settings_key(), store.as_ref());
            *self.resolved.write().await = path;
        }
    }

    fn key_for(plugin_id: &str) -> String {
        format!("plugin.{plugin_id}.settings")
    }

    fn lookup(key: &str, store: &dyn SettingsStore) -> PathBuf {
        if let Some(configured) = store
            .get(key)
            .as_ref()
            .and_then(|settings| settings.get(Self::PATH_FIELD))
            .and_then(Self::as_path_str)
            .map(PathBuf::from)
        {
            if configured.is_file() {
                return configured;
            }
            tracing::warn!(
                path = %configured.display(),
                "configured recorder path is not a file, falling back to search path"
            );
        }
        PathBuf::from(Self::DEFAULT_BINARY)
    }

    // Hosts store the path either as "path" or as ["path"].
    fn as_path_str(value: &serde_json::Value) -> Option<String> {
        value
            .as_str()
            .or_else(|| value.get(0).and_then(|v| v.as_str()))
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct MapStore(serde_json::Value);

    impl SettingsStore for MapStore {
        fn get(&self, key: &str) -> Option<serde_json::Value> {
            self.0.get(key).cloned()
        }
    }

    #[tokio::test]
    async fn test_fixed_locator_resolves_given_path() {
        let locator = FfmpegLocator::fixed("/opt/ffmpeg/bin/ffmpeg");
        assert_eq!(
            locator.resolve().await,
            PathBuf::from("/opt/ffmpeg/bin/ffmpeg")
        );
        // settings_saved is a no-op without a store
        locator.settings_saved().await;
        assert_eq!(
            locator.resolve().await,
            PathBuf::from("/opt/ffmpeg/bin/ffmpeg")
        );
    }

    #[tokio::test]
    async fn test_missing_settings_fall_back_to_search_path() {
        let store = Arc::new(MapStore(json!({})));
        let locator = FfmpegLocator::with_store("rec", store);
        assert_eq!(locator.settings_key(), "plugin.rec.settings");
        assert_eq!(
            locator.resolve().await,
            PathBuf::from(FfmpegLocator::DEFAULT_BINARY)
        );
    }

    #[tokio::test]
    async fn test_invalid_path_falls_back_to_search_path() {
        let store = Arc::new(MapStore(json!({
            "plugin.rec.settings": { "ffmpeg-path": "/no/such/binary/anywhere" }
        })));
        let locator = FfmpegLocator::with_store("rec", store);
        assert_eq!(
            locator.resolve().await,
            PathBuf::from(FfmpegLocator::DEFAULT_BINARY)
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_configured_path_accepts_string_and_array_shapes() {
        let store = Arc::new(MapStore(json!({
            "plugin.rec.settings": { "ffmpeg-path": "/bin/sh" }
        })));
        let locator = FfmpegLocator::with_store("rec", store);
        assert_eq!(locator.resolve().await, PathBuf::from("/bin/sh"));

        let store = Arc::new(MapStore(json!({
            "plugin.rec.settings": { "ffmpeg-path": ["/bin/sh"] }
        })));
        let locator = FfmpegLocator::with_store("rec", store);
        assert_eq!(locator.resolve().await, PathBuf::from("/bin/sh"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_settings_saved_re_resolves() {
        use std::sync::Mutex;

        struct MutStore(Mutex<serde_json::Value>);
        impl SettingsStore for MutStore {
            fn get(&self, key: &str) -> Option<serde_json::Value> {
                self.0.lock().ok().and_then(|v| v.get(key).cloned())
            }
        }

        let store = Arc::new(MutStore(Mutex::new(json!({}))));
        let locator = FfmpegLocator::with_store("rec", store.clone());
        assert_eq!(
            locator.resolve().await,
            PathBuf::from(FfmpegLocator::DEFAULT_BINARY)
        );

        if let Ok(mut v) = store.0.lock() {
            *v = json!({ "plugin.rec.settings": { "ffmpeg-path": "/bin/sh" } });
        }
        locator.settings_saved().await;
        assert_eq!(locator.resolve().await, PathBuf::from("/bin/sh"));
    }
}
