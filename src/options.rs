//! # Per-recording options and their merge semantics.
//!
//! [`RecordingOptions`] is the full, resolved configuration for one recording
//! invocation. Callers rarely build it directly; they supply an
//! [`OptionsPatch`] with only the fields they care about, and the supervisor
//! merges it over its configured defaults **shallowly, key by key**.
//!
//! ## Defaults
//! - `split_timeout = 60.0` seconds (segmented output enabled)
//! - `save_filename_template = "record"`
//! - `save_format = "mp4"`
//! - `audio_codec = video_codec = "copy"` (stream copy, no re-encode)
//!
//! ## Example
//! ```
//! use recvisor::{OptionsPatch, RecordingOptions};
//!
//! let patch = OptionsPatch {
//!     split_timeout: Some(30.0),
//!     save_format: Some("mkv".into()),
//!     ..OptionsPatch::default()
//! };
//! let opts = RecordingOptions::default().apply(&patch);
//!
//! assert_eq!(opts.split_timeout, 30.0);
//! assert_eq!(opts.save_format, "mkv");
//! // Untouched keys keep their defaults.
//! assert_eq!(opts.audio_codec, "copy");
//! ```

use serde::{Deserialize, Serialize};

/// Fully resolved configuration for one recording invocation.
///
/// ## Field semantics
/// - `split_timeout`: seconds per output segment; `<= 0` disables segmentation
/// - `save_filename_template`: base file name; may already embed a `%03d`
///   segment placeholder (one is appended otherwise when segmentation is on)
/// - `save_format`: output container extension (no leading dot)
/// - `audio_codec` / `video_codec`: passed to `-c:a` / `-c:v`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordingOptions {
    /// Segment duration in seconds. Values `<= 0` produce a single file.
    pub split_timeout: f64,
    /// Base output file name (without directory or extension).
    pub save_filename_template: String,
    /// Output container extension.
    pub save_format: String,
    /// Audio codec selector for `-c:a`.
    pub audio_codec: String,
    /// Video codec selector for `-c:v`.
    pub video_codec: String,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            split_timeout: 60.0,
            save_filename_template: "record".to_string(),
            save_format: "mp4".to_string(),
            audio_codec: "copy".to_string(),
            video_codec: "copy".to_string(),
        }
    }
}

impl RecordingOptions {
    /// Returns true when segmented output is enabled (`split_timeout > 0`).
    #[inline]
    pub fn segmented(&self) -> bool {
        self.split_timeout > 0.0
    }

    /// Merges a caller-supplied patch over these options, key by key.
    ///
    /// The merge is shallow: each present patch field replaces the whole
    /// value; absent fields keep the current one.
    pub fn apply(&self, patch: &OptionsPatch) -> RecordingOptions {
        RecordingOptions {
            split_timeout: patch.split_timeout.unwrap_or(self.split_timeout),
            save_filename_template: patch
                .save_filename_template
                .clone()
                .unwrap_or_else(|| self.save_filename_template.clone()),
            save_format: patch
                .save_format
                .clone()
                .unwrap_or_else(|| self.save_format.clone()),
            audio_codec: patch
                .audio_codec
                .clone()
                .unwrap_or_else(|| self.audio_codec.clone()),
            video_codec: patch
                .video_codec
                .clone()
                .unwrap_or_else(|| self.video_codec.clone()),
        }
    }
}

/// Partial recording options as supplied by the caller.
///
/// Every field is optional; see [`RecordingOptions::apply`] for the merge
/// rule. Deserializes from the camelCase wire shape
/// (`{"splitTimeout": 30, "saveFormat": "mp4"}`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionsPatch {
    /// Overrides [`RecordingOptions::split_timeout`].
    pub split_timeout: Option<f64>,
    /// Overrides [`RecordingOptions::save_filename_template`].
    pub save_filename_template: Option<String>,
    /// Overrides [`RecordingOptions::save_format`].
    pub save_format: Option<String>,
    /// Overrides [`RecordingOptions::audio_codec`].
    pub audio_codec: Option<String>,
    /// Overrides [`RecordingOptions::video_codec`].
    pub video_codec: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = RecordingOptions::default();
        assert_eq!(opts.split_timeout, 60.0);
        assert_eq!(opts.save_filename_template, "record");
        assert_eq!(opts.save_format, "mp4");
        assert_eq!(opts.audio_codec, "copy");
        assert_eq!(opts.video_codec, "copy");
        assert!(opts.segmented());
    }

    #[test]
    fn test_empty_patch_keeps_defaults() {
        let opts = RecordingOptions::default().apply(&OptionsPatch::default());
        assert_eq!(opts, RecordingOptions::default());
    }

    #[test]
    fn test_shallow_merge_is_key_by_key() {
        let patch = OptionsPatch {
            split_timeout: Some(30.0),
            save_format: Some("mkv".into()),
            ..OptionsPatch::default()
        };
        let opts = RecordingOptions::default().apply(&patch);
        assert_eq!(opts.split_timeout, 30.0);
        assert_eq!(opts.save_format, "mkv");
        assert_eq!(opts.audio_codec, "copy");
        assert_eq!(opts.video_codec, "copy");
        assert_eq!(opts.save_filename_template, "record");
    }

    #[test]
    fn test_zero_split_timeout_disables_segmentation() {
        let patch = OptionsPatch {
            split_timeout: Some(0.0),
            ..OptionsPatch::default()
        };
        let opts = RecordingOptions::default().apply(&patch);
        assert!(!opts.segmented());

        let patch = OptionsPatch {
            split_timeout: Some(-1.0),
            ..OptionsPatch::default()
        };
        assert!(!RecordingOptions::default().apply(&patch).segmented());
    }

    #[test]
    fn test_patch_deserializes_from_camel_case() {
        let patch: OptionsPatch =
            serde_json::from_str(r#"{"splitTimeout": 30, "saveFormat": "mp4"}"#)
                .expect("valid patch json");
        assert_eq!(patch.split_timeout, Some(30.0));
        assert_eq!(patch.save_format.as_deref(), Some("mp4"));
        assert_eq!(patch.audio_codec, None);
    }
}
