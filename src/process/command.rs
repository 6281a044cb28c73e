//! # Recorder invocation: output path and argument construction.
//!
//! [`RecorderCommand`] captures one complete recorder invocation: the binary,
//! the input url, the computed output path, and the resolved
//! [`RecordingOptions`]. It is a pure value; spawning happens in
//! [`ProcessHandle`](super::ProcessHandle).
//!
//! ## Output path
//! `<save_dir>/<template>[_%03d].<format>` — the `%03d` segment counter is
//! appended only when segmentation is enabled and the template does not
//! already embed a placeholder. Without segmentation the path is the literal
//! final file.
//!
//! ## Arguments
//! ```text
//! -y -i <url> -c:a <audio> -c:v <video> [-f segment -segment_time <n> -reset_timestamps 1] <output>
//! ```
//! `-reset_timestamps 1` restarts timestamps per segment so each chunk is
//! independently playable from time zero.

use std::path::{Path, PathBuf};

use crate::options::RecordingOptions;

/// One fully resolved recorder invocation.
#[derive(Clone, Debug)]
pub struct RecorderCommand {
    binary: PathBuf,
    url: String,
    output: PathBuf,
    options: RecordingOptions,
}

impl RecorderCommand {
    /// Builds an invocation, computing the output path from the options.
    pub fn new(
        binary: impl Into<PathBuf>,
        url: impl Into<String>,
        save_dir: impl AsRef<Path>,
        options: RecordingOptions,
    ) -> Self {
        let output = Self::output_path(save_dir.as_ref(), &options);
        Self {
            binary: binary.into(),
            url: url.into(),
            output,
            options,
        }
    }

    /// Returns the recorder binary path.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Returns the input url.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the computed output path (with `%03d` when segmented).
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Returns the resolved options this invocation was built from.
    pub fn options(&self) -> &RecordingOptions {
        &self.options
    }

    /// Builds the full argument vector for the recorder process.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-i".to_string(),
            self.url.clone(),
            "-c:a".to_string(),
            self.options.audio_codec.clone(),
            "-c:v".to_string(),
            self.options.video_codec.clone(),
        ];
        if self.options.segmented() {
            args.extend([
                "-f".to_string(),
                "segment".to_string(),
                "-segment_time".to_string(),
                format_seconds(self.options.split_timeout),
                "-reset_timestamps".to_string(),
                "1".to_string(),
            ]);
        }
        args.push(self.output.to_string_lossy().into_owned());
        args
    }

    fn output_path(save_dir: &Path, options: &RecordingOptions) -> PathBuf {
        let mut name = options.save_filename_template.clone();
        if options.segmented() && !name.contains("%0") {
            name.push_str("_%03d");
        }
        save_dir.join(format!("{name}.{}", options.save_format))
    }
}

/// Formats a duration in seconds without a trailing `.0` for whole values.
fn format_seconds(secs: f64) -> String {
    if secs.fract() == 0.0 {
        format!("{}", secs as u64)
    } else {
        secs.to_string()
    }
}
