//! # Progress snapshots parsed from recorder stderr.
//!
//! ffmpeg reports encoding statistics as periodic stderr lines:
//!
//! ```text
//! frame=  123 fps= 25 q=-1.0 size=    1024kB time=00:00:05.12 bitrate= 164.3kbits/s speed=1.02x
//! ```
//!
//! [`Progress::parse`] turns such a line into a typed [`Progress`] snapshot.
//! The snapshot format is producer-defined; consumers forward it verbatim in
//! `progress-reply` payloads and must treat it as opaque.

use serde::{Deserialize, Serialize};

/// One progress snapshot from a running recorder process.
///
/// Field names follow the stderr statistics they are parsed from. Percent
/// completion is intentionally absent: live sources have no known duration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Frames processed so far.
    pub frames: u64,
    /// Current encoding speed in frames per second.
    pub current_fps: f64,
    /// Current output bitrate in kbit/s, when reported.
    pub current_kbps: Option<f64>,
    /// Output size written so far in kB, when reported.
    pub target_size_kb: Option<u64>,
    /// Elapsed output timestamp (`HH:MM:SS.cc`).
    pub timemark: String,
}

impl Progress {
    /// Parses a recorder stderr line into a snapshot.
    ///
    /// Returns `None` for lines that are not statistics lines (a line
    /// qualifies only if it carries both `frame=` and `time=` fields).
    pub fn parse(line: &str) -> Option<Progress> {
        let compact = strip_value_padding(line);

        let mut frames: Option<u64> = None;
        let mut current_fps: Option<f64> = None;
        let mut current_kbps: Option<f64> = None;
        let mut target_size_kb: Option<u64> = None;
        let mut timemark: Option<String> = None;

        for token in compact.split_whitespace() {
            let Some((key, value)) = token.split_once('=') else {
                continue;
            };
            match key {
                "frame" => frames = value.parse().ok(),
                "fps" => current_fps = value.parse().ok(),
                "bitrate" => {
                    current_kbps = value.strip_suffix("kbits/s").and_then(|v| v.parse().ok());
                }
                // ffmpeg prints "size=" while running and "Lsize=" on the last line.
                "size" | "Lsize" => {
                    target_size_kb = value.strip_suffix("kB").and_then(|v| v.parse().ok());
                }
                "time" => timemark = Some(value.to_string()),
                _ => {}
            }
        }

        match (frames, timemark) {
            (Some(frames), Some(timemark)) => Some(Progress {
                frames,
                current_fps: current_fps.unwrap_or(0.0),
                current_kbps,
                target_size_kb,
                timemark,
            }),
            _ => None,
        }
    }
}

/// Removes the spaces ffmpeg pads between `=` and the value, so the line
/// splits cleanly into `key=value` tokens.
fn strip_value_padding(line: &str) -> String {
    let mut compact = String::with_capacity(line.len());
    let mut after_eq = false;
    for ch in line.chars() {
        if after_eq && ch == ' ' {
            continue;
        }
        after_eq = ch == '=';
        compact.push(ch);
    }
    compact
}
