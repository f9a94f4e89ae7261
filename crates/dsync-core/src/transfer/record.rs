//! Completion record for a verified transfer.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

const SIZE_SUFFIX: [&str; 5] = ["", "KB", "MB", "GB", "TB"];

/// Outcome of a transfer whose checksum matched the remote one.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRecord {
    /// Absolute source path.
    pub source: PathBuf,
    pub destination: PathBuf,
    /// pnfs id of the stored file.
    pub remote_id: String,
    /// Adler-32 computed while copying.
    pub checksum: String,
    /// Adler-32 as reported by the store.
    pub remote_checksum: String,
    pub size: u64,
    pub elapsed: Duration,
}

/// Field order of the JSON line is part of the output contract.
#[derive(Serialize)]
struct RecordLine<'a> {
    source: String,
    destination: String,
    remote_id: &'a str,
    checksum: &'a str,
    size: u64,
    size_human: String,
    elapsed_secs: f64,
    elapsed: String,
    throughput_human: String,
}

impl TransferRecord {
    /// Bytes per second; 0 if no time elapsed.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.size as f64 / secs
    }

    pub fn size_human(&self) -> String {
        human_size(self.size as f64)
    }

    pub fn throughput_human(&self) -> String {
        format!("{}/s", human_size(self.throughput()))
    }

    /// One JSON object on a single line.
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(&RecordLine {
            source: self.source.display().to_string(),
            destination: self.destination.display().to_string(),
            remote_id: &self.remote_id,
            checksum: &self.checksum,
            size: self.size,
            size_human: self.size_human(),
            elapsed_secs: self.elapsed.as_secs_f64(),
            elapsed: format_elapsed(self.elapsed),
            throughput_human: self.throughput_human(),
        })
    }
}

impl fmt::Display for TransferRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "copy of {} to {} complete: id={} adler32={} size={} ({}) in {} ({})",
            self.source.display(),
            self.destination.display(),
            self.remote_id,
            self.checksum,
            self.size,
            self.size_human(),
            format_elapsed(self.elapsed),
            self.throughput_human(),
        )
    }
}

/// Binary-prefix size, truncated to an integer: 8192 -> "8KB", 1536 -> "1KB".
/// Anything below one byte renders as "0"; units stop at TB.
pub fn human_size(n: f64) -> String {
    if !(n >= 1.0) {
        return "0".to_string();
    }
    let mut scaled = n;
    let mut unit = 0;
    while scaled >= 1024.0 && unit < SIZE_SUFFIX.len() - 1 {
        scaled /= 1024.0;
        unit += 1;
    }
    format!("{}{}", scaled.floor() as u64, SIZE_SUFFIX[unit])
}

/// `H:MM:SS.mmm`.
pub fn format_elapsed(d: Duration) -> String {
    let total = d.as_secs();
    format!(
        "{}:{:02}:{:02}.{:03}",
        total / 3600,
        (total / 60) % 60,
        total % 60,
        d.subsec_millis()
    )
}
