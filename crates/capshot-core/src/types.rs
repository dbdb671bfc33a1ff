//! Core data types shared across the captioning pipeline.

use serde::Serialize;
use std::path::PathBuf;

/// An image that needs a caption, produced by the directory scan.
///
/// A task exists only for images without a sidecar; it is consumed exactly
/// once and yields exactly one [`CaptionResult`].
#[derive(Debug, Clone)]
pub struct ImageTask {
    /// Full path to the image file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl ImageTask {
    /// The file name component, for progress display and failure reports.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

/// Outcome of captioning a single image, retries included.
#[derive(Debug, Clone)]
pub enum CaptionResult {
    /// The endpoint produced a caption
    Success {
        /// Caption text as returned, without the configured prefix
        caption: String,
        /// Round-trip latency of the winning attempt in milliseconds
        latency_ms: u64,
    },
    /// Every attempt failed, or the failure was permanent
    Failure {
        /// Human-readable reason recorded in the run summary
        reason: String,
    },
}

/// A single failed task, preserved in submission order.
#[derive(Debug, Clone, Serialize)]
pub struct TaskFailure {
    /// File name of the image that failed
    pub file: String,
    /// Why the task failed
    pub reason: String,
}

/// Aggregate counts for a batch run.
///
/// Every processed task is reflected in exactly one of `succeeded`/`failed`,
/// and `total` is always their sum.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Tasks processed this run
    pub total: usize,
    /// Tasks that produced a persisted sidecar
    pub succeeded: usize,
    /// Tasks that failed after retries or permanently
    pub failed: usize,
    /// Ordered (file, reason) pairs for every failed task
    pub failures: Vec<TaskFailure>,
}

impl RunSummary {
    pub fn record_success(&mut self) {
        self.total += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self, file: impl Into<String>, reason: impl Into<String>) {
        self.total += 1;
        self.failed += 1;
        self.failures.push(TaskFailure {
            file: file.into(),
            reason: reason.into(),
        });
    }

    /// Whether the run should exit successfully.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
