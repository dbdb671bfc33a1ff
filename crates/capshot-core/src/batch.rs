//! The batch run: scan, caption sequentially, persist, summarize.
//!
//! Strictly one in-flight request at a time; the hosted endpoint is a
//! shared resource.

use std::path::Path;

use crate::config::Config;
use crate::error::CapshotError;
use crate::remote::{CaptionEndpoint, Captioner, RetryOptions};
use crate::scan::CaptionScanner;
use crate::sidecar;
use crate::types::{CaptionResult, RunSummary};

/// Progress events surfaced to the caller during a run.
///
/// Delivered strictly in task order; every started task is finished before
/// the next one starts.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// A task is about to be submitted
    TaskStarted {
        index: usize,
        total: usize,
        path: &'a Path,
    },
    /// A task has been resolved and recorded
    TaskFinished {
        index: usize,
        total: usize,
        path: &'a Path,
        result: &'a CaptionResult,
    },
}

/// Drives the scan → caption → persist pipeline over a directory.
pub struct BatchRunner {
    scanner: CaptionScanner,
    captioner: Captioner,
    prefix: String,
    prompt: Option<String>,
}

impl BatchRunner {
    /// Assemble a runner from config and an endpoint transport.
    pub fn new(config: &Config, endpoint: Box<dyn CaptionEndpoint>) -> Self {
        Self {
            scanner: CaptionScanner::new(config.scan.clone()),
            captioner: Captioner::new(
                endpoint,
                RetryOptions {
                    max_attempts: config.retry.max_attempts,
                    base_delay_ms: config.retry.base_delay_ms,
                },
            ),
            prefix: config.caption.prefix.clone(),
            prompt: config.caption.prompt.clone(),
        }
    }

    /// Caption every uncaptioned image under `dir`, in scan order.
    ///
    /// Per-image failures are recorded and never abort the batch; only a
    /// missing directory fails the run outright. Returns the aggregate
    /// summary — the caller decides the exit status from it.
    pub async fn run<F>(&self, dir: &Path, mut on_event: F) -> Result<RunSummary, CapshotError>
    where
        F: FnMut(BatchEvent<'_>),
    {
        let tasks = self.scanner.find_uncaptioned(dir)?;
        let mut summary = RunSummary::default();

        if tasks.is_empty() {
            tracing::info!("No images need captions in {:?}", dir);
            return Ok(summary);
        }
        tracing::info!("Found {} image(s) to caption in {:?}", tasks.len(), dir);

        let total = tasks.len();
        for (index, task) in tasks.iter().enumerate() {
            on_event(BatchEvent::TaskStarted {
                index,
                total,
                path: &task.path,
            });

            let mut result = self
                .captioner
                .caption_file(&task.path, self.prompt.as_deref())
                .await;

            // A caption we cannot persist is a failed task, not a success
            if let CaptionResult::Success { caption, .. } = &result {
                if let Err(e) = sidecar::write_caption(&task.path, &self.prefix, caption) {
                    result = CaptionResult::Failure {
                        reason: format!("Failed to write sidecar: {e}"),
                    };
                }
            }

            match &result {
                CaptionResult::Success { latency_ms, .. } => {
                    tracing::debug!("Captioned {} in {latency_ms}ms", task.file_name());
                    summary.record_success();
                }
                CaptionResult::Failure { reason } => {
                    tracing::error!("Failed: {} - {reason}", task.file_name());
                    summary.record_failure(task.file_name(), reason.clone());
                }
            }

            on_event(BatchEvent::TaskFinished {
                index,
                total,
                path: &task.path,
                result: &result,
            });
        }

        Ok(summary)
    }
}
