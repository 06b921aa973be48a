use crate::error::TransferError;
use crate::types::{TransferReport, TransferStatus, TransferSummary, TransferTask};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use log::error;
use std::future::Future;
use std::time::Instant;

/// What the executor does when a task's transfer function fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Record the failure and keep going; every enumerated task is attempted.
    #[default]
    ContinueOnError,
    /// Stop after the first recorded failure. Queued and in-flight work is
    /// dropped, so the summary may cover fewer tasks than were enumerated.
    AbortOnFirstError,
}

/// Runs transfer tasks with a fixed concurrency ceiling.
///
/// Tasks may complete in any order; a worker that finishes immediately picks
/// up the next pending task. No task depends on another's outcome.
pub struct Executor {
    max_workers: usize,
    policy: FailurePolicy,
}

impl Executor {
    pub fn new(max_workers: usize, policy: FailurePolicy) -> Self {
        Self {
            max_workers: max_workers.max(1),
            policy,
        }
    }

    /// Execute every task against `transfer_fn`, at most `max_workers` at a
    /// time, and aggregate per-task results. A single failure never cancels
    /// siblings under `ContinueOnError`.
    pub async fn run<F, Fut>(&self, tasks: Vec<TransferTask>, transfer_fn: F) -> TransferSummary
    where
        F: Fn(TransferTask) -> Fut,
        Fut: Future<Output = Result<(), TransferError>>,
    {
        let total = tasks.len();
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );

        let run_start = Instant::now();
        let mut reports = Vec::with_capacity(total);

        let mut transfers = futures::stream::iter(tasks.into_iter().map(|task| {
            let transfer = transfer_fn(task.clone());
            async move {
                let start = Instant::now();
                let result = transfer.await;
                (task, result, start.elapsed())
            }
        }))
        .buffer_unordered(self.max_workers);

        while let Some((task, result, duration)) = transfers.next().await {
            bar.inc(1);
            match result {
                Ok(()) => {
                    reports.push(TransferReport {
                        task,
                        status: TransferStatus::Success,
                        duration,
                        error: None,
                    });
                }
                Err(e) => {
                    error!("Transfer failed for {}: {}", task.source, e);
                    reports.push(TransferReport {
                        task,
                        status: TransferStatus::Failed,
                        duration,
                        error: Some(e.to_string()),
                    });
                    if self.policy == FailurePolicy::AbortOnFirstError {
                        break;
                    }
                }
            }
        }
        drop(transfers);
        bar.finish_and_clear();

        let succeeded = reports
            .iter()
            .filter(|r| r.status == TransferStatus::Success)
            .count();
        let failed = reports.len() - succeeded;

        TransferSummary {
            total,
            succeeded,
            failed,
            total_duration: run_start.elapsed(),
            reports,
        }
    }
}
