//! The single seam front ends use to reach the scoring workflows.
//!
//! Both entry points always return a markdown document: feedback on success,
//! the error document otherwise. Nothing is retried.

use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::io;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::adapter::Adapter;
use crate::consts::{TASK1_TITLE, TASK2_TITLE};
use crate::format;

pub struct Pipeline {
    adapter: Adapter,
}

impl Pipeline {
    pub fn new(adapter: Adapter) -> Self {
        Self { adapter }
    }

    pub async fn analyze_task1(&self, image: &Path, essay: &str) -> String {
        info!("pipeline: analyze_task1");
        let started = Instant::now();
        let outcome = AssertUnwindSafe(self.adapter.task1(image, essay))
            .catch_unwind()
            .await;
        render("Task 1", TASK1_TITLE, started, outcome)
    }

    pub async fn analyze_task2(&self, question: &str, essay: &str) -> String {
        info!("pipeline: analyze_task2");
        let started = Instant::now();
        let outcome = AssertUnwindSafe(self.adapter.task2(question, essay))
            .catch_unwind()
            .await;
        render("Task 2", TASK2_TITLE, started, outcome)
    }
}

fn render(
    task: &str,
    title: &str,
    started: Instant,
    outcome: Result<anyhow::Result<String>, Box<dyn Any + Send>>,
) -> String {
    match outcome {
        Ok(Ok(report)) => {
            info!(elapsed_ms = started.elapsed().as_millis() as u64, "{task} scored");
            format::success(title, &report)
        }
        Ok(Err(e)) => {
            let message = format!("{e:#}");
            warn!(error = %message, "{task} scoring failed");
            format::error(message)
        }
        Err(panic) => {
            let message = format!("scorer crashed: {}", panic_message(panic.as_ref()));
            warn!(error = %message, "{task} scoring panicked");
            format::error(message)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

/// Race one analysis against `limit` and an interrupt signal, turning either
/// into an error document. An interrupt that resolves with `Err` (the signal
/// could not be installed) is ignored.
pub async fn bounded(
    limit: Duration,
    work: impl Future<Output = String>,
    interrupt: impl Future<Output = io::Result<()>>,
) -> String {
    tokio::select! {
        result = tokio::time::timeout(limit, work) => match result {
            Ok(doc) => doc,
            Err(_) => {
                warn!(secs = limit.as_secs(), "scoring timed out");
                format::error(format!("scoring timed out after {} seconds", limit.as_secs()))
            }
        },
        Ok(()) = interrupt => {
            warn!("scoring interrupted");
            format::error("scoring interrupted")
        }
    }
}
