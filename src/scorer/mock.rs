use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

use super::{Report, Scorer};

/// A scripted scorer for tests. Replies with a fixed report or fails with a
/// fixed message, and remembers every input it was given.
pub struct MockScorer<I> {
    outcome: std::result::Result<Report, String>,
    seen: Mutex<Vec<I>>,
}

impl<I> MockScorer<I> {
    pub fn reply(report: impl Into<Report>) -> Self {
        Self {
            outcome: Ok(report.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl<I: Clone> MockScorer<I> {
    /// Inputs received so far, oldest first.
    pub fn inputs(&self) -> Vec<I> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl<I> Scorer<I> for MockScorer<I>
where
    I: Clone + Send + Sync,
{
    async fn score(&self, input: &I) -> Result<Report> {
        self.seen.lock().unwrap().push(input.clone());
        match &self.outcome {
            Ok(report) => Ok(report.clone()),
            Err(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}
