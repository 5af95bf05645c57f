pub mod mock;
pub mod rubric;

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;

/// Task 1 input: the chart as a self-contained data URL plus the essay.
#[derive(Debug, Clone, PartialEq)]
pub struct Task1Input {
    pub image_data_url: String,
    pub essay: String,
}

/// Task 2 input: the prompt the student answered plus the essay.
#[derive(Debug, Clone, PartialEq)]
pub struct Task2Input {
    pub question: String,
    pub essay: String,
}

/// What a scoring workflow hands back. Callers only ever see it as text.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Text(String),
    Structured(serde_json::Value),
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Text(text) => f.write_str(text),
            Report::Structured(value) => match serde_json::to_string_pretty(value) {
                Ok(pretty) => f.write_str(&pretty),
                Err(_) => write!(f, "{value}"),
            },
        }
    }
}

impl From<String> for Report {
    fn from(text: String) -> Self {
        Report::Text(text)
    }
}

impl From<&str> for Report {
    fn from(text: &str) -> Self {
        Report::Text(text.to_string())
    }
}

/// The external evaluation workflow for one task type. Opaque and fallible:
/// network, credential and quota problems all surface as errors.
#[async_trait]
pub trait Scorer<I: Sync>: Send + Sync {
    async fn score(&self, input: &I) -> Result<Report>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_report_displays_verbatim() {
        let report = Report::from("Band 6.5\n");
        assert_eq!(report.to_string(), "Band 6.5\n");
    }

    #[test]
    fn structured_report_displays_as_json() {
        let report = Report::Structured(serde_json::json!({"overall": 7.0}));
        let text = report.to_string();
        assert!(text.contains("\"overall\""));
        assert!(text.contains("7.0"));
    }
}
