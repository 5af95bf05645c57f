//! Typed errors for the two failures callers need to tell apart.
//!
//! Everything else (scoring workflow failures, I/O while persisting the
//! credential) travels as `anyhow::Error`.

use thiserror::Error;

/// Bad user input, caught by a front end before anything is scored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no API key found. Run `ielts-coach key set` or set {var}.")]
    MissingApiKey { var: &'static str },

    #[error("please provide the Task 1 image, chart or graph")]
    MissingImage,

    #[error("please paste your full essay (at least {min} characters)")]
    EssayTooShort { min: usize },

    #[error("please paste the Task 2 question (at least {min} characters)")]
    QuestionTooShort { min: usize },
}

/// Failures raised by the adapter before the scoring workflow is called.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// Only the file name is kept so rendered errors never leak directories.
    #[error("image not found: {name}")]
    ImageNotFound { name: String },
}

impl AdapterError {
    pub fn image_not_found(path: &std::path::Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "<unnamed>".to_string());
        AdapterError::ImageNotFound { name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn image_not_found_hides_directories() {
        let err = AdapterError::image_not_found(Path::new("/home/someone/uploads/chart.png"));
        assert_eq!(err.to_string(), "image not found: chart.png");
    }

    #[test]
    fn missing_api_key_names_the_variable() {
        let err = ValidationError::MissingApiKey {
            var: "OPENAI_API_KEY",
        };
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn essay_too_short_mentions_minimum() {
        let err = ValidationError::EssayTooShort { min: 30 };
        assert!(err.to_string().contains("30"));
    }
}
