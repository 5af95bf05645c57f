//! Input validation done by front ends before anything reaches the pipeline.

use std::path::{Path, PathBuf};

use crate::config::KeyStore;
use crate::consts::{API_KEY_VAR, MIN_ESSAY_CHARS, MIN_QUESTION_CHARS};
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq)]
pub struct Task1Submission {
    pub image: PathBuf,
    pub essay: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task2Submission {
    pub question: String,
    pub essay: String,
}

impl Task1Submission {
    pub fn new(image: Option<PathBuf>, essay: &str) -> Result<Self, ValidationError> {
        let image = image
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ValidationError::MissingImage)?;
        Ok(Self {
            image,
            essay: check_essay(essay)?,
        })
    }

    pub fn image(&self) -> &Path {
        &self.image
    }
}

impl Task2Submission {
    pub fn new(question: &str, essay: &str) -> Result<Self, ValidationError> {
        let question = question.trim();
        if question.chars().count() < MIN_QUESTION_CHARS {
            return Err(ValidationError::QuestionTooShort {
                min: MIN_QUESTION_CHARS,
            });
        }
        Ok(Self {
            question: question.to_string(),
            essay: check_essay(essay)?,
        })
    }
}

/// Scoring without a key only ever produces an error document, so refuse early.
pub fn require_api_key(keys: &KeyStore) -> Result<(), ValidationError> {
    if keys.has(API_KEY_VAR) {
        Ok(())
    } else {
        Err(ValidationError::MissingApiKey { var: API_KEY_VAR })
    }
}

fn check_essay(essay: &str) -> Result<String, ValidationError> {
    let essay = essay.trim();
    if essay.chars().count() < MIN_ESSAY_CHARS {
        return Err(ValidationError::EssayTooShort {
            min: MIN_ESSAY_CHARS,
        });
    }
    Ok(essay.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ESSAY: &str = "The chart shows a steady rise in coffee consumption between 1990 and 2010.";

    #[test]
    fn task1_requires_image() {
        assert_eq!(
            Task1Submission::new(None, ESSAY),
            Err(ValidationError::MissingImage)
        );
        assert_eq!(
            Task1Submission::new(Some(PathBuf::new()), ESSAY),
            Err(ValidationError::MissingImage)
        );
    }

    #[test]
    fn task1_rejects_short_essay() {
        let err = Task1Submission::new(Some(PathBuf::from("chart.png")), "   too short   ").unwrap_err();
        assert_eq!(err, ValidationError::EssayTooShort { min: MIN_ESSAY_CHARS });
    }

    #[test]
    fn task1_trims_essay() {
        let sub = Task1Submission::new(Some(PathBuf::from("chart.png")), &format!("\n {ESSAY} \n")).unwrap();
        assert_eq!(sub.essay, ESSAY);
        assert_eq!(sub.image(), Path::new("chart.png"));
    }

    #[test]
    fn task2_rejects_short_question() {
        let err = Task2Submission::new("Agree?", ESSAY).unwrap_err();
        assert_eq!(err, ValidationError::QuestionTooShort { min: MIN_QUESTION_CHARS });
    }

    #[test]
    fn task2_rejects_empty_essay() {
        let err = Task2Submission::new("Should community service be compulsory?", "").unwrap_err();
        assert!(matches!(err, ValidationError::EssayTooShort { .. }));
    }

    #[test]
    fn task2_accepts_valid_input() {
        let sub = Task2Submission::new("Should community service be compulsory?", ESSAY).unwrap();
        assert_eq!(sub.question, "Should community service be compulsory?");
    }

    #[test]
    fn essay_length_counts_characters_not_bytes() {
        let essay = "é".repeat(MIN_ESSAY_CHARS - 1);
        assert!(check_essay(&essay).is_err());
    }

    #[test]
    fn require_api_key_reads_store() {
        let dir = tempfile::tempdir().unwrap();
        let keys = KeyStore::open(dir.path().join(".env")).unwrap();
        keys.set(API_KEY_VAR, "sk-test").unwrap();
        assert!(require_api_key(&keys).is_ok());
    }
}
