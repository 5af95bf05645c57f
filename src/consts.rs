//! Project-wide constants.

/// Environment variable holding the scoring API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Default credential store, relative to the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default vision-capable model used for scoring.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default per-request timeout imposed by the CLI, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Default log directory.
pub const DEFAULT_LOG_DIR: &str = "logs";

pub const TASK1_TITLE: &str = "IELTS Writing Task 1 — Feedback";
pub const TASK2_TITLE: &str = "IELTS Writing Task 2 — Feedback";

/// Minimum trimmed essay length accepted by front ends.
pub const MIN_ESSAY_CHARS: usize = 30;

/// Minimum trimmed question length accepted by front ends.
pub const MIN_QUESTION_CHARS: usize = 10;

/// Mask a secret for display, keeping only the last four characters.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}
