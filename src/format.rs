//! Wraps reports into the markdown documents handed to front ends.

use std::fmt::Display;

use crate::normalize::normalize;

pub const ERROR_HEADING: &str = "## ❌ Error";

const ERROR_TIP: &str = "> Tip: Check your API key configuration, and verify your inputs.";

/// A titled feedback document. The body is scorer output and gets normalized.
pub fn success(title: &str, body: &str) -> String {
    format!("# {}\n\n{}", title, normalize(body))
}

/// The error document. The message is shown as-is, only its display text.
pub fn error(err: impl Display) -> String {
    format!("{ERROR_HEADING}\n\n{err}\n\n{ERROR_TIP}")
}
