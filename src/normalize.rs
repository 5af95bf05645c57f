//! Turns raw scorer output into readable markdown.
//!
//! Reports come back as plain text that may carry terminal colour codes,
//! `---- Title ----` banners and `1. Label:` lines. The passes below run in a
//! fixed order because each one works on the output of the previous.
//!
//! Banners whose title contains a dash, runs past 80 characters or is only
//! whitespace are left untouched.

use regex::Regex;
use std::sync::LazyLock;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]").expect("valid ansi pattern"));

static BANNER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*-{3,}[ \t]*([^-\s][^-\n]{0,79}?)[ \t]*-{3,}[ \t]*$")
        .expect("valid banner pattern")
});

static NUMBERED_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(\d+)\.[ \t]+([^:\n]+):").expect("valid label pattern")
});

static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid newline pattern"));

/// Run every pass and trim the result.
pub fn normalize(raw: &str) -> String {
    let text = strip_ansi(raw);
    let text = unix_line_endings(&text);
    let text = banners_to_headings(&text);
    let text = bold_numbered_labels(&text);
    let text = collapse_blank_lines(&text);
    text.trim().to_string()
}

/// Remove CSI escape sequences (`ESC [ ... final`).
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// CRLF becomes LF so the line-anchored passes see every line end.
pub fn unix_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// `---- Title ----` becomes `## Title` followed by a blank line.
pub fn banners_to_headings(text: &str) -> String {
    BANNER.replace_all(text, "## ${1}\n").into_owned()
}

/// `2. Coherence:` at the start of a line becomes `**2. Coherence:**`.
pub fn bold_numbered_labels(text: &str) -> String {
    NUMBERED_LABEL
        .replace_all(text, "**${1}. ${2}:**")
        .into_owned()
}

/// Three or more consecutive newlines collapse to one blank line.
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUN.replace_all(text, "\n\n").into_owned()
}
