//! Text cleaning stages that run before sentence segmentation.
//!
//! ```text
//! raw ──▶ strip_headers ──▶ normalize ──▶ extract_script ──▶ segment
//! ```
//!
//! Every stage is a pure `&str -> String` transform. None of them fail; the
//! worst case is an empty string, which the ingestion orchestrator reports.

use regex::Regex;
use std::sync::LazyLock;

use crate::charset;

/// Lines shorter than this (in chars, after trimming) are dropped as
/// extraction artifacts.
const MIN_LINE_CHARS: usize = 5;

/// Private-use placeholders standing in for `.\n` and `።\n` while
/// whitespace is collapsed. Neither is whitespace nor a noise symbol.
/// Occurrences already present in the input are removed first.
const LATIN_STOP_NEWLINE: &str = "\u{E000}";
const ETHIOPIC_STOP_NEWLINE: &str = "\u{E001}";
const LATIN_STOP_NEWLINE_CHAR: char = '\u{E000}';
const ETHIOPIC_STOP_NEWLINE_CHAR: char = '\u{E001}';

static NUMERIC_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s*$").expect("numeric line pattern is valid"));

static NOISE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    let class: String = charset::NOISE_SYMBOLS
        .iter()
        .map(|c| regex::escape(&c.to_string()))
        .collect();
    Regex::new(&format!("[{}]+", class)).expect("noise symbol class is valid")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Remove page numbers and short artifact lines.
///
/// A line is dropped when it is purely numeric (surrounding whitespace
/// allowed) or when it has fewer than five characters after trimming.
/// Surviving lines are re-joined with `\n`.
pub fn strip_headers(text: &str) -> String {
    text.split('\n')
        .filter(|line| {
            !NUMERIC_LINE.is_match(line) && line.trim().chars().count() >= MIN_LINE_CHARS
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalize whitespace and strip symbol noise.
///
/// Order matters: sentence-final newlines are protected first, symbols are
/// replaced by spaces, whitespace is collapsed, the newlines are restored,
/// and finally lone Ethiopic glyphs are dropped. The result is trimmed.
///
/// Running `normalize` on its own output returns the same string.
pub fn normalize(text: &str) -> String {
    let protected = text
        .replace([LATIN_STOP_NEWLINE_CHAR, ETHIOPIC_STOP_NEWLINE_CHAR], "")
        .replace(".\n", LATIN_STOP_NEWLINE)
        .replace("\u{1362}\n", ETHIOPIC_STOP_NEWLINE);

    let stripped = NOISE_RUN.replace_all(&protected, " ");
    let collapsed = WHITESPACE_RUN.replace_all(&stripped, " ");

    let restored = collapsed
        .replace(LATIN_STOP_NEWLINE, ".\n")
        .replace(ETHIOPIC_STOP_NEWLINE, "\u{1362}\n");

    drop_lone_glyphs(&restored).trim().to_string()
}

/// Keep only Ethiopic script, ASCII digits, whitespace and the allowed
/// punctuation, in original order. Returns an empty string when nothing
/// survives.
pub fn extract_script(text: &str) -> String {
    let kept: String = text.chars().filter(|&c| charset::is_allowed(c)).collect();
    kept.trim().to_string()
}

/// Drop single-glyph Ethiopic tokens. Tokens are separated by any
/// whitespace; each kept token keeps the separator that follows it, so a
/// restored `\n` survives even when the next token is dropped.
fn drop_lone_glyphs(text: &str) -> String {
    text.split_inclusive(char::is_whitespace)
        .filter(|piece| {
            let token = piece.trim_end_matches(char::is_whitespace);
            !token.is_empty() && !is_lone_glyph(token)
        })
        .collect()
}

fn is_lone_glyph(token: &str) -> bool {
    let mut chars = token.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if charset::is_ethiopic(c))
}
