//! Emoji classification
//!
//! A string is an emoji when it consists entirely of emoji sequences: single
//! pictographs, variation-selector and skin-tone forms, zero-width-joiner
//! sequences, regional-indicator flags, keycaps and tag sequences.
//!
//! Pictographs whose default presentation is text (`©`, `™`, `↔`) only count
//! when followed by U+FE0F or a skin-tone modifier, or inside a ZWJ sequence.
//!
//! Consecutive independent emoji (`😂😂`) also classify as emoji. Callers use
//! this to decide whether a token is icon-like, not whether it is exactly one
//! glyph.

use regex::Regex;
use std::sync::OnceLock;

static EMOJI_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
static EMOJI_RUN_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

const FLAG: &str = r"[\x{1F1E6}-\x{1F1FF}]{2}";
const KEYCAP: &str = r"[0-9#*]\x{FE0F}?\x{20E3}";

/// A pictograph that renders as emoji on its own
const PRESENTED: &str = concat!(
    r"(?:\p{Emoji_Presentation}",
    r"(?:[\x{E0020}-\x{E007E}]+\x{E007F})?",
    r"[\x{FE0E}\x{FE0F}]?[\x{1F3FB}-\x{1F3FF}]?\x{FE0F}?",
    r"|\p{Extended_Pictographic}",
    r"(?:\x{FE0F}[\x{1F3FB}-\x{1F3FF}]?|[\x{1F3FB}-\x{1F3FF}])\x{FE0F}?)",
);

/// Any pictograph, as it may appear joined by ZWJ
const PART: &str = concat!(
    r"(?:\p{Extended_Pictographic}|\p{Emoji_Presentation})",
    r"[\x{FE0E}\x{FE0F}]?[\x{1F3FB}-\x{1F3FF}]?\x{FE0F}?",
);

fn element_pattern() -> String {
    format!(
        r"(?:{FLAG}|{KEYCAP}|{PRESENTED}(?:\x{{200D}}{PART})*|{PART}(?:\x{{200D}}{PART})+)"
    )
}

fn get_emoji_pattern() -> Option<&'static Regex> {
    EMOJI_PATTERN
        .get_or_init(|| compile(&format!("^(?:{})+$", element_pattern())))
        .as_ref()
}

fn get_emoji_run_pattern() -> Option<&'static Regex> {
    EMOJI_RUN_PATTERN
        .get_or_init(|| compile(&format!("(?:{})+", element_pattern())))
        .as_ref()
}

fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            log::error!("Failed to compile emoji pattern: {}", e);
            None
        }
    }
}

/// Whether `input` is made up entirely of emoji sequences.
pub fn is_emoji(input: &str) -> bool {
    if input.is_empty() || input.is_ascii() {
        return false;
    }

    get_emoji_pattern().is_some_and(|re| re.is_match(input))
}

/// Byte ranges of the emoji runs contained in `text`.
pub fn find_emoji_runs(text: &str) -> Vec<std::ops::Range<usize>> {
    if text.is_ascii() {
        return Vec::new();
    }

    match get_emoji_run_pattern() {
        Some(re) => re.find_iter(text).map(|m| m.range()).collect(),
        None => Vec::new(),
    }
}
