//! Input normalization for free-text form fields.
//!
//! Forms are filled in a hurry, often on a phone, so names arrive in any
//! case, DNIs with dots or spaces and drug names with stray markup. These
//! helpers turn raw input into the canonical stored form.

use std::sync::LazyLock;

use regex::Regex;

/// Upper bound for drug names after cleanup.
pub const MAX_MEDICATION_LEN: usize = 200;

/// Upper bound for doses and clinical observations after cleanup.
pub const MAX_CLINICAL_TEXT_LEN: usize = 500;

/// Upper bound for the closing epicrisis after cleanup.
pub const MAX_EPICRISIS_LEN: usize = 4000;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[^>]+(>|$)").expect("valid regex"));

static ACRONYM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9/\-]+$").expect("valid regex"));

/// Route abbreviations and gases that stay upper-case inside drug names.
const UPPER_CASE_TOKENS: &[&str] = &["IV", "IM", "SC", "PO", "PR", "O2", "O₂"];

/// Articles and prepositions kept lower-case in institution names.
const INSTITUTION_LOWER_WORDS: &[&str] = &[
    "de", "del", "la", "las", "el", "los", "y", "e", "o", "u", "en", "con", "por", "para",
];

/// Trim and collapse runs of whitespace into single spaces.
pub fn clean_text(raw: &str) -> String {
    WHITESPACE_RE.replace_all(raw.trim(), " ").into_owned()
}

/// Strip markup and control characters, collapse whitespace and cap length.
///
/// Returns `None` when nothing is left.
pub fn sanitize_text(raw: &str, max_len: usize) -> Option<String> {
    let without_tags = HTML_TAG_RE.replace_all(raw, " ");
    let without_controls: String = without_tags
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let cleaned = clean_text(&without_controls);
    if cleaned.is_empty() {
        return None;
    }
    Some(truncate_chars(&cleaned, max_len))
}

/// Clean text and upper-case it (procedure kinds and descriptions).
pub fn upper_clean(raw: &str) -> String {
    clean_text(raw).to_uppercase()
}

/// Capitalize each word of a personal or place name.
///
/// Hyphenated and apostrophe-joined parts are capitalized independently:
/// `"maría-JOSÉ o'neil"` becomes `"María-José O'Neil"`.
pub fn capitalize_name(raw: &str) -> String {
    clean_text(raw)
        .split(' ')
        .map(|word| {
            word.split('-')
                .map(|part| {
                    part.split('\'')
                        .map(capitalize_first)
                        .collect::<Vec<_>>()
                        .join("'")
                })
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Institution names: capitalized words, articles and prepositions lower-case.
pub fn format_institution(raw: &str) -> String {
    clean_text(raw)
        .split(' ')
        .map(|word| {
            let lower = word.to_lowercase();
            if INSTITUTION_LOWER_WORDS.contains(&lower.as_str()) {
                lower
            } else {
                capitalize_first(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep only the digits of a DNI.
pub fn format_dni(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Normalize spacing in a phone number, keeping its punctuation.
pub fn format_phone(raw: &str) -> String {
    clean_text(raw)
}

/// Emails are compared and stored lower-case.
pub fn format_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalize a drug name.
///
/// Markup is removed, the length is capped, route abbreviations and tokens
/// that are already all caps/digits (e.g. `"B12"`, `"AAS"`) stay upper-case
/// and every other word is capitalized.
pub fn format_medication(raw: &str) -> Option<String> {
    let cleaned = sanitize_text(raw, MAX_MEDICATION_LEN)?;
    let formatted = cleaned
        .split(' ')
        .map(|word| {
            let upper = word.to_uppercase();
            if UPPER_CASE_TOKENS.contains(&upper.as_str()) || ACRONYM_RE.is_match(word) {
                upper
            } else {
                capitalize_first(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    Some(formatted)
}

/// Treat blank strings as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn truncate_chars(value: &str, max_len: usize) -> String {
    if value.chars().count() <= max_len {
        return value.to_string();
    }
    value.chars().take(max_len).collect::<String>().trim_end().to_string()
}
