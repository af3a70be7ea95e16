//! Human-readable titles from raw course filenames
//!
//! Course platforms export files with hash prefixes, percent-encoding, numeric
//! IDs, and content-type suffixes baked into the name. The outline and table of
//! contents want none of that. Extraction is best-effort: if any step produces
//! an empty or unusable result, we fall back to a whitespace-normalized
//! title-cased version of the raw name.

use std::path::Path;
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

/// Words kept lower-case inside extracted titles (never as the first word).
const TITLE_STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "but", "or", "for", "nor", "on", "at", "to", "from", "by", "with",
    "in", "of", "vs",
];

static HASH_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]{15,25}[\s_-]+").expect("valid regex"));
static NUMERIC_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.-]").expect("valid regex"));
static ID_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}\s+\d{8}\b[-\s]*").expect("valid regex"));
static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\s+").expect("valid regex"));
static TYPE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(html?|pdf|md|markdown|text|summary)$").expect("valid regex"));
static WEEK_MODULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(week|module)\s+\d+\b").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static DIR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("valid regex"));

/// Extract a readable title from a raw filename.
pub fn extract_title(filename: &str) -> String {
    match try_extract_title(filename) {
        Some(title) if !title.is_empty() => title,
        _ => fallback_title(filename),
    }
}

fn try_extract_title(filename: &str) -> Option<String> {
    let stem = Path::new(filename).file_stem()?.to_str()?;

    // Percent-decode first so %20 and friends become real characters
    let decoded = percent_decode_str(stem)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| stem.to_string());

    let mut cleaned = HASH_PREFIX.replace(&decoded, "").into_owned();
    cleaned = NUMERIC_PREFIX.replace(&cleaned, "").into_owned();
    cleaned = ID_PAIR.replace_all(&cleaned, "").into_owned();
    cleaned = LEADING_NUMBER.replace(&cleaned, "").into_owned();

    cleaned = cleaned.replace(['-', '_', '.'], " ");

    // Smart punctuation, decoded or still doubly-encoded, becomes plain ASCII
    cleaned = cleaned
        .replace("%e2%80%99", "'")
        .replace("%e2%80%98", "'")
        .replace("%e2%80%9c", "\"")
        .replace("%e2%80%9d", "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace(['\u{201c}', '\u{201d}'], "\"");

    cleaned = TYPE_SUFFIX.replace(&cleaned, "").into_owned();
    cleaned = WEEK_MODULE.replace_all(&cleaned, "").into_owned();
    cleaned = WHITESPACE.replace_all(&cleaned, " ").trim().to_string();

    if cleaned.is_empty() {
        return None;
    }

    Some(title_case(&cleaned, TITLE_STOP_WORDS))
}

/// Whitespace-normalized title case of the raw name, used when extraction fails.
fn fallback_title(filename: &str) -> String {
    let cleaned = filename.replace(['_', '.', '-'], " ");
    cleaned
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clean a directory name for display: strip the numeric prefix, replace
/// separators, capitalize every word.
pub fn clean_display_name(name: &str) -> String {
    let cleaned = DIR_PREFIX.replace(name, "").into_owned();
    let cleaned = cleaned.replace(['-', '_'], " ");

    let words: Vec<String> = cleaned.split_whitespace().map(capitalize).collect();
    if words.is_empty() {
        name.to_string()
    } else {
        words.join(" ")
    }
}

/// Title-case `text`, lower-casing stop words except in first position.
pub fn title_case(text: &str, stop_words: &[&str]) -> String {
    text.split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i > 0 && stop_words.contains(&lower.as_str()) {
                lower
            } else {
                capitalize(word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Title-case a course display name.
pub fn title_case_course(name: &str) -> String {
    // Course names keep "vs" capitalized, unlike content titles
    const COURSE_STOP_WORDS: &[&str] = &[
        "a", "an", "the", "and", "but", "or", "for", "nor", "on", "at", "to", "from", "by",
        "with", "in", "of",
    ];
    title_case(name, COURSE_STOP_WORDS)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title_simple() {
        assert_eq!(extract_title("welcome.md"), "Welcome");
        assert_eq!(extract_title("getting-started.html"), "Getting Started");
    }

    #[test]
    fn test_extract_title_strips_numeric_prefix() {
        assert_eq!(extract_title("01.intro-to-the-course.md"), "Intro to the Course");
    }

    #[test]
    fn test_extract_title_strips_hash_prefix() {
        assert_eq!(
            extract_title("q2jgdeessmmkkywkpvnz_building-better-habits.pdf"),
            "Building Better Habits"
        );
    }

    #[test]
    fn test_extract_title_percent_decoding() {
        assert_eq!(extract_title("What%20Comes%20Next.html"), "What Comes Next");
    }

    #[test]
    fn test_extract_title_smart_quotes() {
        assert_eq!(extract_title("carol%e2%80%99s-story.md"), "Carol's Story");
    }

    #[test]
    fn test_extract_title_drops_type_suffix_and_week() {
        assert_eq!(extract_title("breathing-exercises-week 3.html"), "Breathing Exercises");
        assert_eq!(extract_title("notes_summary.md"), "Notes");
    }

    #[test]
    fn test_extract_title_stop_words() {
        assert_eq!(extract_title("the-power-of-habit.md"), "The Power of Habit");
        assert_eq!(extract_title("theory-vs-practice.md"), "Theory vs Practice");
    }

    #[test]
    fn test_extract_title_fallback_on_empty_result() {
        // Everything is stripped away, so the raw name is title-cased instead
        assert_eq!(extract_title("pdf.pdf"), "Pdf Pdf");
    }

    #[test]
    fn test_clean_display_name() {
        assert_eq!(clean_display_name("3. advanced-topics"), "Advanced Topics");
        assert_eq!(clean_display_name("extras"), "Extras");
        assert_eq!(clean_display_name("12.weekly_calls"), "Weekly Calls");
    }

    #[test]
    fn test_title_case_course() {
        assert_eq!(
            title_case_course("reclaiming your life in the new year"),
            "Reclaiming Your Life in the New Year"
        );
    }
}
