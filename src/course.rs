//! Typed course metadata
//!
//! The fetch service leaves an optional JSON sidecar next to the downloads
//! directory. Its shape varies between exports (flat fields, or everything
//! nested under a `"course"` object), so the lookup is resolved once here into
//! an explicit struct instead of being re-probed at every access site.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::titles;

/// Ordered cover-image candidates; the first one that exists wins.
const COVER_IMAGE_CANDIDATES: &[&str] = &[
    "course_image.jpg",
    "cover.jpg",
    "cover.png",
    "thumbnail.jpg",
    "thumbnail.png",
];

/// A divider-subtitle rule: when `pattern` occurs in the raw directory name
/// (case-insensitively), the module title becomes `template` with `{title}`
/// replaced by the cleaned name. Rules are evaluated in order.
#[derive(Debug, Clone)]
pub struct DescriptionRule {
    pub pattern: String,
    pub template: String,
}

/// An injected, ordered table of naming rules. Matching is data, not code.
#[derive(Debug, Clone, Default)]
pub struct DescriptionRules {
    rules: Vec<DescriptionRule>,
}

impl DescriptionRules {
    pub fn new(rules: Vec<DescriptionRule>) -> Self {
        Self { rules }
    }

    /// Apply the first matching rule to a raw directory name, if any.
    pub fn apply(&self, raw_name: &str, cleaned: &str) -> Option<String> {
        let raw_lower = raw_name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| raw_lower.contains(&rule.pattern.to_lowercase()))
            .map(|rule| rule.template.replace("{title}", cleaned))
    }
}

/// Course metadata used by the cover page and output naming.
#[derive(Debug, Clone, Default)]
pub struct CourseMeta {
    pub id: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub cover_image: Option<PathBuf>,
    pub divider_rules: DescriptionRules,
}

impl CourseMeta {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// The display title for the cover page, title-cased; the course id when
    /// no better name is known.
    pub fn display_title(&self) -> String {
        let raw = self.title.as_deref().unwrap_or(&self.id);
        titles::title_case_course(&raw.replace(['-', '_'], " "))
    }

    /// Build metadata for a course directory, reading the JSON sidecar and
    /// resolving the cover image when present. Never fails: anything missing
    /// or unreadable degrades to the bare course id.
    pub fn from_course_dir(course_root: &Path, id: &str) -> Self {
        let mut meta = Self::new(id);

        if let Some(value) = load_sidecar(course_root, id) {
            let fields = course_fields(&value);
            meta.title = string_field(fields, &["show_name", "name", "title"]);
            meta.author = author_field(fields);
        }

        meta.cover_image = resolve_cover_image(course_root);
        meta
    }
}

/// Find the first readable, parseable JSON sidecar for the course.
fn load_sidecar(course_root: &Path, id: &str) -> Option<Value> {
    let candidates = [
        format!("{id}.json"),
        format!("{}.json", id.replace('-', "")),
        "course.json".to_string(),
        "metadata.json".to_string(),
    ];

    for name in candidates {
        let path = course_root.join(&name);
        if !path.is_file() {
            continue;
        }
        match fs::read_to_string(&path).map_err(|e| e.to_string()).and_then(|text| {
            serde_json::from_str::<Value>(&text).map_err(|e| e.to_string())
        }) {
            Ok(value) => {
                log::info!("using course metadata from {}", path.display());
                return Some(value);
            }
            Err(e) => log::warn!("unreadable course metadata {}: {}", path.display(), e),
        }
    }

    None
}

/// Some exports nest everything under a `"course"` object.
fn course_fields(value: &Value) -> &Value {
    match value.get("course") {
        Some(nested) if nested.is_object() => nested,
        _ => value,
    }
}

fn string_field<'a>(value: &'a Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .filter_map(Value::as_str)
        .map(str::to_string)
        .next()
}

fn author_field(value: &Value) -> Option<String> {
    if let Some(author) = value.get("author").and_then(Value::as_str) {
        return Some(author.to_string());
    }

    let instructors: Vec<&str> = value
        .get("instructors")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .collect();

    if instructors.is_empty() {
        None
    } else {
        Some(instructors.join(", "))
    }
}

/// First existing cover-image candidate under the course root.
pub fn resolve_cover_image(course_root: &Path) -> Option<PathBuf> {
    COVER_IMAGE_CANDIDATES
        .iter()
        .map(|name| course_root.join(name))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_display_title_falls_back_to_id() {
        let meta = CourseMeta::new("mindful-living-2026");
        assert_eq!(meta.display_title(), "Mindful Living 2026");
    }

    #[test]
    fn test_sidecar_flat_fields() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("my-course.json"),
            r#"{"name": "mindful living", "author": "Ana Reyes"}"#,
        )
        .unwrap();

        let meta = CourseMeta::from_course_dir(dir.path(), "my-course");
        assert_eq!(meta.display_title(), "Mindful Living");
        assert_eq!(meta.author.as_deref(), Some("Ana Reyes"));
    }

    #[test]
    fn test_sidecar_nested_course_object_and_instructors() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("course.json"),
            r#"{"course": {"title": "deep focus", "instructors": ["Kim Lau", "Sam Ortiz"]}}"#,
        )
        .unwrap();

        let meta = CourseMeta::from_course_dir(dir.path(), "deep-focus");
        assert_eq!(meta.title.as_deref(), Some("deep focus"));
        assert_eq!(meta.author.as_deref(), Some("Kim Lau, Sam Ortiz"));
    }

    #[test]
    fn test_missing_sidecar_degrades_to_id() {
        let dir = TempDir::new().unwrap();
        let meta = CourseMeta::from_course_dir(dir.path(), "bare-course");
        assert_eq!(meta.title, None);
        assert_eq!(meta.author, None);
        assert_eq!(meta.display_title(), "Bare Course");
    }

    #[test]
    fn test_cover_image_candidates_in_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("thumbnail.jpg"), b"x").unwrap();
        assert_eq!(
            resolve_cover_image(dir.path()),
            Some(dir.path().join("thumbnail.jpg"))
        );

        fs::write(dir.path().join("course_image.jpg"), b"x").unwrap();
        assert_eq!(
            resolve_cover_image(dir.path()),
            Some(dir.path().join("course_image.jpg"))
        );
    }

    #[test]
    fn test_description_rules_first_match_wins() {
        let rules = DescriptionRules::new(vec![
            DescriptionRule {
                pattern: "live-call".into(),
                template: "Live Call: {title}".into(),
            },
            DescriptionRule {
                pattern: "call".into(),
                template: "Call: {title}".into(),
            },
        ]);

        assert_eq!(
            rules.apply("4. live-call-recordings", "Live Call Recordings"),
            Some("Live Call: Live Call Recordings".to_string())
        );
        assert_eq!(rules.apply("2. basics", "Basics"), None);
    }
}
