//! Cover, table-of-contents, and module divider pages
//!
//! The three non-content page kinds render through the same [`DocBuilder`]
//! path as converted documents, each with its own hard-coded style. Unlike
//! per-file conversion these are not skippable: without a cover or TOC the
//! document is incoherent, so failures propagate.

use std::path::Path;

use chrono::NaiveDate;

use crate::date::format_date;
use crate::error::Result;
use crate::pdf::outline::OutlineEntry;
use crate::render::{estimate_width, read_jpeg, DocBuilder, Font, Line, PageSetup};

/// Inputs for the cover page.
#[derive(Debug, Clone)]
pub struct CoverSpec<'a> {
    pub title: &'a str,
    pub author: Option<&'a str>,
    pub date: NaiveDate,
    pub image: Option<&'a Path>,
}

/// Render the course cover page. Returns the page count (normally 1).
pub fn cover_page(spec: &CoverSpec<'_>, output: &Path) -> Result<usize> {
    let mut builder = DocBuilder::new(PageSetup::full_page());

    if let Some(image_path) = spec.image {
        match read_jpeg(image_path) {
            Some(image) => builder.set_image(image),
            None => log::warn!(
                "cover image {} is not an embeddable JPEG, skipping",
                image_path.display()
            ),
        }
    }

    builder.push(Line::new("COURSE BINDER", Font::Bold, 12.0).centered());
    builder.push_wrapped_centered(spec.title, Font::Bold, 30.0, 36.0);
    builder.push(Line::new("Course Resources", Font::Oblique, 15.0).centered().space_before(14.0));

    if let Some(author) = spec.author {
        builder.push(Line::new(format!("By {author}"), Font::Body, 13.0).centered().space_before(28.0));
    }

    builder.push(
        Line::new(format!("Generated on {}", format_date(&spec.date)), Font::Oblique, 11.0)
            .centered()
            .space_before(30.0),
    );

    builder.write(output)
}

/// Render a full-page module divider.
pub fn divider_page(course_name: &str, module_title: &str, output: &Path) -> Result<usize> {
    let mut builder = DocBuilder::new(PageSetup::full_page());

    builder.push(Line::new(course_name.to_uppercase(), Font::Body, 11.0).centered());
    builder.push_wrapped_centered(module_title, Font::Bold, 28.0, 30.0);
    builder.push(Line::new("Module Resources", Font::Oblique, 14.0).centered().space_before(16.0));

    builder.write(output)
}

/// Render the table of contents from finalized outline entries. Returns the
/// page count; long courses spill onto further pages.
///
/// Page numbers are right-aligned into a fixed-width column, so rendering
/// with placeholder numbers occupies exactly as many pages as the final
/// rendering does.
pub fn toc_page(course_name: &str, entries: &[OutlineEntry], output: &Path) -> Result<usize> {
    let mut builder = DocBuilder::new(PageSetup::content(Some(course_name.to_string())));

    builder.push(Line::new("Table of Contents", Font::Bold, 22.0).centered().space_before(6.0));

    for entry in entries {
        let (font, size, indent, space) = if entry.level == 0 {
            (Font::Bold, 13.0, 0.0, 12.0)
        } else {
            (Font::Body, 11.0, 16.0, 4.0)
        };
        let text = toc_line(entry, font, size, builder.content_width() - indent);
        builder.push(Line::new(text, font, size).indent(indent).space_before(space));
    }

    builder.write(output)
}

/// One TOC row: truncated title, dot leaders, right-aligned page number in a
/// fixed-width column.
fn toc_line(entry: &OutlineEntry, font: Font, size: f32, available: f32) -> String {
    let mut title = entry.title.clone();
    if title.chars().count() > 70 {
        title = title.chars().take(67).collect::<String>() + "...";
    }

    let page = format!("{:>4}", entry.page);
    let used = estimate_width(&format!("{title} {page}"), font, size);
    let dot_width = estimate_width(".", font, size);
    let dots = if used >= available {
        3
    } else {
        (((available - used) / dot_width) as usize).clamp(3, 120)
    };

    format!("{title} {} {page}", ".".repeat(dots))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::metadata::{count_pages, page_sizes};
    use tempfile::TempDir;

    fn sample_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 5).unwrap()
    }

    #[test]
    fn test_cover_page_is_single_letter_page() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("cover.pdf");

        let pages = cover_page(
            &CoverSpec {
                title: "Mindful Living",
                author: Some("Ana Reyes"),
                date: sample_date(),
                image: None,
            },
            &output,
        )
        .unwrap();

        assert_eq!(pages, 1);
        let sizes = page_sizes(&output).unwrap();
        assert!((sizes[0].0 - 612.0).abs() < 0.5);
    }

    #[test]
    fn test_cover_page_with_missing_image_still_renders() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("cover.pdf");
        let bogus = dir.path().join("cover.png");
        std::fs::write(&bogus, b"png bytes").unwrap();

        let pages = cover_page(
            &CoverSpec {
                title: "Mindful Living",
                author: None,
                date: sample_date(),
                image: Some(&bogus),
            },
            &output,
        )
        .unwrap();
        assert_eq!(pages, 1);
    }

    #[test]
    fn test_divider_page_renders() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("divider.pdf");
        let pages = divider_page("Mindful Living", "Week One Foundations", &output).unwrap();
        assert_eq!(pages, 1);
        assert_eq!(count_pages(&output).unwrap(), 1);
    }

    #[test]
    fn test_toc_placeholder_and_final_have_same_page_count() {
        let dir = TempDir::new().unwrap();

        let placeholder: Vec<OutlineEntry> = (0..40)
            .map(|i| OutlineEntry {
                title: format!("Entry number {i}"),
                level: u8::from(i % 5 != 0),
                page: 0,
            })
            .collect();
        let finalized: Vec<OutlineEntry> = placeholder
            .iter()
            .map(|e| OutlineEntry {
                title: e.title.clone(),
                level: e.level,
                page: 1000,
            })
            .collect();

        let first = toc_page("Course", &placeholder, &dir.path().join("toc1.pdf")).unwrap();
        let second = toc_page("Course", &finalized, &dir.path().join("toc2.pdf")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_long_toc_spills_to_multiple_pages() {
        let dir = TempDir::new().unwrap();
        let entries: Vec<OutlineEntry> = (0..120)
            .map(|i| OutlineEntry {
                title: format!("Content item {i}"),
                level: 1,
                page: i + 3,
            })
            .collect();

        let pages = toc_page("Course", &entries, &dir.path().join("toc.pdf")).unwrap();
        assert!(pages > 1);
    }
}
