//! Format converters: one source document in, one styled PDF out
//!
//! Converters are stateless and per-file. A failure converts to
//! [`Error::Conversion`] so the caller can skip the file and keep going; a
//! single bad source never aborts a run. PDFs pass through as a byte copy with
//! no re-render, validated so a corrupt file is caught here rather than at
//! merge time.

use std::fs;
use std::path::{Path, PathBuf};

use lopdf::Document;

use crate::error::{Error, Result};
use crate::render::{html, markdown, DocBuilder, Font, PageSetup};
use crate::walker::{SourceFile, SourceFormat};

/// Convert a discovered source file into a PDF at `output`.
pub fn convert_to_pdf(source: &SourceFile, output: &Path) -> Result<PathBuf> {
    let result = match source.format {
        SourceFormat::Pdf => copy_pdf(&source.path, output),
        SourceFormat::Markdown => convert_markdown(&source.path, output),
        SourceFormat::Html => convert_html(&source.path, output),
        SourceFormat::Text => convert_text(&source.path, output),
    };

    match result {
        Ok(()) => {
            log::debug!("converted {} -> {}", source.path.display(), output.display());
            Ok(output.to_path_buf())
        }
        Err(e) => Err(conversion_error(&source.path, e)),
    }
}

fn conversion_error(path: &Path, e: Error) -> Error {
    match e {
        already @ Error::Conversion { .. } => already,
        other => Error::Conversion {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

/// Existing PDFs are copied, not re-rendered. Loading the copy catches corrupt
/// or empty files while they are still skippable.
fn copy_pdf(input: &Path, output: &Path) -> Result<()> {
    fs::copy(input, output)?;
    let doc = Document::load(output)?;
    if doc.get_pages().is_empty() {
        return Err(Error::EmptyPdf(input.to_path_buf()));
    }
    Ok(())
}

fn convert_markdown(input: &Path, output: &Path) -> Result<()> {
    let text = fs::read_to_string(input)?;
    let blocks = markdown::parse(&text);

    let mut builder = DocBuilder::new(PageSetup::content(Some(document_header(input))));
    builder.push_blocks(&blocks);
    builder.write(output)?;
    Ok(())
}

fn convert_html(input: &Path, output: &Path) -> Result<()> {
    let text = fs::read_to_string(input)?;
    let blocks = html::parse(&text);

    let mut builder = DocBuilder::new(PageSetup::content(Some(document_header(input))));
    builder.push_blocks(&blocks);
    builder.write(output)?;
    Ok(())
}

fn convert_text(input: &Path, output: &Path) -> Result<()> {
    let text = fs::read_to_string(input)?;

    let mut builder = DocBuilder::new(PageSetup::content(Some(document_header(input))));
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        builder.push_wrapped(line, Font::Mono, 10.0, 0.0, 4.0);
    }
    builder.write(output)?;
    Ok(())
}

/// Deterministic page header: the source filename without its extension.
fn document_header(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::metadata::count_pages;
    use tempfile::TempDir;

    fn source(path: PathBuf, format: SourceFormat) -> SourceFile {
        SourceFile {
            size: fs::metadata(&path).map(|m| m.len()).unwrap_or(0),
            path,
            format,
        }
    }

    #[test]
    fn test_convert_markdown_produces_pages() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("lesson.md");
        fs::write(&input, "# Lesson\n\nSome text.\n\n- a\n- b\n").unwrap();

        let output = dir.path().join("lesson.pdf");
        let result = convert_to_pdf(&source(input, SourceFormat::Markdown), &output).unwrap();
        assert_eq!(result, output);
        assert!(count_pages(&output).unwrap() >= 1);
    }

    #[test]
    fn test_convert_text_produces_pages() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("notes.txt");
        fs::write(&input, "line one\nline two\n").unwrap();

        let output = dir.path().join("notes.pdf");
        convert_to_pdf(&source(input, SourceFormat::Text), &output).unwrap();
        assert_eq!(count_pages(&output).unwrap(), 1);
    }

    #[test]
    fn test_convert_html_produces_pages() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("page.html");
        fs::write(&input, "<h1>Hi</h1><p>body</p>").unwrap();

        let output = dir.path().join("page.pdf");
        convert_to_pdf(&source(input, SourceFormat::Html), &output).unwrap();
        assert_eq!(count_pages(&output).unwrap(), 1);
    }

    #[test]
    fn test_missing_source_is_a_conversion_error() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("ghost.md");
        let output = dir.path().join("ghost.pdf");

        let result = convert_to_pdf(&source(input, SourceFormat::Markdown), &output);
        assert!(matches!(result, Err(Error::Conversion { .. })));
    }

    #[test]
    fn test_corrupt_pdf_is_a_conversion_error() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("broken.pdf");
        fs::write(&input, b"definitely not a pdf").unwrap();

        let output = dir.path().join("copied.pdf");
        let result = convert_to_pdf(&source(input, SourceFormat::Pdf), &output);
        assert!(matches!(result, Err(Error::Conversion { .. })));
    }
}
