//! Page-size normalization
//!
//! Merged documents look broken when page geometry jumps between sources, so
//! every page is rewritten to a canonical target size. Pages already at the
//! target, pages at a recognized standard paper size, and near-matches are
//! left untouched. Everything else is composited onto a blank canonical page
//! as a Form XObject, scaled and centered. The whole component is best-effort:
//! any processing failure returns the original file unchanged.

use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::layout::{standard_sizes, PageDimensions};
use crate::pdf::metadata::{inherited_page_attr, media_box};

/// Exact-match tolerance against the target size.
const SIZE_TOLERANCE: f64 = 0.01;
/// Near-match tolerance: within this of the target, rescaling is pointless.
const NEAR_TOLERANCE: f64 = 0.05;
/// Scaled content keeps a 5% margin inside the canonical page.
const SCALE_MARGIN: f64 = 0.95;

#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub target: PageDimensions,
    pub preserve_aspect_ratio: bool,
    /// Leave recognized standard paper sizes (Letter/Legal/Tabloid/A3/A4/A5)
    /// unchanged even when they differ from the target.
    pub recognize_standard_sizes: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            target: PageDimensions::letter(),
            preserve_aspect_ratio: true,
            recognize_standard_sizes: true,
        }
    }
}

/// Normalize every page of `input` to the target size, writing to `output`.
///
/// On any failure the original path is returned and the input is used as-is;
/// normalization never aborts a run.
pub fn normalize(input: &Path, output: &Path, options: &NormalizeOptions) -> PathBuf {
    match normalize_inner(input, output, options) {
        Ok(()) => output.to_path_buf(),
        Err(e) => {
            let e = Error::Normalization {
                path: input.to_path_buf(),
                reason: e.to_string(),
            };
            log::warn!("{e}, using original");
            input.to_path_buf()
        }
    }
}

fn normalize_inner(input: &Path, output: &Path, options: &NormalizeOptions) -> Result<()> {
    let mut doc = Document::load(input)?;
    doc.decompress();

    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    for page_id in pages {
        let rect = media_box(&doc, page_id)
            .ok_or_else(|| Error::General("page without MediaBox".to_string()))?;
        let width = f64::from(rect[2] - rect[0]);
        let height = f64::from(rect[3] - rect[1]);

        if options.target.matches(width, height, SIZE_TOLERANCE) {
            continue;
        }
        if options.recognize_standard_sizes && is_standard_size(width, height) {
            continue;
        }
        if options.target.matches(width, height, NEAR_TOLERANCE) {
            continue;
        }

        rewrite_page(&mut doc, page_id, rect, options)?;
    }

    doc.compress();
    doc.save(output)?;
    Ok(())
}

fn is_standard_size(width: f64, height: f64) -> bool {
    standard_sizes()
        .iter()
        .any(|size| size.matches_either_orientation(width, height, SIZE_TOLERANCE))
}

/// Replace the page's content with a Form XObject of its original content,
/// scaled onto a blank canonical page.
fn rewrite_page(
    doc: &mut Document,
    page_id: ObjectId,
    rect: [f32; 4],
    options: &NormalizeOptions,
) -> Result<()> {
    let content = doc.get_page_content(page_id)?;
    let resources = page_resources(doc, page_id);

    let target_width = options.target.width_pt();
    let target_height = options.target.height_pt();
    let width = f64::from(rect[2] - rect[0]);
    let height = f64::from(rect[3] - rect[1]);

    let (sx, sy, tx, ty) = if options.preserve_aspect_ratio {
        let scale = (target_width / width).min(target_height / height) * SCALE_MARGIN;
        let tx = (target_width - width * scale) / 2.0 - f64::from(rect[0]) * scale;
        let ty = (target_height - height * scale) / 2.0 - f64::from(rect[1]) * scale;
        (scale, scale, tx, ty)
    } else {
        // Independent axis scaling, anchored at a fixed corner offset
        let sx = target_width / width * SCALE_MARGIN;
        let sy = target_height / height * SCALE_MARGIN;
        let tx = target_width * (1.0 - SCALE_MARGIN) / 2.0 - f64::from(rect[0]) * sx;
        let ty = target_height * (1.0 - SCALE_MARGIN) / 2.0 - f64::from(rect[1]) * sy;
        (sx, sy, tx, ty)
    };

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("FormType", Object::Integer(1));
    xobject_dict.set(
        "BBox",
        Object::Array(rect.iter().map(|&v| Object::Real(v)).collect()),
    );
    xobject_dict.set(
        "Matrix",
        Object::Array(vec![
            Object::Real(sx as f32),
            Object::Real(0.0),
            Object::Real(0.0),
            Object::Real(sy as f32),
            Object::Real(tx as f32),
            Object::Real(ty as f32),
        ]),
    );
    xobject_dict.set("Resources", resources);

    let xobject_id = doc.add_object(Object::Stream(Stream::new(xobject_dict, content)));

    let invoke = b"q\n/Fitted Do\nQ\n".to_vec();
    let content_id = doc.add_object(Stream::new(Dictionary::new(), invoke));

    let mut xobjects = Dictionary::new();
    xobjects.set("Fitted", Object::Reference(xobject_id));
    let mut new_resources = Dictionary::new();
    new_resources.set("XObject", Object::Dictionary(xobjects));

    let page = doc.get_object_mut(page_id)?;
    if let Object::Dictionary(ref mut dict) = page {
        dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(target_width as f32),
                Object::Real(target_height as f32),
            ]),
        );
        dict.set("Contents", Object::Reference(content_id));
        dict.set("Resources", Object::Dictionary(new_resources));
        // Stale geometry keys would fight the new canvas
        dict.remove(b"CropBox");
        dict.remove(b"Rotate");
    }

    Ok(())
}

/// The page's Resources for re-use inside the Form XObject, inherited values
/// included. A missing dictionary degrades to an empty one.
fn page_resources(doc: &Document, page_id: ObjectId) -> Object {
    match inherited_page_attr(doc, page_id, b"Resources") {
        Some(Object::Reference(id)) => match doc.get_object(id) {
            Ok(resolved) => resolved.clone(),
            Err(_) => Object::Dictionary(Dictionary::new()),
        },
        Some(object) => object,
        None => Object::Dictionary(Dictionary::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Length;
    use crate::pdf::metadata::page_sizes;
    use crate::render::{DocBuilder, Font, PageSetup};
    use tempfile::TempDir;

    fn render_at(dir: &Path, name: &str, size: PageDimensions) -> PathBuf {
        let path = dir.join(name);
        let mut builder = DocBuilder::new(PageSetup::content(None).with_size(size));
        builder.push_wrapped("sample content", Font::Body, 11.0, 0.0, 0.0);
        builder.write(&path).unwrap();
        path
    }

    #[test]
    fn test_letter_pages_pass_through() {
        let dir = TempDir::new().unwrap();
        let input = render_at(dir.path(), "letter.pdf", PageDimensions::letter());
        let output = dir.path().join("norm.pdf");

        let result = normalize(&input, &output, &NormalizeOptions::default());
        assert_eq!(result, output);

        let sizes = page_sizes(&output).unwrap();
        assert!((sizes[0].0 - 612.0).abs() < 1.0);
        assert!((sizes[0].1 - 792.0).abs() < 1.0);
    }

    #[test]
    fn test_odd_size_is_scaled_to_target() {
        let dir = TempDir::new().unwrap();
        let odd = PageDimensions::new(Length::from_pt(300.0), Length::from_pt(500.0));
        let input = render_at(dir.path(), "odd.pdf", odd);
        let output = dir.path().join("norm.pdf");

        normalize(&input, &output, &NormalizeOptions::default());

        let sizes = page_sizes(&output).unwrap();
        assert!((sizes[0].0 - 612.0).abs() < 1.0);
        assert!((sizes[0].1 - 792.0).abs() < 1.0);
    }

    #[test]
    fn test_a4_preserved_when_standard_sizes_recognized() {
        let dir = TempDir::new().unwrap();
        let input = render_at(dir.path(), "a4.pdf", PageDimensions::a4());
        let output = dir.path().join("norm.pdf");

        normalize(&input, &output, &NormalizeOptions::default());

        let sizes = page_sizes(&output).unwrap();
        assert!((sizes[0].0 - PageDimensions::a4().width_pt()).abs() < 1.0);
        assert!((sizes[0].1 - PageDimensions::a4().height_pt()).abs() < 1.0);
    }

    #[test]
    fn test_a4_rescaled_without_standard_size_recognition() {
        let dir = TempDir::new().unwrap();
        let input = render_at(dir.path(), "a4.pdf", PageDimensions::a4());
        let output = dir.path().join("norm.pdf");

        let options = NormalizeOptions {
            recognize_standard_sizes: false,
            ..NormalizeOptions::default()
        };
        normalize(&input, &output, &options);

        let sizes = page_sizes(&output).unwrap();
        assert!((sizes[0].0 - 612.0).abs() < 1.0);
        assert!((sizes[0].1 - 792.0).abs() < 1.0);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let odd = PageDimensions::new(Length::from_pt(400.0), Length::from_pt(400.0));
        let input = render_at(dir.path(), "odd.pdf", odd);

        let once = dir.path().join("once.pdf");
        let twice = dir.path().join("twice.pdf");
        normalize(&input, &once, &NormalizeOptions::default());
        normalize(&once, &twice, &NormalizeOptions::default());

        assert_eq!(page_sizes(&once).unwrap(), page_sizes(&twice).unwrap());
    }

    #[test]
    fn test_unreadable_input_returns_original() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("broken.pdf");
        std::fs::write(&input, b"not a pdf").unwrap();
        let output = dir.path().join("norm.pdf");

        let result = normalize(&input, &output, &NormalizeOptions::default());
        assert_eq!(result, input);
        assert!(!output.exists());
    }
}
