//! PDF metadata probing: page counts and page geometry

use std::path::Path;

use lopdf::{Document, Object, ObjectId};

use crate::error::{Error, Result};

/// Count pages by reading the Count field from the Pages dictionary, falling
/// back to enumerating the page tree when the catalog walk fails.
pub fn count_pages(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    let count = count_from_catalog(&doc).unwrap_or_else(|_| doc.get_pages().len());

    if count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }
    Ok(count)
}

fn count_from_catalog(doc: &Document) -> Result<usize> {
    let catalog = resolve_dict(doc, doc.trailer.get(b"Root")?)?;
    let pages = resolve_dict(doc, catalog.get(b"Pages")?)?;
    match pages.get(b"Count")? {
        Object::Integer(n) => Ok(*n as usize),
        _ => Err(Error::General("Count is not an integer".to_string())),
    }
}

fn resolve_dict<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a lopdf::Dictionary> {
    let object = match object {
        Object::Reference(id) => doc.get_object(*id)?,
        other => other,
    };
    match object {
        Object::Dictionary(dict) => Ok(dict),
        _ => Err(Error::General("expected a dictionary".to_string())),
    }
}

/// The (width, height) of every page in points, in page order.
pub fn page_sizes(path: &Path) -> Result<Vec<(f64, f64)>> {
    let doc = Document::load(path)?;
    let mut sizes = Vec::new();
    for (_, page_id) in doc.get_pages() {
        let rect = media_box(&doc, page_id)
            .ok_or_else(|| Error::General(format!("page without MediaBox in {}", path.display())))?;
        sizes.push((f64::from(rect[2] - rect[0]), f64::from(rect[3] - rect[1])));
    }
    Ok(sizes)
}

/// Resolve a page's MediaBox, walking up the page tree for inherited values.
pub(crate) fn media_box(doc: &Document, page_id: ObjectId) -> Option<[f32; 4]> {
    let object = inherited_page_attr(doc, page_id, b"MediaBox")?;
    let array = match object {
        Object::Array(a) => a,
        _ => return None,
    };
    if array.len() != 4 {
        return None;
    }

    let mut rect = [0.0f32; 4];
    for (i, value) in array.iter().enumerate() {
        rect[i] = number(doc, value)?;
    }
    Some(rect)
}

/// Look up a page attribute, following Parent links for inheritable keys.
pub(crate) fn inherited_page_attr(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = page_id;
    // Bounded walk in case of a malformed circular page tree
    for _ in 0..32 {
        let dict = match doc.get_object(current) {
            Ok(Object::Dictionary(dict)) => dict,
            _ => return None,
        };
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        match dict.get(b"Parent") {
            Ok(Object::Reference(parent)) => current = *parent,
            _ => return None,
        }
    }
    None
}

fn number(doc: &Document, object: &Object) -> Option<f32> {
    match object {
        Object::Integer(n) => Some(*n as f32),
        Object::Real(r) => Some(*r),
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(inner) => number(doc, inner),
            Err(_) => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_pages_nonexistent_file() {
        let result = count_pages(Path::new("nonexistent.pdf"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }

    #[test]
    fn test_page_sizes_of_rendered_document() {
        use crate::render::{DocBuilder, Font, PageSetup};
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sized.pdf");

        let mut builder = DocBuilder::new(PageSetup::content(None));
        builder.push_wrapped("hello", Font::Body, 11.0, 0.0, 0.0);
        builder.write(&path).unwrap();

        let sizes = page_sizes(&path).unwrap();
        assert_eq!(sizes.len(), 1);
        assert!((sizes[0].0 - 612.0).abs() < 0.5);
        assert!((sizes[0].1 - 792.0).abs() < 0.5);

        assert_eq!(count_pages(&path).unwrap(), 1);
    }
}
