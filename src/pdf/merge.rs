//! Batched PDF merging
//!
//! Courses routinely produce hundreds of single-document PDFs. Loading them
//! all at once makes memory usage proportional to the whole course, so the
//! merge runs in fixed-size batches: each batch merges into an intermediate
//! file, then the intermediates merge into the final output. A failed batch is
//! dropped from the document; a failure of the batched path as a whole falls
//! back to one direct merge before the error is allowed to surface.

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{Error, Result};
use crate::report::RunReport;

/// Number of documents merged into each intermediate.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Merge multiple PDF files into a single PDF, in order.
///
/// Objects from each document are renumbered into one id space, the page
/// references are collected in input order, and a fresh catalog and page tree
/// are written around them.
pub fn merge_documents(inputs: &[PathBuf], output: &Path) -> Result<()> {
    if inputs.is_empty() {
        return Err(Error::Merge("no input files provided".to_string()));
    }

    for path in inputs {
        if !path.exists() {
            return Err(Error::FileNotFound(path.clone()));
        }
    }

    let mut documents = Vec::with_capacity(inputs.len());
    for path in inputs {
        let doc = Document::load(path)?;
        if doc.get_pages().is_empty() {
            return Err(Error::EmptyPdf(path.clone()));
        }
        documents.push(doc);
    }

    let mut max_id = 1;
    let mut page_ids: Vec<ObjectId> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        let pages = doc.get_pages();
        page_ids.extend(pages.into_values());
        objects.extend(doc.objects);
    }

    let mut merged = Document::with_version("1.5");
    merged.objects.extend(objects);
    // new_object_id() must not collide with the ids we just imported
    merged.max_id = max_id - 1;

    let pages_id = merged.new_object_id();
    let kids: Vec<Object> = page_ids.iter().map(|&id| Object::Reference(id)).collect();

    let mut pages_dict = Dictionary::new();
    pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
    pages_dict.set("Count", Object::Integer(page_ids.len() as i64));
    pages_dict.set("Kids", Object::Array(kids));

    let catalog_id = merged.new_object_id();
    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));

    merged.objects.insert(catalog_id, Object::Dictionary(catalog));
    merged.objects.insert(pages_id, Object::Dictionary(pages_dict));
    merged.trailer.set("Root", Object::Reference(catalog_id));

    // Every page must point at the new page tree
    for &page_id in &page_ids {
        if let Ok(Object::Dictionary(dict)) = merged.get_object_mut(page_id) {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    merged.compress();
    merged.save(output)?;
    Ok(())
}

/// Partition `len` items into consecutive ranges of at most `batch_size`.
pub fn batch_ranges(len: usize, batch_size: usize) -> Vec<Range<usize>> {
    let batch_size = batch_size.max(1);
    (0..len)
        .step_by(batch_size)
        .map(|start| start..(start + batch_size).min(len))
        .collect()
}

/// Merge `inputs` into `output` via fixed-size batches, falling back to a
/// single direct merge if the batched path fails for any reason.
pub fn merge_batched(
    inputs: &[PathBuf],
    output: &Path,
    batch_size: usize,
    report: &mut RunReport,
) -> Result<()> {
    match merge_in_batches(inputs, output, batch_size, report) {
        Ok(()) => Ok(()),
        Err(e) => {
            report.record_fallback(format!("batched merge failed ({e}), trying direct merge"));
            merge_documents(inputs, output)
        }
    }
}

fn merge_in_batches(
    inputs: &[PathBuf],
    output: &Path,
    batch_size: usize,
    report: &mut RunReport,
) -> Result<()> {
    let scratch = tempfile::Builder::new()
        .prefix("course_binder_merge_")
        .tempdir()?;

    let ranges = batch_ranges(inputs.len(), batch_size);
    let mut intermediates = Vec::with_capacity(ranges.len());

    for (index, range) in ranges.into_iter().enumerate() {
        let batch_output = scratch.path().join(format!("batch_{index:03}.pdf"));
        log::info!("merging batch {} ({} files)", index + 1, range.len());
        match merge_documents(&inputs[range.clone()], &batch_output) {
            Ok(()) => intermediates.push(batch_output),
            Err(e) => {
                // The batch's files are lost to the final document
                log::error!("batch {} failed: {e}", index + 1);
                for path in &inputs[range] {
                    report.record_skipped(path, format!("merge batch failed: {e}"));
                }
            }
        }
    }

    if intermediates.is_empty() {
        return Err(Error::Merge("no batch intermediates were produced".to_string()));
    }

    merge_documents(&intermediates, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_ranges_exact_and_remainder() {
        assert_eq!(batch_ranges(23, 10), vec![0..10, 10..20, 20..23]);
        assert_eq!(batch_ranges(20, 10), vec![0..10, 10..20]);
        assert_eq!(batch_ranges(3, 10), vec![0..3]);
        assert_eq!(batch_ranges(0, 10), Vec::<Range<usize>>::new());
    }

    #[test]
    fn test_merge_empty_input_list() {
        let result = merge_documents(&[], Path::new("out.pdf"));
        assert!(matches!(result, Err(Error::Merge(_))));
    }

    #[test]
    fn test_merge_nonexistent_file() {
        let result = merge_documents(&[PathBuf::from("nonexistent.pdf")], Path::new("out.pdf"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }
}
