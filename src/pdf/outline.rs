//! Outline synthesis: page-number assignment and bookmark attachment
//!
//! Page numbers are computed before the merge by walking the ordered artifact
//! sequence and accumulating each artifact's actual page count; the table of
//! contents is rendered only after this pass, because it is a function of the
//! document's final shape. Module-level entries anchor the module's divider
//! page when one exists, else its first content page.

use std::path::Path;

use lopdf::{Bookmark, Document, Object};

use crate::error::{Error, Result};
use crate::pdf::{Artifact, ArtifactRole};

/// One entry in the document outline and table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub title: String,
    /// 0 = module, 1 = content.
    pub level: u8,
    /// 1-indexed page in the final merged document.
    pub page: usize,
}

/// Walk the ordered artifact sequence and assign every artifact its 1-indexed
/// first page: the cover occupies pages 1..=cover_pages, the TOC the next
/// `toc_pages`, and content artifacts follow, each advancing by its own page
/// count. Returns the outline entries in document order.
pub fn assign_pages(cover_pages: usize, toc_pages: usize, artifacts: &mut [Artifact]) -> Vec<OutlineEntry> {
    let mut entries = Vec::new();
    let mut page = 1 + cover_pages + toc_pages;
    let mut module_seen: Option<u32> = None;

    for artifact in artifacts.iter_mut() {
        artifact.first_page = page;
        match artifact.role {
            ArtifactRole::Divider => {
                entries.push(OutlineEntry {
                    title: artifact.title.clone(),
                    level: 0,
                    page,
                });
                module_seen = artifact.module;
            }
            ArtifactRole::Content => {
                // A module whose divider went missing still gets an anchor at
                // its first content page
                if artifact.module.is_some() && artifact.module != module_seen {
                    entries.push(OutlineEntry {
                        title: format!("Module {}", artifact.module.unwrap_or(0)),
                        level: 0,
                        page,
                    });
                    module_seen = artifact.module;
                }
                entries.push(OutlineEntry {
                    title: artifact.title.clone(),
                    level: 1,
                    page,
                });
            }
            ArtifactRole::Cover | ArtifactRole::Toc => {}
        }
        page += artifact.pages;
    }

    entries
}

/// Total pages the merged document will have.
pub fn total_pages(cover_pages: usize, toc_pages: usize, artifacts: &[Artifact]) -> usize {
    cover_pages + toc_pages + artifacts.iter().map(|a| a.pages).sum::<usize>()
}

/// Attach the outline tree to a merged document, rewriting it in place.
///
/// Top-level entries are added first; each child attaches to the nearest
/// preceding top-level entry, or becomes top-level itself when none exists.
/// Entries pointing past the last page are silently dropped.
pub fn attach_outline(path: &Path, entries: &[OutlineEntry]) -> Result<()> {
    attach_inner(path, entries).map_err(|e| Error::Bookmark(e.to_string()))
}

fn attach_inner(path: &Path, entries: &[OutlineEntry]) -> Result<()> {
    let mut doc = Document::load(path)?;
    let pages = doc.get_pages();
    let page_count = pages.len();

    let mut last_top: Option<u32> = None;
    for entry in entries {
        if entry.page == 0 || entry.page > page_count {
            log::warn!(
                "dropping outline entry '{}' pointing at page {} of {}",
                entry.title,
                entry.page,
                page_count
            );
            continue;
        }
        let Some(&page_id) = pages.get(&(entry.page as u32)) else {
            continue;
        };

        let bookmark = Bookmark::new(entry.title.clone(), [0.0, 0.0, 0.0], 0, page_id);
        if entry.level == 0 {
            last_top = Some(doc.add_bookmark(bookmark, None));
        } else {
            doc.add_bookmark(bookmark, last_top);
        }
    }

    if let Some(outline_id) = doc.build_outline() {
        let catalog_id = match doc.trailer.get(b"Root")? {
            Object::Reference(id) => *id,
            _ => return Err(Error::General("trailer Root is not a reference".to_string())),
        };
        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(catalog_id) {
            dict.set("Outlines", Object::Reference(outline_id));
        }
    }

    doc.save(path)?;
    Ok(())
}
