//! Course PDF generation pipeline
//!
//! One run walks the downloads tree, converts every supported file, normalizes
//! page geometry, synthesizes the cover, divider, and TOC pages, merges it all
//! in batches, and attaches the outline. Every intermediate artifact lives in
//! a scoped temporary workspace that is removed when the run ends, success or
//! failure; only the final output file survives.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::course::CourseMeta;
use crate::error::{Error, Result};
use crate::layout::PageDimensions;
use crate::pdf::compose::{self, CoverSpec};
use crate::pdf::{
    attach_outline, convert_to_pdf, count_pages, merge_batched, normalize, outline, Artifact,
    ArtifactRole, NormalizeOptions, DEFAULT_BATCH_SIZE,
};
use crate::report::RunReport;
use crate::titles;
use crate::walker;

/// Options for one generation run.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Output path; defaults to `<course_root>/<course_id>_resources.pdf`.
    pub output: Option<PathBuf>,
    /// Documents per merge batch.
    pub batch_size: usize,
    /// Cover date; defaults to today.
    pub date: Option<NaiveDate>,
    /// Canonical page size for normalization.
    pub target: PageDimensions,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            output: None,
            batch_size: DEFAULT_BATCH_SIZE,
            date: None,
            target: PageDimensions::letter(),
        }
    }
}

/// Generate the single aggregated PDF for a course.
///
/// `course_root` is the course directory containing `downloads/`. Returns the
/// path of the written document.
pub fn generate_course_pdf(
    course_root: &Path,
    meta: &CourseMeta,
    options: &GeneratorOptions,
    report: &mut RunReport,
) -> Result<PathBuf> {
    let downloads_dir = course_root.join("downloads");
    if !downloads_dir.is_dir() {
        return Err(Error::MissingDownloads(downloads_dir));
    }

    let course_title = meta.display_title();
    log::info!("generating course PDF for {course_title}");

    let modules = walker::scan(&downloads_dir)?;
    let targets = walker::plan_targets(&modules);
    if targets.is_empty() {
        return Err(Error::NoContent(downloads_dir));
    }

    // Module display names, with the injected naming rules applied
    let module_names: BTreeMap<u32, String> = modules
        .iter()
        .map(|module| {
            let cleaned = module.display_name();
            let name = meta
                .divider_rules
                .apply(&module.name, &cleaned)
                .unwrap_or(cleaned);
            (module.number, name)
        })
        .collect();

    let workspace = tempfile::Builder::new().prefix("course_binder_").tempdir()?;
    let ws = workspace.path();
    log::debug!("workspace: {}", ws.display());

    // Convert every target; a failed file is skipped, never fatal
    let normalize_options = NormalizeOptions {
        target: options.target,
        ..NormalizeOptions::default()
    };
    let mut converted: Vec<(u32, PathBuf, String)> = Vec::new();
    for target in &targets {
        let output = ws.join(&target.output_name);
        match convert_to_pdf(&target.source, &output) {
            Ok(path) => {
                let file_name = target
                    .source
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| target.output_name.clone());
                converted.push((target.module, path, titles::extract_title(&file_name)));
            }
            Err(e) => report.record_skipped(&target.source.path, e.to_string()),
        }
    }
    if converted.is_empty() {
        return Err(Error::NoContent(downloads_dir));
    }

    // Normalize page geometry; failures fall back to the unmodified artifact.
    // Dividers are synthesized lazily, so a module only gets one once it has
    // produced a usable content artifact.
    let mut artifacts: Vec<Artifact> = Vec::new();
    let mut current_module: Option<u32> = None;
    for (index, (module, path, title)) in converted.iter().enumerate() {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let normalized = ws.join(format!("norm_{index:03}_{file_name}"));
        let final_path = normalize(path, &normalized, &normalize_options);
        if final_path == *path {
            report.record_fallback(format!("normalization skipped for {}", path.display()));
        }

        let pages = match count_pages(&final_path) {
            Ok(pages) => pages,
            Err(e) => {
                report.record_skipped(path, e.to_string());
                continue;
            }
        };

        if current_module != Some(*module) {
            let module_title = module_names
                .get(module)
                .cloned()
                .unwrap_or_else(|| format!("Module {module}"));
            let divider_path = ws.join(format!("divider_{module:04}.pdf"));
            let divider_pages = compose::divider_page(&course_title, &module_title, &divider_path)?;
            artifacts.push(Artifact::new(
                divider_path,
                divider_pages,
                ArtifactRole::Divider,
                Some(*module),
                module_title,
            ));
            current_module = Some(*module);
        }

        artifacts.push(Artifact::new(
            final_path,
            pages,
            ArtifactRole::Content,
            Some(*module),
            title.clone(),
        ));
    }
    if artifacts.is_empty() {
        return Err(Error::NoContent(downloads_dir));
    }

    // Cover page
    let date = options.date.unwrap_or_else(|| Local::now().date_naive());
    let cover_path = ws.join("00_cover.pdf");
    let cover_pages = compose::cover_page(
        &CoverSpec {
            title: &course_title,
            author: meta.author.as_deref(),
            date,
            image: meta.cover_image.as_deref(),
        },
        &cover_path,
    )?;

    // The TOC occupies pages of its own, so it renders twice: once with
    // placeholder numbers to measure it, then with the final assignment
    let toc_path = ws.join("01_toc.pdf");
    let placeholder = outline::assign_pages(cover_pages, 1, &mut artifacts);
    let toc_pages = compose::toc_page(&course_title, &placeholder, &toc_path)?;
    let entries = outline::assign_pages(cover_pages, toc_pages, &mut artifacts);
    compose::toc_page(&course_title, &entries, &toc_path)?;

    // Merge cover + TOC + (divider, content)* and attach the outline
    let output_path = options
        .output
        .clone()
        .unwrap_or_else(|| course_root.join(format!("{}_resources.pdf", meta.id)));
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut inputs = vec![cover_path, toc_path];
    inputs.extend(artifacts.iter().map(|a| a.path.clone()));
    merge_batched(&inputs, &output_path, options.batch_size, report)?;

    if let Err(e) = attach_outline(&output_path, &entries) {
        // A document without a working outline is still a valid deliverable
        report.record_fallback(format!("outline attachment failed: {e}"));
    }

    log::info!(
        "wrote {} ({} skipped, {} fallbacks)",
        output_path.display(),
        report.skipped.len(),
        report.fallbacks.len()
    );
    Ok(output_path)
}
