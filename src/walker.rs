//! Directory walking and deterministic ordering of course content
//!
//! The downloads tree looks like `downloads/<module>/<subgroup>/**`, where
//! module directories carry a `<number>.` prefix and subgroups are numbered
//! directories, unnumbered directories, or the reserved `summaries` bucket.
//! This module flattens that tree into an ordered list of conversion targets
//! whose synthetic output filenames encode the ordering, so a plain
//! lexicographic sort of output names reproduces module → subgroup → file
//! order.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use glob::Pattern;
use regex::Regex;
use walkdir::WalkDir;

use crate::error::Result;
use crate::titles;

/// Subdirectory names that never contribute document content.
const EXCLUDED_DIRS: &[&str] = &["audio", "video", "transcripts"];

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "wmv", "flv", "mkv"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "aac", "ogg", "flac", "m4a"];

/// Sub-order key for unnumbered subgroups: after every numbered one.
const UNNUMBERED_KEY: u64 = u64::MAX - 1;
/// Sub-order key for the summaries bucket: always last in its module.
const SUMMARIES_KEY: u64 = u64::MAX;

static MODULE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.").expect("valid regex"));

/// A supported source document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Markdown,
    Html,
    Text,
}

impl SourceFormat {
    /// Map a lowercase file extension to a format, `None` when unsupported.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(Self::Pdf),
            "md" => Some(Self::Markdown),
            "html" => Some(Self::Html),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

/// A single discovered document.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub format: SourceFormat,
    pub size: u64,
}

impl SourceFile {
    fn new(path: PathBuf, format: SourceFormat) -> Self {
        let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        Self { path, format, size }
    }
}

/// A named bucket of files within a module.
#[derive(Debug, Clone)]
pub struct SubGroup {
    pub order_key: u64,
    pub name: String,
    pub files: Vec<SourceFile>,
}

/// An ordered collection of subgroups sharing a module number.
#[derive(Debug, Clone)]
pub struct ModuleGroup {
    pub number: u32,
    pub name: String,
    pub dir: PathBuf,
    pub subgroups: Vec<SubGroup>,
}

impl ModuleGroup {
    /// Human-readable module name derived from the directory name.
    pub fn display_name(&self) -> String {
        titles::clean_display_name(&self.name)
    }
}

/// A (source file, synthetic output filename) pair.
#[derive(Debug, Clone)]
pub struct ConversionTarget {
    pub source: SourceFile,
    /// `{module:04}_{subgroup:04}_{file:04}_{name}.pdf`; lexicographic sort of
    /// these names reproduces the intended reading order.
    pub output_name: String,
    pub module: u32,
}

/// Scan the downloads directory into ordered module groups.
pub fn scan(downloads_dir: &Path) -> Result<Vec<ModuleGroup>> {
    let mut modules = Vec::new();

    for entry in fs::read_dir(downloads_dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("unreadable entry under {}: {}", downloads_dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(number) = module_number(&name) else {
            continue;
        };

        let subgroups = scan_module(&path);
        modules.push(ModuleGroup {
            number,
            name,
            dir: path,
            subgroups,
        });
    }

    modules.sort_by(|a, b| (a.number, &a.name).cmp(&(b.number, &b.name)));

    log::info!(
        "found {} modules under {}",
        modules.len(),
        downloads_dir.display()
    );
    Ok(modules)
}

/// Parse the leading `<integer>.` of a module directory name.
fn module_number(name: &str) -> Option<u32> {
    MODULE_PREFIX
        .captures(name)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn scan_module(module_dir: &Path) -> Vec<SubGroup> {
    let mut subgroups = Vec::new();

    // Files sitting directly in the module directory form an implicit bucket
    // that sorts before every named subgroup.
    let loose = collect_content_files(module_dir, false);
    if !loose.is_empty() {
        subgroups.push(SubGroup {
            order_key: 0,
            name: String::new(),
            files: loose,
        });
    }

    let entries = match fs::read_dir(module_dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("unreadable module dir {}: {}", module_dir.display(), e);
            return subgroups;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if EXCLUDED_DIRS.iter().any(|d| name.eq_ignore_ascii_case(d)) {
            continue;
        }

        let files = if is_summaries_dir(&name) {
            collect_summary_files(&path)
        } else {
            collect_content_files(&path, true)
        };
        if files.is_empty() {
            continue;
        }

        subgroups.push(SubGroup {
            order_key: subgroup_key(&name),
            name,
            files,
        });
    }

    subgroups.sort_by(|a, b| (a.order_key, &a.name).cmp(&(b.order_key, &b.name)));
    subgroups
}

/// The `summaries` bucket, with or without a numeric prefix.
fn is_summaries_dir(name: &str) -> bool {
    let stripped = MODULE_PREFIX.replace(name, "");
    stripped.trim().eq_ignore_ascii_case("summaries")
}

/// Sub-order key: numeric prefix when present, a default high key for
/// unnumbered directories, and the terminal key for summaries so they always
/// sort last regardless of any prefix.
fn subgroup_key(name: &str) -> u64 {
    if is_summaries_dir(name) {
        return SUMMARIES_KEY;
    }
    match module_number(name) {
        Some(n) => u64::from(n),
        None => UNNUMBERED_KEY,
    }
}

/// Every `*_summary.md` file directly in the summaries directory, sorted.
fn collect_summary_files(dir: &Path) -> Vec<SourceFile> {
    let pattern = Pattern::new("*_summary.md").expect("valid pattern");
    let mut files: Vec<PathBuf> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| {
                p.file_name()
                    .map(|n| pattern.matches(&n.to_string_lossy()))
                    .unwrap_or(false)
            })
            .collect(),
        Err(e) => {
            log::warn!("unreadable summaries dir {}: {}", dir.display(), e);
            return Vec::new();
        }
    };
    files.sort();

    files
        .into_iter()
        .map(|p| SourceFile::new(p, SourceFormat::Markdown))
        .collect()
}

/// Every non-media file under `dir`, skipping anything below a transcripts
/// directory, sorted by full path. `recursive` is false for the implicit
/// module-root bucket, whose subdirectories are scanned as their own
/// subgroups.
fn collect_content_files(dir: &Path, recursive: bool) -> Vec<SourceFile> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("walk error under {}: {}", dir.display(), err);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| !is_excluded_file(p))
        .collect();
    paths.sort();

    paths
        .into_iter()
        .filter_map(|path| {
            let format = file_format(&path)?;
            Some(SourceFile::new(path, format))
        })
        .collect()
}

/// Media files and anything under a transcripts directory never convert.
fn is_excluded_file(path: &Path) -> bool {
    let under_transcripts = path
        .components()
        .any(|c| c.as_os_str().eq_ignore_ascii_case("transcripts"));
    if under_transcripts {
        return true;
    }

    match extension_lowercase(path) {
        Some(ext) => {
            VIDEO_EXTENSIONS.contains(&ext.as_str()) || AUDIO_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

/// Unsupported extensions are silently skipped, not an error.
fn file_format(path: &Path) -> Option<SourceFormat> {
    let ext = extension_lowercase(path)?;
    let format = SourceFormat::from_extension(&ext);
    if format.is_none() {
        log::debug!("skipping unsupported file type: {}", path.display());
    }
    format
}

/// Assign every file a synthetic, order-encoding output filename.
pub fn plan_targets(modules: &[ModuleGroup]) -> Vec<ConversionTarget> {
    let mut targets = Vec::new();

    for module in modules {
        for (sub_idx, subgroup) in module.subgroups.iter().enumerate() {
            for (file_idx, file) in subgroup.files.iter().enumerate() {
                let stem = file
                    .path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| format!("file_{file_idx}"));
                let output_name =
                    format!("{:04}_{:04}_{:04}_{}.pdf", module.number, sub_idx, file_idx, stem);
                targets.push(ConversionTarget {
                    source: file.clone(),
                    output_name,
                    module: module.number,
                });
            }
        }
    }

    // The synthetic names already encode the order; sorting here is what the
    // rest of the pipeline relies on.
    targets.sort_by(|a, b| a.output_name.cmp(&b.output_name));
    targets
}
