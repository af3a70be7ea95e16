//! Course Binder Library
//!
//! Aggregates the heterogeneous resource files of a course (markdown, HTML,
//! plain text, existing PDFs) scattered across a numbered module tree into a
//! single navigable PDF:
//! - Discover and deterministically order files across modules and subgroups
//! - Convert each format to a styled, Letter-sized PDF
//! - Normalize page geometry so the merged document is visually consistent
//! - Synthesize a cover page, module dividers, and a table of contents whose
//!   page numbers match the final document
//! - Merge everything in batches and attach a hierarchical outline
//!
//! # Example
//!
//! ```no_run
//! use course_binder::course::CourseMeta;
//! use course_binder::generator::{generate_course_pdf, GeneratorOptions};
//! use course_binder::report::RunReport;
//! use std::path::Path;
//!
//! let root = Path::new("data/courses/mindful-living");
//! let meta = CourseMeta::from_course_dir(root, "mindful-living");
//! let mut report = RunReport::new();
//!
//! let pdf = generate_course_pdf(root, &meta, &GeneratorOptions::default(), &mut report)
//!     .expect("failed to generate course PDF");
//! println!("wrote {}", pdf.display());
//! ```

pub mod course;
pub mod date;
pub mod error;
pub mod generator;
pub mod layout;
pub mod pdf;
pub mod render;
pub mod report;
pub mod titles;
pub mod walker;

// Re-export commonly used items
pub use error::{Error, Result};
