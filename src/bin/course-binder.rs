//! Course Binder CLI tool
//!
//! Builds one navigable PDF per course from its downloaded resource tree.

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use course_binder::course::CourseMeta;
use course_binder::date::parse_date_arg;
use course_binder::generator::{generate_course_pdf, GeneratorOptions};
use course_binder::pdf::{count_pages, DEFAULT_BATCH_SIZE};
use course_binder::report::RunReport;
use course_binder::walker;

/// Course Binder - aggregate course resources into a single PDF
#[derive(Parser)]
#[command(name = "course-binder")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Build the aggregated PDF for a course
    course-binder build data/courses/mindful-living

    # Build with an explicit output path and cover date
    course-binder build data/courses/mindful-living -o mindful.pdf --date 2026-08-01

    # Preview the reading order without converting anything
    course-binder plan data/courses/mindful-living")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the aggregated course PDF
    Build {
        /// Course directory containing downloads/
        course_root: PathBuf,

        /// Course id (defaults to the course directory name)
        #[arg(long)]
        course_id: Option<String>,

        /// Output PDF path (defaults to <course_root>/<course_id>_resources.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cover date ("today", "2026-08-01", or "8/1/2026")
        #[arg(long)]
        date: Option<String>,

        /// Documents per merge batch
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },

    /// Print the ordered conversion targets without converting
    Plan {
        /// Course directory containing downloads/
        course_root: PathBuf,
    },

    /// Show the page count of a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            course_root,
            course_id,
            output,
            date,
            batch_size,
        } => cmd_build(course_root, course_id, output, date, batch_size),
        Commands::Plan { course_root } => cmd_plan(course_root),
        Commands::Info { input } => cmd_info(input),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn course_id_for(course_root: &PathBuf, explicit: Option<String>) -> anyhow::Result<String> {
    match explicit {
        Some(id) => Ok(id),
        None => course_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("cannot derive a course id from the course directory"),
    }
}

fn cmd_build(
    course_root: PathBuf,
    course_id: Option<String>,
    output: Option<PathBuf>,
    date: Option<String>,
    batch_size: usize,
) -> anyhow::Result<()> {
    if !course_root.is_dir() {
        bail!("course directory not found: {}", course_root.display());
    }

    let id = course_id_for(&course_root, course_id)?;
    let meta = CourseMeta::from_course_dir(&course_root, &id);

    let date = date
        .as_deref()
        .map(parse_date_arg)
        .transpose()
        .context("invalid --date")?;

    let options = GeneratorOptions {
        output,
        batch_size,
        date,
        ..GeneratorOptions::default()
    };

    let mut report = RunReport::new();
    let output_path = generate_course_pdf(&course_root, &meta, &options, &mut report)
        .with_context(|| format!("generation failed for {id}"))?;

    for skipped in &report.skipped {
        eprintln!("skipped: {} ({})", skipped.path.display(), skipped.reason);
    }
    for fallback in &report.fallbacks {
        eprintln!("fallback: {fallback}");
    }

    let pages = count_pages(&output_path)?;
    println!("{} ({} pages)", output_path.display(), pages);
    Ok(())
}

fn cmd_plan(course_root: PathBuf) -> anyhow::Result<()> {
    let downloads = course_root.join("downloads");
    if !downloads.is_dir() {
        bail!("downloads directory not found: {}", downloads.display());
    }

    let modules = walker::scan(&downloads)?;
    let targets = walker::plan_targets(&modules);
    if targets.is_empty() {
        bail!("no convertible files found under {}", downloads.display());
    }

    for target in &targets {
        println!("{}  <-  {}", target.output_name, target.source.path.display());
    }
    eprintln!("{} files across {} modules", targets.len(), modules.len());
    Ok(())
}

fn cmd_info(input: PathBuf) -> anyhow::Result<()> {
    let pages = count_pages(&input).with_context(|| format!("cannot read {}", input.display()))?;
    println!("File: {}", input.display());
    println!("Pages: {pages}");
    Ok(())
}
