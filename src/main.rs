//! visaflow CLI entry point.
//!
//! Offline maintenance of the flowchart data directory (repair, style
//! stripping, validation) plus timeline and export rendering of a single
//! program.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use visaflow::catalog::{DEFAULT_DATA_DIR, DataFile, normalize_dir};
use visaflow::config::{RenderConfig, TimelineConfig};
use visaflow::renderers::charset::CharSet;
use visaflow::renderers::{Container, ExportFormat, SvgGenerator, export};
use visaflow::reconcile::Reconciler;
use visaflow::repair::{Repairer, repair_dir};
use visaflow::steps::fill_dir;
use visaflow::styles::strip_dir;
use visaflow::validate::validate_dir;

#[derive(Parser, Debug)]
#[command(
    name = "visaflow",
    version = env!("VISAFLOW_VERSION"),
    about = "Immigration program flowcharts: repair, validate and render"
)]
struct Cli {
    /// Log progress (info level); RUST_LOG overrides
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrite diagram node ids to match their programs' step ids
    Repair {
        #[arg(default_value = DEFAULT_DATA_DIR)]
        dir: PathBuf,
    },
    /// Add template steps for diagram nodes that have none
    MissingSteps {
        #[arg(default_value = DEFAULT_DATA_DIR)]
        dir: PathBuf,
        /// Append the generated steps to the data files
        #[arg(long)]
        write: bool,
        /// Write a report of the generated steps to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Rename program keys to match their programId
    FixKeys {
        #[arg(default_value = DEFAULT_DATA_DIR)]
        dir: PathBuf,
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove `style` lines from every diagram
    StripStyles {
        #[arg(default_value = DEFAULT_DATA_DIR)]
        dir: PathBuf,
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },
    /// Check diagrams against their steps and graph preconditions
    Validate {
        #[arg(default_value = DEFAULT_DATA_DIR)]
        dir: PathBuf,
    },
    /// Print the vertical timeline of one program
    Timeline {
        file: PathBuf,
        /// Program key or programId
        program: String,
        /// Use plain ASCII instead of Unicode box-drawing characters
        #[arg(short = 'a', long = "ascii")]
        use_ascii: bool,
        /// Label for branches whose edge has none
        #[arg(long, default_value = "Path")]
        fallback_label: String,
    },
    /// Render one program's diagram and write it as SVG or PNG
    Export {
        file: PathBuf,
        /// Program key or programId
        program: String,
        #[arg(short, long, default_value = "svg")]
        format: ExportFormat,
        /// Output path (defaults to `{programId}-flowchart.{ext}`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("error: {msg}");
    process::exit(1);
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Repair { dir } => repair(dir),
        Command::MissingSteps { dir, write, report } => missing_steps(dir, write, report),
        Command::FixKeys { dir, dry_run } => fix_keys(dir, dry_run),
        Command::StripStyles { dir, dry_run } => strip_styles(dir, dry_run),
        Command::Validate { dir } => validate(dir),
        Command::Timeline {
            file,
            program,
            use_ascii,
            fallback_label,
        } => timeline(file, &program, use_ascii, fallback_label),
        Command::Export {
            file,
            program,
            format,
            output,
        } => export_program(file, &program, format, output),
    }
}

// ─── Commands ────────────────────────────────────────────────────────────────

fn repair(dir: PathBuf) {
    let summary = repair_dir(&Repairer::default(), &dir).unwrap_or_else(|e| fail(e));

    for p in &summary.programs {
        if p.outcome.changed() {
            println!("{} - {}:", p.file, p.program_key);
            for (from, to) in &p.outcome.mappings {
                println!("  {from} -> {to}");
            }
        }
        if p.outcome.capped {
            println!(
                "  warning: {} stopped after {} passes",
                p.program_key, p.outcome.iterations
            );
        }
        if !p.outcome.unresolved.is_empty() {
            println!(
                "  unresolved in {}: {}",
                p.program_key,
                p.outcome.unresolved.join(", ")
            );
        }
    }

    println!();
    println!("Summary:");
    println!("  Files scanned:    {}", summary.files_scanned);
    println!("  Files modified:   {}", summary.files_modified);
    println!("  Ids fixed:        {}", summary.ids_fixed);
    println!("  Capped programs:  {}", summary.capped().count());
    println!("  Unresolved nodes: {}", summary.unresolved_count());
    for e in &summary.errors {
        println!("  error: {e}");
    }
}

fn missing_steps(dir: PathBuf, write: bool, report: Option<PathBuf>) {
    let summary = fill_dir(&Reconciler::default(), &dir, write).unwrap_or_else(|e| fail(e));
    for p in &summary.programs {
        let ids: Vec<&str> = p.steps.iter().map(|s| s.id.as_str()).collect();
        println!("{} - {}: {}", p.file, p.program_key, ids.join(", "));
    }
    if let Some(path) = report {
        if let Err(e) = fs::write(&path, summary.report()) {
            fail(format!("cannot write '{}': {e}", path.display()));
        }
        println!("Report saved to: {}", path.display());
    }
    println!();
    println!("Summary:");
    println!("  Files scanned:       {}", summary.files_scanned);
    println!("  Files modified:      {}", summary.files_modified);
    println!("  Total missing steps: {}", summary.step_count());
    for e in &summary.errors {
        println!("  error: {e}");
    }
}

fn fix_keys(dir: PathBuf, dry_run: bool) {
    if dry_run {
        println!("Dry run: no files will be written");
    }
    let summary = normalize_dir(&dir, dry_run).unwrap_or_else(|e| fail(e));
    for r in &summary.renames {
        println!("  {}: {} -> {}", r.file, r.from, r.to);
    }
    println!();
    println!("Summary:");
    println!("  Files processed: {}", summary.files_processed);
    println!("  Files modified:  {}", summary.files_modified);
    println!("  Keys renamed:    {}", summary.renames.len());
    for e in &summary.errors {
        println!("  error: {e}");
    }
}

fn strip_styles(dir: PathBuf, dry_run: bool) {
    if dry_run {
        println!("Dry run: no files will be written");
    }
    let summary = strip_dir(&dir, dry_run).unwrap_or_else(|e| fail(e));
    for (file, removed) in &summary.modified {
        println!("  {file}: {removed} style line(s)");
    }
    println!();
    println!("Summary:");
    println!("  Files processed: {}", summary.files_processed);
    println!("  Files modified:  {}", summary.files_modified);
    println!("  Styles removed:  {}", summary.styles_removed);
    println!("  Errors:          {}", summary.errors.len());
    for e in &summary.errors {
        println!("  error: {e}");
    }
}

fn validate(dir: PathBuf) {
    let summary = validate_dir(&dir).unwrap_or_else(|e| fail(e));
    for p in &summary.failed {
        println!("{} - {} ({}):", p.file, p.program_key, p.program_name);
        for issue in &p.issues {
            println!("  [{}] {issue}", issue.kind());
        }
    }
    println!();
    println!("Summary:");
    println!("  Programs checked:   {}", summary.programs_checked);
    println!("  Passed:             {}", summary.passed());
    println!("  Total issues:       {}", summary.issue_count());
    println!("  Case mismatches:    {}", summary.count_of("case-mismatch"));
    println!("  Missing steps:      {}", summary.count_of("missing-step"));
    println!("  Orphaned steps:     {}", summary.count_of("orphaned-step"));
    for e in &summary.errors {
        println!("  error: {e}");
    }
    if !summary.is_clean() {
        process::exit(1);
    }
}

fn timeline(file: PathBuf, key: &str, use_ascii: bool, fallback_label: String) {
    let data = DataFile::load(&file).unwrap_or_else(|e| fail(e));
    let program = data.program(key).unwrap_or_else(|e| fail(e));
    let config = TimelineConfig {
        fallback_branch_label: fallback_label,
        charset: if use_ascii { CharSet::Ascii } else { CharSet::Unicode },
        ..TimelineConfig::default()
    };
    let text = visaflow::render_program_timeline(program, &config).unwrap_or_else(|e| fail(e));
    print!("{text}");
}

fn export_program(file: PathBuf, key: &str, format: ExportFormat, output: Option<PathBuf>) {
    let data = DataFile::load(&file).unwrap_or_else(|e| fail(e));
    let program = data.program(key).unwrap_or_else(|e| fail(e));
    let config = RenderConfig::default();
    let render_id = format!("{}-{}-1", config.node_id_prefix, program.program_id);
    let svg = SvgGenerator::new(config)
        .render(&render_id, &program.diagram_text)
        .unwrap_or_else(|e| fail(e));

    let mut container = Container::new();
    container.insert(svg).unwrap_or_else(|e| fail(e));
    let blob = export(&container, &program.program_id, format).unwrap_or_else(|e| fail(e));

    let path = output.unwrap_or_else(|| PathBuf::from(&blob.file_name));
    if let Err(e) = fs::write(&path, &blob.bytes) {
        fail(format!("cannot write '{}': {e}", path.display()));
    }
    println!("wrote {} ({}, {} bytes)", path.display(), blob.mime, blob.bytes.len());
}
