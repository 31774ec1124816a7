//! # CLI Module
//!
//! Command-line interface for the file organizer.
//!
//! ## Usage
//! ```bash
//! # Sort ~/Downloads into one folder per extension
//! file-organizer organize ~/Downloads
//!
//! # Sort by month, nested as YYYY/MM
//! file-organizer organize ~/Downloads --mode time --granularity month --nested
//!
//! # Keyword rules, previewed first
//! file-organizer organize ~/Downloads --mode keyword \
//!     --keywords "invoice,receipt; photo,img" --folders "Finance; Pictures" --dry-run
//!
//! # Put the last batch back
//! file-organizer undo ~/Downloads
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use smart_file_organizer::app::{OrganizeRequest, Session};
use smart_file_organizer::config::AppConfig;
use smart_file_organizer::core::classify::TimeGranularity;
use smart_file_organizer::core::history::Batch;
use smart_file_organizer::core::organize::{BatchResult, FileFailure, OrganizePlan};
use smart_file_organizer::core::undo::{UndoOutcome, UndoResult};
use smart_file_organizer::error::Result;
use smart_file_organizer::events::{Event, EventChannel, EventReceiver, OrganizeEvent, UndoEvent};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

/// Smart File Organizer - Tidy a folder, undo any time
#[derive(Parser, Debug)]
#[command(name = "file-organizer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Activity log file (defaults to the platform data directory)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Move the files of a directory into sub-folders
    Organize {
        /// Directory to organize (top-level files only)
        directory: PathBuf,

        /// How to pick each file's folder
        #[arg(short, long, default_value = "extension")]
        mode: Mode,

        /// Time bucket size for --mode time
        #[arg(short, long, default_value = "year")]
        granularity: Granularity,

        /// Nest time folders (2023/07) instead of flat names (2023-07)
        #[arg(long)]
        nested: bool,

        /// Keyword groups for --mode keyword, e.g. "invoice,receipt; photo"
        #[arg(short, long, default_value = "")]
        keywords: String,

        /// One folder per keyword group, separated by `;`, e.g. "Finance; Pictures"
        #[arg(short, long, default_value = "")]
        folders: String,

        /// Show what would move without touching anything
        #[arg(long)]
        dry_run: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Reverse the most recent organize run in a directory
    Undo {
        directory: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// List the runs that can be undone, oldest first
    History {
        directory: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Show or change the saved theme
    Theme {
        /// New theme name
        name: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// One folder per file extension
    Extension,
    /// Folders by modification time
    Time,
    /// Folders by keyword rules
    Keyword,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Granularity {
    Decade,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl From<Granularity> for TimeGranularity {
    fn from(granularity: Granularity) -> Self {
        match granularity {
            Granularity::Decade => TimeGranularity::Decade,
            Granularity::Year => TimeGranularity::Year,
            Granularity::Month => TimeGranularity::Month,
            Granularity::Day => TimeGranularity::Day,
            Granularity::Hour => TimeGranularity::Hour,
            Granularity::Minute => TimeGranularity::Minute,
            Granularity::Second => TimeGranularity::Second,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Parse the command line
pub fn parse() -> Cli {
    Cli::parse()
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Organize {
            directory,
            mode,
            granularity,
            nested,
            keywords,
            folders,
            dry_run,
            output,
            verbose,
        } => {
            let request = match mode {
                Mode::Extension => OrganizeRequest::ByExtension,
                Mode::Time => OrganizeRequest::ByTime {
                    granularity: granularity.into(),
                    nested,
                },
                Mode::Keyword => OrganizeRequest::ByKeyword {
                    groups: keywords,
                    folders,
                },
            };
            if dry_run {
                run_preview(directory, request, output)
            } else {
                run_organize(directory, request, output, verbose)
            }
        }
        Commands::Undo { directory, output } => run_undo(directory, output),
        Commands::History { directory, output } => run_history(directory, output),
        Commands::Theme { name } => run_theme(name),
    }
}

fn print_header(term: &Term, output: OutputFormat) {
    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Smart File Organizer").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }
}

fn run_preview(directory: PathBuf, request: OrganizeRequest, output: OutputFormat) -> Result<()> {
    let term = Term::stderr();
    print_header(&term, output);

    let (sender, _receiver) = EventChannel::new();
    let mut session = Session::new(sender)?;
    session.select_directory(&directory)?;
    let plan = session.preview(request)?;

    match output {
        OutputFormat::Pretty => print_pretty_plan(&term, &plan),
        OutputFormat::Json => print_json(&plan),
    }
    Ok(())
}

fn run_organize(
    directory: PathBuf,
    request: OrganizeRequest,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();
    print_header(&term, output);

    let (sender, receiver) = EventChannel::new();
    let progress = progress_bar(output);
    let event_thread = spawn_event_thread(receiver, progress, verbose);

    let mut session = Session::new(sender)?;
    let result = session
        .select_directory(&directory)
        .and_then(|()| session.organize_and_wait(request));

    // Dropping the session stops the worker, which closes the event channel
    drop(session);
    event_thread.join().ok();

    let result = result?;
    match output {
        OutputFormat::Pretty => print_pretty_batch(&term, &result, verbose),
        OutputFormat::Json => print_json(&result),
    }
    Ok(())
}

fn run_undo(directory: PathBuf, output: OutputFormat) -> Result<()> {
    let term = Term::stderr();
    print_header(&term, output);

    let (sender, receiver) = EventChannel::new();
    let progress = progress_bar(output);
    let event_thread = spawn_event_thread(receiver, progress, false);

    let mut session = Session::new(sender)?;
    let outcome = session
        .select_directory(&directory)
        .and_then(|()| session.undo_and_wait());

    drop(session);
    event_thread.join().ok();

    let outcome = outcome?;
    match output {
        OutputFormat::Pretty => print_pretty_undo(&term, &outcome),
        OutputFormat::Json => print_json(&outcome),
    }
    Ok(())
}

fn run_history(directory: PathBuf, output: OutputFormat) -> Result<()> {
    let term = Term::stdout();

    let (sender, _receiver) = EventChannel::new();
    let mut session = Session::new(sender)?;
    session.select_directory(&directory)?;
    let batches = session.batches()?;

    match output {
        OutputFormat::Pretty => print_pretty_history(&term, &batches),
        OutputFormat::Json => print_json(&batches),
    }
    Ok(())
}

fn run_theme(name: Option<String>) -> Result<()> {
    let path = AppConfig::config_path();
    let mut config = AppConfig::load_or_default(&path);

    match name {
        Some(name) if !name.trim().is_empty() => {
            config.theme = name.trim().to_string();
            config.save_to_path(&path)?;
            tracing::info!(theme = %config.theme, "Theme saved");
            println!("Theme set to {}", style(&config.theme).cyan());
        }
        _ => println!("{}", config.theme),
    }
    Ok(())
}

fn progress_bar(output: OutputFormat) -> Option<ProgressBar> {
    if !matches!(output, OutputFormat::Pretty) {
        return None;
    }
    let pb = ProgressBar::new(0);
    let bar_style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░");
    pb.set_style(bar_style);
    Some(pb)
}

fn spawn_event_thread(
    receiver: EventReceiver,
    progress: Option<ProgressBar>,
    verbose: bool,
) -> JoinHandle<()> {
    thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress else {
                continue;
            };
            match event {
                Event::Organize(OrganizeEvent::Planned { moves, .. }) => {
                    pb.set_length(moves as u64);
                    pb.set_message("Moving files");
                }
                Event::Undo(UndoEvent::Started { moves, .. }) => {
                    pb.set_length(moves as u64);
                    pb.set_message("Restoring files");
                }
                Event::Organize(OrganizeEvent::Progress(p)) | Event::Undo(UndoEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(
                            p.current_path
                                .file_name()
                                .unwrap_or_default()
                                .to_string_lossy()
                                .into_owned(),
                        );
                    }
                }
                Event::Organize(OrganizeEvent::FileFailed { message, .. })
                | Event::Undo(UndoEvent::FileFailed { message, .. }) => {
                    pb.println(format!("{} {}", style("✗").red(), message));
                }
                Event::Organize(OrganizeEvent::Completed { .. })
                | Event::Undo(UndoEvent::Completed { .. })
                | Event::Undo(UndoEvent::NothingToUndo) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    })
}

fn print_pretty_plan(term: &Term, plan: &OrganizePlan) {
    term.write_line(&format!(
        "{} Preview ({})",
        style("●").cyan().bold(),
        plan.mode
    ))
    .ok();
    term.write_line("").ok();

    if plan.is_empty() {
        term.write_line("  Nothing to move.").ok();
    } else {
        for planned in &plan.moves {
            let marker = if planned.renamed {
                style("~").yellow().to_string()
            } else {
                style("→").dim().to_string()
            };
            term.write_line(&format!(
                "  {} {}  {}",
                file_name(&planned.source),
                marker,
                display_relative(&planned.destination, &plan.directory)
            ))
            .ok();
        }
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "  {} to move, {} new folders, {} renamed, {} left in place",
        style(plan.moves.len()).cyan(),
        style(plan.directories_to_create.len()).cyan(),
        style(plan.conflict_count).yellow(),
        style(plan.skipped).dim()
    ))
    .ok();
    print_failures(term, &plan.unreadable);

    term.write_line("").ok();
    term.write_line(&format!("{}", style("Dry run: no files were moved.").dim()))
        .ok();
}

fn print_pretty_batch(term: &Term, result: &BatchResult, verbose: bool) {
    term.write_line("").ok();
    term.write_line(&format!("{} Organization Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files moved in {:.1}s",
        style(result.moved).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} new folders",
        style(result.directories_created.len()).cyan()
    ))
    .ok();
    if result.skipped > 0 {
        term.write_line(&format!(
            "  {} files left in place",
            style(result.skipped).dim()
        ))
        .ok();
    }
    if verbose {
        for dir in &result.directories_created {
            term.write_line(&format!("    {} {}", style("+").green(), dir.display()))
                .ok();
        }
    }
    print_failures(term, &result.failed);

    if let Some(warning) = &result.history_warning {
        term.write_line("").ok();
        term.write_line(&format!(
            "  {} {}",
            style("Warning:").yellow().bold(),
            warning
        ))
        .ok();
    }

    term.write_line("").ok();
    if result.batch_id.is_some() {
        term.write_line(&format!(
            "{}",
            style("Run `file-organizer undo` on this folder to put everything back.").dim()
        ))
        .ok();
    } else {
        term.write_line(&format!("{}", style("Nothing was moved.").dim()))
            .ok();
    }
}

fn print_pretty_undo(term: &Term, outcome: &UndoOutcome) {
    term.write_line("").ok();
    match outcome {
        UndoOutcome::NothingToUndo { history_warning } => {
            if let Some(warning) = history_warning {
                term.write_line(&format!(
                    "  {} {}",
                    style("Warning:").yellow().bold(),
                    warning
                ))
                .ok();
            }
            term.write_line(&format!(
                "{} History is empty. Nothing to undo.",
                style("●").dim()
            ))
            .ok();
        }
        UndoOutcome::Undone(result) => print_pretty_undo_result(term, result),
    }
}

fn print_pretty_undo_result(term: &Term, result: &UndoResult) {
    term.write_line(&format!("{} Undo Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();
    term.write_line(&format!(
        "  {} files restored in {:.1}s",
        style(result.restored).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} empty folders removed",
        style(result.directories_removed.len()).cyan()
    ))
    .ok();
    for dir in &result.directories_kept {
        term.write_line(&format!(
            "  {} kept {} (not empty)",
            style("!").yellow(),
            dir.display()
        ))
        .ok();
    }
    print_failures(term, &result.failed);
}

fn print_pretty_history(term: &Term, batches: &[Batch]) {
    if batches.is_empty() {
        term.write_line("History is empty. Nothing to undo.").ok();
        return;
    }
    for (i, batch) in batches.iter().enumerate() {
        term.write_line(&format!(
            "{} {}  {}  {} files, {} new folders",
            style(format!("{:>3}.", i + 1)).bold(),
            batch.created_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S"),
            style(&batch.mode).yellow(),
            batch.moves.len(),
            batch.created_directories.len()
        ))
        .ok();
    }
    term.write_line(&format!(
        "{}",
        style("The last entry is undone first.").dim()
    ))
    .ok();
}

fn print_failures(term: &Term, failures: &[FileFailure]) {
    if failures.is_empty() {
        return;
    }
    term.write_line("").ok();
    term.write_line(&format!(
        "  {} {} files could not be handled:",
        style("✗").red().bold(),
        failures.len()
    ))
    .ok();
    for failure in failures {
        term.write_line(&format!("    {}: {}", failure.path.display(), failure.reason))
            .ok();
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}
