//! Command-line shell over `routine_core`.
//!
//! # Responsibility
//! - Parse commands and forward them to one `Store` per invocation.
//! - Flush the store before exiting so no change is lost.

mod commands;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use routine_core::db::DEFAULT_DB_FILE_NAME;
use routine_core::{RoutineCategory, SqliteKvRepository, Store, StoreConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "routine", version, about = "Routines, to-dos and brain dump")]
pub struct Cli {
    /// SQLite file holding the persisted state.
    #[arg(long, global = true, default_value = DEFAULT_DB_FILE_NAME)]
    pub db: PathBuf,

    /// Write rotating logs to this absolute directory instead of stderr.
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recurring routines grouped by time of day.
    #[command(subcommand)]
    Routine(RoutineCommand),
    /// One-off to-dos, trash and archive.
    #[command(subcommand)]
    Todo(TodoCommand),
    /// Free-form brain-dump text.
    #[command(subcommand)]
    Dump(DumpCommand),
    /// Routines not done today and pending to-dos.
    Today,
    /// Print the core version.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum RoutineCommand {
    Add {
        title: String,
        #[arg(long, short, value_enum, default_value_t = CategoryArg::Anytime)]
        category: CategoryArg,
        /// Skip when a routine with the same title exists.
        #[arg(long)]
        unique: bool,
    },
    List {
        #[arg(long, short, value_enum)]
        category: Option<CategoryArg>,
    },
    Done(IdArg),
    Undone(IdArg),
    Edit {
        id: String,
        title: String,
        /// Defaults to the routine's current category.
        #[arg(long, short, value_enum)]
        category: Option<CategoryArg>,
    },
    /// Reorder routines inside one category (0-based offsets).
    Move {
        #[arg(value_enum)]
        category: CategoryArg,
        #[arg(required = true)]
        from: Vec<usize>,
        #[arg(long)]
        to: usize,
    },
    Rm(IdArg),
}

#[derive(Debug, Subcommand)]
pub enum TodoCommand {
    Add {
        title: String,
    },
    List {
        #[arg(long, value_enum, default_value_t = TodoView::Active)]
        view: TodoView,
    },
    Done(IdArg),
    Undone(IdArg),
    Edit {
        id: String,
        title: String,
    },
    /// Reorder active to-dos (0-based offsets).
    Move {
        #[arg(required = true)]
        from: Vec<usize>,
        #[arg(long)]
        to: usize,
    },
    /// Move a to-do to the trash.
    Trash(IdArg),
    Restore(IdArg),
    /// Remove trashed to-dos past the retention window.
    Purge,
    EmptyTrash,
    /// Archive every completed active to-do.
    Archive,
    /// Turn a to-do into a routine.
    Promote {
        id: String,
        #[arg(long, short, value_enum, default_value_t = CategoryArg::Anytime)]
        category: CategoryArg,
    },
    /// Delete a to-do permanently.
    Rm(IdArg),
}

#[derive(Debug, Subcommand)]
pub enum DumpCommand {
    Show,
    /// Replace the brain-dump text (`-` reads stdin).
    Set { text: String },
    /// Send every line to the to-do list and clear the text.
    Send,
}

#[derive(Debug, Args)]
pub struct IdArg {
    /// Full ID or a unique prefix.
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    Morning,
    Anytime,
    Evening,
}

impl From<CategoryArg> for RoutineCategory {
    fn from(value: CategoryArg) -> Self {
        match value {
            CategoryArg::Morning => RoutineCategory::Morning,
            CategoryArg::Anytime => RoutineCategory::Anytime,
            CategoryArg::Evening => RoutineCategory::Evening,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TodoView {
    Active,
    Archived,
    Trash,
    All,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    init_logging(&cli)?;

    if matches!(cli.command, Command::Version) {
        println!("routine_core version={}", routine_core::core_version());
        return Ok(());
    }

    let repo = SqliteKvRepository::open(&cli.db)
        .with_context(|| format!("failed to open `{}`", cli.db.display()))?;
    let mut store = Store::open_with_system_clock(repo, StoreConfig::default());

    let mut out = std::io::stdout().lock();
    commands::dispatch(&mut store, cli.command, &mut out)?;

    let had_changes = store.has_pending_save();
    if !store.close() && had_changes {
        bail!("failed to save changes to `{}`", cli.db.display());
    }
    Ok(())
}

fn init_logging(cli: &Cli) -> Result<()> {
    let level = cli.log_level.as_deref().unwrap_or("warn");
    let started = match &cli.log_dir {
        Some(dir) => routine_core::init_logging(level, &dir.to_string_lossy()),
        None => routine_core::init_stderr_logging(level),
    };
    started.map_err(anyhow::Error::msg)
}
