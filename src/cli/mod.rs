//! Command-line interface for taskboard
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is implemented in its own submodule; all of them go
//! through the file-backed facade.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::item::{ItemId, Status};
use crate::output::OutputOptions;
use crate::persist::FileBackedManager;

mod add;
mod delete;
mod list;
mod show;
mod update;

/// taskboard - hierarchical work-item tracker
///
/// Tracks plain tasks, epics, and their subtasks, with derived epic
/// rollups, a start-time ordered schedule, and a viewed-item history.
#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the board file (overrides configuration)
    #[arg(long, global = true, env = "TASKBOARD_FILE")]
    pub file: Option<PathBuf>,

    /// Path to the configuration file
    #[arg(long, global = true, env = "TASKBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a task, epic, or subtask
    #[command(subcommand)]
    Add(AddCommands),

    /// List items, optionally restricted to one kind
    List {
        /// Restrict to one kind: task, epic, subtask
        #[arg(long)]
        kind: Option<String>,
    },

    /// Show one item by id (records it in the history)
    Show {
        /// Item id
        id: ItemId,
    },

    /// List the subtasks owned by an epic, in link order
    Subtasks {
        /// Epic id
        epic_id: ItemId,
    },

    /// List scheduled items in start-time order, undated last
    Prioritized,

    /// Show the viewed-item history, most recent last
    History,

    /// Edit an item's fields
    Update {
        /// Item id
        id: ItemId,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New status: new, in_progress, done (not valid for epics)
        #[arg(long)]
        status: Option<String>,

        /// New start time, RFC 3339 or "YYYY-MM-DD HH:MM" (UTC)
        #[arg(long)]
        start: Option<String>,

        /// New duration in minutes
        #[arg(long)]
        duration: Option<i64>,

        /// Remove the scheduled start time
        #[arg(long)]
        clear_start: bool,
    },

    /// Delete one item by id (an epic cascades to its subtasks)
    Delete {
        /// Item id
        id: ItemId,
    },

    /// Delete every item of one kind, or everything
    Clear {
        /// task, epic, subtask, or all
        #[arg(long, default_value = "all")]
        kind: String,
    },
}

/// Item creation subcommands
#[derive(Subcommand, Debug)]
pub enum AddCommands {
    /// Create a standalone task
    Task {
        /// Task name
        name: String,

        /// Free-text description
        #[arg(long, default_value = "")]
        description: String,

        /// Initial status: new, in_progress, done
        #[arg(long)]
        status: Option<String>,

        /// Start time, RFC 3339 or "YYYY-MM-DD HH:MM" (UTC)
        #[arg(long)]
        start: Option<String>,

        /// Duration in minutes
        #[arg(long, default_value_t = 0)]
        duration: i64,
    },

    /// Create an epic (status and schedule are derived from its subtasks)
    Epic {
        /// Epic name
        name: String,

        /// Free-text description
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Create a subtask owned by an epic
    Subtask {
        /// Subtask name
        name: String,

        /// Id of the owning epic
        #[arg(long)]
        epic: ItemId,

        /// Free-text description
        #[arg(long, default_value = "")]
        description: String,

        /// Initial status: new, in_progress, done
        #[arg(long)]
        status: Option<String>,

        /// Start time, RFC 3339 or "YYYY-MM-DD HH:MM" (UTC)
        #[arg(long)]
        start: Option<String>,

        /// Duration in minutes
        #[arg(long, default_value_t = 0)]
        duration: i64,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let path = self.file.clone().unwrap_or_else(|| config.data.file.clone());
        let options = OutputOptions {
            json: self.json || config.output.json,
            quiet: self.quiet,
        };
        let mut board = FileBackedManager::open(&path)?;

        match self.command {
            Commands::Add(command) => add::run(&mut board, command, options),
            Commands::List { kind } => list::run_list(&board, kind.as_deref(), options),
            Commands::Show { id } => show::run(&mut board, id, options),
            Commands::Subtasks { epic_id } => list::run_subtasks(&board, epic_id, options),
            Commands::Prioritized => list::run_prioritized(&board, options),
            Commands::History => list::run_history(&board, options),
            Commands::Update {
                id,
                name,
                description,
                status,
                start,
                duration,
                clear_start,
            } => update::run(
                &mut board,
                update::UpdateOptions {
                    id,
                    name,
                    description,
                    status,
                    start,
                    duration,
                    clear_start,
                },
                options,
            ),
            Commands::Delete { id } => delete::run_delete(&mut board, id, options),
            Commands::Clear { kind } => delete::run_clear(&mut board, &kind, options),
        }
    }
}

/// Parse a start time as RFC 3339 or naive "YYYY-MM-DD HH:MM" (UTC).
pub(crate) fn parse_start_time(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M").map_err(|_| {
        Error::InvalidArgument(format!(
            "unrecognized start time '{raw}' (expected RFC 3339 or YYYY-MM-DD HH:MM)"
        ))
    })?;
    Ok(naive.and_utc())
}

pub(crate) fn parse_status(raw: Option<&str>) -> Result<Status> {
    match raw {
        Some(raw) => raw.parse(),
        None => Ok(Status::New),
    }
}
