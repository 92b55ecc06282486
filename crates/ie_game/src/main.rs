mod app;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, error};

use app::bootstrap::{build_app, init_tracing};
use app::commands;

#[derive(Debug, Parser)]
#[command(name = "ie_game", version)]
#[command(about = "Inspect and maintain save-game slots")]
struct Args {
    /// Engine config file; searched for when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Dump a 2DA table, or one cell of it
    Table {
        path: PathBuf,
        row: Option<usize>,
        column: Option<usize>,
    },
    #[command(flatten)]
    Slots(SlotCommand),
}

/// Commands that work on the configured save directory.
#[derive(Debug, Subcommand)]
enum SlotCommand {
    /// List every valid save slot
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one slot by its display name
    Show {
        name: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete one slot by its display name
    Delete { name: String },
    /// Rotate the quick saves stored under a label
    PruneQuick {
        label: String,
        /// Slot index of the newest quick save
        #[arg(long, default_value_t = 0)]
        base: u32,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "command_failed");
            ExitCode::from(1)
        }
    }
}

fn run(args: Args) -> Result<()> {
    let command = match args.command {
        Command::Table { path, row, column } => return commands::table(&path, row.zip(column)),
        Command::Slots(command) => command,
    };

    let mut wiring = build_app(args.config.as_deref())?;
    debug!(config = %wiring.config_path.display(), "cli_ready");
    match command {
        SlotCommand::List { json } => commands::list(&mut wiring, json),
        SlotCommand::Show { name, json } => commands::show(&mut wiring, &name, json),
        SlotCommand::Delete { name } => commands::delete(&mut wiring, &name),
        SlotCommand::PruneQuick { label, base, json } => {
            commands::prune_quick(&mut wiring, &label, base, json)
        }
    }
}
