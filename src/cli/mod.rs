pub mod entry;
pub mod output;
pub mod seed;

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::Result;
use chrono::Datelike;
use clap::{Parser, Subcommand};
use entry::{process_edit_command, process_today_command, EditCommand, TodayCommand};
use output::{
    ledger_view::{group_by_year, render_ledger},
    reflection::render_reflection,
};
use seed::{process_seed_command, SeedCommand};
use tracing::{error, level_filters::LevelFilter};

use crate::{
    engine::recompute,
    store::{json_store::JsonStore, LedgerStore},
    utils::{
        clock::{today, Clock, DefaultClock},
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "jaapledger", version, long_about = None)]
#[command(about = "Personal ledger for daily jaap counts and crore milestones", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Print logs to the console as well")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Record today's count, or show it when no count is given")]
    Today {
        #[command(flatten)]
        command: TodayCommand,
    },
    #[command(about = "Update an entry from the last 7 days")]
    Edit {
        #[command(flatten)]
        command: EditCommand,
    },
    #[command(about = "Show yearly and lifetime totals, progress and milestones")]
    Show {},
    #[command(about = "Show recorded entries grouped by year")]
    Ledger {
        #[arg(long, help = "Expand previous years as well")]
        all: bool,
    },
    #[command(about = "Set the baseline and milestones reached before the ledger was started")]
    Seed {
        #[command(flatten)]
        command: SeedCommand,
    },
}

const ENTRY_FAILURE: &str = "Failed to update entry. Please try again.";
const REFLECTION_FAILURE: &str = "Failed to update reflection. Please try again.";
const LEDGER_FAILURE: &str = "Failed to update ledger. Please try again.";
const SEED_FAILURE: &str = "Failed to save baseline/milestones. Please try again.";

pub async fn run_cli() -> Result<ExitCode> {
    let args = Args::parse();

    let app_dir = match args.dir {
        Some(dir) => ensure_dir(dir)?,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let store = JsonStore::new(app_dir.join("store"))?;
    let succeeded = run_command(
        args.commands,
        &store,
        &DefaultClock,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    )
    .await;

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Runs one command as its own error boundary. A failure is logged and reported on `err`: clap
/// validation errors with their own message, everything else with the notice for the command.
/// Output is only written once the operation has fully succeeded, so a failure never shows a
/// half-updated state.
async fn run_command(
    commands: Commands,
    store: &impl LedgerStore,
    clock: &dyn Clock,
    out: &mut impl Write,
    err: &mut impl Write,
) -> bool {
    let (result, notice) = match commands {
        Commands::Today { command } => (
            process_today_command(command, store, clock, out).await,
            ENTRY_FAILURE,
        ),
        Commands::Edit { command } => (
            process_edit_command(command, store, clock, out).await,
            ENTRY_FAILURE,
        ),
        Commands::Show {} => (
            process_show_command(store, clock, out).await,
            REFLECTION_FAILURE,
        ),
        Commands::Ledger { all } => (
            process_ledger_command(all, store, clock, out).await,
            LEDGER_FAILURE,
        ),
        Commands::Seed { command } => (
            process_seed_command(command, store, clock, out).await,
            SEED_FAILURE,
        ),
    };

    let Err(e) = result else {
        return true;
    };
    error!("Command failed {e:?}");
    // Nothing sensible is left to do when stderr is gone.
    let _ = match e.downcast_ref::<clap::Error>() {
        Some(validation) => write!(err, "{}", validation.render()),
        None => writeln!(err, "{notice}"),
    };
    false
}

async fn process_show_command(
    store: &impl LedgerStore,
    clock: &dyn Clock,
    out: &mut impl Write,
) -> Result<()> {
    let reflection = recompute(store, today(clock).year()).await?;
    render_reflection(&reflection, out)?;
    Ok(())
}

async fn process_ledger_command(
    all: bool,
    store: &impl LedgerStore,
    clock: &dyn Clock,
    out: &mut impl Write,
) -> Result<()> {
    let today = today(clock);
    let entries = store.list_entries_desc().await?;
    let groups = group_by_year(entries, today);
    render_ledger(&groups, today.year(), all, out)?;
    Ok(())
}
