//! Taskdeck operator CLI.
//!
//! One command matters here: `taskdeck migrate` decomposes the legacy
//! single-table schema into the three-table schema. The exit code tells a
//! deployment script what happened: `0` success, `2` validation rejected
//! (nothing changed; includes an already-applied migration), `3`
//! verification rejected (transaction rolled back, nothing changed), `1`
//! anything else.

use clap::{Parser, Subcommand};
use mockable::{Clock, DefaultClock};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use taskdeck::migration::{self, MigrationError};
use taskdeck::task::adapters::sqlite;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Validation rejected the run; the datastore is untouched.
const EXIT_VALIDATION_REJECTED: u8 = 2;
/// Verification rejected the run; the transaction rolled back.
const EXIT_VERIFICATION_REJECTED: u8 = 3;

#[derive(Parser)]
#[command(name = "taskdeck", about = "Task-capture storage administration")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Migrate the legacy single-table schema to the three-table schema.
    Migrate {
        /// Path to the SQLite database file.
        #[arg(long)]
        database: PathBuf,

        /// Skip the pre-migration file snapshot. Without a snapshot there is
        /// no recovery path from corruption discovered after commit.
        #[arg(long)]
        skip_backup: bool,
    },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match Cli::parse().command {
        Command::Migrate {
            database,
            skip_backup,
        } => migrate(&database, skip_backup),
    }
}

fn migrate(database: &Path, skip_backup: bool) -> ExitCode {
    let clock = DefaultClock;

    if skip_backup {
        info!("snapshot skipped on request");
    } else {
        match snapshot(database, &clock) {
            Ok(backup) => info!(backup = %backup.display(), "pre-migration snapshot taken"),
            Err(err) => {
                error!(%err, "could not snapshot the database; refusing to migrate");
                return ExitCode::FAILURE;
            }
        }
    }

    let database_url = database.display().to_string();
    let mut conn = match sqlite::connect(&database_url) {
        Ok(conn) => conn,
        Err(err) => {
            error!(%err, "could not open the database");
            return ExitCode::FAILURE;
        }
    };

    match migration::run(&mut conn, &clock) {
        Ok(report) => {
            info!(
                tasks = report.summary.tasks,
                workbench_rows = report.summary.workbench,
                todo_rows = report.summary.todos,
                graduated = report.graduated,
                "migration committed"
            );
            ExitCode::SUCCESS
        }
        Err(err @ (MigrationError::AlreadyApplied { .. } | MigrationError::Validation(_))) => {
            error!(%err, "migration rejected before any change");
            ExitCode::from(EXIT_VALIDATION_REJECTED)
        }
        Err(err @ MigrationError::Verification(_)) => {
            error!(%err, "migration rolled back; investigate before retrying");
            ExitCode::from(EXIT_VERIFICATION_REJECTED)
        }
        Err(err) => {
            error!(%err, "migration failed");
            ExitCode::FAILURE
        }
    }
}

/// Copies the database file aside before the engine touches it.
fn snapshot(database: &Path, clock: &impl Clock) -> std::io::Result<PathBuf> {
    let stamp = clock.utc().format("%Y%m%dT%H%M%SZ");
    let backup = PathBuf::from(format!("{}.backup-{stamp}", database.display()));
    std::fs::copy(database, &backup)?;
    Ok(backup)
}
