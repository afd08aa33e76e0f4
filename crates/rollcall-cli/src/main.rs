//! rollcall operator CLI.
//!
//! Runs against the store file directly, so it belongs on the same box as the
//! server. Today it does one job: load the employee directory from the HR
//! system's CSV dump.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use rollcall_core::store::RegistryStore as _;
use rollcall_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "rollcall operator tools")]
struct Cli {
  /// Path to the SQLite store file.
  #[arg(short, long, default_value = "rollcall.db")]
  store: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Bulk-import the employee directory from a CSV file.
  ///
  /// Existing codes have their attributes overwritten; new codes are
  /// inserted. Required columns: emp_id, name. Optional: position, unit,
  /// cost_center.
  ImportEmployees {
    /// CSV file to import.
    csv: PathBuf,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let store = SqliteStore::open(&cli.store)
    .await
    .with_context(|| format!("failed to open store at {:?}", cli.store))?;

  match cli.command {
    Command::ImportEmployees { csv } => {
      let input = std::fs::read_to_string(&csv)
        .with_context(|| format!("failed to read {csv:?}"))?;

      let rows = rollcall_csv::parse_employees(&input)
        .context("failed to parse employee csv")?;
      let total = rows.len();

      let summary = store
        .upsert_employees(rows)
        .await
        .context("failed to import employees")?;

      println!(
        "imported {total} rows: {} inserted, {} updated",
        summary.inserted, summary.updated,
      );
    }
  }

  Ok(())
}
