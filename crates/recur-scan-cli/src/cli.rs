use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Extended help shown after `recur-scan features --help`.
pub const FEATURES_AFTER_HELP: &str = "\
Input format:
  <path> is a local CSV or JSON file. Use `-` to read stdin.
  Example: cat tx.csv | recur-scan features -

  CSV (header + rows; extra columns are ignored):
  id,user_id,name,date,amount
  1,u_42,Netflix,2026-01-03,15.99
  2,u_42,Netflix,2026-02-02,15.99

  JSON (one top-level array):
  [
    { \"id\": 1, \"user_id\": \"u_42\", \"name\": \"Netflix\", \"date\": \"2026-01-03\", \"amount\": 15.99 }
  ]

Field rules:
  id       optional non-negative integer, unique per file (defaults to the row index)
  user_id  required, non-empty
  name     required, non-empty; matched exactly, case and spacing included
  date     required, YYYY-MM-DD
  amount   required, positive number

Policy overrides:
  Pass --policy <file.toml> to override thresholds.
  Run `recur-scan policy` to print the defaults.";

#[derive(Debug, Parser)]
#[command(
    name = "recur-scan",
    version,
    about = "Per-transaction recurrence features for transaction batches"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute one feature vector per transaction
    #[command(after_help = FEATURES_AFTER_HELP)]
    Features {
        path: String,
        #[arg(long, value_name = "FILE")]
        policy: Option<PathBuf>,
        #[arg(long, conflicts_with = "csv")]
        json: bool,
        /// Emit one CSV row per transaction with every feature as a column
        #[arg(long)]
        csv: bool,
    },
    /// Summarize cadence and amount stability per (user_id, name) group
    Groups {
        path: String,
        #[arg(long, value_name = "FILE")]
        policy: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Print the effective feature policy
    Policy {
        #[arg(long, value_name = "FILE")]
        policy: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
pub fn parse_from<I, T>(itr: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(itr)
}
