use recur_scan_core::commands::{self, BatchOptions};
use recur_scan_core::{ScanResult, SuccessEnvelope};

use crate::cli::{Cli, Commands};

pub fn dispatch(cli: &Cli) -> ScanResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Features { path, policy, .. } => {
            commands::features::run(&BatchOptions::new(path, policy.clone()))
        }
        Commands::Groups { path, policy, .. } => {
            commands::groups::run(&BatchOptions::new(path, policy.clone()))
        }
        Commands::Policy { policy, .. } => commands::policy::show(policy.as_deref()),
    }
}
