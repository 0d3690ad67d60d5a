use crate::cli::Commands;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
    Csv,
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    match command {
        Commands::Features { csv: true, .. } => OutputMode::Csv,
        Commands::Features { json, .. }
        | Commands::Groups { json, .. }
        | Commands::Policy { json, .. } => {
            if *json {
                OutputMode::Json
            } else {
                OutputMode::Text
            }
        }
    }
}

/// Used when argument parsing fails and no `Commands` value exists.
pub fn infer_requested_output_mode(raw_args: &[String]) -> OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return OutputMode::Json;
    }
    OutputMode::Text
}
