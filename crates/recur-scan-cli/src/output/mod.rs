mod csv_text;
mod error_text;
mod format;
mod json;
mod mode;
mod text;

use std::io;

use recur_scan_core::{ScanError, SuccessEnvelope};

use crate::stdout_io::write_stdout_line;

pub use mode::{OutputMode, infer_requested_output_mode, mode_for_command};

pub fn print_success(success: &SuccessEnvelope, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Text => render_text_success(success)?,
        OutputMode::Json => json::render_success_json(success)?,
        OutputMode::Csv => csv_text::render_features_csv(&success.data)?,
    };
    write_stdout_line(&body)
}

pub fn print_failure(error: &ScanError, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Json => json::render_error_json(error)?,
        OutputMode::Text | OutputMode::Csv => error_text::render_error(error),
    };
    write_stdout_line(&body)
}

fn render_text_success(success: &SuccessEnvelope) -> io::Result<String> {
    match success.command.as_str() {
        "features" => text::render_features(&success.data),
        "groups" => text::render_groups(&success.data),
        "policy" => text::render_policy(&success.data),
        _ => Err(io::Error::other(format!(
            "unsupported text output command `{}`",
            success.command
        ))),
    }
}
