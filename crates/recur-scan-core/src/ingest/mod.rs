mod parse;
mod validate;

use std::fs;
use std::io::{IsTerminal, Read};
use std::path::Path;

use crate::transaction::Transaction;
use crate::{ScanError, ScanResult};

/// Where a batch of transactions was read from.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum InputSource {
    File(String),
    Stdin,
}

impl InputSource {
    /// `-` selects stdin; anything else is a file path.
    pub fn from_arg(path: &str) -> Self {
        if path == "-" {
            Self::Stdin
        } else {
            Self::File(path.to_string())
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::File(path) => path.clone(),
            Self::Stdin => "stdin".to_string(),
        }
    }
}

/// Reads and validates a CSV or JSON batch from the given source.
pub fn read_transactions(source: &InputSource) -> ScanResult<Vec<Transaction>> {
    let content = match source {
        InputSource::File(path) => fs::read_to_string(path)
            .map_err(|error| ScanError::input_read_failed(Path::new(path), &error.to_string()))?,
        InputSource::Stdin => read_stdin()?,
    };
    let transactions = parse_transactions(&content)?;
    tracing::debug!(
        source = %source.label(),
        transactions = transactions.len(),
        "read transaction batch"
    );
    Ok(transactions)
}

/// Parses an in-memory CSV or JSON document into validated transactions.
pub fn parse_transactions(content: &str) -> ScanResult<Vec<Transaction>> {
    let rows = parse::parse_source(content)?;
    validate::validate_rows(rows)
}

fn read_stdin() -> ScanResult<String> {
    if std::io::stdin().is_terminal() {
        return Err(ScanError::invalid_input(
            "Path `-` means stdin input, but nothing was piped. Pipe CSV/JSON input or pass a file path.",
        ));
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|error| ScanError::input_read_failed(Path::new("-"), &error.to_string()))?;
    Ok(buffer)
}
