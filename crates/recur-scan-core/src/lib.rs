pub mod commands;
pub mod contracts;
pub mod error;
pub mod features;
pub mod ingest;
pub mod transaction;

pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use error::{ScanError, ScanResult};
pub use features::{FeatureEngine, FeatureVector, extract_all};
pub use transaction::Transaction;

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
