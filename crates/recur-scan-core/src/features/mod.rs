pub mod amount;
pub mod cadence;
pub mod composer;
pub mod engine;
pub mod grouping;
pub mod history;
pub mod interval;
pub mod policy;
mod stats;

pub use cadence::Cadence;
pub use composer::{FEATURE_NAMES, FeatureVector};
pub use engine::{FeatureBatch, FeatureEngine, GroupSummary, extract_all};
pub use grouping::{GroupingIndex, PeerGroup};
pub use policy::{FEATURE_POLICY_V1, FEATURE_POLICY_VERSION, FeaturePolicy, load_policy};
