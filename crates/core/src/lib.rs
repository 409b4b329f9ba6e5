//! DevPulse core data models.
//!
//! This crate defines the work item, revision, efficiency and KPI records
//! shared by the metrics engine, the project cache and the CLI, plus the
//! immutable analysis configuration they are built from.

#![warn(missing_docs)]

// Identities
mod id;

// Errors
mod error;

// Configuration
mod config;

// Tracker input
mod work_item;
mod project;

// Derived records
mod efficiency;
mod kpi;

// Re-exports
pub use id::RunId;
pub use error::{ConfigError, RevisionError};

pub use config::{
    AnalysisConfig, ConfigBuilder, ConfigOverrides, StateCategoryConfig, TimeBucket,
    BusinessHoursConfig, ScoringConfig, EarlyDeliveryConfig, EarlyTiers, LateDeliveryConfig,
    LateTiers, DeveloperScoringConfig, ScoreWeights, FALLBACK_ITEM_HOURS,
};
pub use work_item::{StateEvent, RawRevision, WorkItemSnapshot, WorkItemInput, parse_timestamp};
pub use project::Project;
pub use efficiency::{EfficiencyRecord, RecordStatus, PatternSummary, DeliveryTiming};
pub use kpi::{
    DeveloperMetrics, DeliveryTimingBreakdown, Bottleneck, OverallSummary, KpiReport,
    ScoredWorkItem, AnalysisReport, UNASSIGNED,
};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;

/// Round a value to two decimal places.
///
/// Applied once when a record is emitted, never to intermediate values.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
