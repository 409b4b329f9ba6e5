//! Time accounting and scoring engine.
//!
//! Replays work item state histories against a business-hours clock, scores
//! each item and aggregates the scores per developer.

#![warn(missing_docs)]

pub mod clock;
pub mod stack;
pub mod efficiency;
pub mod kpi;
pub mod analyzer;

pub use clock::BusinessHoursClock;
pub use stack::{StateTransitionStack, StateBottleneck, DEFAULT_BOTTLENECK_THRESHOLD_HOURS};
pub use efficiency::{traditional_efficiency, DeliveryBucket, EfficiencyCalculator};
pub use kpi::DeveloperKpiAggregator;
pub use analyzer::WorkItemAnalyzer;
