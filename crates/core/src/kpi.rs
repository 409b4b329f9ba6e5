//! Per-developer and organization-level KPI records.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::efficiency::EfficiencyRecord;
use crate::id::RunId;
use crate::work_item::WorkItemSnapshot;
use crate::Time;

/// Assignee key used for items with no assignee.
pub const UNASSIGNED: &str = "Unassigned";

/// A work item together with its efficiency record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredWorkItem {
    /// Snapshot the record was computed from
    pub item: WorkItemSnapshot,

    /// Scoring output
    pub efficiency: EfficiencyRecord,
}

impl ScoredWorkItem {
    /// Assignee key, falling back to [`UNASSIGNED`].
    pub fn assignee(&self) -> &str {
        match self.item.assignee.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => UNASSIGNED,
        }
    }
}

/// Count of scored items per delivery timing bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DeliveryTimingBreakdown {
    /// At least one day early
    pub early: usize,
    /// Less than a day early, or exactly on target
    pub on_time: usize,
    /// Up to 3 days late
    pub late_1_3: usize,
    /// Up to 7 days late
    pub late_4_7: usize,
    /// Up to 14 days late
    pub late_8_14: usize,
    /// More than 14 days late
    pub late_15_plus: usize,
}

/// Aggregate metrics for one assignee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeveloperMetrics {
    /// Items assigned (externally supplied total, or items seen)
    pub total_work_items: usize,

    /// Items whose current state is a completion state
    pub completed_items: usize,

    /// Items that carried efficiency data
    pub items_with_efficiency: usize,

    /// completed / total, percent
    pub completion_rate: f64,

    /// On-time or early share of scored items, percent
    pub on_time_delivery_percentage: f64,

    /// Mean fair efficiency over scored items
    pub average_fair_efficiency: f64,

    /// Mean delivery score over scored items
    pub average_delivery_score: f64,

    /// Weighted overall score
    pub overall_developer_score: f64,

    /// Sum of productive hours
    pub total_active_hours: f64,

    /// Sum of estimated hours
    pub total_estimated_hours: f64,

    /// Mean days ahead (negative) or behind target
    pub average_days_ahead_behind: f64,

    /// Scored items that were reopened
    pub reopened_items_handled: usize,

    /// Reopened share of scored items, percent
    pub reopened_rate: f64,

    /// Distinct work item types
    pub work_item_types: Vec<String>,

    /// Distinct projects
    pub projects: Vec<String>,

    /// Delivery timing histogram
    pub delivery_timing_breakdown: DeliveryTimingBreakdown,
}

/// A state with high average accumulated time across items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bottleneck {
    /// State label
    pub state: String,

    /// Average hours per occurrence
    pub average_time_hours: f64,

    /// Number of items that recorded time in the state
    pub occurrences: usize,
}

/// Organization-level summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OverallSummary {
    /// Items aggregated
    pub total_work_items: usize,

    /// Distinct assignees
    pub total_developers: usize,

    /// Mean of per-developer average fair efficiency
    pub average_fair_efficiency: f64,

    /// Mean of per-developer average delivery score
    pub average_delivery_score: f64,

    /// Sum of per-developer active hours
    pub total_active_hours: f64,
}

/// Output of the KPI aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KpiReport {
    /// Organization summary
    pub overall_summary: OverallSummary,

    /// Metrics by assignee
    pub developer_metrics: BTreeMap<String, DeveloperMetrics>,

    /// Top states by average time, descending
    pub bottlenecks: Vec<Bottleneck>,
}

/// Full output of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Run identifier
    pub run_id: RunId,

    /// When the report was produced
    pub generated_at: Time,

    /// Timeframe start applied to productive time
    pub timeframe_start: Option<NaiveDate>,

    /// Timeframe end applied to productive time
    pub timeframe_end: Option<NaiveDate>,

    /// Per-item records, in input order
    pub items: Vec<ScoredWorkItem>,

    /// Aggregated KPIs
    pub kpis: KpiReport,
}
