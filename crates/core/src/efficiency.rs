//! Per-item efficiency record and state pattern summary.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Why a record does or does not carry metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Metrics were computed
    Scored,
    /// Fewer than two events; nothing to report
    InsufficientHistory,
    /// An ignored state was seen; the item is excluded from scoring
    Ignored,
}

/// Patterns observed while replaying an item's state history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PatternSummary {
    /// A completion state was followed by a productive state
    pub was_reopened: bool,

    /// Productive hours accumulated after the reopen
    pub active_hours_after_reopen: f64,

    /// A completion state was entered at least once
    pub is_completed: bool,

    /// An ignored state was seen
    pub should_ignore: bool,

    /// Distinct states entered
    pub states_visited: BTreeSet<String>,

    /// Number of recorded (non-ignored) transitions
    pub transition_count: usize,

    /// Whole days of wall-clock time across closed intervals
    pub total_calendar_days: i64,

    /// Productive states that accumulated time
    pub productive_states_used: Vec<String>,

    /// Paused states that accumulated time
    pub paused_states_used: Vec<String>,
}

/// Delivery timing of an item relative to its target date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeliveryTiming {
    /// Delivery score of the tier
    pub delivery_score: f64,

    /// Bonus hours for early delivery
    pub timing_bonus_hours: f64,

    /// Hours added to the denominator for late delivery
    pub penalty_mitigation: f64,

    /// Closed minus target, in fractional days; negative is early
    pub days_difference: f64,
}

impl DeliveryTiming {
    /// Timing used when either date is missing.
    pub fn neutral() -> Self {
        Self {
            delivery_score: 100.0,
            timing_bonus_hours: 0.0,
            penalty_mitigation: 0.0,
            days_difference: 0.0,
        }
    }
}

/// Scoring output for one work item. Numeric fields are rounded to two
/// decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyRecord {
    /// Whether metrics were computed
    pub status: RecordStatus,

    /// Business hours in productive states
    pub productive_hours: f64,

    /// Business hours in paused states
    pub paused_hours: f64,

    /// Business hours across all closed intervals
    pub total_hours: f64,

    /// Estimated effort
    pub estimated_hours: f64,

    /// Productive share of non-paused time, percent
    pub traditional_efficiency: f64,

    /// Bounded fair efficiency score
    pub fair_efficiency_score: f64,

    /// Delivery timing score
    pub delivery_score: f64,

    /// Completion bonus hours
    pub completion_bonus: f64,

    /// Early delivery bonus hours
    pub timing_bonus: f64,

    /// Late delivery mitigation hours
    pub late_penalty_mitigation: f64,

    /// Days ahead (negative) or behind (positive) target
    pub days_ahead_behind: f64,

    /// Hours per productive or neutral state
    pub state_breakdown: BTreeMap<String, f64>,

    /// Hours per paused state
    pub paused_state_breakdown: BTreeMap<String, f64>,

    /// Replay pattern summary
    pub pattern: PatternSummary,
}

impl EfficiencyRecord {
    /// Record for an item with too little history to score.
    pub fn empty() -> Self {
        Self::blank(RecordStatus::InsufficientHistory)
    }

    /// Record for an item excluded by an ignored state.
    pub fn ignored() -> Self {
        let mut record = Self::blank(RecordStatus::Ignored);
        record.pattern.should_ignore = true;
        record
    }

    fn blank(status: RecordStatus) -> Self {
        Self {
            status,
            productive_hours: 0.0,
            paused_hours: 0.0,
            total_hours: 0.0,
            estimated_hours: 0.0,
            traditional_efficiency: 0.0,
            fair_efficiency_score: 0.0,
            delivery_score: 0.0,
            completion_bonus: 0.0,
            timing_bonus: 0.0,
            late_penalty_mitigation: 0.0,
            days_ahead_behind: 0.0,
            state_breakdown: BTreeMap::new(),
            paused_state_breakdown: BTreeMap::new(),
            pattern: PatternSummary::default(),
        }
    }

    /// True when the record carries real metrics.
    pub fn has_data(&self) -> bool {
        self.status == RecordStatus::Scored
    }

    /// The item was excluded by an ignored state.
    pub fn should_ignore(&self) -> bool {
        self.status == RecordStatus::Ignored
    }

    /// The item's history reached a completion state.
    pub fn is_completed(&self) -> bool {
        self.pattern.is_completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_ignored_are_distinguishable() {
        let empty = EfficiencyRecord::empty();
        let ignored = EfficiencyRecord::ignored();

        assert!(!empty.has_data());
        assert!(!ignored.has_data());
        assert!(!empty.should_ignore());
        assert!(ignored.should_ignore());
        assert!(ignored.pattern.should_ignore);
        assert_eq!(empty.fair_efficiency_score, 0.0);
        assert!(!empty.is_completed());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&RecordStatus::InsufficientHistory).unwrap();
        assert_eq!(json, "\"insufficient_history\"");
    }
}
