//! Fair efficiency and delivery timing scoring.

use std::sync::Arc;

use devpulse_core::{
    round2, AnalysisConfig, ConfigError, DeliveryTiming, EfficiencyRecord, RecordStatus,
    StateEvent, WorkItemSnapshot,
};
use tracing::debug;

use crate::clock::BusinessHoursClock;
use crate::stack::{StateTransitionStack, DEFAULT_BOTTLENECK_THRESHOLD_HOURS};

/// Upper day limits of the 1-3, 4-7 and 8-14 day late tiers.
const LATE_TIER_LIMITS: [f64; 3] = [3.0, 7.0, 14.0];

/// Delivery timing bucket of a days-ahead/behind value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryBucket {
    /// At least one day early
    Early,
    /// Less than a day early, or on target
    OnTime,
    /// Up to 3 days late
    Late1To3,
    /// Up to 7 days late
    Late4To7,
    /// Up to 14 days late
    Late8To14,
    /// More than 14 days late
    Late15Plus,
}

impl DeliveryBucket {
    /// Classify signed days relative to target (negative is early).
    pub fn from_days(days: f64) -> Self {
        if days <= 0.0 {
            if days <= -1.0 {
                Self::Early
            } else {
                Self::OnTime
            }
        } else if days <= LATE_TIER_LIMITS[0] {
            Self::Late1To3
        } else if days <= LATE_TIER_LIMITS[1] {
            Self::Late4To7
        } else if days <= LATE_TIER_LIMITS[2] {
            Self::Late8To14
        } else {
            Self::Late15Plus
        }
    }

    /// Delivered on or before the target.
    pub fn is_on_time(self) -> bool {
        matches!(self, Self::Early | Self::OnTime)
    }
}

/// Scores work items against the shared analysis configuration.
#[derive(Debug, Clone)]
pub struct EfficiencyCalculator {
    config: Arc<AnalysisConfig>,
    clock: BusinessHoursClock,
}

impl EfficiencyCalculator {
    /// Create a calculator and its business-hours clock.
    pub fn new(config: Arc<AnalysisConfig>) -> Result<Self, ConfigError> {
        let clock = BusinessHoursClock::new(&config.business_hours)?;
        Ok(Self { config, clock })
    }

    /// Shared configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Business-hours clock.
    pub fn clock(&self) -> &BusinessHoursClock {
        &self.clock
    }

    /// Replay `events` and score the item.
    pub fn evaluate(&self, item: &WorkItemSnapshot, events: &[StateEvent]) -> EfficiencyRecord {
        if events.len() < 2 {
            return EfficiencyRecord::empty();
        }
        let stack = StateTransitionStack::from_events(&self.config.state_categories, &self.clock, events);
        self.score(item, &stack)
    }

    /// Score an item from an already replayed stack.
    pub fn score(&self, item: &WorkItemSnapshot, stack: &StateTransitionStack<'_>) -> EfficiencyRecord {
        if stack.should_ignore() {
            debug!(id = item.id, "item excluded by ignored state");
            return EfficiencyRecord::ignored();
        }
        if stack.events_seen() < 2 {
            return EfficiencyRecord::empty();
        }

        let productive_hours = stack.productive_hours();
        let paused_hours = stack.paused_hours();
        let total_hours = stack.total_hours();

        let estimated_hours = self.estimate(item);
        let timing = self.delivery(item);
        let completion_bonus = self.completion_bonus(item, estimated_hours);
        let fair_efficiency = self.fair_efficiency(productive_hours, completion_bonus, &timing, estimated_hours);
        let traditional = traditional_efficiency(productive_hours, total_hours, paused_hours);

        for bottleneck in stack.detect_bottlenecks(DEFAULT_BOTTLENECK_THRESHOLD_HOURS) {
            debug!(
                id = item.id,
                state = %bottleneck.state,
                hours = bottleneck.hours_spent,
                changed_by = %bottleneck.changed_by,
                "state bottleneck"
            );
        }

        let mut pattern = stack.pattern_summary();
        pattern.active_hours_after_reopen = round2(pattern.active_hours_after_reopen);

        debug!(
            id = item.id,
            productive_hours,
            estimated_hours,
            fair_efficiency,
            "scored work item"
        );

        EfficiencyRecord {
            status: RecordStatus::Scored,
            productive_hours: round2(productive_hours),
            paused_hours: round2(paused_hours),
            total_hours: round2(total_hours),
            estimated_hours: round2(estimated_hours),
            traditional_efficiency: round2(traditional),
            fair_efficiency_score: round2(fair_efficiency),
            delivery_score: round2(timing.delivery_score),
            completion_bonus: round2(completion_bonus),
            timing_bonus: round2(timing.timing_bonus_hours),
            late_penalty_mitigation: round2(timing.penalty_mitigation),
            days_ahead_behind: round2(timing.days_difference),
            state_breakdown: rounded(stack.state_durations()),
            paused_state_breakdown: rounded(stack.paused_durations()),
            pattern,
        }
    }

    /// Estimated effort in hours.
    ///
    /// Uses the original estimate when positive, otherwise capped business
    /// hours between start and target dates (floored at the configured
    /// minimum), otherwise the per-type default.
    pub fn estimate(&self, item: &WorkItemSnapshot) -> f64 {
        if let Some(hours) = item.estimated_hours.filter(|h| *h > 0.0) {
            return hours;
        }

        if let (Some(start), Some(target)) = (item.start_date, item.target_date) {
            let hours = self.clock.duration_hours(start, target, false);
            return hours.max(self.config.scoring.minimum_estimate_hours);
        }

        self.config.scoring.default_hours_for(&item.work_item_type)
    }

    /// Delivery timing relative to the target date.
    pub fn delivery(&self, item: &WorkItemSnapshot) -> DeliveryTiming {
        let (Some(target), Some(closed)) = (item.target_date, item.closed_date) else {
            return DeliveryTiming::neutral();
        };

        let days = (closed - target).num_milliseconds() as f64 / 86_400_000.0;
        if days <= 0.0 {
            self.early_delivery(days)
        } else {
            self.late_delivery(days)
        }
    }

    fn early_delivery(&self, days: f64) -> DeliveryTiming {
        let early = &self.config.scoring.early_delivery;
        let (score, rate) = if days <= -early.very_early_days {
            (early.scores.very_early, early.bonus_hours_per_day.very_early)
        } else if days <= -early.early_days {
            (early.scores.early, early.bonus_hours_per_day.early)
        } else if days <= -early.slightly_early_days {
            (early.scores.slightly_early, early.bonus_hours_per_day.slightly_early)
        } else {
            (early.scores.on_time, early.bonus_hours_per_day.on_time)
        };

        DeliveryTiming {
            delivery_score: score,
            timing_bonus_hours: days.abs() * rate,
            penalty_mitigation: 0.0,
            days_difference: days,
        }
    }

    fn late_delivery(&self, days: f64) -> DeliveryTiming {
        let late = &self.config.scoring.late_delivery;
        let (score, mitigation) = match DeliveryBucket::from_days(days) {
            DeliveryBucket::Late1To3 => (late.scores.late_1_3, late.penalty_mitigation.late_1_3),
            DeliveryBucket::Late4To7 => (late.scores.late_4_7, late.penalty_mitigation.late_4_7),
            DeliveryBucket::Late8To14 => (late.scores.late_8_14, late.penalty_mitigation.late_8_14),
            _ => (late.scores.late_15_plus, late.penalty_mitigation.late_15_plus),
        };

        DeliveryTiming {
            delivery_score: score,
            timing_bonus_hours: 0.0,
            penalty_mitigation: mitigation,
            days_difference: days,
        }
    }

    /// Bonus hours for an item currently in a completion state.
    pub fn completion_bonus(&self, item: &WorkItemSnapshot, estimated_hours: f64) -> f64 {
        if self.config.state_categories.is_completed_state_name(&item.current_state) {
            estimated_hours * self.config.scoring.completion_bonus_percentage
        } else {
            0.0
        }
    }

    /// Fair efficiency score, bounded to `[0, max_efficiency_cap]`.
    pub fn fair_efficiency(
        &self,
        productive_hours: f64,
        completion_bonus: f64,
        timing: &DeliveryTiming,
        estimated_hours: f64,
    ) -> f64 {
        let numerator = productive_hours + completion_bonus + timing.timing_bonus_hours;
        let denominator = estimated_hours + timing.penalty_mitigation;
        if denominator <= 0.0 {
            return 0.0;
        }
        (numerator / denominator * 100.0)
            .min(self.config.scoring.max_efficiency_cap)
            .max(0.0)
    }
}

/// Productive share of non-paused time, percent. Diagnostic only.
pub fn traditional_efficiency(productive_hours: f64, total_hours: f64, paused_hours: f64) -> f64 {
    let active = total_hours - paused_hours;
    if active > 0.0 {
        productive_hours / active * 100.0
    } else {
        0.0
    }
}

fn rounded(map: &std::collections::BTreeMap<String, f64>) -> std::collections::BTreeMap<String, f64> {
    map.iter().map(|(k, v)| (k.clone(), round2(*v))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use devpulse_core::{BusinessHoursConfig, Time};
    use proptest::prelude::*;

    fn calculator() -> EfficiencyCalculator {
        let config = AnalysisConfig {
            business_hours: BusinessHoursConfig {
                timezone: "UTC".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        EfficiencyCalculator::new(Arc::new(config)).unwrap()
    }

    // 2024-01-15 is a Monday.
    fn at(day: u32, hour: u32) -> Time {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn item(state: &str, estimate: Option<f64>) -> WorkItemSnapshot {
        WorkItemSnapshot {
            id: 1,
            current_state: state.to_string(),
            work_item_type: "Task".to_string(),
            estimated_hours: estimate,
            ..Default::default()
        }
    }

    fn late_by(days: f64) -> WorkItemSnapshot {
        let target = at(15, 17);
        WorkItemSnapshot {
            target_date: Some(target),
            closed_date: Some(target + Duration::minutes((days * 1440.0).round() as i64)),
            ..item("Closed", Some(8.0))
        }
    }

    #[test]
    fn test_single_day_scenario_scores_120() {
        let calc = calculator();
        let history = vec![
            StateEvent::new("New", at(15, 9), 1),
            StateEvent::new("Active", at(15, 9), 2),
            StateEvent::new("Closed", at(15, 17), 3),
        ];

        let record = calc.evaluate(&item("Closed", Some(8.0)), &history);

        assert_eq!(record.status, RecordStatus::Scored);
        assert_eq!(record.productive_hours, 8.0);
        assert_eq!(record.completion_bonus, 1.6);
        assert_eq!(record.fair_efficiency_score, 120.0);
        assert_eq!(record.delivery_score, 100.0);
        assert_eq!(record.traditional_efficiency, 100.0);
        assert!(record.is_completed());
    }

    #[test]
    fn test_ten_days_late() {
        let timing = calculator().delivery(&late_by(10.0));
        assert_eq!(timing.delivery_score, 70.0);
        assert_eq!(timing.penalty_mitigation, 6.0);
        assert_eq!(timing.timing_bonus_hours, 0.0);
        assert!((timing.days_difference - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_late_bucket_boundaries_are_inclusive() {
        let calc = calculator();
        let cases = [(0.5, 90.0, 2.0), (3.0, 90.0, 2.0), (3.5, 80.0, 4.0), (7.0, 80.0, 4.0), (14.0, 70.0, 6.0), (14.5, 60.0, 8.0)];
        for (days, score, mitigation) in cases {
            let timing = calc.delivery(&late_by(days));
            assert_eq!(timing.delivery_score, score, "{days} days late");
            assert_eq!(timing.penalty_mitigation, mitigation, "{days} days late");
        }
    }

    #[test]
    fn test_early_bucket_boundaries_and_bonus() {
        let calc = calculator();
        let cases = [(-10.0, 130.0, 10.0), (-7.0, 130.0, 7.0), (-3.0, 120.0, 1.5), (-1.0, 110.0, 0.25), (-0.5, 100.0, 0.0), (0.0, 100.0, 0.0)];
        for (days, score, bonus) in cases {
            let timing = calc.delivery(&late_by(days));
            assert_eq!(timing.delivery_score, score, "{days} days");
            assert!((timing.timing_bonus_hours - bonus).abs() < 1e-9, "{days} days");
            assert_eq!(timing.penalty_mitigation, 0.0);
        }
    }

    #[test]
    fn test_missing_dates_are_neutral() {
        let calc = calculator();
        let mut snapshot = item("Closed", Some(8.0));
        assert_eq!(calc.delivery(&snapshot), DeliveryTiming::neutral());

        snapshot.target_date = Some(at(15, 17));
        assert_eq!(calc.delivery(&snapshot), DeliveryTiming::neutral());
    }

    #[test]
    fn test_estimate_fallback_chain() {
        let calc = calculator();

        assert_eq!(calc.estimate(&item("Active", Some(5.0))), 5.0);

        let mut dated = item("Active", Some(0.0));
        dated.start_date = Some(at(15, 9));
        dated.target_date = Some(at(17, 17));
        assert_eq!(calc.estimate(&dated), 24.0);

        dated.target_date = Some(at(15, 10));
        assert_eq!(calc.estimate(&dated), 2.0);

        let mut bug = item("Active", None);
        bug.work_item_type = "Bug".to_string();
        assert_eq!(calc.estimate(&bug), 2.0);

        bug.work_item_type = "Epic".to_string();
        assert_eq!(calc.estimate(&bug), 4.0);
    }

    #[test]
    fn test_completion_bonus_only_for_completed_items() {
        let calc = calculator();
        assert_eq!(calc.completion_bonus(&item("done", None), 10.0), 2.0);
        assert_eq!(calc.completion_bonus(&item("Active", None), 10.0), 0.0);
    }

    #[test]
    fn test_fair_efficiency_clamped_to_cap() {
        let calc = calculator();
        let history = vec![StateEvent::new("Active", at(15, 9), 1), StateEvent::new("Closed", at(15, 17), 2)];
        let record = calc.evaluate(&item("Closed", Some(1.0)), &history);
        assert_eq!(record.fair_efficiency_score, 150.0);
    }

    #[test]
    fn test_late_mitigation_softens_score() {
        let calc = calculator();
        let history = vec![StateEvent::new("Active", at(15, 9), 1), StateEvent::new("Closed", at(15, 17), 2)];
        let record = calc.evaluate(&late_by(10.0), &history);
        // (8 + 1.6) / (8 + 6) * 100
        assert_eq!(record.fair_efficiency_score, 68.57);
        assert_eq!(record.days_ahead_behind, 10.0);
    }

    #[test]
    fn test_ignored_and_insufficient_history() {
        let calc = calculator();
        let snapshot = item("Closed", Some(8.0));

        let single = vec![StateEvent::new("Active", at(15, 9), 1)];
        let record = calc.evaluate(&snapshot, &single);
        assert_eq!(record.status, RecordStatus::InsufficientHistory);
        assert!(!record.should_ignore());

        let removed = vec![
            StateEvent::new("Active", at(15, 9), 1),
            StateEvent::new("Removed", at(15, 12), 2),
        ];
        let record = calc.evaluate(&snapshot, &removed);
        assert_eq!(record.status, RecordStatus::Ignored);
        assert!(record.should_ignore());
        assert_eq!(record.fair_efficiency_score, 0.0);
    }

    #[test]
    fn test_traditional_efficiency_excludes_paused_time() {
        assert_eq!(traditional_efficiency(7.0, 11.0, 4.0), 100.0);
        assert_eq!(traditional_efficiency(2.0, 8.0, 4.0), 50.0);
        assert_eq!(traditional_efficiency(0.0, 4.0, 4.0), 0.0);
    }

    #[test]
    fn test_delivery_bucket_classification() {
        assert_eq!(DeliveryBucket::from_days(-1.0), DeliveryBucket::Early);
        assert_eq!(DeliveryBucket::from_days(-0.9), DeliveryBucket::OnTime);
        assert_eq!(DeliveryBucket::from_days(0.0), DeliveryBucket::OnTime);
        assert_eq!(DeliveryBucket::from_days(3.0), DeliveryBucket::Late1To3);
        assert_eq!(DeliveryBucket::from_days(7.0), DeliveryBucket::Late4To7);
        assert_eq!(DeliveryBucket::from_days(14.0), DeliveryBucket::Late8To14);
        assert_eq!(DeliveryBucket::from_days(15.0), DeliveryBucket::Late15Plus);
        assert!(DeliveryBucket::OnTime.is_on_time());
        assert!(!DeliveryBucket::Late1To3.is_on_time());
    }

    proptest! {
        #[test]
        fn prop_fair_efficiency_is_bounded(
            productive in 0.0f64..500.0,
            estimate in proptest::option::of(0.0f64..200.0),
            gap_hours in proptest::collection::vec(0i64..200, 1..8),
            late_days in -30i64..30,
            completed in any::<bool>(),
        ) {
            let calc = calculator();
            let cap = calc.config().scoring.max_efficiency_cap;

            let direct = calc.fair_efficiency(productive, 0.0, &DeliveryTiming::neutral(), estimate.unwrap_or(0.0));
            prop_assert!((0.0..=cap).contains(&direct));

            let mut ts = at(15, 9);
            let mut history = vec![StateEvent::new("Active", ts, 0)];
            for (i, gap) in gap_hours.iter().enumerate() {
                ts = ts + Duration::hours(*gap);
                let state = if i % 2 == 0 { "Blocked" } else { "Active" };
                history.push(StateEvent::new(state, ts, i as u64 + 1));
            }

            let snapshot = WorkItemSnapshot {
                target_date: Some(at(15, 9)),
                closed_date: Some(at(15, 9) + Duration::days(late_days)),
                ..item(if completed { "Closed" } else { "Active" }, estimate)
            };
            let record = calc.evaluate(&snapshot, &history);
            prop_assert!(record.fair_efficiency_score >= 0.0);
            prop_assert!(record.fair_efficiency_score <= cap);
        }
    }
}
