//! Analysis configuration.
//!
//! Configuration is assembled once per run in layers (defaults, then an
//! optional JSON file, then per-call overrides) and is immutable afterwards.
//! Layers are merged key by key at every depth, so a partial file only
//! replaces the keys it names.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::Time;

/// Complete configuration for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    /// State label classification
    pub state_categories: StateCategoryConfig,

    /// Business-hours clock parameters
    pub business_hours: BusinessHoursConfig,

    /// Per-item scoring parameters
    #[serde(alias = "efficiency_scoring")]
    pub scoring: ScoringConfig,

    /// Per-developer scoring parameters
    pub developer_scoring: DeveloperScoringConfig,
}

impl AnalysisConfig {
    /// Start a layered configuration from the built-in defaults.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Load a configuration file on top of the defaults and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigBuilder::new().with_file(path)?.build()
    }

    /// Check every section for internally consistent values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.business_hours.validate()
    }
}

/// Which headline accumulator a closed interval feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeBucket {
    /// Counts toward productive hours
    Productive,
    /// Counts toward paused hours
    Paused,
    /// Recorded per state, excluded from both headline totals
    Tracked,
}

/// Four sets of state labels, matched by exact string comparison.
///
/// A label found in none of the sets is neutral: its time is recorded in the
/// per-state map but not in the productive or paused totals.
///
/// When a label is misconfigured into several sets, checks are independent:
/// `ignored` poisons the item first, `completion` marks it completed, and for
/// time accounting `productive` is tested before `paused`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateCategoryConfig {
    /// States where real work happens
    #[serde(alias = "productive_states")]
    pub productive: Vec<String>,

    /// States where work is stopped by an external factor
    #[serde(alias = "pause_stopper_states")]
    pub paused: Vec<String>,

    /// States that mark the item as delivered
    #[serde(alias = "completion_states")]
    pub completion: Vec<String>,

    /// States that exclude the item from scoring altogether
    #[serde(alias = "ignored_states")]
    pub ignored: Vec<String>,

    /// States meaning "assigned, not started" (informational)
    #[serde(alias = "assigned_states")]
    pub assigned: Vec<String>,
}

impl Default for StateCategoryConfig {
    fn default() -> Self {
        Self {
            productive: strings(&["Active", "In Progress", "Development", "Code Review", "Testing"]),
            paused: strings(&["Stopper", "Blocked", "On Hold", "Waiting"]),
            completion: strings(&["Resolved", "Closed", "Done"]),
            ignored: strings(&["Removed", "Discarded", "Cancelled"]),
            assigned: strings(&["New"]),
        }
    }
}

impl StateCategoryConfig {
    /// Is the label a productive state?
    pub fn is_productive(&self, state: &str) -> bool {
        contains(&self.productive, state)
    }

    /// Is the label a paused/stopper state?
    pub fn is_paused(&self, state: &str) -> bool {
        contains(&self.paused, state)
    }

    /// Is the label a completion state?
    pub fn is_completion(&self, state: &str) -> bool {
        contains(&self.completion, state)
    }

    /// Is the label an ignored state?
    pub fn is_ignored(&self, state: &str) -> bool {
        contains(&self.ignored, state)
    }

    /// Case-insensitive completion check for a work item's current state.
    pub fn is_completed_state_name(&self, state: &str) -> bool {
        self.completion.iter().any(|s| s.eq_ignore_ascii_case(state))
    }

    /// Resolve the accumulator for time spent in `state`.
    pub fn bucket(&self, state: &str) -> TimeBucket {
        if self.is_productive(state) {
            TimeBucket::Productive
        } else if self.is_paused(state) {
            TimeBucket::Paused
        } else {
            TimeBucket::Tracked
        }
    }
}

/// Office-hours window, daily cap and optional date clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessHoursConfig {
    /// First office hour (inclusive), 0-23
    pub office_start_hour: u32,

    /// Last office hour (exclusive), 0-23
    pub office_end_hour: u32,

    /// Cap on hours credited per day for capped accounting
    pub max_hours_per_day: f64,

    /// IANA timezone name the office window is expressed in
    #[serde(alias = "timezone_str")]
    pub timezone: String,

    /// Clip productive time to days on or after this date (UTC)
    pub timeframe_start: Option<NaiveDate>,

    /// Clip productive time to days on or before this date (UTC)
    pub timeframe_end: Option<NaiveDate>,
}

impl Default for BusinessHoursConfig {
    fn default() -> Self {
        Self {
            office_start_hour: 9,
            office_end_hour: 17,
            max_hours_per_day: 8.0,
            timezone: "America/Mexico_City".to_string(),
            timeframe_start: None,
            timeframe_end: None,
        }
    }
}

impl BusinessHoursConfig {
    /// Parse the configured timezone.
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimezone(self.timezone.clone()))
    }

    /// Timeframe as instants: start of the first day to the last second of
    /// the final day, both UTC.
    pub fn timeframe_bounds(&self) -> (Option<Time>, Option<Time>) {
        let start = self
            .timeframe_start
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Utc.from_utc_datetime(&dt));
        let end = self
            .timeframe_end
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map(|dt| Utc.from_utc_datetime(&dt));
        (start, end)
    }

    /// Validate hour range, cap, timezone and timeframe ordering.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.office_end_hour > 23 || self.office_start_hour >= self.office_end_hour {
            return Err(ConfigError::InvalidOfficeHours {
                start: self.office_start_hour,
                end: self.office_end_hour,
            });
        }
        if !(self.max_hours_per_day > 0.0) {
            return Err(ConfigError::InvalidDailyCap(self.max_hours_per_day));
        }
        self.tz()?;
        if let (Some(start), Some(end)) = (self.timeframe_start, self.timeframe_end) {
            if start > end {
                return Err(ConfigError::InvertedTimeframe { start, end });
            }
        }
        Ok(())
    }
}

/// Per-item scoring parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Share of the estimate granted as bonus when the item is completed
    pub completion_bonus_percentage: f64,

    /// Upper bound of the fair efficiency score
    pub max_efficiency_cap: f64,

    /// Floor for estimates derived from start/target dates
    pub minimum_estimate_hours: f64,

    /// Early and on-time delivery tiers
    pub early_delivery: EarlyDeliveryConfig,

    /// Late delivery tiers
    pub late_delivery: LateDeliveryConfig,

    /// Fallback estimate per lowercase work item type; `default` catches the rest
    pub default_work_item_hours: BTreeMap<String, f64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let default_work_item_hours = [("user story", 8.0), ("task", 4.0), ("bug", 2.0), ("default", 4.0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        Self {
            completion_bonus_percentage: 0.20,
            max_efficiency_cap: 150.0,
            minimum_estimate_hours: 2.0,
            early_delivery: EarlyDeliveryConfig::default(),
            late_delivery: LateDeliveryConfig::default(),
            default_work_item_hours,
        }
    }
}

/// Estimate used when neither the type nor a `default` entry is configured.
pub const FALLBACK_ITEM_HOURS: f64 = 4.0;

impl ScoringConfig {
    /// Fallback estimate for a work item type, matched case-insensitively.
    pub fn default_hours_for(&self, work_item_type: &str) -> f64 {
        self.hours_entry(work_item_type)
            .or_else(|| self.hours_entry("default"))
            .unwrap_or(FALLBACK_ITEM_HOURS)
    }

    fn hours_entry(&self, key: &str) -> Option<f64> {
        self.default_work_item_hours
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| *v)
    }
}

/// Early delivery thresholds (days before target) and tier values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EarlyDeliveryConfig {
    /// At least this many days early is "very early"
    pub very_early_days: f64,

    /// At least this many days early is "early"
    pub early_days: f64,

    /// At least this many days early is "slightly early"
    pub slightly_early_days: f64,

    /// Delivery score per tier
    pub scores: EarlyTiers,

    /// Bonus hours per day early, per tier
    pub bonus_hours_per_day: EarlyTiers,
}

impl Default for EarlyDeliveryConfig {
    fn default() -> Self {
        Self {
            very_early_days: 7.0,
            early_days: 3.0,
            slightly_early_days: 1.0,
            scores: EarlyTiers {
                very_early: 130.0,
                early: 120.0,
                slightly_early: 110.0,
                on_time: 100.0,
            },
            bonus_hours_per_day: EarlyTiers {
                very_early: 1.0,
                early: 0.5,
                slightly_early: 0.25,
                on_time: 0.0,
            },
        }
    }
}

/// One value per early/on-time tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarlyTiers {
    /// Very early
    pub very_early: f64,
    /// Early
    pub early: f64,
    /// Slightly early
    pub slightly_early: f64,
    /// On time
    pub on_time: f64,
}

/// Late delivery tier values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LateDeliveryConfig {
    /// Delivery score per tier
    pub scores: LateTiers,

    /// Hours added to the scoring denominator per tier
    pub penalty_mitigation: LateTiers,
}

impl Default for LateDeliveryConfig {
    fn default() -> Self {
        Self {
            scores: LateTiers {
                late_1_3: 90.0,
                late_4_7: 80.0,
                late_8_14: 70.0,
                late_15_plus: 60.0,
            },
            penalty_mitigation: LateTiers {
                late_1_3: 2.0,
                late_4_7: 4.0,
                late_8_14: 6.0,
                late_15_plus: 8.0,
            },
        }
    }
}

/// One value per lateness tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LateTiers {
    /// Up to 3 days late
    pub late_1_3: f64,
    /// Up to 7 days late
    pub late_4_7: f64,
    /// Up to 14 days late
    pub late_8_14: f64,
    /// More than 14 days late
    pub late_15_plus: f64,
}

/// Per-developer scoring parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DeveloperScoringConfig {
    /// Weights of the overall developer score
    pub weights: ScoreWeights,
}

/// Weights of the overall developer score. Expected to sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Average fair efficiency weight
    pub fair_efficiency: f64,
    /// Average delivery score weight
    pub delivery_score: f64,
    /// Completion rate weight
    pub completion_rate: f64,
    /// On-time delivery percentage weight
    pub on_time_delivery: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            fair_efficiency: 0.4,
            delivery_score: 0.3,
            completion_rate: 0.2,
            on_time_delivery: 0.1,
        }
    }
}

/// Per-call overrides, applied last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    /// Completion bonus share
    pub completion_bonus_percentage: Option<f64>,
    /// Fair efficiency cap
    pub max_efficiency_cap: Option<f64>,
    /// Daily hour cap
    pub max_hours_per_day: Option<f64>,
    /// Fair efficiency weight
    pub fair_efficiency_weight: Option<f64>,
    /// Delivery score weight
    pub delivery_score_weight: Option<f64>,
    /// Completion rate weight
    pub completion_rate_weight: Option<f64>,
    /// On-time delivery weight
    pub on_time_delivery_weight: Option<f64>,
    /// Timeframe start date
    pub timeframe_start: Option<NaiveDate>,
    /// Timeframe end date
    pub timeframe_end: Option<NaiveDate>,
    /// Replacement productive state list
    pub productive_states: Option<Vec<String>>,
    /// Replacement paused state list
    pub paused_states: Option<Vec<String>>,
}

/// Layered builder for [`AnalysisConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: AnalysisConfig,
}

impl ConfigBuilder {
    /// Start from the built-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer a JSON document over the current configuration.
    ///
    /// Objects are merged key by key at every depth; any other value
    /// replaces the one below it.
    pub fn with_json(mut self, json: &str) -> Result<Self, ConfigError> {
        let mut layer: Value = serde_json::from_str(json)?;
        canonicalize_keys(&mut layer);

        let mut merged = serde_json::to_value(&self.config)?;
        merge_values(&mut merged, layer);
        self.config = serde_json::from_value(merged)?;
        Ok(self)
    }

    /// Layer a JSON file over the current configuration.
    pub fn with_file(self, path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        self.with_json(&json)
    }

    /// Apply per-call overrides.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        let c = &mut self.config;
        if let Some(v) = overrides.completion_bonus_percentage {
            c.scoring.completion_bonus_percentage = v;
        }
        if let Some(v) = overrides.max_efficiency_cap {
            c.scoring.max_efficiency_cap = v;
        }
        if let Some(v) = overrides.max_hours_per_day {
            c.business_hours.max_hours_per_day = v;
        }
        let weights = &mut c.developer_scoring.weights;
        if let Some(v) = overrides.fair_efficiency_weight {
            weights.fair_efficiency = v;
        }
        if let Some(v) = overrides.delivery_score_weight {
            weights.delivery_score = v;
        }
        if let Some(v) = overrides.completion_rate_weight {
            weights.completion_rate = v;
        }
        if let Some(v) = overrides.on_time_delivery_weight {
            weights.on_time_delivery = v;
        }
        if overrides.timeframe_start.is_some() {
            c.business_hours.timeframe_start = overrides.timeframe_start;
        }
        if overrides.timeframe_end.is_some() {
            c.business_hours.timeframe_end = overrides.timeframe_end;
        }
        if let Some(states) = overrides.productive_states {
            c.state_categories.productive = states;
        }
        if let Some(states) = overrides.paused_states {
            c.state_categories.paused = states;
        }
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Tracker key names accepted in files, as (section, alias, field).
/// An empty section means the top level.
const KEY_ALIASES: &[(&str, &str, &str)] = &[
    ("", "efficiency_scoring", "scoring"),
    ("state_categories", "productive_states", "productive"),
    ("state_categories", "pause_stopper_states", "paused"),
    ("state_categories", "completion_states", "completion"),
    ("state_categories", "ignored_states", "ignored"),
    ("state_categories", "assigned_states", "assigned"),
    ("business_hours", "timezone_str", "timezone"),
];

/// Rename alias keys so a layer lines up with the serialized defaults.
fn canonicalize_keys(layer: &mut Value) {
    let Value::Object(root) = layer else {
        return;
    };
    rename_keys(root, "");
    for (key, section) in root.iter_mut() {
        if let Value::Object(section) = section {
            rename_keys(section, key);
        }
    }
}

fn rename_keys(map: &mut Map<String, Value>, section: &str) {
    for (_, alias, field) in KEY_ALIASES.iter().filter(|(s, _, _)| *s == section) {
        if let Some(value) = map.remove(*alias) {
            map.insert(field.to_string(), value);
        }
    }
}

fn merge_values(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn contains(set: &[String], state: &str) -> bool {
    set.iter().any(|s| s == state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = AnalysisConfig::default();
        assert_eq!(config.business_hours.office_start_hour, 9);
        assert_eq!(config.business_hours.office_end_hour, 17);
        assert_eq!(config.business_hours.max_hours_per_day, 8.0);
        assert_eq!(config.business_hours.timezone, "America/Mexico_City");
        assert_eq!(config.scoring.completion_bonus_percentage, 0.20);
        assert_eq!(config.scoring.max_efficiency_cap, 150.0);
        assert_eq!(config.developer_scoring.weights, ScoreWeights::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bucket_resolution_order() {
        let categories = StateCategoryConfig {
            productive: strings(&["Review"]),
            paused: strings(&["Review", "Blocked"]),
            ..Default::default()
        };
        assert_eq!(categories.bucket("Review"), TimeBucket::Productive);
        assert_eq!(categories.bucket("Blocked"), TimeBucket::Paused);
        assert_eq!(categories.bucket("Unheard Of"), TimeBucket::Tracked);
    }

    #[test]
    fn test_membership_is_exact_but_completion_name_is_not() {
        let categories = StateCategoryConfig::default();
        assert!(!categories.is_completion("closed"));
        assert!(categories.is_completed_state_name("closed"));
        assert!(categories.is_ignored("Removed"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = ConfigBuilder::new()
            .with_json(
                r#"{
                    "state_categories": { "productive_states": ["Doing"] },
                    "efficiency_scoring": { "max_efficiency_cap": 120.0 },
                    "developer_scoring": { "weights": { "fair_efficiency": 0.5 } }
                }"#,
            )
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.state_categories.productive, vec!["Doing".to_string()]);
        assert_eq!(config.state_categories.paused, StateCategoryConfig::default().paused);
        assert_eq!(config.scoring.max_efficiency_cap, 120.0);
        assert_eq!(config.scoring.completion_bonus_percentage, 0.20);
        assert_eq!(config.developer_scoring.weights.fair_efficiency, 0.5);
        assert_eq!(config.developer_scoring.weights.delivery_score, 0.3);
    }

    #[test]
    fn test_overrides_applied_last() {
        let config = ConfigBuilder::new()
            .with_json(r#"{ "business_hours": { "max_hours_per_day": 6 } }"#)
            .unwrap()
            .with_overrides(ConfigOverrides {
                max_hours_per_day: Some(7.0),
                on_time_delivery_weight: Some(0.2),
                timeframe_start: NaiveDate::from_ymd_opt(2024, 1, 1),
                productive_states: Some(strings(&["Doing"])),
                paused_states: Some(strings(&["Parked", "Waiting"])),
                ..Default::default()
            })
            .build()
            .unwrap();

        assert_eq!(config.state_categories.productive, strings(&["Doing"]));
        assert_eq!(config.state_categories.paused, strings(&["Parked", "Waiting"]));
        assert_eq!(config.state_categories.completion, StateCategoryConfig::default().completion);
        assert_eq!(config.business_hours.max_hours_per_day, 7.0);
        assert_eq!(config.developer_scoring.weights.on_time_delivery, 0.2);
        assert_eq!(config.business_hours.timeframe_start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(config.business_hours.timeframe_end, None);
    }

    #[test]
    fn test_invalid_business_hours_rejected() {
        let bad_window = BusinessHoursConfig {
            office_start_hour: 17,
            office_end_hour: 9,
            ..Default::default()
        };
        assert!(matches!(bad_window.validate(), Err(ConfigError::InvalidOfficeHours { .. })));

        let bad_tz = BusinessHoursConfig {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..Default::default()
        };
        assert!(matches!(bad_tz.validate(), Err(ConfigError::UnknownTimezone(_))));

        let bad_cap = BusinessHoursConfig {
            max_hours_per_day: 0.0,
            ..Default::default()
        };
        assert!(matches!(bad_cap.validate(), Err(ConfigError::InvalidDailyCap(_))));

        let inverted = BusinessHoursConfig {
            timeframe_start: NaiveDate::from_ymd_opt(2024, 2, 1),
            timeframe_end: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };
        assert!(matches!(inverted.validate(), Err(ConfigError::InvertedTimeframe { .. })));
    }

    #[test]
    fn test_timeframe_bounds_cover_whole_days() {
        let config = BusinessHoursConfig {
            timeframe_start: NaiveDate::from_ymd_opt(2024, 1, 1),
            timeframe_end: NaiveDate::from_ymd_opt(2024, 1, 31),
            ..Default::default()
        };
        let (start, end) = config.timeframe_bounds();
        assert_eq!(start.unwrap().to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(end.unwrap().to_rfc3339(), "2024-01-31T23:59:59+00:00");
    }

    #[test]
    fn test_partial_tier_override_keeps_sibling_tiers() {
        let config = ConfigBuilder::new()
            .with_json(r#"{ "scoring": { "early_delivery": { "scores": { "very_early": 140.0 } } } }"#)
            .unwrap()
            .build()
            .unwrap();

        let early = &config.scoring.early_delivery;
        assert_eq!(early.scores.very_early, 140.0);
        assert_eq!(early.scores.early, 120.0);
        assert_eq!(early.scores.on_time, 100.0);
        assert_eq!(early.bonus_hours_per_day, EarlyDeliveryConfig::default().bonus_hours_per_day);
        assert_eq!(config.scoring.late_delivery, LateDeliveryConfig::default());
    }

    #[test]
    fn test_partial_hours_table_merges_per_type() {
        let config = ConfigBuilder::new()
            .with_json(r#"{ "scoring": { "default_work_item_hours": { "bug": 3.0 } } }"#)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.scoring.default_hours_for("Bug"), 3.0);
        assert_eq!(config.scoring.default_hours_for("Task"), 4.0);
        assert_eq!(config.scoring.default_hours_for("User Story"), 8.0);
        assert_eq!(config.scoring.default_hours_for("Epic"), 4.0);
    }

    #[test]
    fn test_hours_without_default_entry_use_fallback() {
        let scoring = ScoringConfig {
            default_work_item_hours: BTreeMap::from([("Bug".to_string(), 3.0)]),
            ..Default::default()
        };
        assert_eq!(scoring.default_hours_for("bug"), 3.0);
        assert_eq!(scoring.default_hours_for("Task"), FALLBACK_ITEM_HOURS);
    }

    #[test]
    fn test_json_layers_stack_on_each_other() {
        let config = ConfigBuilder::new()
            .with_json(r#"{ "business_hours": { "timezone_str": "UTC", "max_hours_per_day": 6 } }"#)
            .unwrap()
            .with_json(r#"{ "business_hours": { "office_start_hour": 8 } }"#)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.business_hours.timezone, "UTC");
        assert_eq!(config.business_hours.max_hours_per_day, 6.0);
        assert_eq!(config.business_hours.office_start_hour, 8);
        assert_eq!(config.business_hours.office_end_hour, 17);
    }

    #[test]
    fn test_default_hours_lookup_is_case_insensitive() {
        let scoring = ScoringConfig::default();
        assert_eq!(scoring.default_hours_for("User Story"), 8.0);
        assert_eq!(scoring.default_hours_for("Bug"), 2.0);
        assert_eq!(scoring.default_hours_for("Epic"), 4.0);
    }
}
