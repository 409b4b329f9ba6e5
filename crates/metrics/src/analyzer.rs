//! End-to-end analysis of a batch of work items.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use devpulse_core::{
    AnalysisConfig, AnalysisReport, ConfigError, EfficiencyRecord, RunId, ScoredWorkItem,
    StateEvent, WorkItemInput,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::efficiency::EfficiencyCalculator;
use crate::kpi::DeveloperKpiAggregator;

/// Validates revisions, scores each item and aggregates KPIs.
#[derive(Debug, Clone)]
pub struct WorkItemAnalyzer {
    config: Arc<AnalysisConfig>,
    calculator: EfficiencyCalculator,
    aggregator: DeveloperKpiAggregator,
}

impl WorkItemAnalyzer {
    /// Create an analyzer; fails when the configuration is invalid.
    pub fn new(config: Arc<AnalysisConfig>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            calculator: EfficiencyCalculator::new(Arc::clone(&config))?,
            aggregator: DeveloperKpiAggregator::new(Arc::clone(&config)),
            config,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Score a single item.
    ///
    /// Revisions with a missing or malformed timestamp are skipped. An item
    /// whose current state is ignored is not scored.
    pub fn score_item(&self, input: &WorkItemInput) -> ScoredWorkItem {
        let item = input.item.clone();

        if self.config.state_categories.is_ignored(&item.current_state) {
            debug!(id = item.id, state = %item.current_state, "Item in ignored state");
            return ScoredWorkItem {
                item,
                efficiency: EfficiencyRecord::ignored(),
            };
        }

        let events: Vec<StateEvent> = input
            .revisions
            .iter()
            .filter_map(|revision| match revision.to_event() {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!(id = item.id, error = %e, "Skipping revision");
                    None
                }
            })
            .collect();

        let efficiency = self.calculator.evaluate(&item, &events);
        ScoredWorkItem { item, efficiency }
    }

    /// Score every item in parallel, preserving input order, then aggregate.
    pub fn analyze(
        &self,
        inputs: &[WorkItemInput],
        total_assigned: Option<&HashMap<String, usize>>,
    ) -> AnalysisReport {
        let run_id = RunId::new();
        info!(%run_id, items = inputs.len(), "Starting analysis");

        let items: Vec<ScoredWorkItem> = inputs.par_iter().map(|input| self.score_item(input)).collect();
        let kpis = self.aggregator.aggregate(&items, total_assigned);

        info!(
            %run_id,
            developers = kpis.overall_summary.total_developers,
            "Analysis complete"
        );

        AnalysisReport {
            run_id,
            generated_at: Utc::now(),
            timeframe_start: self.config.business_hours.timeframe_start,
            timeframe_end: self.config.business_hours.timeframe_end,
            items,
            kpis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devpulse_core::{BusinessHoursConfig, RecordStatus};

    fn analyzer() -> WorkItemAnalyzer {
        let config = AnalysisConfig {
            business_hours: BusinessHoursConfig {
                timezone: "UTC".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        WorkItemAnalyzer::new(Arc::new(config)).unwrap()
    }

    fn inputs(json: &str) -> Vec<WorkItemInput> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_single_day_item_end_to_end() {
        let items = inputs(
            r#"[{
                "id": 1,
                "state": "Closed",
                "work_item_type": "Task",
                "original_estimate": 8.0,
                "assigned_to": "Ana",
                "target_date": "2024-01-15T17:00:00Z",
                "closed_date": "2024-01-15T17:00:00Z",
                "revisions": [
                    { "revision": 2, "state": "Active", "changed_date": "2024-01-15T09:00:00Z" },
                    { "revision": 3, "state": "Closed", "changed_date": "2024-01-15T17:00:00Z" },
                    { "revision": 1, "state": "New", "changed_date": "2024-01-15T09:00:00Z" }
                ]
            }]"#,
        );

        let report = analyzer().analyze(&items, None);
        let record = &report.items[0].efficiency;

        assert_eq!(record.status, RecordStatus::Scored);
        assert_eq!(record.productive_hours, 8.0);
        assert_eq!(record.completion_bonus, 1.6);
        assert_eq!(record.fair_efficiency_score, 120.0);
        assert!(record.is_completed());

        let ana = &report.kpis.developer_metrics["Ana"];
        assert_eq!(ana.completed_items, 1);
        assert_eq!(ana.average_fair_efficiency, 120.0);
        assert_eq!(report.kpis.overall_summary.total_work_items, 1);
    }

    #[test]
    fn test_malformed_revision_is_skipped() {
        let items = inputs(
            r#"[{
                "id": 2,
                "state": "Active",
                "work_item_type": "Task",
                "revisions": [
                    { "revision": 1, "state": "New", "changed_date": "2024-01-15T09:00:00Z" },
                    { "revision": 2, "state": "Active", "changed_date": "not a date" }
                ]
            }]"#,
        );

        let scored = analyzer().score_item(&items[0]);
        assert_eq!(scored.efficiency.status, RecordStatus::InsufficientHistory);
    }

    #[test]
    fn test_current_ignored_state_short_circuits() {
        let items = inputs(
            r#"[{
                "id": 3,
                "state": "Removed",
                "work_item_type": "Bug",
                "revisions": [
                    { "revision": 1, "state": "Active", "changed_date": "2024-01-15T09:00:00Z" },
                    { "revision": 2, "state": "Closed", "changed_date": "2024-01-15T17:00:00Z" }
                ]
            }]"#,
        );

        let report = analyzer().analyze(&items, None);
        assert!(report.items[0].efficiency.should_ignore());

        let unassigned = &report.kpis.developer_metrics[devpulse_core::UNASSIGNED];
        assert_eq!(unassigned.total_work_items, 1);
        assert_eq!(unassigned.items_with_efficiency, 0);
    }

    #[test]
    fn test_output_preserves_input_order() {
        let json: Vec<String> = (1..=20)
            .map(|id| format!(r#"{{ "id": {id}, "state": "New", "work_item_type": "Task" }}"#))
            .collect();
        let items = inputs(&format!("[{}]", json.join(",")));

        let report = analyzer().analyze(&items, None);
        let ids: Vec<u64> = report.items.iter().map(|s| s.item.id).collect();
        assert_eq!(ids, (1..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AnalysisConfig {
            business_hours: BusinessHoursConfig {
                office_start_hour: 18,
                office_end_hour: 9,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(WorkItemAnalyzer::new(Arc::new(config)).is_err());
    }
}
