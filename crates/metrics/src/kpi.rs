//! Per-developer KPI aggregation.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use devpulse_core::{
    round2, AnalysisConfig, Bottleneck, DeliveryTimingBreakdown, DeveloperMetrics, KpiReport,
    OverallSummary, ScoredWorkItem,
};

use crate::efficiency::DeliveryBucket;

/// Number of bottleneck states reported.
const TOP_BOTTLENECKS: usize = 5;

/// Groups scored items by assignee and derives developer and organization KPIs.
#[derive(Debug, Clone)]
pub struct DeveloperKpiAggregator {
    config: Arc<AnalysisConfig>,
}

impl DeveloperKpiAggregator {
    /// Create an aggregator.
    pub fn new(config: Arc<AnalysisConfig>) -> Self {
        Self { config }
    }

    /// Aggregate scored items.
    ///
    /// `total_assigned` optionally supplies each developer's assigned-item
    /// count across all states, used as the completion-rate denominator.
    pub fn aggregate(
        &self,
        items: &[ScoredWorkItem],
        total_assigned: Option<&HashMap<String, usize>>,
    ) -> KpiReport {
        if items.is_empty() {
            return KpiReport::default();
        }

        let mut by_developer: BTreeMap<&str, Vec<&ScoredWorkItem>> = BTreeMap::new();
        for item in items {
            by_developer.entry(item.assignee()).or_default().push(item);
        }

        let mut developer_metrics = BTreeMap::new();
        for (developer, assigned) in &by_developer {
            let total = total_assigned.and_then(|counts| counts.get(*developer).copied());
            developer_metrics.insert(developer.to_string(), self.developer_metrics(assigned, total));
        }

        let developers = developer_metrics.len() as f64;
        let fair_sum: f64 = developer_metrics.values().map(|m| m.average_fair_efficiency).sum();
        let delivery_sum: f64 = developer_metrics.values().map(|m| m.average_delivery_score).sum();
        let active_sum: f64 = developer_metrics.values().map(|m| m.total_active_hours).sum();

        let overall_summary = OverallSummary {
            total_work_items: items.len(),
            total_developers: developer_metrics.len(),
            average_fair_efficiency: round2(fair_sum / developers),
            average_delivery_score: round2(delivery_sum / developers),
            total_active_hours: round2(active_sum),
        };

        KpiReport {
            overall_summary,
            developer_metrics,
            bottlenecks: bottlenecks(items),
        }
    }

    /// Metrics for one developer's items.
    pub fn developer_metrics(&self, items: &[&ScoredWorkItem], total_assigned: Option<usize>) -> DeveloperMetrics {
        let total_work_items = total_assigned.unwrap_or(items.len());
        let categories = &self.config.state_categories;

        let mut completed_items = 0;
        let mut items_with_efficiency = 0;
        let mut on_time_count = 0;
        let mut reopened_items = 0;
        let mut fair_sum = 0.0;
        let mut delivery_sum = 0.0;
        let mut active_hours = 0.0;
        let mut estimated_hours = 0.0;
        let mut days_sum = 0.0;
        let mut breakdown = DeliveryTimingBreakdown::default();
        let mut work_item_types = BTreeSet::new();
        let mut projects = BTreeSet::new();

        for scored in items {
            let item = &scored.item;
            work_item_types.insert(non_empty_or_unknown(&item.work_item_type));
            projects.insert(non_empty_or_unknown(item.project.as_deref().unwrap_or_default()));

            if categories.is_completed_state_name(&item.current_state) {
                completed_items += 1;
            }

            let record = &scored.efficiency;
            if !record.has_data() {
                continue;
            }

            items_with_efficiency += 1;
            fair_sum += record.fair_efficiency_score;
            delivery_sum += record.delivery_score;
            active_hours += record.productive_hours;
            estimated_hours += record.estimated_hours;
            days_sum += record.days_ahead_behind;
            if record.pattern.was_reopened {
                reopened_items += 1;
            }

            let bucket = DeliveryBucket::from_days(record.days_ahead_behind);
            if bucket.is_on_time() {
                on_time_count += 1;
            }
            match bucket {
                DeliveryBucket::Early => breakdown.early += 1,
                DeliveryBucket::OnTime => breakdown.on_time += 1,
                DeliveryBucket::Late1To3 => breakdown.late_1_3 += 1,
                DeliveryBucket::Late4To7 => breakdown.late_4_7 += 1,
                DeliveryBucket::Late8To14 => breakdown.late_8_14 += 1,
                DeliveryBucket::Late15Plus => breakdown.late_15_plus += 1,
            }
        }

        let completion_rate = percentage(completed_items, total_work_items);
        let on_time_delivery = percentage(on_time_count, items_with_efficiency);
        let reopened_rate = percentage(reopened_items, items_with_efficiency);
        let average_fair_efficiency = mean(fair_sum, items_with_efficiency);
        let average_delivery_score = mean(delivery_sum, items_with_efficiency);
        let average_days = mean(days_sum, items_with_efficiency);

        let overall = self.developer_score(completion_rate, average_fair_efficiency, average_delivery_score, on_time_delivery);

        DeveloperMetrics {
            total_work_items,
            completed_items,
            items_with_efficiency,
            completion_rate: round2(completion_rate),
            on_time_delivery_percentage: round2(on_time_delivery),
            average_fair_efficiency: round2(average_fair_efficiency),
            average_delivery_score: round2(average_delivery_score),
            overall_developer_score: round2(overall),
            total_active_hours: round2(active_hours),
            total_estimated_hours: round2(estimated_hours),
            average_days_ahead_behind: round2(average_days),
            reopened_items_handled: reopened_items,
            reopened_rate: round2(reopened_rate),
            work_item_types: work_item_types.into_iter().collect(),
            projects: projects.into_iter().collect(),
            delivery_timing_breakdown: breakdown,
        }
    }

    /// Weighted overall developer score. On-time delivery is capped at 100.
    pub fn developer_score(
        &self,
        completion_rate: f64,
        average_fair_efficiency: f64,
        average_delivery_score: f64,
        on_time_delivery: f64,
    ) -> f64 {
        let weights = &self.config.developer_scoring.weights;
        average_fair_efficiency * weights.fair_efficiency
            + average_delivery_score * weights.delivery_score
            + completion_rate * weights.completion_rate
            + on_time_delivery.min(100.0) * weights.on_time_delivery
    }
}

/// Top states by average hours per occurrence across all items.
fn bottlenecks(items: &[ScoredWorkItem]) -> Vec<Bottleneck> {
    let mut occurrences: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for item in items {
        for (state, hours) in &item.efficiency.state_breakdown {
            let entry = occurrences.entry(state.as_str()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += hours;
        }
    }

    let mut ranked: Vec<Bottleneck> = occurrences
        .into_iter()
        .map(|(state, (count, hours))| Bottleneck {
            state: state.to_string(),
            average_time_hours: round2(mean(hours, count)),
            occurrences: count,
        })
        .collect();

    ranked.sort_by(|a, b| b.average_time_hours.total_cmp(&a.average_time_hours));
    ranked.truncate(TOP_BOTTLENECKS);
    ranked
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn non_empty_or_unknown(value: &str) -> String {
    if value.is_empty() {
        "Unknown".to_string()
    } else {
        value.to_string()
    }
}
