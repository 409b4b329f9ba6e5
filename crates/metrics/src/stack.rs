//! State transition stack.
//!
//! Replays one work item's state events in sequence order and accumulates the
//! business hours spent in each state. Only closed intervals count: the state
//! entered by the final event has no end and contributes nothing.

use std::collections::{BTreeMap, BTreeSet};

use devpulse_core::{PatternSummary, StateCategoryConfig, StateEvent, Time, TimeBucket};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::BusinessHoursClock;

/// Hours in one state above which it is reported as a bottleneck.
pub const DEFAULT_BOTTLENECK_THRESHOLD_HOURS: f64 = 16.0;

/// A state whose accumulated time exceeded a threshold on one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateBottleneck {
    /// State label
    pub state: String,
    /// Hours accumulated in the state
    pub hours_spent: f64,
    /// Reason recorded when the state was first entered
    pub reason: String,
    /// Who first moved the item into the state
    pub changed_by: String,
}

/// A recorded transition and, once closed, the hours spent in it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTransition {
    /// The event that opened the interval
    pub event: StateEvent,
    /// Business hours credited when the interval closed
    pub hours_in_state: Option<f64>,
}

/// Time-in-state accumulator for a single work item.
#[derive(Debug, Clone)]
pub struct StateTransitionStack<'a> {
    categories: &'a StateCategoryConfig,
    clock: &'a BusinessHoursClock,
    transitions: Vec<RecordedTransition>,
    events_seen: usize,
    state_durations: BTreeMap<String, f64>,
    paused_durations: BTreeMap<String, f64>,
    productive_hours: f64,
    paused_hours: f64,
    calendar_time: chrono::Duration,
    was_reopened: bool,
    active_hours_after_reopen: f64,
    is_completed: bool,
    should_ignore: bool,
}

impl<'a> StateTransitionStack<'a> {
    /// Create an empty stack.
    pub fn new(categories: &'a StateCategoryConfig, clock: &'a BusinessHoursClock) -> Self {
        Self {
            categories,
            clock,
            transitions: Vec::new(),
            events_seen: 0,
            state_durations: BTreeMap::new(),
            paused_durations: BTreeMap::new(),
            productive_hours: 0.0,
            paused_hours: 0.0,
            calendar_time: chrono::Duration::zero(),
            was_reopened: false,
            active_hours_after_reopen: 0.0,
            is_completed: false,
            should_ignore: false,
        }
    }

    /// Build a stack from events in any order.
    ///
    /// Events are stably sorted by `sequence` before replay, so equal
    /// sequence numbers keep their input order.
    pub fn from_events(
        categories: &'a StateCategoryConfig,
        clock: &'a BusinessHoursClock,
        events: &[StateEvent],
    ) -> Self {
        let mut ordered: Vec<&StateEvent> = events.iter().collect();
        ordered.sort_by_key(|e| e.sequence);

        let mut stack = Self::new(categories, clock);
        for event in ordered {
            stack.record(event);
        }
        stack
    }

    /// Record the next event.
    ///
    /// Precondition: events arrive in ascending `sequence` order. Out-of-order
    /// input is not detected.
    pub fn record(&mut self, event: &StateEvent) {
        self.events_seen += 1;

        if self.categories.is_ignored(&event.state) {
            debug!(state = %event.state, sequence = event.sequence, "ignored state seen");
            self.should_ignore = true;
            return;
        }

        if self.categories.is_completion(&event.state) {
            self.is_completed = true;
        }

        let open = self
            .transitions
            .last()
            .map(|t| (t.event.state.clone(), t.event.timestamp));

        if let Some((state, entered_at)) = open {
            let hours = self.interval_hours(&state, entered_at, event.timestamp);
            self.accumulate(&state, hours);

            if let Some(last) = self.transitions.last_mut() {
                last.hours_in_state = Some(hours);
            }
            self.calendar_time = self.calendar_time + (event.timestamp - entered_at);

            if self.categories.is_completion(&state) && self.categories.is_productive(&event.state) {
                self.was_reopened = true;
            }

            debug!(from = %state, to = %event.state, hours, "closed state interval");
        }

        self.transitions.push(RecordedTransition {
            event: event.clone(),
            hours_in_state: None,
        });
    }

    fn interval_hours(&self, state: &str, start: Time, end: Time) -> f64 {
        if self.categories.is_productive(state) {
            self.clock.productive_hours(start, end)
        } else {
            self.clock.duration_hours(start, end, true)
        }
    }

    fn accumulate(&mut self, state: &str, hours: f64) {
        match self.categories.bucket(state) {
            TimeBucket::Productive => {
                *self.state_durations.entry(state.to_string()).or_insert(0.0) += hours;
                self.productive_hours += hours;
                if self.was_reopened {
                    self.active_hours_after_reopen += hours;
                }
            }
            TimeBucket::Paused => {
                *self.paused_durations.entry(state.to_string()).or_insert(0.0) += hours;
                self.paused_hours += hours;
            }
            TimeBucket::Tracked => {
                *self.state_durations.entry(state.to_string()).or_insert(0.0) += hours;
            }
        }
    }

    /// Business hours in productive states.
    pub fn productive_hours(&self) -> f64 {
        self.productive_hours
    }

    /// Business hours in paused states.
    pub fn paused_hours(&self) -> f64 {
        self.paused_hours
    }

    /// Business hours across every closed interval.
    pub fn total_hours(&self) -> f64 {
        self.state_durations.values().sum::<f64>() + self.paused_durations.values().sum::<f64>()
    }

    /// Hours per productive or neutral state.
    pub fn state_durations(&self) -> &BTreeMap<String, f64> {
        &self.state_durations
    }

    /// Hours per paused state.
    pub fn paused_durations(&self) -> &BTreeMap<String, f64> {
        &self.paused_durations
    }

    /// An ignored state was seen at any position.
    pub fn should_ignore(&self) -> bool {
        self.should_ignore
    }

    /// A completion state was entered.
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Events passed to [`record`](Self::record), ignored ones included.
    pub fn events_seen(&self) -> usize {
        self.events_seen
    }

    /// Recorded transitions, ignored states excluded.
    pub fn transitions(&self) -> &[RecordedTransition] {
        &self.transitions
    }

    /// Summary of the replayed patterns.
    pub fn pattern_summary(&self) -> PatternSummary {
        let states_visited: BTreeSet<String> =
            self.transitions.iter().map(|t| t.event.state.clone()).collect();

        PatternSummary {
            was_reopened: self.was_reopened,
            active_hours_after_reopen: self.active_hours_after_reopen,
            is_completed: self.is_completed,
            should_ignore: self.should_ignore,
            states_visited,
            transition_count: self.transitions.len(),
            total_calendar_days: self.calendar_time.num_days(),
            productive_states_used: self
                .state_durations
                .keys()
                .filter(|s| self.categories.is_productive(s))
                .cloned()
                .collect(),
            paused_states_used: self.paused_durations.keys().cloned().collect(),
        }
    }

    /// States in the productive/neutral map holding more than
    /// `threshold_hours`, longest first.
    pub fn detect_bottlenecks(&self, threshold_hours: f64) -> Vec<StateBottleneck> {
        let mut bottlenecks: Vec<StateBottleneck> = self
            .state_durations
            .iter()
            .filter(|(_, hours)| **hours > threshold_hours)
            .map(|(state, hours)| {
                let first_entry = self.transitions.iter().find(|t| &t.event.state == state);
                StateBottleneck {
                    state: state.clone(),
                    hours_spent: *hours,
                    reason: first_entry.map_or_else(|| "Unknown".to_string(), |t| t.event.reason.clone()),
                    changed_by: first_entry.map_or_else(|| "Unknown".to_string(), |t| t.event.actor.clone()),
                }
            })
            .collect();

        bottlenecks.sort_by(|a, b| b.hours_spent.total_cmp(&a.hours_spent));
        bottlenecks
    }
}
