//! Work item snapshots and state-change events as fed to the metrics engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RevisionError;
use crate::Time;

/// One observed state transition of a work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEvent {
    /// State label entered
    pub state: String,

    /// When the state was entered
    pub timestamp: Time,

    /// Free-text reason recorded with the change
    #[serde(default)]
    pub reason: String,

    /// Display name of whoever made the change
    #[serde(default)]
    pub actor: String,

    /// Tracker revision number; events are processed in ascending order
    pub sequence: u64,
}

impl StateEvent {
    /// Create an event with empty reason and actor.
    pub fn new(state: impl Into<String>, timestamp: Time, sequence: u64) -> Self {
        Self {
            state: state.into(),
            timestamp,
            reason: String::new(),
            actor: String::new(),
            sequence,
        }
    }
}

/// A revision as delivered by the tracking service, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RawRevision {
    /// Revision number
    pub revision: u64,

    /// State after this revision
    pub state: String,

    /// Change timestamp, RFC 3339 (a trailing `Z` is accepted)
    pub changed_date: String,

    /// Display name of the author
    pub changed_by: String,

    /// Reason attached to the change
    pub reason: String,
}

impl RawRevision {
    /// Validate this revision into a [`StateEvent`].
    pub fn to_event(&self) -> Result<StateEvent, RevisionError> {
        if self.changed_date.trim().is_empty() {
            return Err(RevisionError::MissingTimestamp(self.revision));
        }
        let timestamp = parse_timestamp(&self.changed_date).map_err(|source| {
            RevisionError::MalformedTimestamp {
                revision: self.revision,
                value: self.changed_date.clone(),
                source,
            }
        })?;

        Ok(StateEvent {
            state: self.state.clone(),
            timestamp,
            reason: self.reason.clone(),
            actor: self.changed_by.clone(),
            sequence: self.revision,
        })
    }
}

/// Parse a tracker timestamp into a UTC instant.
pub fn parse_timestamp(value: &str) -> Result<Time, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value.trim()).map(|dt| dt.with_timezone(&Utc))
}

/// Current metadata of a work item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WorkItemSnapshot {
    /// Tracker id
    pub id: u64,

    /// Title, when known
    pub title: Option<String>,

    /// Current state label
    #[serde(alias = "state")]
    pub current_state: String,

    /// Work item type (Task, Bug, User Story, ...)
    pub work_item_type: String,

    /// Original estimate in hours
    #[serde(alias = "original_estimate")]
    pub estimated_hours: Option<f64>,

    /// Planned start
    pub start_date: Option<Time>,

    /// Target (due) date
    pub target_date: Option<Time>,

    /// When the item was closed
    pub closed_date: Option<Time>,

    /// Assignee display name
    #[serde(alias = "assigned_to")]
    pub assignee: Option<String>,

    /// Project name
    #[serde(alias = "project_name")]
    pub project: Option<String>,
}

/// One work item plus its raw revision history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WorkItemInput {
    /// Snapshot of the item
    #[serde(flatten)]
    pub item: WorkItemSnapshot,

    /// Revision history, any order
    #[serde(default)]
    pub revisions: Vec<RawRevision>,
}
