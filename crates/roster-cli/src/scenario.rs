//! Scenario file: the world before the change, then the change sets to replay.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use roster_core::domain::ChangeSet;
use roster_core::{
    DomainEvent, Effect, FieldValue, ReconcileError, ReconcilerConfig, Task, TaskId, TaskList,
    TourId, UserId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub config: ReconcilerConfig,
    /// Frozen "now" for tasks without a deadline. Defaults to the system clock.
    #[serde(default)]
    pub now: Option<DateTime<Utc>>,
    pub task: Task,
    #[serde(default)]
    pub task_lists: Vec<SeedTaskList>,
    #[serde(default)]
    pub tours: BTreeMap<TourId, Vec<TaskId>>,
    /// Each session is one unit of work: its change sets share one event
    /// buffer, flushed when the session ends.
    pub sessions: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedTaskList {
    pub assignee: UserId,
    pub date: NaiveDate,
    #[serde(default)]
    pub tasks: Vec<TaskId>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub sessions: Vec<SessionReport>,
    pub task: Task,
    pub task_lists: Vec<TaskList>,
}

#[derive(Debug, Default, Serialize)]
pub struct SessionReport {
    pub effects: Vec<Vec<Effect>>,
    pub published: Vec<DomainEvent>,
}

/// Writes the new side of the interpreted fields onto the task, the way the
/// persistence layer has already done by the time a change set is produced.
pub fn apply_new_values(
    task: &mut Task,
    changes: &ChangeSet,
    config: &ReconcilerConfig,
) -> Result<(), ReconcileError> {
    if let Some(assignment) = changes.assignment_change(&config.assignment_field)? {
        match assignment.new {
            Some(user) => task.assign(user),
            None => task.unassign(),
        }
    }
    if let Some((_, new)) = changes.pair(&config.deadline_field)? {
        match new {
            FieldValue::Instant(due) => task.set_due_before(Some(*due)),
            FieldValue::Null => task.set_due_before(None),
            FieldValue::User(_) | FieldValue::Other(_) => {
                return Err(ReconcileError::malformed(
                    &config.deadline_field,
                    "expected an RFC 3339 instant or null",
                ));
            }
        }
    }
    Ok(())
}
