//! Task entity: the unit of work that gets assigned and scheduled.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use super::ids::{TaskId, UserId};

/// A Task as seen by the reconciler.
///
/// `assigned_to` is the source of truth for assignment; TaskList membership is
/// derived from it. The deadline keeps its UTC offset so the calendar day is
/// taken in the zone the deadline was written in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    #[serde(default)]
    assigned_to: Option<UserId>,
    #[serde(default)]
    due_before: Option<DateTime<FixedOffset>>,
}

impl Task {
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            assigned_to: None,
            due_before: None,
        }
    }

    pub fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assigned_to = Some(assignee);
        self
    }

    pub fn with_due_before(mut self, due_before: DateTime<FixedOffset>) -> Self {
        self.due_before = Some(due_before);
        self
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn assigned_to(&self) -> Option<UserId> {
        self.assigned_to
    }

    pub fn due_before(&self) -> Option<DateTime<FixedOffset>> {
        self.due_before
    }

    /// Calendar day of the deadline, in the deadline's own offset.
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_before.map(|due| due.date_naive())
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_to.is_some()
    }

    pub fn assign(&mut self, assignee: UserId) {
        self.assigned_to = Some(assignee);
    }

    pub fn unassign(&mut self) {
        self.assigned_to = None;
    }

    pub fn set_due_before(&mut self, due_before: Option<DateTime<FixedOffset>>) {
        self.due_before = due_before;
    }
}
