//! Effect - 1 回の reconcile で実際に行った変更の記録
//!
//! 振る舞いには影響しない。呼び出し側のログ・監査・テストで使う。

use serde::{Deserialize, Serialize};

use super::events::DomainEvent;
use super::ids::{TaskId, TaskListId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// A new item was appended to a TaskList.
    ItemAdded {
        task_list: TaskListId,
        task: TaskId,
        position: usize,
    },

    /// The task's item was removed from a TaskList.
    ItemRemoved { task_list: TaskListId, task: TaskId },

    /// `assigned_to` was cleared on the task itself.
    AssignmentCleared {
        task: TaskId,
        previous_assignee: UserId,
    },

    /// The event was appended to the pending buffer.
    EventRecorded { event: DomainEvent },

    /// An equal event was already pending this session.
    DuplicateEventSkipped { event: DomainEvent },
}

impl Effect {
    /// Whether this effect touched TaskList membership.
    pub fn is_list_mutation(&self) -> bool {
        matches!(self, Effect::ItemAdded { .. } | Effect::ItemRemoved { .. })
    }
}
