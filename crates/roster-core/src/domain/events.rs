//! Events - ドメインイベント
//!
//! 割り当て状態の遷移を表す。Reconciler が PendingEvents に積み、
//! 呼び出し側が EventSink へ flush する。
//!
//! 同値性は構造的: 同じ種類・同じ TaskId・同じ UserId なら等しい。

use serde::{Deserialize, Serialize};

use super::ids::{TaskId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    TaskAssigned { task: TaskId, assignee: UserId },
    TaskUnassigned { task: TaskId, previous_assignee: UserId },
}

impl DomainEvent {
    pub fn assigned(task: TaskId, assignee: UserId) -> Self {
        DomainEvent::TaskAssigned { task, assignee }
    }

    pub fn unassigned(task: TaskId, previous_assignee: UserId) -> Self {
        DomainEvent::TaskUnassigned {
            task,
            previous_assignee,
        }
    }

    /// Stable name used by publishers.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::TaskAssigned { .. } => "task:assigned",
            DomainEvent::TaskUnassigned { .. } => "task:unassigned",
        }
    }

    pub fn task(&self) -> TaskId {
        match self {
            DomainEvent::TaskAssigned { task, .. } | DomainEvent::TaskUnassigned { task, .. } => {
                *task
            }
        }
    }

    /// The assignee the event is about (new one, or the one just removed).
    pub fn user(&self) -> UserId {
        match self {
            DomainEvent::TaskAssigned { assignee, .. } => *assignee,
            DomainEvent::TaskUnassigned {
                previous_assignee, ..
            } => *previous_assignee,
        }
    }
}
