//! TaskList - assignee ごと・日付ごとの順序付き作業リスト
//!
//! # 不変条件
//! - `Item::position` は常に items 内のインデックスと一致する
//! - 1 つの Task は高々 1 つの TaskList に属する（ストレージでは強制しない。
//!   Reconciler が「旧リストから削除 → 新リストへ追加」の順序で守る）

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ids::{TaskId, TaskListId, UserId};

/// Positioned membership record linking a TaskList to one Task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub task: TaskId,
    pub position: usize,
}

impl Item {
    pub fn new(task: TaskId, position: usize) -> Self {
        Self { task, position }
    }
}

/// Ordered worklist scoped to one (assignee, date) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    id: TaskListId,
    assignee: UserId,
    date: NaiveDate,
    items: Vec<Item>,
}

impl TaskList {
    pub fn new(id: TaskListId, assignee: UserId, date: NaiveDate) -> Self {
        Self {
            id,
            assignee,
            date,
            items: Vec::new(),
        }
    }

    pub fn id(&self) -> TaskListId {
        self.id
    }

    pub fn assignee(&self) -> UserId {
        self.assignee
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn task_ids(&self) -> Vec<TaskId> {
        self.items.iter().map(|item| item.task).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains_task(&self, task: TaskId) -> bool {
        self.items.iter().any(|item| item.task == task)
    }

    /// Inserts `item` at its position, clamped to the end of the sequence.
    pub fn add_item(&mut self, item: Item) {
        let index = item.position.min(self.items.len());
        self.items.insert(index, item);
        self.reindex();
    }

    /// Appends the task at the end and returns the position it was given.
    pub fn append_task(&mut self, task: TaskId) -> usize {
        let position = self.items.len();
        self.add_item(Item::new(task, position));
        position
    }

    /// Removes every item referencing `task`. Returns whether anything was removed.
    pub fn remove_task(&mut self, task: TaskId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.task != task);
        let removed = self.items.len() != before;
        if removed {
            self.reindex();
        }
        removed
    }

    fn reindex(&mut self) {
        for (index, item) in self.items.iter_mut().enumerate() {
            item.position = index;
        }
    }
}

/// Shared handle to a TaskList aggregate.
///
/// Lookups hand out the same instance the surrounding unit of work persists,
/// so mutations made through a handle are visible to every other holder.
/// Single-threaded: one reconciliation session owns all handles it touches.
#[derive(Debug, Clone)]
pub struct TaskListHandle(Rc<RefCell<TaskList>>);

impl TaskListHandle {
    pub fn new(task_list: TaskList) -> Self {
        Self(Rc::new(RefCell::new(task_list)))
    }

    pub fn id(&self) -> TaskListId {
        self.0.borrow().id()
    }

    pub fn same_list(&self, other: &TaskListHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.id() == other.id()
    }

    pub fn contains_task(&self, task: TaskId) -> bool {
        self.0.borrow().contains_task(task)
    }

    pub fn append_task(&self, task: TaskId) -> usize {
        self.0.borrow_mut().append_task(task)
    }

    pub fn remove_task(&self, task: TaskId) -> bool {
        self.0.borrow_mut().remove_task(task)
    }

    pub fn borrow(&self) -> Ref<'_, TaskList> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, TaskList> {
        self.0.borrow_mut()
    }

    /// Copy of the current state, for reporting.
    pub fn snapshot(&self) -> TaskList {
        self.0.borrow().clone()
    }
}
