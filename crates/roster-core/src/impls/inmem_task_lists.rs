//! InMemoryTaskLists - 開発・テスト用の TaskList ストア
//!
//! # 実装詳細
//! - BTreeMap<(UserId, NaiveDate), TaskListHandle> で (assignee, 日付) ごとに管理
//! - Rc<RefCell<..>> で状態を共有。clone したストアは同じリストを見る
//!   （TaskListProvider と TaskListFinder の両方に同じストアを渡せる）
//! - 期限のない Task は Clock の「今日」のリストに入る
//!
//! # 使用例
//! ```ignore
//! let task_lists = InMemoryTaskLists::new(SystemClock);
//! let reconciler = ReconcilerBuilder::new(task_lists.clone())
//!     .finder(task_lists.clone())
//!     .build()?;
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{Task, TaskId, TaskList, TaskListHandle, UserId};
use crate::ports::{Clock, IdGenerator, SystemClock, TaskListFinder, TaskListProvider, UlidGenerator};

#[derive(Clone)]
pub struct InMemoryTaskLists {
    lists: Rc<RefCell<BTreeMap<(UserId, NaiveDate), TaskListHandle>>>,
    clock: Rc<dyn Clock>,
    ids: Rc<dyn IdGenerator>,
}

impl InMemoryTaskLists {
    pub fn new<C: Clock + Clone + 'static>(clock: C) -> Self {
        Self {
            lists: Rc::new(RefCell::new(BTreeMap::new())),
            ids: Rc::new(UlidGenerator::new(clock.clone())),
            clock: Rc::new(clock),
        }
    }

    /// Seeds an existing list. Replaces any list stored for the same
    /// (assignee, date).
    pub fn insert(&self, task_list: TaskList) -> TaskListHandle {
        let key = (task_list.assignee(), task_list.date());
        let handle = TaskListHandle::new(task_list);
        self.lists.borrow_mut().insert(key, handle.clone());
        handle
    }

    pub fn get(&self, date: NaiveDate, assignee: UserId) -> Option<TaskListHandle> {
        self.lists.borrow().get(&(assignee, date)).cloned()
    }

    pub fn get_or_create(&self, date: NaiveDate, assignee: UserId) -> TaskListHandle {
        if let Some(existing) = self.get(date, assignee) {
            return existing;
        }
        let task_list = TaskList::new(self.ids.generate_task_list_id(), assignee, date);
        debug!(task_list = %task_list.id(), %assignee, %date, "created task list");
        self.insert(task_list)
    }

    /// Every list holding an item for `task`.
    pub fn lists_containing(&self, task: TaskId) -> Vec<TaskListHandle> {
        self.lists
            .borrow()
            .values()
            .filter(|handle| handle.contains_task(task))
            .cloned()
            .collect()
    }

    /// Current state of every list, ordered by assignee then date.
    pub fn snapshot(&self) -> Vec<TaskList> {
        self.lists.borrow().values().map(TaskListHandle::snapshot).collect()
    }

    pub fn len(&self) -> usize {
        self.lists.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.borrow().is_empty()
    }
}

impl Default for InMemoryTaskLists {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl TaskListProvider for InMemoryTaskLists {
    fn task_list_for_task(&self, task: &Task, assignee: UserId) -> TaskListHandle {
        let date = task.due_date().unwrap_or_else(|| self.clock.today());
        self.get_or_create(date, assignee)
    }

    fn task_list_for_date(&self, date: NaiveDate, assignee: UserId) -> TaskListHandle {
        self.get_or_create(date, assignee)
    }
}

impl TaskListFinder for InMemoryTaskLists {
    fn find_task_list(&self, date: NaiveDate, assignee: UserId) -> Option<TaskListHandle> {
        self.get(date, assignee)
    }
}
