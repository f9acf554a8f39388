//! TaskListProvider port - TaskList の解決（必須の協調者）
//!
//! どちらのメソッドも「取得、なければ作成」。absent を返さないのが契約。

use chrono::NaiveDate;

use crate::domain::{Task, TaskListHandle, UserId};

pub trait TaskListProvider {
    /// The list `task` should join when assigned to `assignee`.
    fn task_list_for_task(&self, task: &Task, assignee: UserId) -> TaskListHandle;

    /// The list of `assignee` on `date`.
    fn task_list_for_date(&self, date: NaiveDate, assignee: UserId) -> TaskListHandle;
}
