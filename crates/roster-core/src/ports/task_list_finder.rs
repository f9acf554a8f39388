//! TaskListFinder port - 既存 TaskList の読み取り専用検索（任意の協調者）
//!
//! 見つからない場合は None。作成はしない。
//! Reconciler に finder が渡されていない場合も、すべての検索は None 扱い。

use chrono::NaiveDate;

use crate::domain::{TaskListHandle, UserId};

pub trait TaskListFinder {
    fn find_task_list(&self, date: NaiveDate, assignee: UserId) -> Option<TaskListHandle>;
}
