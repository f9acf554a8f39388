//! TourMembership port - Task が Tour に属しているか（任意の協調者）
//!
//! Tour に属する Task の日付移動は Tour 側が管理する。
//! 協調者が渡されていない場合は「属していない」とみなす。

use crate::domain::{Task, TourId};

pub trait TourMembership {
    fn find_tour_for_task(&self, task: &Task) -> Option<TourId>;

    fn is_in_tour(&self, task: &Task) -> bool {
        self.find_tour_for_task(task).is_some()
    }
}
