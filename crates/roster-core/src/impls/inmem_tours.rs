//! InMemoryTours - 開発・テスト用の Tour 所属表

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::domain::{Task, TaskId, TourId};
use crate::ports::TourMembership;

/// Task → Tour の対応表。clone したものは同じ表を共有する。
#[derive(Debug, Clone, Default)]
pub struct InMemoryTours {
    memberships: Rc<RefCell<HashMap<TaskId, TourId>>>,
}

impl InMemoryTours {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `task` into `tour`, moving it out of any previous tour.
    pub fn add_task(&self, tour: TourId, task: TaskId) {
        self.memberships.borrow_mut().insert(task, tour);
    }

    pub fn remove_task(&self, task: TaskId) -> Option<TourId> {
        self.memberships.borrow_mut().remove(&task)
    }
}

impl TourMembership for InMemoryTours {
    fn find_tour_for_task(&self, task: &Task) -> Option<TourId> {
        self.memberships.borrow().get(&task.id()).copied()
    }
}
