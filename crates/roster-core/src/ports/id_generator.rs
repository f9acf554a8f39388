//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: Clock の時刻 + ランダム部の ULID

use crate::domain::ids::{Id, IdMarker, TaskId, TaskListId, TourId, UserId};
use crate::ports::Clock;
use ulid::Ulid;

pub trait IdGenerator {
    fn generate_task_id(&self) -> TaskId;

    fn generate_task_list_id(&self) -> TaskListId;

    fn generate_user_id(&self) -> UserId;

    fn generate_tour_id(&self) -> TourId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// FixedClock を渡すと timestamp 部分が固定になる（ランダム部は毎回異なる）。
#[derive(Debug, Clone)]
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next<T: IdMarker>(&self) -> Id<T> {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Id::from(Ulid::from_parts(timestamp_ms, rand::random()))
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_task_id(&self) -> TaskId {
        self.next()
    }

    fn generate_task_list_id(&self) -> TaskListId {
        self.next()
    }

    fn generate_user_id(&self) -> UserId {
        self.next()
    }

    fn generate_tour_id(&self) -> TourId {
        self.next()
    }
}
