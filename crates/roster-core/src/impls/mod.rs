//! Impls - ports の実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryTaskLists**: TaskListProvider + TaskListFinder
//! - **InMemoryTours**: TourMembership
//! - **TracingEventSink / CollectingEventSink**: EventSink
//!
//! 本番用の実装（ORM / DB に載ったリポジトリなど）は呼び出し側が用意する。

pub mod event_sinks;
pub mod inmem_task_lists;
pub mod inmem_tours;

pub use self::event_sinks::{CollectingEventSink, TracingEventSink};
pub use self::inmem_task_lists::InMemoryTaskLists;
pub use self::inmem_tours::InMemoryTours;
