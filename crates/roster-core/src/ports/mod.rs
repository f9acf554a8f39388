//! Ports - 抽象化レイヤー
//!
//! Reconciler が外部に求める能力を trait として定義します。
//! 永続化・トランザクション・配送は外側の責務で、ここでは同期的な
//! 読み取り / 取得・作成だけを要求します。
//!
//! # 必須 / 任意
//! - 必須: TaskListProvider
//! - 任意: TaskListFinder, TourMembership（None なら「何もしない」側に倒れる）

pub mod clock;
pub mod event_sink;
pub mod id_generator;
pub mod task_list_finder;
pub mod task_list_provider;
pub mod tour_membership;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_sink::{EventSink, EventSinkError};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::task_list_finder::TaskListFinder;
pub use self::task_list_provider::TaskListProvider;
pub use self::tour_membership::TourMembership;
