//! Domain model (ids, entities, change sets, events, errors).
//!
//! - ids: ULID ベースの型付き ID
//! - task / task_list: Task と TaskList（+ Item）集約
//! - change_set: フィールド単位の差分とその解釈
//! - events: 割り当て遷移のドメインイベント
//! - effects: reconcile の実行記録
//! - errors: 入力不正のエラー

pub mod change_set;
pub mod effects;
pub mod errors;
pub mod events;
pub mod ids;
pub mod task;
pub mod task_list;

pub use self::change_set::{
    ASSIGNMENT_FIELD, AssignmentChange, ChangeSet, DEADLINE_FIELD, DateChange, FieldValue,
};
pub use self::effects::Effect;
pub use self::errors::ReconcileError;
pub use self::events::DomainEvent;
pub use self::ids::{IdParseError, TaskId, TaskListId, TourId, UserId};
pub use self::task::Task;
pub use self::task_list::{Item, TaskList, TaskListHandle};
