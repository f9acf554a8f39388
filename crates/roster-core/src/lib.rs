//! roster-core
//!
//! Task の割り当て・期限の変更から、担当者ごと・日付ごとの作業リスト
//! （TaskList）の所属とドメインイベントを導く reconcile エンジン。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, Task, TaskList, ChangeSet, DomainEvent, Effect, errors）
//! - **ports**: 抽象化レイヤー（TaskListProvider, TaskListFinder, TourMembership, EventSink, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（Reconciler, PendingEvents, ReconcilerBuilder, ReconcilerConfig）
//! - **impls**: 実装（InMemoryTaskLists など開発・テスト用）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{BuildError, PendingEvents, Reconciler, ReconcilerBuilder, ReconcilerConfig};
pub use domain::{
    ChangeSet, DomainEvent, Effect, FieldValue, Item, ReconcileError, Task, TaskId, TaskList,
    TaskListHandle, TaskListId, TourId, UserId,
};
