//! Domain identifiers (strongly-typed IDs).
//!
//! # ULID ベースの ID + Phantom Type
//! `Id<T>` というジェネリック型で共通実装を提供しつつ、
//! `T` は実行時には使わないマーカー型として、コンパイル時の型安全性を提供します。
//! TaskId と UserId を取り違えると、イベントの重複判定や TaskList の
//! 所属判定が静かに壊れるため、ここで型を分けています。
//!
//! ## 文字列表現
//! - Display: `<prefix><ulid>`（例: `task-01HV...`）
//! - FromStr: プレフィックス付き / ULID のみ、どちらも受け付ける
//! - serde: Display の文字列で serialize、FromStr で deserialize

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"task-", "user-" など）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// ```ignore
/// let task_id: TaskId = Id::from(Ulid::new());
/// let user_id: UserId = Id::from(Ulid::new());
/// // task_id と user_id は異なる型なので、混同できない
/// ```
#[repr(transparent)]
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    _marker: PhantomData<T>,
}

// derive(Clone, Copy) would demand `T: Copy`, the marker never exists at runtime.
impl<T: IdMarker> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: IdMarker> Copy for Id<T> {}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    /// Fresh random id. Prefer an `IdGenerator` when time ordering matters.
    pub fn generate() -> Self {
        Self::from_ulid(Ulid::new())
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// IdParseError は文字列から ID を復元できなかった場合のエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {prefix}id `{input}`")]
pub struct IdParseError {
    prefix: &'static str,
    input: String,
}

impl<T: IdMarker> FromStr for Id<T> {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.strip_prefix(T::prefix()).unwrap_or(s);
        Ulid::from_string(raw)
            .map(Self::from_ulid)
            .map_err(|_| IdParseError {
                prefix: T::prefix(),
                input: s.to_string(),
            })
    }
}

impl<T: IdMarker> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T: IdMarker> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Task のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl IdMarker for Task {
    fn prefix() -> &'static str {
        "task-"
    }
}

/// TaskList のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskList {}

impl IdMarker for TaskList {
    fn prefix() -> &'static str {
        "tasklist-"
    }
}

/// User（courier などの assignee）のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum User {}

impl IdMarker for User {
    fn prefix() -> &'static str {
        "user-"
    }
}

/// Tour のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tour {}

impl IdMarker for Tour {
    fn prefix() -> &'static str {
        "tour-"
    }
}

// ========================================
// Type Alias
// ========================================

/// Identifier of a Task (the unit of work being assigned and scheduled).
pub type TaskId = Id<Task>;

/// Identifier of a TaskList (one assignee, one calendar day).
pub type TaskListId = Id<TaskList>;

/// Identifier of an assignee.
pub type UserId = Id<User>;

/// Identifier of a Tour grouping.
pub type TourId = Id<Tour>;
