//! App - アプリケーション層
//!
//! ports を組み合わせて reconcile のロジックを実装します。
//!
//! # 主要コンポーネント
//! - **Reconciler**: 差分 → TaskList の変更 + ドメインイベント
//! - **PendingEvents**: セッション単位の重複排除付きイベントバッファ
//! - **ReconcilerBuilder**: 協調者のワイヤリングと設定の検証
//! - **ReconcilerConfig**: 解釈するフィールド名

pub mod builder;
pub mod config;
pub mod pending_events;
pub mod reconciler;

pub use self::builder::{BuildError, ReconcilerBuilder};
pub use self::config::ReconcilerConfig;
pub use self::pending_events::PendingEvents;
pub use self::reconciler::Reconciler;
