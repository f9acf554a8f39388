//! Errors - エラー型と分類
//!
//! # 分類
//! - 入力不正（MalformedChange / InvalidChangeSet）: 呼び出し側の契約違反。致命的で、リトライしない
//! - 協調者の状態欠如（TaskList が見つからない等）: エラーにしない。debug ログを出してスキップする

/// ReconcileError は reconcile 呼び出しを中断するエラー
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("malformed change for field `{field}`: {reason}")]
    MalformedChange { field: String, reason: String },

    #[error("invalid change set: {0}")]
    InvalidChangeSet(String),
}

impl ReconcileError {
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ReconcileError::MalformedChange {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
