//! EventSink port - ドメインイベントの配送先
//!
//! Reconciler::flush() がバッファ内のイベントを順に emit する。
//! 配送の仕組み（メッセージバスなど）はこの trait の実装側の責務。

use crate::domain::DomainEvent;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to emit {event}: {reason}")]
pub struct EventSinkError {
    pub event: String,
    pub reason: String,
}

impl EventSinkError {
    pub fn new(event: &DomainEvent, reason: impl Into<String>) -> Self {
        Self {
            event: event.name().to_string(),
            reason: reason.into(),
        }
    }
}

pub trait EventSink {
    fn emit(&self, event: &DomainEvent) -> Result<(), EventSinkError>;
}
