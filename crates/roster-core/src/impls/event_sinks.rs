//! EventSink の実装
//!
//! - **TracingEventSink**: info レベルのログとして出すだけ（CLI / 開発用）
//! - **CollectingEventSink**: 受け取ったイベントを保持する（テスト用）

use std::cell::RefCell;

use tracing::info;

use crate::domain::DomainEvent;
use crate::ports::{EventSink, EventSinkError};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &DomainEvent) -> Result<(), EventSinkError> {
        info!(
            event = event.name(),
            task = %event.task(),
            user = %event.user(),
            "published domain event"
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RefCell<Vec<DomainEvent>>,
}

impl CollectingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.borrow().clone()
    }
}

impl EventSink for CollectingEventSink {
    fn emit(&self, event: &DomainEvent) -> Result<(), EventSinkError> {
        self.events.borrow_mut().push(*event);
        Ok(())
    }
}
