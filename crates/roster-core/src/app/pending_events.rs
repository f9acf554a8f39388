//! PendingEvents - 1 セッション（通常は 1 トランザクション）分のイベントバッファ
//!
//! - 処理中は追記のみ
//! - 構造的に等しいイベントは 2 回積まない
//! - セッションの合間に呼び出し側が take / clear する

use crate::domain::DomainEvent;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingEvents {
    events: Vec<DomainEvent>,
}

impl PendingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `event` unless an equal one is already pending.
    /// Returns whether it was appended.
    pub fn record(&mut self, event: DomainEvent) -> bool {
        if self.contains(&event) {
            return false;
        }
        self.events.push(event);
        true
    }

    pub fn contains(&self, event: &DomainEvent) -> bool {
        // Sessions hold a handful of events; a scan keeps recording order.
        self.events.contains(event)
    }

    pub fn as_slice(&self) -> &[DomainEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn take(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drops the first `n` events (those already published).
    pub(crate) fn discard_front(&mut self, n: usize) {
        self.events.drain(..n.min(self.events.len()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskId, UserId};

    #[test]
    fn record_skips_structural_duplicates() {
        let task = TaskId::generate();
        let courier = UserId::generate();
        let mut pending = PendingEvents::new();

        assert!(pending.record(DomainEvent::assigned(task, courier)));
        assert!(!pending.record(DomainEvent::assigned(task, courier)));
        // same task and user, other kind
        assert!(pending.record(DomainEvent::unassigned(task, courier)));

        assert_eq!(pending.len(), 2);
    }

    #[test]
    fn take_drains_in_recording_order() {
        let task = TaskId::generate();
        let a = UserId::generate();
        let b = UserId::generate();
        let mut pending = PendingEvents::new();
        pending.record(DomainEvent::assigned(task, a));
        pending.record(DomainEvent::assigned(task, b));

        let taken = pending.take();

        assert_eq!(
            taken,
            vec![DomainEvent::assigned(task, a), DomainEvent::assigned(task, b)]
        );
        assert!(pending.is_empty());
        assert!(pending.record(DomainEvent::assigned(task, a)));
    }

    #[test]
    fn discard_front_is_bounded() {
        let mut pending = PendingEvents::new();
        pending.record(DomainEvent::assigned(TaskId::generate(), UserId::generate()));

        pending.discard_front(5);
        assert!(pending.is_empty());
    }
}
