//! Reconciler - Task の差分から TaskList の所属とドメインイベントを導く
//!
//! # フロー
//! 1. 期限フィールドの差分から日付変更（暦日が変わった場合のみ）を取り出す
//! 2. 割り当てフィールドの差分がなければ、日付変更があれば TaskList を移動して終了
//! 3. 割り当てが変わった場合:
//!    - 新規割り当て / 別の人への再割り当て: 旧リストから削除 → 新リストへ追加 → TaskAssigned
//!    - 同じ人: イベントなし。日付変更があれば移動だけ行う
//!    - 割り当て解除: TaskUnassigned が未記録なら、割り当てクリア + 旧リストから削除
//!
//! # 設計原則
//! - 「1 Task は高々 1 TaskList」はストレージが保証しない。削除してから追加する順序で守る
//! - 追加の前には必ず所属チェックを行う
//! - 見つからない TaskList や未接続の任意協調者はエラーにせず、debug ログを出してスキップ
//! - TaskList の変更は即時に行う。ロールバックは外側のトランザクションの責務

use chrono::NaiveDate;
use tracing::debug;

use crate::app::config::ReconcilerConfig;
use crate::app::pending_events::PendingEvents;
use crate::domain::{
    ChangeSet, DateChange, DomainEvent, Effect, ReconcileError, Task, TaskId, TaskListHandle,
    UserId,
};
use crate::ports::{EventSink, EventSinkError, TaskListFinder, TaskListProvider, TourMembership};

pub struct Reconciler<P> {
    provider: P,
    finder: Option<Box<dyn TaskListFinder>>,
    tours: Option<Box<dyn TourMembership>>,
    config: ReconcilerConfig,
    pending: PendingEvents,
}

impl<P: TaskListProvider> Reconciler<P> {
    /// Reconciler with the default field names and no optional collaborators.
    pub fn new(provider: P) -> Self {
        Self::from_parts(provider, None, None, ReconcilerConfig::default())
    }

    pub(crate) fn from_parts(
        provider: P,
        finder: Option<Box<dyn TaskListFinder>>,
        tours: Option<Box<dyn TourMembership>>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            provider,
            finder,
            tours,
            config,
            pending: PendingEvents::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Reconciles TaskList membership with the changed fields of `task`.
    ///
    /// `task` must already carry its new values. Both interpreted fields are
    /// validated before anything is touched, so a malformed change set leaves
    /// every aggregate as it was.
    pub fn process(
        &mut self,
        task: &mut Task,
        changes: &ChangeSet,
    ) -> Result<Vec<Effect>, ReconcileError> {
        debug!(task = %task.id(), "began processing task");

        let date_change = changes.date_change(&self.config.deadline_field)?;
        let assignment = changes.assignment_change(&self.config.assignment_field)?;

        let mut effects = Vec::new();

        let Some(assignment) = assignment else {
            if let Some(date_change) = date_change {
                self.relocate_for_date_change(task, date_change, &mut effects);
            }
            return Ok(effects);
        };

        match (assignment.old, assignment.new) {
            (old, Some(new)) => self.sync_assignment(task, old, new, date_change, &mut effects),
            (Some(old), None) => self.sync_unassignment(task, old, &mut effects),
            (None, None) => debug!(task = %task.id(), "task was not assigned and still is not"),
        }

        Ok(effects)
    }

    pub fn recorded_events(&self) -> &[DomainEvent] {
        self.pending.as_slice()
    }

    pub fn pending(&self) -> &PendingEvents {
        &self.pending
    }

    /// Forgets every pending event. Call between sessions.
    pub fn erase_events(&mut self) {
        self.pending.clear();
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        self.pending.take()
    }

    /// Emits pending events in recording order.
    ///
    /// Emitted events leave the buffer. On the first failure the failing
    /// event and every later one stay pending.
    pub fn flush(&mut self, sink: &dyn EventSink) -> Result<usize, EventSinkError> {
        let mut published = 0;
        let mut outcome = Ok(());
        for event in self.pending.as_slice() {
            if let Err(err) = sink.emit(event) {
                outcome = Err(err);
                break;
            }
            published += 1;
        }
        self.pending.discard_front(published);
        outcome.map(|()| published)
    }

    /// Newly assigned, reassigned, or re-set to the same person.
    fn sync_assignment(
        &mut self,
        task: &Task,
        old: Option<UserId>,
        new: UserId,
        date_change: Option<DateChange>,
        effects: &mut Vec<Effect>,
    ) {
        let task_id = task.id();

        match old {
            Some(old) if old == new => {
                debug!(task = %task_id, assignee = %old, "task was already assigned to this user");
                if let Some(date_change) = date_change {
                    self.relocate_for_date_change(task, date_change, effects);
                }
                return;
            }
            None => debug!(task = %task_id, "task was not assigned previously"),
            Some(_) => {}
        }

        let task_list = self.provider.task_list_for_task(task, new);

        if let Some(old) = old {
            debug!(task = %task_id, previous_assignee = %old, "removing task from previous task list");
            // Before the date moved the task sat in the old day's list.
            let previous = match date_change {
                Some(date_change) => self.find_task_list(date_change.old_date, old),
                None => Some(self.provider.task_list_for_task(task, old)),
            };
            if let Some(previous) = previous {
                remove_from(&previous, task_id, effects);
            }
        }

        // Secondary sync: some write paths set `assigned_to` without touching
        // the list, so membership is derived here after the fact. Lists edited
        // directly already contain the task and are left alone.
        // TODO: skip tasks governed by a Tour here too, once it is confirmed the
        // Tour itself is what sits in the list at assignment time.
        if !task_list.contains_task(task_id) {
            append_to(&task_list, task_id, effects);
        }

        let event = DomainEvent::assigned(task_id, new);
        if self.pending.record(event) {
            debug!(task = %task_id, assignee = %new, "task has been assigned, recorded event");
            effects.push(Effect::EventRecorded { event });
        } else {
            debug!(task = %task_id, assignee = %new, "assign event already recorded");
            effects.push(Effect::DuplicateEventSkipped { event });
        }
    }

    /// Was assigned to `old`, is not assigned anymore.
    ///
    /// A pending equal event means this unassignment was handled earlier in
    /// the session: nothing is touched at all.
    fn sync_unassignment(&mut self, task: &mut Task, old: UserId, effects: &mut Vec<Effect>) {
        let task_id = task.id();
        debug!(task = %task_id, previous_assignee = %old, "task has been unassigned");

        let task_list = self.provider.task_list_for_task(task, old);
        let event = DomainEvent::unassigned(task_id, old);

        if self.pending.contains(&event) {
            debug!(task = %task_id, "unassign event already recorded");
            effects.push(Effect::DuplicateEventSkipped { event });
            return;
        }

        task.unassign();
        effects.push(Effect::AssignmentCleared {
            task: task_id,
            previous_assignee: old,
        });
        remove_from(&task_list, task_id, effects);

        self.pending.record(event);
        debug!(task = %task_id, "recorded unassign event");
        effects.push(Effect::EventRecorded { event });
    }

    /// Moves the task between the assignee's per-day lists.
    fn relocate_for_date_change(
        &self,
        task: &Task,
        date_change: DateChange,
        effects: &mut Vec<Effect>,
    ) {
        let task_id = task.id();

        let Some(assignee) = task.assigned_to() else {
            debug!(task = %task_id, "task has no assignee, nothing to relocate");
            return;
        };

        if self.is_in_tour(task) {
            debug!(task = %task_id, "task belongs to a tour, not relocating");
            return;
        }

        let Some(old_list) = self.find_task_list(date_change.old_date, assignee) else {
            return;
        };
        if !old_list.contains_task(task_id) {
            debug!(
                task = %task_id,
                task_list = %old_list.id(),
                "task is not in the previous day's task list"
            );
            return;
        }

        let new_list = self.provider.task_list_for_date(date_change.new_date, assignee);
        debug!(
            task = %task_id,
            from = %date_change.old_date,
            to = %date_change.new_date,
            "relocating task for date change"
        );

        if !old_list.same_list(&new_list) {
            remove_from(&old_list, task_id, effects);
        }
        if !new_list.contains_task(task_id) {
            append_to(&new_list, task_id, effects);
        }
    }

    fn find_task_list(&self, date: NaiveDate, assignee: UserId) -> Option<TaskListHandle> {
        let Some(finder) = &self.finder else {
            debug!(%date, %assignee, "no task list finder wired, skipping lookup");
            return None;
        };
        let found = finder.find_task_list(date, assignee);
        if found.is_none() {
            debug!(%date, %assignee, "no task list found");
        }
        found
    }

    fn is_in_tour(&self, task: &Task) -> bool {
        self.tours
            .as_ref()
            .is_some_and(|tours| tours.is_in_tour(task))
    }
}

fn remove_from(task_list: &TaskListHandle, task: TaskId, effects: &mut Vec<Effect>) {
    if task_list.remove_task(task) {
        debug!(%task, task_list = %task_list.id(), "removed task from task list");
        effects.push(Effect::ItemRemoved {
            task_list: task_list.id(),
            task,
        });
    }
}

fn append_to(task_list: &TaskListHandle, task: TaskId, effects: &mut Vec<Effect>) {
    let position = task_list.append_task(task);
    debug!(%task, task_list = %task_list.id(), position, "added task to task list");
    effects.push(Effect::ItemAdded {
        task_list: task_list.id(),
        task,
        position,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ReconcilerBuilder;
    use crate::domain::{FieldValue, TaskList, TaskListId};
    use crate::impls::{CollectingEventSink, InMemoryTaskLists, InMemoryTours};
    use crate::ports::FixedClock;
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};
    use rstest::rstest;
    use std::cell::Cell;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn store() -> InMemoryTaskLists {
        InMemoryTaskLists::new(FixedClock::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap(),
        ))
    }

    fn wired(lists: &InMemoryTaskLists) -> Reconciler<InMemoryTaskLists> {
        ReconcilerBuilder::new(lists.clone())
            .finder(lists.clone())
            .tours(InMemoryTours::new())
            .build()
            .unwrap()
    }

    fn seed(lists: &InMemoryTaskLists, assignee: UserId, date: &str, task: TaskId) -> TaskListHandle {
        let handle = lists.get_or_create(day(date), assignee);
        handle.append_task(task);
        handle
    }

    #[rstest]
    #[case::fresh_assignment(None, Some(0), Some((true, 0)))]
    #[case::reassignment(Some(0), Some(1), Some((true, 1)))]
    #[case::same_person(Some(0), Some(0), None)]
    #[case::unassignment(Some(0), None, Some((false, 0)))]
    #[case::never_assigned(None, None, None)]
    fn assignment_transitions_emit_one_event_per_transition(
        #[case] old: Option<usize>,
        #[case] new: Option<usize>,
        #[case] expected: Option<(bool, usize)>,
    ) {
        let couriers = [UserId::generate(), UserId::generate()];
        let lists = store();
        let mut reconciler = wired(&lists);
        let mut task = Task::new(TaskId::generate()).with_due_before(at("2024-01-01T10:00:00Z"));
        if let Some(new) = new {
            task.assign(couriers[new]);
        }

        let changes = ChangeSet::new().assigned_to(old.map(|i| couriers[i]), new.map(|i| couriers[i]));
        reconciler.process(&mut task, &changes).unwrap();

        let expected = expected.map(|(assigned, user)| {
            if assigned {
                DomainEvent::assigned(task.id(), couriers[user])
            } else {
                DomainEvent::unassigned(task.id(), couriers[user])
            }
        });
        assert_eq!(reconciler.recorded_events(), expected.as_slice());
    }

    #[test]
    fn malformed_assignment_touches_nothing() {
        let courier = UserId::generate();
        let lists = store();
        let mut reconciler = wired(&lists);
        let mut task = Task::new(TaskId::generate())
            .with_assignee(courier)
            .with_due_before(at("2024-01-02T10:00:00Z"));
        let old_list = seed(&lists, courier, "2024-01-01", task.id());

        let changes = ChangeSet::new()
            .due_before(Some(at("2024-01-01T10:00:00Z")), task.due_before())
            .field("assignedTo", vec![FieldValue::User(courier)]);

        let err = reconciler.process(&mut task, &changes).unwrap_err();

        assert!(matches!(err, ReconcileError::MalformedChange { .. }));
        assert!(old_list.contains_task(task.id()));
        assert_eq!(lists.len(), 1);
        assert!(reconciler.recorded_events().is_empty());
    }

    #[test]
    fn reassignment_across_days_leaves_the_old_days_list() {
        let (a, b) = (UserId::generate(), UserId::generate());
        let lists = store();
        let mut reconciler = wired(&lists);
        let mut task = Task::new(TaskId::generate())
            .with_assignee(b)
            .with_due_before(at("2024-01-02T10:00:00Z"));
        let old_list = seed(&lists, a, "2024-01-01", task.id());

        let changes = ChangeSet::new()
            .assigned_to(Some(a), Some(b))
            .due_before(Some(at("2024-01-01T10:00:00Z")), task.due_before());
        let effects = reconciler.process(&mut task, &changes).unwrap();

        let new_list = lists.get(day("2024-01-02"), b).unwrap();
        assert!(!old_list.contains_task(task.id()));
        assert!(new_list.contains_task(task.id()));
        assert_eq!(
            effects,
            vec![
                Effect::ItemRemoved {
                    task_list: old_list.id(),
                    task: task.id()
                },
                Effect::ItemAdded {
                    task_list: new_list.id(),
                    task: task.id(),
                    position: 0
                },
                Effect::EventRecorded {
                    event: DomainEvent::assigned(task.id(), b)
                },
            ]
        );
    }

    #[test]
    fn reassignment_across_days_without_finder_cannot_see_old_list() {
        let (a, b) = (UserId::generate(), UserId::generate());
        let lists = store();
        let mut reconciler = Reconciler::new(lists.clone());
        let mut task = Task::new(TaskId::generate())
            .with_assignee(b)
            .with_due_before(at("2024-01-02T10:00:00Z"));
        let old_list = seed(&lists, a, "2024-01-01", task.id());

        let changes = ChangeSet::new()
            .assigned_to(Some(a), Some(b))
            .due_before(Some(at("2024-01-01T10:00:00Z")), task.due_before());
        reconciler.process(&mut task, &changes).unwrap();

        assert!(old_list.contains_task(task.id()));
        assert!(lists.get(day("2024-01-02"), b).unwrap().contains_task(task.id()));
        assert_eq!(reconciler.recorded_events().len(), 1);
    }

    #[test]
    fn same_person_with_date_change_relocates_only() {
        let courier = UserId::generate();
        let lists = store();
        let mut reconciler = wired(&lists);
        let mut task = Task::new(TaskId::generate())
            .with_assignee(courier)
            .with_due_before(at("2024-01-03T09:00:00Z"));
        let old_list = seed(&lists, courier, "2024-01-01", task.id());

        let changes = ChangeSet::new()
            .assigned_to(Some(courier), Some(courier))
            .due_before(Some(at("2024-01-01T09:00:00Z")), task.due_before());
        reconciler.process(&mut task, &changes).unwrap();

        assert!(!old_list.contains_task(task.id()));
        assert!(lists.get(day("2024-01-03"), courier).unwrap().contains_task(task.id()));
        assert!(reconciler.recorded_events().is_empty());
    }

    #[test]
    fn duplicate_assignment_still_syncs_membership() {
        let courier = UserId::generate();
        let lists = store();
        let mut reconciler = wired(&lists);
        let mut task = Task::new(TaskId::generate())
            .with_assignee(courier)
            .with_due_before(at("2024-01-01T10:00:00Z"));
        let changes = ChangeSet::new().assigned_to(None, Some(courier));

        reconciler.process(&mut task, &changes).unwrap();
        let list = lists.get(day("2024-01-01"), courier).unwrap();
        list.remove_task(task.id());

        let effects = reconciler.process(&mut task, &changes).unwrap();

        assert!(list.contains_task(task.id()));
        assert_eq!(reconciler.recorded_events().len(), 1);
        assert!(matches!(
            effects.last(),
            Some(Effect::DuplicateEventSkipped { .. })
        ));
    }

    #[test]
    fn duplicate_unassignment_touches_nothing() {
        let courier = UserId::generate();
        let lists = store();
        let mut reconciler = wired(&lists);
        let mut task = Task::new(TaskId::generate())
            .with_assignee(courier)
            .with_due_before(at("2024-01-01T10:00:00Z"));
        let list = seed(&lists, courier, "2024-01-01", task.id());
        let changes = ChangeSet::new().assigned_to(Some(courier), None);

        reconciler.process(&mut task, &changes).unwrap();
        assert!(!task.is_assigned());
        assert!(!list.contains_task(task.id()));

        // another write path puts it back within the same session
        task.assign(courier);
        list.append_task(task.id());
        let effects = reconciler.process(&mut task, &changes).unwrap();

        assert_eq!(task.assigned_to(), Some(courier));
        assert!(list.contains_task(task.id()));
        assert_eq!(
            effects,
            vec![Effect::DuplicateEventSkipped {
                event: DomainEvent::unassigned(task.id(), courier)
            }]
        );
        assert_eq!(reconciler.recorded_events().len(), 1);
    }

    #[test]
    fn erased_buffer_allows_the_event_again() {
        let courier = UserId::generate();
        let lists = store();
        let mut reconciler = wired(&lists);
        let mut task = Task::new(TaskId::generate()).with_assignee(courier);
        let changes = ChangeSet::new().assigned_to(None, Some(courier));

        reconciler.process(&mut task, &changes).unwrap();
        reconciler.erase_events();
        reconciler.process(&mut task, &changes).unwrap();

        assert_eq!(
            reconciler.recorded_events(),
            &[DomainEvent::assigned(task.id(), courier)]
        );
        // no deadline: the clock's day
        assert!(lists.get(day("2024-01-01"), courier).is_some());
    }

    #[test]
    fn legacy_deadline_field_name() {
        let courier = UserId::generate();
        let lists = store();
        let mut reconciler = ReconcilerBuilder::new(lists.clone())
            .finder(lists.clone())
            .config(ReconcilerConfig::default().with_deadline_field("doneBefore"))
            .build()
            .unwrap();
        let mut task = Task::new(TaskId::generate())
            .with_assignee(courier)
            .with_due_before(at("2024-01-02T10:00:00Z"));
        let old_list = seed(&lists, courier, "2024-01-01", task.id());

        let changes = ChangeSet::new().change(
            "doneBefore",
            FieldValue::Instant(at("2024-01-01T10:00:00Z")),
            FieldValue::Instant(at("2024-01-02T10:00:00Z")),
        );
        reconciler.process(&mut task, &changes).unwrap();

        assert!(!old_list.contains_task(task.id()));
        assert!(lists.get(day("2024-01-02"), courier).unwrap().contains_task(task.id()));
    }

    /// Hands out one list for every lookup.
    #[derive(Clone)]
    struct SingleList(TaskListHandle);

    impl TaskListProvider for SingleList {
        fn task_list_for_task(&self, _task: &Task, _assignee: UserId) -> TaskListHandle {
            self.0.clone()
        }

        fn task_list_for_date(&self, _date: NaiveDate, _assignee: UserId) -> TaskListHandle {
            self.0.clone()
        }
    }

    impl TaskListFinder for SingleList {
        fn find_task_list(&self, _date: NaiveDate, _assignee: UserId) -> Option<TaskListHandle> {
            Some(self.0.clone())
        }
    }

    #[test]
    fn relocation_within_the_same_list_keeps_the_item() {
        let courier = UserId::generate();
        let task = Task::new(TaskId::generate())
            .with_assignee(courier)
            .with_due_before(at("2024-01-02T10:00:00Z"));
        let mut list = TaskList::new(TaskListId::generate(), courier, day("2024-01-01"));
        list.append_task(TaskId::generate());
        list.append_task(task.id());
        let provider = SingleList(TaskListHandle::new(list));
        let mut reconciler = ReconcilerBuilder::new(provider.clone())
            .finder(provider.clone())
            .build()
            .unwrap();

        let changes = ChangeSet::new().due_before(Some(at("2024-01-01T10:00:00Z")), task.due_before());
        let effects = reconciler.process(&mut task.clone(), &changes).unwrap();

        assert!(effects.is_empty());
        assert_eq!(provider.0.borrow().items()[1].task, task.id());
    }

    /// Fails once `budget` events went through.
    struct FlakySink {
        budget: Cell<usize>,
        sink: CollectingEventSink,
    }

    impl EventSink for FlakySink {
        fn emit(&self, event: &DomainEvent) -> Result<(), EventSinkError> {
            if self.budget.get() == 0 {
                return Err(EventSinkError::new(event, "bus unavailable"));
            }
            self.budget.set(self.budget.get() - 1);
            self.sink.emit(event)
        }
    }

    #[test]
    fn flush_keeps_events_from_the_first_failure_on() {
        let lists = store();
        let mut reconciler = wired(&lists);
        let couriers: Vec<UserId> = (0..3).map(|_| UserId::generate()).collect();
        for courier in &couriers {
            let mut task = Task::new(TaskId::generate()).with_assignee(*courier);
            let changes = ChangeSet::new().assigned_to(None, Some(*courier));
            reconciler.process(&mut task, &changes).unwrap();
        }
        let all = reconciler.recorded_events().to_vec();
        let sink = FlakySink {
            budget: Cell::new(1),
            sink: CollectingEventSink::new(),
        };

        let err = reconciler.flush(&sink).unwrap_err();

        assert_eq!(err.reason, "bus unavailable");
        assert_eq!(sink.sink.events(), all[..1].to_vec());
        assert_eq!(reconciler.recorded_events(), &all[1..]);

        sink.budget.set(10);
        assert_eq!(reconciler.flush(&sink), Ok(2));
        assert_eq!(sink.sink.events(), all);
        assert!(reconciler.pending().is_empty());
    }
}
