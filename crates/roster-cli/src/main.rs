use std::cell::RefCell;
use std::process::ExitCode;

use roster_core::domain::{ChangeSet, TaskList, TaskListId};
use roster_core::impls::{InMemoryTaskLists, InMemoryTours, TracingEventSink};
use roster_core::ports::{EventSink, EventSinkError, FixedClock, SystemClock};
use roster_core::{BuildError, DomainEvent, ReconcileError, ReconcilerBuilder};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod scenario;

use scenario::{Report, Scenario, SessionReport, apply_new_values};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("usage: roster-cli <scenario.json>")]
    Usage,

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid scenario: {0}")]
    Scenario(#[from] serde_json::Error),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Publish(#[from] EventSinkError),
}

/// Logs every event like the tracing sink and keeps it for the report.
#[derive(Default)]
struct ReportingSink {
    published: RefCell<Vec<DomainEvent>>,
}

impl EventSink for ReportingSink {
    fn emit(&self, event: &DomainEvent) -> Result<(), EventSinkError> {
        TracingEventSink.emit(event)?;
        self.published.borrow_mut().push(*event);
        Ok(())
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries the report
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn run(path: &str) -> Result<Report, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_string(),
        source,
    })?;
    let scenario: Scenario = serde_json::from_str(&raw)?;

    let lists = match scenario.now {
        Some(now) => InMemoryTaskLists::new(FixedClock::new(now)),
        None => InMemoryTaskLists::new(SystemClock),
    };
    for seed in &scenario.task_lists {
        let mut task_list = TaskList::new(TaskListId::generate(), seed.assignee, seed.date);
        for task in &seed.tasks {
            task_list.append_task(*task);
        }
        lists.insert(task_list);
    }

    let tours = InMemoryTours::new();
    for (tour, tasks) in &scenario.tours {
        for task in tasks {
            tours.add_task(*tour, *task);
        }
    }

    let config = scenario.config.clone();
    let mut reconciler = ReconcilerBuilder::new(lists.clone())
        .finder(lists.clone())
        .tours(tours)
        .config(config.clone())
        .build()?;

    let mut task = scenario.task;
    let mut sessions = Vec::with_capacity(scenario.sessions.len());
    for (index, session) in scenario.sessions.iter().enumerate() {
        tracing::info!(session = index, change_sets = session.len(), "starting session");
        let mut report = SessionReport::default();
        for raw_changes in session {
            let changes = ChangeSet::from_json(raw_changes)?;
            apply_new_values(&mut task, &changes, &config)?;
            report.effects.push(reconciler.process(&mut task, &changes)?);
        }

        let sink = ReportingSink::default();
        reconciler.flush(&sink)?;
        report.published = sink.published.into_inner();
        sessions.push(report);
    }

    Ok(Report {
        sessions,
        task,
        task_lists: lists.snapshot(),
    })
}

fn main() -> ExitCode {
    init_tracing();

    let result = match std::env::args().nth(1) {
        Some(path) => run(&path),
        None => Err(CliError::Usage),
    };

    match result.and_then(|report| Ok(serde_json::to_string_pretty(&report)?)) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
