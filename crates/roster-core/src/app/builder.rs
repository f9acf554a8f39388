//! ReconcilerBuilder - Reconciler の構築とワイヤリング
//!
//! # Fail-fast 設計
//! - 必須の協調者（TaskListProvider）はコンストラクタで受け取る
//! - 任意の協調者（TaskListFinder, TourMembership）は明示的に渡したときだけ使う
//! - build() 時に設定を検証し、不正なら BuildError を返す

use crate::app::config::ReconcilerConfig;
use crate::app::reconciler::Reconciler;
use crate::ports::{TaskListFinder, TaskListProvider, TourMembership};

/// ```ignore
/// let reconciler = ReconcilerBuilder::new(task_lists.clone())
///     .finder(task_lists)
///     .tours(tours)
///     .config(ReconcilerConfig::default().with_deadline_field("doneBefore"))
///     .build()?;
/// ```
pub struct ReconcilerBuilder<P> {
    provider: P,
    finder: Option<Box<dyn TaskListFinder>>,
    tours: Option<Box<dyn TourMembership>>,
    config: ReconcilerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("invalid reconciler config: {0}")]
    InvalidConfig(String),
}

impl<P: TaskListProvider> ReconcilerBuilder<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            finder: None,
            tours: None,
            config: ReconcilerConfig::default(),
        }
    }

    /// Read-only lookup of existing lists, used to find a task's previous list.
    pub fn finder(mut self, finder: impl TaskListFinder + 'static) -> Self {
        self.finder = Some(Box::new(finder));
        self
    }

    pub fn tours(mut self, tours: impl TourMembership + 'static) -> Self {
        self.tours = Some(Box::new(tours));
        self
    }

    pub fn config(mut self, config: ReconcilerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Reconciler<P>, BuildError> {
        self.config.validate()?;
        Ok(Reconciler::from_parts(
            self.provider,
            self.finder,
            self.tours,
            self.config,
        ))
    }
}
