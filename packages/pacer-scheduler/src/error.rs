use thiserror::Error;

/// Errors raised synchronously by the scheduler itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Why a submitted task's deferred was rejected.
///
/// These only ever reach the caller through the task's deferred; `submit`
/// itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError<E> {
    /// The task's own future resolved to an error.
    #[error("task failed: {0}")]
    Execution(E),

    /// The task factory or its future panicked.
    #[error("task panicked: {0}")]
    Panicked(String),

    /// The executor dropped the task before it completed, either because it
    /// refused the spawn or because it shut down.
    #[error("task abandoned by the executor")]
    Abandoned,
}

impl<E> TaskError<E> {
    /// The task's own error, if that is why it failed.
    pub fn execution(&self) -> Option<&E> {
        match self {
            TaskError::Execution(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, TaskError::Panicked(_))
    }
}
