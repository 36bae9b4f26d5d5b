use crate::Spawner;
use crate::error::TaskError;
use crate::scheduler::Shared;
use pacer_deferred::Deferred;
use std::fmt;
use std::rc::Rc;

/// Identifies a submitted task within its scheduler, in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Owns a running task's slot and its unsettled deferred.
///
/// The slot is released on every exit path: normal completion via
/// [`SlotGuard::finish`], a panic, or the executor dropping the task future.
/// Release always happens before the deferred settles.
pub(crate) struct SlotGuard<S: Spawner, T, E> {
    shared: Rc<Shared<S>>,
    id: TaskId,
    deferred: Option<Deferred<T, TaskError<E>>>,
}

impl<S: Spawner, T, E> SlotGuard<S, T, E> {
    /// Takes a slot. The caller has already checked there is room.
    pub fn acquire(shared: Rc<Shared<S>>, id: TaskId, deferred: Deferred<T, TaskError<E>>) -> Self {
        shared.occupy(id);
        Self {
            shared,
            id,
            deferred: Some(deferred),
        }
    }

    /// Releases the slot, admits the next queued task, then settles.
    pub fn finish(mut self, result: Result<T, TaskError<E>>) {
        let deferred = self.deferred.take();
        let shared = self.shared.clone();
        let id = self.id;
        drop(self);

        shared.record_outcome(id, result.is_ok());
        if let Some(deferred) = deferred {
            deferred.settle(result);
        }
    }
}

impl<S: Spawner, T, E> Drop for SlotGuard<S, T, E> {
    fn drop(&mut self) {
        self.shared.release(self.id);

        // Still holding the deferred means `finish` never ran.
        if let Some(deferred) = self.deferred.take() {
            tracing::warn!(task = %self.id, scheduler = %self.shared.name(), "task abandoned before completion");
            self.shared.record_outcome(self.id, false);
            deferred.reject(TaskError::Abandoned);
        }
    }
}
