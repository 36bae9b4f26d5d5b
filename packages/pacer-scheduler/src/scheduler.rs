use crate::Spawner;
use crate::config::SchedulerConfig;
use crate::error::{SchedulerError, TaskError};
use crate::queue::TaskQueue;
use crate::task::{SlotGuard, TaskId};
use futures::FutureExt;
use pacer_deferred::{Deferred, panic_message};
use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// Lifetime counters for one scheduler.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    /// Highest number of tasks observed running at once.
    pub peak_running: usize,
}

pub(crate) struct Shared<S: Spawner> {
    name: String,
    capacity: usize,
    running: Cell<usize>,
    /// Set while an `admit_next` loop is on the stack.
    admitting: Cell<bool>,
    queue: TaskQueue<Rc<Shared<S>>>,
    next_id: Cell<u64>,
    stats: Cell<SchedulerStats>,
    spawner: S,
}

impl<S: Spawner> Shared<S> {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    fn has_free_slot(&self) -> bool {
        self.running.get() < self.capacity
    }

    pub(crate) fn occupy(&self, id: TaskId) {
        let running = self.running.get() + 1;
        debug_assert!(running <= self.capacity, "running count exceeds capacity");
        self.running.set(running);

        let mut stats = self.stats.get();
        stats.peak_running = stats.peak_running.max(running);
        self.stats.set(stats);

        tracing::debug!(
            scheduler = %self.name,
            task = %id,
            running,
            capacity = self.capacity,
            "task started"
        );
    }

    pub(crate) fn release(self: &Rc<Self>, id: TaskId) {
        let running = self.running.get().saturating_sub(1);
        self.running.set(running);
        tracing::trace!(scheduler = %self.name, task = %id, running, "slot released");
        self.admit_next();
    }

    pub(crate) fn record_outcome(&self, id: TaskId, ok: bool) {
        let mut stats = self.stats.get();
        if ok {
            stats.completed += 1;
            tracing::debug!(scheduler = %self.name, task = %id, "task finished");
        } else {
            stats.failed += 1;
            tracing::debug!(scheduler = %self.name, task = %id, "task rejected");
        }
        self.stats.set(stats);
    }

    /// The only path from queued to running. Each runner is removed from the
    /// queue before it is invoked, so it runs at most once.
    ///
    /// A task that finishes while being started (its factory panicked, or the
    /// spawner refused it) releases its slot from inside this loop. That
    /// nested call returns at once and the outer loop takes the freed slot,
    /// so the stack stays flat however long the queue is.
    fn admit_next(self: &Rc<Self>) {
        if self.admitting.replace(true) {
            return;
        }
        let _admitting = AdmittingFlag(&self.admitting);

        while self.has_free_slot() {
            let Some(task) = self.queue.pop() else {
                break;
            };
            tracing::debug!(
                scheduler = %self.name,
                task = %task.id,
                queued = self.queue.len(),
                "admitting queued task"
            );
            (task.run)(self);
        }
    }

    fn next_task_id(&self) -> TaskId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        TaskId::from_raw(id)
    }
}

/// Clears the admission flag on every exit from `admit_next`.
struct AdmittingFlag<'a>(&'a Cell<bool>);

impl Drop for AdmittingFlag<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Runs at most `capacity` tasks at once and queues the rest in submission
/// order.
///
/// The scheduler never polls anything itself: admitted task futures are
/// handed to the [`Spawner`], and a finishing task frees its slot and admits
/// the next queued task before its own deferred settles.
///
/// Handles are cheap to clone and share the same queue and counters.
pub struct Scheduler<S: Spawner> {
    shared: Rc<Shared<S>>,
}

impl<S: Spawner> Clone for Scheduler<S> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<S: Spawner + 'static> Scheduler<S> {
    pub fn new(spawner: S, capacity: usize) -> Result<Self, SchedulerError> {
        Self::with_config(spawner, SchedulerConfig::new(capacity))
    }

    pub fn with_config(spawner: S, config: SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate()?;
        tracing::debug!(scheduler = %config.name, capacity = config.capacity, "scheduler created");
        Ok(Self {
            shared: Rc::new(Shared {
                name: config.name,
                capacity: config.capacity,
                running: Cell::new(0),
                admitting: Cell::new(false),
                queue: TaskQueue::new(),
                next_id: Cell::new(1),
                stats: Cell::new(SchedulerStats::default()),
                spawner,
            }),
        })
    }

    /// Submits a task and returns the deferred its outcome settles.
    ///
    /// If a slot is free and nothing is waiting, `factory` is invoked right
    /// away and its future handed to the spawner. Otherwise the task waits
    /// behind everything submitted before it. Failures of any kind surface
    /// only through the returned deferred.
    pub fn submit<F, Fut, T, E>(&self, factory: F) -> Deferred<T, TaskError<E>>
    where
        F: FnOnce() -> Fut + 'static,
        Fut: Future<Output = Result<T, E>> + 'static,
        T: 'static,
        E: 'static,
    {
        let shared = &self.shared;
        let id = shared.next_task_id();
        let deferred = Deferred::new();

        let mut stats = shared.stats.get();
        stats.submitted += 1;
        shared.stats.set(stats);

        let handle = deferred.clone();
        let runner = move |shared: &Rc<Shared<S>>| start(shared, id, factory, handle);

        if shared.has_free_slot() && shared.queue.is_empty() {
            runner(shared);
        } else {
            shared.queue.push(id, Box::new(runner));
            tracing::debug!(
                scheduler = %shared.name,
                task = %id,
                queued = shared.queue.len(),
                "task queued"
            );
        }

        deferred
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    pub fn name(&self) -> &str {
        self.shared.name()
    }

    /// Tasks admitted and not yet finished.
    pub fn running(&self) -> usize {
        self.shared.running.get()
    }

    /// Tasks waiting for a slot.
    pub fn queued(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.running() == 0 && self.queued() == 0
    }

    pub fn stats(&self) -> SchedulerStats {
        self.shared.stats.get()
    }
}

impl<S: Spawner> fmt::Debug for Scheduler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("name", &self.shared.name)
            .field("capacity", &self.shared.capacity)
            .field("running", &self.shared.running.get())
            .field("queued", &self.shared.queue.len())
            .finish()
    }
}

/// Moves one task into the running set: take the slot, call the factory and
/// hand its future to the spawner.
fn start<S, F, Fut, T, E>(
    shared: &Rc<Shared<S>>,
    id: TaskId,
    factory: F,
    deferred: Deferred<T, TaskError<E>>,
) where
    S: Spawner + 'static,
    F: FnOnce() -> Fut + 'static,
    Fut: Future<Output = Result<T, E>> + 'static,
    T: 'static,
    E: 'static,
{
    let guard = SlotGuard::acquire(shared.clone(), id, deferred);

    let future = match panic::catch_unwind(AssertUnwindSafe(factory)) {
        Ok(future) => future,
        Err(payload) => {
            guard.finish(Err(TaskError::Panicked(panic_message(payload.as_ref()))));
            return;
        }
    };

    let task = async move {
        let result = match AssertUnwindSafe(future).catch_unwind().await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(TaskError::Execution(error)),
            Err(payload) => Err(TaskError::Panicked(panic_message(payload.as_ref()))),
        };
        guard.finish(result);
    };

    if let Err(err) = shared.spawner.spawn_local(task.boxed_local()) {
        // The future, and the guard inside it, is already gone; the guard's
        // drop released the slot and rejected the deferred.
        tracing::warn!(scheduler = %shared.name, task = %id, error = %err, "executor refused task");
    }
}
