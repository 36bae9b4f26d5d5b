pub mod config;
pub mod error;
mod queue;
pub mod scheduler;
pub mod task;

use futures::future::LocalBoxFuture;
use futures::task::{LocalFutureObj, LocalSpawn, SpawnError};
use std::rc::Rc;

/// The seam between the scheduler and whatever single-threaded executor
/// actually polls task futures.
/// This allows pacer to run on a futures `LocalPool`, a tokio `LocalSet`, or
/// a host-provided loop.
pub trait Spawner {
    /// Hand a future to the executor. On error the future has been dropped.
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) -> Result<(), SpawnError>;
}

impl Spawner for futures::executor::LocalSpawner {
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) -> Result<(), SpawnError> {
        self.spawn_local_obj(LocalFutureObj::new(future))
    }
}

impl<S: Spawner + ?Sized> Spawner for Rc<S> {
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) -> Result<(), SpawnError> {
        (**self).spawn_local(future)
    }
}

/// Spawns onto a tokio `LocalSet`. Futures queue up until the set is driven
/// with `run_until` or awaited.
#[cfg(feature = "tokio")]
impl Spawner for tokio::task::LocalSet {
    fn spawn_local(&self, future: LocalBoxFuture<'static, ()>) -> Result<(), SpawnError> {
        drop(tokio::task::LocalSet::spawn_local(self, future));
        Ok(())
    }
}

pub use config::SchedulerConfig;
pub use error::{SchedulerError, TaskError};
pub use pacer_deferred::{Deferred, DeferredState};
pub use scheduler::{Scheduler, SchedulerStats};
pub use task::TaskId;
