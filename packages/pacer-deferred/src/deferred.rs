use crate::observer::{Observers, invoke};
use crate::resolver::Resolver;
use crate::state::{DeferredState, Outcome};
use crate::wait::Wait;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::future::IntoFuture;
use std::mem;
use std::rc::Rc;
use std::task::Waker;

pub(crate) struct Inner<T, E> {
    pub(crate) outcome: Outcome<T, E>,
    observers: Observers<T, E>,
    pub(crate) wakers: SmallVec<[Waker; 1]>,
    /// Live `Wait` futures that have polled while pending. Wakers of dropped
    /// waits linger in `wakers`, so this is what counts as a handler.
    pub(crate) waiters: usize,
}

/// A value that becomes available later, settled at most once.
///
/// `Deferred` is a cheap handle: clones share the same settlement. It is meant
/// for single-threaded executors and is neither `Send` nor `Sync`.
pub struct Deferred<T, E> {
    pub(crate) inner: Rc<RefCell<Inner<T, E>>>,
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T, E> Default for Deferred<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Deferred<T, E> {
    /// Creates a pending deferred.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                outcome: Outcome::Pending,
                observers: Observers::default(),
                wakers: SmallVec::new(),
                waiters: 0,
            })),
        }
    }

    /// Creates a deferred and hands its resolving capability to `executor`,
    /// which may settle it synchronously or stash the resolver for later.
    pub fn with_executor<F>(executor: F) -> Self
    where
        F: FnOnce(Resolver<T, E>),
    {
        let deferred = Self::new();
        executor(Resolver::new(deferred.clone()));
        deferred
    }

    pub fn resolved(value: T) -> Self {
        let deferred = Self::new();
        deferred.resolve(value);
        deferred
    }

    pub fn rejected(error: E) -> Self {
        let deferred = Self::new();
        deferred.reject(error);
        deferred
    }

    /// A resolver bound to this deferred.
    pub fn resolver(&self) -> Resolver<T, E> {
        Resolver::new(self.clone())
    }

    pub fn state(&self) -> DeferredState {
        self.inner.borrow().outcome.state()
    }

    pub fn is_pending(&self) -> bool {
        self.state().is_pending()
    }

    pub fn is_settled(&self) -> bool {
        self.state().is_settled()
    }

    /// Number of observers still waiting for settlement.
    pub fn pending_observers(&self) -> usize {
        self.inner.borrow().observers.len()
    }

    /// Whether both handles refer to the same settlement.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Registers a reaction to fulfillment. Runs immediately if already
    /// fulfilled; dropped without running if rejected.
    pub fn on_fulfilled<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(&T) + 'static,
    {
        let value = {
            let mut inner = self.inner.borrow_mut();
            if let Outcome::Pending = inner.outcome {
                inner.observers.on_fulfilled.push(Box::new(callback));
                return self;
            }
            match &inner.outcome {
                Outcome::Fulfilled(value) => value.clone(),
                _ => return self,
            }
        };
        invoke("fulfilled", || callback(&value));
        self
    }

    /// Registers a reaction to rejection. Runs immediately if already
    /// rejected; dropped without running if fulfilled.
    pub fn on_rejected<F>(&self, callback: F) -> &Self
    where
        F: FnOnce(&E) + 'static,
    {
        let error = {
            let mut inner = self.inner.borrow_mut();
            if let Outcome::Pending = inner.outcome {
                inner.observers.on_rejected.push(Box::new(callback));
                return self;
            }
            match &inner.outcome {
                Outcome::Rejected(error) => error.clone(),
                _ => return self,
            }
        };
        invoke("rejected", || callback(&error));
        self
    }

    /// Registers a reaction to either terminal state.
    pub fn on_settled<F>(&self, callback: F) -> &Self
    where
        F: FnOnce() + 'static,
    {
        {
            let mut inner = self.inner.borrow_mut();
            if let Outcome::Pending = inner.outcome {
                inner.observers.on_settled.push(Box::new(callback));
                return self;
            }
        }
        invoke("settled", callback);
        self
    }

    /// Fulfills the deferred. Returns `false` and discards `value` if it was
    /// already settled.
    pub fn resolve(&self, value: T) -> bool {
        let value = Rc::new(value);
        let (observers, wakers) = {
            let mut inner = self.inner.borrow_mut();
            if !matches!(inner.outcome, Outcome::Pending) {
                tracing::trace!(state = %inner.outcome.state(), "ignoring resolve on settled deferred");
                return false;
            }
            inner.outcome = Outcome::Fulfilled(value.clone());
            (
                mem::take(&mut inner.observers),
                mem::take(&mut inner.wakers),
            )
        };

        tracing::trace!(
            observers = observers.on_fulfilled.len() + observers.on_settled.len(),
            "deferred fulfilled"
        );

        for callback in observers.on_fulfilled {
            invoke("fulfilled", || callback(&value));
        }
        for callback in observers.on_settled {
            invoke("settled", callback);
        }
        wakers.into_iter().for_each(Waker::wake);
        true
    }

    /// Rejects the deferred. Returns `false` and discards `error` if it was
    /// already settled.
    pub fn reject(&self, error: E) -> bool {
        let error = Rc::new(error);
        let (observers, wakers, waiters) = {
            let mut inner = self.inner.borrow_mut();
            if !matches!(inner.outcome, Outcome::Pending) {
                tracing::trace!(state = %inner.outcome.state(), "ignoring reject on settled deferred");
                return false;
            }
            inner.outcome = Outcome::Rejected(error.clone());
            (
                mem::take(&mut inner.observers),
                mem::take(&mut inner.wakers),
                inner.waiters,
            )
        };

        if observers.on_rejected.is_empty() && waiters == 0 {
            tracing::warn!("unhandled rejection: deferred rejected with no rejection observer");
        } else {
            tracing::trace!(
                observers = observers.on_rejected.len() + observers.on_settled.len(),
                "deferred rejected"
            );
        }

        for callback in observers.on_rejected {
            invoke("rejected", || callback(&error));
        }
        for callback in observers.on_settled {
            invoke("settled", callback);
        }
        wakers.into_iter().for_each(Waker::wake);
        true
    }

    /// Settles from a `Result`, fulfilling on `Ok` and rejecting on `Err`.
    pub fn settle(&self, result: Result<T, E>) -> bool {
        match result {
            Ok(value) => self.resolve(value),
            Err(error) => self.reject(error),
        }
    }
}

impl<T: Clone, E: Clone> Deferred<T, E> {
    /// The fulfilled value, if any.
    pub fn value(&self) -> Option<T> {
        match &self.inner.borrow().outcome {
            Outcome::Fulfilled(value) => Some(T::clone(value)),
            _ => None,
        }
    }

    /// The rejection error, if any.
    pub fn error(&self) -> Option<E> {
        match &self.inner.borrow().outcome {
            Outcome::Rejected(error) => Some(E::clone(error)),
            _ => None,
        }
    }

    /// `None` while pending, otherwise a copy of the settlement.
    pub fn outcome(&self) -> Option<Result<T, E>> {
        match &self.inner.borrow().outcome {
            Outcome::Pending => None,
            Outcome::Fulfilled(value) => Some(Ok(T::clone(value))),
            Outcome::Rejected(error) => Some(Err(E::clone(error))),
        }
    }

    /// A future that completes with a copy of the settlement.
    pub fn wait(&self) -> Wait<T, E> {
        Wait::new(self.clone())
    }
}

impl<T: Clone, E: Clone> IntoFuture for Deferred<T, E> {
    type Output = Result<T, E>;
    type IntoFuture = Wait<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        Wait::new(self)
    }
}

impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(inner) => f
                .debug_struct("Deferred")
                .field("state", &inner.outcome.state())
                .field("observers", &inner.observers.len())
                .finish(),
            Err(_) => f.debug_struct("Deferred").finish_non_exhaustive(),
        }
    }
}
