use crate::Deferred;
use std::fmt;

/// The settling half of a [`Deferred`], handed to executors.
///
/// A resolver can only settle; it cannot observe. Settling an already settled
/// deferred is a no-op.
pub struct Resolver<T, E> {
    deferred: Deferred<T, E>,
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            deferred: self.deferred.clone(),
        }
    }
}

impl<T, E> Resolver<T, E> {
    pub(crate) fn new(deferred: Deferred<T, E>) -> Self {
        Self { deferred }
    }

    pub fn resolve(&self, value: T) -> bool {
        self.deferred.resolve(value)
    }

    pub fn reject(&self, error: E) -> bool {
        self.deferred.reject(error)
    }

    pub fn settle(&self, result: Result<T, E>) -> bool {
        self.deferred.settle(result)
    }

    pub fn is_settled(&self) -> bool {
        self.deferred.is_settled()
    }
}

impl<T, E> fmt::Debug for Resolver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("deferred", &self.deferred)
            .finish()
    }
}
