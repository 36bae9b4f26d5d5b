use crate::Deferred;
use crate::state::Outcome;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Future returned by [`Deferred::wait`].
///
/// Registers the polling task's waker while pending. A wait that has polled
/// and is still alive counts as handling a rejection; dropping it withdraws
/// that.
#[must_use = "futures do nothing unless polled"]
pub struct Wait<T, E> {
    deferred: Deferred<T, E>,
    registered: bool,
}

impl<T, E> Wait<T, E> {
    pub(crate) fn new(deferred: Deferred<T, E>) -> Self {
        Self {
            deferred,
            registered: false,
        }
    }
}

impl<T: Clone, E: Clone> Future for Wait<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        let mut guard = this.deferred.inner.borrow_mut();
        let inner = &mut *guard;
        match &inner.outcome {
            Outcome::Fulfilled(value) => Poll::Ready(Ok(T::clone(value))),
            Outcome::Rejected(error) => Poll::Ready(Err(E::clone(error))),
            Outcome::Pending => {
                if !this.registered {
                    this.registered = true;
                    inner.waiters += 1;
                }
                if !inner.wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    inner.wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

impl<T, E> Drop for Wait<T, E> {
    fn drop(&mut self) {
        if !self.registered {
            return;
        }
        if let Ok(mut inner) = self.deferred.inner.try_borrow_mut() {
            inner.waiters = inner.waiters.saturating_sub(1);
        }
    }
}
