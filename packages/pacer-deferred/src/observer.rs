use smallvec::SmallVec;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

pub(crate) type FulfilledFn<T> = Box<dyn FnOnce(&T)>;
pub(crate) type RejectedFn<E> = Box<dyn FnOnce(&E)>;
pub(crate) type SettledFn = Box<dyn FnOnce()>;

/// Observer lists registered while a deferred is still pending.
/// Most deferreds see one or two observers, so keep them inline.
pub(crate) struct Observers<T, E> {
    pub on_fulfilled: SmallVec<[FulfilledFn<T>; 2]>,
    pub on_rejected: SmallVec<[RejectedFn<E>; 2]>,
    pub on_settled: SmallVec<[SettledFn; 2]>,
}

impl<T, E> Default for Observers<T, E> {
    fn default() -> Self {
        Self {
            on_fulfilled: SmallVec::new(),
            on_rejected: SmallVec::new(),
            on_settled: SmallVec::new(),
        }
    }
}

impl<T, E> Observers<T, E> {
    pub fn len(&self) -> usize {
        self.on_fulfilled.len() + self.on_rejected.len() + self.on_settled.len()
    }
}

/// Runs one observer. A panicking observer is logged and swallowed so the
/// remaining observers in the drain still run.
pub(crate) fn invoke(kind: &'static str, f: impl FnOnce()) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
        tracing::error!(
            observer = kind,
            panic = %panic_message(payload.as_ref()),
            "deferred observer panicked"
        );
    }
}

/// Best-effort rendering of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_invoke_swallows_panics() {
        let ran = Cell::new(false);
        invoke("fulfilled", || panic!("boom"));
        invoke("fulfilled", || ran.set(true));
        assert!(ran.get());
    }

    fn payload_of(f: fn()) -> Box<dyn Any + Send> {
        panic::catch_unwind(f).unwrap_err()
    }

    #[test]
    fn test_panic_message_variants() {
        let payload = payload_of(|| panic!("static"));
        assert_eq!(panic_message(payload.as_ref()), "static");

        let payload = payload_of(|| panic!("{}-{}", "formatted", 1));
        assert_eq!(panic_message(payload.as_ref()), "formatted-1");

        let payload = payload_of(|| std::panic::panic_any(7_u32));
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
