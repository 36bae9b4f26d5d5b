use std::fmt;
use std::rc::Rc;

/// The externally visible state of a [`Deferred`](crate::Deferred).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredState {
    Pending,
    Fulfilled,
    Rejected,
}

impl DeferredState {
    pub fn is_pending(self) -> bool {
        self == DeferredState::Pending
    }

    pub fn is_settled(self) -> bool {
        !self.is_pending()
    }
}

impl fmt::Display for DeferredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeferredState::Pending => "pending",
            DeferredState::Fulfilled => "fulfilled",
            DeferredState::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Stored settlement. Payloads live behind `Rc` so observers can be handed a
/// reference without holding the cell borrowed while they run.
pub(crate) enum Outcome<T, E> {
    Pending,
    Fulfilled(Rc<T>),
    Rejected(Rc<E>),
}

impl<T, E> Outcome<T, E> {
    pub(crate) fn state(&self) -> DeferredState {
        match self {
            Outcome::Pending => DeferredState::Pending,
            Outcome::Fulfilled(_) => DeferredState::Fulfilled,
            Outcome::Rejected(_) => DeferredState::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(DeferredState::Pending.is_pending());
        assert!(!DeferredState::Pending.is_settled());
        assert!(DeferredState::Fulfilled.is_settled());
        assert!(DeferredState::Rejected.is_settled());
        assert_eq!(DeferredState::Rejected.to_string(), "rejected");
    }

    #[test]
    fn test_outcome_maps_to_state() {
        let pending: Outcome<u8, ()> = Outcome::Pending;
        let fulfilled: Outcome<u8, ()> = Outcome::Fulfilled(Rc::new(1));
        let rejected: Outcome<u8, ()> = Outcome::Rejected(Rc::new(()));
        assert_eq!(pending.state(), DeferredState::Pending);
        assert_eq!(fulfilled.state(), DeferredState::Fulfilled);
        assert_eq!(rejected.state(), DeferredState::Rejected);
    }
}
