//! A single-settlement deferred value.
//!
//! A [`Deferred`] starts out pending and settles exactly once, either fulfilled
//! with a value or rejected with an error. Observers can attach at any point:
//! those registered while pending are queued and drained in registration order
//! on settlement, those registered afterwards run immediately.

pub mod deferred;
pub mod observer;
pub mod resolver;
pub mod state;
pub mod wait;

pub use deferred::Deferred;
pub use observer::panic_message;
pub use resolver::Resolver;
pub use state::DeferredState;
pub use wait::Wait;
