pub mod deferred;

pub use deferred::{DeferredAction, SessionEvent};
