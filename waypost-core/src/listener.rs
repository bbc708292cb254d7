//! # Listener
//!
//! A Listener is a callback subscribed to a named event. It receives the event
//! name and a type-erased payload, and reports success or failure.
//!
//! The event bus never looks at what a listener returns beyond success or
//! failure, and failures are isolated: one broken listener never stops the
//! others from running.
//!
//! Closures and plain functions are listeners as long as they take
//! `(&str, &Payload)` and return `()` or `Result<(), E>`:
//!
//! ```rust,ignore
//! bus.on("user.created", |event: &str, payload: &Payload| {
//!     if let Some(id) = payload.downcast_ref::<u64>() {
//!         println!("{event}: {id}");
//!     }
//! }, None);
//! ```

use crate::error::BoxError;
use std::any::Any;

/// The type-erased payload passed to listeners.
///
/// Listeners recover the concrete type with [`Any::downcast_ref`].
pub type Payload = dyn Any + Send + Sync;

/// A callback subscribed to a named event.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Listener`",
    label = "missing `Listener` implementation",
    note = "Listeners are `Fn(&str, &Payload)` closures returning `()` or `Result<(), E>`, or types implementing `on_event`."
)]
pub trait Listener: Send + Sync + 'static {
    /// Called when an event this listener is subscribed to is triggered.
    fn on_event(&self, event: &str, payload: &Payload) -> Result<(), BoxError>;
}

impl<F, R> Listener for F
where
    F: Fn(&str, &Payload) -> R + Send + Sync + 'static,
    R: IntoListenerResult,
{
    fn on_event(&self, event: &str, payload: &Payload) -> Result<(), BoxError> {
        (self)(event, payload).into_listener_result()
    }
}

/// Conversion of a listener's return value into success or failure.
///
/// # Default Implementations
///
/// - `()` → success
/// - `Result<(), E>` → `E` converted into a [`BoxError`]
pub trait IntoListenerResult {
    /// Convert the output into success or a boxed error.
    fn into_listener_result(self) -> Result<(), BoxError>;
}

impl IntoListenerResult for () {
    fn into_listener_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> IntoListenerResult for Result<(), E>
where
    E: Into<BoxError>,
{
    fn into_listener_result(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    struct Doubler {
        total: Arc<AtomicUsize>,
    }

    impl Listener for Doubler {
        fn on_event(&self, _event: &str, payload: &Payload) -> Result<(), BoxError> {
            let value = payload
                .downcast_ref::<usize>()
                .ok_or("expected a usize payload")?;
            self.total.fetch_add(value * 2, Ordering::SeqCst);
            Ok(())
        }
    }

    fn as_listener<L: Listener>(listener: L) -> Box<dyn Listener> {
        Box::new(listener)
    }

    #[test]
    fn test_closure_returning_unit() {
        let listener = as_listener(|_event: &str, _payload: &Payload| {});
        assert!(listener.on_event("tick", &1u8).is_ok());
    }

    #[test]
    fn test_closure_returning_error() {
        let listener = as_listener(|event: &str, _payload: &Payload| -> Result<(), BoxError> {
            Err(format!("cannot handle {event}").into())
        });
        let err = listener.on_event("tick", &()).unwrap_err();
        assert_eq!(err.to_string(), "cannot handle tick");
    }

    #[test]
    fn test_struct_listener_downcasts_payload() {
        let total = Arc::new(AtomicUsize::new(0));
        let listener = as_listener(Doubler {
            total: total.clone(),
        });

        listener.on_event("add", &21usize).unwrap();
        assert_eq!(total.load(Ordering::SeqCst), 42);

        assert!(listener.on_event("add", &"not a number").is_err());
    }
}
