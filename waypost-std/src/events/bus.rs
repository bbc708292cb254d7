//! The event bus and its delivery bookkeeping.

use super::callback::Callback;
use parking_lot::RwLock;
use std::{
    any::Any,
    collections::{BTreeMap, btree_map::Entry},
    panic::{self, AssertUnwindSafe, Location},
};
use waypost_core::{Listener, ListenerError, Payload};

/// A subscribed callback and where it was subscribed from.
#[derive(Debug, Clone)]
pub struct ListenerEntry {
    callback: Callback,
    source: String,
}

impl ListenerEntry {
    /// Create an entry.
    pub fn new(callback: Callback, source: impl Into<String>) -> Self {
        Self {
            callback,
            source: source.into(),
        }
    }

    /// The subscribed callback.
    pub fn callback(&self) -> &Callback {
        &self.callback
    }

    /// The subscription site label.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Summary of one [`EventBus::trigger`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delivery {
    /// Number of listeners invoked.
    pub executed_count: usize,
    /// Number of those that returned an error or panicked.
    pub failed_count: usize,
}

#[derive(Default)]
struct Registry {
    listeners: BTreeMap<String, Vec<ListenerEntry>>,
    publishers: BTreeMap<String, String>,
    advertised: BTreeMap<String, Vec<String>>,
}

/// A registry of named-event listeners with synchronous fan-out.
///
/// Listeners run in subscription order on the thread calling
/// [`trigger`](EventBus::trigger). A listener that returns an error or panics
/// is logged and skipped; the publisher never sees the failure.
///
/// The bus is a plain value: create one and pass it to the components that
/// need it, or use the process-wide instance from [`global`](super::global).
///
/// # Example
///
/// ```rust,ignore
/// let bus = EventBus::new();
/// bus.on("user.created", |_: &str, payload: &Payload| {
///     println!("{:?}", payload.downcast_ref::<u64>());
/// }, None);
/// bus.trigger("user.created", &42u64, Some("signup"));
/// ```
#[derive(Default)]
pub struct EventBus {
    registry: RwLock<Registry>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to `event`.
    ///
    /// Without an explicit `source`, the caller's `file:line` is recorded.
    #[track_caller]
    pub fn on<L: Listener>(&self, event: &str, listener: L, source: Option<&str>) {
        let source = source_label(source, Location::caller());
        self.subscribe(event, Callback::anonymous(listener), source);
    }

    /// Subscribe a prebuilt, possibly named, callback to `event`.
    #[track_caller]
    pub fn on_callback(&self, event: &str, callback: Callback, source: Option<&str>) {
        let source = source_label(source, Location::caller());
        self.subscribe(event, callback, source);
    }

    fn subscribe(&self, event: &str, callback: Callback, source: String) {
        #[cfg(feature = "tracing")]
        tracing::debug!(%event, callback = ?callback, %source, "listener subscribed");

        self.registry
            .write()
            .listeners
            .entry(event.to_owned())
            .or_default()
            .push(ListenerEntry::new(callback, source));
    }

    /// Invoke every listener subscribed to `event` with `payload`.
    ///
    /// The first trigger of an event records `source` (or the caller's
    /// location) as its publisher. Listeners subscribed while the fan-out is
    /// running are not invoked by this call.
    #[track_caller]
    pub fn trigger<P>(&self, event: &str, payload: &P, source: Option<&str>) -> Delivery
    where
        P: Any + Send + Sync,
    {
        let caller = Location::caller();
        let known = self.registry.read().publishers.contains_key(event);
        if !known {
            if let Entry::Vacant(slot) = self.registry.write().publishers.entry(event.to_owned()) {
                let label = source_label(source, caller);
                #[cfg(feature = "tracing")]
                tracing::debug!(%event, publisher = %label, "first publisher recorded");
                slot.insert(label);
            }
        }

        let entries = self
            .registry
            .read()
            .listeners
            .get(event)
            .cloned()
            .unwrap_or_default();

        let payload: &Payload = payload;
        let mut delivery = Delivery::default();
        for entry in &entries {
            delivery.executed_count += 1;
            if let Err(error) = invoke(entry.callback(), event, payload) {
                delivery.failed_count += 1;
                #[cfg(feature = "tracing")]
                tracing::warn!(%event, listener = %entry.source(), %error, "listener failed");
                #[cfg(not(feature = "tracing"))]
                let _ = error; // Suppress unused warnings
            }
        }
        delivery
    }

    /// Advertise that `owner` publishes `event`.
    ///
    /// Purely informational; nothing checks that `owner` ever triggers it.
    pub fn register(&self, owner: &str, event: &str) -> &Self {
        self.registry
            .write()
            .advertised
            .entry(owner.to_owned())
            .or_default()
            .push(event.to_owned());
        self
    }

    /// All advertised events, by owner.
    pub fn registered_events(&self) -> BTreeMap<String, Vec<String>> {
        self.registry.read().advertised.clone()
    }

    /// Events advertised by `owner`.
    pub fn registered_events_for(&self, owner: &str) -> Vec<String> {
        self.registry
            .read()
            .advertised
            .get(owner)
            .cloned()
            .unwrap_or_default()
    }

    /// A snapshot of every subscription, by event name.
    pub fn listeners(&self) -> BTreeMap<String, Vec<ListenerEntry>> {
        self.registry.read().listeners.clone()
    }

    /// A snapshot of the subscriptions for `event`.
    pub fn listeners_for(&self, event: &str) -> Vec<ListenerEntry> {
        self.registry
            .read()
            .listeners
            .get(event)
            .cloned()
            .unwrap_or_default()
    }

    /// A snapshot of the first publisher of each triggered event.
    pub fn publishers(&self) -> BTreeMap<String, String> {
        self.registry.read().publishers.clone()
    }

    /// The first publisher of `event`.
    pub fn publisher(&self, event: &str) -> Option<String> {
        self.registry.read().publishers.get(event).cloned()
    }

    /// Remove every subscription, publisher and advertisement.
    pub fn clear(&self) {
        *self.registry.write() = Registry::default();
    }

    pub(super) fn replace(
        &self,
        listeners: BTreeMap<String, Vec<ListenerEntry>>,
        publishers: BTreeMap<String, String>,
    ) {
        let mut registry = self.registry.write();
        registry.listeners = listeners;
        registry.publishers = publishers;
    }
}

fn source_label(source: Option<&str>, caller: &Location<'_>) -> String {
    match source {
        Some(label) => label.to_owned(),
        None => format!("{}:{}", caller.file(), caller.line()),
    }
}

fn invoke(callback: &Callback, event: &str, payload: &Payload) -> Result<(), ListenerError> {
    match panic::catch_unwind(AssertUnwindSafe(|| callback.invoke(event, payload))) {
        Ok(result) => result.map_err(ListenerError::from),
        Err(panic) => Err(ListenerError::Panic(panic_message(panic.as_ref()))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "listener panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CallLog, CountingListener, FailingListener, PanickingListener};
    use waypost_core::BoxError;

    #[test]
    fn test_listeners_run_in_subscription_order() {
        let bus = EventBus::new();
        let log = CallLog::new();
        bus.on("x", log.listener("first"), None);
        bus.on("x", log.listener("second"), None);
        bus.on("y", log.listener("other"), None);

        let delivery = bus.trigger("x", &(), None);
        assert_eq!(delivery.executed_count, 2);
        assert_eq!(log.entries(), ["first:x", "second:x"]);
    }

    #[test]
    fn test_failures_are_isolated() {
        let bus = EventBus::new();
        let log = CallLog::new();
        bus.on("x", log.listener("one"), None);
        bus.on("x", FailingListener::new("boom"), None);
        bus.on("x", PanickingListener::new("kaboom"), None);
        bus.on("x", log.listener("four"), None);

        let delivery = bus.trigger("x", &(), None);
        assert_eq!(
            delivery,
            Delivery {
                executed_count: 4,
                failed_count: 2
            }
        );
        assert_eq!(log.entries(), ["one:x", "four:x"]);
    }

    #[test]
    fn test_trigger_without_listeners() {
        let bus = EventBus::new();
        assert_eq!(bus.trigger("nobody", &1u32, None), Delivery::default());
        assert!(bus.publisher("nobody").is_some());
    }

    #[test]
    fn test_source_defaults_to_caller_location() {
        let bus = EventBus::new();
        bus.on("x", |_: &str, _: &Payload| {}, None);
        bus.on("x", |_: &str, _: &Payload| {}, Some("billing"));

        let entries = bus.listeners_for("x");
        assert!(entries[0].source().starts_with(file!()), "{}", entries[0].source());
        assert_eq!(entries[1].source(), "billing");
    }

    #[test]
    fn test_first_publisher_wins() {
        let bus = EventBus::new();
        bus.trigger("x", &(), Some("checkout"));
        bus.trigger("x", &(), Some("refunds"));
        assert_eq!(bus.publisher("x").as_deref(), Some("checkout"));
    }

    #[test]
    fn test_listener_may_reenter_bus() {
        let bus = std::sync::Arc::new(EventBus::new());
        let inner = bus.clone();
        bus.on(
            "outer",
            move |_: &str, _: &Payload| -> Result<(), BoxError> {
                inner.on("late", |_: &str, _: &Payload| {}, None);
                inner.trigger("inner", &(), None);
                Ok(())
            },
            None,
        );

        let delivery = bus.trigger("outer", &(), None);
        assert_eq!(delivery.failed_count, 0);
        assert_eq!(bus.listeners_for("late").len(), 1);
        assert!(bus.publisher("inner").is_some());
    }

    #[test]
    fn test_listener_added_during_fan_out_waits_for_next_trigger() {
        let bus = std::sync::Arc::new(EventBus::new());
        let late = CountingListener::new();
        let inner = bus.clone();
        let subscribed = late.clone();
        bus.on(
            "x",
            move |_: &str, _: &Payload| {
                inner.on("x", subscribed.clone(), Some("late"));
            },
            None,
        );

        assert_eq!(bus.trigger("x", &(), None).executed_count, 1);
        assert_eq!(late.count(), 0);

        assert_eq!(bus.trigger("x", &(), None).executed_count, 2);
        assert_eq!(late.count(), 1);
    }

    #[test]
    fn test_advertised_events() {
        let bus = EventBus::new();
        bus.register("Orders", "order.placed")
            .register("Orders", "order.cancelled")
            .register("Users", "user.created");

        assert_eq!(
            bus.registered_events_for("Orders"),
            ["order.placed", "order.cancelled"]
        );
        assert_eq!(bus.registered_events().len(), 2);
        assert!(bus.registered_events_for("Nobody").is_empty());

        bus.clear();
        assert!(bus.registered_events().is_empty());
    }
}
