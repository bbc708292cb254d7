//! # Named Events
//!
//! A synchronous publish/subscribe registry:
//!
//! - [`EventBus`]: subscriptions, fan-out and publisher bookkeeping.
//! - [`Callback`] and [`CallbackTable`]: listeners with stable names, the
//!   only kind a [`Snapshot`] can persist.
//! - [`global`]: an explicit process-wide bus for code that cannot be handed
//!   one.
//!
//! # Failure Isolation
//!
//! Listeners run one after another on the publishing thread. An `Err` return
//! or a panic is logged and counted in the returned [`Delivery`]; the
//! remaining listeners still run.

pub mod bus;
pub mod callback;
pub mod global;
pub mod snapshot;

pub use bus::{Delivery, EventBus, ListenerEntry};
pub use callback::{Callback, CallbackFn, CallbackTable, NamedCallback, is_valid_name};
pub use global::{global, install_global, reset_global};
pub use snapshot::{Snapshot, SnapshotEntry, SnapshotError};
