//! # waypost-core
//!
//! Core types and traits for the waypost router and event bus.
//!
//! This crate has minimal dependencies and is meant to be imported by code
//! that only needs to describe routes or write listeners, without pulling in
//! the full `waypost-std` implementation.
//!
//! # Contents
//!
//! - [`MethodSet`] / [`Methods`]: the normalized set of HTTP methods a route
//!   accepts, including the `ANY` wildcard.
//! - [`Listener`]: a callback subscribed to a named event. Plain closures and
//!   functions of the shape `fn(&str, &Payload) -> R` are listeners.
//! - [`StaticFiles`] / [`StaticTarget`]: the collaborator a router asks before
//!   matching, so that concrete files on disk can answer a request directly.
//!
//! # Error Types
//!
//! - [`RouteError`] - Route template and reverse lookup errors
//! - [`CallbackError`] - Callback naming errors
//! - [`ListenerError`] - A single listener invocation that failed

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod listener;
mod method;
mod static_files;

// Re-exports
pub use error::{BoxError, CallbackError, ListenerError, RouteError};
pub use listener::{IntoListenerResult, Listener, Payload};
pub use method::{MethodSet, Methods};
pub use static_files::{NoStaticFiles, StaticFiles, StaticTarget};
