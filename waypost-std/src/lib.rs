//! # waypost-std
//!
//! Standard implementations for the waypost router and event bus.
//!
//! This crate provides:
//! - **Routing**: [`Router`](routing::Router), [`Route`](routing::Route),
//!   filesystem static files
//! - **Events**: [`EventBus`](events::EventBus), callback tables, snapshots,
//!   the process-wide bus
//! - **Configuration**: TOML loading via [`config::load_config`]
//! - **Testing**: listeners for asserting on delivery

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use waypost_core;

// Modules
pub mod config;
pub mod error;
pub mod events;
pub mod routing;
pub mod testing;

#[cfg(feature = "inventory")]
pub use inventory;
