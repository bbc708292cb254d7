//! # waypost - Method + Path Routing and Named Events
//!
//! `waypost` maps `(method, path)` pairs to caller-chosen actions and carries
//! a small synchronous event bus alongside.
//!
//! ## Routing
//!
//! ```rust,ignore
//! use waypost::prelude::*;
//!
//! let mut router = Router::new("public", "not_found");
//! router.get("/users/{id:\\d+}", "show_user").named("user");
//! router.add_route(["GET", "POST"], "/login", "login");
//!
//! match router.route("GET", "/login") {
//!     Resolution::Matched { route, params } => { /* run route.action() */ }
//!     Resolution::Static(target) => { /* serve target.path() */ }
//!     Resolution::NotFound(fallback) => { /* run fallback */ }
//! }
//! ```
//!
//! ## Events
//!
//! ```rust,ignore
//! use waypost::prelude::*;
//!
//! let bus = EventBus::new();
//! bus.on("user.created", |_: &str, payload: &Payload| {
//!     let id = payload.downcast_ref::<u64>();
//! }, None);
//! bus.trigger("user.created", &42u64, None);
//! ```
//!
//! ## Features
//!
//! - `tracing` (default): log registration, dispatch and listener failures.
//! - `inventory`: collect `#[callback]` functions into a `CallbackTable`.
//! - `macros`: the `#[callback]` attribute (implies `inventory`).

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use waypost_core::{
    // Error types
    BoxError,
    CallbackError,
    // Listener
    IntoListenerResult,
    Listener,
    ListenerError,
    // Methods
    MethodSet,
    Methods,
    NoStaticFiles,
    Payload,
    RouteError,
    // Static files
    StaticFiles,
    StaticTarget,
};

// Routing
pub use waypost_std::routing::{
    FsStaticFiles, MatchPolicy, Params, Resolution, Route, Router,
};

// Events
pub use waypost_std::events::{
    Callback, CallbackTable, Delivery, EventBus, ListenerEntry, SnapshotError, global,
    install_global, reset_global,
};

// Configuration and errors
pub use waypost_std::{
    config::{Config, ConfigError, EventsConfig, RouterConfig, load_config},
    error::WaypostError,
};

/// Routing support module.
pub mod routing {
    pub use waypost_std::routing::{
        DEFAULT_INDEX_FILE, FsStaticFiles, MatchPolicy, Params, Resolution, Route, Router,
        static_prefix, template,
    };
}

/// Event bus support module.
pub mod events {
    #![allow(clippy::wildcard_imports)]
    pub use waypost_std::events::*;
}

/// Configuration loading.
pub mod config {
    #![allow(clippy::wildcard_imports)]
    pub use waypost_std::config::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use waypost_std::testing::*;
}

/// Prelude module - common imports for waypost.
///
/// # Usage
///
/// ```rust,ignore
/// use waypost::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BoxError,
        // Events
        Callback,
        CallbackTable,
        Delivery,
        EventBus,
        Listener,
        // Routing
        MatchPolicy,
        MethodSet,
        Params,
        Payload,
        Resolution,
        Route,
        Router,
        StaticTarget,
    };
}

#[cfg(feature = "macros")]
pub use waypost_macros::callback;

#[cfg(feature = "inventory")]
pub use inventory;
