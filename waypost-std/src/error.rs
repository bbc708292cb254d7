//! The umbrella error for applications that use several waypost components.

use crate::{config::ConfigError, events::SnapshotError};
use thiserror::Error;
use waypost_core::{CallbackError, RouteError};

/// Any error produced by waypost.
#[derive(Error, Debug)]
pub enum WaypostError {
    /// Route template or reverse lookup error.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// Callback naming error.
    #[error(transparent)]
    Callback(#[from] CallbackError),

    /// Snapshot save or load error.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
