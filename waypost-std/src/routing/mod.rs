//! # URL Routing
//!
//! This module provides the method + path router:
//!
//! - [`Route`]: one method/template/action binding with its compiled pattern.
//! - [`Router`]: routes bucketed by static prefix, resolving requests to a
//!   [`Resolution`].
//! - [`FsStaticFiles`]: the filesystem check that lets concrete files answer a
//!   request before any route is consulted.
//!
//! # Template Syntax
//!
//! | Template          | Matches          | Params            |
//! |-------------------|------------------|-------------------|
//! | `/about`          | `/about` only    | none              |
//! | `/users/{id}`     | `/users/42`      | `id = "42"`       |
//! | `/items/{id:\d+}` | `/items/7`       | `id = "7"`        |
//! | `/y/{\d{4}}`      | `/y/2024`        | `param0 = "2024"` |
//!
//! Parameter extraction depends on the router's [`MatchPolicy`].

pub mod route;
pub mod router;
pub mod static_files;
pub mod template;

pub use route::{Params, Route};
pub use router::{MatchPolicy, Resolution, Router};
pub use static_files::{DEFAULT_INDEX_FILE, FsStaticFiles};
pub use template::static_prefix;
