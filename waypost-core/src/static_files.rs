//! Static-file short-circuit.
//!
//! Before matching routes, a router asks its [`StaticFiles`] collaborator
//! whether a concrete file answers the static prefix of the request path. If
//! one does, route matching is bypassed and the host serves the target
//! itself; the router only reports what was found.

use std::path::PathBuf;

/// A concrete filesystem target answering a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticTarget {
    /// A regular file, served or executed directly.
    File(PathBuf),
    /// A directory other than the front controller's own; the host delegates
    /// to its index file.
    Directory {
        /// The resolved directory.
        dir: PathBuf,
        /// The index file inside `dir`.
        index: PathBuf,
    },
}

impl StaticTarget {
    /// The path the host should hand the request to.
    pub fn path(&self) -> &PathBuf {
        match self {
            StaticTarget::File(path) => path,
            StaticTarget::Directory { index, .. } => index,
        }
    }
}

/// Resolves a request's static prefix to a file on disk.
pub trait StaticFiles: Send + Sync {
    /// Returns the target answering `static_prefix`, if any.
    fn resolve(&self, static_prefix: &str) -> Option<StaticTarget>;
}

/// A resolver that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStaticFiles;

impl StaticFiles for NoStaticFiles {
    fn resolve(&self, _static_prefix: &str) -> Option<StaticTarget> {
        None
    }
}
