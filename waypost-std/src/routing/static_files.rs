//! Filesystem-backed static-file resolution.

use std::{
    fs,
    path::{Component, Path, PathBuf},
};
use waypost_core::{StaticFiles, StaticTarget};

/// Index file used when a request resolves to a directory.
pub const DEFAULT_INDEX_FILE: &str = "index.html";

/// Resolves static prefixes against a directory on disk.
///
/// A prefix naming a regular file under `base_path` resolves to that file. A
/// prefix naming a directory resolves to its index file, unless the directory
/// is the front controller's own (`script_dir`, which defaults to
/// `base_path`), in which case routing proceeds as usual. Prefixes that climb
/// out of `base_path`, through `..` or a symlink, never resolve.
#[derive(Debug, Clone)]
pub struct FsStaticFiles {
    base_path: PathBuf,
    index_file: String,
    script_dir: Option<PathBuf>,
}

impl FsStaticFiles {
    /// Create a resolver rooted at `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            index_file: DEFAULT_INDEX_FILE.to_owned(),
            script_dir: None,
        }
    }

    /// Set the index file name used for directories.
    pub fn with_index_file(mut self, index_file: impl Into<String>) -> Self {
        self.index_file = index_file.into();
        self
    }

    /// Set the directory the front controller runs from.
    pub fn with_script_dir(mut self, script_dir: impl Into<PathBuf>) -> Self {
        self.script_dir = Some(script_dir.into());
        self
    }

    /// The root directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn contains(&self, path: &Path) -> bool {
        match (self.base_path.canonicalize(), path.canonicalize()) {
            (Ok(root), Ok(resolved)) => resolved.starts_with(root),
            _ => false,
        }
    }

    fn is_script_dir(&self, dir: &Path) -> bool {
        let script_dir = self.script_dir.as_deref().unwrap_or(&self.base_path);
        match (script_dir.canonicalize(), dir.canonicalize()) {
            (Ok(current), Ok(requested)) => current == requested,
            _ => false,
        }
    }
}

impl StaticFiles for FsStaticFiles {
    fn resolve(&self, static_prefix: &str) -> Option<StaticTarget> {
        let relative = Path::new(static_prefix.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }

        let full = self.base_path.join(relative);
        let metadata = fs::metadata(&full).ok()?;
        if !self.contains(&full) {
            return None;
        }
        if metadata.is_file() {
            return Some(StaticTarget::File(full));
        }
        if metadata.is_dir() && !self.is_script_dir(&full) {
            return Some(StaticTarget::Directory {
                index: full.join(&self.index_file),
                dir: full,
            });
        }
        None
    }
}
