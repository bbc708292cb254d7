#![allow(dead_code)]

use std::fs;
use waypost::{BoxError, CallbackTable, MatchPolicy, NoStaticFiles, Payload, Router};

// ============================================================================
// Routers
// ============================================================================

/// A router that never consults the filesystem.
pub fn router(policy: MatchPolicy) -> Router<&'static str> {
    Router::new(".", "not_found")
        .with_policy(policy)
        .with_static_files(NoStaticFiles)
}

/// A public directory with a file, a documented subdirectory and an empty
/// one.
pub fn public_dir() -> tempfile::TempDir {
    let root = tempfile::tempdir().expect("create temp dir");
    fs::write(root.path().join("robots.txt"), "User-agent: *").expect("write robots.txt");
    fs::create_dir(root.path().join("docs")).expect("create docs");
    fs::write(root.path().join("docs").join("index.html"), "<h1>docs</h1>")
        .expect("write docs index");
    root
}

// ============================================================================
// Callbacks
// ============================================================================

pub fn audit(_event: &str, _payload: &Payload) -> Result<(), BoxError> {
    Ok(())
}

pub fn notify(_event: &str, _payload: &Payload) -> Result<(), BoxError> {
    Ok(())
}

/// A table knowing `audit::record` and `mail::notify`.
pub fn callback_table() -> CallbackTable {
    let mut table = CallbackTable::new();
    table
        .register("audit::record", audit)
        .and_then(|table| table.register("mail::notify", notify))
        .expect("register callbacks");
    table
}
