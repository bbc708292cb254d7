//! The process-wide event bus.
//!
//! Components that cannot be handed a bus explicitly share this one. Tests
//! that touch it should call [`reset_global`] and run serially.

use super::bus::EventBus;
use parking_lot::RwLock;
use std::sync::Arc;

static GLOBAL: RwLock<Option<Arc<EventBus>>> = parking_lot::const_rwlock(None);

/// The shared bus, created on first use.
pub fn global() -> Arc<EventBus> {
    if let Some(bus) = GLOBAL.read().as_ref() {
        return Arc::clone(bus);
    }
    Arc::clone(GLOBAL.write().get_or_insert_with(Default::default))
}

/// Replace the shared bus, returning the previous one.
pub fn install_global(bus: EventBus) -> Option<Arc<EventBus>> {
    GLOBAL.write().replace(Arc::new(bus))
}

/// Drop the shared bus. The next [`global`] call creates a fresh one.
///
/// Handles obtained earlier keep the old bus alive.
pub fn reset_global() {
    GLOBAL.write().take();
}
