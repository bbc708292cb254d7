//! Persisting the listener registry.
//!
//! A snapshot stores callback names, never code. Loading resolves every name
//! through a [`CallbackTable`] built by the running program.

use super::{
    bus::{EventBus, ListenerEntry},
    callback::CallbackTable,
};
use crate::config::EventsConfig;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, io, path::Path};
use thiserror::Error;

/// Errors that can occur when saving or loading a snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The snapshot file could not be read or written.
    #[error("snapshot I/O error: {0}")]
    Io(#[from] io::Error),

    /// The registry could not be serialized.
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    /// The file is not a valid snapshot.
    #[error("failed to decode snapshot: {0}")]
    Decode(#[source] serde_json::Error),

    /// A listener of `event` has no name and cannot be persisted.
    #[error("listener of event `{event}` is anonymous and cannot be saved")]
    Anonymous {
        /// The event the listener is subscribed to.
        event: String,
    },

    /// The snapshot names a callback the program does not know.
    #[error("unknown callback `{name}` for event `{event}`")]
    UnknownCallback {
        /// The event the callback was subscribed to.
        event: String,
        /// The unresolved name.
        name: String,
    },

    /// The snapshot was written by an incompatible format version.
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}

/// One persisted subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Callback name.
    pub callback: String,
    /// Subscription site label.
    pub source: String,
}

/// The on-disk form of an event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version.
    pub version: u32,
    /// Subscriptions by event, in order.
    #[serde(default)]
    pub listeners: BTreeMap<String, Vec<SnapshotEntry>>,
    /// First publisher of each event.
    #[serde(default)]
    pub publishers: BTreeMap<String, String>,
}

impl Snapshot {
    /// The format version written by this crate.
    pub const VERSION: u32 = 1;

    /// Capture the registry of `bus`.
    ///
    /// Fails if any subscribed callback is anonymous.
    pub fn capture(bus: &EventBus) -> Result<Self, SnapshotError> {
        let mut listeners = BTreeMap::new();
        for (event, entries) in bus.listeners() {
            let saved = entries
                .iter()
                .map(|entry| {
                    let name = entry.callback().name().ok_or_else(|| SnapshotError::Anonymous {
                        event: event.clone(),
                    });
                    name.map(|name| SnapshotEntry {
                        callback: name.to_owned(),
                        source: entry.source().to_owned(),
                    })
                })
                .collect::<Result<Vec<_>, SnapshotError>>()?;
            listeners.insert(event, saved);
        }
        Ok(Self {
            version: Self::VERSION,
            listeners,
            publishers: bus.publishers(),
        })
    }

    /// Replace the listeners and publishers of `bus` with this snapshot.
    ///
    /// Every name is resolved before the bus is touched, so a failed apply
    /// leaves it unchanged. Advertised events are kept.
    pub fn apply(&self, bus: &EventBus, table: &CallbackTable) -> Result<(), SnapshotError> {
        if self.version != Self::VERSION {
            return Err(SnapshotError::UnsupportedVersion(self.version));
        }

        let mut listeners = BTreeMap::new();
        for (event, entries) in &self.listeners {
            let resolved = entries
                .iter()
                .map(|entry| {
                    let callback = table.get(&entry.callback).ok_or_else(|| {
                        SnapshotError::UnknownCallback {
                            event: event.clone(),
                            name: entry.callback.clone(),
                        }
                    });
                    callback.map(|callback| ListenerEntry::new(callback.clone(), entry.source.clone()))
                })
                .collect::<Result<Vec<_>, SnapshotError>>()?;
            listeners.insert(event.clone(), resolved);
        }

        bus.replace(listeners, self.publishers.clone());
        Ok(())
    }

    /// Read a snapshot file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(SnapshotError::Decode)
    }

    /// Write the snapshot to `path`, creating parent directories.
    ///
    /// The file is written next to its destination and renamed into place.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self).map_err(SnapshotError::Encode)?;
        let staging = path.with_extension("tmp");
        fs::write(&staging, contents)?;
        if let Err(err) = fs::rename(&staging, path) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }
        Ok(())
    }
}

impl EventBus {
    /// Save the listener and publisher registries to `path`.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let snapshot = Snapshot::capture(self)?;
        snapshot.write(path)?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            path = %path.display(),
            events = snapshot.listeners.len(),
            "saved event snapshot"
        );
        Ok(())
    }

    /// Replace the listener and publisher registries with the snapshot at
    /// `path`, resolving callback names through `table`.
    pub fn load_snapshot(
        &self,
        path: impl AsRef<Path>,
        table: &CallbackTable,
    ) -> Result<(), SnapshotError> {
        let path = path.as_ref();
        let snapshot = Snapshot::read(path)?;
        snapshot.apply(self, table)?;

        #[cfg(feature = "tracing")]
        tracing::info!(
            path = %path.display(),
            events = snapshot.listeners.len(),
            "loaded event snapshot"
        );
        Ok(())
    }

    /// Create a bus, loading the configured snapshot if the file exists.
    pub fn from_config(config: &EventsConfig, table: &CallbackTable) -> Result<Self, SnapshotError> {
        let bus = Self::new();
        if let Some(path) = &config.snapshot_path {
            if path.is_file() {
                bus.load_snapshot(path, table)?;
            }
        }
        Ok(bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Callback;
    use waypost_core::{BoxError, Payload};

    fn audit(_event: &str, _payload: &Payload) -> Result<(), BoxError> {
        Ok(())
    }

    fn table() -> CallbackTable {
        let mut table = CallbackTable::new();
        table.register("audit::record", audit).unwrap();
        table
    }

    #[test]
    fn test_capture_rejects_anonymous_listeners() {
        let bus = EventBus::new();
        bus.on("order.placed", audit, None);

        let err = Snapshot::capture(&bus).unwrap_err();
        assert!(matches!(err, SnapshotError::Anonymous { event } if event == "order.placed"));
    }

    #[test]
    fn test_apply_unknown_callback_leaves_bus_untouched() {
        let bus = EventBus::new();
        let table = table();
        bus.on_callback("keep", table.get("audit::record").unwrap().clone(), Some("main"));

        let snapshot = Snapshot {
            version: Snapshot::VERSION,
            listeners: BTreeMap::from([(
                "x".to_owned(),
                vec![SnapshotEntry {
                    callback: "mail::send".into(),
                    source: "main".into(),
                }],
            )]),
            publishers: BTreeMap::new(),
        };

        let err = snapshot.apply(&bus, &table).unwrap_err();
        assert!(matches!(err, SnapshotError::UnknownCallback { name, .. } if name == "mail::send"));
        assert_eq!(bus.listeners_for("keep").len(), 1);
    }

    #[test]
    fn test_apply_rejects_other_versions() {
        let snapshot = Snapshot {
            version: 7,
            listeners: BTreeMap::new(),
            publishers: BTreeMap::new(),
        };
        let err = snapshot.apply(&EventBus::new(), &table()).unwrap_err();
        assert!(matches!(err, SnapshotError::UnsupportedVersion(7)));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("events.json");
        let table = table();
        let callback = table.get("audit::record").unwrap().clone();

        let bus = EventBus::new();
        bus.on_callback("order.placed", callback.clone(), Some("orders"));
        bus.on_callback("order.placed", callback, Some("billing"));
        bus.trigger("order.placed", &(), Some("checkout"));
        bus.save_snapshot(&path).unwrap();

        let restored = EventBus::new();
        restored.load_snapshot(&path, &table).unwrap();

        let sources: Vec<_> = restored
            .listeners_for("order.placed")
            .iter()
            .map(|entry| entry.source().to_owned())
            .collect();
        assert_eq!(sources, ["orders", "billing"]);
        assert_eq!(restored.publishers(), bus.publishers());
    }

    #[test]
    fn test_failed_write_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        fs::create_dir(&path).unwrap();

        let err = Snapshot::capture(&EventBus::new())
            .unwrap()
            .write(&path)
            .unwrap_err();
        assert!(matches!(err, SnapshotError::Io(_)));
        assert!(!dir.path().join("events.tmp").exists());
    }

    #[test]
    fn test_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Snapshot::read(&path),
            Err(SnapshotError::Decode(_))
        ));
    }

    #[test]
    fn test_named_callback_survives_as_same_name() {
        let table = table();
        let bus = EventBus::new();
        bus.on_callback("x", Callback::named("audit::record", audit).unwrap(), Some("s"));

        let snapshot = Snapshot::capture(&bus).unwrap();
        assert_eq!(snapshot.listeners["x"][0].callback, "audit::record");

        let restored = EventBus::new();
        snapshot.apply(&restored, &table).unwrap();
        assert_eq!(
            restored.listeners_for("x")[0].callback().name(),
            Some("audit::record")
        );
    }
}
