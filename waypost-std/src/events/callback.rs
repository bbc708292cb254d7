//! Callbacks and the name lookup table used to reload snapshots.
//!
//! A snapshot can only refer to a listener by name, so only named callbacks
//! survive a save/load round trip. Names are `::`-separated identifier paths
//! such as `audit::record`.

use std::{collections::BTreeMap, fmt, sync::Arc};
use waypost_core::{BoxError, CallbackError, Listener, Payload};

/// A function listener, the form collected from `#[callback]` functions.
pub type CallbackFn = fn(&str, &Payload) -> Result<(), BoxError>;

/// A shared listener with an optional name.
#[derive(Clone)]
pub struct Callback {
    name: Option<Arc<str>>,
    listener: Arc<dyn Listener>,
}

impl Callback {
    /// Wrap a listener that cannot be written to a snapshot.
    pub fn anonymous(listener: impl Listener) -> Self {
        Self {
            name: None,
            listener: Arc::new(listener),
        }
    }

    /// Wrap a listener under a validated name.
    pub fn named(name: &str, listener: impl Listener) -> Result<Self, CallbackError> {
        if !is_valid_name(name) {
            return Err(CallbackError::InvalidName(name.to_owned()));
        }
        Ok(Self {
            name: Some(Arc::from(name)),
            listener: Arc::new(listener),
        })
    }

    /// The callback name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether both callbacks share the same listener instance.
    pub fn ptr_eq(&self, other: &Callback) -> bool {
        Arc::ptr_eq(&self.listener, &other.listener)
    }

    /// Invoke the listener.
    pub fn invoke(&self, event: &str, payload: &Payload) -> Result<(), BoxError> {
        self.listener.on_event(event, payload)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Callback({name})"),
            None => f.write_str("Callback(<anonymous>)"),
        }
    }
}

/// Whether `name` is a `::`-separated path of identifiers.
///
/// Identifiers start with a letter, `_` or a non-ASCII character, followed by
/// letters, digits, `_` or non-ASCII characters.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.split("::").all(is_identifier)
}

fn is_identifier(part: &str) -> bool {
    let starts = |c: char| c == '_' || c.is_ascii_alphabetic() || !c.is_ascii();
    let mut chars = part.chars();
    match chars.next() {
        Some(first) if starts(first) => chars.all(|c| starts(c) || c.is_ascii_digit()),
        _ => false,
    }
}

/// A function listener registered at compile time.
///
/// Emitted by the `#[callback]` attribute and gathered by
/// [`CallbackTable::collected`] when the `inventory` feature is enabled.
#[derive(Debug, Clone, Copy)]
pub struct NamedCallback {
    name: &'static str,
    func: CallbackFn,
}

impl NamedCallback {
    /// Create a registration entry.
    pub const fn new(name: &'static str, func: CallbackFn) -> Self {
        Self { name, func }
    }

    /// The registered name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The function.
    pub fn func(&self) -> CallbackFn {
        self.func
    }
}

#[cfg(feature = "inventory")]
inventory::collect!(NamedCallback);

/// Maps callback names to listeners.
///
/// Built once at startup and consulted when loading a snapshot, so that names
/// read from disk resolve to real functions without executing any code from
/// the file.
#[derive(Debug, Clone, Default)]
pub struct CallbackTable {
    entries: BTreeMap<String, Callback>,
}

impl CallbackTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` under `name`.
    pub fn register(
        &mut self,
        name: &str,
        listener: impl Listener,
    ) -> Result<&mut Self, CallbackError> {
        if self.entries.contains_key(name) {
            return Err(CallbackError::Duplicate(name.to_owned()));
        }
        let callback = Callback::named(name, listener)?;
        self.entries.insert(name.to_owned(), callback);
        Ok(self)
    }

    /// Register compile-time entries.
    pub fn extend_from(&mut self, entries: &[NamedCallback]) -> Result<&mut Self, CallbackError> {
        for entry in entries {
            self.register(entry.name(), entry.func())?;
        }
        Ok(self)
    }

    /// Build a table from every `#[callback]` function linked into the binary.
    #[cfg(feature = "inventory")]
    pub fn collected() -> Result<Self, CallbackError> {
        let mut table = Self::new();
        for entry in inventory::iter::<NamedCallback> {
            table.register(entry.name(), entry.func())?;
        }
        Ok(table)
    }

    /// The callback registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Callback> {
        self.entries.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_event: &str, _payload: &Payload) -> Result<(), BoxError> {
        Ok(())
    }

    #[test]
    fn test_name_validation() {
        assert!(is_valid_name("record"));
        assert!(is_valid_name("audit::record"));
        assert!(is_valid_name("_private::Type::método"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("audit::"));
        assert!(!is_valid_name("9lives"));
        assert!(!is_valid_name("audit.record"));
        assert!(!is_valid_name("a:b"));
    }

    #[test]
    fn test_named_callback_rejects_bad_name() {
        let err = Callback::named("not a name", noop).unwrap_err();
        assert_eq!(err, CallbackError::InvalidName("not a name".into()));
    }

    #[test]
    fn test_table_register_and_lookup() {
        let mut table = CallbackTable::new();
        table.register("audit::record", noop).unwrap();
        table.register("mail::send", |_: &str, _: &Payload| {}).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.names().collect::<Vec<_>>(), ["audit::record", "mail::send"]);
        assert_eq!(table.get("audit::record").and_then(Callback::name), Some("audit::record"));
        assert!(table.get("missing").is_none());
    }

    #[test]
    fn test_table_rejects_duplicates() {
        let mut table = CallbackTable::new();
        table.register("audit::record", noop).unwrap();
        let err = table.register("audit::record", noop).unwrap_err();
        assert_eq!(err, CallbackError::Duplicate("audit::record".into()));
    }

    #[test]
    fn test_extend_from_static_entries() {
        const ENTRIES: [NamedCallback; 2] = [
            NamedCallback::new("a::one", noop),
            NamedCallback::new("a::two", noop),
        ];
        let mut table = CallbackTable::new();
        table.extend_from(&ENTRIES).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_clones_share_listener() {
        let callback = Callback::anonymous(noop);
        let clone = callback.clone();
        assert!(callback.ptr_eq(&clone));
        assert!(!callback.ptr_eq(&Callback::anonymous(noop)));
        assert_eq!(format!("{callback:?}"), "Callback(<anonymous>)");
    }
}
