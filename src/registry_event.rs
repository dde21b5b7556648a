use std::fmt;
use std::sync::{Arc, Mutex};

/// Which of a registry's two tables an operation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Products built fresh on every request.
    Transient,
    /// One process-wide instance handed out to every caller.
    Shared,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Transient => write!(f, "transient"),
            Slot::Shared => write!(f, "shared"),
        }
    }
}

/// Events emitted by a registry during operations.
///
/// These events are passed to the tracing callback set via
/// [`Registry::set_trace_callback`](crate::Registry::set_trace_callback).
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use product_registry::{RegistryEvent, Slot};
///
/// let event = RegistryEvent::Get {
///     id: "Derived".to_string(),
///     slot: Slot::Transient,
///     found: false,
/// };
/// assert_eq!(event.to_string(), "get { id: Derived, slot: transient, found: false }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A registrar tried to claim an identifier.
    Register {
        id: String,
        slot: Slot,
        /// `false` when the identifier was already taken (or empty).
        accepted: bool,
    },

    /// An owning registrar released its identifier.
    Unregister {
        id: String,
        slot: Slot,
        /// `false` when there was nothing to remove.
        found: bool,
    },

    /// A product was requested.
    Get { id: String, slot: Slot, found: bool },
}

impl fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryEvent::Register { id, slot, accepted } => {
                write!(f, "register {{ id: {id}, slot: {slot}, accepted: {accepted} }}")
            }
            RegistryEvent::Unregister { id, slot, found } => {
                write!(f, "unregister {{ id: {id}, slot: {slot}, found: {found} }}")
            }
            RegistryEvent::Get { id, slot, found } => {
                write!(f, "get {{ id: {id}, slot: {slot}, found: {found} }}")
            }
        }
    }
}

/// Type alias for the user-supplied tracing callback.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

/// Optional trace callback shared by both tables of one registry.
///
/// Lock poisoning is recovered everywhere: tracing is advisory and the stored
/// value is replaced wholesale, never left half-written.
#[derive(Default)]
pub(crate) struct TraceHook {
    callback: Mutex<Option<Arc<TraceCallback>>>,
}

impl TraceHook {
    pub(crate) fn set(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        let mut guard = self.callback.lock().unwrap_or_else(|p| p.into_inner());
        *guard = Some(Arc::new(callback));
    }

    pub(crate) fn clear(&self) {
        let mut guard = self.callback.lock().unwrap_or_else(|p| p.into_inner());
        *guard = None;
    }

    /// Invokes the callback, if any, without holding the hook lock.
    pub(crate) fn emit(&self, event: impl FnOnce() -> RegistryEvent) {
        let callback = self
            .callback
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();

        if let Some(callback) = callback {
            callback(&event());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_event_display() {
        let event = RegistryEvent::Register {
            id: "Derived".to_string(),
            slot: Slot::Transient,
            accepted: true,
        };
        assert_eq!(
            event.to_string(),
            "register { id: Derived, slot: transient, accepted: true }"
        );

        let event = RegistryEvent::Unregister {
            id: "Single".to_string(),
            slot: Slot::Shared,
            found: false,
        };
        assert_eq!(
            event.to_string(),
            "unregister { id: Single, slot: shared, found: false }"
        );

        let event = RegistryEvent::Get {
            id: "WithArgs".to_string(),
            slot: Slot::Transient,
            found: true,
        };
        assert_eq!(
            event.to_string(),
            "get { id: WithArgs, slot: transient, found: true }"
        );
    }

    #[test]
    fn test_trace_hook_set_emit_clear() {
        let hook = TraceHook::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        // No callback: the event closure must not even run.
        hook.emit(|| panic!("event built without a callback"));

        hook.set(move |e| seen_clone.lock().unwrap().push(e.to_string()));
        hook.emit(|| RegistryEvent::Get {
            id: "a".to_string(),
            slot: Slot::Shared,
            found: true,
        });

        hook.clear();
        hook.emit(|| RegistryEvent::Get {
            id: "b".to_string(),
            slot: Slot::Shared,
            found: true,
        });

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec!["get { id: a, slot: shared, found: true }"]);
    }

    #[test]
    fn test_callback_may_reenter_hook() {
        // The hook lock is released before the callback runs.
        let hook = Arc::new(TraceHook::default());
        let inner = hook.clone();
        hook.set(move |_| inner.clear());

        hook.emit(|| RegistryEvent::Get {
            id: "x".to_string(),
            slot: Slot::Transient,
            found: false,
        });
    }
}
