//! Identifier-keyed table of creation handles.
//!
//! A registry owns two of these, one per [`Slot`]. Every operation takes the
//! table's own mutex for its full duration; handles are cloned out of the map
//! before they are invoked, so product construction never runs under the lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::registry_event::TraceHook;
use crate::{RegistryError, RegistryEvent, Slot};

/// Proof of ownership for one table entry.
///
/// Issued by [`ProductTable::register`] and required by
/// [`ProductTable::unregister`], so a registrar can only ever remove the entry
/// it inserted itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket(u64);

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

impl Ticket {
    fn issue() -> Self {
        Ticket(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
    }
}

struct Entry<H: ?Sized> {
    handle: Arc<H>,
    ticket: Ticket,
}

pub(crate) struct ProductTable<H: ?Sized> {
    slot: Slot,
    product: &'static str,
    entries: Mutex<HashMap<String, Entry<H>>>,
    trace: Arc<TraceHook>,
}

impl<H: ?Sized> ProductTable<H> {
    pub(crate) fn new(slot: Slot, product: &'static str, trace: Arc<TraceHook>) -> Self {
        Self {
            slot,
            product,
            entries: Mutex::new(HashMap::new()),
            trace,
        }
    }

    pub(crate) fn slot(&self) -> Slot {
        self.slot
    }

    // Nothing that can panic runs while the guard is held, so a poisoned map
    // is still consistent.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry<H>>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Inserts `handle` under `id` unless the identifier is empty or taken.
    ///
    /// Returns the ownership ticket on success. On a duplicate the existing
    /// entry is left untouched.
    pub(crate) fn register(&self, id: &str, handle: Arc<H>) -> Option<Ticket> {
        let ticket = if id.is_empty() {
            warn!(
                op = "register",
                slot = %self.slot,
                product = self.product,
                "refusing to register a product under an empty id"
            );
            None
        } else {
            let mut entries = self.entries();
            if entries.contains_key(id) {
                warn!(
                    op = "register",
                    id,
                    slot = %self.slot,
                    product = self.product,
                    "id is already registered, keeping the existing product"
                );
                None
            } else {
                let ticket = Ticket::issue();
                entries.insert(id.to_string(), Entry { handle, ticket });
                debug!(op = "register", id, slot = %self.slot, product = self.product, "registered");
                Some(ticket)
            }
        };

        self.trace.emit(|| RegistryEvent::Register {
            id: id.to_string(),
            slot: self.slot,
            accepted: ticket.is_some(),
        });

        ticket
    }

    /// Removes `id` if it is present and was inserted with `ticket`.
    ///
    /// Anything else is a logged no-op.
    pub(crate) fn unregister(&self, id: &str, ticket: Ticket) {
        let found = {
            let mut entries = self.entries();
            match entries.get(id) {
                Some(entry) if entry.ticket == ticket => {
                    entries.remove(id);
                    true
                }
                Some(_) => {
                    warn!(
                        op = "unregister",
                        id,
                        slot = %self.slot,
                        product = self.product,
                        "id is owned by another registrar, not removing it"
                    );
                    false
                }
                None => {
                    warn!(
                        op = "unregister",
                        id,
                        slot = %self.slot,
                        product = self.product,
                        "id is not registered, nothing to remove"
                    );
                    false
                }
            }
        };

        if found {
            debug!(op = "unregister", id, slot = %self.slot, product = self.product, "unregistered");
        }

        self.trace.emit(|| RegistryEvent::Unregister {
            id: id.to_string(),
            slot: self.slot,
            found,
        });
    }

    /// Clones the handle registered under `id` out of the table.
    pub(crate) fn lookup(&self, id: &str) -> Result<Arc<H>, RegistryError> {
        let handle = self.entries().get(id).map(|e| Arc::clone(&e.handle));

        self.trace.emit(|| RegistryEvent::Get {
            id: id.to_string(),
            slot: self.slot,
            found: handle.is_some(),
        });

        handle.ok_or_else(|| {
            warn!(
                op = "get",
                id,
                slot = %self.slot,
                product = self.product,
                "no product registered for id"
            );
            RegistryError::NotFound {
                id: id.to_string(),
                slot: self.slot,
            }
        })
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.entries().contains_key(id)
    }

    /// Registered identifiers, sorted.
    pub(crate) fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries().keys().cloned().collect();
        ids.sort_unstable();
        ids
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    type Handle = dyn Fn(u32) -> u32 + Send + Sync;

    fn table() -> ProductTable<Handle> {
        ProductTable::new(Slot::Transient, "u32", Arc::new(TraceHook::default()))
    }

    fn doubler() -> Arc<Handle> {
        Arc::new(|x| x * 2)
    }

    #[test]
    fn test_register_and_lookup() {
        let table = table();
        assert!(table.register("double", doubler()).is_some());

        let handle = table.lookup("double").unwrap();
        assert_eq!(handle(21), 42);
        assert!(table.contains("double"));
    }

    #[test]
    fn test_duplicate_keeps_original() {
        let table = table();
        let first = table.register("op", doubler());
        let second = table.register("op", Arc::new(|x| x + 1));

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(table.lookup("op").unwrap()(10), 20);
    }

    #[test]
    fn test_empty_id_rejected() {
        let table = table();
        assert!(table.register("", doubler()).is_none());
        assert!(table.ids().is_empty());
    }

    #[test]
    fn test_lookup_missing() {
        let table = table();
        let result = table.lookup("missing");
        assert_eq!(
            result.err(),
            Some(RegistryError::NotFound {
                id: "missing".to_string(),
                slot: Slot::Transient
            })
        );
    }

    #[test]
    fn test_unregister_requires_matching_ticket() {
        let table = table();
        let ticket = table.register("op", doubler()).unwrap();

        // A stale ticket from an earlier owner leaves the current entry alone.
        table.unregister("op", ticket);
        let newer = table.register("op", doubler()).unwrap();
        table.unregister("op", ticket);
        assert!(table.contains("op"));

        table.unregister("op", newer);
        assert!(!table.contains("op"));
    }

    #[test]
    fn test_unregister_missing_is_noop() {
        let table = table();
        table.unregister("ghost", Ticket::issue());
        assert!(table.ids().is_empty());
    }

    #[test]
    fn test_tickets_are_unique() {
        let table = table();
        let a = table.register("a", doubler()).unwrap();
        let b = table.register("b", doubler()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_ids_sorted() {
        let table = table();
        table.register("zeta", doubler());
        table.register("alpha", doubler());
        table.register("mid", doubler());
        assert_eq!(table.ids(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_events_emitted() {
        let trace = Arc::new(TraceHook::default());
        let table: ProductTable<Handle> =
            ProductTable::new(Slot::Shared, "u32", trace.clone());

        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        trace.set(move |e| events_clone.lock().unwrap().push(e.to_string()));

        let ticket = table.register("op", doubler()).unwrap();
        table.register("op", doubler());
        let _ = table.lookup("op");
        table.unregister("op", ticket);
        let _ = table.lookup("op");
        table.unregister("op", ticket);

        let captured = events.lock().unwrap();
        assert_eq!(
            *captured,
            vec![
                "register { id: op, slot: shared, accepted: true }",
                "register { id: op, slot: shared, accepted: false }",
                "get { id: op, slot: shared, found: true }",
                "unregister { id: op, slot: shared, found: true }",
                "get { id: op, slot: shared, found: false }",
                "unregister { id: op, slot: shared, found: false }",
            ]
        );
    }

    #[test]
    fn test_handle_outlives_removal() {
        let table = table();
        let ticket = table.register("op", doubler()).unwrap();
        let handle = table.lookup("op").unwrap();

        table.unregister("op", ticket);
        assert_eq!(handle(4), 8);
    }
}
