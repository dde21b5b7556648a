//! The per-(product, signature) registry.
//!
//! A [`Registry<P, A>`] maps identifiers to implementations of the abstract
//! product `P` (normally a trait object type such as `dyn Shape`) whose
//! constructors take the argument tuple `A`. It holds two independent tables:
//! one for transient products, built fresh on every request, and one for
//! shared products, handed out as the same `Arc` every time.
//!
//! Registration happens only through [`Registrar`](crate::Registrar) and
//! [`SharedRegistrar`](crate::SharedRegistrar) guards; the registry itself
//! exposes lookups.
//!
//! # Examples
//!
//! ```
//! use product_registry::{Registrar, Registry};
//!
//! trait Greeter {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! let registry: Registry<dyn Greeter> = Registry::new();
//! let registrar = Registrar::new(&registry, "en", |()| Box::new(English) as Box<dyn Greeter>);
//!
//! assert_eq!(registry.get("en", ()).unwrap().greet(), "hello");
//! assert!(registry.get("fr", ()).is_none());
//!
//! drop(registrar);
//! assert!(registry.get("en", ()).is_none());
//! ```

use std::any::{self, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, Mutex};

use crate::registry_event::TraceHook;
use crate::table::ProductTable;
use crate::{RegistryError, RegistryEvent, Slot};

/// Erased constructor stored in the transient table.
pub type CreateFn<P, A> = dyn Fn(A) -> Box<P> + Send + Sync;

/// Erased singleton accessor stored in the shared table.
pub type SharedFn<P, A> = dyn Fn(A) -> Arc<P> + Send + Sync;

/// Process-wide registries, one per `Registry<P, A>` type.
///
/// The map is keyed by the `TypeId` of the registry type itself, so the
/// downcast in [`Registry::global`] can only ever see the type it was stored
/// as.
static GLOBAL_REGISTRIES: LazyLock<Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Named products of abstract type `P` constructed from arguments `A`.
///
/// Cloning a registry is cheap and yields another handle to the same tables.
pub struct Registry<P: ?Sized + 'static, A: 'static = ()> {
    transient: Arc<ProductTable<CreateFn<P, A>>>,
    shared: Arc<ProductTable<SharedFn<P, A>>>,
    trace: Arc<TraceHook>,
}

impl<P: ?Sized + 'static, A: 'static> Registry<P, A> {
    /// Creates an empty registry, isolated from every other registry.
    pub fn new() -> Self {
        let trace = Arc::new(TraceHook::default());
        let product = any::type_name::<P>();

        Self {
            transient: Arc::new(ProductTable::new(Slot::Transient, product, trace.clone())),
            shared: Arc::new(ProductTable::new(Slot::Shared, product, trace.clone())),
            trace,
        }
    }

    /// Returns the process-wide registry for `(P, A)`.
    ///
    /// The registry is created on first use and lives until the process exits.
    /// Every call for the same `(P, A)` returns a handle to the same tables;
    /// registries for different product types or different argument
    /// signatures never share identifiers.
    pub fn global() -> Self {
        let mut registries = GLOBAL_REGISTRIES
            .lock()
            .unwrap_or_else(|p| p.into_inner());

        let entry = registries
            .entry(TypeId::of::<Self>())
            .or_insert_with(|| Arc::new(Self::new()));

        match entry.downcast_ref::<Self>() {
            Some(registry) => registry.clone(),
            // Unreachable: entries are keyed by the TypeId of their own type.
            None => {
                let registry = Self::new();
                *entry = Arc::new(registry.clone());
                registry
            }
        }
    }

    /// Creates a new transient product registered under `id`.
    ///
    /// Returns `None` (and logs a warning) when no such product is registered.
    pub fn get(&self, id: &str, args: A) -> Option<Box<P>> {
        self.try_get(id, args).ok()
    }

    /// Like [`get`](Self::get) but reports a miss as an error.
    pub fn try_get(&self, id: &str, args: A) -> Result<Box<P>, RegistryError> {
        let create = self.transient.lookup(id)?;
        Ok(create(args))
    }

    /// Returns the shared product registered under `id`.
    ///
    /// The instance is constructed by its first request; arguments passed
    /// on later requests are ignored.
    pub fn get_shared(&self, id: &str, args: A) -> Option<Arc<P>> {
        self.try_get_shared(id, args).ok()
    }

    /// Like [`get_shared`](Self::get_shared) but reports a miss as an error.
    pub fn try_get_shared(&self, id: &str, args: A) -> Result<Arc<P>, RegistryError> {
        let instance = self.shared.lookup(id)?;
        Ok(instance(args))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.transient.contains(id)
    }

    pub fn contains_shared(&self, id: &str) -> bool {
        self.shared.contains(id)
    }

    /// Identifiers in the transient table, sorted.
    pub fn ids(&self) -> Vec<String> {
        self.transient.ids()
    }

    /// Identifiers in the shared table, sorted.
    pub fn shared_ids(&self) -> Vec<String> {
        self.shared.ids()
    }

    /// Set a tracing callback for this registry's operations.
    ///
    /// The callback is invoked for every register, unregister and lookup on
    /// either table. It runs after the table lock is released, but it must not
    /// register or look up products itself to keep event order meaningful.
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        self.trace.set(callback);
    }

    /// Clear the tracing callback.
    pub fn clear_trace_callback(&self) {
        self.trace.clear();
    }

    pub(crate) fn transient_table(&self) -> &Arc<ProductTable<CreateFn<P, A>>> {
        &self.transient
    }

    pub(crate) fn shared_table(&self) -> &Arc<ProductTable<SharedFn<P, A>>> {
        &self.shared
    }
}

impl<P: ?Sized + 'static, A: 'static> Clone for Registry<P, A> {
    fn clone(&self) -> Self {
        Self {
            transient: Arc::clone(&self.transient),
            shared: Arc::clone(&self.shared),
            trace: Arc::clone(&self.trace),
        }
    }
}

impl<P: ?Sized + 'static, A: 'static> Default for Registry<P, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized + 'static, A: 'static> fmt::Debug for Registry<P, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("product", &any::type_name::<P>())
            .field("args", &any::type_name::<A>())
            .field("transient", &self.transient.ids())
            .field("shared", &self.shared.ids())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
