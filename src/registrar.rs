//! Registration guards.
//!
//! A registrar binds one implementation to one identifier for as long as the
//! registrar is alive. Construction claims the identifier; dropping the
//! registrar (or calling [`release`](Registrar::release)) gives it back. A
//! registrar that lost the race for its identifier stays inert: it never
//! removes the winner's entry and never claims the slot later on.

use std::fmt;
use std::sync::Arc;

use crate::registry::{CreateFn, SharedFn};
use crate::table::{ProductTable, Ticket};
use crate::{Registry, RegistryError};

/// Builds fresh products of abstract type `P` from arguments `A`.
///
/// Implemented by concrete product types so they can be registered with
/// [`Registrar::of`].
///
/// ```
/// use product_registry::{Construct, Registrar, Registry};
///
/// trait Shape {
///     fn area(&self) -> f64;
/// }
///
/// struct Square(f64);
///
/// impl Shape for Square {
///     fn area(&self) -> f64 {
///         self.0 * self.0
///     }
/// }
///
/// impl Construct<dyn Shape, (f64,)> for Square {
///     fn construct((side,): (f64,)) -> Box<dyn Shape> {
///         Box::new(Square(side))
///     }
/// }
///
/// let shapes: Registry<dyn Shape, (f64,)> = Registry::new();
/// let _square = Registrar::of::<Square>(&shapes, "square");
/// assert_eq!(shapes.get("square", (3.0,)).unwrap().area(), 9.0);
/// ```
pub trait Construct<P: ?Sized, A = ()>: 'static {
    fn construct(args: A) -> Box<P>;
}

/// Provides the single process-wide instance of a product type.
///
/// `instance` must return the same object on every call; the arguments of the
/// first call decide how it is built. [`SingletonCell`](crate::SingletonCell)
/// implements that contract.
pub trait SharedProduct<P: ?Sized, A = ()>: 'static {
    fn instance(args: A) -> Arc<P>;
}

/// Ownership of one table slot, released exactly once.
struct Registration<H: ?Sized> {
    table: Arc<ProductTable<H>>,
    id: String,
    handle: Arc<H>,
    ticket: Option<Ticket>,
}

impl<H: ?Sized> Registration<H> {
    fn acquire(table: &Arc<ProductTable<H>>, id: String, handle: Arc<H>) -> Self {
        let ticket = table.register(&id, Arc::clone(&handle));
        Self {
            table: Arc::clone(table),
            id,
            handle,
            ticket,
        }
    }

    fn try_acquire(
        table: &Arc<ProductTable<H>>,
        id: String,
        handle: Arc<H>,
    ) -> Result<Self, RegistryError> {
        if id.is_empty() {
            return Err(RegistryError::InvalidId);
        }

        let registration = Self::acquire(table, id, handle);
        if registration.ticket.is_none() {
            return Err(RegistryError::Duplicate {
                id: registration.id.clone(),
                slot: table.slot(),
            });
        }

        Ok(registration)
    }

    fn release(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.table.unregister(&self.id, ticket);
        }
    }
}

impl<H: ?Sized> Drop for Registration<H> {
    fn drop(&mut self) {
        self.release();
    }
}

// -------------------------------------------------------------------------------------------------
// Transient
// -------------------------------------------------------------------------------------------------

/// Registers a constructor under an identifier in a registry's transient
/// table.
///
/// Every [`Registry::get`] for the identifier calls the constructor again, so
/// each caller receives an independent product.
#[must_use = "the product is unregistered as soon as the registrar is dropped"]
pub struct Registrar<P: ?Sized + 'static, A: 'static = ()> {
    registration: Registration<CreateFn<P, A>>,
}

impl<P: ?Sized + 'static, A: 'static> Registrar<P, A> {
    /// Registers `create` under `id`.
    ///
    /// If `id` is already taken the returned registrar does not own the slot
    /// ([`is_owner`](Self::is_owner) is `false`) and the existing product stays
    /// in place.
    pub fn new<F>(registry: &Registry<P, A>, id: impl Into<String>, create: F) -> Self
    where
        F: Fn(A) -> Box<P> + Send + Sync + 'static,
    {
        let handle: Arc<CreateFn<P, A>> = Arc::new(create);
        Self {
            registration: Registration::acquire(registry.transient_table(), id.into(), handle),
        }
    }

    /// Registers the [`Construct`] implementation of `T` under `id`.
    pub fn of<T: Construct<P, A>>(registry: &Registry<P, A>, id: impl Into<String>) -> Self {
        Self::new(registry, id, T::construct)
    }

    /// Like [`new`](Self::new) but fails instead of returning an inert
    /// registrar.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::InvalidId`] if `id` is empty
    /// - [`RegistryError::Duplicate`] if `id` is already registered
    pub fn try_new<F>(
        registry: &Registry<P, A>,
        id: impl Into<String>,
        create: F,
    ) -> Result<Self, RegistryError>
    where
        F: Fn(A) -> Box<P> + Send + Sync + 'static,
    {
        let handle: Arc<CreateFn<P, A>> = Arc::new(create);
        Ok(Self {
            registration: Registration::try_acquire(registry.transient_table(), id.into(), handle)?,
        })
    }

    /// Builds a new product with this registrar's constructor, whether or not
    /// it owns its identifier.
    pub fn create(&self, args: A) -> Box<P> {
        (self.registration.handle)(args)
    }

    pub fn id(&self) -> &str {
        &self.registration.id
    }

    /// Whether this registrar currently occupies its identifier.
    pub fn is_owner(&self) -> bool {
        self.registration.ticket.is_some()
    }

    /// Unregisters the product now instead of on drop. Calling it again is a
    /// no-op.
    pub fn release(&mut self) {
        self.registration.release();
    }
}

impl<P: ?Sized + 'static, A: 'static> fmt::Debug for Registrar<P, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registrar")
            .field("id", &self.id())
            .field("owner", &self.is_owner())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Shared
// -------------------------------------------------------------------------------------------------

/// Registers a singleton accessor under an identifier in a registry's shared
/// table.
///
/// Every [`Registry::get_shared`] for the identifier returns the same
/// instance. Dropping the returned `Arc`s never destroys it.
#[must_use = "the product is unregistered as soon as the registrar is dropped"]
pub struct SharedRegistrar<P: ?Sized + 'static, A: 'static = ()> {
    registration: Registration<SharedFn<P, A>>,
}

impl<P: ?Sized + 'static, A: 'static> SharedRegistrar<P, A> {
    /// Registers `instance` under `id`. See [`Registrar::new`] for duplicate
    /// handling.
    pub fn new<F>(registry: &Registry<P, A>, id: impl Into<String>, instance: F) -> Self
    where
        F: Fn(A) -> Arc<P> + Send + Sync + 'static,
    {
        let handle: Arc<SharedFn<P, A>> = Arc::new(instance);
        Self {
            registration: Registration::acquire(registry.shared_table(), id.into(), handle),
        }
    }

    /// Registers the [`SharedProduct`] implementation of `T` under `id`.
    pub fn of<T: SharedProduct<P, A>>(registry: &Registry<P, A>, id: impl Into<String>) -> Self {
        Self::new(registry, id, T::instance)
    }

    /// # Errors
    ///
    /// Same as [`Registrar::try_new`].
    pub fn try_new<F>(
        registry: &Registry<P, A>,
        id: impl Into<String>,
        instance: F,
    ) -> Result<Self, RegistryError>
    where
        F: Fn(A) -> Arc<P> + Send + Sync + 'static,
    {
        let handle: Arc<SharedFn<P, A>> = Arc::new(instance);
        Ok(Self {
            registration: Registration::try_acquire(registry.shared_table(), id.into(), handle)?,
        })
    }

    /// Returns the shared instance through this registrar's accessor.
    pub fn create(&self, args: A) -> Arc<P> {
        (self.registration.handle)(args)
    }

    pub fn id(&self) -> &str {
        &self.registration.id
    }

    pub fn is_owner(&self) -> bool {
        self.registration.ticket.is_some()
    }

    pub fn release(&mut self) {
        self.registration.release();
    }
}

impl<P: ?Sized + 'static, A: 'static> fmt::Debug for SharedRegistrar<P, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRegistrar")
            .field("id", &self.id())
            .field("owner", &self.is_owner())
            .finish()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
