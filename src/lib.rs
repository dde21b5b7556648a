//! # Product Registry
//!
//! A thread-safe registry of named products: independently compiled modules
//! register implementations of an abstract capability under string ids, and
//! callers later create a product by id without naming the concrete type.
//!
//! Registries are generic over the product type `P` (usually a trait object
//! such as `dyn Codec`) and the constructor argument tuple `A`, so every
//! `(P, A)` pair has its own namespace.
//!
//! ## Quick Start
//!
//! ```rust
//! use product_registry::{Registrar, Registry};
//!
//! trait Base {
//!     fn id(&self) -> &'static str;
//! }
//!
//! struct Derived;
//!
//! impl Base for Derived {
//!     fn id(&self) -> &'static str {
//!         "Derived"
//!     }
//! }
//!
//! let registry: Registry<dyn Base> = Registry::new();
//!
//! // Registered for as long as the registrar lives.
//! let registrar = Registrar::new(&registry, "Derived", |()| Box::new(Derived) as Box<dyn Base>);
//! assert_eq!(registry.get("Derived", ()).unwrap().id(), "Derived");
//!
//! drop(registrar);
//! assert!(registry.get("Derived", ()).is_none());
//! ```
//!
//! ## Features
//!
//! - **Thread-safe**: registration and lookup can race from any thread
//! - **Scoped registration**: [`Registrar`] and [`SharedRegistrar`] are guards
//!   that unregister on drop
//! - **Transient and shared products**: fresh `Box<P>` per request, or one
//!   process-wide `Arc<P>` via [`SingletonCell`]
//! - **Tracing support**: `tracing` warnings on every failure path, plus an
//!   optional per-registry callback receiving [`RegistryEvent`]s
//!
//! ## Main Items
//!
//! - [`Registry`] - lookups (`get`, `get_shared`, `contains`, ...)
//! - [`Registrar`] / [`SharedRegistrar`] - registration guards
//! - [`Construct`] / [`SharedProduct`] - implemented by concrete product types
//! - [`define_registry!`] - named process-wide registries

mod macros;
mod registrar;
mod registry;
mod registry_error;
mod registry_event;
mod singleton;
mod table;

pub use registrar::{Construct, Registrar, SharedProduct, SharedRegistrar};
pub use registry::{CreateFn, Registry, SharedFn};
pub use registry_error::RegistryError;
pub use registry_event::{RegistryEvent, Slot, TraceCallback};
pub use singleton::SingletonCell;
