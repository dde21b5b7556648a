use thiserror::Error;

use crate::Slot;

/// Errors reported by the strict (`try_*`) registry operations.
///
/// The lenient operations (`get`, `Registrar::new`) never return these; they
/// log a warning and fall back to `None` or an inert registrar instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No product is registered under the identifier.
    #[error("No {slot} product registered for id '{id}'")]
    NotFound { id: String, slot: Slot },

    /// Another registrar already owns the identifier.
    #[error("A {slot} product is already registered for id '{id}'")]
    Duplicate { id: String, slot: Slot },

    /// Identifiers must be non-empty.
    #[error("Product identifier must not be empty")]
    InvalidId,
}
