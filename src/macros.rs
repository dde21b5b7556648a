//! Macros for creating named product registries.

/// Creates an isolated, process-wide product registry with a single macro
/// invocation.
///
/// The macro generates a module containing a private static
/// [`Registry`](crate::Registry) for the given product type and argument
/// signature (`()` when omitted), plus free functions delegating to it.
/// Types named in the invocation are resolved in the enclosing module, so
/// they must be declared at module level rather than inside a function body.
///
/// # Examples
///
/// ```rust
/// use product_registry::define_registry;
///
/// pub trait Codec: Send + Sync {
///     fn name(&self) -> &'static str;
/// }
///
/// struct Gzip;
/// impl Codec for Gzip {
///     fn name(&self) -> &'static str {
///         "gzip"
///     }
/// }
///
/// define_registry!(codecs, dyn Codec);
///
/// fn main() {
///     let _gzip = codecs::registrar("gzip", |()| Box::new(Gzip) as Box<dyn Codec>);
///     assert_eq!(codecs::get("gzip", ()).unwrap().name(), "gzip");
///     assert!(codecs::get("zstd", ()).is_none());
/// }
/// ```
///
/// # Argument Signatures
///
/// Each invocation is its own namespace, so the same identifier can be used
/// for the same product type under different signatures:
///
/// ```rust
/// use product_registry::define_registry;
///
/// pub trait Buffer: Send + Sync {
///     fn capacity(&self) -> usize;
/// }
///
/// struct Fixed(usize);
/// impl Buffer for Fixed {
///     fn capacity(&self) -> usize {
///         self.0
///     }
/// }
///
/// define_registry!(buffers, dyn Buffer);
/// define_registry!(sized_buffers, dyn Buffer, (usize,));
///
/// fn main() {
///     let _a = buffers::registrar("fixed", |()| Box::new(Fixed(64)) as Box<dyn Buffer>);
///     let _b = sized_buffers::registrar("fixed", |(n,)| Box::new(Fixed(n)) as Box<dyn Buffer>);
///
///     assert_eq!(buffers::get("fixed", ()).unwrap().capacity(), 64);
///     assert_eq!(sized_buffers::get("fixed", (128,)).unwrap().capacity(), 128);
/// }
/// ```
#[macro_export]
macro_rules! define_registry {
    ($name:ident, $product:ty) => {
        $crate::define_registry!($name, $product, ());
    };
    ($name:ident, $product:ty, $args:ty) => {
        pub mod $name {
            #[allow(unused_imports)]
            use super::*;
            use std::sync::{Arc, LazyLock};

            // Registry storage (module-private)
            static REGISTRY: LazyLock<$crate::Registry<$product, $args>> =
                LazyLock::new($crate::Registry::new);

            /// The registry behind this module's functions.
            pub fn registry() -> &'static $crate::Registry<$product, $args> {
                &REGISTRY
            }

            /// Create a transient product by id.
            pub fn get(id: &str, args: $args) -> Option<Box<$product>> {
                REGISTRY.get(id, args)
            }

            /// Get the shared product registered under id.
            pub fn get_shared(id: &str, args: $args) -> Option<Arc<$product>> {
                REGISTRY.get_shared(id, args)
            }

            /// Check if a transient product is registered under id.
            pub fn contains(id: &str) -> bool {
                REGISTRY.contains(id)
            }

            /// Check if a shared product is registered under id.
            pub fn contains_shared(id: &str) -> bool {
                REGISTRY.contains_shared(id)
            }

            /// Register a constructor; it stays registered while the returned
            /// registrar lives.
            pub fn registrar<F>(
                id: impl Into<String>,
                create: F,
            ) -> $crate::Registrar<$product, $args>
            where
                F: Fn($args) -> Box<$product> + Send + Sync + 'static,
            {
                $crate::Registrar::new(&REGISTRY, id, create)
            }

            /// Register a singleton accessor; it stays registered while the
            /// returned registrar lives.
            pub fn shared_registrar<F>(
                id: impl Into<String>,
                instance: F,
            ) -> $crate::SharedRegistrar<$product, $args>
            where
                F: Fn($args) -> Arc<$product> + Send + Sync + 'static,
            {
                $crate::SharedRegistrar::new(&REGISTRY, id, instance)
            }

            /// Set a tracing callback for registry operations.
            pub fn set_trace_callback(
                callback: impl Fn(&$crate::RegistryEvent) + Send + Sync + 'static,
            ) {
                REGISTRY.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                REGISTRY.clear_trace_callback()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    pub trait Named: Send + Sync {
        fn name(&self) -> String;
    }

    struct Plain(String);
    impl Named for Plain {
        fn name(&self) -> String {
            self.0.clone()
        }
    }

    #[test]
    fn test_define_registry_macro() {
        define_registry!(test_reg, dyn Named);

        let _registrar = test_reg::registrar("plain", |()| {
            Box::new(Plain("plain".to_string())) as Box<dyn Named>
        });

        assert_eq!(test_reg::get("plain", ()).unwrap().name(), "plain");
        assert!(test_reg::contains("plain"));
        assert!(!test_reg::contains_shared("plain"));
        assert_eq!(test_reg::registry().ids(), vec!["plain"]);
    }

    #[test]
    fn test_multiple_registries() {
        define_registry!(reg_a, dyn Named);
        define_registry!(reg_b, dyn Named);

        let _a = reg_a::registrar("id", |()| Box::new(Plain("a".to_string())) as Box<dyn Named>);
        let _b = reg_b::registrar("id", |()| Box::new(Plain("b".to_string())) as Box<dyn Named>);

        assert_eq!(reg_a::get("id", ()).unwrap().name(), "a");
        assert_eq!(reg_b::get("id", ()).unwrap().name(), "b");
    }

    #[test]
    fn test_shared_and_tracing() {
        define_registry!(trace_test, dyn Named, (String,));

        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();
        trace_test::set_trace_callback(move |event| {
            events_clone.lock().unwrap().push(format!("{}", event));
        });

        let instance: Arc<dyn Named> = Arc::new(Plain("one".to_string()));
        let _registrar = trace_test::shared_registrar("one", move |_| instance.clone());
        let _ = trace_test::get_shared("one", ("ignored".to_string(),));
        let _ = trace_test::get("one", ("ignored".to_string(),));

        trace_test::clear_trace_callback();

        let recorded = events.lock().unwrap();
        assert_eq!(
            *recorded,
            vec![
                "register { id: one, slot: shared, accepted: true }",
                "get { id: one, slot: shared, found: true }",
                "get { id: one, slot: transient, found: false }",
            ]
        );
    }
}
