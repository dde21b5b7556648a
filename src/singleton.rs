use std::any;
use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::trace;

/// Lazily constructed process-wide instance, for implementing
/// [`SharedProduct`](crate::SharedProduct).
///
/// The first call to [`get_or_init`](Self::get_or_init) builds the instance;
/// every later call returns the same `Arc` and ignores its initializer. The
/// cell keeps its own strong reference, so callers dropping their handles
/// never destroy the instance.
///
/// # Examples
///
/// ```
/// use product_registry::{SharedProduct, SingletonCell};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {
///     fn offset(&self) -> i64;
/// }
///
/// struct SystemClock {
///     offset: i64,
/// }
///
/// impl Clock for SystemClock {
///     fn offset(&self) -> i64 {
///         self.offset
///     }
/// }
///
/// impl SharedProduct<dyn Clock, (i64,)> for SystemClock {
///     fn instance((offset,): (i64,)) -> Arc<dyn Clock> {
///         static CELL: SingletonCell<SystemClock> = SingletonCell::new();
///         CELL.get_or_init(|| SystemClock { offset })
///     }
/// }
///
/// let first = SystemClock::instance((5,));
/// let second = SystemClock::instance((9,));
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(second.offset(), 5);
/// ```
pub struct SingletonCell<T> {
    cell: OnceLock<Arc<T>>,
}

impl<T> SingletonCell<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Returns the instance, building it with `init` if this is the first call.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> Arc<T> {
        let mut built = false;
        let instance = self.cell.get_or_init(|| {
            built = true;
            Arc::new(init())
        });

        if !built {
            trace!(
                product = any::type_name::<T>(),
                "shared instance already constructed, ignoring construction arguments"
            );
        }

        Arc::clone(instance)
    }

    /// Returns the instance if it has been built.
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }
}

impl<T> Default for SingletonCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SingletonCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingletonCell")
            .field("type_name", &any::type_name::<T>())
            .field("initialized", &self.cell.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_first_initializer_wins() {
        let cell = SingletonCell::new();
        let a = cell.get_or_init(|| 1);
        let b = cell.get_or_init(|| 2);

        assert_eq!(*b, 1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_get_before_and_after_init() {
        let cell: SingletonCell<String> = SingletonCell::new();
        assert!(cell.get().is_none());

        cell.get_or_init(|| "ready".to_string());
        assert_eq!(cell.get().as_deref().map(String::as_str), Some("ready"));
    }

    #[test]
    fn test_dropping_handles_keeps_instance() {
        let cell = SingletonCell::new();
        let handle = cell.get_or_init(|| vec![1, 2, 3]);
        assert_eq!(Arc::strong_count(&handle), 2); // cell + handle

        drop(handle);
        assert_eq!(*cell.get().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_concurrent_init_runs_once() {
        static CELL: SingletonCell<usize> = SingletonCell::new();
        static BUILDS: AtomicUsize = AtomicUsize::new(0);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                thread::spawn(move || {
                    CELL.get_or_init(|| {
                        BUILDS.fetch_add(1, Ordering::SeqCst);
                        i
                    })
                })
            })
            .collect();

        let values: Vec<Arc<usize>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
        assert!(values.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_debug_format() {
        let cell: SingletonCell<u8> = SingletonCell::new();
        assert_eq!(
            format!("{:?}", cell),
            "SingletonCell { type_name: \"u8\", initialized: false }"
        );
    }
}
