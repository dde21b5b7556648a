//! Shared instances example for product-registry.
//!
//! Demonstrates:
//! - Registering a process-wide instance with `SharedRegistrar`
//! - Every `get_shared()` returns the same `Arc`
//! - Arguments after the first construction are ignored
//! - Dropping handles never destroys the shared instance
//! - Concurrent access from several threads
//!
//! Run with: `cargo run --example shared_instances`

use product_registry::{Registry, SharedProduct, SharedRegistrar, SingletonCell};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

/// Contract for an id generator shared by the whole application.
trait IdGenerator: Send + Sync {
    fn next_id(&self) -> u64;
    fn prefix(&self) -> &str;
}

struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl SharedProduct<dyn IdGenerator, (String,)> for SequentialIds {
    fn instance((prefix,): (String,)) -> Arc<dyn IdGenerator> {
        static CELL: SingletonCell<SequentialIds> = SingletonCell::new();
        CELL.get_or_init(|| SequentialIds {
            prefix,
            next: AtomicU64::new(1),
        })
    }
}

fn main() {
    println!("=== product-registry: Shared Instances ===\n");

    let generators: Registry<dyn IdGenerator, (String,)> = Registry::global();

    // -------------------------------------------------------------------------
    // 1. Register the shared implementation
    // -------------------------------------------------------------------------
    println!("1. Registering the sequential generator...");

    let _registrar = SharedRegistrar::of::<SequentialIds>(&generators, "sequential");
    println!("   Shared ids: {:?}", generators.shared_ids());

    // -------------------------------------------------------------------------
    // 2. First request decides the construction arguments
    // -------------------------------------------------------------------------
    println!("\n2. Requesting the generator twice with different prefixes...");

    let first = generators
        .get_shared("sequential", ("order".to_string(),))
        .unwrap();
    let second = generators
        .get_shared("sequential", ("invoice".to_string(),))
        .unwrap();

    println!("   first.prefix()  = {}", first.prefix());
    println!("   second.prefix() = {}", second.prefix());
    println!("   same instance   = {}", Arc::ptr_eq(&first, &second));

    // -------------------------------------------------------------------------
    // 3. Dropping handles keeps the instance
    // -------------------------------------------------------------------------
    println!("\n3. Dropping both handles...");

    println!("   next id before drop: {}", first.next_id());
    drop(first);
    drop(second);

    let again = generators
        .get_shared("sequential", ("ignored".to_string(),))
        .unwrap();
    println!("   next id after drop:  {}", again.next_id());

    // -------------------------------------------------------------------------
    // 4. Concurrent access
    // -------------------------------------------------------------------------
    println!("\n4. Drawing ids from four threads...");

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let generators = generators.clone();
            thread::spawn(move || {
                let ids = generators
                    .get_shared("sequential", ("worker".to_string(),))
                    .unwrap();
                let drawn: Vec<u64> = (0..3).map(|_| ids.next_id()).collect();
                (worker, drawn)
            })
        })
        .collect();

    for handle in handles {
        let (worker, drawn) = handle.join().unwrap();
        println!("   worker {worker}: {:?}", drawn);
    }

    println!("\n=== Example Complete ===");
}
