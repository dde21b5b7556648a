//! Plugin contracts example for product-registry.
//!
//! Demonstrates the **contract-based plugin** pattern:
//! - Define a trait (contract) the host application depends on
//! - Plugins register concrete implementations under ids while loaded
//! - The host creates implementations by id, never naming the types
//! - Unloading a plugin removes its ids
//!
//! Run with: `RUST_LOG=product_registry=debug cargo run --example plugin_contracts`

use product_registry::define_registry;
use tracing_subscriber::EnvFilter;

// =============================================================================
// Contract Definition
// =============================================================================

/// Contract for a storage backend, configured with a capacity.
pub trait Storage: Send + Sync {
    fn put(&self, key: &str, value: &str) -> String;
    fn kind(&self) -> &str;
}

// Named registry for storage backends taking `(capacity,)`.
define_registry!(storages, dyn Storage, (usize,));

// =============================================================================
// Plugins
// =============================================================================

mod memory_plugin {
    use super::{storages, Storage};
    use product_registry::{Construct, Registrar};

    pub struct MemoryStorage {
        capacity: usize,
    }

    impl Storage for MemoryStorage {
        fn put(&self, key: &str, value: &str) -> String {
            format!("memory[cap {}] {key}={value}", self.capacity)
        }

        fn kind(&self) -> &str {
            "memory"
        }
    }

    impl Construct<dyn Storage, (usize,)> for MemoryStorage {
        fn construct((capacity,): (usize,)) -> Box<dyn Storage> {
            Box::new(MemoryStorage { capacity })
        }
    }

    pub fn load() -> Registrar<dyn Storage, (usize,)> {
        Registrar::of::<MemoryStorage>(storages::registry(), "memory")
    }
}

mod disk_plugin {
    use super::{storages, Storage};
    use product_registry::{SharedRegistrar, SingletonCell};
    use std::sync::Arc;

    pub struct DiskStorage {
        capacity: usize,
    }

    impl Storage for DiskStorage {
        fn put(&self, key: &str, value: &str) -> String {
            format!("disk[cap {}] {key}={value}", self.capacity)
        }

        fn kind(&self) -> &str {
            "disk"
        }
    }

    static DISK: SingletonCell<DiskStorage> = SingletonCell::new();

    /// The disk backend is shared: there is only one disk.
    pub fn load() -> SharedRegistrar<dyn Storage, (usize,)> {
        storages::shared_registrar("disk", |(capacity,)| {
            DISK.get_or_init(|| DiskStorage { capacity }) as Arc<dyn Storage>
        })
    }
}

// =============================================================================
// Host
// =============================================================================

fn store(backend: &str, key: &str, value: &str) {
    let line = storages::get(backend, (64,))
        .map(|storage| storage.put(key, value))
        .or_else(|| storages::get_shared(backend, (1024,)).map(|storage| storage.put(key, value)));

    match line {
        Some(line) => println!("   {line}"),
        None => println!("   backend '{backend}' is not loaded"),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")))
        .init();

    println!("=== product-registry: Plugin Contracts ===\n");

    println!("1. No plugins loaded...");
    store("memory", "a", "1");

    println!("\n2. Loading plugins...");
    let memory = memory_plugin::load();
    let disk = disk_plugin::load();
    println!("   transient backends: {:?}", storages::registry().ids());
    println!("   shared backends:    {:?}", storages::registry().shared_ids());

    println!("\n3. Storing through the contract...");
    store("memory", "a", "1");
    store("disk", "b", "2");

    if let Some(storage) = storages::get_shared("disk", (1,)) {
        println!("   disk kind = {}", storage.kind());
    }

    println!("\n4. Unloading the memory plugin...");
    drop(memory);
    store("memory", "a", "1");
    store("disk", "c", "3");

    drop(disk);
    println!("\n=== Example Complete ===");
}
