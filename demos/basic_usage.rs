//! Basic usage example for product-registry.
//!
//! Demonstrates:
//! - Registering implementations of a trait under string ids
//! - Creating products by id with `get()` (returns `Box<dyn Trait>`)
//! - Passing constructor arguments through the registry
//! - Scoped registration: dropping the registrar unregisters the product
//! - Duplicate ids and missing ids (watch the warnings)
//!
//! Run with: `RUST_LOG=product_registry=debug cargo run --example basic_usage`

use product_registry::{Construct, Registrar, Registry};
use tracing_subscriber::EnvFilter;

// -----------------------------------------------------------------------------
// Products
// -----------------------------------------------------------------------------

/// Contract every greeter implements.
trait Greeter: Send + Sync {
    fn greet(&self, name: &str) -> String;
}

struct English {
    excited: bool,
}

impl Greeter for English {
    fn greet(&self, name: &str) -> String {
        let mark = if self.excited { "!" } else { "." };
        format!("Hello, {name}{mark}")
    }
}

impl Construct<dyn Greeter, (bool,)> for English {
    fn construct((excited,): (bool,)) -> Box<dyn Greeter> {
        Box::new(English { excited })
    }
}

struct Czech {
    excited: bool,
}

impl Greeter for Czech {
    fn greet(&self, name: &str) -> String {
        let mark = if self.excited { "!" } else { "." };
        format!("Ahoj, {name}{mark}")
    }
}

impl Construct<dyn Greeter, (bool,)> for Czech {
    fn construct((excited,): (bool,)) -> Box<dyn Greeter> {
        Box::new(Czech { excited })
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("=== product-registry: Basic Usage ===\n");

    let greeters: Registry<dyn Greeter, (bool,)> = Registry::new();

    // -------------------------------------------------------------------------
    // 1. Register implementations
    // -------------------------------------------------------------------------
    println!("1. Registering greeters...");

    let english = Registrar::of::<English>(&greeters, "en");
    let _czech = Registrar::of::<Czech>(&greeters, "cs");

    println!("   Registered ids: {:?}", greeters.ids());

    // -------------------------------------------------------------------------
    // 2. Create products by id
    // -------------------------------------------------------------------------
    println!("\n2. Creating products by id...");

    for id in ["en", "cs"] {
        if let Some(greeter) = greeters.get(id, (true,)) {
            println!("   {id}: {}", greeter.greet("World"));
        }
    }

    let calm = greeters.get("en", (false,)).unwrap();
    println!("   en (calm): {}", calm.greet("World"));

    // -------------------------------------------------------------------------
    // 3. Duplicate registration keeps the original
    // -------------------------------------------------------------------------
    println!("\n3. Registering a second greeter under \"en\"...");

    let duplicate = Registrar::of::<Czech>(&greeters, "en");
    println!("   duplicate.is_owner() = {}", duplicate.is_owner());
    println!("   en: {}", greeters.get("en", (true,)).unwrap().greet("World"));

    // -------------------------------------------------------------------------
    // 4. Missing ids are an ordinary outcome
    // -------------------------------------------------------------------------
    println!("\n4. Requesting an unknown id...");

    match greeters.try_get("de", (true,)) {
        Ok(greeter) => println!("   de: {}", greeter.greet("World")),
        Err(e) => println!("   Error (expected): {}", e),
    }

    // -------------------------------------------------------------------------
    // 5. Dropping the registrar unregisters the product
    // -------------------------------------------------------------------------
    println!("\n5. Dropping the \"en\" registrar...");

    drop(duplicate);
    drop(english);
    println!("   contains(\"en\") = {}", greeters.contains("en"));
    println!("   Registered ids: {:?}", greeters.ids());

    println!("\n=== Example Complete ===");
}
