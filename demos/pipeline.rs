//! End-to-end walk through chains, futures and parallel batches.
//!
//! ```bash
//! RUST_LOG=info cargo run --example pipeline
//! ```

use catena::{parallel, Chain, Effect, Future, Key, Registry, StateLayer};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

trait Network: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String, String>;
}

struct StaticNetwork;

impl Network for StaticNetwork {
    fn fetch(&self, url: &str) -> Result<String, String> {
        Ok(format!("data from {url}"))
    }
}

const NETWORK: Key<dyn Network> = Key::new("network");

type Deps = Arc<Registry>;

/// Reads `RUST_LOG`, defaulting to `warn`. Output goes to stderr.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

fn fetch_step(n: &i32, deps: &Deps) -> Chain<i32, Deps> {
    let effect = match deps.resolve(&NETWORK) {
        Ok(network) => match network.fetch("https://api.example.com/data") {
            Ok(data) => Effect::log(format!("Fetched {data}")),
            Err(error) => Effect::warn(format!("Error fetching data: {error}")),
        },
        Err(error) => Effect::warn(error.to_string()),
    };
    Chain::new(*n, Arc::clone(deps)).with_effect(effect)
}

fn main() {
    init_logging();

    let registry: Deps = Arc::new(Registry::new());
    registry.register(&NETWORK, Arc::new(StaticNetwork));

    // Synchronous chain
    let sync_chain = Chain::new(10, Arc::clone(&registry))
        .with_contract(|n: &i32| *n >= 0)
        .bind(|n, deps| {
            Chain::new(n + 10, Arc::clone(deps)).with_effect(Effect::log("Added 10 to the value"))
        })
        .bind(|n, deps| {
            Chain::new(n * 2, Arc::clone(deps)).with_effect(Effect::log("Multiplied the value by 2"))
        })
        .bind(fetch_step)
        .with_state(|s: StateLayer| s.increment());

    let outcome = sync_chain.run(StateLayer::new(0));
    match &outcome.error {
        Some(error) => println!("Synchronous chain error: {error}"),
        None => {
            println!("Synchronous chain: value {}, state {:?}", outcome.value, outcome.state);
            let (journal, result) = outcome.perform_effects();
            println!("Performed {} effects: {:?}", journal.len(), journal.descriptions());
            if result.is_failure() {
                println!("Some effects failed");
            }
        }
    }

    // Future-backed chain
    let answer = Future::spawn(|| {
        thread::sleep(Duration::from_millis(100));
        Ok::<_, std::io::Error>(42)
    });
    let future_chain = Chain::from_future(&answer, Arc::clone(&registry)).bind(|n, deps| {
        Chain::new(n * 3, Arc::clone(deps))
            .with_effect(Effect::log(format!("Future result multiplied by 3: {}", n * 3)))
    });

    match future_chain.run(StateLayer::new(0)).into_result() {
        Ok(value) => println!("Future chain: {value}"),
        Err(error) => println!("Future chain error: {error}"),
    }

    // Parallel batch
    let children = (1..=3)
        .map(|n| {
            Chain::new(n, Arc::clone(&registry))
                .with_effect(Effect::log(format!("Parallel chain {n}")))
        })
        .collect();

    let outcome = parallel(children, Arc::clone(&registry)).run(StateLayer::new(0));
    match &outcome.error {
        Some(error) => println!("Parallel error: {error}"),
        None => println!("Parallel results: {:?}", outcome.value),
    }
    let (journal, _) = outcome.perform_effects();
    println!("Parallel effects: {:?}", journal.descriptions());
}
