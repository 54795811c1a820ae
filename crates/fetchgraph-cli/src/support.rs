use fetchgraph_catalog::Catalog;
use fetchgraph_kernel::{EntityGraph, GraphRegistry};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn load_catalog_or_exit(path: &str) -> Catalog {
    Catalog::load(path).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

pub fn load_registry_or_exit(catalog_path: &str) -> GraphRegistry {
    let catalog = load_catalog_or_exit(catalog_path);
    GraphRegistry::from_catalog(&catalog).unwrap_or_else(|e| {
        eprintln!("error: failed to load graphs from {catalog_path}: {e}");
        std::process::exit(1);
    })
}

pub fn resolve_graph_or_exit(registry: &GraphRegistry, name: &str) -> Arc<EntityGraph> {
    registry.resolve(name).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    })
}

pub fn print_json_or_exit<T: Serialize>(payload: &T, label: &str) {
    let rendered = serde_json::to_string_pretty(payload).unwrap_or_else(|err| {
        eprintln!("error: failed to render {label} payload: {err}");
        std::process::exit(2);
    });
    println!("{rendered}");
}
