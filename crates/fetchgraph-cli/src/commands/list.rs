use crate::support::{load_registry_or_exit, print_json_or_exit};
use fetchgraph_kernel::{EntityGraph, GraphNode};
use serde_json::{Value, json};
use std::sync::Arc;

pub fn run(catalog_path: &str, type_name: Option<String>, json_output: bool) {
    let registry = load_registry_or_exit(catalog_path);
    let graphs: Vec<&Arc<EntityGraph>> = match type_name.as_deref() {
        Some(type_name) => registry.graphs_for_type(type_name),
        None => registry
            .names()
            .filter_map(|name| registry.get(name))
            .collect(),
    };

    if json_output {
        let rows: Vec<Value> = graphs
            .iter()
            .map(|graph| {
                json!({
                    "name": graph.name(),
                    "root": graph.root(),
                    "attributeNodes": graph.attribute_names().len(),
                    "subclassSubgraphs": graph.treated_subgraphs().count(),
                })
            })
            .collect();
        let payload = json!({
            "catalogPath": catalog_path,
            "type": type_name,
            "graphs": rows,
        });
        print_json_or_exit(&payload, "graph list");
        return;
    }

    for graph in graphs {
        println!("{} ({})", graph.name().unwrap_or_default(), graph.root());
    }
}
