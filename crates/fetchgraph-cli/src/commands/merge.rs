use crate::support::{load_registry_or_exit, print_json_or_exit, resolve_graph_or_exit};
use fetchgraph_kernel::EntityGraph;

pub fn run(catalog_path: &str, names: &[String], json_output: bool) {
    let registry = load_registry_or_exit(catalog_path);
    let graphs: Vec<_> = names
        .iter()
        .map(|name| resolve_graph_or_exit(&registry, name))
        .collect();
    let merged = EntityGraph::merge_all(graphs.iter().map(|graph| graph.as_ref())).unwrap_or_else(
        |e| {
            eprintln!("error: {e}");
            std::process::exit(1);
        },
    );
    if json_output {
        print_json_or_exit(&merged.describe(), "merged graph");
    } else {
        println!("{}", merged.render_tree());
    }
}
