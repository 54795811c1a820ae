use crate::support::{load_registry_or_exit, print_json_or_exit, resolve_graph_or_exit};

pub fn run(catalog_path: &str, name: &str, json_output: bool) {
    let registry = load_registry_or_exit(catalog_path);
    let graph = resolve_graph_or_exit(&registry, name);
    if json_output {
        print_json_or_exit(&graph.describe(), "graph");
    } else {
        println!("{}", graph.render_tree());
    }
}
