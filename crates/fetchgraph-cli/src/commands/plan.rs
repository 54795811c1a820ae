use crate::cli::SemanticArg;
use crate::support::{load_registry_or_exit, print_json_or_exit, resolve_graph_or_exit};
use fetchgraph_kernel::{FetchOption, GraphNode, GraphSemantic};
use serde::Serialize;

const PLAN_KIND: &str = "fetchgraph.plan.v1";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanRow {
    name: String,
    kind: String,
    selected: bool,
    fetch: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fetch_options: Vec<FetchOption>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanPayload {
    schema: u32,
    plan_kind: &'static str,
    graph: String,
    runtime_type: String,
    semantic: GraphSemantic,
    hint: &'static str,
    attributes: Vec<PlanRow>,
}

pub fn run(
    catalog_path: &str,
    name: &str,
    runtime_type: Option<String>,
    semantic: SemanticArg,
    json_output: bool,
) {
    let registry = load_registry_or_exit(catalog_path);
    let graph = resolve_graph_or_exit(&registry, name);
    let semantic = match semantic {
        SemanticArg::Fetch => GraphSemantic::Fetch,
        SemanticArg::Load => GraphSemantic::Load,
    };
    let runtime_type = runtime_type.unwrap_or_else(|| graph.root().to_string());
    let view = graph.view_for(&runtime_type).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    let attributes: Vec<PlanRow> = registry
        .metamodel()
        .attributes_of(&runtime_type)
        .into_iter()
        .map(|attribute| {
            let node = view.attribute_node(&attribute.name);
            PlanRow {
                name: attribute.name.clone(),
                kind: attribute.kind.to_string(),
                selected: node.is_some(),
                fetch: semantic.should_fetch(node, attribute.default_eager()),
                fetch_options: node
                    .map(|node| node.fetch_options().iter().cloned().collect())
                    .unwrap_or_default(),
            }
        })
        .collect();

    if json_output {
        let payload = PlanPayload {
            schema: 1,
            plan_kind: PLAN_KIND,
            graph: name.to_string(),
            runtime_type,
            semantic,
            hint: semantic.hint_name(),
            attributes,
        };
        print_json_or_exit(&payload, "plan");
        return;
    }

    println!("fetchgraph plan");
    println!("  Graph: {name}");
    println!("  Runtime type: {runtime_type}");
    println!("  Semantic: {semantic} ({})", semantic.hint_name());
    for row in &attributes {
        let decision = if row.fetch { "fetch" } else { "skip" };
        println!("  {decision:<5} {} ({})", row.name, row.kind);
    }
}
