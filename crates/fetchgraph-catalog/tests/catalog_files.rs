//! Integration tests: load catalog documents from tests/fixtures/ and check
//! their validation reports.

use fetchgraph_catalog::{Catalog, FetchOption, failure_class, validate_catalog};
use std::path::PathBuf;

fn load_fixture(name: &str) -> Catalog {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    Catalog::load(&path).unwrap_or_else(|e| panic!("failed to load {}: {e}", path.display()))
}

#[test]
fn toml_catalog_is_accepted() {
    let catalog = load_fixture("library.toml");
    let report = validate_catalog(&catalog);
    assert!(report.is_accepted(), "{report:#?}");

    let graph = catalog.find_graph("Book.withAuthor").expect("graph declared");
    let author = &graph.attribute_nodes[0];
    assert_eq!(author.subgraph.as_deref(), Some("author"));
    assert_eq!(
        author.fetch_options,
        vec![FetchOption::Eager, FetchOption::BatchSize(32)]
    );
    let chapters = &catalog.find_type("Book").unwrap().attributes[2];
    assert_eq!(chapters.key_type.as_deref(), Some("int"));
}

#[test]
fn broken_catalog_reports_every_issue() {
    let report = validate_catalog(&load_fixture("broken.json"));
    assert_eq!(report.result, "rejected");
    assert_eq!(
        report.failure_classes,
        vec![
            failure_class::DUPLICATE_ATTRIBUTE.to_string(),
            failure_class::UNKNOWN_GRAPH_ROOT.to_string(),
            failure_class::UNKNOWN_SUPERTYPE.to_string(),
        ]
    );
    let paths: Vec<&str> = report.issues.iter().map(|issue| issue.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["graphs[0].root", "types[0].attributes[1].name", "types[0].supertype"]
    );
}

#[test]
fn report_serializes_in_camel_case() {
    let report = validate_catalog(&load_fixture("broken.json"));
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["result"], "rejected");
    assert!(json["failureClasses"].is_array());
    assert_eq!(json["issues"][0]["failureClass"], "catalog_unknown_graph_root");
}
