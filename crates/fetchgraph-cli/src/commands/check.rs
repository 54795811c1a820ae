use crate::support::{load_catalog_or_exit, print_json_or_exit};
use fetchgraph_catalog::{ValidationIssue, ValidationReport, validate_catalog};
use fetchgraph_kernel::GraphRegistry;
use serde_json::json;

const CATALOG_CHECK_KIND: &str = "fetchgraph.catalog_check.v1";
const GRAPH_RESOLUTION_FAILED: &str = "graph_resolution_failed";

pub fn run(catalog_path: &str, json_output: bool) {
    let catalog = load_catalog_or_exit(catalog_path);
    let mut report = validate_catalog(&catalog);
    let mut graphs = 0;

    // Resolution needs a well-formed document; skip it when rows are broken.
    if report.is_accepted() {
        match GraphRegistry::from_catalog(&catalog) {
            Ok(registry) => graphs = registry.len(),
            Err(err) => {
                tracing::debug!(error = %err, "graph resolution failed");
                let mut issues = report.issues;
                issues.push(ValidationIssue {
                    failure_class: GRAPH_RESOLUTION_FAILED.to_string(),
                    path: "graphs".to_string(),
                    message: err.to_string(),
                });
                report = ValidationReport::from_issues(issues);
            }
        }
    }

    if json_output {
        let payload = json!({
            "schema": 1,
            "checkKind": CATALOG_CHECK_KIND,
            "catalogPath": catalog_path,
            "types": catalog.types.len(),
            "graphs": graphs,
            "result": report.result,
            "failureClasses": report.failure_classes,
            "issues": report.issues,
        });
        print_json_or_exit(&payload, "catalog check");
    } else {
        println!("fetchgraph check");
        println!("  Catalog path: {catalog_path}");
        println!("  Types: {}", catalog.types.len());
        println!("  Graphs resolved: {graphs}");
        println!("  Result: {}", report.result);
        println!("  Failure classes: {}", report.failure_classes.len());
        for issue in &report.issues {
            println!("  - [{}] {}: {}", issue.failure_class, issue.path, issue.message);
        }
    }

    if !report.is_accepted() {
        std::process::exit(1);
    }
}
