//! Document-level catalog validation.
//!
//! These checks only look at the catalog rows themselves. Whether a named
//! graph resolves against the metamodel is decided by the kernel.

use crate::document::{CATALOG_KIND, CATALOG_SCHEMA, Catalog};
use crate::rows::{AttributeKind, TypeKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub mod failure_class {
    pub const SCHEMA_MISMATCH: &str = "catalog_schema_mismatch";
    pub const EMPTY_NAME: &str = "catalog_empty_name";
    pub const DUPLICATE_TYPE: &str = "catalog_duplicate_type";
    pub const UNKNOWN_SUPERTYPE: &str = "catalog_unknown_supertype";
    pub const SUPERTYPE_CYCLE: &str = "catalog_supertype_cycle";
    pub const DUPLICATE_ATTRIBUTE: &str = "catalog_duplicate_attribute";
    pub const UNKNOWN_ATTRIBUTE_TYPE: &str = "catalog_unknown_attribute_type";
    pub const ATTRIBUTE_TYPE_MISMATCH: &str = "catalog_attribute_type_mismatch";
    pub const KEY_TYPE_MISPLACED: &str = "catalog_key_type_misplaced";
    pub const DUPLICATE_GRAPH: &str = "catalog_duplicate_graph";
    pub const UNKNOWN_GRAPH_ROOT: &str = "catalog_unknown_graph_root";
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub failure_class: String,
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub result: String,
    pub failure_classes: Vec<String>,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn from_issues(mut issues: Vec<ValidationIssue>) -> Self {
        issues.sort_by(|a, b| {
            (&a.path, &a.failure_class, &a.message).cmp(&(&b.path, &b.failure_class, &b.message))
        });
        let failure_classes: Vec<String> = issues
            .iter()
            .map(|issue| issue.failure_class.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self {
            result: if issues.is_empty() {
                "accepted".to_string()
            } else {
                "rejected".to_string()
            },
            failure_classes,
            issues,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.issues.is_empty()
    }
}

fn push_issue(
    issues: &mut Vec<ValidationIssue>,
    failure_class: &str,
    path: String,
    message: String,
) {
    issues.push(ValidationIssue {
        failure_class: failure_class.to_string(),
        path,
        message,
    });
}

pub fn validate_catalog(catalog: &Catalog) -> ValidationReport {
    let mut issues = Vec::new();
    if catalog.schema != CATALOG_SCHEMA {
        push_issue(
            &mut issues,
            failure_class::SCHEMA_MISMATCH,
            "schema".to_string(),
            format!("schema must be {CATALOG_SCHEMA}, got {}", catalog.schema),
        );
    }
    if catalog.catalog_kind.trim() != CATALOG_KIND {
        push_issue(
            &mut issues,
            failure_class::SCHEMA_MISMATCH,
            "catalogKind".to_string(),
            format!("catalogKind must equal {CATALOG_KIND:?}"),
        );
    }

    let mut kinds: BTreeMap<&str, TypeKind> = BTreeMap::new();
    for (idx, row) in catalog.types.iter().enumerate() {
        let path = format!("types[{idx}].name");
        let name = row.name.trim();
        if name.is_empty() {
            push_issue(
                &mut issues,
                failure_class::EMPTY_NAME,
                path,
                "type name must be non-empty".to_string(),
            );
        } else if kinds.insert(name, row.kind).is_some() {
            push_issue(
                &mut issues,
                failure_class::DUPLICATE_TYPE,
                path,
                format!("duplicate type {name}"),
            );
        }
    }

    let supertypes: BTreeMap<&str, &str> = catalog
        .types
        .iter()
        .filter_map(|row| {
            row.supertype
                .as_deref()
                .map(|sup| (row.name.trim(), sup.trim()))
        })
        .collect();

    for (idx, row) in catalog.types.iter().enumerate() {
        let path = format!("types[{idx}]");
        if let Some(supertype) = row.supertype.as_deref().map(str::trim) {
            if !kinds.contains_key(supertype) {
                push_issue(
                    &mut issues,
                    failure_class::UNKNOWN_SUPERTYPE,
                    format!("{path}.supertype"),
                    format!("unknown supertype {supertype}"),
                );
            } else if in_supertype_cycle(row.name.trim(), &supertypes) {
                push_issue(
                    &mut issues,
                    failure_class::SUPERTYPE_CYCLE,
                    format!("{path}.supertype"),
                    format!("type {} is its own supertype", row.name.trim()),
                );
            }
        }

        let mut attribute_names = BTreeSet::new();
        for (attr_idx, attribute) in row.attributes.iter().enumerate() {
            let attr_path = format!("{path}.attributes[{attr_idx}]");
            let attr_name = attribute.name.trim();
            if attr_name.is_empty() {
                push_issue(
                    &mut issues,
                    failure_class::EMPTY_NAME,
                    format!("{attr_path}.name"),
                    "attribute name must be non-empty".to_string(),
                );
            } else if !attribute_names.insert(attr_name) {
                push_issue(
                    &mut issues,
                    failure_class::DUPLICATE_ATTRIBUTE,
                    format!("{attr_path}.name"),
                    format!("duplicate attribute {attr_name} on {}", row.name.trim()),
                );
            }
            check_attribute_type(
                &mut issues,
                &attr_path,
                attribute.kind,
                attribute.type_name.trim(),
                &kinds,
            );
            if let Some(key_type) = attribute.key_type.as_deref() {
                if !attribute.kind.is_plural() {
                    push_issue(
                        &mut issues,
                        failure_class::KEY_TYPE_MISPLACED,
                        format!("{attr_path}.keyType"),
                        format!("keyType is only valid on plural attributes, not {}", attribute.kind),
                    );
                } else if key_type.trim().is_empty() {
                    push_issue(
                        &mut issues,
                        failure_class::EMPTY_NAME,
                        format!("{attr_path}.keyType"),
                        "keyType must be non-empty when present".to_string(),
                    );
                }
            }
        }
    }

    let mut graph_names = BTreeSet::new();
    for (idx, decl) in catalog.graphs.iter().enumerate() {
        let path = format!("graphs[{idx}]");
        let name = decl.effective_name().trim();
        if name.is_empty() {
            push_issue(
                &mut issues,
                failure_class::EMPTY_NAME,
                format!("{path}.name"),
                "graph must have a name or a root".to_string(),
            );
        } else if !graph_names.insert(name.to_string()) {
            push_issue(
                &mut issues,
                failure_class::DUPLICATE_GRAPH,
                format!("{path}.name"),
                format!("duplicate graph name {name}"),
            );
        }
        if !matches!(kinds.get(decl.root.trim()), Some(TypeKind::Entity)) {
            push_issue(
                &mut issues,
                failure_class::UNKNOWN_GRAPH_ROOT,
                format!("{path}.root"),
                format!("root {} is not a declared entity", decl.root.trim()),
            );
        }
    }

    ValidationReport::from_issues(issues)
}

fn check_attribute_type(
    issues: &mut Vec<ValidationIssue>,
    attr_path: &str,
    kind: AttributeKind,
    type_name: &str,
    kinds: &BTreeMap<&str, TypeKind>,
) {
    let declared = kinds.get(type_name).copied();
    let expected = match kind {
        // Basic and element-collection attributes may name types outside the
        // catalog (strings, numbers, dates).
        AttributeKind::Basic | AttributeKind::ElementCollection => return,
        AttributeKind::Embedded => TypeKind::Embeddable,
        _ => TypeKind::Entity,
    };
    match declared {
        None => push_issue(
            issues,
            failure_class::UNKNOWN_ATTRIBUTE_TYPE,
            format!("{attr_path}.type"),
            format!("unknown type {type_name} for {kind} attribute"),
        ),
        Some(actual) if actual != expected => push_issue(
            issues,
            failure_class::ATTRIBUTE_TYPE_MISMATCH,
            format!("{attr_path}.type"),
            format!("{kind} attribute must reference a {expected:?} type, {type_name} is {actual:?}"),
        ),
        Some(_) => {}
    }
}

fn in_supertype_cycle(start: &str, supertypes: &BTreeMap<&str, &str>) -> bool {
    let mut seen = BTreeSet::new();
    let mut current = start;
    while let Some(next) = supertypes.get(current) {
        if *next == start {
            return true;
        }
        if !seen.insert(*next) {
            // A cycle further up the chain that does not include `start`.
            return false;
        }
        current = *next;
    }
    false
}
