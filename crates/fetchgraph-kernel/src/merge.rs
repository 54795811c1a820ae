//! Deep union of graph structure.
//!
//! Merging never overwrites: attribute nodes present on both sides have
//! their options absorbed and their subgraphs merged recursively. Callers
//! merge into an owned copy, so inputs are never touched.

use crate::attribute::AttributeNode;
use crate::node::NodeCore;
use crate::subgraph::Subgraph;
use std::collections::BTreeMap;

pub(crate) fn merge_nodes(
    into: &mut BTreeMap<String, AttributeNode>,
    from: &BTreeMap<String, AttributeNode>,
) {
    for (name, incoming) in from {
        match into.get_mut(name) {
            Some(existing) => merge_attribute(existing, incoming),
            None => {
                into.insert(name.clone(), incoming.clone());
            }
        }
    }
}

fn merge_attribute(into: &mut AttributeNode, from: &AttributeNode) {
    into.options.absorb(&from.options);
    merge_subgraphs(&mut into.subgraphs, &from.subgraphs);
    merge_subgraphs(&mut into.key_subgraphs, &from.key_subgraphs);
}

/// Merge subgraph maps keyed by managed type.
pub(crate) fn merge_subgraphs(
    into: &mut BTreeMap<String, Subgraph>,
    from: &BTreeMap<String, Subgraph>,
) {
    for (type_name, incoming) in from {
        match into.get_mut(type_name) {
            Some(existing) => {
                merge_nodes(&mut existing.core.attribute_nodes, &incoming.core.attribute_nodes)
            }
            None => {
                into.insert(type_name.clone(), incoming.clone());
            }
        }
    }
}

/// Overlay every layer registered for `runtime_type` or one of its
/// supertypes onto `target`, most general first. Returns the number of
/// layers applied.
pub(crate) fn overlay_for(
    target: &mut NodeCore,
    layers: &BTreeMap<String, Subgraph>,
    runtime_type: &str,
) -> usize {
    let chain: Vec<String> = target
        .metamodel
        .supertype_chain(runtime_type)
        .into_iter()
        .map(|ty| ty.name.clone())
        .collect();
    let mut applied = 0;
    for type_name in chain.iter().rev() {
        if let Some(layer) = layers.get(type_name) {
            merge_nodes(&mut target.attribute_nodes, &layer.core.attribute_nodes);
            applied += 1;
        }
    }
    applied
}
