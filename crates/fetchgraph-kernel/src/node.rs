//! Shared structure of graph roots and subgraphs.
//!
//! Both [`crate::EntityGraph`] and [`crate::Subgraph`] range over a managed
//! type and own a set of attribute nodes keyed by attribute name. The
//! [`GraphNode`] trait carries every structural operation they share.

use crate::attribute::AttributeNode;
use crate::error::{GraphError, Result};
use crate::metamodel::{self, Attribute, SharedMetamodel};
use crate::subgraph::Subgraph;
use fetchgraph_catalog::AttributeKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Mutability of a graph.
///
/// The only transition is `Dynamic -> Fixed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphState {
    Dynamic,
    Fixed,
}

impl fmt::Display for GraphState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphState::Dynamic => f.write_str("dynamic"),
            GraphState::Fixed => f.write_str("fixed"),
        }
    }
}

/// Node storage shared by roots and subgraphs.
#[derive(Clone)]
pub struct NodeCore {
    pub(crate) managed_type: String,
    pub(crate) attribute_nodes: BTreeMap<String, AttributeNode>,
    pub(crate) state: GraphState,
    pub(crate) metamodel: SharedMetamodel,
}

impl fmt::Debug for NodeCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCore")
            .field("managed_type", &self.managed_type)
            .field("state", &self.state)
            .field("attribute_nodes", &self.attribute_nodes)
            .finish()
    }
}

impl NodeCore {
    pub(crate) fn new(
        managed_type: impl Into<String>,
        state: GraphState,
        metamodel: SharedMetamodel,
    ) -> Self {
        Self {
            managed_type: managed_type.into(),
            attribute_nodes: BTreeMap::new(),
            state,
            metamodel,
        }
    }

    pub(crate) fn ensure_dynamic(&self) -> Result<()> {
        match self.state {
            GraphState::Dynamic => Ok(()),
            GraphState::Fixed => Err(GraphError::Fixed {
                managed_type: self.managed_type.clone(),
            }),
        }
    }

    pub(crate) fn lookup_attribute(&self, name: &str) -> Result<Attribute> {
        self.metamodel
            .attribute(&self.managed_type, name)
            .cloned()
            .ok_or_else(|| GraphError::UnknownAttribute {
                managed_type: self.managed_type.clone(),
                attribute: name.to_string(),
            })
    }

    pub(crate) fn node_entry(&mut self, attribute: Attribute) -> &mut AttributeNode {
        let state = self.state;
        let owner = &self.managed_type;
        let metamodel = &self.metamodel;
        self.attribute_nodes
            .entry(attribute.name.clone())
            .or_insert_with(|| {
                tracing::trace!(
                    managed_type = %owner,
                    attribute = %attribute.name,
                    "created attribute node"
                );
                AttributeNode::new(owner.clone(), attribute, state, metamodel.clone())
            })
    }

    pub(crate) fn set_state(&mut self, state: GraphState) {
        self.state = state;
        for node in self.attribute_nodes.values_mut() {
            node.set_state(state);
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for crate::EntityGraph {}
    impl Sealed for crate::Subgraph {}
}

/// Structural operations shared by entity graphs and subgraphs.
///
/// Every mutating method fails with [`GraphError::Fixed`] on a fixed graph
/// and validates its arguments before touching the graph, so a failed call
/// never leaves a partial change behind.
pub trait GraphNode: sealed::Sealed {
    #[doc(hidden)]
    fn core(&self) -> &NodeCore;

    #[doc(hidden)]
    fn core_mut(&mut self) -> &mut NodeCore;

    /// The entity or embeddable type this node ranges over.
    fn managed_type(&self) -> &str {
        &self.core().managed_type
    }

    fn state(&self) -> GraphState {
        self.core().state
    }

    fn is_fixed(&self) -> bool {
        self.core().state == GraphState::Fixed
    }

    fn metamodel(&self) -> &SharedMetamodel {
        &self.core().metamodel
    }

    /// Attribute nodes in attribute-name order.
    fn attribute_nodes(&self) -> impl Iterator<Item = &AttributeNode> {
        self.core().attribute_nodes.values()
    }

    fn attribute_names(&self) -> Vec<&str> {
        self.core()
            .attribute_nodes
            .keys()
            .map(String::as_str)
            .collect()
    }

    fn attribute_node(&self, name: &str) -> Option<&AttributeNode> {
        self.core().attribute_nodes.get(name)
    }

    /// Mutable access to an existing node. Mutations through it still fail
    /// on a fixed graph.
    fn attribute_node_mut(&mut self, name: &str) -> Option<&mut AttributeNode> {
        self.core_mut().attribute_nodes.get_mut(name)
    }

    fn has_attribute_node(&self, name: &str) -> bool {
        self.core().attribute_nodes.contains_key(name)
    }

    /// Select an attribute, returning the existing node when already
    /// selected.
    fn add_attribute_node(&mut self, name: &str) -> Result<&mut AttributeNode> {
        let core = self.core_mut();
        core.ensure_dynamic()?;
        let attribute = core.lookup_attribute(name)?;
        Ok(core.node_entry(attribute))
    }

    /// Select several attributes at once. Either all are added or, when any
    /// name is invalid, none is.
    fn add_attribute_nodes(&mut self, names: &[&str]) -> Result<()> {
        let core = self.core_mut();
        core.ensure_dynamic()?;
        let attributes = names
            .iter()
            .map(|name| core.lookup_attribute(name))
            .collect::<Result<Vec<_>>>()?;
        for attribute in attributes {
            core.node_entry(attribute);
        }
        Ok(())
    }

    /// Remove a node together with its subgraphs.
    ///
    /// Returns `false` when no node of that name exists; that case is not
    /// an error.
    fn remove_attribute_node(&mut self, name: &str) -> Result<bool> {
        let core = self.core_mut();
        core.ensure_dynamic()?;
        Ok(core.attribute_nodes.remove(name).is_some())
    }

    /// Remove every node whose attribute is of the given kind. Returns the
    /// number of nodes removed.
    fn remove_attribute_nodes(&mut self, kind: AttributeKind) -> Result<usize> {
        let core = self.core_mut();
        core.ensure_dynamic()?;
        let before = core.attribute_nodes.len();
        core.attribute_nodes
            .retain(|_, node| node.attribute().kind != kind);
        Ok(before - core.attribute_nodes.len())
    }

    /// The subgraph over the attribute's declared type, creating the
    /// attribute node if needed.
    fn add_subgraph(&mut self, attribute: &str) -> Result<&mut Subgraph> {
        let core = self.core_mut();
        core.ensure_dynamic()?;
        let attribute = core.lookup_attribute(attribute)?;
        let target = metamodel::value_type(core.metamodel.as_ref(), &core.managed_type, &attribute)?
            .name
            .clone();
        Ok(core.node_entry(attribute).subgraph_entry(target))
    }

    /// A subgraph that applies only when the attribute's value is an
    /// instance of `subtype`.
    fn add_treated_subgraph(&mut self, attribute: &str, subtype: &str) -> Result<&mut Subgraph> {
        let core = self.core_mut();
        core.ensure_dynamic()?;
        let attribute = core.lookup_attribute(attribute)?;
        let target = metamodel::value_type(core.metamodel.as_ref(), &core.managed_type, &attribute)?;
        metamodel::require_subtype(core.metamodel.as_ref(), subtype, &target.name)?;
        Ok(core.node_entry(attribute).subgraph_entry(subtype.to_string()))
    }

    /// The subgraph over the key type of a map-valued attribute.
    fn add_key_subgraph(&mut self, attribute: &str) -> Result<&mut Subgraph> {
        let core = self.core_mut();
        core.ensure_dynamic()?;
        let attribute = core.lookup_attribute(attribute)?;
        let target = metamodel::key_type(core.metamodel.as_ref(), &core.managed_type, &attribute)?
            .name
            .clone();
        Ok(core.node_entry(attribute).key_subgraph_entry(target))
    }

    fn add_treated_key_subgraph(
        &mut self,
        attribute: &str,
        subtype: &str,
    ) -> Result<&mut Subgraph> {
        let core = self.core_mut();
        core.ensure_dynamic()?;
        let attribute = core.lookup_attribute(attribute)?;
        let target = metamodel::key_type(core.metamodel.as_ref(), &core.managed_type, &attribute)?;
        metamodel::require_subtype(core.metamodel.as_ref(), subtype, &target.name)?;
        Ok(core
            .node_entry(attribute)
            .key_subgraph_entry(subtype.to_string()))
    }
}
