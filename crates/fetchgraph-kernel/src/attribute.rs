//! Attribute nodes: one selected attribute plus its nested scopes.

use crate::error::{GraphError, Result};
use crate::merge;
use crate::metamodel::{Attribute, SharedMetamodel};
use crate::node::{GraphState, NodeCore};
use crate::options::FetchOptions;
use crate::shape::AttributeShape;
use crate::subgraph::Subgraph;
use fetchgraph_catalog::{AttributeKind, FetchOption};
use std::collections::BTreeMap;
use std::fmt;

/// A selected attribute within a graph node.
///
/// Subgraphs are keyed by the type they range over: the attribute's declared
/// type for the plain subgraph, a subtype of it for a treated one. Key
/// subgraphs follow the same scheme over the map key type.
#[derive(Clone)]
pub struct AttributeNode {
    pub(crate) owner: String,
    pub(crate) attribute: Attribute,
    pub(crate) subgraphs: BTreeMap<String, Subgraph>,
    pub(crate) key_subgraphs: BTreeMap<String, Subgraph>,
    pub(crate) options: FetchOptions,
    pub(crate) state: GraphState,
    pub(crate) metamodel: SharedMetamodel,
}

impl fmt::Debug for AttributeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeNode")
            .field("attribute", &self.attribute.name)
            .field("kind", &self.attribute.kind)
            .field("options", &self.options)
            .field("subgraphs", &self.subgraphs)
            .field("key_subgraphs", &self.key_subgraphs)
            .finish()
    }
}

impl AttributeNode {
    pub(crate) fn new(
        owner: impl Into<String>,
        attribute: Attribute,
        state: GraphState,
        metamodel: SharedMetamodel,
    ) -> Self {
        Self {
            owner: owner.into(),
            attribute,
            subgraphs: BTreeMap::new(),
            key_subgraphs: BTreeMap::new(),
            options: FetchOptions::new(),
            state,
            metamodel,
        }
    }

    pub fn name(&self) -> &str {
        &self.attribute.name
    }

    pub fn attribute(&self) -> &Attribute {
        &self.attribute
    }

    pub fn kind(&self) -> AttributeKind {
        self.attribute.kind
    }

    pub fn state(&self) -> GraphState {
        self.state
    }

    pub fn subgraphs(&self) -> impl Iterator<Item = &Subgraph> {
        self.subgraphs.values()
    }

    /// The subgraph registered for exactly `type_name`, without inheritance
    /// merging. See [`AttributeNode::subgraph_for`] for the effective view.
    pub fn subgraph(&self, type_name: &str) -> Option<&Subgraph> {
        self.subgraphs.get(type_name)
    }

    pub fn subgraph_mut(&mut self, type_name: &str) -> Option<&mut Subgraph> {
        self.subgraphs.get_mut(type_name)
    }

    pub fn key_subgraphs(&self) -> impl Iterator<Item = &Subgraph> {
        self.key_subgraphs.values()
    }

    pub fn key_subgraph(&self, type_name: &str) -> Option<&Subgraph> {
        self.key_subgraphs.get(type_name)
    }

    pub fn key_subgraph_mut(&mut self, type_name: &str) -> Option<&mut Subgraph> {
        self.key_subgraphs.get_mut(type_name)
    }

    pub fn fetch_options(&self) -> &FetchOptions {
        &self.options
    }

    /// Attach an advisory fetch option, replacing any option in the same
    /// slot. Returns the displaced option.
    pub fn add_fetch_option(&mut self, option: FetchOption) -> Result<Option<FetchOption>> {
        self.ensure_dynamic()?;
        self.options.insert(option)
    }

    pub fn remove_fetch_option(&mut self, option: &FetchOption) -> Result<bool> {
        self.ensure_dynamic()?;
        Ok(self.options.remove(option))
    }

    /// The subgraph that applies when the attribute's value has runtime type
    /// `runtime_type`.
    ///
    /// Every subgraph registered for `runtime_type` or one of its supertypes
    /// contributes, the most general first. The result is a fixed snapshot;
    /// `None` when no registered subgraph applies.
    pub fn subgraph_for(&self, runtime_type: &str) -> Option<Subgraph> {
        self.narrow(&self.subgraphs, runtime_type)
    }

    pub fn key_subgraph_for(&self, runtime_type: &str) -> Option<Subgraph> {
        self.narrow(&self.key_subgraphs, runtime_type)
    }

    pub fn describe(&self) -> AttributeShape {
        AttributeShape {
            name: self.attribute.name.clone(),
            kind: self.attribute.kind,
            fetch_options: self.options.iter().cloned().collect(),
            subgraphs: self.subgraphs.values().map(Subgraph::describe).collect(),
            key_subgraphs: self
                .key_subgraphs
                .values()
                .map(Subgraph::describe)
                .collect(),
        }
    }

    fn narrow(&self, layers: &BTreeMap<String, Subgraph>, runtime_type: &str) -> Option<Subgraph> {
        let mut core = NodeCore::new(runtime_type, GraphState::Fixed, self.metamodel.clone());
        if merge::overlay_for(&mut core, layers, runtime_type) == 0 {
            return None;
        }
        core.set_state(GraphState::Fixed);
        Some(Subgraph { core })
    }

    fn ensure_dynamic(&self) -> Result<()> {
        match self.state {
            GraphState::Dynamic => Ok(()),
            GraphState::Fixed => Err(GraphError::Fixed {
                managed_type: self.owner.clone(),
            }),
        }
    }

    pub(crate) fn subgraph_entry(&mut self, type_name: String) -> &mut Subgraph {
        let state = self.state;
        let metamodel = &self.metamodel;
        self.subgraphs
            .entry(type_name)
            .or_insert_with_key(|key| Subgraph::new(key.clone(), state, metamodel.clone()))
    }

    pub(crate) fn key_subgraph_entry(&mut self, type_name: String) -> &mut Subgraph {
        let state = self.state;
        let metamodel = &self.metamodel;
        self.key_subgraphs
            .entry(type_name)
            .or_insert_with_key(|key| Subgraph::new(key.clone(), state, metamodel.clone()))
    }

    pub(crate) fn set_state(&mut self, state: GraphState) {
        self.state = state;
        for subgraph in self
            .subgraphs
            .values_mut()
            .chain(self.key_subgraphs.values_mut())
        {
            subgraph.core.set_state(state);
        }
    }
}
