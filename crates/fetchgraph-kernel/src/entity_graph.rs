//! The root of a fetch plan.

use crate::error::{GraphError, Result};
use crate::merge;
use crate::metamodel::{self, SharedMetamodel};
use crate::node::{GraphNode, GraphState, NodeCore};
use crate::shape::GraphShape;
use crate::subgraph::Subgraph;
use fetchgraph_catalog::TypeKind;
use std::collections::BTreeMap;

/// A fetch plan rooted at an entity type.
///
/// Graphs start out [`GraphState::Dynamic`]. Resolving a named declaration
/// or calling [`EntityGraph::seal`] moves the whole tree to
/// [`GraphState::Fixed`], after which every mutation fails with
/// [`GraphError::Fixed`]. A fixed graph never changes again and can be
/// shared across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct EntityGraph {
    name: Option<String>,
    core: NodeCore,
    /// Subclass subgraphs keyed by strict subtype of the root.
    treated: BTreeMap<String, Subgraph>,
}

impl EntityGraph {
    /// Start an empty, unnamed, dynamic graph rooted at `root`.
    pub fn new(metamodel: SharedMetamodel, root: &str) -> Result<Self> {
        let managed = metamodel
            .managed_type(root)
            .ok_or_else(|| GraphError::UnknownManagedType {
                type_name: root.to_string(),
            })?;
        if managed.kind != TypeKind::Entity {
            return Err(GraphError::NotAnEntity {
                type_name: root.to_string(),
            });
        }
        let root = managed.name.clone();
        Ok(Self {
            name: None,
            core: NodeCore::new(root, GraphState::Dynamic, metamodel),
            treated: BTreeMap::new(),
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The root entity type.
    pub fn root(&self) -> &str {
        &self.core.managed_type
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Move the graph and everything below it to [`GraphState::Fixed`].
    /// Sealing a fixed graph does nothing.
    pub fn seal(&mut self) {
        if self.is_fixed() {
            return;
        }
        self.set_state(GraphState::Fixed);
        tracing::debug!(
            root = %self.core.managed_type,
            name = self.name.as_deref().unwrap_or(""),
            attribute_nodes = self.core.attribute_nodes.len(),
            "sealed entity graph"
        );
    }

    pub fn sealed(mut self) -> Self {
        self.seal();
        self
    }

    /// A dynamic, unnamed deep copy. The source graph is left as it is.
    pub fn to_dynamic(&self) -> EntityGraph {
        let mut copy = self.clone();
        copy.name = None;
        copy.set_state(GraphState::Dynamic);
        copy
    }

    pub fn treated_subgraphs(&self) -> impl Iterator<Item = &Subgraph> {
        self.treated.values()
    }

    pub fn treated_subgraph(&self, subtype: &str) -> Option<&Subgraph> {
        self.treated.get(subtype)
    }

    pub fn treated_subgraph_mut(&mut self, subtype: &str) -> Option<&mut Subgraph> {
        self.treated.get_mut(subtype)
    }

    /// A subgraph holding attribute nodes that apply only to instances of
    /// `subtype`, a strict subtype of the root.
    pub fn add_subclass_subgraph(&mut self, subtype: &str) -> Result<&mut Subgraph> {
        self.core.ensure_dynamic()?;
        let root = &self.core.managed_type;
        metamodel::require_subtype(self.core.metamodel.as_ref(), subtype, root)?;
        if subtype == root {
            return Err(GraphError::NotSubtype {
                subtype: subtype.to_string(),
                supertype: root.clone(),
            });
        }
        let state = self.core.state;
        let metamodel = &self.core.metamodel;
        Ok(self
            .treated
            .entry(subtype.to_string())
            .or_insert_with_key(|key| Subgraph::new(key.clone(), state, metamodel.clone())))
    }

    /// The effective graph for an instance of `runtime_type`: the root's
    /// attribute nodes merged with every subclass subgraph declared for
    /// `runtime_type` or one of its supertypes, the most general first.
    ///
    /// The returned subgraph is a fixed snapshot over `runtime_type`.
    pub fn view_for(&self, runtime_type: &str) -> Result<Subgraph> {
        let root = &self.core.managed_type;
        metamodel::require_subtype(self.core.metamodel.as_ref(), runtime_type, root)?;
        let mut core = self.core.clone();
        core.managed_type = runtime_type.to_string();
        merge::overlay_for(&mut core, &self.treated, runtime_type);
        core.set_state(GraphState::Fixed);
        Ok(Subgraph { core })
    }

    /// Deep union of `self` and `other` as a new dynamic, unnamed graph.
    ///
    /// Neither input is modified. Both must share the same root type.
    pub fn merge(&self, other: &EntityGraph) -> Result<EntityGraph> {
        if self.root() != other.root() {
            return Err(GraphError::TypeMismatch {
                expected: self.root().to_string(),
                actual: other.root().to_string(),
            });
        }
        let mut merged = self.to_dynamic();
        merge::merge_nodes(&mut merged.core.attribute_nodes, &other.core.attribute_nodes);
        merge::merge_subgraphs(&mut merged.treated, &other.treated);
        merged.set_state(GraphState::Dynamic);
        tracing::debug!(
            root = %merged.core.managed_type,
            attribute_nodes = merged.core.attribute_nodes.len(),
            "merged entity graphs"
        );
        Ok(merged)
    }

    /// Fold [`EntityGraph::merge`] over every graph, left to right.
    pub fn merge_all<'a>(graphs: impl IntoIterator<Item = &'a EntityGraph>) -> Result<EntityGraph> {
        let mut graphs = graphs.into_iter();
        let first = graphs.next().ok_or(GraphError::EmptyMerge)?;
        let mut merged = first.to_dynamic();
        for graph in graphs {
            merged = merged.merge(graph)?;
        }
        Ok(merged)
    }

    pub fn describe(&self) -> GraphShape {
        GraphShape {
            name: self.name.clone(),
            root: self.core.managed_type.clone(),
            state: self.core.state,
            attribute_nodes: self
                .core
                .attribute_nodes
                .values()
                .map(|node| node.describe())
                .collect(),
            subclass_subgraphs: self.treated.values().map(Subgraph::describe).collect(),
        }
    }

    pub fn render_tree(&self) -> String {
        self.describe().render_tree()
    }

    fn set_state(&mut self, state: GraphState) {
        self.core.set_state(state);
        for subgraph in self.treated.values_mut() {
            subgraph.core.set_state(state);
        }
    }
}

impl GraphNode for EntityGraph {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metamodel::StaticMetamodel;
    use fetchgraph_catalog::{AttributeKind, AttributeRow, FetchOption, TypeRow};

    fn metamodel() -> SharedMetamodel {
        StaticMetamodel::from_rows(&[
            TypeRow::new("Order", TypeKind::Entity)
                .attribute(AttributeRow::new("number", AttributeKind::Basic, "String"))
                .attribute(AttributeRow::new("customer", AttributeKind::ManyToOne, "Person")),
            TypeRow::new("RushOrder", TypeKind::Entity)
                .extends("Order")
                .attribute(AttributeRow::new("courier", AttributeKind::Basic, "String")),
            TypeRow::new("Person", TypeKind::Entity)
                .attribute(AttributeRow::new("name", AttributeKind::Basic, "String")),
            TypeRow::new("Address", TypeKind::Embeddable)
                .attribute(AttributeRow::new("city", AttributeKind::Basic, "String")),
        ])
        .unwrap()
        .shared()
    }

    #[test]
    fn root_must_be_a_known_entity() {
        let mm = metamodel();
        assert!(matches!(
            EntityGraph::new(mm.clone(), "Ghost"),
            Err(GraphError::UnknownManagedType { .. })
        ));
        assert!(matches!(
            EntityGraph::new(mm, "Address"),
            Err(GraphError::NotAnEntity { .. })
        ));
    }

    #[test]
    fn seal_reaches_every_level() {
        let mut graph = EntityGraph::new(metamodel(), "Order").unwrap();
        graph.add_subgraph("customer").unwrap();
        graph.add_subclass_subgraph("RushOrder").unwrap();
        graph.seal();

        let customer = graph.attribute_node("customer").unwrap();
        assert_eq!(customer.state(), GraphState::Fixed);
        assert!(customer.subgraph("Person").unwrap().is_fixed());
        assert!(graph.treated_subgraph("RushOrder").unwrap().is_fixed());

        let mut node = graph.attribute_node("customer").unwrap().clone();
        let err = node.add_fetch_option(FetchOption::Eager).unwrap_err();
        assert!(err.is_illegal_state());
    }

    #[test]
    fn to_dynamic_copies_without_touching_source() {
        let mut graph = EntityGraph::new(metamodel(), "Order").unwrap();
        graph.add_attribute_node("number").unwrap();
        graph.set_name("Order.basic");
        graph.seal();

        let mut copy = graph.to_dynamic();
        assert_eq!(copy.name(), None);
        copy.add_attribute_node("customer").unwrap();
        assert!(graph.is_fixed());
        assert_eq!(graph.attribute_names(), vec!["number"]);
        assert_eq!(copy.attribute_names(), vec!["customer", "number"]);
    }

    #[test]
    fn subclass_subgraph_requires_strict_subtype() {
        let mut graph = EntityGraph::new(metamodel(), "Order").unwrap();
        assert!(matches!(
            graph.add_subclass_subgraph("Order"),
            Err(GraphError::NotSubtype { .. })
        ));
        assert!(matches!(
            graph.add_subclass_subgraph("Person"),
            Err(GraphError::NotSubtype { .. })
        ));
        assert!(graph.add_subclass_subgraph("RushOrder").is_ok());
    }

    #[test]
    fn view_for_includes_subclass_nodes_only_for_subclass() {
        let mut graph = EntityGraph::new(metamodel(), "Order").unwrap();
        graph.add_attribute_node("number").unwrap();
        graph
            .add_subclass_subgraph("RushOrder")
            .unwrap()
            .add_attribute_node("courier")
            .unwrap();

        let rush = graph.view_for("RushOrder").unwrap();
        assert_eq!(rush.managed_type(), "RushOrder");
        assert_eq!(rush.attribute_names(), vec!["courier", "number"]);
        assert!(rush.is_fixed());

        let plain = graph.view_for("Order").unwrap();
        assert_eq!(plain.attribute_names(), vec!["number"]);

        assert!(graph.view_for("Person").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn merge_all_requires_input() {
        let none: Vec<EntityGraph> = Vec::new();
        assert_eq!(
            EntityGraph::merge_all(&none).unwrap_err(),
            GraphError::EmptyMerge
        );
    }
}
