//! Named graph registry.
//!
//! A registry resolves every declaration when it is loaded, so a broken
//! declaration is reported at load time rather than at first use. Resolved
//! graphs are fixed and handed out behind `Arc`.

use crate::entity_graph::EntityGraph;
use crate::error::{GraphError, Result};
use crate::metamodel::{SharedMetamodel, StaticMetamodel};
use crate::resolve::resolve_declaration;
use fetchgraph_catalog::{Catalog, NamedGraphDecl};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<GraphRegistry> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct GraphRegistry {
    metamodel: SharedMetamodel,
    graphs: BTreeMap<String, Arc<EntityGraph>>,
}

impl GraphRegistry {
    pub fn new(metamodel: SharedMetamodel) -> Self {
        Self {
            metamodel,
            graphs: BTreeMap::new(),
        }
    }

    /// Resolve and register every declaration.
    pub fn load(metamodel: SharedMetamodel, declarations: &[NamedGraphDecl]) -> Result<Self> {
        let mut registry = Self::new(metamodel);
        for decl in declarations {
            let name = decl.effective_name();
            if registry.graphs.contains_key(name) {
                return Err(GraphError::DuplicateGraphName(name.to_string()));
            }
            let graph = resolve_declaration(&registry.metamodel, decl)?;
            registry.graphs.insert(name.to_string(), Arc::new(graph));
        }
        tracing::debug!(graphs = registry.graphs.len(), "loaded graph registry");
        Ok(registry)
    }

    /// Build the metamodel from the catalog's types, then load its graphs.
    pub fn from_catalog(catalog: &Catalog) -> Result<Self> {
        let metamodel = StaticMetamodel::from_catalog(catalog)?.shared();
        Self::load(metamodel, &catalog.graphs)
    }

    /// Register a fixed, named copy of a programmatically built graph.
    pub fn register(&mut self, name: &str, graph: &EntityGraph) -> Result<Arc<EntityGraph>> {
        let name = name.trim();
        if self.graphs.contains_key(name) {
            return Err(GraphError::DuplicateGraphName(name.to_string()));
        }
        let mut stored = graph.clone();
        stored.set_name(name);
        let stored = Arc::new(stored.sealed());
        self.graphs.insert(name.to_string(), stored.clone());
        tracing::debug!(graph = name, root = %stored.root(), "registered entity graph");
        Ok(stored)
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<EntityGraph>> {
        self.get(name)
            .cloned()
            .ok_or_else(|| GraphError::UnknownGraph(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<EntityGraph>> {
        self.graphs.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.graphs.keys().map(String::as_str)
    }

    /// Graphs applicable to instances of `type_name`: those rooted at the
    /// type itself or at one of its supertypes.
    pub fn graphs_for_type(&self, type_name: &str) -> Vec<&Arc<EntityGraph>> {
        self.graphs
            .values()
            .filter(|graph| self.metamodel.is_subtype(type_name, graph.root()))
            .collect()
    }

    pub fn metamodel(&self) -> &SharedMetamodel {
        &self.metamodel
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

/// Install the process-wide registry. Succeeds once.
pub fn install_global(registry: GraphRegistry) -> Result<&'static GraphRegistry> {
    GLOBAL
        .set(registry)
        .map_err(|_| GraphError::RegistryInstalled)?;
    GLOBAL.get().ok_or(GraphError::RegistryInstalled)
}

pub fn global() -> Option<&'static GraphRegistry> {
    GLOBAL.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::GraphNode;
    use fetchgraph_catalog::{AttributeKind, AttributeNodeDecl, AttributeRow, TypeKind, TypeRow};

    fn metamodel() -> SharedMetamodel {
        StaticMetamodel::from_rows(&[
            TypeRow::new("Account", TypeKind::Entity)
                .attribute(AttributeRow::new("owner", AttributeKind::Basic, "String")),
            TypeRow::new("SavingsAccount", TypeKind::Entity)
                .extends("Account")
                .attribute(AttributeRow::new("rate", AttributeKind::Basic, "Decimal")),
        ])
        .unwrap()
        .shared()
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let decls = vec![
            NamedGraphDecl::new("Account").attribute(AttributeNodeDecl::new("owner")),
            NamedGraphDecl::new("Account"),
        ];
        let err = GraphRegistry::load(metamodel(), &decls).unwrap_err();
        assert_eq!(err, GraphError::DuplicateGraphName("Account".to_string()));
    }

    #[test]
    fn graphs_for_type_includes_supertype_roots() {
        let decls = vec![
            NamedGraphDecl::new("Account"),
            NamedGraphDecl::new("SavingsAccount").named("Savings.rates"),
        ];
        let registry = GraphRegistry::load(metamodel(), &decls).unwrap();
        let names = |type_name: &str| -> Vec<String> {
            registry
                .graphs_for_type(type_name)
                .into_iter()
                .filter_map(|graph| graph.name().map(str::to_string))
                .collect()
        };
        assert_eq!(names("SavingsAccount"), vec!["Account", "Savings.rates"]);
        assert_eq!(names("Account"), vec!["Account"]);
    }

    #[test]
    fn register_stores_a_fixed_copy() {
        let mut registry = GraphRegistry::new(metamodel());
        let mut graph = EntityGraph::new(registry.metamodel().clone(), "Account").unwrap();
        graph.add_attribute_node("owner").unwrap();

        let stored = registry.register("Account.owner", &graph).unwrap();
        assert!(stored.is_fixed());
        assert_eq!(stored.name(), Some("Account.owner"));
        assert!(!graph.is_fixed());
        assert!(registry.register("Account.owner", &graph).is_err());
        assert!(registry.resolve("nope").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn global_installs_once() {
        let first = install_global(GraphRegistry::new(metamodel())).unwrap();
        assert!(first.is_empty());
        let err = install_global(GraphRegistry::new(metamodel())).unwrap_err();
        assert!(err.is_illegal_state());
        assert!(global().is_some());
    }
}
