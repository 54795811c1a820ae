//! Resolution of named graph declarations into fixed entity graphs.
//!
//! A declaration lists attribute nodes for its root and a set of named
//! subgraph blocks. Attribute nodes reference blocks by name; every block
//! carrying that name contributes, the untyped one as the plain subgraph and
//! typed ones as treated subgraphs. References are resolved once the whole
//! declaration is known. An unresolved reference anywhere in the declaration
//! fails resolution, and so does a block that no attribute node reaches.

use crate::entity_graph::EntityGraph;
use crate::error::{GraphError, Result};
use crate::metamodel::SharedMetamodel;
use crate::node::GraphNode;
use fetchgraph_catalog::{AttributeNodeDecl, NamedGraphDecl, SubgraphDecl};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Copy)]
enum Scope {
    Value,
    Key,
}

struct Resolver<'d> {
    graph: String,
    blocks: BTreeMap<&'d str, Vec<&'d SubgraphDecl>>,
    /// Block names currently being expanded, outermost first.
    stack: Vec<&'d str>,
    expanded: BTreeSet<&'d str>,
}

impl<'d> Resolver<'d> {
    fn new(decl: &'d NamedGraphDecl) -> Self {
        let mut blocks: BTreeMap<&str, Vec<&SubgraphDecl>> = BTreeMap::new();
        for block in &decl.subgraphs {
            blocks.entry(block.name.trim()).or_default().push(block);
        }
        Self {
            graph: decl.effective_name().to_string(),
            blocks,
            stack: Vec::new(),
            expanded: BTreeSet::new(),
        }
    }

    /// Every `subgraph`/`keySubgraph` reference in `decl`, including those
    /// inside blocks, must name a declared block.
    fn check_references(&self, decl: &'d NamedGraphDecl) -> Result<()> {
        let nodes = decl
            .subgraphs
            .iter()
            .chain(&decl.subclass_subgraphs)
            .flat_map(|block| &block.attribute_nodes)
            .chain(&decl.attribute_nodes);
        for node in nodes {
            let references = [node.subgraph.as_deref(), node.key_subgraph.as_deref()];
            for reference in references.into_iter().flatten().map(str::trim) {
                if !self.blocks.contains_key(reference) {
                    return Err(GraphError::UndeclaredSubgraph {
                        graph: self.graph.clone(),
                        subgraph: reference.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_all_expanded(&self) -> Result<()> {
        match self.blocks.keys().find(|name| !self.expanded.contains(*name)) {
            Some(unused) => Err(GraphError::UnreferencedSubgraph {
                graph: self.graph.clone(),
                subgraph: unused.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn apply_nodes<N: GraphNode>(&mut self, node: &mut N, decls: &'d [AttributeNodeDecl]) -> Result<()> {
        for decl in decls {
            let value = decl.value.trim();
            let attribute = node.add_attribute_node(value)?;
            for option in &decl.fetch_options {
                attribute.add_fetch_option(option.clone())?;
            }
            if let Some(reference) = decl.subgraph.as_deref() {
                self.expand(node, value, reference.trim(), Scope::Value)?;
            }
            if let Some(reference) = decl.key_subgraph.as_deref() {
                self.expand(node, value, reference.trim(), Scope::Key)?;
            }
        }
        Ok(())
    }

    fn expand<N: GraphNode>(
        &mut self,
        node: &mut N,
        attribute: &str,
        reference: &'d str,
        scope: Scope,
    ) -> Result<()> {
        let Some(blocks) = self.blocks.get(reference).cloned() else {
            return Err(GraphError::UndeclaredSubgraph {
                graph: self.graph.clone(),
                subgraph: reference.to_string(),
            });
        };
        if self.stack.contains(&reference) {
            return Err(GraphError::CyclicSubgraph {
                graph: self.graph.clone(),
                subgraph: reference.to_string(),
            });
        }
        self.stack.push(reference);
        self.expanded.insert(reference);
        for block in blocks {
            let subtype = block.type_name.as_deref().map(str::trim);
            let subgraph = match (scope, subtype) {
                (Scope::Value, None) => node.add_subgraph(attribute)?,
                (Scope::Value, Some(subtype)) => node.add_treated_subgraph(attribute, subtype)?,
                (Scope::Key, None) => node.add_key_subgraph(attribute)?,
                (Scope::Key, Some(subtype)) => node.add_treated_key_subgraph(attribute, subtype)?,
            };
            self.apply_nodes(subgraph, &block.attribute_nodes)?;
        }
        self.stack.pop();
        Ok(())
    }
}

/// Build the fixed graph described by `decl`.
///
/// The graph is named by [`NamedGraphDecl::effective_name`].
pub fn resolve_declaration(metamodel: &SharedMetamodel, decl: &NamedGraphDecl) -> Result<EntityGraph> {
    let name = decl.effective_name().to_string();
    let mut graph = EntityGraph::new(metamodel.clone(), decl.root.trim())?;
    let mut resolver = Resolver::new(decl);
    resolver.check_references(decl)?;

    if decl.include_all_attributes {
        let names: Vec<&str> = metamodel
            .attributes_of(graph.root())
            .into_iter()
            .map(|attribute| attribute.name.as_str())
            .collect();
        graph.add_attribute_nodes(&names)?;
    }
    resolver.apply_nodes(&mut graph, &decl.attribute_nodes)?;

    for block in &decl.subclass_subgraphs {
        let Some(subtype) = block.type_name.as_deref().map(str::trim) else {
            return Err(GraphError::MissingSubclassType {
                graph: name,
                subgraph: block.name.clone(),
            });
        };
        let subgraph = graph.add_subclass_subgraph(subtype)?;
        resolver.apply_nodes(subgraph, &block.attribute_nodes)?;
    }
    resolver.check_all_expanded()?;

    graph.set_name(name);
    graph.seal();
    tracing::debug!(
        graph = graph.name().unwrap_or_default(),
        root = %graph.root(),
        "resolved named entity graph"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metamodel::StaticMetamodel;
    use fetchgraph_catalog::{AttributeKind, AttributeRow, FetchOption, TypeKind, TypeRow};

    fn metamodel() -> SharedMetamodel {
        StaticMetamodel::from_rows(&[
            TypeRow::new("Employee", TypeKind::Entity)
                .attribute(AttributeRow::new("name", AttributeKind::Basic, "String"))
                .attribute(AttributeRow::new("manager", AttributeKind::ManyToOne, "Employee"))
                .attribute(AttributeRow::new("reports", AttributeKind::OneToMany, "Employee")),
        ])
        .unwrap()
        .shared()
    }

    #[test]
    fn resolves_nested_blocks_and_seals() {
        let decl = NamedGraphDecl::new("Employee")
            .attribute(
                AttributeNodeDecl::new("manager")
                    .with_subgraph("boss")
                    .with_option(FetchOption::Eager),
            )
            .subgraph(SubgraphDecl::new("boss").attribute(AttributeNodeDecl::new("name")));
        let graph = resolve_declaration(&metamodel(), &decl).unwrap();
        assert_eq!(graph.name(), Some("Employee"));
        assert!(graph.is_fixed());
        let manager = graph.attribute_node("manager").unwrap();
        assert!(manager.fetch_options().is_eager());
        assert_eq!(
            manager.subgraph("Employee").unwrap().attribute_names(),
            vec!["name"]
        );
    }

    #[test]
    fn self_referencing_block_is_rejected() {
        let decl = NamedGraphDecl::new("Employee")
            .named("Employee.chain")
            .attribute(AttributeNodeDecl::new("manager").with_subgraph("chain"))
            .subgraph(
                SubgraphDecl::new("chain")
                    .attribute(AttributeNodeDecl::new("manager").with_subgraph("chain")),
            );
        let err = resolve_declaration(&metamodel(), &decl).unwrap_err();
        assert_eq!(
            err,
            GraphError::CyclicSubgraph {
                graph: "Employee.chain".to_string(),
                subgraph: "chain".to_string(),
            }
        );
    }

    #[test]
    fn a_block_may_be_referenced_twice() {
        let decl = NamedGraphDecl::new("Employee")
            .attribute(AttributeNodeDecl::new("manager").with_subgraph("who"))
            .attribute(AttributeNodeDecl::new("reports").with_subgraph("who"))
            .subgraph(SubgraphDecl::new("who").attribute(AttributeNodeDecl::new("name")));
        let graph = resolve_declaration(&metamodel(), &decl).unwrap();
        assert_eq!(graph.attribute_names(), vec!["manager", "reports"]);
    }

    #[test]
    fn include_all_selects_every_attribute() {
        let decl = NamedGraphDecl::new("Employee").include_all();
        let graph = resolve_declaration(&metamodel(), &decl).unwrap();
        assert_eq!(graph.attribute_names(), vec!["manager", "name", "reports"]);
    }

    #[test]
    fn subclass_block_without_type_is_rejected() {
        let decl = NamedGraphDecl::new("Employee").subclass_subgraph(SubgraphDecl::new("extra"));
        let err = resolve_declaration(&metamodel(), &decl).unwrap_err();
        assert!(matches!(err, GraphError::MissingSubclassType { .. }));
    }

    #[test]
    fn undeclared_reference_inside_an_unused_block_is_rejected() {
        let decl = NamedGraphDecl::new("Employee")
            .attribute(AttributeNodeDecl::new("name"))
            .subgraph(
                SubgraphDecl::new("orphan")
                    .attribute(AttributeNodeDecl::new("manager").with_subgraph("foo"))
                    .attribute(AttributeNodeDecl::new("noSuchAttribute")),
            );
        let err = resolve_declaration(&metamodel(), &decl).unwrap_err();
        assert_eq!(
            err,
            GraphError::UndeclaredSubgraph {
                graph: "Employee".to_string(),
                subgraph: "foo".to_string(),
            }
        );
    }

    #[test]
    fn unreferenced_block_is_rejected() {
        let decl = NamedGraphDecl::new("Employee")
            .attribute(AttributeNodeDecl::new("name"))
            .subgraph(SubgraphDecl::new("orphan").attribute(AttributeNodeDecl::new("noSuchAttribute")));
        let err = resolve_declaration(&metamodel(), &decl).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(
            err,
            GraphError::UnreferencedSubgraph {
                graph: "Employee".to_string(),
                subgraph: "orphan".to_string(),
            }
        );
    }
}
