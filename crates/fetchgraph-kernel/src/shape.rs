//! Serializable snapshots of graph structure.
//!
//! Shapes carry no metamodel handle and compare by value, so two graphs
//! are structurally equal exactly when their shapes are equal.

use crate::node::GraphState;
use fetchgraph_catalog::{AttributeKind, FetchOption};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub root: String,
    pub state: GraphState,
    pub attribute_nodes: Vec<AttributeShape>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subclass_subgraphs: Vec<SubgraphShape>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphShape {
    #[serde(rename = "type")]
    pub type_name: String,
    pub attribute_nodes: Vec<AttributeShape>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeShape {
    pub name: String,
    pub kind: AttributeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fetch_options: Vec<FetchOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subgraphs: Vec<SubgraphShape>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_subgraphs: Vec<SubgraphShape>,
}

impl GraphShape {
    /// Attribute names at the top level, in order.
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attribute_nodes
            .iter()
            .map(|node| node.name.as_str())
            .collect()
    }

    /// Indented text rendering, two spaces per level.
    ///
    /// ```text
    /// Order.detail (Order) [fixed]
    ///   customer
    ///     subgraph Person
    ///       name
    /// ```
    pub fn render_tree(&self) -> String {
        let mut lines = Vec::new();
        match &self.name {
            Some(name) => lines.push(format!("{name} ({}) [{}]", self.root, self.state)),
            None => lines.push(format!("{} [{}]", self.root, self.state)),
        }
        render_nodes(&self.attribute_nodes, 1, &mut lines);
        for subgraph in &self.subclass_subgraphs {
            lines.push(format!("{}subclass {}", indent(1), subgraph.type_name));
            render_nodes(&subgraph.attribute_nodes, 2, &mut lines);
        }
        lines.join("\n")
    }
}

impl SubgraphShape {
    pub fn attribute_names(&self) -> Vec<&str> {
        self.attribute_nodes
            .iter()
            .map(|node| node.name.as_str())
            .collect()
    }

    pub fn render_tree(&self) -> String {
        let mut lines = vec![self.type_name.clone()];
        render_nodes(&self.attribute_nodes, 1, &mut lines);
        lines.join("\n")
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn render_nodes(nodes: &[AttributeShape], depth: usize, lines: &mut Vec<String>) {
    for node in nodes {
        let mut line = format!("{}{}", indent(depth), node.name);
        if !node.fetch_options.is_empty() {
            let options: Vec<String> = node.fetch_options.iter().map(ToString::to_string).collect();
            line.push_str(&format!(" [{}]", options.join(", ")));
        }
        lines.push(line);
        for subgraph in &node.subgraphs {
            lines.push(format!("{}subgraph {}", indent(depth + 1), subgraph.type_name));
            render_nodes(&subgraph.attribute_nodes, depth + 2, lines);
        }
        for subgraph in &node.key_subgraphs {
            lines.push(format!("{}key subgraph {}", indent(depth + 1), subgraph.type_name));
            render_nodes(&subgraph.attribute_nodes, depth + 2, lines);
        }
    }
}
