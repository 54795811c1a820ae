use crate::metamodel::SharedMetamodel;
use crate::node::{GraphNode, GraphState, NodeCore};
use crate::shape::SubgraphShape;

/// A nested graph node owned by an attribute node, or by an entity graph as
/// a subclass subgraph.
#[derive(Debug, Clone)]
pub struct Subgraph {
    pub(crate) core: NodeCore,
}

impl Subgraph {
    pub(crate) fn new(
        managed_type: impl Into<String>,
        state: GraphState,
        metamodel: SharedMetamodel,
    ) -> Self {
        Self {
            core: NodeCore::new(managed_type, state, metamodel),
        }
    }

    pub fn describe(&self) -> SubgraphShape {
        SubgraphShape {
            type_name: self.core.managed_type.clone(),
            attribute_nodes: self
                .core
                .attribute_nodes
                .values()
                .map(|node| node.describe())
                .collect(),
        }
    }
}

impl GraphNode for Subgraph {
    fn core(&self) -> &NodeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut NodeCore {
        &mut self.core
    }
}
