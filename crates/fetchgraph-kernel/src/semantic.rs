//! How a fetch executor applies a graph.

use crate::attribute::AttributeNode;
use crate::error::GraphError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const FETCH_GRAPH_HINT: &str = "jakarta.persistence.fetchgraph";
pub const LOAD_GRAPH_HINT: &str = "jakarta.persistence.loadgraph";

/// The two ways a graph can be applied to a load.
///
/// Under `Fetch`, attributes absent from the graph are treated as lazy.
/// Under `Load`, absent attributes keep their mapped default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphSemantic {
    Fetch,
    Load,
}

impl GraphSemantic {
    pub fn hint_name(self) -> &'static str {
        match self {
            GraphSemantic::Fetch => FETCH_GRAPH_HINT,
            GraphSemantic::Load => LOAD_GRAPH_HINT,
        }
    }

    pub fn from_hint_name(name: &str) -> Option<Self> {
        match name {
            FETCH_GRAPH_HINT => Some(GraphSemantic::Fetch),
            LOAD_GRAPH_HINT => Some(GraphSemantic::Load),
            _ => None,
        }
    }

    /// Whether an attribute should be fetched eagerly.
    ///
    /// `node` is the graph's node for the attribute, if any; `default_eager`
    /// is the attribute's mapped default. An explicit `Lazy` option on the
    /// node always wins.
    pub fn should_fetch(self, node: Option<&AttributeNode>, default_eager: bool) -> bool {
        match node {
            Some(node) => !node.fetch_options().is_lazy(),
            None => match self {
                GraphSemantic::Fetch => false,
                GraphSemantic::Load => default_eager,
            },
        }
    }
}

impl fmt::Display for GraphSemantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphSemantic::Fetch => f.write_str("fetch"),
            GraphSemantic::Load => f.write_str("load"),
        }
    }
}

impl FromStr for GraphSemantic {
    type Err = GraphError;

    /// Accepts `fetch`, `load`, or either standard hint name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            "fetch" => Ok(GraphSemantic::Fetch),
            "load" => Ok(GraphSemantic::Load),
            other => Self::from_hint_name(other)
                .ok_or_else(|| GraphError::UnknownSemantic(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_hint_names() {
        assert_eq!("fetch".parse::<GraphSemantic>().unwrap(), GraphSemantic::Fetch);
        assert_eq!(
            LOAD_GRAPH_HINT.parse::<GraphSemantic>().unwrap(),
            GraphSemantic::Load
        );
        let err = "jakarta.persistence.whatever"
            .parse::<GraphSemantic>()
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn absent_attributes_follow_the_semantic() {
        assert!(!GraphSemantic::Fetch.should_fetch(None, true));
        assert!(GraphSemantic::Load.should_fetch(None, true));
        assert!(!GraphSemantic::Load.should_fetch(None, false));
    }
}
