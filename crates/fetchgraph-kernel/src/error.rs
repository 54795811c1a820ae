//! Error types for graph construction and resolution.

use serde::{Deserialize, Serialize};

/// Errors raised by graph operations.
///
/// Every error leaves the graph it was raised on exactly as it was before
/// the failing call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The metamodel has no managed type with this name.
    #[error("unknown managed type `{type_name}`")]
    UnknownManagedType { type_name: String },

    /// A graph root must be an entity type.
    #[error("`{type_name}` is not an entity type")]
    NotAnEntity { type_name: String },

    /// The name does not denote a persistent attribute of the managed type.
    #[error("`{attribute}` is not a persistent attribute of `{managed_type}`")]
    UnknownAttribute {
        managed_type: String,
        attribute: String,
    },

    /// A subgraph was requested on an attribute whose type is neither an
    /// embeddable nor an entity.
    #[error("attribute `{managed_type}.{attribute}` of type `{type_name}` cannot carry a subgraph")]
    NotSubgraphCapable {
        managed_type: String,
        attribute: String,
        type_name: String,
    },

    /// A key subgraph was requested on an attribute that is not a map.
    #[error("attribute `{managed_type}.{attribute}` is not map-valued")]
    NotMapValued {
        managed_type: String,
        attribute: String,
    },

    #[error("`{subtype}` is not a subtype of `{supertype}`")]
    NotSubtype { subtype: String, supertype: String },

    /// Merge inputs range over different root types.
    #[error("cannot merge a graph rooted at `{actual}` into one rooted at `{expected}`")]
    TypeMismatch { expected: String, actual: String },

    #[error("merge requires at least one graph")]
    EmptyMerge,

    #[error("invalid fetch option: {0}")]
    InvalidFetchOption(String),

    #[error("unknown graph semantic `{0}`")]
    UnknownSemantic(String),

    #[error("invalid metamodel: {0}")]
    InvalidMetamodel(String),

    /// A named graph references a subgraph block that it does not declare.
    #[error("graph `{graph}` references undeclared subgraph `{subgraph}`")]
    UndeclaredSubgraph { graph: String, subgraph: String },

    /// A named subgraph block that no attribute node references.
    #[error("graph `{graph}` declares subgraph `{subgraph}` but never references it")]
    UnreferencedSubgraph { graph: String, subgraph: String },

    /// A named subgraph block is reachable from itself.
    #[error("graph `{graph}` expands subgraph `{subgraph}` recursively")]
    CyclicSubgraph { graph: String, subgraph: String },

    /// Subclass subgraph blocks must name the subclass they narrow to.
    #[error("graph `{graph}` declares subclass subgraph `{subgraph}` without a type")]
    MissingSubclassType { graph: String, subgraph: String },

    #[error("a graph named `{0}` is already registered")]
    DuplicateGraphName(String),

    #[error("no graph named `{0}`")]
    UnknownGraph(String),

    /// A mutating operation was attempted on a sealed graph.
    #[error("graph node over `{managed_type}` is fixed and cannot be mutated")]
    Fixed { managed_type: String },

    #[error("the global graph registry is already installed")]
    RegistryInstalled,
}

/// The two failure categories of the graph model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Structural misuse by the caller.
    InvalidArgument,
    /// The target is in a state that forbids the operation.
    IllegalState,
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphError::Fixed { .. } | GraphError::RegistryInstalled => ErrorKind::IllegalState,
            _ => ErrorKind::InvalidArgument,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.kind() == ErrorKind::InvalidArgument
    }

    pub fn is_illegal_state(&self) -> bool {
        self.kind() == ErrorKind::IllegalState
    }
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
