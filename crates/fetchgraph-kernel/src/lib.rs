//! # Fetchgraph Kernel
//!
//! Entity graphs: hierarchical fetch plans rooted at an entity type.
//!
//! A graph selects attributes of its root type. Each selected attribute may
//! carry subgraphs over its declared type, treated subgraphs narrowed to a
//! subtype, and key subgraphs over the key type of a map. Every structural
//! call is validated against a [`Metamodel`] at the call that introduces it.
//!
//! ## Architecture
//!
//! ```text
//! Metamodel             ← Managed types, attributes, inheritance
//!     │
//! GraphNode             ← Shared add/remove/subgraph operations
//!     │
//! EntityGraph           ← Root node + subclass subgraphs; seal, merge, view_for
//!     │
//! AttributeNode         ← Selected attribute, fetch options, (key) subgraphs
//!     │
//! Subgraph              ← Nested node over an embeddable or entity type
//!     │
//! GraphRegistry         ← Named declarations resolved once into fixed graphs
//! ```
//!
//! Graphs are `Dynamic` while built and `Fixed` once sealed or resolved from
//! a declaration. Merging never modifies its inputs.

pub mod attribute;
pub mod entity_graph;
pub mod error;
mod merge;
pub mod metamodel;
mod node;
pub mod options;
pub mod registry;
pub mod resolve;
pub mod semantic;
pub mod shape;
pub mod subgraph;

pub use attribute::AttributeNode;
pub use entity_graph::EntityGraph;
pub use error::{ErrorKind, GraphError, Result};
pub use metamodel::{Attribute, ManagedType, Metamodel, SharedMetamodel, StaticMetamodel};
pub use node::{GraphNode, GraphState};
pub use options::FetchOptions;
pub use registry::{GraphRegistry, global, install_global};
pub use resolve::resolve_declaration;
pub use semantic::{FETCH_GRAPH_HINT, GraphSemantic, LOAD_GRAPH_HINT};
pub use shape::{AttributeShape, GraphShape, SubgraphShape};
pub use subgraph::Subgraph;

pub use fetchgraph_catalog::{AttributeKind, CacheRetrieveMode, CacheStoreMode, FetchOption, TypeKind};
