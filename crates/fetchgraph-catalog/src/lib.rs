//! # Fetchgraph Catalog
//!
//! The static declaration source for entity graphs: managed-type rows that
//! seed a metamodel, and named graph declarations that the kernel resolves
//! into fixed entity graphs.
//!
//! Catalogs are read from JSON or TOML documents and checked at the
//! document level by [`validate_catalog`].

pub mod document;
pub mod error;
pub mod rows;
pub mod validate;

pub use document::{CATALOG_KIND, CATALOG_SCHEMA, Catalog};
pub use error::CatalogError;
pub use rows::{
    AttributeKind, AttributeNodeDecl, AttributeRow, CacheRetrieveMode, CacheStoreMode,
    FetchOption, NamedGraphDecl, SubgraphDecl, TypeKind, TypeRow,
};
pub use validate::{ValidationIssue, ValidationReport, failure_class, validate_catalog};
