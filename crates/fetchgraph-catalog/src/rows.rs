//! Catalog rows: managed types, their attributes, and named graph
//! declarations.
//!
//! Rows are plain data. They carry no validation beyond what serde enforces;
//! see [`crate::validate`] for document-level checks and the kernel for
//! graph resolution.

use serde::{Deserialize, Serialize};

/// Classification of a managed type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// A persistent entity with its own identity.
    Entity,
    /// A value type embedded into its owner.
    Embeddable,
    /// A non-entity supertype that contributes mapped attributes.
    MappedSuperclass,
}

/// Persistent attribute classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    Basic,
    Embedded,
    ManyToOne,
    OneToOne,
    OneToMany,
    ManyToMany,
    ElementCollection,
}

impl AttributeKind {
    /// Whether the attribute holds a collection or map of values.
    pub fn is_plural(self) -> bool {
        matches!(
            self,
            AttributeKind::OneToMany | AttributeKind::ManyToMany | AttributeKind::ElementCollection
        )
    }

    /// Whether the attribute is a relationship to another entity.
    pub fn is_association(self) -> bool {
        matches!(
            self,
            AttributeKind::ManyToOne
                | AttributeKind::OneToOne
                | AttributeKind::OneToMany
                | AttributeKind::ManyToMany
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttributeKind::Basic => "basic",
            AttributeKind::Embedded => "embedded",
            AttributeKind::ManyToOne => "many_to_one",
            AttributeKind::OneToOne => "one_to_one",
            AttributeKind::OneToMany => "one_to_many",
            AttributeKind::ManyToMany => "many_to_many",
            AttributeKind::ElementCollection => "element_collection",
        }
    }
}

impl std::fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttributeRow {
    pub name: String,
    pub kind: AttributeKind,
    /// Declared type, or the element type for plural attributes.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Key type; present only for map-valued attributes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
}

impl AttributeRow {
    pub fn new(name: impl Into<String>, kind: AttributeKind, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            type_name: type_name.into(),
            key_type: None,
        }
    }

    /// Turn a plural attribute into a map keyed by `key_type`.
    pub fn keyed_by(mut self, key_type: impl Into<String>) -> Self {
        self.key_type = Some(key_type.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypeRow {
    pub name: String,
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supertype: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeRow>,
}

impl TypeRow {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            supertype: None,
            attributes: Vec::new(),
        }
    }

    pub fn extends(mut self, supertype: impl Into<String>) -> Self {
        self.supertype = Some(supertype.into());
        self
    }

    pub fn attribute(mut self, attribute: AttributeRow) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// Second-level cache read behavior requested for an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheRetrieveMode {
    Use,
    Bypass,
}

/// Second-level cache write behavior requested for an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStoreMode {
    Use,
    Bypass,
    Refresh,
}

/// An advisory option attached to an attribute node.
///
/// Fetch executors may ignore any option they do not understand.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOption {
    /// Explicit inclusion.
    Eager,
    /// Explicit exclusion.
    Lazy,
    CacheRetrieve(CacheRetrieveMode),
    CacheStore(CacheStoreMode),
    BatchSize(u32),
    /// Provider-specific hint, passed through verbatim.
    Hint { key: String, value: String },
}

impl std::fmt::Display for FetchOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchOption::Eager => f.write_str("eager"),
            FetchOption::Lazy => f.write_str("lazy"),
            FetchOption::CacheRetrieve(CacheRetrieveMode::Use) => f.write_str("cache_retrieve=use"),
            FetchOption::CacheRetrieve(CacheRetrieveMode::Bypass) => {
                f.write_str("cache_retrieve=bypass")
            }
            FetchOption::CacheStore(CacheStoreMode::Use) => f.write_str("cache_store=use"),
            FetchOption::CacheStore(CacheStoreMode::Bypass) => f.write_str("cache_store=bypass"),
            FetchOption::CacheStore(CacheStoreMode::Refresh) => f.write_str("cache_store=refresh"),
            FetchOption::BatchSize(size) => write!(f, "batch_size={size}"),
            FetchOption::Hint { key, value } => write!(f, "{key}={value}"),
        }
    }
}

/// One attribute selected by a named graph or named subgraph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttributeNodeDecl {
    /// The attribute name.
    pub value: String,
    /// Name of the subgraph block(s) describing the attribute's value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subgraph: Option<String>,
    /// Name of the subgraph block(s) describing the map key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_subgraph: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fetch_options: Vec<FetchOption>,
}

impl AttributeNodeDecl {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            subgraph: None,
            key_subgraph: None,
            fetch_options: Vec::new(),
        }
    }

    pub fn with_subgraph(mut self, name: impl Into<String>) -> Self {
        self.subgraph = Some(name.into());
        self
    }

    pub fn with_key_subgraph(mut self, name: impl Into<String>) -> Self {
        self.key_subgraph = Some(name.into());
        self
    }

    pub fn with_option(mut self, option: FetchOption) -> Self {
        self.fetch_options.push(option);
        self
    }
}

/// A named subgraph block, referenced by name from attribute node
/// declarations within the same graph declaration.
///
/// Several blocks may share a name when they narrow to different types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphDecl {
    pub name: String,
    /// Narrowed type; absent means the attribute's declared type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub attribute_nodes: Vec<AttributeNodeDecl>,
}

impl SubgraphDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            attribute_nodes: Vec::new(),
        }
    }

    pub fn of_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn attribute(mut self, node: AttributeNodeDecl) -> Self {
        self.attribute_nodes.push(node);
        self
    }
}

/// A reusable, named entity graph template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NamedGraphDecl {
    /// Graph name; defaults to the root type name when absent or blank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub root: String,
    #[serde(default)]
    pub include_all_attributes: bool,
    #[serde(default)]
    pub attribute_nodes: Vec<AttributeNodeDecl>,
    #[serde(default)]
    pub subgraphs: Vec<SubgraphDecl>,
    /// Blocks narrowing the root itself to entity subclasses.
    #[serde(default)]
    pub subclass_subgraphs: Vec<SubgraphDecl>,
}

impl NamedGraphDecl {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            name: None,
            root: root.into(),
            include_all_attributes: false,
            attribute_nodes: Vec::new(),
            subgraphs: Vec::new(),
            subclass_subgraphs: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn include_all(mut self) -> Self {
        self.include_all_attributes = true;
        self
    }

    pub fn attribute(mut self, node: AttributeNodeDecl) -> Self {
        self.attribute_nodes.push(node);
        self
    }

    pub fn subgraph(mut self, block: SubgraphDecl) -> Self {
        self.subgraphs.push(block);
        self
    }

    pub fn subclass_subgraph(mut self, block: SubgraphDecl) -> Self {
        self.subclass_subgraphs.push(block);
        self
    }

    /// The name this declaration registers under.
    pub fn effective_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.root.trim())
    }
}
