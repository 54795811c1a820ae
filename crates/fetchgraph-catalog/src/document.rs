//! Catalog document loading.
//!
//! A catalog is the static declaration source: managed types plus named
//! graph declarations, stored as JSON or TOML with the same shape.

use crate::error::CatalogError;
use crate::rows::{NamedGraphDecl, TypeRow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CATALOG_KIND: &str = "fetchgraph.catalog.v1";
pub const CATALOG_SCHEMA: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub schema: u32,
    pub catalog_kind: String,
    #[serde(default)]
    pub types: Vec<TypeRow>,
    #[serde(default)]
    pub graphs: Vec<NamedGraphDecl>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            schema: CATALOG_SCHEMA,
            catalog_kind: CATALOG_KIND.to_string(),
            types: Vec::new(),
            graphs: Vec::new(),
        }
    }
}

impl Catalog {
    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(text).map_err(|source| CatalogError::ParseJson {
            path: "<inline>".to_string(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, CatalogError> {
        toml::from_str(text).map_err(|source| CatalogError::ParseToml {
            path: "<inline>".to_string(),
            source,
        })
    }

    /// Load a catalog from disk. Files ending in `.toml` are read as TOML,
    /// everything else as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| CatalogError::ReadFile {
            path: display.clone(),
            source,
        })?;
        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            toml::from_str(&text).map_err(|source| CatalogError::ParseToml {
                path: display,
                source,
            })
        } else {
            serde_json::from_str(&text).map_err(|source| CatalogError::ParseJson {
                path: display,
                source,
            })
        }
    }

    pub fn find_type(&self, name: &str) -> Option<&TypeRow> {
        self.types.iter().find(|row| row.name == name)
    }

    pub fn find_graph(&self, name: &str) -> Option<&NamedGraphDecl> {
        self.graphs.iter().find(|decl| decl.effective_name() == name)
    }

    pub fn with_type(mut self, row: TypeRow) -> Self {
        self.types.push(row);
        self
    }

    pub fn with_graph(mut self, decl: NamedGraphDecl) -> Self {
        self.graphs.push(decl);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::{AttributeKind, TypeKind};

    #[test]
    fn json_and_toml_agree() {
        let json = r#"{
            "schema": 1,
            "catalogKind": "fetchgraph.catalog.v1",
            "types": [
                {"name": "Person", "kind": "entity",
                 "attributes": [{"name": "name", "kind": "basic", "type": "String"}]}
            ],
            "graphs": [
                {"root": "Person", "attributeNodes": [{"value": "name"}]}
            ]
        }"#;
        let toml_text = r#"
schema = 1
catalogKind = "fetchgraph.catalog.v1"

[[types]]
name = "Person"
kind = "entity"

[[types.attributes]]
name = "name"
kind = "basic"
type = "String"

[[graphs]]
root = "Person"

[[graphs.attributeNodes]]
value = "name"
"#;
        let from_json = Catalog::from_json_str(json).unwrap();
        let from_toml = Catalog::from_toml_str(toml_text).unwrap();
        assert_eq!(from_json, from_toml);
        let person = from_json.find_type("Person").unwrap();
        assert_eq!(person.kind, TypeKind::Entity);
        assert_eq!(person.attributes[0].kind, AttributeKind::Basic);
        assert!(from_json.find_graph("Person").is_some());
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        let err = Catalog::from_json_str("{\"schema\": ").unwrap_err();
        assert!(matches!(err, CatalogError::ParseJson { .. }));
    }

    #[test]
    fn missing_file_reports_read_error() {
        let err = Catalog::load("/definitely/not/here/catalog.json").unwrap_err();
        assert!(matches!(err, CatalogError::ReadFile { .. }));
    }
}
