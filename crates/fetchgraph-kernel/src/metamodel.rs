//! The metamodel seam.
//!
//! Graph nodes validate every structural call against a [`Metamodel`]: which
//! attributes a managed type declares (including inherited ones), what each
//! attribute's declared type is, and how types relate by inheritance.
//!
//! [`StaticMetamodel`] is the in-memory implementation, built from catalog
//! type rows.

use crate::error::{GraphError, Result};
use fetchgraph_catalog::{AttributeKind, AttributeRow, Catalog, TypeKind, TypeRow};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// A persistent attribute as seen by the graph model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub kind: AttributeKind,
    /// Declared type; the element type for plural attributes.
    pub type_name: String,
    /// Key type of a map-valued attribute.
    pub key_type: Option<String>,
}

impl Attribute {
    pub fn is_map(&self) -> bool {
        self.key_type.is_some()
    }

    /// Default inclusion when no graph mentions the attribute.
    pub fn default_eager(&self) -> bool {
        matches!(
            self.kind,
            AttributeKind::Basic
                | AttributeKind::Embedded
                | AttributeKind::ManyToOne
                | AttributeKind::OneToOne
        )
    }
}

impl From<&AttributeRow> for Attribute {
    fn from(row: &AttributeRow) -> Self {
        Self {
            name: row.name.trim().to_string(),
            kind: row.kind,
            type_name: row.type_name.trim().to_string(),
            key_type: row.key_type.as_deref().map(|key| key.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedType {
    pub name: String,
    pub kind: TypeKind,
    pub supertype: Option<String>,
    /// Attributes declared directly on this type.
    pub attributes: BTreeMap<String, Attribute>,
}

/// Read access to managed types.
///
/// Only [`Metamodel::managed_type`] is required; inheritance-aware lookups
/// are derived from it.
pub trait Metamodel: Send + Sync + fmt::Debug {
    fn managed_type(&self, name: &str) -> Option<&ManagedType>;

    /// The type itself followed by its supertypes, nearest first.
    fn supertype_chain(&self, name: &str) -> Vec<&ManagedType> {
        let mut chain = Vec::new();
        let mut seen = BTreeSet::new();
        let mut current = self.managed_type(name);
        while let Some(ty) = current {
            if !seen.insert(ty.name.as_str()) {
                break;
            }
            chain.push(ty);
            current = ty
                .supertype
                .as_deref()
                .and_then(|sup| self.managed_type(sup));
        }
        chain
    }

    /// Look up an attribute declared on the type or inherited from a
    /// supertype.
    fn attribute(&self, type_name: &str, attribute: &str) -> Option<&Attribute> {
        self.supertype_chain(type_name)
            .into_iter()
            .find_map(|ty| ty.attributes.get(attribute))
    }

    /// All persistent attributes of a type, inherited ones included.
    fn attributes_of(&self, type_name: &str) -> Vec<&Attribute> {
        let mut by_name: BTreeMap<&str, &Attribute> = BTreeMap::new();
        for ty in self.supertype_chain(type_name) {
            for (name, attribute) in &ty.attributes {
                by_name.entry(name.as_str()).or_insert(attribute);
            }
        }
        by_name.into_values().collect()
    }

    /// Reflexive, transitive subtype test. Unknown types are never subtypes.
    fn is_subtype(&self, subtype: &str, supertype: &str) -> bool {
        self.supertype_chain(subtype)
            .iter()
            .any(|ty| ty.name == supertype)
    }
}

pub type SharedMetamodel = Arc<dyn Metamodel>;

/// The managed type that a subgraph on `attribute` ranges over.
pub(crate) fn value_type<'m>(
    metamodel: &'m dyn Metamodel,
    owner: &str,
    attribute: &Attribute,
) -> Result<&'m ManagedType> {
    let capable = |ty: &&ManagedType| matches!(ty.kind, TypeKind::Entity | TypeKind::Embeddable);
    let found = match attribute.kind {
        AttributeKind::Basic => None,
        _ => metamodel.managed_type(&attribute.type_name).filter(capable),
    };
    found.ok_or_else(|| GraphError::NotSubgraphCapable {
        managed_type: owner.to_string(),
        attribute: attribute.name.clone(),
        type_name: attribute.type_name.clone(),
    })
}

/// The managed type that a key subgraph on `attribute` ranges over.
pub(crate) fn key_type<'m>(
    metamodel: &'m dyn Metamodel,
    owner: &str,
    attribute: &Attribute,
) -> Result<&'m ManagedType> {
    let Some(key) = attribute.key_type.as_deref() else {
        return Err(GraphError::NotMapValued {
            managed_type: owner.to_string(),
            attribute: attribute.name.clone(),
        });
    };
    metamodel
        .managed_type(key)
        .filter(|ty| matches!(ty.kind, TypeKind::Entity | TypeKind::Embeddable))
        .ok_or_else(|| GraphError::NotSubgraphCapable {
            managed_type: owner.to_string(),
            attribute: attribute.name.clone(),
            type_name: key.to_string(),
        })
}

/// Check that `subtype` is a known managed type narrowing `supertype`.
pub(crate) fn require_subtype(
    metamodel: &dyn Metamodel,
    subtype: &str,
    supertype: &str,
) -> Result<()> {
    if metamodel.managed_type(subtype).is_none() {
        return Err(GraphError::UnknownManagedType {
            type_name: subtype.to_string(),
        });
    }
    if !metamodel.is_subtype(subtype, supertype) {
        return Err(GraphError::NotSubtype {
            subtype: subtype.to_string(),
            supertype: supertype.to_string(),
        });
    }
    Ok(())
}

/// In-memory metamodel keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct StaticMetamodel {
    types: BTreeMap<String, ManagedType>,
}

impl StaticMetamodel {
    /// Build a metamodel from type rows.
    ///
    /// Rejects duplicate types, duplicate attributes, unknown supertypes,
    /// supertype cycles, and key types on singular attributes. An embedded
    /// attribute naming a managed type must name an embeddable, and an
    /// association must name an entity.
    pub fn from_rows(rows: &[TypeRow]) -> Result<Self> {
        let mut types = BTreeMap::new();
        for row in rows {
            let name = row.name.trim();
            if name.is_empty() {
                return Err(GraphError::InvalidMetamodel(
                    "type name must be non-empty".to_string(),
                ));
            }
            let mut attributes = BTreeMap::new();
            for attribute_row in &row.attributes {
                let attribute = Attribute::from(attribute_row);
                if attribute.key_type.is_some() && !attribute.kind.is_plural() {
                    return Err(GraphError::InvalidMetamodel(format!(
                        "{name}.{} declares a key type but is {}",
                        attribute.name, attribute.kind
                    )));
                }
                if attributes.contains_key(&attribute.name) {
                    return Err(GraphError::InvalidMetamodel(format!(
                        "duplicate attribute {name}.{}",
                        attribute.name
                    )));
                }
                attributes.insert(attribute.name.clone(), attribute);
            }
            let managed = ManagedType {
                name: name.to_string(),
                kind: row.kind,
                supertype: row.supertype.as_deref().map(|sup| sup.trim().to_string()),
                attributes,
            };
            if types.insert(name.to_string(), managed).is_some() {
                return Err(GraphError::InvalidMetamodel(format!("duplicate type {name}")));
            }
        }

        let metamodel = Self { types };
        for ty in metamodel.types.values() {
            for attribute in ty.attributes.values() {
                metamodel.check_attribute_target(&ty.name, attribute)?;
            }
            let Some(supertype) = ty.supertype.as_deref() else {
                continue;
            };
            if !metamodel.types.contains_key(supertype) {
                return Err(GraphError::InvalidMetamodel(format!(
                    "{} extends unknown type {supertype}",
                    ty.name
                )));
            }
            let chain = metamodel.supertype_chain(supertype);
            if chain.iter().any(|ancestor| ancestor.name == ty.name) {
                return Err(GraphError::InvalidMetamodel(format!(
                    "supertype cycle through {}",
                    ty.name
                )));
            }
        }
        Ok(metamodel)
    }

    fn check_attribute_target(&self, owner: &str, attribute: &Attribute) -> Result<()> {
        let expected = match attribute.kind {
            AttributeKind::Basic | AttributeKind::ElementCollection => return Ok(()),
            AttributeKind::Embedded => TypeKind::Embeddable,
            _ => TypeKind::Entity,
        };
        match self.types.get(&attribute.type_name) {
            Some(target) if target.kind != expected => Err(GraphError::InvalidMetamodel(format!(
                "{owner}.{} is {} but {} is {:?}",
                attribute.name, attribute.kind, target.name, target.kind
            ))),
            _ => Ok(()),
        }
    }

    pub fn from_catalog(catalog: &Catalog) -> Result<Self> {
        Self::from_rows(&catalog.types)
    }

    pub fn shared(self) -> SharedMetamodel {
        Arc::new(self)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Metamodel for StaticMetamodel {
    fn managed_type(&self, name: &str) -> Option<&ManagedType> {
        self.types.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<TypeRow> {
        vec![
            TypeRow::new("Auditable", TypeKind::MappedSuperclass)
                .attribute(AttributeRow::new("createdAt", AttributeKind::Basic, "Instant")),
            TypeRow::new("Person", TypeKind::Entity)
                .extends("Auditable")
                .attribute(AttributeRow::new("name", AttributeKind::Basic, "String")),
            TypeRow::new("PremiumPerson", TypeKind::Entity)
                .extends("Person")
                .attribute(AttributeRow::new("loyaltyTier", AttributeKind::Basic, "String")),
        ]
    }

    #[test]
    fn attributes_are_inherited() {
        let mm = StaticMetamodel::from_rows(&rows()).unwrap();
        assert!(mm.attribute("PremiumPerson", "createdAt").is_some());
        assert!(mm.attribute("PremiumPerson", "name").is_some());
        assert!(mm.attribute("Person", "loyaltyTier").is_none());
        let names: Vec<&str> = mm
            .attributes_of("PremiumPerson")
            .into_iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["createdAt", "loyaltyTier", "name"]);
    }

    #[test]
    fn subtype_is_reflexive_and_transitive() {
        let mm = StaticMetamodel::from_rows(&rows()).unwrap();
        assert!(mm.is_subtype("Person", "Person"));
        assert!(mm.is_subtype("PremiumPerson", "Auditable"));
        assert!(!mm.is_subtype("Person", "PremiumPerson"));
        assert!(!mm.is_subtype("Ghost", "Ghost"));
    }

    #[test]
    fn rejects_unknown_supertype_and_cycles() {
        let unknown = vec![TypeRow::new("A", TypeKind::Entity).extends("Nope")];
        assert!(matches!(
            StaticMetamodel::from_rows(&unknown),
            Err(GraphError::InvalidMetamodel(_))
        ));
        let cycle = vec![
            TypeRow::new("A", TypeKind::Entity).extends("B"),
            TypeRow::new("B", TypeKind::Entity).extends("A"),
        ];
        assert!(matches!(
            StaticMetamodel::from_rows(&cycle),
            Err(GraphError::InvalidMetamodel(_))
        ));
    }

    #[test]
    fn rejects_key_type_on_singular_attribute() {
        let rows = vec![
            TypeRow::new("A", TypeKind::Entity)
                .attribute(AttributeRow::new("b", AttributeKind::ManyToOne, "A").keyed_by("A")),
        ];
        assert!(StaticMetamodel::from_rows(&rows).is_err());
    }

    #[test]
    fn rejects_attribute_kind_that_mismatches_its_target() {
        let embedded_entity = vec![
            TypeRow::new("Order", TypeKind::Entity)
                .attribute(AttributeRow::new("buyer", AttributeKind::Embedded, "Person")),
            TypeRow::new("Person", TypeKind::Entity),
        ];
        let err = StaticMetamodel::from_rows(&embedded_entity).unwrap_err();
        assert!(matches!(err, GraphError::InvalidMetamodel(_)));

        let association_to_embeddable = vec![
            TypeRow::new("Person", TypeKind::Entity)
                .attribute(AttributeRow::new("home", AttributeKind::ManyToOne, "Address")),
            TypeRow::new("Address", TypeKind::Embeddable),
        ];
        assert!(StaticMetamodel::from_rows(&association_to_embeddable).is_err());

        let embedded_embeddable = vec![
            TypeRow::new("Person", TypeKind::Entity)
                .attribute(AttributeRow::new("home", AttributeKind::Embedded, "Address")),
            TypeRow::new("Address", TypeKind::Embeddable),
        ];
        assert!(StaticMetamodel::from_rows(&embedded_embeddable).is_ok());
    }

    #[test]
    fn basic_attributes_cannot_carry_subgraphs() {
        let mm = StaticMetamodel::from_rows(&rows()).unwrap();
        let name = mm.attribute("Person", "name").unwrap();
        let err = value_type(&mm, "Person", name).unwrap_err();
        assert!(matches!(err, GraphError::NotSubgraphCapable { .. }));
        let err = key_type(&mm, "Person", name).unwrap_err();
        assert!(matches!(err, GraphError::NotMapValued { .. }));
    }
}
