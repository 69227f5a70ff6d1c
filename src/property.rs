//! Typed property references and the schemas they are resolved from
//!
//! There is no runtime reflection: every type taking part in a mapping is
//! described by a `TypeSchema`, an explicit registry of its properties.
//!
//! ```yaml
//! name: Person
//! properties:
//!   - name: age
//!     type: int
//!   - name: name
//!     type: string
//! ```

use crate::error::{Error, Result};
use crate::value::ValueType;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One named property of a type together with its declared value type.
///
/// Equality and hashing are structural over (owner, name, value type), so a
/// reference resolved by the mapping and one resolved by an assertion compare
/// equal when they denote the same field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypedProperty {
    owner: String,
    name: String,
    value_type: ValueType,
}

impl TypedProperty {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }
}

impl std::fmt::Display for TypedProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}: {}", self.owner, self.name, self.value_type)
    }
}

/// A source -> destination property pair, the key transformations are matched by
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyPair {
    pub source: TypedProperty,
    pub destination: TypedProperty,
}

impl PropertyPair {
    pub fn new(source: TypedProperty, destination: TypedProperty) -> Self {
        Self {
            source,
            destination,
        }
    }
}

impl std::fmt::Display for PropertyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.source.owner, self.source.name, self.destination.owner, self.destination.name
        )
    }
}

/// A property declaration inside a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PropertyDef {
    /// Property name
    pub name: String,

    /// Property type
    #[serde(rename = "type")]
    pub typ: ValueType,
}

/// Explicit description of one type's properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Type Schema", description = "Properties of a mapped type")]
pub struct TypeSchema {
    /// Type name
    pub name: String,

    /// Declared properties, unique by name
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
}

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"))
}

impl TypeSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Add a property (builder style)
    pub fn with_property(mut self, name: impl Into<String>, typ: ValueType) -> Self {
        self.properties.push(PropertyDef {
            name: name.into(),
            typ,
        });
        self
    }

    /// Parse schema from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let schema: Self =
            serde_norway::from_str(yaml).map_err(|e| Error::SchemaParse(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Parse schema from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let schema: Self =
            serde_json::from_str(json).map_err(|e| Error::SchemaParse(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Check names are identifiers and unique within the type
    pub fn validate(&self) -> Result<()> {
        if !identifier_pattern().is_match(&self.name) {
            return Err(Error::SchemaParse(format!(
                "type name '{}' is not an identifier",
                self.name
            )));
        }

        let mut seen = std::collections::HashSet::new();
        for prop in &self.properties {
            if !identifier_pattern().is_match(&prop.name) {
                return Err(Error::SchemaParse(format!(
                    "property name '{}' on {} is not an identifier",
                    prop.name, self.name
                )));
            }
            if !seen.insert(prop.name.as_str()) {
                return Err(Error::SchemaParse(format!(
                    "duplicate property '{}' on {}",
                    prop.name, self.name
                )));
            }
        }
        Ok(())
    }

    /// Resolve a property by name
    pub fn property(&self, name: &str) -> Result<TypedProperty> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| TypedProperty {
                owner: self.name.clone(),
                name: p.name.clone(),
                value_type: p.typ.clone(),
            })
            .ok_or_else(|| {
                Error::InvalidProperty(format!(
                    "type {} has no property '{}'",
                    self.name, name
                ))
            })
    }

    /// Resolve a property by name and require its declared type
    pub fn typed_property(&self, name: &str, expected: &ValueType) -> Result<TypedProperty> {
        let prop = self.property(name)?;
        if prop.value_type != *expected {
            return Err(Error::InvalidProperty(format!(
                "{}.{} is declared as {}, expected {}",
                self.name, name, prop.value_type, expected
            )));
        }
        Ok(prop)
    }

    /// Whether `prop` was resolved from this schema
    pub fn owns(&self, prop: &TypedProperty) -> bool {
        prop.owner == self.name
            && self
                .properties
                .iter()
                .any(|p| p.name == prop.name && p.typ == prop.value_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> TypeSchema {
        TypeSchema::new("Person")
            .with_property("age", ValueType::Int)
            .with_property("name", ValueType::String)
    }

    #[test]
    fn test_resolve_property() {
        let age = person().property("age").unwrap();
        assert_eq!(age.owner(), "Person");
        assert_eq!(age.name(), "age");
        assert_eq!(age.value_type(), &ValueType::Int);
        assert_eq!(age.to_string(), "Person.age: int");
    }

    #[test]
    fn test_independent_resolutions_are_equal() {
        use std::collections::HashSet;
        let a = person().property("name").unwrap();
        let b = person().property("name").unwrap();
        assert_eq!(a, b);
        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_same_name_on_other_type_differs() {
        let dto = TypeSchema::new("PersonDto").with_property("age", ValueType::Int);
        assert_ne!(person().property("age").unwrap(), dto.property("age").unwrap());
    }

    #[test]
    fn test_unknown_property() {
        let err = person().property("height").unwrap_err();
        assert!(matches!(err, Error::InvalidProperty(_)));
    }

    #[test]
    fn test_type_mismatch() {
        let err = person().typed_property("age", &ValueType::String).unwrap_err();
        assert!(matches!(err, Error::InvalidProperty(_)));
        assert!(person().typed_property("age", &ValueType::Int).is_ok());
    }

    #[test]
    fn test_schema_from_yaml() {
        let schema = TypeSchema::from_yaml(
            r#"
name: Person
properties:
  - name: age
    type: int
  - name: tags
    type:
      list: string
"#,
        )
        .unwrap();
        assert_eq!(schema, person_with_tags());
    }

    fn person_with_tags() -> TypeSchema {
        TypeSchema::new("Person")
            .with_property("age", ValueType::Int)
            .with_property("tags", ValueType::list_of(ValueType::String))
    }

    #[test]
    fn test_schema_rejects_duplicates_and_bad_names() {
        let dup = TypeSchema::new("P")
            .with_property("a", ValueType::Int)
            .with_property("a", ValueType::Int);
        assert!(matches!(dup.validate(), Err(Error::SchemaParse(_))));

        let bad = TypeSchema::new("P").with_property("first-name", ValueType::String);
        assert!(matches!(bad.validate(), Err(Error::SchemaParse(_))));
    }

    #[test]
    fn test_owns() {
        let schema = person();
        let age = schema.property("age").unwrap();
        assert!(schema.owns(&age));
        let other = TypeSchema::new("Other").with_property("age", ValueType::Int);
        assert!(!other.owns(&age));
    }
}
