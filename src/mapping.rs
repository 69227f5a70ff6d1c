//! Mapping configurations
//!
//! The verifier only needs a completed mapping's registered transformations
//! and its type pair, which is what `MappingConfiguration` exposes. `Mapping`
//! is a minimal in-process implementation built from two `TypeSchema`s.

use crate::error::{Error, Result};
use crate::property::{TypeSchema, TypedProperty};
use crate::transform::Transform;
use crate::transformation::TransformationRecord;
use std::collections::HashSet;
use tracing::trace;

/// A completed mapping between a source and a destination type
pub trait MappingConfiguration {
    /// Schema of the source type
    fn source_type(&self) -> &TypeSchema;

    /// Schema of the destination type
    fn destination_type(&self) -> &TypeSchema;

    /// Every registered property transformation, in registration order
    ///
    /// A pair is normally registered once. If it appears more than once, the
    /// verifier reconciles each assertion against every registration.
    fn transformations(&self) -> &[TransformationRecord];

    /// Short human-readable name, e.g. `Person -> PersonDto`
    fn describe(&self) -> String {
        format!(
            "{} -> {}",
            self.source_type().name,
            self.destination_type().name
        )
    }

    /// Stable hash of the registered pairs and their skip flags
    fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(self.describe().as_bytes());
        for t in self.transformations() {
            hasher.update(format!("\n{}|{}", t.pair(), t.skip_when_null()).as_bytes());
        }
        format!("sha256:{}", hex::encode(&hasher.finalize()[..8]))
    }
}

/// Mapping between two schemas
#[derive(Debug, Clone)]
pub struct Mapping {
    source: TypeSchema,
    destination: TypeSchema,
    transformations: Vec<TransformationRecord>,
}

impl Mapping {
    pub fn builder(source: TypeSchema, destination: TypeSchema) -> MappingBuilder {
        MappingBuilder {
            mapping: Mapping {
                source,
                destination,
                transformations: Vec::new(),
            },
            assigned: HashSet::new(),
        }
    }
}

impl MappingConfiguration for Mapping {
    fn source_type(&self) -> &TypeSchema {
        &self.source
    }

    fn destination_type(&self) -> &TypeSchema {
        &self.destination
    }

    fn transformations(&self) -> &[TransformationRecord] {
        &self.transformations
    }
}

/// Builder for `Mapping`
///
/// Each destination property may be written by at most one transformation.
#[derive(Debug)]
pub struct MappingBuilder {
    mapping: Mapping,
    assigned: HashSet<String>,
}

impl MappingBuilder {
    /// Copy `source` into `destination`; both must share a value type
    pub fn reassign(self, source: &str, destination: &str) -> Result<Self> {
        let (src, dst) = self.resolve(source, destination)?;
        if src.value_type() != dst.value_type() {
            return Err(Error::Mapping(format!(
                "cannot reassign {} to {}: types differ",
                src, dst
            )));
        }
        self.register(TransformationRecord::reassign(src, dst))
    }

    /// Convert `source` into `destination` with `transform`, also invoked on null input
    pub fn replace(self, source: &str, destination: &str, transform: Transform) -> Result<Self> {
        let (src, dst) = self.resolve(source, destination)?;
        self.register(TransformationRecord::new(src, dst, Some(transform), false)?)
    }

    /// Convert `source` into `destination` with `transform`, bypassed on null input
    pub fn replace_skip_when_null(
        self,
        source: &str,
        destination: &str,
        transform: Transform,
    ) -> Result<Self> {
        let (src, dst) = self.resolve(source, destination)?;
        self.register(TransformationRecord::new(src, dst, Some(transform), true)?)
    }

    pub fn build(self) -> Mapping {
        self.mapping
    }

    fn resolve(&self, source: &str, destination: &str) -> Result<(TypedProperty, TypedProperty)> {
        Ok((
            self.mapping.source.property(source)?,
            self.mapping.destination.property(destination)?,
        ))
    }

    fn register(mut self, record: TransformationRecord) -> Result<Self> {
        if !self.assigned.insert(record.destination().name().to_string()) {
            return Err(Error::Mapping(format!(
                "destination {} is already mapped",
                record.destination()
            )));
        }
        trace!(
            pair = %record.pair(),
            skip_when_null = record.skip_when_null(),
            "registered transformation"
        );
        self.mapping.transformations.push(record);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Value, ValueType};

    fn person() -> TypeSchema {
        TypeSchema::new("Person")
            .with_property("age", ValueType::Int)
            .with_property("name", ValueType::String)
    }

    fn person_dto() -> TypeSchema {
        TypeSchema::new("PersonDto")
            .with_property("age", ValueType::Int)
            .with_property("displayName", ValueType::String)
    }

    #[test]
    fn test_build_mapping() {
        let mapping = Mapping::builder(person(), person_dto())
            .reassign("age", "age")
            .unwrap()
            .replace_skip_when_null("name", "displayName", Transform::identity())
            .unwrap()
            .build();

        assert_eq!(mapping.describe(), "Person -> PersonDto");
        assert_eq!(mapping.transformations().len(), 2);
        assert!(!mapping.transformations()[0].skip_when_null());
        assert!(mapping.transformations()[1].skip_when_null());
    }

    #[test]
    fn test_unknown_property_is_rejected() {
        let err = Mapping::builder(person(), person_dto())
            .reassign("height", "age")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidProperty(_)));
    }

    #[test]
    fn test_reassign_requires_matching_types() {
        let err = Mapping::builder(person(), person_dto())
            .reassign("age", "displayName")
            .unwrap_err();
        assert!(matches!(err, Error::Mapping(_)));
    }

    #[test]
    fn test_destination_mapped_once() {
        let err = Mapping::builder(person(), person_dto())
            .reassign("age", "age")
            .unwrap()
            .replace("name", "age", Transform::infallible(|_| Value::Int(0)))
            .unwrap_err();
        assert!(matches!(err, Error::Mapping(_)));
    }

    #[test]
    fn test_fingerprint_tracks_skip_flag() {
        let a = Mapping::builder(person(), person_dto())
            .replace("name", "displayName", Transform::identity())
            .unwrap()
            .build();
        let b = Mapping::builder(person(), person_dto())
            .replace_skip_when_null("name", "displayName", Transform::identity())
            .unwrap()
            .build();
        assert!(a.fingerprint().starts_with("sha256:"));
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), a.clone().fingerprint());
    }
}
