//! Assertions on a mapping
//!
//! `AssertMapping` collects the transformations a test expects a mapping to
//! have registered, then reconciles them in one `verify` pass.
//!
//! ```rust,ignore
//! let mut asserts = AssertMapping::of(&mapping);
//! asserts
//!     .expect_replace("age", "age")?
//!     .and_test(Transform::identity())?
//!     .expect_replace("name", "displayName")?
//!     .and_skip_when_null();
//! asserts.verify()?;
//! ```

use crate::config::VerifierConfig;
use crate::error::{Error, Result};
use crate::mapping::MappingConfiguration;
use crate::property::TypedProperty;
use crate::transform::Transform;
use crate::transformation::TransformationRecord;
use crate::value::ValueType;
use crate::verify::{VerificationReport, Verifier};
use tracing::debug;

/// Expected transformations for one mapping
///
/// Declaration happens through `&mut self`; `verify` consumes the collection,
/// so nothing can be declared after verification.
pub struct AssertMapping<'m> {
    mapping: &'m dyn MappingConfiguration,
    assertions: Vec<TransformationRecord>,
    config: VerifierConfig,
}

impl<'m> AssertMapping<'m> {
    /// Start asserting on `mapping` with the default policy
    pub fn of(mapping: &'m dyn MappingConfiguration) -> Self {
        Self {
            mapping,
            assertions: Vec::new(),
            config: VerifierConfig::default(),
        }
    }

    /// Replace the verification policy
    pub fn with_config(mut self, config: VerifierConfig) -> Self {
        self.config = config;
        self
    }

    pub fn mapping(&self) -> &'m dyn MappingConfiguration {
        self.mapping
    }

    /// Declared assertions, in declaration order
    pub fn assertions(&self) -> &[TransformationRecord] {
        &self.assertions
    }

    /// Expect a replace transformation between two named properties
    pub fn expect_replace(
        &mut self,
        source: &str,
        destination: &str,
    ) -> Result<ReplaceAssertBuilder<'_, 'm>> {
        let source = self.mapping.source_type().property(source)?;
        let destination = self.mapping.destination_type().property(destination)?;
        Ok(ReplaceAssertBuilder::new(source, destination, self))
    }

    /// Like `expect_replace`, additionally requiring the declared property types
    pub fn expect_replace_typed(
        &mut self,
        source: (&str, &ValueType),
        destination: (&str, &ValueType),
    ) -> Result<ReplaceAssertBuilder<'_, 'm>> {
        let source = self
            .mapping
            .source_type()
            .typed_property(source.0, source.1)?;
        let destination = self
            .mapping
            .destination_type()
            .typed_property(destination.0, destination.1)?;
        Ok(ReplaceAssertBuilder::new(source, destination, self))
    }

    /// Expect a replace transformation between already resolved properties
    pub fn expect_replace_property(
        &mut self,
        source: TypedProperty,
        destination: TypedProperty,
    ) -> Result<ReplaceAssertBuilder<'_, 'm>> {
        self.check_owned(&source, &destination)?;
        Ok(ReplaceAssertBuilder::new(source, destination, self))
    }

    /// Expect a plain copy of `source` into `destination`
    pub fn expect_reassign(&mut self, source: &str, destination: &str) -> Result<&mut Self> {
        let source = self.mapping.source_type().property(source)?;
        let destination = self.mapping.destination_type().property(destination)?;
        self.push(TransformationRecord::reassign(source, destination));
        Ok(self)
    }

    /// Add an expected transformation record.
    ///
    /// Its properties must belong to the mapping's source and destination
    /// types. Several records for the same pair are allowed and each one is
    /// reconciled on its own.
    pub fn add_assertion(&mut self, record: TransformationRecord) -> Result<()> {
        self.check_owned(record.source(), record.destination())?;
        self.push(record);
        Ok(())
    }

    /// Reconcile the declared assertions against the mapping
    pub fn verify(self) -> Result<VerificationReport> {
        Verifier::with_config(self.config).verify(self.mapping, &self.assertions)
    }

    fn check_owned(&self, source: &TypedProperty, destination: &TypedProperty) -> Result<()> {
        if !self.mapping.source_type().owns(source) {
            return Err(Error::InvalidProperty(format!(
                "{} is not a property of source type {}",
                source,
                self.mapping.source_type().name
            )));
        }
        if !self.mapping.destination_type().owns(destination) {
            return Err(Error::InvalidProperty(format!(
                "{} is not a property of destination type {}",
                destination,
                self.mapping.destination_type().name
            )));
        }
        Ok(())
    }

    fn push(&mut self, record: TransformationRecord) {
        debug!(
            pair = %record.pair(),
            skip_when_null = record.skip_when_null(),
            "assertion declared"
        );
        self.assertions.push(record);
    }
}

impl std::fmt::Debug for AssertMapping<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssertMapping")
            .field("mapping", &self.mapping.describe())
            .field("assertions", &self.assertions)
            .field("config", &self.config)
            .finish()
    }
}

/// Declares the expected behaviour of one replace transformation.
///
/// Every terminal method consumes the builder, appends exactly one record to
/// the owning `AssertMapping` and hands it back for further declarations.
#[must_use = "a replace assertion is only recorded by and_test or and_skip_when_null"]
pub struct ReplaceAssertBuilder<'a, 'm> {
    source: TypedProperty,
    destination: TypedProperty,
    asserts: &'a mut AssertMapping<'m>,
}

impl<'a, 'm> ReplaceAssertBuilder<'a, 'm> {
    fn new(
        source: TypedProperty,
        destination: TypedProperty,
        asserts: &'a mut AssertMapping<'m>,
    ) -> Self {
        Self {
            source,
            destination,
            asserts,
        }
    }

    /// Expect the mapping to invoke its transform on null input.
    ///
    /// `transformation` is compared with the configured transform by
    /// behaviour on probe inputs, not by identity. Passing `None` fails with
    /// `Error::NullArgument` and leaves the collection untouched.
    pub fn and_test(
        self,
        transformation: impl Into<Option<Transform>>,
    ) -> Result<&'a mut AssertMapping<'m>> {
        let transformation = transformation
            .into()
            .ok_or_else(|| Error::null_argument("transformation"))?;
        let record =
            TransformationRecord::new(self.source, self.destination, Some(transformation), false)?;
        self.asserts.push(record);
        Ok(self.asserts)
    }

    /// Expect the mapping to bypass its transform on null input
    pub fn and_skip_when_null(self) -> &'a mut AssertMapping<'m> {
        self.asserts
            .push(TransformationRecord::skipped(self.source, self.destination));
        self.asserts
    }

    /// Same as `and_skip_when_null`; the argument is ignored because a
    /// skipped transform is never checked.
    #[deprecated(note = "use `and_skip_when_null`; the transformation argument is ignored")]
    pub fn and_test_but_skip_when_null(
        self,
        _transformation: impl Into<Option<Transform>>,
    ) -> &'a mut AssertMapping<'m> {
        self.and_skip_when_null()
    }
}
