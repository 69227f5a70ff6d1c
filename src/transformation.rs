//! Transformation records
//!
//! A `TransformationRecord` describes one source -> destination property
//! transformation: the two property references, the transform function and
//! whether the function is bypassed when the source value is null. The same
//! type is used for what a mapping registers and for what an assertion expects.

use crate::error::{Error, Result};
use crate::property::{PropertyPair, TypedProperty};
use crate::transform::{ProbeOutcome, Transform};
use crate::value::Value;

/// One configured (or expected) property transformation
#[derive(Debug, Clone)]
pub struct TransformationRecord {
    pair: PropertyPair,
    transform: Option<Transform>,
    skip_when_null: bool,
}

impl TransformationRecord {
    /// Create a record.
    ///
    /// A record that does not skip on null must carry a transform, since that
    /// function is what null-input behaviour is checked against.
    pub fn new(
        source: TypedProperty,
        destination: TypedProperty,
        transform: Option<Transform>,
        skip_when_null: bool,
    ) -> Result<Self> {
        if !skip_when_null && transform.is_none() {
            return Err(Error::null_argument("transformation"));
        }
        Ok(Self {
            pair: PropertyPair::new(source, destination),
            transform,
            skip_when_null,
        })
    }

    /// Record for a plain copy/rename: identity transform, not skipped on null
    pub fn reassign(source: TypedProperty, destination: TypedProperty) -> Self {
        Self {
            pair: PropertyPair::new(source, destination),
            transform: Some(Transform::identity()),
            skip_when_null: false,
        }
    }

    /// Record that bypasses its (absent) transform on null input
    pub fn skipped(source: TypedProperty, destination: TypedProperty) -> Self {
        Self {
            pair: PropertyPair::new(source, destination),
            transform: None,
            skip_when_null: true,
        }
    }

    pub fn source(&self) -> &TypedProperty {
        &self.pair.source
    }

    pub fn destination(&self) -> &TypedProperty {
        &self.pair.destination
    }

    pub fn pair(&self) -> &PropertyPair {
        &self.pair
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    pub fn skip_when_null(&self) -> bool {
        self.skip_when_null
    }

    /// Run the transformation the way the mapper would: a null input on a
    /// skip-on-null record yields `Skipped` without invoking the function.
    pub fn apply(&self, input: &Value) -> ProbeOutcome {
        if input.is_null() && self.skip_when_null {
            return ProbeOutcome::Skipped;
        }
        match &self.transform {
            Some(t) => t.probe(input),
            None => ProbeOutcome::Skipped,
        }
    }
}
