// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # mapassert: verify object-to-object mapping configurations
//!
//! A mapping configuration describes how each field of a source type is
//! carried into a field of a destination type: copied, renamed, or converted
//! by a transform function that may be bypassed when the source value is null.
//! mapassert lets a test declare what it *expects* the mapping to do, then
//! reconciles those expectations against what the mapping actually registered.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mapassert::{AssertMapping, Mapping, Transform, TypeSchema, ValueType};
//!
//! let person = TypeSchema::new("Person")
//!     .with_property("age", ValueType::Int)
//!     .with_property("name", ValueType::String);
//! let dto = TypeSchema::new("PersonDto")
//!     .with_property("age", ValueType::Int)
//!     .with_property("displayName", ValueType::String);
//!
//! let mapping = Mapping::builder(person, dto)
//!     .reassign("age", "age")?
//!     .replace_skip_when_null("name", "displayName", Transform::identity())?
//!     .build();
//!
//! let mut asserts = AssertMapping::of(&mapping);
//! asserts
//!     .expect_replace("age", "age")?
//!     .and_test(Transform::identity())?
//!     .expect_replace("name", "displayName")?
//!     .and_skip_when_null();
//!
//! let report = asserts.verify()?;
//! println!("{}", report.to_report());
//! ```
//!
//! ## Reconciliation
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                                                              │
//! │  AssertMapping (expected records)      Mapping (registered)  │
//! │       │                                      │               │
//! │       └──────────► verify() ◄────────────────┘               │
//! │                       │                                      │
//! │      per expected record: lookup pair, skip flag, probes     │
//! │      per registered record: covered by some assertion?       │
//! │                       │                                      │
//! │       Ok(VerificationReport) | Err(VerificationFailure)      │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A failed verification lists every mismatch at once:
//!
//! | Mismatch | Meaning |
//! |----------|---------|
//! | `UnmatchedAssertion` | asserted pair was never registered |
//! | `SkipSemanticsMismatch` | skip-on-null flags differ |
//! | `TransformBehaviorMismatch` | transforms behave differently on a probe |
//! | `UnassertedTransformations` | registered pairs no assertion covers |
//!
//! Transforms are compared by behaviour, never by identity: both functions are
//! invoked with null (and optionally a typed sample) and their outcomes must
//! agree under the configured `EquivalencePolicy`.

pub mod assert;
pub mod config;
pub mod error;
pub mod mapping;
pub mod property;
pub mod transform;
pub mod transformation;
pub mod value;
pub mod verify;

// Re-exports
pub use assert::{AssertMapping, ReplaceAssertBuilder};
pub use config::{config_schema, EquivalencePolicy, ProjectConfig, VerifierConfig};
pub use error::{Error, Result};
pub use mapping::{Mapping, MappingBuilder, MappingConfiguration};
pub use property::{PropertyDef, PropertyPair, TypeSchema, TypedProperty};
pub use transform::{ProbeOutcome, Transform, TransformError};
pub use transformation::TransformationRecord;
pub use value::{Value, ValueType};
pub use verify::{
    verify, Coverage, Mismatch, VerificationFailure, VerificationReport, Verifier,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
