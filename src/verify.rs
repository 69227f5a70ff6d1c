//! Verification: reconcile expected transformations against a mapping
//!
//! Every expected record must match a registered transformation with the same
//! skip-on-null policy and, when not skipped, the same behaviour on probe
//! inputs. Every registered transformation must in turn be covered by at
//! least one expected record (under the full-coverage policy).
//!
//! Mismatches are collected, never raised one at a time: a failed verification
//! carries all of them, in declaration order, followed by the coverage gap.
//!
//! Function identity cannot be checked. A transform is judged by what it does
//! on the probe inputs only (null, plus a typed sample when enabled), so two
//! different functions that agree on every probe are indistinguishable.
//!
//! For a transform that is not skipped on null, the expected function must
//! itself succeed on every test input: a function that errors or panics on null
//! input is rejected even if the mapping's transform fails the same way.
//! Beyond that, the outcomes are compared under `EquivalencePolicy`. The default `Strict`
//! policy also requires equal returned values, which is tighter than merely
//! requiring both to succeed; `Lenient` accepts any two successes.

use crate::config::{EquivalencePolicy, VerifierConfig};
use crate::error::{Error, Result};
use crate::mapping::MappingConfiguration;
use crate::property::PropertyPair;
use crate::transform::ProbeOutcome;
use crate::transformation::TransformationRecord;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Verify expected records against a mapping with the default policy
pub fn verify(
    mapping: &dyn MappingConfiguration,
    expected: &[TransformationRecord],
) -> Result<VerificationReport> {
    Verifier::new().verify(mapping, expected)
}

/// Mapping verifier
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    config: VerifierConfig,
}

/// One discrepancy between the expected and the registered transformations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Mismatch {
    /// An assertion names a pair the mapping never registered
    #[error("no transformation registered for {pair}")]
    UnmatchedAssertion { pair: PropertyPair },

    /// Expected and registered skip-on-null flags differ
    #[error("{pair}: expected skip_when_null={expected}, mapping has skip_when_null={actual}")]
    SkipSemanticsMismatch {
        pair: PropertyPair,
        expected: bool,
        actual: bool,
    },

    /// Expected and registered transforms behave differently on a probe
    #[error("{pair}: on input {probe} expected transform {expected}, mapping transform {actual}")]
    TransformBehaviorMismatch {
        pair: PropertyPair,
        probe: Value,
        expected: ProbeOutcome,
        actual: ProbeOutcome,
    },

    /// Registered transformations no assertion covers
    #[error("unasserted transformations: {}", join_pairs(.pairs))]
    UnassertedTransformations { pairs: Vec<PropertyPair> },
}

fn join_pairs(pairs: &[PropertyPair]) -> String {
    pairs
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Mismatch {
    /// Short tag for the kind of mismatch
    pub fn kind(&self) -> &'static str {
        match self {
            Mismatch::UnmatchedAssertion { .. } => "UNMATCHED",
            Mismatch::SkipSemanticsMismatch { .. } => "SKIP",
            Mismatch::TransformBehaviorMismatch { .. } => "BEHAVIOR",
            Mismatch::UnassertedTransformations { .. } => "UNASSERTED",
        }
    }
}

/// Aggregate failure of one verification pass
#[derive(Error, Debug, Clone)]
#[error(
    "Mapping {} failed verification with {} mismatch(es):{}",
    .mapping,
    .mismatches.len(),
    list_mismatches(.mismatches)
)]
pub struct VerificationFailure {
    /// Mapping under test, e.g. `Person -> PersonDto`
    pub mapping: String,
    /// Every mismatch found, in declaration order
    pub mismatches: Vec<Mismatch>,
    /// Coverage reached despite the failure
    pub coverage: Coverage,
}

fn list_mismatches(mismatches: &[Mismatch]) -> String {
    mismatches
        .iter()
        .map(|m| format!("\n  [{}] {}", m.kind(), m))
        .collect()
}

/// Report returned by a passed verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Mapping under test
    pub mapping: String,
    /// Mapping fingerprint
    pub mapping_hash: String,
    /// Number of assertions checked
    pub assertions: usize,
    /// Coverage information
    pub coverage: Coverage,
    /// Warnings
    pub warnings: Vec<String>,
}

/// Coverage statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Coverage {
    pub total: usize,
    pub covered: usize,
    pub percentage: f32,
    pub covered_pairs: Vec<String>,
    pub uncovered_pairs: Vec<String>,
}

impl Verifier {
    pub fn new() -> Self {
        Self {
            config: VerifierConfig::default(),
        }
    }

    pub fn with_config(config: VerifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    pub fn verify(
        &self,
        mapping: &dyn MappingConfiguration,
        expected: &[TransformationRecord],
    ) -> Result<VerificationReport> {
        let registered = mapping.transformations();
        debug!(
            mapping = %mapping.describe(),
            registered = registered.len(),
            expected = expected.len(),
            "verifying mapping"
        );

        // A pair registered more than once is checked against every registration
        let mut actual: HashMap<&PropertyPair, Vec<&TransformationRecord>> = HashMap::new();
        for record in registered {
            actual.entry(record.pair()).or_default().push(record);
        }

        let mut covered: HashSet<&PropertyPair> = HashSet::new();
        let mut mismatches = Vec::new();

        for exp in expected {
            let Some(registrations) = actual.get(exp.pair()) else {
                mismatches.push(Mismatch::UnmatchedAssertion {
                    pair: exp.pair().clone(),
                });
                continue;
            };
            covered.insert(exp.pair());

            let before = mismatches.len();
            for act in registrations {
                if let Some(mismatch) = self.check(exp, act) {
                    debug!(pair = %exp.pair(), kind = mismatch.kind(), "assertion mismatch");
                    mismatches.push(mismatch);
                }
            }
            if mismatches.len() == before {
                trace!(pair = %exp.pair(), "assertion matched");
            }
        }

        let mut seen = HashSet::new();
        let uncovered: Vec<PropertyPair> = registered
            .iter()
            .map(|r| r.pair())
            .filter(|p| !covered.contains(p) && seen.insert(*p))
            .cloned()
            .collect();

        let mut warnings = Vec::new();
        if !uncovered.is_empty() {
            if self.config.require_complete {
                mismatches.push(Mismatch::UnassertedTransformations {
                    pairs: uncovered.clone(),
                });
            } else {
                for pair in &uncovered {
                    warn!(pair = %pair, "transformation not asserted");
                    warnings.push(format!("Transformation {} is not asserted", pair));
                }
            }
        }

        let coverage = coverage(registered, &uncovered);

        if !mismatches.is_empty() {
            return Err(Error::Verification(VerificationFailure {
                mapping: mapping.describe(),
                mismatches,
                coverage,
            }));
        }

        Ok(VerificationReport {
            mapping: mapping.describe(),
            mapping_hash: mapping.fingerprint(),
            assertions: expected.len(),
            coverage,
            warnings,
        })
    }

    fn check(&self, exp: &TransformationRecord, act: &TransformationRecord) -> Option<Mismatch> {
        if exp.skip_when_null() != act.skip_when_null() {
            return Some(Mismatch::SkipSemanticsMismatch {
                pair: exp.pair().clone(),
                expected: exp.skip_when_null(),
                actual: act.skip_when_null(),
            });
        }

        if exp.skip_when_null() {
            return None;
        }

        for probe in self.probes(exp) {
            let expected = exp.apply(&probe);
            let actual = act.apply(&probe);
            if expected.is_failure() || !self.equivalent(&expected, &actual) {
                return Some(Mismatch::TransformBehaviorMismatch {
                    pair: exp.pair().clone(),
                    probe,
                    expected,
                    actual,
                });
            }
        }
        None
    }

    fn probes(&self, record: &TransformationRecord) -> Vec<Value> {
        let mut probes = vec![Value::Null];
        if self.config.probe_samples {
            probes.push(record.source().value_type().sample());
        }
        probes
    }

    fn equivalent(&self, expected: &ProbeOutcome, actual: &ProbeOutcome) -> bool {
        match (expected, actual) {
            (ProbeOutcome::Skipped, ProbeOutcome::Skipped) => true,
            (ProbeOutcome::Returned(a), ProbeOutcome::Returned(b)) => {
                self.config.equivalence == EquivalencePolicy::Lenient || a == b
            }
            _ => false,
        }
    }
}

fn coverage(registered: &[TransformationRecord], uncovered: &[PropertyPair]) -> Coverage {
    let mut seen = HashSet::new();
    let pairs: Vec<&PropertyPair> = registered
        .iter()
        .map(|r| r.pair())
        .filter(|p| seen.insert(*p))
        .collect();

    let covered_pairs: Vec<String> = pairs
        .iter()
        .filter(|p| !uncovered.contains(**p))
        .map(|p| p.to_string())
        .collect();
    let total = pairs.len();

    Coverage {
        total,
        covered: covered_pairs.len(),
        percentage: if total == 0 {
            100.0
        } else {
            (covered_pairs.len() as f32 / total as f32) * 100.0
        },
        covered_pairs,
        uncovered_pairs: uncovered.iter().map(|p| p.to_string()).collect(),
    }
}

impl VerificationReport {
    /// Format as human-readable report
    pub fn to_report(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Verification: PASSED ({})\n", self.mapping));
        out.push_str(&format!(
            "Coverage: {}/{} ({:.0}%)\n",
            self.coverage.covered, self.coverage.total, self.coverage.percentage
        ));

        if !self.warnings.is_empty() {
            out.push_str("\nWarnings:\n");
            for w in &self.warnings {
                out.push_str(&format!("  {}\n", w));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Mapping;
    use crate::property::TypeSchema;
    use crate::transform::{Transform, TransformError};
    use crate::value::ValueType;

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

    fn mapping() -> Mapping {
        Mapping::builder(person(), person_dto())
            .reassign("age", "age")
            .unwrap()
            .replace_skip_when_null("name", "displayName", Transform::identity())
            .unwrap()
            .build()
    }

    fn record(src: &str, dst: &str, t: Option<Transform>, skip: bool) -> TransformationRecord {
        TransformationRecord::new(
            person().property(src).unwrap(),
            person_dto().property(dst).unwrap(),
            t,
            skip,
        )
        .unwrap()
    }

    #[test]
    fn test_verify_all_matched() {
        let expected = vec![
            record("age", "age", Some(Transform::identity()), false),
            record("name", "displayName", None, true),
        ];
        let report = verify(&mapping(), &expected).unwrap();
        assert_eq!(report.coverage.covered, 2);
        assert_eq!(report.coverage.percentage, 100.0);
        assert!(report.mapping_hash.starts_with("sha256:"));
    }

    #[test]
    fn test_verify_collects_every_mismatch() {
        let expected = vec![
            record("name", "age", Some(Transform::identity()), true),
            record("name", "displayName", Some(Transform::identity()), false),
        ];
        let err = verify(&mapping(), &expected).unwrap_err();
        let kinds: Vec<_> = err.mismatches().iter().map(|m| m.kind()).collect();
        // name -> age is never registered
        assert_eq!(kinds, vec!["UNMATCHED", "SKIP", "UNASSERTED"]);
    }

    #[test]
    fn test_behavior_mismatch_on_null() {
        let constant = Transform::infallible(|_| Value::Int(0));
        let expected = vec![
            record("age", "age", Some(constant), false),
            record("name", "displayName", None, true),
        ];
        let err = verify(&mapping(), &expected).unwrap_err();
        match &err.mismatches()[0] {
            Mismatch::TransformBehaviorMismatch {
                probe,
                expected,
                actual,
                ..
            } => {
                assert_eq!(probe, &Value::Null);
                assert_eq!(expected, &ProbeOutcome::Returned(Value::Int(0)));
                assert_eq!(actual, &ProbeOutcome::Returned(Value::Null));
            }
            other => panic!("unexpected mismatch: {other}"),
        }
    }

    #[test]
    fn test_failing_on_null_is_rejected_even_when_mapping_fails_too() {
        let failing = |msg: &'static str| {
            Transform::new(move |v| match v {
                Value::Null => Err(TransformError::new(msg)),
                other => Ok(other.clone()),
            })
        };
        let mapping = Mapping::builder(person(), person_dto())
            .replace("age", "age", failing("mapper"))
            .unwrap()
            .build();
        let expected = vec![record("age", "age", Some(failing("test")), false)];
        let err = verify(&mapping, &expected).unwrap_err();
        match &err.mismatches()[0] {
            Mismatch::TransformBehaviorMismatch {
                probe,
                expected,
                actual,
                ..
            } => {
                assert_eq!(probe, &Value::Null);
                assert_eq!(expected, &ProbeOutcome::Failed("test".into()));
                assert_eq!(actual, &ProbeOutcome::Failed("mapper".into()));
            }
            other => panic!("unexpected mismatch: {other}"),
        }
    }

    /// Mapping that may register one pair several times
    struct RawMapping {
        source: TypeSchema,
        destination: TypeSchema,
        transformations: Vec<TransformationRecord>,
    }

    impl MappingConfiguration for RawMapping {
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

    #[test]
    fn test_every_registration_of_a_pair_is_checked() {
        let mapping = RawMapping {
            source: person(),
            destination: person_dto(),
            transformations: vec![
                record("name", "displayName", None, true),
                record("name", "displayName", Some(Transform::identity()), false),
            ],
        };
        let expected = vec![record("name", "displayName", None, true)];

        let err = verify(&mapping, &expected).unwrap_err();
        assert_eq!(
            err.mismatches(),
            &[Mismatch::SkipSemanticsMismatch {
                pair: expected[0].pair().clone(),
                expected: true,
                actual: false,
            }]
        );
        match err {
            Error::Verification(failure) => assert_eq!(failure.coverage.total, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_failure_is_a_std_error() {
        let err = verify(&mapping(), &[]).unwrap_err();
        let Error::Verification(failure) = err else {
            panic!("expected a verification failure");
        };
        let boxed: Box<dyn std::error::Error> = Box::new(failure);
        assert!(boxed.to_string().contains("[UNASSERTED]"));
    }

    #[test]
    fn test_lenient_accepts_different_values() {
        let expected = vec![
            record(
                "age",
                "age",
                Some(Transform::infallible(|_| Value::Int(0))),
                false,
            ),
            record("name", "displayName", None, true),
        ];
        let verifier = Verifier::with_config(VerifierConfig {
            equivalence: EquivalencePolicy::Lenient,
            ..Default::default()
        });
        assert!(verifier.verify(&mapping(), &expected).is_ok());
    }

    #[test]
    fn test_sample_probe_detects_non_null_divergence() {
        let null_safe_double = Transform::infallible(|v| match v {
            Value::Int(i) => Value::Int(i * 2),
            other => other.clone(),
        });
        let expected = vec![
            record("age", "age", Some(null_safe_double), false),
            record("name", "displayName", None, true),
        ];

        assert!(verify(&mapping(), &expected).is_ok());

        let verifier = Verifier::with_config(VerifierConfig {
            probe_samples: true,
            ..Default::default()
        });
        let err = verifier.verify(&mapping(), &expected).unwrap_err();
        match &err.mismatches()[0] {
            Mismatch::TransformBehaviorMismatch { probe, .. } => {
                assert_eq!(probe, &Value::Int(1))
            }
            other => panic!("unexpected mismatch: {other}"),
        }
    }

    #[test]
    fn test_incomplete_policy_warns() {
        let expected = vec![record("age", "age", Some(Transform::identity()), false)];
        let verifier = Verifier::with_config(VerifierConfig {
            require_complete: false,
            ..Default::default()
        });
        let report = verifier.verify(&mapping(), &expected).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.coverage.covered, 1);
        assert_eq!(
            report.coverage.uncovered_pairs,
            vec!["Person.name -> PersonDto.displayName".to_string()]
        );
        assert!(report.to_report().contains("Coverage: 1/2 (50%)"));
    }

    #[test]
    fn test_failure_display() {
        let err = verify(&mapping(), &[]).unwrap_err();
        let text = err.to_string();
        assert!(text.starts_with("Mapping Person -> PersonDto failed verification with 1 mismatch(es):"));
        assert!(text.contains("[UNASSERTED]"));
        assert!(text.contains("Person.age -> PersonDto.age"));
    }
}
