//! Transform functions and behavioural probing
//!
//! A `Transform` is a shared unary function from a source field value to a
//! destination field value. Two transforms cannot be compared by identity, so
//! verification compares what they *do*: both are invoked with the same probe
//! input and their `ProbeOutcome`s are compared.

use crate::value::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

/// Failure raised by a transform function
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct TransformError(pub String);

impl TransformError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

type TransformFn = dyn Fn(&Value) -> Result<Value, TransformError> + Send + Sync;

/// A unary transform function
#[derive(Clone)]
pub struct Transform {
    func: Arc<TransformFn>,
    label: Option<String>,
}

impl Transform {
    /// Wrap a fallible function
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, TransformError> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            label: None,
        }
    }

    /// Wrap an infallible function
    pub fn infallible<F>(func: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self::new(move |v| Ok(func(v)))
    }

    /// Transform that returns its input unchanged (plain field copy)
    pub fn identity() -> Self {
        Self::infallible(Value::clone).labeled("identity")
    }

    /// Attach a label used in diagnostics
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Invoke the function
    pub fn call(&self, input: &Value) -> Result<Value, TransformError> {
        (self.func)(input)
    }

    /// Invoke the function and record what happened, including panics
    ///
    /// A caught panic still runs the process panic hook, so the default hook
    /// prints a "thread panicked" message to stderr.
    pub fn probe(&self, input: &Value) -> ProbeOutcome {
        match catch_unwind(AssertUnwindSafe(|| self.call(input))) {
            Ok(Ok(value)) => ProbeOutcome::Returned(value),
            Ok(Err(e)) => ProbeOutcome::Failed(e.0),
            Err(payload) => ProbeOutcome::Failed(panic_message(payload.as_ref())),
        }
    }
}

impl std::fmt::Debug for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.label {
            Some(label) => write!(f, "Transform({})", label),
            None => write!(f, "Transform(<fn>)"),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

/// Observable effect of invoking a transform with one input
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// The transform returned a value
    Returned(Value),
    /// The transform returned an error or panicked
    Failed(String),
    /// The transform was not invoked (skipped on null)
    Skipped,
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Returned(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ProbeOutcome::Failed(_))
    }
}

impl std::fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeOutcome::Returned(v) => write!(f, "returned {}", v),
            ProbeOutcome::Failed(msg) => write!(f, "failed ({})", msg),
            ProbeOutcome::Skipped => write!(f, "skipped"),
        }
    }
}
