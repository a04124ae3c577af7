//! Runtime value representation and errors

use crate::diagnostic::Diagnostic;
use crate::object::{FunctionObject, JsObject};
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

/// Runtime value type
///
/// Only the values the builtin layer hands around are modeled: primitives for
/// call arguments and function objects produced from builtin executables.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    /// Immutable, reference-counted string
    String(Rc<str>),
    /// Plain object, e.g. the receiver of a constructor call
    Object(Rc<JsObject>),
    /// Callable built from a builtin executable
    Function(Rc<FunctionObject>),
}

impl Value {
    /// Create a string value
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    pub fn as_function(&self) -> Option<&Rc<FunctionObject>> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            // Objects and functions compare by identity
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Function(func) => write!(f, "function {}() {{ [native code] }}", func.name()),
        }
    }
}

/// Runtime error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Allocation would push the heap past its configured limit
    #[error("Out of memory: requested {requested} bytes with {live} live (limit {limit})")]
    OutOfMemory {
        requested: usize,
        live: usize,
        limit: usize,
    },
    /// No builtin with this name in the family
    #[error("Unknown builtin: {family}.{name}")]
    UnknownBuiltin { family: String, name: String },
    /// Family is not registered with this VM
    #[error("Unknown builtin family: {family}")]
    UnknownFamily { family: String },
    /// Builtin source failed to compile; the table itself is broken
    #[error("Malformed builtin {name}: {diagnostic}")]
    MalformedBuiltin {
        name: String,
        diagnostic: Box<Diagnostic>,
    },
    /// Public lookup of an absent or private property
    #[error("{name} is not defined")]
    NotFound { name: String },
    /// `new` applied to a builtin that cannot construct
    #[error("{name} is not a constructor")]
    NotAConstructor { name: String },
}

impl RuntimeError {
    /// Compiler diagnostic behind this error, if any
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            RuntimeError::MalformedBuiltin { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }
}

/// Result alias for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;
