//! Errors raised by the binding layer.
//!
//! Configuration mistakes (unknown fields, item assignment on scalars, bad
//! schemas) fail fast with a [`ModelError`]. Coercion failures never surface
//! here: a cell that cannot coerce an incoming value stores it as-is.
use crate::value::{BinaryOp, Kind, UnaryOp};

/// Everything that can go wrong while declaring, building or using a model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("{model} has no field named `{field}`")]
    UnknownField { model: String, field: String },

    #[error("{model} declares the field `{field}` more than once")]
    DuplicateField { model: String, field: String },

    #[error("{model}.{field} is not a valid field name (names starting with `_` are private)")]
    InvalidFieldName { model: String, field: String },

    #[error("cannot assign items on {model}.{field}: a {kind} is not a container")]
    NotAContainer {
        model: String,
        field: String,
        kind: Kind,
    },

    #[error("{model}.{field} wraps a {kind}, which does not support `{operation}`")]
    Unsupported {
        model: String,
        field: String,
        kind: Kind,
        operation: &'static str,
    },

    #[error("{model}.{field} holds a {kind}, which is not a `{expected}`")]
    WrongType {
        model: String,
        field: String,
        kind: Kind,
        expected: &'static str,
    },

    #[error("index {index} is out of range for {model}.{field} (length {len})")]
    Index {
        model: String,
        field: String,
        index: i64,
        len: usize,
    },

    #[error("{model}.{field} has no key {key}")]
    MissingKey {
        model: String,
        field: String,
        key: String,
    },

    #[error("{model}.{field}: {source}")]
    Operation {
        model: String,
        field: String,
        #[source]
        source: OperationError,
    },

    #[error("expected a model of {expected}, found {found}")]
    SchemaMismatch { expected: String, found: String },

    #[error("could not encode {model}")]
    Encode {
        model: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not decode {model}")]
    Decode {
        model: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("encoded {model} must be a map of fields, found a {kind}")]
    NotAMap { model: String, kind: Kind },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failure of an operator applied to wrapped values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OperationError {
    #[error("unsupported operand kinds for {op}: {lhs} and {rhs}")]
    Unsupported { op: BinaryOp, lhs: Kind, rhs: Kind },

    #[error("bad operand kind for unary {op}: {kind}")]
    UnsupportedUnary { op: UnaryOp, kind: Kind },

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow in {op}")]
    Overflow { op: BinaryOp },
}

/// A value could not be converted toward a field's declared kind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot coerce {from} to {to}")]
pub struct CoercionError {
    pub from: Kind,
    pub to: Kind,
}

/// Failure of a key-value store backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage is unavailable: {0}")]
    Unavailable(String),

    #[error("storage backend failed: {0}")]
    Backend(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
