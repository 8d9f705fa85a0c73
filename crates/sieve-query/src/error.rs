//! Error types for the query pipeline.
//!
//! Parsers, the flattener and the record index each report their own
//! structured error. The engine collapses all of them into
//! [`QueryError::BadQuery`] at its public boundary.

use std::error::Error as StdError;
use thiserror::Error;

/// Errors produced by the dialect parsers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Malformed SQL-style statement or predicate
    #[error("{errors}")]
    Sql { errors: String },

    /// Malformed CQN expression
    #[error("{errors}")]
    Cqn { errors: String },

    /// No registered syntax accepted the input
    #[error("No syntax matched query '{input}' (tried: {})", .tried.join(", "))]
    NoMatchingSyntax {
        input: String,
        tried: Vec<&'static str>,
    },
}

/// Failure while turning an input object into a [`Record`](crate::Record).
#[derive(Debug, Error)]
pub enum FlattenError {
    /// The object did not serialize at all
    #[error("Failed to serialize object: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The object serialized to something other than a map or struct
    #[error("Cannot flatten {found} into a record; expected a struct or map")]
    NotAnObject { found: &'static str },
}

/// Failures surfaced by the evaluation layer (parse, index build, evaluate).
///
/// Wrapping variants keep the specific failure reachable through
/// [`std::error::Error::source`].
#[derive(Debug, Error)]
pub enum EvalError {
    /// The query text did not parse
    #[error("Failed to parse {dialect} query")]
    Syntax {
        dialect: &'static str,
        #[source]
        source: ParseError,
    },

    /// An input object could not be flattened
    #[error("Failed to flatten input object at position {position}")]
    Flatten {
        position: usize,
        #[source]
        source: FlattenError,
    },

    /// The query references a field that no record carries
    #[error("Attribute '{0}' is not registered for this collection")]
    UnknownAttribute(String),

    /// A numeric attribute holds a value that does not parse as a number
    #[error("Attribute '{field}' is numeric but a record holds non-numeric value '{value}'")]
    MixedType { field: String, value: String },

    /// Two input objects flattened to the same record under the reject policy
    #[error("Objects at positions {first} and {second} flatten to the same record")]
    DuplicateRecord { first: usize, second: usize },
}

/// Error returned by the public query operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The query could not be executed; the message is the most specific
    /// diagnostic available.
    #[error("Bad query: {0}")]
    BadQuery(String),
}

impl QueryError {
    /// Build a `BadQuery` from any failure, preferring its nested cause.
    pub fn from_failure(err: &(dyn StdError + 'static)) -> Self {
        let message = match err.source() {
            Some(cause) => cause.to_string(),
            None => err.to_string(),
        };
        Self::BadQuery(message)
    }

    /// The human-readable diagnostic carried by this error
    pub fn message(&self) -> &str {
        match self {
            Self::BadQuery(message) => message,
        }
    }
}

impl From<EvalError> for QueryError {
    fn from(err: EvalError) -> Self {
        Self::from_failure(&err)
    }
}

/// Failure loading an [`EngineConfig`](crate::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid engine config: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type QueryResult<T> = Result<T, QueryError>;
