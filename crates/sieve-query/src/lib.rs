//! In-memory object filtering with two query dialects.
//!
//! Hand the engine a slice of any `serde::Serialize` objects and a query;
//! get back references to the objects that match.
//!
//! ## Dialects
//!
//! - **SQL-style predicates**: `((language='Kotlin' OR language='Java') AND framework='SpringBoot')`.
//!   Equality only; every composite expression is parenthesized.
//! - **CQN**: `and(or(equal("language","Java"), equal("language","Kotlin")), equal("framework","SpringBoot"))`
//!
//! Both parse into the same [`Predicate`] tree and are evaluated by the same
//! [`RecordIndex`], so logically equivalent queries return identical results.
//!
//! ## Usage
//!
//! ```rust
//! use serde::Serialize;
//! use sieve_query::find_by_predicate_query;
//!
//! #[derive(Serialize)]
//! struct Developer {
//!     name: &'static str,
//!     language: &'static str,
//! }
//!
//! let developers = vec![
//!     Developer { name: "Sai", language: "Kotlin" },
//!     Developer { name: "Jane", language: "Java" },
//! ];
//!
//! let found = find_by_predicate_query(&developers, "language='Java'").unwrap();
//! assert_eq!(found[0].name, "Jane");
//! ```

pub mod attribute;
pub mod backmap;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod ir;
pub mod record;
pub mod syntax;

pub use attribute::{Attribute, AttributeKind, AttributeRegistry, AttributeValue};
pub use backmap::BackMap;
pub use config::{DuplicatePolicy, EngineConfig, MixedTypePolicy};
pub use engine::QueryEngine;
pub use error::{ConfigError, EvalError, FlattenError, ParseError, QueryError, QueryResult};
pub use index::{IndexKey, RecordId, RecordIndex};
pub use ir::Predicate;
pub use record::{FieldValue, Record};

use serde::Serialize;

/// Filter `objects` with a SQL-style predicate using the default engine.
pub fn find_by_predicate_query<'a, T: Serialize>(
    objects: &'a [T],
    query: &str,
) -> QueryResult<Vec<&'a T>> {
    QueryEngine::new().find_by_predicate_query(objects, query)
}

/// Filter `objects` with a CQN expression using the default engine.
pub fn find_by_cqn_query<'a, T: Serialize>(
    objects: &'a [T],
    query: &str,
) -> QueryResult<Vec<&'a T>> {
    QueryEngine::new().find_by_cqn_query(objects, query)
}

/// Filter `objects` with a query in any supported dialect.
pub fn find_by_query<'a, T: Serialize>(objects: &'a [T], query: &str) -> QueryResult<Vec<&'a T>> {
    QueryEngine::new().find_by_query(objects, query)
}
