//! Query syntax parsers.
//!
//! This module defines the `QuerySyntax` trait and `QuerySyntaxRegistry`
//! for composable query parsing. Every syntax produces the same
//! [`Predicate`] tree, so adding a dialect never touches evaluation.

mod common;
mod cqn;
mod sql;

pub use cqn::CqnSyntax;
pub use sql::{select_statement, PredicateSyntax, SelectStatement, SqlSyntax};

use crate::error::ParseError;
use crate::ir::Predicate;
use std::sync::Arc;

/// Trait for query syntax parsers.
///
/// - `can_handle()` for fast detection
/// - `priority()` for ordering
/// - `parse()` for actual parsing
pub trait QuerySyntax: Send + Sync {
    /// Unique name for this syntax
    fn name(&self) -> &'static str;

    /// Fast check if this syntax might handle the input.
    ///
    /// Should be cheap (regex or prefix check). If true, `parse()` will be
    /// called. If false, the next syntax in priority order will be tried.
    fn can_handle(&self, input: &str) -> bool;

    /// Parse input into a predicate tree.
    fn parse(&self, input: &str) -> Result<Predicate, ParseError>;

    /// Priority (higher = tried first). Default: 50
    fn priority(&self) -> u8 {
        50
    }
}

/// Registry of syntax parsers (sorted by priority descending).
///
/// The first syntax where `can_handle()` returns true will be used.
pub struct QuerySyntaxRegistry {
    syntaxes: Vec<Arc<dyn QuerySyntax>>,
}

impl Default for QuerySyntaxRegistry {
    /// SQL statements, CQN and bare predicates
    fn default() -> Self {
        QuerySyntaxRegistryBuilder::new()
            .with_syntax(SqlSyntax)
            .with_syntax(CqnSyntax)
            .with_syntax(PredicateSyntax)
            .build()
    }
}

impl QuerySyntaxRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            syntaxes: Vec::new(),
        }
    }

    /// Register a syntax (re-sorts by priority)
    pub fn register(&mut self, syntax: Arc<dyn QuerySyntax>) {
        self.syntaxes.push(syntax);
        self.syntaxes
            .sort_by_key(|s| std::cmp::Reverse(s.priority()));
    }

    /// Find the first syntax willing to handle `input`
    pub fn detect(&self, input: &str) -> Option<&dyn QuerySyntax> {
        self.syntaxes
            .iter()
            .find(|s| s.can_handle(input))
            .map(|s| s.as_ref())
    }

    /// Parse using first matching syntax
    pub fn parse(&self, input: &str) -> Result<Predicate, ParseError> {
        match self.detect(input) {
            Some(syntax) => syntax.parse(input),
            None => Err(ParseError::NoMatchingSyntax {
                input: input.to_string(),
                tried: self.syntax_names(),
            }),
        }
    }

    /// Get list of registered syntax names
    pub fn syntax_names(&self) -> Vec<&'static str> {
        self.syntaxes.iter().map(|s| s.name()).collect()
    }
}

/// Builder for ergonomic registry construction
pub struct QuerySyntaxRegistryBuilder {
    syntaxes: Vec<Arc<dyn QuerySyntax>>,
}

impl Default for QuerySyntaxRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QuerySyntaxRegistryBuilder {
    pub fn new() -> Self {
        Self {
            syntaxes: Vec::new(),
        }
    }

    /// Add a syntax to the registry
    pub fn with_syntax(mut self, syntax: impl QuerySyntax + 'static) -> Self {
        self.syntaxes.push(Arc::new(syntax));
        self
    }

    /// Build the registry
    pub fn build(self) -> QuerySyntaxRegistry {
        let mut registry = QuerySyntaxRegistry::new();
        for syntax in self.syntaxes {
            registry.register(syntax);
        }
        registry
    }
}
