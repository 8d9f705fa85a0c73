//! SQL-style query syntax parsers using chumsky.
//!
//! Parses statements like:
//! - `SELECT * FROM objects WHERE language = 'Kotlin'`
//! - `SELECT * FROM objects WHERE ((language = 'Kotlin' OR language = 'Java') AND framework = 'SpringBoot')`
//!
//! Only equality comparisons are supported. Composite expressions must be
//! parenthesized, the outermost one included; a group may chain several
//! clauses with one connective but never mix AND and OR.
//!
//! `SqlSyntax` (priority 60) handles full statements. `PredicateSyntax`
//! (priority 10, fallback) accepts the bare WHERE expression.

use crate::error::ParseError;
use crate::ir::Predicate;
use crate::syntax::common::{field_name, format_errors, kw, single_quoted_string, Extra};
use crate::syntax::QuerySyntax;
use chumsky::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;

/// Fast prefix check for the SELECT keyword
static SELECT_PREFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*SELECT\b").unwrap());

/// Plain identifier: letters, digits and underscores only
static PLAIN_IDENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{Alphabetic}\p{N}_]+$").unwrap());

/// Build the statement a bare predicate runs as.
///
/// A collection name that is not a plain identifier is double-quoted.
pub fn select_statement(collection: &str, predicate: &str) -> String {
    format!(
        "SELECT * FROM {} WHERE {}",
        quote_identifier(collection),
        predicate
    )
}

fn quote_identifier(name: &str) -> String {
    if PLAIN_IDENT_RE.is_match(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Parsed `SELECT * FROM <collection> WHERE <predicate>` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStatement {
    pub collection: String,
    pub predicate: Predicate,
}

/// Full SQL-style statement parser
pub struct SqlSyntax;

impl SqlSyntax {
    pub fn parse_statement(&self, input: &str) -> Result<SelectStatement, ParseError> {
        statement_parser()
            .parse(input)
            .into_result()
            .map_err(|errs| ParseError::Sql {
                errors: format_errors(&errs, input),
            })
    }
}

impl QuerySyntax for SqlSyntax {
    fn name(&self) -> &'static str {
        "sql"
    }

    fn can_handle(&self, input: &str) -> bool {
        SELECT_PREFIX_RE.is_match(input)
    }

    fn parse(&self, input: &str) -> Result<Predicate, ParseError> {
        self.parse_statement(input).map(|statement| statement.predicate)
    }

    fn priority(&self) -> u8 {
        60
    }
}

/// Bare predicate parser, the WHERE clause on its own
pub struct PredicateSyntax;

impl QuerySyntax for PredicateSyntax {
    fn name(&self) -> &'static str {
        "predicate"
    }

    fn can_handle(&self, input: &str) -> bool {
        !input.trim().is_empty()
    }

    fn parse(&self, input: &str) -> Result<Predicate, ParseError> {
        predicate_parser()
            .padded()
            .then_ignore(end())
            .parse(input)
            .into_result()
            .map_err(|errs| ParseError::Sql {
                errors: format_errors(&errs, input),
            })
    }

    fn priority(&self) -> u8 {
        10 // Lowest - fallback
    }
}

// ============================================================================
// Parsers
// ============================================================================

/// SELECT * FROM collection WHERE predicate
fn statement_parser<'src>() -> impl Parser<'src, &'src str, SelectStatement, Extra<'src>> {
    kw("SELECT")
        .ignore_then(just('*').padded())
        .ignore_then(kw("FROM"))
        .ignore_then(field_name().padded().labelled("collection name"))
        .then_ignore(kw("WHERE"))
        .then(predicate_parser())
        .then_ignore(end())
        .map(|(collection, predicate)| SelectStatement {
            collection,
            predicate,
        })
}

#[derive(Debug, Clone, Copy)]
enum Connective {
    And,
    Or,
}

/// expr := field = 'literal' | '(' expr ((AND expr)+ | (OR expr)+)? ')'
fn predicate_parser<'src>() -> impl Parser<'src, &'src str, Predicate, Extra<'src>> + Clone {
    recursive(|expr| {
        let comparison = field_name()
            .padded()
            .then_ignore(just('=').padded())
            .then(single_quoted_string().padded())
            .map(|(field, value)| Predicate::Equal { field, value })
            .labelled("comparison like language = 'Kotlin'");

        let and_chain = kw("AND")
            .ignore_then(expr.clone())
            .repeated()
            .at_least(1)
            .collect::<Vec<_>>()
            .map(|rest| (Connective::And, rest));

        let or_chain = kw("OR")
            .ignore_then(expr.clone())
            .repeated()
            .at_least(1)
            .collect::<Vec<_>>()
            .map(|rest| (Connective::Or, rest));

        let group = expr
            .then(choice((and_chain, or_chain)).or_not())
            .delimited_by(just('(').padded(), just(')').padded())
            .map(|(first, chain)| match chain {
                None => first,
                Some((connective, rest)) => {
                    let children = std::iter::once(first).chain(rest);
                    match connective {
                        Connective::And => Predicate::and(children),
                        Connective::Or => Predicate::or(children),
                    }
                }
            })
            .labelled("parenthesized expression");

        choice((group, comparison))
    })
}
