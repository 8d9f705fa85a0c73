//! CQN (canonical query notation) parser.
//!
//! Parses prefix-notation queries like:
//! - `equal("language", "Kotlin")`
//! - `and(equal("language", "Kotlin"), equal("framework", "SpringBoot"))`
//! - `and(or(equal("language", "Java"), equal("language", "Kotlin")), equal("framework", "SpringBoot"))`
//!
//! Field names and literals are double-quoted. `and` and `or` take two or
//! more operands.
//!
//! Priority: 55

use crate::error::ParseError;
use crate::ir::Predicate;
use crate::syntax::common::{double_quoted_string, format_errors, Extra};
use crate::syntax::QuerySyntax;
use chumsky::prelude::*;
use once_cell::sync::Lazy;
use regex::Regex;

/// Pattern for CQN function calls at start
static CQN_FUNCTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(equal|and|or)\s*\(").unwrap());

/// CQN syntax parser
pub struct CqnSyntax;

impl QuerySyntax for CqnSyntax {
    fn name(&self) -> &'static str {
        "cqn"
    }

    fn can_handle(&self, input: &str) -> bool {
        CQN_FUNCTION_RE.is_match(input)
    }

    fn parse(&self, input: &str) -> Result<Predicate, ParseError> {
        cqn_parser()
            .padded()
            .then_ignore(end())
            .parse(input)
            .into_result()
            .map_err(|errs| ParseError::Cqn {
                errors: format_errors(&errs, input),
            })
    }

    fn priority(&self) -> u8 {
        55
    }
}

fn cqn_parser<'src>() -> impl Parser<'src, &'src str, Predicate, Extra<'src>> + Clone {
    recursive(|expr| {
        let equal = just("equal")
            .ignore_then(
                double_quoted_string()
                    .padded()
                    .then_ignore(just(','))
                    .then(double_quoted_string().padded())
                    .delimited_by(just('(').padded(), just(')')),
            )
            .map(|(field, value)| Predicate::Equal { field, value })
            .labelled("equal(\"field\", \"value\")");

        let operands = expr
            .padded()
            .separated_by(just(','))
            .at_least(2)
            .collect::<Vec<_>>()
            .delimited_by(just('(').padded(), just(')'));

        let and = just("and")
            .ignore_then(operands.clone())
            .map(Predicate::And)
            .labelled("and(expr, expr, ...)");

        let or = just("or")
            .ignore_then(operands)
            .map(Predicate::Or)
            .labelled("or(expr, expr, ...)");

        choice((equal, and, or))
    })
}
