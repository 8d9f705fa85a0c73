//! Shared parser primitives for query syntaxes.
//!
//! Reusable chumsky parsers for identifiers, quoted literals and keywords,
//! plus error formatting shared by every dialect.

use chumsky::extra;
use chumsky::prelude::*;

/// Extra type for parsers - uses Rich errors for better messages
pub type Extra<'src> = extra::Err<Rich<'src, char>>;

// ============================================================================
// Primitive parsers
// ============================================================================

/// Parser for identifiers: alphanumeric + underscore
pub fn ident<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|s: &str| s.to_string())
        .labelled("identifier")
}

/// Parser for field names: a bare identifier, or one delimited by double
/// quotes or backticks. A doubled delimiter inside a quoted name stands for
/// itself: `"first-name"`, `` `odd``name` ``.
pub fn field_name<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    choice((ident(), quoted_ident('"'), quoted_ident('`'))).labelled("field name")
}

fn quoted_ident<'src>(delim: char) -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    let doubled = just(delim).ignore_then(just(delim));
    let plain = any().filter(move |c: &char| *c != delim);

    just(delim)
        .ignore_then(choice((doubled, plain)).repeated().collect::<String>())
        .then_ignore(just(delim))
}

/// Parser for single-quoted string literals: 'value'
///
/// `''` inside the literal is one quote: `'O''Brien'`.
pub fn single_quoted_string<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    let doubled = just("''").to('\'');

    just('\'')
        .ignore_then(choice((doubled, none_of("'"))).repeated().collect::<String>())
        .then_ignore(just('\''))
        .labelled("single-quoted string")
}

/// Parser for double-quoted string literals: "value"
///
/// Supports `\"` and `\\` escapes; any other backslash is kept as is.
pub fn double_quoted_string<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    let escape = just('\\').ignore_then(one_of("\"\\"));

    just('"')
        .ignore_then(choice((escape, none_of("\""))).repeated().collect::<String>())
        .then_ignore(just('"'))
        .labelled("double-quoted string")
}

/// Case-insensitive keyword parser, padded on both sides
pub fn kw<'src>(keyword: &'static str) -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_alphabetic())
        .repeated()
        .at_least(1)
        .to_slice()
        .try_map(move |s: &str, span| {
            if s.eq_ignore_ascii_case(keyword) {
                Ok(())
            } else {
                Err(Rich::custom(
                    span,
                    format!("expected keyword '{}'", keyword),
                ))
            }
        })
        .padded()
}

// ============================================================================
// Error formatting
// ============================================================================

/// Format chumsky errors with line/column positions
pub fn format_errors(errs: &[Rich<'_, char>], input: &str) -> String {
    errs.iter()
        .map(|e| {
            let start = e.span().start;
            let (line, col) = line_col(input, start);

            format!("Line {}, column {}: {}", line, col, e.reason())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 1-based line and column (in chars) of a byte offset
fn line_col(input: &str, offset: usize) -> (usize, usize) {
    let before = input.get(..offset).unwrap_or(input);
    let line = before.matches('\n').count() + 1;
    let col = before
        .rsplit('\n')
        .next()
        .map_or(0, |last| last.chars().count())
        + 1;
    (line, col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ident_simple() {
        let result = ident().parse("language").into_result();
        assert_eq!(result.unwrap(), "language");
    }

    #[test]
    fn test_ident_camel_case_with_number() {
        let result = ident().parse("nonExistentAttribute2").into_result();
        assert_eq!(result.unwrap(), "nonExistentAttribute2");
    }

    #[test]
    fn test_ident_with_underscore() {
        let result = ident().parse("first_name").into_result();
        assert_eq!(result.unwrap(), "first_name");
    }

    #[test]
    fn test_single_quoted() {
        let result = single_quoted_string().parse("'Spring Boot'").into_result();
        assert_eq!(result.unwrap(), "Spring Boot");
    }

    #[test]
    fn test_single_quoted_empty() {
        let result = single_quoted_string().parse("''").into_result();
        assert_eq!(result.unwrap(), "");
    }

    #[test]
    fn test_double_quoted() {
        let result = double_quoted_string().parse("\"Kotlin\"").into_result();
        assert_eq!(result.unwrap(), "Kotlin");
    }

    #[test]
    fn test_single_quoted_doubled_quote() {
        let result = single_quoted_string().parse("'O''Brien'").into_result();
        assert_eq!(result.unwrap(), "O'Brien");
    }

    #[test]
    fn test_double_quoted_escapes() {
        let result = double_quoted_string()
            .parse(r#""say \"hi\" \\ C:\temp""#)
            .into_result();
        assert_eq!(result.unwrap(), r#"say "hi" \ C:\temp"#);
    }

    #[test]
    fn test_field_name_forms() {
        assert_eq!(field_name().parse("language").into_result().unwrap(), "language");
        assert_eq!(
            field_name().parse(r#""first-name""#).into_result().unwrap(),
            "first-name"
        );
        assert_eq!(
            field_name().parse("`last name`").into_result().unwrap(),
            "last name"
        );
        assert_eq!(field_name().parse("`a``b`").into_result().unwrap(), "a`b");
    }

    #[test]
    fn test_field_name_rejects_bare_dash() {
        assert!(field_name().parse("first-name").into_result().is_err());
    }

    #[test]
    fn test_unterminated_string_fails() {
        assert!(single_quoted_string().parse("'Kotlin").into_result().is_err());
    }

    #[test]
    fn test_kw_case_insensitive() {
        assert!(kw("AND").parse("and").into_result().is_ok());
        assert!(kw("AND").parse(" And ").into_result().is_ok());
        assert!(kw("AND").parse("OR").into_result().is_err());
    }

    #[test]
    fn test_line_col() {
        assert_eq!(line_col("abc", 0), (1, 1));
        assert_eq!(line_col("abc", 2), (1, 3));
        assert_eq!(line_col("ab\ncd", 4), (2, 2));
    }

    #[test]
    fn test_format_errors_reports_position() {
        let input = "'open";
        let errs = single_quoted_string().parse(input).into_errors();
        let message = format_errors(&errs, input);

        assert!(message.starts_with("Line 1, column 6:"), "{message}");
        assert!(message.contains("end of input"), "{message}");
        assert!(!message.contains("(found"), "{message}");
    }
}
