//! Reference parser for `PROJECT:VAR` syntax
//!
//! Parses linked references and concatenation expressions into the
//! referenced `(project, variable)` pairs, keeping the byte span of every
//! quoted token so resolved values can be spliced back in place.

use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_-]+):([A-Za-z0-9_-]+)$").expect("valid regex")
});

static QUOTED_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([A-Za-z0-9_-]+):([A-Za-z0-9_-]+)""#).expect("valid regex")
});

static LEGACY_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[|_\-/\\;, ]+").expect("valid regex"));

/// Errors produced while parsing a reference expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The text does not follow the `PROJECT:VAR` grammar.
    #[error("malformed reference: {0}")]
    MalformedReference(String),

    /// The expression contains no reference at all. Resolves to an absent value.
    #[error("expression contains no references")]
    EmptyExpression,
}

/// How a stored reference string should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceMode {
    /// A single `PROJECT:VAR` pointer.
    Linked,
    /// A concatenation expression.
    Concatenated,
}

/// A `(project, variable)` pair named by a reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableRef {
    /// Project name.
    pub project: String,
    /// Variable name within the project.
    pub variable: String,
}

impl VariableRef {
    /// Creates a reference.
    #[must_use]
    pub fn new(project: impl Into<String>, variable: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            variable: variable.into(),
        }
    }

    /// Parses a bare `PROJECT:VAR` string.
    ///
    /// # Errors
    /// Returns `ParseError::MalformedReference` if the whole string is not a reference.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        REFERENCE
            .captures(input)
            .map(|caps| Self::new(&caps[1], &caps[2]))
            .ok_or_else(|| ParseError::MalformedReference(input.to_string()))
    }
}

impl fmt::Display for VariableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project, self.variable)
    }
}

/// A quoted reference found inside a concatenation expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceToken {
    /// The referenced variable.
    pub reference: VariableRef,

    /// Byte range of the whole quoted literal (quotes included) in the expression.
    pub span: Range<usize>,
}

/// The structured form of a concatenation expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Concatenation {
    /// Quoted tokens; the text around them is kept verbatim on resolution.
    Quoted(Vec<ReferenceToken>),

    /// Legacy unquoted tokens; separators are discarded on resolution.
    Legacy(Vec<VariableRef>),
}

impl Concatenation {
    /// Returns every referenced variable in expression order.
    #[must_use]
    pub fn references(&self) -> Vec<&VariableRef> {
        match self {
            Self::Quoted(tokens) => tokens.iter().map(|t| &t.reference).collect(),
            Self::Legacy(references) => references.iter().collect(),
        }
    }
}

/// The structured form of a stored reference string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReference {
    /// A single link target.
    Linked(VariableRef),

    /// One or more concatenated references.
    Concatenated(Concatenation),
}

impl ParsedReference {
    /// Returns every referenced variable in expression order.
    #[must_use]
    pub fn references(&self) -> Vec<&VariableRef> {
        match self {
            Self::Linked(reference) => vec![reference],
            Self::Concatenated(concatenation) => concatenation.references(),
        }
    }
}

/// Parses a stored reference string.
///
/// # Examples
///
/// ```
/// use envlink_application::variable_resolver::parser::{
///     Concatenation, ParsedReference, ReferenceMode, parse,
/// };
///
/// let parsed = parse(r#""API:HOST":"API:PORT""#, ReferenceMode::Concatenated).unwrap();
/// let ParsedReference::Concatenated(Concatenation::Quoted(tokens)) = parsed else {
///     panic!("expected quoted form")
/// };
/// assert_eq!(tokens.len(), 2);
/// assert_eq!(tokens[1].reference.variable, "PORT");
/// assert_eq!(tokens[1].span, 11..21);
/// ```
///
/// # Errors
/// Returns `ParseError::MalformedReference` for an invalid link, and
/// `ParseError::EmptyExpression` when a concatenation names no reference.
pub fn parse(expression: &str, mode: ReferenceMode) -> Result<ParsedReference, ParseError> {
    match mode {
        ReferenceMode::Linked => VariableRef::parse(expression).map(ParsedReference::Linked),
        ReferenceMode::Concatenated => {
            parse_concatenation(expression).map(ParsedReference::Concatenated)
        }
    }
}

/// Parses a concatenation expression, preferring the quoted form.
///
/// # Errors
/// Returns `ParseError::EmptyExpression` when neither form yields a reference.
pub fn parse_concatenation(expression: &str) -> Result<Concatenation, ParseError> {
    let tokens: Vec<ReferenceToken> = QUOTED_REFERENCE
        .captures_iter(expression)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(ReferenceToken {
                reference: VariableRef::new(&caps[1], &caps[2]),
                span: whole.range(),
            })
        })
        .collect();

    if !tokens.is_empty() {
        return Ok(Concatenation::Quoted(tokens));
    }

    let references: Vec<VariableRef> = LEGACY_SEPARATORS
        .split(expression)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .filter_map(|fragment| VariableRef::parse(fragment).ok())
        .collect();

    if references.is_empty() {
        Err(ParseError::EmptyExpression)
    } else {
        Ok(Concatenation::Legacy(references))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn quoted(expression: &str) -> Vec<ReferenceToken> {
        match parse_concatenation(expression).unwrap() {
            Concatenation::Quoted(tokens) => tokens,
            other => panic!("expected quoted form, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_linked() {
        let parsed = parse("API:VERSION", ReferenceMode::Linked).unwrap();
        assert_eq!(parsed, ParsedReference::Linked(VariableRef::new("API", "VERSION")));
    }

    #[test]
    fn test_parse_linked_with_dashes_and_underscores() {
        let parsed = parse("web-app:DB_URL", ReferenceMode::Linked).unwrap();
        assert_eq!(parsed, ParsedReference::Linked(VariableRef::new("web-app", "DB_URL")));
    }

    #[test]
    fn test_malformed_linked() {
        for input in ["", "API", "API:", ":VAR", "API:VAR:X", "API VAR", "\"API:VAR\"", " API:VAR"] {
            assert_eq!(
                parse(input, ReferenceMode::Linked),
                Err(ParseError::MalformedReference(input.to_string())),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn test_quoted_single_token() {
        let tokens = quoted(r#""P:a""#);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].reference, VariableRef::new("P", "a"));
        assert_eq!(tokens[0].span, 0..5);
    }

    #[test]
    fn test_quoted_spans_cover_quotes() {
        let input = r#"https://"P:host":"P:port"/api"#;
        let tokens = quoted(input);
        assert_eq!(tokens.len(), 2);
        assert_eq!(&input[tokens[0].span.clone()], r#""P:host""#);
        assert_eq!(&input[tokens[1].span.clone()], r#""P:port""#);
    }

    #[test]
    fn test_quoted_adjacent_and_repeated() {
        let tokens = quoted(r#""P:a""P:a""#);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].span, 0..5);
        assert_eq!(tokens[1].span, 5..10);
    }

    #[test]
    fn test_quoted_takes_precedence_over_legacy() {
        // The bare P:b is ignored once any quoted token is present.
        let tokens = quoted(r#""P:a"|P:b"#);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].reference.variable, "a");
    }

    #[test]
    fn test_legacy_form() {
        let parsed = parse("P:a|P:b", ReferenceMode::Concatenated).unwrap();
        assert_eq!(
            parsed,
            ParsedReference::Concatenated(Concatenation::Legacy(vec![
                VariableRef::new("P", "a"),
                VariableRef::new("P", "b")
            ]))
        );
    }

    #[test]
    fn test_legacy_separator_class() {
        let parsed = parse(r"P:a / P:b\P:c;P:d,,P:e", ReferenceMode::Concatenated).unwrap();
        assert_eq!(parsed.references().len(), 5);
    }

    #[test]
    fn test_legacy_splits_on_underscore() {
        // `_` is a legacy separator, so names containing it are cut apart.
        let parsed = parse_concatenation("P:MY_VAR|P:b").unwrap();
        assert_eq!(
            parsed,
            Concatenation::Legacy(vec![VariableRef::new("P", "MY"), VariableRef::new("P", "b")])
        );
    }

    #[test]
    fn test_legacy_drops_non_reference_fragments() {
        let parsed = parse("P:a + literal | P:b", ReferenceMode::Concatenated).unwrap();
        assert_eq!(parsed.references().len(), 2);
    }

    #[test]
    fn test_empty_expression() {
        assert_eq!(parse("", ReferenceMode::Concatenated), Err(ParseError::EmptyExpression));
        assert_eq!(
            parse("just text", ReferenceMode::Concatenated),
            Err(ParseError::EmptyExpression)
        );
        assert_eq!(
            parse(r#""not a ref""#, ReferenceMode::Concatenated),
            Err(ParseError::EmptyExpression)
        );
    }

    #[test]
    fn test_variable_ref_display() {
        assert_eq!(VariableRef::new("API", "URL").to_string(), "API:URL");
        assert_eq!(VariableRef::parse("API:URL").unwrap().to_string(), "API:URL");
    }
}
