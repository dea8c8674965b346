//! Quick filters: a compact textual query syntax.
//!
//! User input such as `foo bar type:feed` is split into whitespace-delimited,
//! quote-aware tokens. Unqualified tokens apply to a configured set of default
//! fields; `field:value` tokens apply to the named field, and a trailing
//! `field:` is shorthand for "field exists". Two consumers build on the
//! tokenizer:
//!
//! - [`QuickFilterParser`] translates input into an [`ExpressionOperator`]
//!   tree for the query layer.
//! - [`FilterFieldMappers`] applies input directly to in-memory collections,
//!   used by listing endpoints to narrow result sets.
//!
//! Unfinished input (for example an unbalanced quote) is never an error at
//! the tokenizer level; it produces an empty token list so that callers can
//! treat it as "nothing matches yet" while the user is still typing.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expression::{ExpressionOperator, ExpressionTerm, Op};

const QUALIFIER_DELIMITER: char = ':';
const SPLIT_CHAR: char = ' ';
const QUOTE_CHAR: char = '"';
const ESCAPE_CHAR: char = '\\';

/// A single parsed filter token, optionally qualified with a field name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchToken {
    /// The field qualifier, if the token was written as `field:value`.
    pub qualifier: Option<String>,
    /// The match input; empty for `field:` existence shorthand.
    pub value: String,
}

impl MatchToken {
    fn unqualified(value: impl Into<String>) -> Self {
        Self {
            qualifier: None,
            value: value.into(),
        }
    }

    fn qualified(qualifier: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            value: value.into(),
        }
    }

    /// Returns true when the match input is blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }
}

/// Splits input on spaces, honouring double quotes and `\"` escapes.
///
/// Runs of spaces are collapsed; leading/trailing spaces are ignored. An odd
/// number of unescaped quotes means the user has not finished typing, so the
/// whole input yields an empty list rather than an error.
fn split_input(input: &str) -> Vec<String> {
    let cleaned = input.trim();
    if cleaned.is_empty() {
        return Vec::new();
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut inside_quotes = false;
    let mut unescaped_quotes = 0_usize;
    let mut last_char = '\0';

    for ch in cleaned.chars() {
        if ch == QUOTE_CHAR && last_char != ESCAPE_CHAR {
            unescaped_quotes += 1;
            inside_quotes = !inside_quotes;
            last_char = ch;
            continue;
        }

        if ch == QUOTE_CHAR {
            // Escaped quote: replace the escape character we buffered.
            current.pop();
            current.push(QUOTE_CHAR);
            last_char = ch;
            continue;
        }

        if ch == SPLIT_CHAR && !inside_quotes {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            last_char = ch;
            continue;
        }

        current.push(ch);
        last_char = ch;
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    if unescaped_quotes % 2 != 0 {
        // Unbalanced quotes, can't parse.
        tokens.clear();
    }

    tokens
}

/// Tokenizes quick-filter input into [`MatchToken`]s.
///
/// Returns an empty list for blank input or input that cannot be split yet
/// (unbalanced quotes).
///
/// # Errors
///
/// Returns [`Error::InvalidFilterToken`] for a token with a leading `:`.
pub fn tokenize(input: &str) -> Result<Vec<MatchToken>> {
    let parts = split_input(input);
    let mut tokens = Vec::with_capacity(parts.len());

    for part in parts {
        if part.starts_with(QUALIFIER_DELIMITER) {
            return Err(Error::InvalidFilterToken { token: part });
        }

        match part.split_once(QUALIFIER_DELIMITER) {
            Some((qualifier, value)) => {
                tokens.push(MatchToken::qualified(qualifier, value));
            }
            None => tokens.push(MatchToken::unqualified(part)),
        }
    }

    Ok(tokens)
}

/// Declares a filterable field: the qualifier users type and the indexed
/// field name terms are built against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterFieldDefinition {
    /// The qualifier accepted in filter input, e.g. `type`.
    pub qualifier: String,
    /// The field name used in generated expression terms.
    pub field_name: String,
    /// Whether unqualified tokens apply to this field.
    #[serde(default)]
    pub default_field: bool,
}

impl FilterFieldDefinition {
    /// Declares a qualified-only field.
    #[must_use]
    pub fn qualified(qualifier: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            qualifier: qualifier.into(),
            field_name: field_name.into(),
            default_field: false,
        }
    }

    /// Declares a field that unqualified tokens also apply to.
    #[must_use]
    pub fn default(qualifier: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            qualifier: qualifier.into(),
            field_name: field_name.into(),
            default_field: true,
        }
    }
}

/// Parses quick-filter input into an [`ExpressionOperator`] tree.
///
/// Tokens are ANDed together at the root. An unqualified token expands to an
/// OR of wildcard-equality terms (`*token*`) across the default fields; a
/// qualified token becomes an equality term against the mapped field.
///
/// # Example
///
/// ```rust
/// use vantage_core::quickfilter::{FilterFieldDefinition, QuickFilterParser};
///
/// let parser = QuickFilterParser::new(vec![
///     FilterFieldDefinition::default("name", "Name"),
///     FilterFieldDefinition::qualified("type", "Type"),
/// ]);
///
/// let expr = parser.parse("cpu type:feed").unwrap();
/// assert_eq!(expr.children.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct QuickFilterParser {
    fields: Vec<FilterFieldDefinition>,
}

impl QuickFilterParser {
    /// Creates a parser over the given field definitions.
    #[must_use]
    pub fn new(fields: Vec<FilterFieldDefinition>) -> Self {
        Self { fields }
    }

    /// Returns the qualifiers this parser accepts, sorted.
    #[must_use]
    pub fn qualifiers(&self) -> Vec<String> {
        let mut qualifiers: Vec<_> = self.fields.iter().map(|f| f.qualifier.clone()).collect();
        qualifiers.sort();
        qualifiers
    }

    fn default_fields(&self) -> Vec<&FilterFieldDefinition> {
        self.fields.iter().filter(|f| f.default_field).collect()
    }

    fn lookup(&self, qualifier: &str) -> Option<&FilterFieldDefinition> {
        self.fields.iter().find(|f| f.qualifier == qualifier)
    }

    /// Parses filter input into an expression tree rooted at an AND operator.
    ///
    /// Blank input, and input the tokenizer cannot split yet, both produce an
    /// empty root operator.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed token or an unknown qualifier.
    pub fn parse(&self, input: &str) -> Result<ExpressionOperator> {
        let mut root = ExpressionOperator::new(Op::And);

        for token in tokenize(input)? {
            match token.qualifier.as_deref() {
                Some(qualifier) => {
                    let field = self.lookup(qualifier).ok_or_else(|| {
                        Error::UnknownFilterField {
                            field: qualifier.to_string(),
                            valid: self.qualifiers(),
                        }
                    })?;
                    // `field:` keeps an empty value: the field-exists shorthand.
                    root = root.with_term(ExpressionTerm::equals(
                        field.field_name.clone(),
                        token.value,
                    ));
                }
                None => {
                    let defaults = self.default_fields();
                    if defaults.is_empty() {
                        return Err(Error::invalid_input(
                            "no default filter fields are defined",
                        ));
                    }
                    let wildcard = format!("*{}*", token.value);
                    if defaults.len() == 1 {
                        root = root.with_term(ExpressionTerm::equals(
                            defaults[0].field_name.clone(),
                            wildcard,
                        ));
                    } else {
                        let mut any = ExpressionOperator::new(Op::Or);
                        for field in defaults {
                            any = any.with_term(ExpressionTerm::equals(
                                field.field_name.clone(),
                                wildcard.clone(),
                            ));
                        }
                        root = root.with_operator(any);
                    }
                }
            }
        }

        Ok(root)
    }
}

/// Maps filter qualifiers onto value extractors for an item type, so that
/// quick-filter input can be applied directly to in-memory collections.
pub struct FilterFieldMappers<T> {
    mappers: Vec<FieldMapper<T>>,
}

struct FieldMapper<T> {
    qualifier: String,
    default_field: bool,
    extract: Box<dyn Fn(&T) -> Option<String> + Send + Sync>,
}

impl<T> Default for FilterFieldMappers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FilterFieldMappers<T> {
    /// Creates an empty mapper set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            mappers: Vec::new(),
        }
    }

    /// Adds a qualified-only field.
    #[must_use]
    pub fn with_field<F>(mut self, qualifier: impl Into<String>, extract: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.mappers.push(FieldMapper {
            qualifier: qualifier.into(),
            default_field: false,
            extract: Box::new(extract),
        });
        self
    }

    /// Adds a field that unqualified tokens also apply to.
    #[must_use]
    pub fn with_default_field<F>(mut self, qualifier: impl Into<String>, extract: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.mappers.push(FieldMapper {
            qualifier: qualifier.into(),
            default_field: true,
            extract: Box::new(extract),
        });
        self
    }

    /// Returns true when the item satisfies the filter input.
    ///
    /// Blank input matches everything. Input that cannot be parsed, or that
    /// names an unknown qualifier, matches nothing; the user may still be
    /// typing and an error would be noise.
    #[must_use]
    pub fn matches(&self, input: &str, item: &T) -> bool {
        if input.trim().is_empty() {
            return true;
        }

        let Ok(tokens) = tokenize(input) else {
            return false;
        };
        let tokens: Vec<_> = tokens.into_iter().filter(|t| !t.is_blank()).collect();
        if tokens.is_empty() {
            return false;
        }

        tokens.iter().all(|token| self.token_matches(token, item))
    }

    fn token_matches(&self, token: &MatchToken, item: &T) -> bool {
        match token.qualifier.as_deref() {
            Some(qualifier) => self
                .mappers
                .iter()
                .find(|m| m.qualifier == qualifier)
                .is_some_and(|mapper| field_contains(&(mapper.extract)(item), &token.value)),
            None => self
                .mappers
                .iter()
                .filter(|m| m.default_field)
                .any(|mapper| field_contains(&(mapper.extract)(item), &token.value)),
        }
    }

    /// Filters a collection, keeping items that satisfy the input.
    #[must_use]
    pub fn filter(&self, input: &str, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .filter(|item| self.matches(input, item))
            .collect()
    }
}

fn field_contains(field_value: &Option<String>, needle: &str) -> bool {
    field_value
        .as_deref()
        .is_some_and(|v| v.to_lowercase().contains(&needle.to_lowercase()))
}
