//! Structured boolean expressions over named fields.
//!
//! An expression is a tree of operators ([`ExpressionOperator`]) whose leaves
//! are field/condition/value terms ([`ExpressionTerm`]). The wire form uses a
//! `type` discriminator (`operator` / `term`) so clients can round-trip trees
//! without knowing the concrete node kind up front.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::docref::DocRef;

/// Logical combinator applied to an operator's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Op {
    /// All children must match.
    And,
    /// At least one child must match.
    Or,
    /// No child may match.
    Not,
}

/// Comparison condition applied by a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Condition {
    /// Field equals the value (wildcards `*` allowed).
    Equals,
    /// Field contains the value.
    Contains,
    /// Field is between two delimited values.
    Between,
    /// Field is greater than the value.
    GreaterThan,
    /// Field is less than the value.
    LessThan,
    /// Field references the given document.
    IsDocRef,
    /// Field has no value.
    IsNull,
    /// Field has a value.
    IsNotNull,
}

/// A node in an expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExpressionItem {
    /// A nested operator.
    Operator(ExpressionOperator),
    /// A leaf term.
    Term(ExpressionTerm),
}

impl ExpressionItem {
    /// Returns true when this node (and so its subtree) is enabled.
    #[must_use]
    pub fn enabled(&self) -> bool {
        match self {
            Self::Operator(op) => op.enabled,
            Self::Term(term) => term.enabled,
        }
    }
}

/// An operator node combining child items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionOperator {
    /// The combinator applied to the children.
    pub op: Op,
    /// Disabled operators are kept in the model but excluded from evaluation.
    #[serde(default = "default_enabled", skip_serializing_if = "is_true")]
    pub enabled: bool,
    /// Child operators and terms.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ExpressionItem>,
}

impl ExpressionOperator {
    /// Creates an enabled operator with no children.
    #[must_use]
    pub fn new(op: Op) -> Self {
        Self {
            op,
            enabled: true,
            children: Vec::new(),
        }
    }

    /// Adds a child term.
    #[must_use]
    pub fn with_term(mut self, term: ExpressionTerm) -> Self {
        self.children.push(ExpressionItem::Term(term));
        self
    }

    /// Adds a child operator.
    #[must_use]
    pub fn with_operator(mut self, operator: ExpressionOperator) -> Self {
        self.children.push(ExpressionItem::Operator(operator));
        self
    }

    /// Returns true when the operator has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Iterates the enabled leaf terms of the subtree, depth first.
    pub fn terms(&self) -> impl Iterator<Item = &ExpressionTerm> {
        let mut out = Vec::new();
        collect_terms(self, &mut out);
        out.into_iter()
    }
}

fn collect_terms<'a>(operator: &'a ExpressionOperator, out: &mut Vec<&'a ExpressionTerm>) {
    for child in &operator.children {
        match child {
            ExpressionItem::Operator(op) if op.enabled => collect_terms(op, out),
            ExpressionItem::Term(term) if term.enabled => out.push(term),
            _ => {}
        }
    }
}

/// A leaf term comparing a field against a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionTerm {
    /// The field the term applies to.
    pub field: String,
    /// The comparison condition.
    pub condition: Condition,
    /// The comparison value; empty for existence checks.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value: String,
    /// The referenced document for [`Condition::IsDocRef`] terms.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_ref: Option<DocRef>,
    /// Disabled terms are kept in the model but excluded from evaluation.
    #[serde(default = "default_enabled", skip_serializing_if = "is_true")]
    pub enabled: bool,
}

impl ExpressionTerm {
    /// Creates an enabled equality term.
    #[must_use]
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Condition::Equals, value)
    }

    /// Creates an enabled contains term.
    #[must_use]
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Condition::Contains, value)
    }

    /// Creates an enabled term with the given condition.
    #[must_use]
    pub fn new(field: impl Into<String>, condition: Condition, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            condition,
            value: value.into(),
            doc_ref: None,
            enabled: true,
        }
    }

    /// Creates a term referencing a document.
    #[must_use]
    pub fn is_doc_ref(field: impl Into<String>, doc_ref: DocRef) -> Self {
        Self {
            field: field.into(),
            condition: Condition::IsDocRef,
            value: String::new(),
            doc_ref: Some(doc_ref),
            enabled: true,
        }
    }
}

fn default_enabled() -> bool {
    true
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_true(value: &bool) -> bool {
    *value
}
