/// Record (Go struct) definitions parsed from source snippets.
///
/// - **[`annotation`]** — `//rpc:<name>` override markers on trailing comments
/// - **[`grammar`]** — tree-sitter Go grammar and struct query
/// - **[`parser`]** — snippet → [`RecordDefinition`]
pub mod annotation;
pub mod grammar;
pub mod parser;

use std::fmt;

use thiserror::Error;

pub use parser::RecordParser;

/// Fields carrying this prefix are generator artifacts and never mapped.
pub const INTERNAL_FIELD_PREFIX: &str = "XXX_";

/// Semantic type of a struct field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// Identifier, possibly package-qualified (`int64`, `time.Duration`).
    Named(String),
    /// `[]T` with a named element type.
    SequenceOf(String),
    /// Any inline `struct { ... }`; its shape is irrelevant downstream.
    AnonymousRecord,
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(name) => f.write_str(name),
            TypeExpr::SequenceOf(elem) => write!(f, "[]{elem}"),
            TypeExpr::AnonymousRecord => f.write_str("struct{}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeExpr,
    /// Raw trailing comment, delimiters included. Empty when absent.
    pub comment: String,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            comment: String::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Name of the field on the other record this one binds to, if annotated.
    pub fn override_name(&self) -> Option<&str> {
        annotation::override_name(&self.comment)
    }
}

/// Why a declared field was left out of [`RecordDefinition::fields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Pointer, map, array, generic, func, chan or interface type.
    UnsupportedType,
    /// Embedded (anonymous) field.
    Embedded,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedType => f.write_str("unsupported type"),
            SkipReason::Embedded => f.write_str("embedded field"),
        }
    }
}

/// A declared field that cannot take part in mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedField {
    /// Field name; the type text for embedded fields.
    pub name: String,
    pub type_text: String,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            SkipReason::Embedded => write!(f, "{} ({})", self.type_text, self.reason),
            SkipReason::UnsupportedType => {
                write!(f, "{} {} ({})", self.name, self.type_text, self.reason)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDefinition {
    pub type_name: String,
    /// Declaration order.
    pub fields: Vec<Field>,
    /// Declared fields left out of `fields`, in declaration order.
    pub skipped: Vec<SkippedField>,
}

impl RecordDefinition {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Errors produced while parsing a struct snippet.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("syntax error at line {line}, column {column} near {near:?}")]
    Syntax {
        line: usize,
        column: usize,
        near: String,
    },

    #[error("no struct type declaration found")]
    NoRecord,

    #[error("expected a single struct declaration, found {}: {}", .0.len(), .0.join(", "))]
    MultipleRecords(Vec<String>),

    #[error("parser setup failed: {0}")]
    Setup(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_expr_display() {
        assert_eq!(TypeExpr::Named("int64".into()).to_string(), "int64");
        assert_eq!(
            TypeExpr::Named("time.Duration".into()).to_string(),
            "time.Duration"
        );
        assert_eq!(TypeExpr::SequenceOf("string".into()).to_string(), "[]string");
        assert_eq!(TypeExpr::AnonymousRecord.to_string(), "struct{}");
    }

    #[test]
    fn test_type_expr_equality_is_structural() {
        assert_ne!(
            TypeExpr::Named("int32".into()),
            TypeExpr::SequenceOf("int32".into())
        );
        assert_eq!(TypeExpr::AnonymousRecord, TypeExpr::AnonymousRecord);
    }

    #[test]
    fn test_field_override_name() {
        let field = Field::new("UserID", TypeExpr::Named("int64".into()))
            .with_comment("//rpc:Uid primary key");
        assert_eq!(field.override_name(), Some("Uid"));
        assert_eq!(
            Field::new("Name", TypeExpr::Named("string".into())).override_name(),
            None
        );
    }
}
