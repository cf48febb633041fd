//! JSON path evaluation
//!
//! Field extraction only needs one capability: evaluate a path expression
//! against a document and get back the matching values. That capability is
//! the [`PathEvaluator`] trait. [`JsonPathEvaluator`] implements it for a
//! JSONPath subset:
//!
//! - `$.store.book`: child access
//! - `$.store.book[0]`, `[-1]`: index
//! - `$.store.book[0:3]`: slice
//! - `$.store.book[*]`: wildcard
//! - `$..price`: recursive descent
//! - `$.store.book[?(@.price < 10)]`: filter

mod ast;
mod evaluator;
mod parser;

pub use ast::{Comparison, FilterExpr, JsonPath, Segment, Selector};
pub use evaluator::{evaluate, evaluate_in_row};
pub use parser::parse_path;

use crate::query::error::PathError;
use serde_json::Value;

/// Evaluates path expressions against JSON documents
pub trait PathEvaluator: Send + Sync {
    /// All values selected by `path`, in document order
    fn evaluate<'a>(&self, path: &str, document: &'a Value) -> Result<Vec<&'a Value>, PathError>;

    /// Values selected by `path` within one row of a field group.
    /// Defaults to evaluating against the row as a document.
    fn evaluate_in_row<'a>(
        &self,
        path: &str,
        row: &'a Value,
    ) -> Result<Vec<&'a Value>, PathError> {
        self.evaluate(path, row)
    }

    /// Check that `path` is valid without a real document
    fn validate(&self, path: &str) -> Result<(), PathError> {
        self.evaluate(path, &Value::Null).map(|_| ())
    }
}

/// The JSONPath dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPathEvaluator;

impl PathEvaluator for JsonPathEvaluator {
    fn evaluate<'a>(&self, path: &str, document: &'a Value) -> Result<Vec<&'a Value>, PathError> {
        let parsed = parse_path(path)?;
        Ok(evaluate(&parsed, document))
    }

    fn evaluate_in_row<'a>(
        &self,
        path: &str,
        row: &'a Value,
    ) -> Result<Vec<&'a Value>, PathError> {
        let parsed = parse_path(path)?;
        Ok(evaluate_in_row(&parsed, row))
    }

    fn validate(&self, path: &str) -> Result<(), PathError> {
        parse_path(path).map(|_| ())
    }
}
