//! Field extraction
//!
//! Turns a JSON document and a tree of [`FieldSpec`]s into flat columns.
//!
//! # Alignment
//!
//! A top-level leaf gets every value its path matches. A group's path selects
//! rows (sub-documents); each descendant leaf then gets exactly one value per
//! row, the first match of its path within that row or `None` when nothing
//! matches. Nested groups select one sub-document per row the same way, so
//! every column under a top-level group has one entry per row.
//!
//! Child paths are resolved with [`PathEvaluator::evaluate_in_row`]: with the
//! JSONPath dialect a row reads as a one-element list, so `$[*].foo` and
//! `$.foo` select the same value.
//!
//! ```text
//! [{foo: "bar", abc: "def"}, {foo: "baz"}]
//!
//! group $[*] { $[*].foo, $.abc }  →  foo: ["bar", "baz"]
//!                                    abc: ["def", None]
//! ```

use serde_json::Value;
use tracing::debug;

use super::error::{QueryError, QueryResult};
use super::model::{FieldSpec, FieldType, LeafField};
use super::path::{JsonPathEvaluator, PathEvaluator};

/// One extracted output column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    /// Type requested by the field spec, if any
    pub field_type: Option<FieldType>,
    /// Extracted values; `None` marks a row with no match
    pub values: Vec<Option<Value>>,
}

impl Column {
    fn from_leaf(leaf: &LeafField, values: Vec<Option<Value>>) -> Self {
        Self {
            name: leaf.column_name(),
            field_type: leaf.field_type,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Extracts columns from documents using a [`PathEvaluator`]
#[derive(Debug, Clone, Default)]
pub struct FieldExtractor<E = JsonPathEvaluator> {
    evaluator: E,
}

impl FieldExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: PathEvaluator> FieldExtractor<E> {
    pub fn with_evaluator(evaluator: E) -> Self {
        Self { evaluator }
    }

    /// Extract one column per leaf of `fields`, depth-first
    pub fn extract(&self, document: &Value, fields: &[FieldSpec]) -> QueryResult<Vec<Column>> {
        self.validate(fields)?;

        let capacity = fields.iter().map(FieldSpec::leaf_count).sum();
        let mut columns = Vec::with_capacity(capacity);

        for field in fields {
            match field {
                FieldSpec::Leaf(leaf) => {
                    let values = self
                        .evaluate(field, document)?
                        .into_iter()
                        .map(|v| Some(v.clone()))
                        .collect();
                    columns.push(Column::from_leaf(leaf, values));
                }
                FieldSpec::Group(group) => {
                    let rows: Vec<Option<&Value>> =
                        self.evaluate(field, document)?.into_iter().map(Some).collect();
                    debug!(path = %group.path, rows = rows.len(), "Field group matched");
                    self.extract_rows(&rows, &group.children, &mut columns)?;
                }
            }
        }

        debug!(columns = columns.len(), "Extracted columns");
        Ok(columns)
    }

    /// Extract aligned columns: one value per row for every leaf under `fields`
    fn extract_rows<'a>(
        &self,
        rows: &[Option<&'a Value>],
        fields: &[FieldSpec],
        columns: &mut Vec<Column>,
    ) -> QueryResult<()> {
        for field in fields {
            let selected = rows
                .iter()
                .map(|row| -> QueryResult<Option<&'a Value>> {
                    match *row {
                        Some(doc) => {
                            Ok(self.evaluate_in_row(field, doc)?.into_iter().next())
                        }
                        None => Ok(None),
                    }
                })
                .collect::<QueryResult<Vec<_>>>()?;

            match field {
                FieldSpec::Leaf(leaf) => {
                    let values = selected.into_iter().map(|v| v.cloned()).collect();
                    columns.push(Column::from_leaf(leaf, values));
                }
                FieldSpec::Group(group) => {
                    self.extract_rows(&selected, &group.children, columns)?;
                }
            }
        }
        Ok(())
    }

    fn evaluate<'a>(&self, field: &FieldSpec, document: &'a Value) -> QueryResult<Vec<&'a Value>> {
        self.evaluator
            .evaluate(field.path(), document)
            .map_err(|cause| QueryError::PathEvaluation {
                spec: field.describe(),
                cause,
            })
    }

    fn evaluate_in_row<'a>(
        &self,
        field: &FieldSpec,
        row: &'a Value,
    ) -> QueryResult<Vec<&'a Value>> {
        self.evaluator
            .evaluate_in_row(field.path(), row)
            .map_err(|cause| QueryError::PathEvaluation {
                spec: field.describe(),
                cause,
            })
    }

    /// Check every path in the tree up front so that errors surface even
    /// when a group matches no rows
    fn validate(&self, fields: &[FieldSpec]) -> QueryResult<()> {
        for field in fields {
            self.evaluator
                .validate(field.path())
                .map_err(|cause| QueryError::PathEvaluation {
                    spec: field.describe(),
                    cause,
                })?;
            if let FieldSpec::Group(group) = field {
                self.validate(&group.children)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::error::PathError;
    use serde_json::json;

    fn doc() -> Value {
        json!([{ "foo": "bar", "abc": "def" }, { "foo": "baz", "abc": "ghj" }])
    }

    fn values(column: &Column) -> Vec<Option<Value>> {
        column.values.clone()
    }

    #[test]
    fn test_no_groups() {
        let fields = vec![FieldSpec::leaf("$[*].foo"), FieldSpec::leaf("$[*].abc")];
        let columns = FieldExtractor::new().extract(&doc(), &fields).unwrap();

        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "foo");
        assert_eq!(values(&columns[0]), vec![Some(json!("bar")), Some(json!("baz"))]);
        assert_eq!(values(&columns[1]), vec![Some(json!("def")), Some(json!("ghj"))]);
    }

    #[test]
    fn test_top_level_group_matches_flat_fields() {
        let flat = vec![FieldSpec::leaf("$[*].foo"), FieldSpec::leaf("$[*].abc")];
        let grouped = vec![FieldSpec::group(
            "$[*]",
            vec![FieldSpec::leaf("$.foo"), FieldSpec::leaf("$.abc")],
        )];

        let extractor = FieldExtractor::new();
        let a = extractor.extract(&doc(), &flat).unwrap();
        let b = extractor.extract(&doc(), &grouped).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_top_level_group_with_list_child_paths() {
        let fields = vec![FieldSpec::group(
            "$[*]",
            vec![FieldSpec::leaf("$[*].foo"), FieldSpec::leaf("$[*].abc")],
        )];

        let columns = FieldExtractor::new().extract(&doc(), &fields).unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "foo");
        assert_eq!(values(&columns[0]), vec![Some(json!("bar")), Some(json!("baz"))]);
        assert_eq!(values(&columns[1]), vec![Some(json!("def")), Some(json!("ghj"))]);
    }

    #[test]
    fn test_list_child_paths_keep_alignment() {
        let doc = json!([{ "foo": "bar" }, { "abc": "xyz" }]);
        let fields = vec![FieldSpec::group(
            "$[*]",
            vec![FieldSpec::leaf("$[0].foo"), FieldSpec::leaf("$[*].abc")],
        )];

        let columns = FieldExtractor::new().extract(&doc, &fields).unwrap();
        assert_eq!(values(&columns[0]), vec![Some(json!("bar")), None]);
        assert_eq!(values(&columns[1]), vec![None, Some(json!("xyz"))]);
    }

    #[test]
    fn test_missing_key_keeps_alignment() {
        let doc = json!([{ "foo": "bar", "abc": "def" }, { "foo": "baz" }, { "abc": "xyz" }]);
        let fields = vec![FieldSpec::group(
            "$[*]",
            vec![FieldSpec::leaf("$.foo"), FieldSpec::leaf("$.abc")],
        )];

        let columns = FieldExtractor::new().extract(&doc, &fields).unwrap();
        assert_eq!(columns[0].len(), 3);
        assert_eq!(columns[1].len(), 3);
        assert_eq!(values(&columns[0]), vec![Some(json!("bar")), Some(json!("baz")), None]);
        assert_eq!(values(&columns[1]), vec![Some(json!("def")), None, Some(json!("xyz"))]);
    }

    #[test]
    fn test_explicit_null_is_not_absent() {
        let doc = json!([{ "v": null }, {}]);
        let fields = vec![FieldSpec::group("$[*]", vec![FieldSpec::leaf("$.v")])];

        let columns = FieldExtractor::new().extract(&doc, &fields).unwrap();
        assert_eq!(values(&columns[0]), vec![Some(Value::Null), None]);
    }

    #[test]
    fn test_nested_groups_depth_first() {
        let doc = json!({
            "hosts": [
                { "name": "a", "stats": { "cpu": 0.5, "mem": 10 } },
                { "name": "b" },
                { "name": "c", "stats": { "cpu": 0.9 } }
            ],
            "total": 3
        });
        let fields = vec![
            FieldSpec::group(
                "$.hosts[*]",
                vec![
                    FieldSpec::leaf("$.name"),
                    FieldSpec::group(
                        "$.stats",
                        vec![FieldSpec::leaf("$.cpu"), FieldSpec::leaf("$.mem")],
                    ),
                ],
            ),
            FieldSpec::leaf("$.total"),
        ];

        let columns = FieldExtractor::new().extract(&doc, &fields).unwrap();
        let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["name", "cpu", "mem", "total"]);

        assert_eq!(
            values(&columns[1]),
            vec![Some(json!(0.5)), None, Some(json!(0.9))]
        );
        assert_eq!(values(&columns[2]), vec![Some(json!(10)), None, None]);
        assert_eq!(values(&columns[3]), vec![Some(json!(3))]);
    }

    #[test]
    fn test_nested_group_uses_first_sub_document() {
        let doc = json!({
            "hosts": [
                { "name": "a", "disks": [{ "size": 100 }, { "size": 200 }] },
                { "name": "b", "disks": [] },
                { "name": "c", "disks": [{ "mount": "/" }, { "size": 300 }] }
            ]
        });
        let fields = vec![FieldSpec::group(
            "$.hosts[*]",
            vec![
                FieldSpec::leaf("$.name"),
                FieldSpec::group("$.disks[*]", vec![FieldSpec::leaf("$.size")]),
            ],
        )];

        let columns = FieldExtractor::new().extract(&doc, &fields).unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[1].len(), 3);
        assert_eq!(values(&columns[1]), vec![Some(json!(100)), None, None]);
    }

    #[test]
    fn test_first_match_per_row() {
        let doc = json!([{ "tags": ["x", "y"] }, { "tags": [] }]);
        let fields = vec![FieldSpec::group("$[*]", vec![FieldSpec::leaf("$.tags[*]")])];

        let columns = FieldExtractor::new().extract(&doc, &fields).unwrap();
        assert_eq!(values(&columns[0]), vec![Some(json!("x")), None]);
    }

    #[test]
    fn test_empty_group_gives_empty_columns() {
        let doc = json!({ "items": [] });
        let fields = vec![FieldSpec::group(
            "$.items[*]",
            vec![FieldSpec::leaf("$.a"), FieldSpec::leaf("$.b")],
        )];

        let columns = FieldExtractor::new().extract(&doc, &fields).unwrap();
        assert_eq!(columns.len(), 2);
        assert!(columns.iter().all(Column::is_empty));
    }

    #[test]
    fn test_zero_matches_is_not_an_error() {
        let fields = vec![FieldSpec::leaf("$.nothing.here")];
        let columns = FieldExtractor::new().extract(&json!({}), &fields).unwrap();
        assert!(columns[0].is_empty());
    }

    #[test]
    fn test_invalid_path_names_field() {
        let fields = vec![
            FieldSpec::leaf("$.ok"),
            FieldSpec::Leaf(LeafField::new("$.bad[").name("Broken")),
        ];

        let err = FieldExtractor::new().extract(&json!({}), &fields).unwrap_err();
        match err {
            QueryError::PathEvaluation { spec, cause } => {
                assert_eq!(spec, "'Broken' ($.bad[)");
                assert!(matches!(cause, PathError::Syntax { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_child_path_in_empty_group() {
        let fields = vec![FieldSpec::group("$.none[*]", vec![FieldSpec::leaf("$[")])];
        let err = FieldExtractor::new().extract(&json!({}), &fields).unwrap_err();
        assert!(matches!(err, QueryError::PathEvaluation { .. }));
    }

    struct KeyEvaluator;

    impl PathEvaluator for KeyEvaluator {
        fn evaluate<'a>(&self, path: &str, document: &'a Value) -> Result<Vec<&'a Value>, PathError> {
            if path == "*" {
                return Ok(document.as_array().map(|a| a.iter().collect()).unwrap_or_default());
            }
            Ok(document.get(path).into_iter().collect())
        }
    }

    #[test]
    fn test_custom_evaluator() {
        let fields = vec![FieldSpec::group("*", vec![FieldSpec::leaf("foo")])];
        let columns = FieldExtractor::with_evaluator(KeyEvaluator)
            .extract(&doc(), &fields)
            .unwrap();
        assert_eq!(values(&columns[0]), vec![Some(json!("bar")), Some(json!("baz"))]);
    }
}
