//! Query model
//!
//! Types describing a saved JSON API query: where to send the request and
//! which fields to pull out of the response.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::params::KeyValues;
use super::path::parse_path;
use super::template::ScopedVars;
use super::time::TimeRange;

/// Type of an output field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Time,
    Boolean,
}

/// A field that produces one output column
#[derive(Debug, Clone, PartialEq)]
pub struct LeafField {
    pub path: String,
    pub name: Option<String>,
    pub field_type: Option<FieldType>,
}

impl LeafField {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            field_type: None,
        }
    }

    /// Builder method: set the output name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder method: force the output type
    pub fn field_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// Output column name: the configured name, else the last member name of
    /// the path, else the path itself
    pub fn column_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        parse_path(&self.path)
            .ok()
            .and_then(|p| p.last_name().map(str::to_string))
            .unwrap_or_else(|| self.path.clone())
    }
}

/// A field whose path selects sub-documents for its children
#[derive(Debug, Clone, PartialEq)]
pub struct FieldGroup {
    pub path: String,
    pub children: Vec<FieldSpec>,
}

/// What to extract from a response document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawField", into = "RawField")]
pub enum FieldSpec {
    Leaf(LeafField),
    Group(FieldGroup),
}

impl FieldSpec {
    pub fn leaf(path: impl Into<String>) -> Self {
        FieldSpec::Leaf(LeafField::new(path))
    }

    pub fn group(path: impl Into<String>, children: Vec<FieldSpec>) -> Self {
        FieldSpec::Group(FieldGroup {
            path: path.into(),
            children,
        })
    }

    pub fn path(&self) -> &str {
        match self {
            FieldSpec::Leaf(leaf) => &leaf.path,
            FieldSpec::Group(group) => &group.path,
        }
    }

    /// Short description used in error messages
    pub fn describe(&self) -> String {
        match self {
            FieldSpec::Leaf(LeafField {
                name: Some(name), ..
            }) if !name.is_empty() => format!("'{}' ({})", name, self.path()),
            _ => format!("'{}'", self.path()),
        }
    }

    /// Number of columns this spec produces
    pub fn leaf_count(&self) -> usize {
        match self {
            FieldSpec::Leaf(_) => 1,
            FieldSpec::Group(group) => group.children.iter().map(FieldSpec::leaf_count).sum(),
        }
    }
}

/// Saved form: `{ "jsonPath", "name"?, "type"?, "children"? }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    json_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<FieldSpec>>,
}

impl From<RawField> for FieldSpec {
    fn from(raw: RawField) -> Self {
        match raw.children {
            Some(children) if !children.is_empty() => FieldSpec::Group(FieldGroup {
                path: raw.json_path,
                children,
            }),
            _ => FieldSpec::Leaf(LeafField {
                path: raw.json_path,
                name: raw.name,
                field_type: raw.field_type,
            }),
        }
    }
}

impl From<FieldSpec> for RawField {
    fn from(spec: FieldSpec) -> Self {
        match spec {
            FieldSpec::Leaf(leaf) => RawField {
                json_path: leaf.path,
                name: leaf.name,
                field_type: leaf.field_type,
                children: None,
            },
            FieldSpec::Group(group) => RawField {
                json_path: group.path,
                children: Some(group.children),
                ..Default::default()
            },
        }
    }
}

/// HTTP method of a query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
}

/// A saved query against the JSON API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonQuery {
    #[serde(default)]
    pub ref_id: String,
    #[serde(default)]
    pub hide: bool,
    #[serde(default)]
    pub url_path: String,
    #[serde(default)]
    pub method: Method,
    #[serde(default)]
    pub params: KeyValues,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    /// Split the result into one frame per distinct value of this field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by_field: Option<String>,
}

impl JsonQuery {
    pub fn new(ref_id: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            ..Default::default()
        }
    }

    /// Builder method: set the URL path
    pub fn path(mut self, url_path: impl Into<String>) -> Self {
        self.url_path = url_path.into();
        self
    }

    /// Builder method: append a field
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }
}

/// A request covering several queries over one time range
#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub request_id: Uuid,
    pub range: TimeRange,
    pub scoped_vars: ScopedVars,
    pub targets: Vec<JsonQuery>,
}

impl QueryRequest {
    pub fn new(range: TimeRange, targets: Vec<JsonQuery>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            range,
            scoped_vars: ScopedVars::new(),
            targets,
        }
    }

    /// Builder method: add a dashboard variable
    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.scoped_vars.insert(name.into(), value.into());
        self
    }
}
