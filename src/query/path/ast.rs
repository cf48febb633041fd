//! JSON path abstract syntax tree

use serde_json::Value;

/// A parsed path: a sequence of segments applied from the root
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    pub segments: Vec<Segment>,
}

/// One step of a path
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Apply the selector to each current node (`.name`, `[0]`, ...)
    Child(Selector),
    /// Apply the selector to each current node and all its descendants (`..name`)
    Descendant(Selector),
}

/// What a segment selects from a node
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Object member by name
    Name(String),
    /// All members of an object or all elements of an array
    Wildcard,
    /// Array element; negative counts from the end
    Index(i64),
    /// Array slice with Python semantics
    Slice {
        start: Option<i64>,
        end: Option<i64>,
        step: Option<i64>,
    },
    /// Several selectors, results concatenated in order
    Union(Vec<Selector>),
    /// Children for which the predicate holds
    Filter(FilterExpr),
}

/// Predicate of a filter selector, evaluated against each child (`@`)
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpr {
    pub path: Vec<Segment>,
    pub comparison: Option<(Comparison, Value)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Selector {
    /// True for selectors that address array elements rather than members
    pub fn selects_elements(&self) -> bool {
        match self {
            Selector::Name(_) => false,
            Selector::Wildcard
            | Selector::Index(_)
            | Selector::Slice { .. }
            | Selector::Filter(_) => true,
            Selector::Union(selectors) => selectors.iter().all(Selector::selects_elements),
        }
    }
}

impl JsonPath {
    /// Last member name in the path, used to name unnamed fields
    pub fn last_name(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|seg| match seg {
            Segment::Child(Selector::Name(name)) | Segment::Descendant(Selector::Name(name)) => {
                Some(name.as_str())
            }
            _ => None,
        })
    }
}
