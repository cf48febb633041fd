//! JSON path evaluator
//!
//! Walks a document segment by segment. Each step maps the current node list
//! to the next one, so results come out in document order.

use serde_json::Value;
use std::cmp::Ordering;

use super::ast::*;

/// Evaluate a parsed path against `root`
pub fn evaluate<'a>(path: &JsonPath, root: &'a Value) -> Vec<&'a Value> {
    evaluate_segments(&path.segments, root)
}

/// Evaluate a path against one row of a field group.
///
/// The row is treated as the only element of a list, so a path starting with
/// an element selector (`$[*].foo`, `$[0].foo`) reads from the row itself.
/// Any other path is evaluated against the row directly.
pub fn evaluate_in_row<'a>(path: &JsonPath, row: &'a Value) -> Vec<&'a Value> {
    match path.segments.split_first() {
        Some((Segment::Child(selector), rest)) if selector.selects_elements() => {
            let mut out = Vec::new();
            for _ in 0..singleton_hits(selector, row) {
                out.extend(evaluate_segments(rest, row));
            }
            out
        }
        _ => evaluate(path, row),
    }
}

/// How many times `selector` picks the only element of `[row]`
fn singleton_hits(selector: &Selector, row: &Value) -> usize {
    match selector {
        Selector::Name(_) => 0,
        Selector::Wildcard => 1,
        Selector::Index(index) => usize::from(normalize_index(*index, 1).is_some()),
        Selector::Slice { start, end, step } => {
            slice_indices(*start, *end, step.unwrap_or(1), 1).len()
        }
        Selector::Union(selectors) => selectors.iter().map(|s| singleton_hits(s, row)).sum(),
        Selector::Filter(expr) => usize::from(matches_filter(expr, row)),
    }
}

fn evaluate_segments<'a>(segments: &[Segment], root: &'a Value) -> Vec<&'a Value> {
    let mut current = vec![root];

    for segment in segments {
        let mut next = Vec::new();
        for node in current {
            match segment {
                Segment::Child(selector) => select(selector, node, &mut next),
                Segment::Descendant(selector) => {
                    let mut stack = vec![node];
                    while let Some(n) = stack.pop() {
                        select(selector, n, &mut next);
                        push_children_reversed(n, &mut stack);
                    }
                }
            }
        }
        current = next;
        if current.is_empty() {
            break;
        }
    }

    current
}

fn push_children_reversed<'a>(node: &'a Value, stack: &mut Vec<&'a Value>) {
    match node {
        Value::Array(items) => stack.extend(items.iter().rev()),
        Value::Object(map) => stack.extend(map.values().rev()),
        _ => {}
    }
}

fn select<'a>(selector: &Selector, node: &'a Value, out: &mut Vec<&'a Value>) {
    match selector {
        Selector::Name(name) => {
            if let Some(v) = node.as_object().and_then(|m| m.get(name)) {
                out.push(v);
            }
        }
        Selector::Wildcard => match node {
            Value::Array(items) => out.extend(items.iter()),
            Value::Object(map) => out.extend(map.values()),
            _ => {}
        },
        Selector::Index(index) => {
            if let Some(items) = node.as_array() {
                if let Some(i) = normalize_index(*index, items.len()) {
                    out.push(&items[i]);
                }
            }
        }
        Selector::Slice { start, end, step } => {
            if let Some(items) = node.as_array() {
                for i in slice_indices(*start, *end, step.unwrap_or(1), items.len()) {
                    out.push(&items[i]);
                }
            }
        }
        Selector::Union(selectors) => {
            for s in selectors {
                select(s, node, out);
            }
        }
        Selector::Filter(expr) => {
            let children: Box<dyn Iterator<Item = &'a Value>> = match node {
                Value::Array(items) => Box::new(items.iter()),
                Value::Object(map) => Box::new(map.values()),
                _ => return,
            };
            out.extend(children.filter(|child| matches_filter(expr, child)));
        }
    }
}

fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let i = if index < 0 { len + index } else { index };
    (0..len).contains(&i).then_some(i as usize)
}

/// Indices selected by `[start:end:step]`, following Python slice rules
fn slice_indices(start: Option<i64>, end: Option<i64>, step: i64, len: usize) -> Vec<usize> {
    let len = len as i64;
    if step == 0 || len == 0 {
        return Vec::new();
    }

    let bound = |v: i64, lower: i64, upper: i64| {
        let v = if v < 0 { v + len } else { v };
        v.clamp(lower, upper)
    };

    let mut indices = Vec::new();
    if step > 0 {
        let lo = start.map_or(0, |s| bound(s, 0, len));
        let hi = end.map_or(len, |e| bound(e, 0, len));
        let mut i = lo;
        while i < hi {
            indices.push(i as usize);
            match i.checked_add(step) {
                Some(n) => i = n,
                None => break,
            }
        }
    } else {
        let hi = start.map_or(len - 1, |s| bound(s, -1, len - 1));
        let lo = end.map_or(-1, |e| bound(e, -1, len - 1));
        let mut i = hi;
        while i > lo {
            indices.push(i as usize);
            match i.checked_add(step) {
                Some(n) => i = n,
                None => break,
            }
        }
    }
    indices
}

fn matches_filter(expr: &FilterExpr, candidate: &Value) -> bool {
    let found = evaluate_segments(&expr.path, candidate);

    match &expr.comparison {
        None => !found.is_empty(),
        Some((op, literal)) => compare(found.first().copied(), *op, literal),
    }
}

fn compare(left: Option<&Value>, op: Comparison, right: &Value) -> bool {
    let Some(left) = left else {
        return op == Comparison::Ne;
    };

    match op {
        Comparison::Eq => values_equal(left, right),
        Comparison::Ne => !values_equal(left, right),
        _ => {
            let ordering = match (left, right) {
                (Value::Number(a), Value::Number(b)) => {
                    a.as_f64().zip(b.as_f64()).and_then(|(a, b)| a.partial_cmp(&b))
                }
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => None,
            };
            match ordering {
                Some(o) => match op {
                    Comparison::Lt => o == Ordering::Less,
                    Comparison::Le => o != Ordering::Greater,
                    Comparison::Gt => o == Ordering::Greater,
                    Comparison::Ge => o != Ordering::Less,
                    Comparison::Eq | Comparison::Ne => false,
                },
                None => false,
            }
        }
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}
