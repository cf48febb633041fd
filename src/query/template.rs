//! Template interpolation
//!
//! Dashboard variables are substituted first (`$name`, `${name}` or
//! `[[name]]`), then time-range macros. Unknown variables are left as-is so
//! that macros such as `$__isoFrom()` survive the first pass.

use super::macros;
use super::time::TimeRange;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{(\w+)\}|\[\[(\w+)\]\]|\$(\w+)").expect("variable pattern is valid")
});

/// Dashboard variables in scope for one request
pub type ScopedVars = HashMap<String, String>;

/// Substitute dashboard variables in `text`
pub fn interpolate(text: &str, vars: &ScopedVars) -> String {
    if vars.is_empty() || !(text.contains('$') || text.contains("[[")) {
        return text.to_string();
    }

    VARIABLE
        .replace_all(text, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();
            match vars.get(name) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Applies variables and macros for one query execution
#[derive(Debug, Clone, Copy)]
pub struct Interpolator<'a> {
    range: &'a TimeRange,
    vars: &'a ScopedVars,
}

impl<'a> Interpolator<'a> {
    pub fn new(range: &'a TimeRange, vars: &'a ScopedVars) -> Self {
        Self { range, vars }
    }

    pub fn apply(&self, text: &str) -> String {
        macros::resolve(&interpolate(text, self.vars), self.range)
    }
}
