//! Key/multi-value lists
//!
//! Query parameters are edited as rows of a key plus one or more values.
//! Every edit targets a single cell or row; indices that fall outside the
//! list leave it unchanged.

use serde::{Deserialize, Serialize};

/// Ordered rows of `(key, values)`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyValues(Vec<(String, Vec<String>)>);

impl KeyValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn rows(&self) -> &[(String, Vec<String>)] {
        &self.0
    }

    /// Builder method: append a row
    pub fn with(mut self, key: impl Into<String>, values: &[&str]) -> Self {
        self.0
            .push((key.into(), values.iter().map(|v| v.to_string()).collect()));
        self
    }

    /// Replace the key of a row
    pub fn set_key(&mut self, row: usize, key: impl Into<String>) {
        if let Some((k, _)) = self.0.get_mut(row) {
            *k = key.into();
        }
    }

    /// Replace one value of a row
    pub fn set_value(&mut self, row: usize, index: usize, value: impl Into<String>) {
        if let Some(v) = self.0.get_mut(row).and_then(|(_, vals)| vals.get_mut(index)) {
            *v = value.into();
        }
    }

    /// Insert an empty row after `after`; on an empty list it becomes row 0
    pub fn insert_row(&mut self, after: usize) {
        let at = if self.0.is_empty() {
            0
        } else {
            (after + 1).min(self.0.len())
        };
        self.0.insert(at, (String::new(), vec![String::new()]));
    }

    pub fn remove_row(&mut self, row: usize) {
        if row < self.0.len() {
            self.0.remove(row);
        }
    }

    /// Insert an empty value after value `after` of a row
    pub fn insert_value(&mut self, row: usize, after: usize) {
        if let Some((_, vals)) = self.0.get_mut(row) {
            let at = if vals.is_empty() {
                0
            } else {
                (after + 1).min(vals.len())
            };
            vals.insert(at, String::new());
        }
    }

    pub fn remove_value(&mut self, row: usize, index: usize) {
        if let Some((_, vals)) = self.0.get_mut(row) {
            if index < vals.len() {
                vals.remove(index);
            }
        }
    }

    /// Flatten into `(key, value)` pairs, one per value, skipping empty keys
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter(|(key, _)| !key.is_empty())
            .flat_map(|(key, vals)| vals.iter().map(move |v| (key.clone(), v.clone())))
            .collect()
    }
}

impl From<Vec<(String, Vec<String>)>> for KeyValues {
    fn from(rows: Vec<(String, Vec<String>)>) -> Self {
        Self(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KeyValues {
        KeyValues::new()
            .with("tag", &["a", "b"])
            .with("limit", &["10"])
    }

    #[test]
    fn test_insert_row_on_empty() {
        let mut kv = KeyValues::new();
        kv.insert_row(0);
        assert_eq!(kv.rows(), &[(String::new(), vec![String::new()])]);
    }

    #[test]
    fn test_insert_row_after() {
        let mut kv = sample();
        kv.insert_row(0);
        assert_eq!(kv.len(), 3);
        assert_eq!(kv.rows()[1], (String::new(), vec![String::new()]));
        assert_eq!(kv.rows()[2].0, "limit");

        kv.insert_row(99);
        assert_eq!(kv.rows()[3].0, "");
    }

    #[test]
    fn test_set_cells_touch_only_one_row() {
        let mut kv = sample();
        kv.set_key(1, "max");
        kv.set_value(0, 1, "z");

        assert_eq!(kv.rows()[0], ("tag".to_string(), vec!["a".to_string(), "z".to_string()]));
        assert_eq!(kv.rows()[1], ("max".to_string(), vec!["10".to_string()]));
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut kv = sample();
        let before = kv.clone();
        kv.set_key(5, "x");
        kv.set_value(0, 7, "x");
        kv.remove_row(5);
        kv.remove_value(0, 9);
        kv.insert_value(4, 0);
        assert_eq!(kv, before);
    }

    #[test]
    fn test_multi_values() {
        let mut kv = sample();
        kv.insert_value(0, 0);
        assert_eq!(kv.rows()[0].1, vec!["a", "", "b"]);

        kv.remove_value(0, 2);
        assert_eq!(kv.rows()[0].1, vec!["a", ""]);

        kv.remove_row(0);
        assert_eq!(kv.len(), 1);
        assert_eq!(kv.rows()[0].0, "limit");
    }

    #[test]
    fn test_query_pairs() {
        let mut kv = sample();
        kv.insert_row(1);
        let pairs = kv.query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("tag".to_string(), "a".to_string()),
                ("tag".to_string(), "b".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_deserialize_pairs() {
        let kv: KeyValues = serde_json::from_str(r#"[["q", ["rust", "json"]]]"#).unwrap();
        assert_eq!(kv, KeyValues::new().with("q", &["rust", "json"]));
    }
}
