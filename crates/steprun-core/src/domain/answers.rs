//! The answer store shared by every step of a run.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Separator used when a multiselect answer is flattened into one string.
pub const SELECTION_SEPARATOR: &str = ", ";

/// Question id → answer, in the order the answers were collected.
///
/// Insertion order is the substitution order used by the resolver, which
/// keeps resolution deterministic. Entries are never removed during a run;
/// answering the same id again replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(IndexMap<String, String>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an answer, returning the previous value if the id was set.
    pub fn insert(&mut self, id: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(id.into(), value.into())
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    /// Answer for `id`, or `""` when the question was never answered.
    pub fn get_or_empty(&self, id: &str) -> &str {
        self.get(id).unwrap_or("")
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(id, answer)` pairs in collection order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Flatten a multiselect answer: labels joined in selection order.
    pub fn join_selection<I, S>(labels: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        labels
            .into_iter()
            .map(|l| l.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(SELECTION_SEPARATOR)
    }
}

impl<K, V> FromIterator<(K, V)> for AnswerMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V> Extend<(K, V)> for AnswerMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}
