use std::collections::HashSet;

use serde_json::Value;

/// Set of authorization group names. Unordered, membership-tested only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSet(HashSet<String>);

impl GroupSet {
    pub fn new<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            groups
                .into_iter()
                .map(Into::into)
                .filter(|g: &String| !g.is_empty())
                .collect(),
        )
    }

    /// Parse the group claim value.
    ///
    /// Identity providers hand this over in several shapes:
    /// - a JSON array value: `["a","b"]`
    /// - a string holding a JSON array: `"[\"a\",\"b\"]"`
    /// - a string holding a bracketed list mapped from SAML: `"[a,b]"`
    /// - a comma-separated string: `"a,b"`
    ///
    /// Anything else (absent, null, numbers, objects) yields an empty set.
    pub fn from_claim(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Array(items)) => Self::new(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::trim),
            ),
            Some(Value::String(raw)) => Self::parse_str(raw),
            _ => Self::default(),
        }
    }

    fn parse_str(raw: &str) -> Self {
        let raw = raw.trim();

        if let Ok(items) = serde_json::from_str::<Vec<String>>(raw) {
            return Self::new(items.iter().map(|s| s.trim()));
        }

        let inner = raw
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(raw);

        Self::new(
            inner
                .split(',')
                .map(|s| s.trim().trim_matches('"').trim()),
        )
    }

    pub fn contains(&self, group: &str) -> bool {
        self.0.contains(group)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn intersection(&self, other: &GroupSet) -> GroupSet {
        GroupSet(self.0.intersection(&other.0).cloned().collect())
    }
}
