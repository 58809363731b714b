//! Request parameters
//!
//! One API call's form data: an insertion-ordered map from parameter name to a
//! text value or a local file (sent as a multipart part).

use std::fmt;
use std::path::PathBuf;

/// Parameter names whose values never reach the logs.
const REDACTED: [&str; 6] = ["lgpassword", "password", "retype", "token", "lgtoken", "sessionkey"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    File(PathBuf),
}

impl ParamValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            ParamValue::File(_) => None,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, ParamValue::File(_))
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<&String> for ParamValue {
    fn from(s: &String) -> Self {
        ParamValue::Text(s.clone())
    }
}

impl From<u32> for ParamValue {
    fn from(n: u32) -> Self {
        ParamValue::Text(n.to_string())
    }
}

impl From<i64> for ParamValue {
    fn from(n: i64) -> Self {
        ParamValue::Text(n.to_string())
    }
}

impl From<PathBuf> for ParamValue {
    fn from(path: PathBuf) -> Self {
        ParamValue::File(path)
    }
}

/// Ordered parameter map. Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    entries: Vec<(String, ParamValue)>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a parameter set for the given API action.
    pub fn action(action: &str) -> Self {
        Self::new().with("action", action)
    }

    /// Start an `action=query` parameter set.
    pub fn query() -> Self {
        Self::action("query")
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add the parameter only when a value is present.
    pub fn with_opt<V: Into<ParamValue>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    /// Add a valueless flag parameter (sent as an empty string) when `on`.
    pub fn with_flag(self, key: impl Into<String>, on: bool) -> Self {
        if on {
            self.with(key, "")
        } else {
            self
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Overlay `other` on top of `self`; keys in `other` win.
    pub fn merge(mut self, other: RequestParams) -> Self {
        for (k, v) in other.entries {
            self.insert(k, v);
        }
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Text value of a parameter.
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_text)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn action_name(&self) -> Option<&str> {
        self.get_text("action")
    }

    pub fn has_files(&self) -> bool {
        self.entries.iter().any(|(_, v)| v.is_file())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Text parameters as key/value pairs, in order. File parameters are skipped.
    pub fn text_pairs(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_text().map(|t| (k.as_str(), t)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Log-safe rendering with secrets masked.
    pub fn redacted(&self) -> Redacted<'_> {
        Redacted(self)
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = RequestParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

pub struct Redacted<'a>(&'a RequestParams);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.0.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match v {
                _ if REDACTED.contains(&k.as_str()) => write!(f, "{}=<redacted>", k)?,
                ParamValue::Text(t) => write!(f, "{}={}", k, t)?,
                ParamValue::File(p) => write!(f, "{}=@{}", k, p.display())?,
            }
        }
        f.write_str("}")
    }
}
