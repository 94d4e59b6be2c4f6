use serde_json::Value as JsonValue;
use std::fmt;

/// Opaque handle into the live value tree at a specific field's position.
///
/// Paths are dotted segment sequences (`address.city`). Group scopes add a
/// segment per group key; the root scope is the empty path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// The root scope.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parses a dotted path string. An empty string yields the root path.
    pub fn parse(path: &str) -> Self {
        if path.is_empty() {
            return Self::root();
        }
        Self(path.split('.').map(str::to_string).collect())
    }

    /// Returns a new path extended by one key segment.
    #[must_use]
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The final segment, or `None` for the root path.
    pub fn key(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Resolves this path against a value snapshot by walking dotted
    /// segments. A missing or non-object intermediate resolves to `None`;
    /// callers treat that as an undefined value, never as an error.
    pub fn lookup<'a>(&self, snapshot: &'a JsonValue) -> Option<&'a JsonValue> {
        let mut current = snapshot;
        for segment in &self.0 {
            match current {
                JsonValue::Object(map) => current = map.get(segment)?,
                _ => return None,
            }
        }
        Some(current)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}
