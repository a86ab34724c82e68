//! Object path parsing
//!
//! Paths have the format `bucket[/key]`. A key ending in `/` (or an empty
//! key) names a prefix rather than a single object.

use crate::error::{Error, Result};

/// A parsed `bucket[/key]` location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectPath {
    /// Bucket name
    pub bucket: String,
    /// Object key (empty for bucket root)
    pub key: String,
}

impl ObjectPath {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Whether the path names a prefix rather than an object
    pub fn is_prefix(&self) -> bool {
        self.key.is_empty() || self.key.ends_with('/')
    }

    /// Final component of the key
    pub fn file_name(&self) -> Option<&str> {
        self.key
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
    }

    /// Append a child component to the key
    pub fn join(&self, child: &str) -> Self {
        let base = self.key.trim_end_matches('/');
        let key = if base.is_empty() {
            child.to_string()
        } else {
            format!("{base}/{child}")
        };
        Self::new(self.bucket.clone(), key)
    }
}

impl std::fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}", self.bucket)
        } else {
            write!(f, "{}/{}", self.bucket, self.key)
        }
    }
}

/// Parse `bucket[/key]`
pub fn parse_object_path(path: &str) -> Result<ObjectPath> {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return Err(Error::InvalidPath("Path cannot be empty".into()));
    }

    let (bucket, key) = path.split_once('/').unwrap_or((path, ""));
    if bucket.is_empty() {
        return Err(Error::InvalidPath(format!(
            "Invalid path '{path}'. Expected: bucket[/key]"
        )));
    }

    Ok(ObjectPath::new(bucket, key))
}

/// Parse a path that must name a single object
pub fn parse_object_key(path: &str) -> Result<ObjectPath> {
    let parsed = parse_object_path(path)?;
    if parsed.is_prefix() {
        return Err(Error::InvalidPath(format!(
            "'{path}' does not name an object. Expected: bucket/key"
        )));
    }
    Ok(parsed)
}
