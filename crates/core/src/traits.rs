//! Storage seams
//!
//! A bucket handle never talks to the network itself. It asks a
//! [`StorageConnector`] for a bucket-scoped [`ObjectStore`] when opened and
//! delegates every object operation to it. This keeps the core independent
//! of any S3 SDK and lets the storage side be mocked in tests.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::acl::CannedAcl;
use crate::connection::ConnectionConfiguration;
use crate::error::Result;

/// Metadata for an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Object key
    pub key: String,

    /// Size in bytes
    pub size_bytes: i64,

    /// Human-readable size
    pub size_human: String,

    /// Last modified timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,

    /// ETag (usually MD5 for single-part uploads)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Content type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Storage class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
}

impl ObjectInfo {
    /// Create a new ObjectInfo for a key of the given size
    pub fn new(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size_bytes: size,
            size_human: humansize::format_size(size.max(0) as u64, humansize::BINARY),
            last_modified: None,
            etag: None,
            content_type: None,
            storage_class: None,
        }
    }
}

/// Result of listing a bucket
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResult {
    /// Objects directly under the prefix
    pub items: Vec<ObjectInfo>,

    /// Common prefixes ("directories") under the prefix
    pub prefixes: Vec<String>,

    /// Whether more results are available
    pub truncated: bool,
}

/// Bucket-scoped storage operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List objects under a prefix, grouped by `/`
    async fn list_objects(&self, prefix: &str) -> Result<ListResult>;

    /// Get object metadata
    async fn head_object(&self, key: &str) -> Result<ObjectInfo>;

    /// Get object content as bytes
    async fn get_object(&self, key: &str) -> Result<Vec<u8>>;

    /// Upload an object with the given canned ACL
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
        acl: CannedAcl,
    ) -> Result<ObjectInfo>;

    /// Delete an object
    async fn delete_object(&self, key: &str) -> Result<()>;
}

/// Builds storage clients for bucket handles
#[cfg_attr(test, mockall::automock)]
pub trait StorageConnector: Send + Sync {
    /// Build a client for `bucket` using a credential snapshot.
    ///
    /// Must not perform network I/O.
    fn connect(&self, bucket: &str, config: &ConnectionConfiguration)
    -> Result<Arc<dyn ObjectStore>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_info_new() {
        let info = ObjectInfo::new("test.txt", 2048);
        assert_eq!(info.key, "test.txt");
        assert_eq!(info.size_bytes, 2048);
        assert_eq!(info.size_human, "2 KiB");
        assert!(info.etag.is_none());
    }

    #[test]
    fn test_object_info_serialization_skips_empty_fields() {
        let text = toml::to_string(&ObjectInfo::new("a", 1)).unwrap();
        assert!(text.contains("size_bytes"));
        assert!(!text.contains("etag"));
    }
}
