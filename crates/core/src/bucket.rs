//! Bucket handles
//!
//! A [`Bucket`] is the in-process handle for one named remote bucket. It
//! carries a snapshot of the connection configuration taken when it was
//! created, the canned ACL applied to objects it writes, and a weak
//! reference to the registry it must deregister from when closed.
//!
//! Handles start `Closed`, become `Open` once a storage client has been
//! attached, and are retired for good by [`Bucket::close`].

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use crate::acl::CannedAcl;
use crate::connection::ConnectionConfiguration;
use crate::error::{Error, Result};
use crate::registry::BucketRegistry;
use crate::traits::{ListResult, ObjectInfo, ObjectStore, StorageConnector};

/// Observable state of a bucket handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketState {
    Closed,
    Open,
}

enum Lifecycle {
    Closed,
    Open(Arc<dyn ObjectStore>),
    Retired,
}

/// Handle for a named remote bucket
pub struct Bucket {
    name: String,
    credentials: ConnectionConfiguration,
    default_write_permission: RwLock<CannedAcl>,
    lifecycle: Mutex<Lifecycle>,
    owner: Weak<BucketRegistry>,
}

impl Bucket {
    /// Create a detached handle with an explicit configuration.
    ///
    /// The handle gets an owner once installed with
    /// [`BucketRegistry::register_bucket`].
    pub fn new(name: impl Into<String>, credentials: ConnectionConfiguration) -> Self {
        Self {
            name: name.into(),
            credentials,
            default_write_permission: RwLock::new(CannedAcl::default()),
            lifecycle: Mutex::new(Lifecycle::Closed),
            owner: Weak::new(),
        }
    }

    /// Set the ACL applied to newly written objects
    pub fn with_default_write_permission(self, acl: CannedAcl) -> Self {
        *self.default_write_permission.write() = acl;
        self
    }

    pub(crate) fn owned_by(mut self, owner: Weak<BucketRegistry>) -> Self {
        self.owner = owner;
        self
    }

    /// Bucket name, the key of its registry entry
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration snapshot taken when this handle was created
    pub fn credentials(&self) -> &ConnectionConfiguration {
        &self.credentials
    }

    pub fn default_write_permission(&self) -> CannedAcl {
        *self.default_write_permission.read()
    }

    pub fn set_default_write_permission(&self, acl: CannedAcl) {
        *self.default_write_permission.write() = acl;
    }

    pub fn state(&self) -> BucketState {
        match *self.lifecycle.lock() {
            Lifecycle::Open(_) => BucketState::Open,
            Lifecycle::Closed | Lifecycle::Retired => BucketState::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == BucketState::Open
    }

    /// Whether [`Bucket::close`] has been called
    pub fn is_retired(&self) -> bool {
        matches!(*self.lifecycle.lock(), Lifecycle::Retired)
    }

    /// Attach a storage client built from this handle's configuration
    /// snapshot. Opening an open handle does nothing.
    pub fn open(&self, connector: &dyn StorageConnector) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        match *lifecycle {
            Lifecycle::Open(_) => return Ok(()),
            Lifecycle::Retired => return Err(Error::BucketClosed(self.name.clone())),
            Lifecycle::Closed => {}
        }

        let client = connector.connect(&self.name, &self.credentials)?;
        *lifecycle = Lifecycle::Open(client);
        tracing::debug!(bucket = %self.name, region = %self.credentials.region, "opened bucket");
        Ok(())
    }

    /// Close the handle and remove it from its registry.
    ///
    /// Only the first call has an effect.
    pub fn close(&self) {
        {
            let mut lifecycle = self.lifecycle.lock();
            if matches!(*lifecycle, Lifecycle::Retired) {
                return;
            }
            *lifecycle = Lifecycle::Retired;
        }

        tracing::debug!(bucket = %self.name, "closed bucket");

        // the registry lock is taken without holding our own
        if let Some(registry) = self.owner.upgrade() {
            registry.deregister(&self.name, self);
        }
    }

    /// Get a handle for a sibling bucket from the same registry.
    ///
    /// The sibling snapshots the registry's current configuration and
    /// inherits this handle's default write permission. An already
    /// registered sibling is returned as is.
    pub fn new_bucket(&self, name: &str) -> Result<Arc<Bucket>> {
        let registry = self
            .owner
            .upgrade()
            .ok_or_else(|| Error::RegistryUnavailable(self.name.clone()))?;
        Ok(registry.get_or_create(name, self.default_write_permission()))
    }

    fn client(&self) -> Result<Arc<dyn ObjectStore>> {
        match &*self.lifecycle.lock() {
            Lifecycle::Open(client) => Ok(Arc::clone(client)),
            Lifecycle::Closed | Lifecycle::Retired => Err(Error::BucketClosed(self.name.clone())),
        }
    }

    /// List objects under a prefix
    pub async fn list(&self, prefix: &str) -> Result<ListResult> {
        self.client()?.list_objects(prefix).await
    }

    /// Get object metadata
    pub async fn head(&self, key: &str) -> Result<ObjectInfo> {
        self.client()?.head_object(key).await
    }

    /// Get object content
    pub async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.client()?.get_object(key).await
    }

    /// Upload an object using the default write permission
    pub async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<ObjectInfo> {
        let acl = self.default_write_permission();
        self.put_with_acl(key, data, content_type, acl).await
    }

    /// Upload an object with an explicit ACL
    pub async fn put_with_acl(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
        acl: CannedAcl,
    ) -> Result<ObjectInfo> {
        self.client()?
            .put_object(key, data, content_type, acl)
            .await
    }

    /// Delete an object
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.client()?.delete_object(key).await
    }
}

impl fmt::Debug for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bucket")
            .field("name", &self.name)
            .field("credentials", &self.credentials)
            .field("default_write_permission", &self.default_write_permission())
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Credentials, Region};
    use crate::traits::{MockObjectStore, MockStorageConnector};

    fn connector_for(store: MockObjectStore) -> MockStorageConnector {
        let store: Arc<dyn ObjectStore> = Arc::new(store);
        let mut connector = MockStorageConnector::new();
        connector
            .expect_connect()
            .returning(move |_, _| Ok(Arc::clone(&store)));
        connector
    }

    fn snapshot() -> ConnectionConfiguration {
        ConnectionConfiguration::new(Region::us_east(), Credentials::new("AKID", "secret"))
    }

    #[test]
    fn test_new_bucket_defaults() {
        let bucket = Bucket::new("logs", snapshot());
        assert_eq!(bucket.name(), "logs");
        assert_eq!(bucket.credentials(), &snapshot());
        assert_eq!(
            bucket.default_write_permission(),
            CannedAcl::BucketOwnerFullControl
        );
        assert_eq!(bucket.state(), BucketState::Closed);
        assert!(!bucket.is_retired());
    }

    #[test]
    fn test_open_uses_snapshot() {
        let mut connector = MockStorageConnector::new();
        connector
            .expect_connect()
            .withf(|bucket: &str, config: &ConnectionConfiguration| {
                bucket == "logs" && config.credentials.access_key == "AKID"
            })
            .times(1)
            .returning(|_, _| Ok(Arc::new(MockObjectStore::new()) as Arc<dyn ObjectStore>));

        let bucket = Bucket::new("logs", snapshot());
        bucket.open(&connector).unwrap();
        assert!(bucket.is_open());

        // second open keeps the existing client
        bucket.open(&connector).unwrap();
        assert!(bucket.is_open());
    }

    #[test]
    fn test_open_propagates_connector_error() {
        let mut connector = MockStorageConnector::new();
        connector
            .expect_connect()
            .returning(|_, _| Err(Error::Config("no endpoint".into())));

        let bucket = Bucket::new("logs", snapshot());
        assert!(matches!(bucket.open(&connector), Err(Error::Config(_))));
        assert_eq!(bucket.state(), BucketState::Closed);
    }

    #[test]
    fn test_close_is_terminal() {
        let connector = connector_for(MockObjectStore::new());
        let bucket = Bucket::new("logs", snapshot());
        bucket.open(&connector).unwrap();

        bucket.close();
        assert_eq!(bucket.state(), BucketState::Closed);
        assert!(bucket.is_retired());

        bucket.close();
        assert!(bucket.is_retired());

        let result = bucket.open(&connector);
        assert!(matches!(result, Err(Error::BucketClosed(name)) if name == "logs"));
    }

    #[test]
    fn test_detached_bucket_cannot_create_siblings() {
        let bucket = Bucket::new("logs", snapshot());
        let result = bucket.new_bucket("archive");
        assert!(matches!(result, Err(Error::RegistryUnavailable(_))));
    }

    #[tokio::test]
    async fn test_storage_calls_require_open() {
        let bucket = Bucket::new("logs", snapshot());
        let result = bucket.get("key").await;
        assert!(matches!(result, Err(Error::BucketClosed(_))));
    }

    #[tokio::test]
    async fn test_put_applies_default_write_permission() {
        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .withf(|key: &str, data: &Vec<u8>, content_type: &Option<String>, acl: &CannedAcl| {
                key == "report.csv"
                    && data.as_slice() == b"a,b"
                    && content_type.as_deref() == Some("text/csv")
                    && *acl == CannedAcl::PublicRead
            })
            .times(1)
            .returning(|key, data, _, _| Ok(ObjectInfo::new(key, data.len() as i64)));

        let bucket =
            Bucket::new("logs", snapshot()).with_default_write_permission(CannedAcl::PublicRead);
        bucket.open(&connector_for(store)).unwrap();

        let info = bucket
            .put("report.csv", b"a,b".to_vec(), Some("text/csv".to_string()))
            .await
            .unwrap();
        assert_eq!(info.key, "report.csv");
        assert_eq!(info.size_bytes, 3);
    }

    #[tokio::test]
    async fn test_put_with_acl_overrides_default() {
        let mut store = MockObjectStore::new();
        store
            .expect_put_object()
            .withf(|_: &str, _: &Vec<u8>, _: &Option<String>, acl: &CannedAcl| {
                *acl == CannedAcl::Private
            })
            .times(1)
            .returning(|key, _, _, _| Ok(ObjectInfo::new(key, 0)));

        let bucket = Bucket::new("logs", snapshot());
        bucket.open(&connector_for(store)).unwrap();

        bucket
            .put_with_acl("empty", Vec::new(), None, CannedAcl::Private)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_read_operations_delegate() {
        let mut store = MockObjectStore::new();
        store
            .expect_get_object()
            .returning(|_| Ok(b"hello".to_vec()));
        store
            .expect_head_object()
            .returning(|key| Ok(ObjectInfo::new(key, 5)));
        store.expect_list_objects().returning(|prefix| {
            Ok(ListResult {
                items: vec![ObjectInfo::new(format!("{prefix}a.txt"), 5)],
                prefixes: vec![format!("{prefix}nested/")],
                truncated: false,
            })
        });
        store
            .expect_delete_object()
            .withf(|key: &str| key == "a.txt")
            .times(1)
            .returning(|_| Ok(()));

        let bucket = Bucket::new("logs", snapshot());
        bucket.open(&connector_for(store)).unwrap();

        assert_eq!(bucket.get("a.txt").await.unwrap(), b"hello");
        assert_eq!(bucket.head("a.txt").await.unwrap().size_bytes, 5);

        let listing = bucket.list("2024/").await.unwrap();
        assert_eq!(listing.items[0].key, "2024/a.txt");
        assert_eq!(listing.prefixes, vec!["2024/nested/".to_string()]);

        bucket.delete("a.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_bucket_rejects_storage_calls() {
        let bucket = Bucket::new("logs", snapshot());
        bucket.open(&connector_for(MockObjectStore::new())).unwrap();
        bucket.close();

        let result = bucket.delete("a.txt").await;
        assert!(matches!(result, Err(Error::BucketClosed(_))));
    }
}
