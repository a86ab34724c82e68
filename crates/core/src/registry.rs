//! Bucket registry
//!
//! The registry is a pool of [`Bucket`] handles keyed by bucket name, plus
//! the connection configuration new handles are created with. It hands out
//! at most one live handle per name, and handles remove themselves from the
//! pool when closed.
//!
//! A single mutex guards the entry map, the configuration and the
//! initialization flag together, so a handle is never built from a
//! half-rotated configuration and two callers racing on an unseen name
//! always receive the same handle.
//!
//! Registries are always held in an [`Arc`]: handles keep a [`Weak`]
//! back-reference to the registry that owns them. [`BucketRegistry::global`]
//! is the process-wide instance; [`BucketRegistry::new`] builds independent
//! ones.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;

use crate::acl::CannedAcl;
use crate::bucket::Bucket;
use crate::connection::{ConnectionConfiguration, DEFAULT_REGION, Region};
use crate::credentials::{ChainProvider, CredentialProvider};

static GLOBAL: LazyLock<Arc<BucketRegistry>> = LazyLock::new(BucketRegistry::new);

#[derive(Default)]
struct RegistryState {
    entries: HashMap<String, Arc<Bucket>>,
    config: ConnectionConfiguration,
    initialized: bool,
}

/// Pool and factory of bucket handles
pub struct BucketRegistry {
    state: Mutex<RegistryState>,
}

impl BucketRegistry {
    /// Create an empty, uninitialized registry
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(RegistryState::default()),
        })
    }

    /// The process-wide registry
    pub fn global() -> &'static Arc<BucketRegistry> {
        &GLOBAL
    }

    /// Load credentials from the standard AWS environment variables
    pub fn init(&self) {
        self.init_with(&ChainProvider::default_chain());
    }

    /// Load credentials from `provider`, once.
    ///
    /// Fields that are already configured are left alone: the region is
    /// only filled in when unset, the credentials only when empty.
    pub fn init_with(&self, provider: &dyn CredentialProvider) {
        if self.state.lock().initialized {
            return;
        }

        // resolution may touch the filesystem, keep it outside the lock
        let resolved = provider.resolve();

        let mut state = self.state.lock();
        if state.initialized {
            return;
        }

        let (region, credentials) = match resolved {
            Some(resolved) => (resolved.region, Some(resolved.credentials)),
            None => {
                tracing::warn!(
                    provider = provider.name(),
                    "no credentials resolved, buckets will be unauthenticated"
                );
                (None, None)
            }
        };

        if state.config.region.is_unset() {
            state.config.region = region.unwrap_or_else(|| Region::new(DEFAULT_REGION));
        }

        if state.config.credentials.is_empty() {
            if let Some(credentials) = credentials {
                state.config.credentials = credentials;
            }
        }

        state.initialized = true;
        tracing::info!(region = %state.config.region, "bucket registry initialized");
    }

    /// Rotate credentials, and the region if `new` sets one
    pub fn set_credentials(&self, new: ConnectionConfiguration) {
        let mut state = self.state.lock();
        state.config.merge(new);
        tracing::debug!(region = %state.config.region, "updated registry credentials");
    }

    /// Current configuration
    pub fn config(&self) -> ConnectionConfiguration {
        self.state.lock().config.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    /// Get the handle for `name`, creating and registering it if needed.
    ///
    /// New handles snapshot the current configuration and use the default
    /// write permission. This never initializes the registry.
    pub fn get_bucket(self: &Arc<Self>, name: &str) -> Arc<Bucket> {
        self.get_or_create(name, CannedAcl::default())
    }

    pub(crate) fn get_or_create(self: &Arc<Self>, name: &str, acl: CannedAcl) -> Arc<Bucket> {
        let mut state = self.state.lock();
        if let Some(existing) = state.entries.get(name) {
            return Arc::clone(existing);
        }

        let bucket = Arc::new(
            Bucket::new(name, state.config.clone())
                .with_default_write_permission(acl)
                .owned_by(Arc::downgrade(self)),
        );
        state.entries.insert(name.to_string(), Arc::clone(&bucket));
        tracing::debug!(bucket = name, acl = %acl, "created bucket handle");
        bucket
    }

    /// Install a caller-built handle, replacing any entry with the same name.
    ///
    /// The replaced handle is not closed; closing it later leaves the new
    /// entry untouched.
    pub fn register_bucket(self: &Arc<Self>, bucket: Bucket) -> Arc<Bucket> {
        let bucket = Arc::new(bucket.owned_by(Arc::downgrade(self)));
        let replaced = self
            .state
            .lock()
            .entries
            .insert(bucket.name().to_string(), Arc::clone(&bucket));

        match replaced {
            Some(previous) if previous.is_open() => {
                tracing::warn!(bucket = bucket.name(), "replaced an open bucket handle");
            }
            Some(_) => tracing::debug!(bucket = bucket.name(), "replaced bucket handle"),
            None => tracing::debug!(bucket = bucket.name(), "registered bucket handle"),
        }

        bucket
    }

    /// Remove `name` if its entry is `bucket` itself. Called from
    /// [`Bucket::close`].
    pub(crate) fn deregister(&self, name: &str, bucket: &Bucket) {
        let mut state = self.state.lock();
        match state.entries.get(name) {
            Some(current) if std::ptr::eq(Arc::as_ptr(current), bucket) => {
                state.entries.remove(name);
                tracing::debug!(bucket = name, "deregistered bucket handle");
            }
            Some(_) => tracing::debug!(bucket = name, "stale close, entry was replaced"),
            None => tracing::debug!(bucket = name, "stale close, entry already gone"),
        }
    }

    /// Look up a handle without creating one
    pub fn lookup(&self, name: &str) -> Option<Arc<Bucket>> {
        self.state.lock().entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state.lock().entries.contains_key(name)
    }

    /// Number of registered handles
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Registered bucket names, sorted
    pub fn bucket_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.lock().entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Close every registered handle
    pub fn close_all(&self) {
        let buckets: Vec<Arc<Bucket>> = self.state.lock().entries.values().cloned().collect();
        for bucket in buckets {
            bucket.close();
        }
    }

    /// Forget all entries without closing them and return to the zero,
    /// uninitialized configuration
    pub fn reset(&self) {
        let mut state = self.state.lock();
        *state = RegistryState::default();
    }
}

impl std::fmt::Debug for BucketRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BucketRegistry")
            .field("buckets", &state.entries.len())
            .field("config", &state.config)
            .field("initialized", &state.initialized)
            .finish()
    }
}
