//! sthree-core: bucket registry and core library for sthree
//!
//! This crate provides:
//! - Connection configuration and credential providers
//! - The bucket registry, a pool guaranteeing one handle per bucket name
//! - Bucket handles and their lifecycle
//! - ObjectStore / StorageConnector traits for the storage backend
//! - Configuration file management
//! - `bucket/key` path parsing
//!
//! This crate is designed to be independent of any specific S3 SDK,
//! allowing for easy testing and potential future support for other backends.

pub mod acl;
pub mod bucket;
pub mod config;
pub mod connection;
pub mod credentials;
pub mod error;
pub mod path;
pub mod registry;
pub mod traits;

pub use acl::CannedAcl;
pub use bucket::{Bucket, BucketState};
pub use config::{Config, ConfigManager, Defaults};
pub use connection::{ConnectionConfiguration, Credentials, DEFAULT_REGION, Region};
pub use credentials::{
    ChainProvider, CredentialProvider, EnvProvider, ResolvedCredentials, StaticProvider,
};
pub use error::{Error, Result};
pub use path::{ObjectPath, parse_object_key, parse_object_path};
pub use registry::BucketRegistry;
pub use traits::{ListResult, ObjectInfo, ObjectStore, StorageConnector};
