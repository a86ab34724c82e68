//! sthree-s3: S3 SDK adapter for sthree bucket handles
//!
//! This crate implements the StorageConnector and ObjectStore traits from
//! sthree-core using the aws-sdk-s3 crate, and resolves credentials
//! through the aws-config default chain. It is the only crate that
//! directly depends on the AWS SDK.

pub mod client;
pub mod credentials;

pub use client::{S3Bucket, S3Connector};
pub use credentials::load_default_chain;
