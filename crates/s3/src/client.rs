//! S3 client implementation
//!
//! Wraps aws-sdk-s3. [`S3Connector`] builds one client per bucket handle
//! from the handle's configuration snapshot; [`S3Bucket`] implements the
//! bucket-scoped ObjectStore trait from sthree-core.

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;

use sthree_core::{
    CannedAcl, ConnectionConfiguration, Defaults, Error, ListResult, ObjectInfo, ObjectStore,
    Result, StorageConnector,
};

/// Builds aws-sdk-s3 clients for bucket handles
#[derive(Debug, Clone, Default)]
pub struct S3Connector {
    endpoint: Option<String>,
    path_style: bool,
}

impl S3Connector {
    /// Connector for AWS S3 with virtual-hosted addressing
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector for an S3-compatible endpoint
    pub fn with_endpoint(endpoint: impl Into<String>, path_style: bool) -> Self {
        Self {
            endpoint: Some(endpoint.into()),
            path_style,
        }
    }

    /// Connector configured from the config file defaults
    pub fn from_defaults(defaults: &Defaults) -> Self {
        Self {
            endpoint: defaults.endpoint.clone(),
            path_style: defaults.path_style,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn path_style(&self) -> bool {
        self.path_style
    }
}

impl StorageConnector for S3Connector {
    fn connect(
        &self,
        bucket: &str,
        config: &ConnectionConfiguration,
    ) -> Result<Arc<dyn ObjectStore>> {
        // empty credentials are passed through; the backend rejects them
        let credentials = aws_credential_types::Credentials::new(
            config.credentials.access_key.clone(),
            config.credentials.secret_key.clone(),
            config.credentials.session_token.clone(),
            None, // expiry
            "sthree-static-credentials",
        );

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .force_path_style(self.path_style);

        if !config.region.is_unset() {
            builder = builder.region(aws_config::Region::new(config.region.as_str().to_string()));
        }

        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        let client = aws_sdk_s3::Client::from_conf(builder.build());
        tracing::debug!(bucket, region = %config.region, endpoint = ?self.endpoint, "built S3 client");

        Ok(Arc::new(S3Bucket {
            inner: client,
            bucket: bucket.to_string(),
        }))
    }
}

/// ObjectStore bound to one bucket
#[derive(Debug, Clone)]
pub struct S3Bucket {
    inner: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Bucket {
    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn target(&self, key: &str) -> String {
        format!("{}/{}", self.bucket, key)
    }
}

/// Map an SDK failure onto the core error taxonomy
fn map_sdk_error<E, R>(err: SdkError<E, R>, target: &str) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(str::to_string);
    classify(code.as_deref(), &DisplayErrorContext(&err).to_string(), target)
}

fn classify(code: Option<&str>, message: &str, target: &str) -> Error {
    match code {
        Some("NoSuchKey" | "NoSuchBucket" | "NotFound") => Error::NotFound(target.to_string()),
        Some(
            "AccessDenied"
            | "InvalidAccessKeyId"
            | "SignatureDoesNotMatch"
            | "ExpiredToken"
            | "InvalidToken",
        ) => Error::Auth(format!("{target}: {message}")),
        _ => Error::Network(message.to_string()),
    }
}

fn to_timestamp(value: &aws_smithy_types::DateTime) -> Option<jiff::Timestamp> {
    jiff::Timestamp::from_second(value.secs()).ok()
}

fn strip_etag(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}

#[async_trait]
impl ObjectStore for S3Bucket {
    async fn list_objects(&self, prefix: &str) -> Result<ListResult> {
        let mut request = self
            .inner
            .list_objects_v2()
            .bucket(&self.bucket)
            .delimiter("/");

        if !prefix.is_empty() {
            request = request.prefix(prefix);
        }

        let response = request
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &self.target(prefix)))?;

        let prefixes = response
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix().map(str::to_string))
            .collect();

        let items = response
            .contents()
            .iter()
            .map(|object| {
                let mut info =
                    ObjectInfo::new(object.key().unwrap_or_default(), object.size().unwrap_or(0));
                info.last_modified = object.last_modified().and_then(to_timestamp);
                info.etag = object.e_tag().map(strip_etag);
                info.storage_class = object.storage_class().map(|sc| sc.as_str().to_string());
                info
            })
            .collect();

        Ok(ListResult {
            items,
            prefixes,
            truncated: response.is_truncated().unwrap_or(false),
        })
    }

    async fn head_object(&self, key: &str) -> Result<ObjectInfo> {
        let response = self
            .inner
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &self.target(key)))?;

        let mut info = ObjectInfo::new(key, response.content_length().unwrap_or(0));
        info.last_modified = response.last_modified().and_then(to_timestamp);
        info.etag = response.e_tag().map(strip_etag);
        info.content_type = response.content_type().map(str::to_string);
        info.storage_class = response.storage_class().map(|sc| sc.as_str().to_string());

        Ok(info)
    }

    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        let response = self
            .inner
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &self.target(key)))?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| Error::Network(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(data)
    }

    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<String>,
        acl: CannedAcl,
    ) -> Result<ObjectInfo> {
        let size = data.len() as i64;

        let response = self
            .inner
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .acl(ObjectCannedAcl::from(acl.as_str()))
            .set_content_type(content_type.clone())
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &self.target(key)))?;

        let mut info = ObjectInfo::new(key, size);
        info.etag = response.e_tag().map(strip_etag);
        info.content_type = content_type;
        info.last_modified = Some(jiff::Timestamp::now());

        tracing::debug!(bucket = %self.bucket, key, acl = %acl, size, "uploaded object");
        Ok(info)
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &self.target(key)))?;

        Ok(())
    }
}
