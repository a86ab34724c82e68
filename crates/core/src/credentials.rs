//! Credential resolution
//!
//! Providers look up an access key pair (and optionally a region). Failing
//! to find anything is not an error: the caller simply keeps empty
//! credentials, and the storage backend rejects requests later.
//!
//! Shared credentials files, SSO and instance metadata are handled by the
//! SDK credential chain in `sthree-s3`, which resolves once and hands the
//! result in as a [`StaticProvider`].

use crate::connection::{Credentials, Region};

/// Credentials and optional region produced by a provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedCredentials {
    pub region: Option<Region>,
    pub credentials: Credentials,
}

/// Source of connection credentials
pub trait CredentialProvider: Send + Sync {
    /// Resolve credentials, or `None` if this source has nothing to offer
    fn resolve(&self) -> Option<ResolvedCredentials>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Provider returning a fixed value
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    resolved: Option<ResolvedCredentials>,
}

impl StaticProvider {
    pub fn new(credentials: Credentials, region: Option<Region>) -> Self {
        Self {
            resolved: Some(ResolvedCredentials {
                region,
                credentials,
            }),
        }
    }

    /// Provider that never resolves anything
    pub fn empty() -> Self {
        Self { resolved: None }
    }

    /// Wrap the outcome of an earlier resolution
    pub fn from_resolved(resolved: Option<ResolvedCredentials>) -> Self {
        Self { resolved }
    }
}

impl CredentialProvider for StaticProvider {
    fn resolve(&self) -> Option<ResolvedCredentials> {
        self.resolved.clone()
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

type VarLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Provider reading the standard AWS environment variables
pub struct EnvProvider {
    lookup: VarLookup,
}

impl EnvProvider {
    /// Read from the process environment
    pub fn new() -> Self {
        Self::with_lookup(|key| std::env::var(key).ok())
    }

    /// Read variables through a custom lookup (useful for testing)
    pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| (self.lookup)(key))
            .find(|value| !value.is_empty())
    }
}

impl Default for EnvProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for EnvProvider {
    fn resolve(&self) -> Option<ResolvedCredentials> {
        let access_key = self.first_of(&["AWS_ACCESS_KEY_ID", "AWS_ACCESS_KEY"])?;
        let secret_key = self.first_of(&["AWS_SECRET_ACCESS_KEY", "AWS_SECRET_KEY"])?;
        let region = self
            .first_of(&["AWS_REGION", "AWS_DEFAULT_REGION"])
            .map(Region::new);

        let mut credentials = Credentials::new(access_key, secret_key);
        credentials.session_token = self.first_of(&["AWS_SESSION_TOKEN"]);

        Some(ResolvedCredentials {
            region,
            credentials,
        })
    }

    fn name(&self) -> &'static str {
        "environment"
    }
}

/// Tries each provider in order; the first one with credentials wins
pub struct ChainProvider {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl ChainProvider {
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }

    /// Environment variables only; no I/O beyond the process environment
    pub fn default_chain() -> Self {
        Self::new(vec![Box::new(EnvProvider::new())])
    }
}

impl CredentialProvider for ChainProvider {
    fn resolve(&self) -> Option<ResolvedCredentials> {
        self.providers.iter().find_map(|provider| {
            let resolved = provider.resolve().filter(|r| !r.credentials.is_empty())?;
            tracing::debug!(provider = provider.name(), "resolved credentials");
            Some(resolved)
        })
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}
