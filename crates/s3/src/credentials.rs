//! SDK credential chain
//!
//! Resolves credentials and region through the aws-config default chain:
//! environment variables, the shared `credentials` and `config` profile
//! files (honouring `AWS_PROFILE`), SSO, web identity, container and
//! instance metadata. The chain is async, so it runs once up front and its
//! outcome is handed to the registry as a [`StaticProvider`].

use aws_config::BehaviorVersion;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_s3::error::DisplayErrorContext;

use sthree_core::{Credentials, Region, ResolvedCredentials, StaticProvider};

/// Resolve the default AWS credential and region chain
pub async fn load_default_chain() -> StaticProvider {
    let config = aws_config::defaults(BehaviorVersion::latest()).load().await;

    let resolved = match config.credentials_provider() {
        Some(provider) => resolve(&provider, config.region()).await,
        None => None,
    };

    StaticProvider::from_resolved(resolved)
}

/// Ask `provider` for credentials, pairing them with `region`
async fn resolve(
    provider: &impl ProvideCredentials,
    region: Option<&aws_config::Region>,
) -> Option<ResolvedCredentials> {
    let resolved = match provider.provide_credentials().await {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::debug!(error = %DisplayErrorContext(&e), "credential chain resolved nothing");
            return None;
        }
    };

    let mut credentials = Credentials::new(resolved.access_key_id(), resolved.secret_access_key());
    credentials.session_token = resolved.session_token().map(str::to_string);
    if credentials.is_empty() {
        return None;
    }

    tracing::debug!(
        access_key = %credentials.access_key,
        region = ?region.map(|r| r.to_string()),
        "resolved credentials from the SDK chain"
    );

    Some(ResolvedCredentials {
        region: region.map(|r| Region::new(r.to_string())),
        credentials,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use aws_config::meta::region::ProvideRegion;
    use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
    use aws_config::profile::{ProfileFileCredentialsProvider, ProfileFileRegionProvider};
    use sthree_core::CredentialProvider;
    use tempfile::TempDir;

    const CREDENTIALS: &str = r#"
# shared credentials
[default]
aws_access_key_id = default-key
aws_secret_access_key = default-secret

[ci] ; deploy keys
aws_access_key_id = ci-key
aws_secret_access_key = ci-secret
aws_session_token = ci-token
"#;

    const CONFIG: &str = r#"
[default]
region = eu-west-1

[profile ci] # pipelines
region = us-west-2
"#;

    fn profile_files(dir: &Path) -> ProfileFiles {
        let credentials = dir.join("credentials");
        let config = dir.join("config");
        std::fs::write(&credentials, CREDENTIALS).unwrap();
        std::fs::write(&config, CONFIG).unwrap();

        ProfileFiles::builder()
            .include_default_credentials_file(false)
            .include_default_config_file(false)
            .with_file(ProfileFileKind::Credentials, credentials)
            .with_file(ProfileFileKind::Config, config)
            .build()
    }

    async fn resolve_profile(dir: &Path, profile: &str) -> Option<ResolvedCredentials> {
        let credentials = ProfileFileCredentialsProvider::builder()
            .profile_files(profile_files(dir))
            .profile_name(profile)
            .build();
        let region = ProfileFileRegionProvider::builder()
            .profile_files(profile_files(dir))
            .profile_name(profile)
            .build()
            .region()
            .await;

        resolve(&credentials, region.as_ref()).await
    }

    #[tokio::test]
    async fn test_default_profile_ignores_later_sections() {
        let temp_dir = TempDir::new().unwrap();

        let resolved = resolve_profile(temp_dir.path(), "default").await.unwrap();
        assert_eq!(
            resolved.credentials,
            Credentials::new("default-key", "default-secret")
        );
        assert_eq!(resolved.region, Some(Region::eu_west()));
    }

    #[tokio::test]
    async fn test_named_profile_with_commented_header() {
        let temp_dir = TempDir::new().unwrap();

        let resolved = resolve_profile(temp_dir.path(), "ci").await.unwrap();
        assert_eq!(
            resolved.credentials,
            Credentials::new("ci-key", "ci-secret").with_session_token("ci-token")
        );
        assert_eq!(resolved.region, Some(Region::us_west_2()));
    }

    #[tokio::test]
    async fn test_unknown_profile_resolves_nothing() {
        let temp_dir = TempDir::new().unwrap();
        assert!(resolve_profile(temp_dir.path(), "absent").await.is_none());
    }

    #[tokio::test]
    async fn test_resolved_chain_feeds_static_provider() {
        let temp_dir = TempDir::new().unwrap();
        let resolved = resolve_profile(temp_dir.path(), "default").await;

        let provider = StaticProvider::from_resolved(resolved.clone());
        assert_eq!(provider.resolve(), resolved);
    }
}
