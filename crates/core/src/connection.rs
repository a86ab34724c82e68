//! Connection configuration
//!
//! A [`ConnectionConfiguration`] pairs a storage region with an access
//! credential. The zero value is an explicit "not yet configured" state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Region handed out when nothing else has been configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Storage locality selector
///
/// `Region::default()` is the unset value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
    /// Create a region from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The default locality, `us-east-1`
    pub fn us_east() -> Self {
        Self::new(DEFAULT_REGION)
    }

    /// `us-east-2`
    pub fn us_east_2() -> Self {
        Self::new("us-east-2")
    }

    /// `us-west-1`
    pub fn us_west() -> Self {
        Self::new("us-west-1")
    }

    /// `us-west-2`
    pub fn us_west_2() -> Self {
        Self::new("us-west-2")
    }

    /// `eu-west-1`
    pub fn eu_west() -> Self {
        Self::new("eu-west-1")
    }

    /// Region name, empty when unset
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the zero value
    pub fn is_unset(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Region {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Access key pair
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Access key ID
    pub access_key: String,

    /// Secret access key
    pub secret_key: String,

    /// Session token for temporary credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            session_token: None,
        }
    }

    /// Attach a session token
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// True when either half of the pair is missing
    pub fn is_empty(&self) -> bool {
        self.access_key.is_empty() || self.secret_key.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = if self.secret_key.is_empty() {
            ""
        } else {
            "<redacted>"
        };
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &secret)
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Region and credentials used to address and authenticate against storage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfiguration {
    #[serde(default)]
    pub region: Region,

    #[serde(default)]
    pub credentials: Credentials,
}

impl ConnectionConfiguration {
    pub fn new(region: Region, credentials: Credentials) -> Self {
        Self {
            region,
            credentials,
        }
    }

    /// Configuration that only carries credentials, leaving the region unset
    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            region: Region::default(),
            credentials,
        }
    }

    /// Whether this is the "not yet configured" value
    pub fn is_zero(&self) -> bool {
        self.region.is_unset()
            && self.credentials.access_key.is_empty()
            && self.credentials.secret_key.is_empty()
    }

    /// Merge `new` into this configuration.
    ///
    /// Credentials are always replaced. The region is only replaced when
    /// `new` sets one, so rotating keys never resets the locality.
    pub fn merge(&mut self, new: ConnectionConfiguration) {
        let ConnectionConfiguration {
            region,
            credentials,
        } = new;

        self.credentials = credentials;

        if !region.is_unset() {
            self.region = region;
        }
    }
}
