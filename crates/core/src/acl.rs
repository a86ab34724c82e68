//! Canned access control lists
//!
//! The write permission a bucket handle applies to objects it uploads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// S3 canned ACL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CannedAcl {
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
    BucketOwnerRead,
    /// Default write permission for new bucket handles
    #[default]
    BucketOwnerFullControl,
}

impl CannedAcl {
    /// All canned ACLs, in wire-name order
    pub const ALL: [CannedAcl; 6] = [
        CannedAcl::Private,
        CannedAcl::PublicRead,
        CannedAcl::PublicReadWrite,
        CannedAcl::AuthenticatedRead,
        CannedAcl::BucketOwnerRead,
        CannedAcl::BucketOwnerFullControl,
    ];

    /// Wire name as sent in the `x-amz-acl` header
    pub const fn as_str(self) -> &'static str {
        match self {
            CannedAcl::Private => "private",
            CannedAcl::PublicRead => "public-read",
            CannedAcl::PublicReadWrite => "public-read-write",
            CannedAcl::AuthenticatedRead => "authenticated-read",
            CannedAcl::BucketOwnerRead => "bucket-owner-read",
            CannedAcl::BucketOwnerFullControl => "bucket-owner-full-control",
        }
    }
}

impl fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CannedAcl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CannedAcl::ALL
            .into_iter()
            .find(|acl| acl.as_str() == s)
            .ok_or_else(|| Error::InvalidAcl(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_owner_full_control() {
        assert_eq!(CannedAcl::default(), CannedAcl::BucketOwnerFullControl);
        assert_eq!(CannedAcl::default().as_str(), "bucket-owner-full-control");
    }

    #[test]
    fn test_parse_wire_names() {
        assert_eq!(
            "public-read".parse::<CannedAcl>().unwrap(),
            CannedAcl::PublicRead
        );
        assert_eq!(
            "bucket-owner-read".parse::<CannedAcl>().unwrap(),
            CannedAcl::BucketOwnerRead
        );
    }

    #[test]
    fn test_parse_unknown_name() {
        let result = "public".parse::<CannedAcl>();
        assert!(matches!(result, Err(Error::InvalidAcl(name)) if name == "public"));
    }

    #[test]
    fn test_serde_uses_wire_names() {
        #[derive(Serialize, Deserialize)]
        struct Holder {
            acl: CannedAcl,
        }

        let text = toml::to_string(&Holder {
            acl: CannedAcl::AuthenticatedRead,
        })
        .unwrap();
        assert!(text.contains("authenticated-read"));

        let holder: Holder = toml::from_str(r#"acl = "public-read-write""#).unwrap();
        assert_eq!(holder.acl, CannedAcl::PublicReadWrite);
    }
}
