//! stat command - Show object metadata

use std::fmt;

use clap::Args;
use serde::Serialize;
use sthree_core::{CannedAcl, ObjectInfo, parse_object_key};

use super::{Session, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Show object metadata
#[derive(Args, Debug)]
pub struct StatArgs {
    /// Object path (bucket/key)
    pub path: String,
}

#[derive(Debug, Serialize)]
struct StatOutput {
    bucket: String,
    region: String,
    default_write_permission: CannedAcl,
    #[serde(flatten)]
    info: ObjectInfo,
}

impl fmt::Display for StatOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name      : {}", self.info.key)?;
        writeln!(f, "Bucket    : {} ({})", self.bucket, self.region)?;
        if let Some(modified) = &self.info.last_modified {
            writeln!(f, "Date      : {modified}")?;
        }
        write!(
            f,
            "Size      : {} ({} bytes)",
            self.info.size_human, self.info.size_bytes
        )?;
        if let Some(etag) = &self.info.etag {
            write!(f, "\nETag      : {etag}")?;
        }
        if let Some(ct) = &self.info.content_type {
            write!(f, "\nType      : {ct}")?;
        }
        if let Some(sc) = &self.info.storage_class {
            write!(f, "\nClass     : {sc}")?;
        }
        write!(f, "\nWrite ACL : {}", self.default_write_permission)
    }
}

/// Execute the stat command
pub async fn execute(args: StatArgs, session: &Session, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_object_key(&args.path) {
        Ok(path) => path,
        Err(e) => return report(&formatter, "Invalid path", &e),
    };

    let bucket = match session.bucket(&path.bucket) {
        Ok(bucket) => bucket,
        Err(e) => return report(&formatter, "Failed to open bucket", &e),
    };

    match bucket.head(&path.key).await {
        Ok(info) => {
            formatter.output(&StatOutput {
                bucket: bucket.name().to_string(),
                region: bucket.credentials().region.to_string(),
                default_write_permission: bucket.default_write_permission(),
                info,
            });
            ExitCode::Success
        }
        Err(e) => report(&formatter, &format!("Failed to stat {path}"), &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_output_human() {
        let mut info = ObjectInfo::new("a.txt", 1024);
        info.etag = Some("abc".into());

        let output = StatOutput {
            bucket: "logs".into(),
            region: "us-east-1".into(),
            default_write_permission: CannedAcl::default(),
            info,
        };

        let text = output.to_string();
        assert!(text.contains("Bucket    : logs (us-east-1)"));
        assert!(text.contains("Size      : 1 KiB (1024 bytes)"));
        assert!(text.contains("ETag      : abc"));
        assert!(text.ends_with("Write ACL : bucket-owner-full-control"));
    }
}
