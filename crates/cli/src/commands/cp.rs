//! cp command - Copy an object into another bucket
//!
//! The destination handle is created from the source handle, so it shares
//! the registry's current credentials and inherits the source's default
//! write permission.

use std::fmt;

use clap::Args;
use serde::Serialize;
use sthree_core::{CannedAcl, ObjectPath, parse_object_key, parse_object_path};

use super::{Session, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Copy an object into another bucket
#[derive(Args, Debug)]
pub struct CpArgs {
    /// Source object (bucket/key)
    pub source: String,

    /// Destination (bucket[/key]; keeps the source key when omitted)
    pub target: String,
}

#[derive(Debug, Serialize)]
struct CpOutput {
    status: &'static str,
    source: String,
    target: String,
    size_bytes: i64,
    acl: CannedAcl,
}

impl fmt::Display for CpOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({} bytes, {})",
            self.source, self.target, self.size_bytes, self.acl
        )
    }
}

/// Destination for `source`: an explicit key, or the source key under a prefix
fn resolve_target(source: &ObjectPath, target: &ObjectPath) -> ObjectPath {
    if target.key.is_empty() {
        ObjectPath::new(target.bucket.clone(), source.key.clone())
    } else if target.is_prefix() {
        target.join(source.file_name().unwrap_or(&source.key))
    } else {
        target.clone()
    }
}

/// Execute the cp command
pub async fn execute(args: CpArgs, session: &Session, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let source = match parse_object_key(&args.source) {
        Ok(path) => path,
        Err(e) => return report(&formatter, "Invalid source", &e),
    };
    let target = match parse_object_path(&args.target) {
        Ok(path) => resolve_target(&source, &path),
        Err(e) => return report(&formatter, "Invalid target", &e),
    };

    let source_bucket = match session.bucket(&source.bucket) {
        Ok(bucket) => bucket,
        Err(e) => return report(&formatter, "Failed to open source bucket", &e),
    };
    let target_bucket = match session.sibling(&source_bucket, &target.bucket) {
        Ok(bucket) => bucket,
        Err(e) => return report(&formatter, "Failed to open target bucket", &e),
    };

    let (data, info) = match tokio::try_join!(
        source_bucket.get(&source.key),
        source_bucket.head(&source.key)
    ) {
        Ok(pair) => pair,
        Err(e) => return report(&formatter, &format!("Failed to read {source}"), &e),
    };

    let acl = target_bucket.default_write_permission();
    match target_bucket
        .put(&target.key, data, info.content_type)
        .await
    {
        Ok(written) => {
            formatter.output(&CpOutput {
                status: "success",
                source: source.to_string(),
                target: target.to_string(),
                size_bytes: written.size_bytes,
                acl,
            });
            ExitCode::Success
        }
        Err(e) => report(&formatter, &format!("Failed to write {target}"), &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_target_bucket_only_keeps_key() {
        let source = ObjectPath::new("logs", "2024/a.txt");
        let target = resolve_target(&source, &ObjectPath::new("archive", ""));
        assert_eq!(target.to_string(), "archive/2024/a.txt");
    }

    #[test]
    fn test_resolve_target_prefix_keeps_file_name() {
        let source = ObjectPath::new("logs", "2024/a.txt");
        let target = resolve_target(&source, &ObjectPath::new("archive", "old/"));
        assert_eq!(target.to_string(), "archive/old/a.txt");
    }

    #[test]
    fn test_resolve_target_explicit_key() {
        let source = ObjectPath::new("logs", "a.txt");
        let target = resolve_target(&source, &ObjectPath::new("archive", "b.txt"));
        assert_eq!(target.key, "b.txt");
    }
}
