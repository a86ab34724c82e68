//! put command - Upload a local file
//!
//! Objects are written with the bucket handle's default write permission
//! unless `--acl` overrides it.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use sthree_core::{CannedAcl, ObjectPath, parse_object_path};

use super::{Session, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Upload a local file
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file to upload
    pub file: PathBuf,

    /// Destination (bucket/key, or bucket/prefix/ to keep the file name)
    pub destination: String,

    /// Canned ACL for the uploaded object
    #[arg(long)]
    pub acl: Option<CannedAcl>,

    /// Content type (guessed from the file name by default)
    #[arg(long)]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutOutput {
    status: &'static str,
    source: String,
    target: String,
    size_bytes: i64,
    acl: CannedAcl,
    #[serde(skip_serializing_if = "Option::is_none")]
    etag: Option<String>,
}

impl fmt::Display for PutOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({} bytes, {})",
            self.source, self.target, self.size_bytes, self.acl
        )
    }
}

/// Resolve the destination key, appending the file name for prefixes
fn destination_key(destination: &ObjectPath, file: &Path) -> Option<ObjectPath> {
    if !destination.is_prefix() {
        return Some(destination.clone());
    }
    let name = file.file_name()?.to_str()?;
    Some(destination.join(name))
}

/// Execute the put command
pub async fn execute(args: PutArgs, session: &Session, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let destination = match parse_object_path(&args.destination) {
        Ok(path) => path,
        Err(e) => return report(&formatter, "Invalid path", &e),
    };

    let Some(target) = destination_key(&destination, &args.file) else {
        formatter.error(&format!(
            "Cannot derive an object key from '{}'",
            args.file.display()
        ));
        return ExitCode::UsageError;
    };

    let data = match tokio::fs::read(&args.file).await {
        Ok(data) => data,
        Err(e) => {
            formatter.error(&format!("Failed to read {}: {e}", args.file.display()));
            return ExitCode::GeneralError;
        }
    };

    let bucket = match session.bucket(&target.bucket) {
        Ok(bucket) => bucket,
        Err(e) => return report(&formatter, "Failed to open bucket", &e),
    };

    let content_type = args.content_type.or_else(|| {
        mime_guess::from_path(&args.file)
            .first()
            .map(|mime| mime.essence_str().to_string())
    });
    let acl = args
        .acl
        .unwrap_or_else(|| bucket.default_write_permission());

    match bucket
        .put_with_acl(&target.key, data, content_type, acl)
        .await
    {
        Ok(info) => {
            formatter.output(&PutOutput {
                status: "success",
                source: args.file.display().to_string(),
                target: target.to_string(),
                size_bytes: info.size_bytes,
                acl,
                etag: info.etag,
            });
            ExitCode::Success
        }
        Err(e) => report(&formatter, &format!("Failed to upload to {target}"), &e),
    }
}
