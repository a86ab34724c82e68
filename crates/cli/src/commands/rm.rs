//! rm command - Remove objects
//!
//! Removes one or more objects. Paths in the same bucket share one pooled
//! bucket handle.

use std::fmt;

use clap::Args;
use serde::Serialize;
use sthree_core::parse_object_key;

use super::Session;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Remove objects
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Object path(s) to remove (bucket/key)
    #[arg(required = true)]
    pub paths: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    status: &'static str,
    deleted: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failed: Vec<String>,
    total: usize,
}

impl fmt::Display for RmOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for path in &self.deleted {
            writeln!(f, "Removed {path}")?;
        }
        write!(f, "{} of {} removed", self.deleted.len(), self.total)
    }
}

/// Execute the rm command
pub async fn execute(args: RmArgs, session: &Session, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);
    let (output, exit_code) = remove_paths(&args.paths, session, &formatter).await;
    formatter.output(&output);
    exit_code
}

/// Delete each path, carrying on past failures. The exit code is that of
/// the last failure.
async fn remove_paths(
    paths: &[String],
    session: &Session,
    formatter: &Formatter,
) -> (RmOutput, ExitCode) {
    let mut deleted = Vec::new();
    let mut failed = Vec::new();
    let mut exit_code = ExitCode::Success;

    for raw in paths {
        let result = match parse_object_key(raw) {
            Ok(path) => match session.bucket(&path.bucket) {
                Ok(bucket) => bucket.delete(&path.key).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => deleted.push(raw.clone()),
            Err(e) => {
                formatter.error(&format!("Failed to remove {raw}: {e}"));
                exit_code = ExitCode::from_error(&e);
                failed.push(raw.clone());
            }
        }
    }

    let output = RmOutput {
        status: if failed.is_empty() { "success" } else { "partial" },
        total: paths.len(),
        deleted,
        failed,
    };
    (output, exit_code)
}
