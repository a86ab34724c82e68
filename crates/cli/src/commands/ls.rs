//! ls command - List objects
//!
//! Lists objects and common prefixes directly under a bucket or prefix.

use std::fmt;

use clap::Args;
use serde::Serialize;
use sthree_core::{ListResult, ObjectInfo, parse_object_path};

use super::{Session, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// List objects under a bucket or prefix
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Bucket path (bucket[/prefix])
    pub path: String,

    /// Show totals after the listing
    #[arg(long)]
    pub summarize: bool,
}

#[derive(Debug, Serialize)]
struct LsOutput {
    bucket: String,
    prefix: String,
    #[serde(flatten)]
    listing: ListResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total_objects: usize,
    total_size_bytes: i64,
}

impl Summary {
    fn of(items: &[ObjectInfo]) -> Self {
        Self {
            total_objects: items.len(),
            total_size_bytes: items.iter().map(|i| i.size_bytes).sum(),
        }
    }
}

impl fmt::Display for LsOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for prefix in &self.listing.prefixes {
            writeln!(f, "{:>19} {:>10}  {prefix}", "", "PRE")?;
        }
        for item in &self.listing.items {
            let modified = item
                .last_modified
                .map(|ts| ts.strftime("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default();
            writeln!(f, "{modified:>19} {:>10}  {}", item.size_human, item.key)?;
        }
        if let Some(summary) = &self.summary {
            writeln!(
                f,
                "Total: {} objects, {} bytes",
                summary.total_objects, summary.total_size_bytes
            )?;
        }
        if self.listing.truncated {
            writeln!(f, "(listing truncated)")?;
        }
        Ok(())
    }
}

/// Execute the ls command
pub async fn execute(args: LsArgs, session: &Session, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let path = match parse_object_path(&args.path) {
        Ok(path) => path,
        Err(e) => return report(&formatter, "Invalid path", &e),
    };

    let bucket = match session.bucket(&path.bucket) {
        Ok(bucket) => bucket,
        Err(e) => return report(&formatter, "Failed to open bucket", &e),
    };

    match bucket.list(&path.key).await {
        Ok(listing) => {
            let summary = args.summarize.then(|| Summary::of(&listing.items));
            let output = LsOutput {
                bucket: path.bucket,
                prefix: path.key,
                listing,
                summary,
            };
            // trailing newline comes from Display
            if formatter.is_json() {
                formatter.json(&output);
            } else if !formatter.is_quiet() {
                print!("{output}");
            }
            ExitCode::Success
        }
        Err(e) => report(&formatter, &format!("Failed to list {}", args.path), &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_totals() {
        let items = vec![ObjectInfo::new("a", 10), ObjectInfo::new("b", 32)];
        let summary = Summary::of(&items);
        assert_eq!(summary.total_objects, 2);
        assert_eq!(summary.total_size_bytes, 42);
    }

    #[test]
    fn test_human_output_lists_prefixes_first() {
        let output = LsOutput {
            bucket: "logs".into(),
            prefix: String::new(),
            listing: ListResult {
                items: vec![ObjectInfo::new("a.txt", 5)],
                prefixes: vec!["2024/".into()],
                truncated: false,
            },
            summary: None,
        };

        let text = output.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("PRE  2024/"));
        assert!(lines[1].ends_with("5 B  a.txt"));
    }

    #[test]
    fn test_json_output_flattens_listing() {
        let output = LsOutput {
            bucket: "logs".into(),
            prefix: "2024/".into(),
            listing: ListResult::default(),
            summary: Some(Summary::of(&[])),
        };

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["bucket"], "logs");
        assert_eq!(json["items"], serde_json::json!([]));
        assert_eq!(json["summary"]["total_objects"], 0);
    }
}
