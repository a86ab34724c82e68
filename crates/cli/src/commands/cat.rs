//! cat command - Display object contents
//!
//! Outputs the entire content of an object to stdout.

use std::io::{self, Write};

use clap::Args;
use sthree_core::{Result, parse_object_key};

use super::{Session, report};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Display object contents
#[derive(Args, Debug)]
pub struct CatArgs {
    /// Object path (bucket/key)
    pub path: String,
}

/// Execute the cat command
pub async fn execute(args: CatArgs, session: &Session, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let data = match read_object(&args.path, session).await {
        Ok(data) => data,
        Err(e) => return report(&formatter, &format!("Failed to read {}", args.path), &e),
    };

    // binary-safe, bypasses the formatter
    let mut stdout = io::stdout().lock();
    if let Err(e) = stdout.write_all(&data).and_then(|()| stdout.flush()) {
        formatter.error(&format!("Failed to write to stdout: {e}"));
        return ExitCode::GeneralError;
    }
    ExitCode::Success
}

async fn read_object(raw: &str, session: &Session) -> Result<Vec<u8>> {
    let path = parse_object_key(raw)?;
    session.bucket(&path.bucket)?.get(&path.key).await
}
