//! config command - Show or change configuration defaults

use std::fmt;

use clap::Subcommand;
use serde::Serialize;
use sthree_core::{CannedAcl, Config, ConfigManager, Defaults, Result};

use super::report;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Show the current defaults
    Show,

    /// Change one or more defaults
    Set {
        /// Default region
        #[arg(long)]
        region: Option<String>,

        /// Endpoint URL for S3-compatible services
        #[arg(long)]
        endpoint: Option<String>,

        /// Canned ACL for new bucket handles
        #[arg(long)]
        acl: Option<CannedAcl>,

        /// Use path-style bucket addressing
        #[arg(long)]
        path_style: Option<bool>,
    },

    /// Remove the region and endpoint defaults
    Reset,
}

#[derive(Debug, Serialize)]
struct ConfigOutput {
    path: String,
    #[serde(flatten)]
    defaults: Defaults,
}

impl fmt::Display for ConfigOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Config     : {}", self.path)?;
        writeln!(
            f,
            "Region     : {}",
            self.defaults.region.as_deref().unwrap_or("(resolved)")
        )?;
        writeln!(
            f,
            "Endpoint   : {}",
            self.defaults.endpoint.as_deref().unwrap_or("(aws)")
        )?;
        writeln!(f, "Write ACL  : {}", self.defaults.default_acl)?;
        write!(f, "Path style : {}", self.defaults.path_style)
    }
}

/// Apply a `config` subcommand to a loaded configuration
fn apply(command: ConfigCommands, config: &mut Config) -> bool {
    match command {
        ConfigCommands::Show => false,
        ConfigCommands::Set {
            region,
            endpoint,
            acl,
            path_style,
        } => {
            let defaults = &mut config.defaults;
            if region.is_some() {
                defaults.region = region;
            }
            if endpoint.is_some() {
                defaults.endpoint = endpoint;
            }
            if let Some(acl) = acl {
                defaults.default_acl = acl;
            }
            if let Some(path_style) = path_style {
                defaults.path_style = path_style;
            }
            true
        }
        ConfigCommands::Reset => {
            config.defaults.region = None;
            config.defaults.endpoint = None;
            true
        }
    }
}

fn run(command: ConfigCommands, manager: &ConfigManager) -> Result<ConfigOutput> {
    let mut config = manager.load()?;
    if apply(command, &mut config) {
        manager.save(&config)?;
    }
    Ok(ConfigOutput {
        path: manager.config_path().display().to_string(),
        defaults: config.defaults,
    })
}

/// Execute a config subcommand
pub fn execute(command: ConfigCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let result = ConfigManager::new().and_then(|manager| run(command, &manager));
    match result {
        Ok(output) => {
            formatter.output(&output);
            ExitCode::Success
        }
        Err(e) => report(&formatter, "Configuration update failed", &e),
    }
}
