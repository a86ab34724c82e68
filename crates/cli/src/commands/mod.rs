//! CLI command definitions and execution
//!
//! Every storage command goes through a [`Session`], which initializes the
//! global bucket registry once and hands out open bucket handles from it.
//! Handles are closed (and deregistered) when the command finishes.

use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use sthree_core::{
    Bucket, BucketRegistry, ConfigManager, ConnectionConfiguration, CredentialProvider,
    Credentials, Defaults, Error, Region, StorageConnector,
};
use sthree_s3::S3Connector;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod cat;
mod config;
mod cp;
mod ls;
mod put;
mod rm;
mod stat;

/// sthree - pooled S3 bucket client
///
/// A command-line interface for S3 and S3-compatible object storage.
#[derive(Parser, Debug)]
#[command(name = "sthree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Connection overrides applied on top of resolved credentials
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Storage region (keeps the resolved region when omitted)
    #[arg(long, global = true, env = "STHREE_REGION")]
    pub region: Option<String>,

    /// Custom endpoint URL for S3-compatible services
    #[arg(long, global = true, env = "STHREE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Access key ID
    #[arg(long, global = true, env = "STHREE_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// Secret access key
    #[arg(long, global = true, env = "STHREE_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List objects under a bucket or prefix
    Ls(ls::LsArgs),

    /// Display object contents
    Cat(cat::CatArgs),

    /// Upload a local file
    Put(put::PutArgs),

    /// Remove objects
    Rm(rm::RmArgs),

    /// Show object metadata
    Stat(stat::StatArgs),

    /// Copy an object into another bucket
    Cp(cp::CpArgs),

    /// Show or change configuration defaults
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

/// Registry-backed source of open bucket handles for one CLI invocation
pub struct Session {
    registry: Arc<BucketRegistry>,
    connector: Box<dyn StorageConnector>,
    defaults: Defaults,
}

impl Session {
    /// Prepare `registry`: config file region, then resolved credentials,
    /// then command-line overrides.
    pub fn new(
        registry: Arc<BucketRegistry>,
        args: &ConnectionArgs,
        defaults: Defaults,
        provider: &dyn CredentialProvider,
    ) -> anyhow::Result<Self> {
        if args.access_key.is_some() != args.secret_key.is_some() {
            bail!("--access-key and --secret-key must be given together");
        }

        if let Some(region) = defaults.region() {
            let current = registry.config().credentials;
            registry.set_credentials(ConnectionConfiguration::new(region, current));
        }

        registry.init_with(provider);

        let region = args.region.as_deref().map(Region::new).unwrap_or_default();
        let explicit = match (&args.access_key, &args.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                Some(Credentials::new(access_key.as_str(), secret_key.as_str()))
            }
            _ => None,
        };

        if explicit.is_some() || !region.is_unset() {
            let credentials = explicit.unwrap_or_else(|| registry.config().credentials);
            registry.set_credentials(ConnectionConfiguration::new(region, credentials));
        }

        let connector = connector_for(args, &defaults)?;

        tracing::debug!(
            region = %registry.config().region,
            endpoint = ?connector.endpoint(),
            path_style = connector.path_style(),
            "session ready"
        );

        Ok(Self {
            registry,
            connector: Box::new(connector),
            defaults,
        })
    }

    /// Session on the global registry using the config file and the
    /// SDK default credential chain
    pub async fn from_environment(args: &ConnectionArgs) -> anyhow::Result<Self> {
        let defaults = ConfigManager::new()
            .context("failed to locate configuration")?
            .load()
            .context("failed to load configuration")?
            .defaults;

        // the SDK chain is async, resolve it before touching the registry
        let provider = sthree_s3::load_default_chain().await;

        Self::new(
            Arc::clone(BucketRegistry::global()),
            args,
            defaults,
            &provider,
        )
    }

    /// Replace the storage connector used to open handles
    pub fn with_connector(mut self, connector: impl StorageConnector + 'static) -> Self {
        self.connector = Box::new(connector);
        self
    }

    pub fn registry(&self) -> &Arc<BucketRegistry> {
        &self.registry
    }

    /// Get the pooled handle for `name` and make sure it is open
    pub fn bucket(&self, name: &str) -> sthree_core::Result<Arc<Bucket>> {
        let bucket = self.registry.get_bucket(name);
        self.prepare(&bucket)?;
        Ok(bucket)
    }

    /// Get a sibling of `source`, inheriting its write permission
    pub fn sibling(&self, source: &Bucket, name: &str) -> sthree_core::Result<Arc<Bucket>> {
        let bucket = source.new_bucket(name)?;
        bucket.open(self.connector.as_ref())?;
        Ok(bucket)
    }

    fn prepare(&self, bucket: &Bucket) -> sthree_core::Result<()> {
        if !bucket.is_open() {
            bucket.set_default_write_permission(self.defaults.default_acl);
        }
        bucket.open(self.connector.as_ref())
    }

    /// Close every handle handed out by this session
    pub fn close(&self) {
        self.registry.close_all();
    }
}

/// Connector for the flag endpoint, or the config file endpoint.
/// Addressing style always follows the config file.
fn connector_for(args: &ConnectionArgs, defaults: &Defaults) -> anyhow::Result<S3Connector> {
    match &args.endpoint {
        Some(endpoint) => {
            url::Url::parse(endpoint).with_context(|| format!("invalid endpoint '{endpoint}'"))?;
            Ok(S3Connector::with_endpoint(endpoint.as_str(), defaults.path_style))
        }
        None => Ok(S3Connector::from_defaults(defaults)),
    }
}

/// Exit code for a failed session setup: core errors keep their own code,
/// anything else is a usage problem
fn startup_exit_code(error: &anyhow::Error) -> ExitCode {
    error
        .downcast_ref::<Error>()
        .map(ExitCode::from_error)
        .unwrap_or(ExitCode::UsageError)
}

/// Report a failed operation and map it to an exit code
pub(crate) fn report(formatter: &Formatter, context: &str, error: &Error) -> ExitCode {
    formatter.error(&format!("{context}: {error}"));
    ExitCode::from_error(error)
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        quiet: cli.quiet,
    };

    // config commands never touch the registry
    if let Commands::Config(cmd) = cli.command {
        return config::execute(cmd, output_config);
    }

    let session = match Session::from_environment(&cli.connection).await {
        Ok(session) => session,
        Err(e) => {
            Formatter::new(output_config).error(&format!("{e:#}"));
            return startup_exit_code(&e);
        }
    };

    let code = match cli.command {
        Commands::Ls(args) => ls::execute(args, &session, output_config).await,
        Commands::Cat(args) => cat::execute(args, &session, output_config).await,
        Commands::Put(args) => put::execute(args, &session, output_config).await,
        Commands::Rm(args) => rm::execute(args, &session, output_config).await,
        Commands::Stat(args) => stat::execute(args, &session, output_config).await,
        Commands::Cp(args) => cp::execute(args, &session, output_config).await,
        Commands::Config(cmd) => config::execute(cmd, output_config),
    };

    session.close();
    code
}
