use std::path::PathBuf;

use anyhow::Result;
use arcadmin_core::config::{CreateServiceConfig, OutputFormat, PollPolicy, DEFAULT_POLL_INTERVAL_MS};
use arcadmin_core::driver;
use arcadmin_core::http::HttpConnector;
use arcadmin_core::Narrator;
use clap::Args;

use super::ConnectionArgs;
use crate::output::print_json;

#[derive(Args, Debug)]
pub struct CreateServiceArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Cluster the services are published to; it must already exist
    #[arg(short = 'c', long)]
    pub cluster: Option<String>,

    /// Milliseconds between publish job status checks
    #[arg(
        long,
        env = "ARCADMIN_POLL_INTERVAL_MS",
        default_value_t = DEFAULT_POLL_INTERVAL_MS
    )]
    pub poll_interval_ms: u64,

    /// Service definition (.sd) files; any unrecognised argument is taken as a file
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

impl From<CreateServiceArgs> for CreateServiceConfig {
    fn from(args: CreateServiceArgs) -> Self {
        CreateServiceConfig {
            connection: args.connection.into(),
            cluster: args.cluster,
            files: args.files,
            poll: PollPolicy::from_millis(args.poll_interval_ms),
        }
    }
}

pub fn run(narrator: &Narrator, args: CreateServiceArgs, format: OutputFormat) -> Result<()> {
    let config = CreateServiceConfig::from(args);
    let published = driver::create_service(narrator, &HttpConnector, &config)?;
    if format == OutputFormat::Json {
        print_json(&published)?;
    }
    Ok(())
}
