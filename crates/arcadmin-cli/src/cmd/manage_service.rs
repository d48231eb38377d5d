use anyhow::Result;
use arcadmin_core::config::ManageServiceConfig;
use arcadmin_core::driver;
use arcadmin_core::Narrator;
use clap::Args;

use super::ConnectionArgs;

#[derive(Args, Debug)]
pub struct ManageServiceArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Service name
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Operation to perform on the service (status, start, stop, delete)
    #[arg(short = 'o', long, value_name = "OPERATION")]
    pub operation: Option<String>,
}

pub fn run(narrator: &Narrator, args: ManageServiceArgs) -> Result<()> {
    let config = ManageServiceConfig {
        connection: args.connection.into(),
        name: args.name,
        operation: args.operation,
    };
    driver::manage_service(narrator, &config)?;
    Ok(())
}
