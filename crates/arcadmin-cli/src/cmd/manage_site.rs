use std::io::{self, Write};

use anyhow::Result;
use arcadmin_core::config::{ManageSiteConfig, OutputFormat, SitePlan};
use arcadmin_core::driver;
use arcadmin_core::http::HttpConnector;
use arcadmin_core::Narrator;
use clap::Args;

use super::ConnectionArgs;

#[derive(Args, Debug)]
pub struct ManageSiteArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Machines to add to the cluster
    #[arg(short = 'A', long = "add-machines", num_args = 1.., value_name = "MACHINE")]
    pub add_machines: Vec<String>,

    /// Machines to remove from the cluster
    #[arg(short = 'R', long = "remove-machines", num_args = 1.., value_name = "MACHINE")]
    pub remove_machines: Vec<String>,

    /// List machines on the cluster, or on the site when no cluster is given
    #[arg(short = 'l', long)]
    pub list: bool,

    /// List clusters on the site (legacy: -lc)
    #[arg(long = "list-clusters")]
    pub list_clusters: bool,

    /// Site operation: chkstatus, start or stop (reserved; accepted but not performed)
    #[arg(short = 'o', long, value_name = "OPERATION")]
    pub operation: Option<String>,

    /// Cluster to act on
    #[arg(short = 'c', long)]
    pub cluster: Option<String>,

    /// Delete the cluster
    #[arg(short = 'D', long = "delete-cluster")]
    pub delete_cluster: bool,

    /// Create the cluster when it does not exist (legacy: -cr)
    #[arg(long = "create-cluster")]
    pub create_cluster: bool,
}

impl From<ManageSiteArgs> for ManageSiteConfig {
    fn from(args: ManageSiteArgs) -> Self {
        ManageSiteConfig {
            connection: args.connection.into(),
            plan: SitePlan {
                cluster: args.cluster,
                add_machines: args.add_machines,
                remove_machines: args.remove_machines,
                delete_cluster: args.delete_cluster,
                create_cluster: args.create_cluster,
                list: args.list,
                list_clusters: args.list_clusters,
                operation: args.operation,
            },
        }
    }
}

pub fn run(narrator: &Narrator, args: ManageSiteArgs, format: OutputFormat) -> Result<()> {
    let config = ManageSiteConfig::from(args);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    driver::manage_site(narrator, &HttpConnector, &config, format, &mut out)?;
    out.flush()?;
    Ok(())
}
