pub mod create_service;
pub mod manage_service;
pub mod manage_site;

use std::time::Duration;

use arcadmin_core::config::{
    ConnectionConfig, AUTO_REST_URL, DEFAULT_ADMIN_URL, DEFAULT_HTTP_TIMEOUT_SECS,
};
use clap::Args;

/// Flags every command uses to reach the site.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Administrator user name
    #[arg(short = 'u', long, env = "ARCADMIN_USERNAME")]
    pub username: Option<String>,

    /// Administrator password
    #[arg(short = 'p', long, env = "ARCADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Admin site URL
    #[arg(short = 's', long = "site", env = "ARCADMIN_SITE", default_value = DEFAULT_ADMIN_URL)]
    pub site: String,

    /// REST services root, or AUTO to derive it from the admin site URL
    #[arg(
        short = 'r',
        long = "rest-site",
        env = "ARCADMIN_REST_SITE",
        default_value = AUTO_REST_URL
    )]
    pub rest_site: String,

    /// HTTP request timeout in seconds
    #[arg(
        long = "timeout",
        env = "ARCADMIN_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_HTTP_TIMEOUT_SECS
    )]
    pub timeout_secs: u64,
}

impl From<ConnectionArgs> for ConnectionConfig {
    fn from(args: ConnectionArgs) -> Self {
        ConnectionConfig {
            admin_url: args.site,
            rest_url: args.rest_site,
            username: args.username,
            password: args.password,
            http_timeout: Duration::from_secs(args.timeout_secs),
        }
    }
}
