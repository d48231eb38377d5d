//! Entry routines for the three commands.
//!
//! Each driver only connects and sequences; the work happens in
//! [`crate::publish`] and [`crate::topology`], and every failure is reported
//! through the narrator it is given.

use std::io::Write;

use crate::config::{
    CreateServiceConfig, ManageServiceConfig, ManageSiteConfig, OutputFormat, ServiceOperation,
    SiteOperation,
};
use crate::error::AdminError;
use crate::narrator::{Fault, Narrator};
use crate::publish::{publish_services, PublishedService};
use crate::remote::Connector;
use crate::topology::apply_site_plan;
use crate::urls::resolve_rest_url;

pub type Outcome<T> = std::result::Result<T, Fault>;

/// Upload and publish every service definition file in `config.files`.
pub fn create_service<C: Connector>(
    narrator: &Narrator,
    connector: &C,
    config: &CreateServiceConfig,
) -> Outcome<Vec<PublishedService>> {
    let connection = &config.connection;
    let site = narrator.attempt("connecting to admin site", || {
        connector.connect_site(connection)
    })?;
    let rest_url = narrator.attempt("resolving REST services URL", || {
        resolve_rest_url(&connection.admin_url, &connection.rest_url)
    })?;
    let catalog = narrator.attempt("connecting to REST services", || {
        connector.connect_catalog(&rest_url, connection)
    })?;

    publish_services(
        narrator,
        &site,
        &catalog,
        config.cluster.as_deref(),
        &config.files,
        config.poll,
    )
}

/// Service management is not available yet; always fails.
pub fn manage_service(narrator: &Narrator, config: &ManageServiceConfig) -> Outcome<()> {
    tracing::debug!(
        name = ?config.name,
        operation = ?config.operation,
        known = ?config.operation.as_deref().and_then(ServiceOperation::parse),
        admin_url = %config.connection.admin_url,
        "manage-service requested"
    );
    narrator.attempt("managing service", || {
        Err::<(), _>(AdminError::NotImplemented("manage-service".to_string()))
    })
}

/// Apply cluster and machine changes to one site.
pub fn manage_site<C: Connector>(
    narrator: &Narrator,
    connector: &C,
    config: &ManageSiteConfig,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Outcome<()> {
    let site = narrator.attempt("connecting to admin site", || {
        connector.connect_site(&config.connection)
    })?;
    if let Some(operation) = config.plan.operation.as_deref() {
        match SiteOperation::parse(operation) {
            Some(operation) => {
                tracing::debug!(%operation, "site operation accepted but not acted on")
            }
            None => tracing::debug!(operation, "unrecognised site operation ignored"),
        }
    }
    apply_site_plan(narrator, &site, &config.plan, format, out)
}
