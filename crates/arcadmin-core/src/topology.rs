//! Cluster and machine changes for one site.
//!
//! [`apply_site_plan`] runs the requested steps in a fixed order, each inside
//! its own narrated scope:
//!
//! 1. validate the plan
//! 2. resolve the named cluster (creating it when asked to)
//! 3. delete the cluster
//! 4. add machines, one scope per machine
//! 5. remove machines, one scope per machine
//! 6. list machines of the cluster, or of the site when no cluster was named
//! 7. list clusters
//!
//! Steps whose flag is not set are empty scopes.

use std::io::Write;

use serde_json::json;

use crate::config::{OutputFormat, SitePlan};
use crate::error::{AdminError, Result};
use crate::narrator::{Fault, Narrator};
use crate::remote::{Cluster, SiteAdmin};

pub const NO_ACTION_MESSAGE: &str = "No action specified (use --help for options)";
pub const NO_CLUSTER_MESSAGE: &str = "No cluster specified";

pub fn apply_site_plan<S>(
    narrator: &Narrator,
    site: &S,
    plan: &SitePlan,
    format: OutputFormat,
    out: &mut dyn Write,
) -> std::result::Result<(), Fault>
where
    S: SiteAdmin + ?Sized,
{
    narrator.attempt("determining actions to perform", || validate_plan(plan))?;

    let cluster = narrator.attempt("looking up cluster", || {
        resolve_cluster(site, plan.cluster.as_deref(), plan.create_cluster)
    })?;

    narrator.attempt("deleting cluster", || {
        if plan.delete_cluster {
            delete_cluster(site, cluster.as_ref())?;
        }
        Ok::<_, AdminError>(())
    })?;

    narrator.attempt("adding machines to cluster", || -> std::result::Result<(), Fault> {
        if plan.add_machines.is_empty() {
            return Ok(());
        }
        let cluster = require_cluster(cluster.as_ref())?;
        for machine in &plan.add_machines {
            narrator.attempt(format!("adding {machine} to cluster"), || {
                site.add_machine(cluster, machine)?;
                tracing::info!(cluster = %cluster.name, machine = %machine, "machine added");
                Ok::<_, AdminError>(())
            })?;
        }
        Ok(())
    })?;

    narrator.attempt("removing machines from cluster", || -> std::result::Result<(), Fault> {
        if plan.remove_machines.is_empty() {
            return Ok(());
        }
        let cluster = require_cluster(cluster.as_ref())?;
        for machine in &plan.remove_machines {
            narrator.attempt(format!("removing {machine} from cluster"), || {
                site.remove_machine(cluster, machine)?;
                tracing::info!(cluster = %cluster.name, machine = %machine, "machine removed");
                Ok::<_, AdminError>(())
            })?;
        }
        Ok(())
    })?;

    narrator.attempt("listing machines", || {
        if plan.list {
            list_machines(site, cluster.as_ref(), format, &mut *out)?;
        }
        Ok::<_, AdminError>(())
    })?;

    narrator.attempt("listing clusters", || {
        if plan.list_clusters {
            list_clusters(site, format, &mut *out)?;
        }
        Ok::<_, AdminError>(())
    })?;

    Ok(())
}

/// Reject plans that do nothing, or that would keep editing a cluster after
/// deleting it.
pub fn validate_plan(plan: &SitePlan) -> Result<()> {
    if !plan.has_action() {
        return Err(AdminError::validation(NO_ACTION_MESSAGE));
    }
    if plan.delete_cluster
        && (!plan.add_machines.is_empty() || !plan.remove_machines.is_empty() || plan.list)
    {
        return Err(AdminError::validation(
            "cannot combine --delete-cluster with adding, removing or listing machines \
             on the same cluster",
        ));
    }
    Ok(())
}

/// Look up `name`, creating the cluster when it is missing and `create` is set.
///
/// Returns `None` when no cluster was named.
pub fn resolve_cluster<S>(site: &S, name: Option<&str>, create: bool) -> Result<Option<Cluster>>
where
    S: SiteAdmin + ?Sized,
{
    let Some(name) = name else {
        if create {
            return Err(AdminError::validation(
                "Asked to create a cluster when none was specified",
            ));
        }
        return Ok(None);
    };
    match site.cluster(name) {
        Ok(cluster) => Ok(Some(cluster)),
        Err(AdminError::ClusterNotFound(_)) if create => {
            let cluster = site.create_cluster(name)?;
            tracing::info!(cluster = %cluster.name, "cluster created");
            Ok(Some(cluster))
        }
        Err(err) => Err(err),
    }
}

pub fn delete_cluster<S>(site: &S, cluster: Option<&Cluster>) -> Result<()>
where
    S: SiteAdmin + ?Sized,
{
    let cluster = cluster.ok_or_else(|| {
        AdminError::validation("Asked to delete a cluster when none was specified")
    })?;
    site.delete_cluster(cluster)?;
    tracing::info!(cluster = %cluster.name, "cluster deleted");
    Ok(())
}

fn require_cluster(cluster: Option<&Cluster>) -> Result<&Cluster> {
    cluster.ok_or_else(|| AdminError::validation(NO_CLUSTER_MESSAGE))
}

/// Print the machines of `cluster`, or of the whole site when it is `None`.
pub fn list_machines<S>(
    site: &S,
    cluster: Option<&Cluster>,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()>
where
    S: SiteAdmin + ?Sized,
{
    let (scope, machines) = match cluster {
        Some(cluster) => ("cluster", site.cluster_machines(cluster)?),
        None => ("site", site.site_machines()?),
    };
    match format {
        OutputFormat::Text => {
            write_bullets(out, &format!("===Machines on this {scope}==="), &machines)
        }
        OutputFormat::Json => {
            let value = json!({
                "scope": scope,
                "cluster": cluster.map(|c| c.name.as_str()),
                "machines": machines,
            });
            writeln!(out, "{}", serde_json::to_string(&value)?)?;
            Ok(())
        }
    }
}

pub fn list_clusters<S>(site: &S, format: OutputFormat, out: &mut dyn Write) -> Result<()>
where
    S: SiteAdmin + ?Sized,
{
    let names = site.cluster_names()?;
    match format {
        OutputFormat::Text => write_bullets(out, "===Clusters on this site===", &names),
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string(&json!({ "clusters": names }))?)?;
            Ok(())
        }
    }
}

fn write_bullets(out: &mut dyn Write, header: &str, items: &[String]) -> Result<()> {
    writeln!(out, "{header}")?;
    for item in items {
        writeln!(out, "* {item}")?;
    }
    writeln!(out)?;
    Ok(())
}
