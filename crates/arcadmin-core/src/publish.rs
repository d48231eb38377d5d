//! Publishing service definition files onto a site.
//!
//! All files are validated, then all are uploaded, and only then is each
//! uploaded package handed to the publish tool, in input order. A failure at
//! any point stops the run; nothing already published is rolled back.

use std::path::{Path, PathBuf};
use std::thread;

use serde::Serialize;

use crate::config::PollPolicy;
use crate::error::{AdminError, Result};
use crate::narrator::{Fault, Narrator};
use crate::remote::{Catalog, Cluster, JobStatus, PublishJob, SiteAdmin, ToolPath, UploadedPackage};

/// One service definition that went through upload and publishing.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedService {
    pub path: PathBuf,
    pub package_id: String,
    pub job_id: String,
    pub status: JobStatus,
}

pub fn publish_services<S, C>(
    narrator: &Narrator,
    site: &S,
    catalog: &C,
    cluster: Option<&str>,
    files: &[PathBuf],
    poll: PollPolicy,
) -> std::result::Result<Vec<PublishedService>, Fault>
where
    S: SiteAdmin + ?Sized,
    C: Catalog + ?Sized,
{
    let tool = narrator.attempt("looking up Publish Tool", || {
        catalog.publish_tool(&ToolPath::publish_service_definition())
    })?;

    let cluster = narrator.attempt("looking up cluster", || lookup_cluster(site, cluster))?;
    if let Some(cluster) = &cluster {
        tracing::debug!(cluster = %cluster.name, "publishing with cluster present on site");
    }

    let files = narrator.attempt("verifying service definition file exists", || {
        verify_files(files)
    })?;

    let mut packages = Vec::with_capacity(files.len());
    for path in files {
        let package = narrator.attempt(format!("uploading {}", path.display()), || {
            upload(site, &path)
        })?;
        packages.push(package);
    }

    let mut published = Vec::with_capacity(packages.len());
    for package in packages {
        let label = format!("publishing {}", file_label(&package.path));
        let service = narrator.attempt(label, || -> Result<PublishedService> {
            let mut job = tool.submit(&package.package_id, site.url())?;
            let status = wait_for_job(job.as_mut(), poll)?;
            tracing::info!(
                file = %package.path.display(),
                job = job.id(),
                "service published"
            );
            Ok(PublishedService {
                path: package.path.clone(),
                package_id: package.package_id.clone(),
                job_id: job.id().to_string(),
                status,
            })
        })?;
        published.push(service);
    }

    Ok(published)
}

/// Resolve an optional cluster name. A missing cluster is an error here; it is
/// never created on demand.
pub fn lookup_cluster<S>(site: &S, name: Option<&str>) -> Result<Option<Cluster>>
where
    S: SiteAdmin + ?Sized,
{
    name.map(|name| site.cluster(name)).transpose()
}

/// Make every path absolute and check it names an existing regular file.
pub fn verify_files(files: &[PathBuf]) -> Result<Vec<PathBuf>> {
    if files.is_empty() {
        return Err(AdminError::validation("No file specified"));
    }
    files
        .iter()
        .map(|file| -> Result<PathBuf> {
            let path = std::path::absolute(file)?;
            if path.is_file() {
                Ok(path)
            } else {
                Err(AdminError::validation(format!(
                    "{} is not a file",
                    path.display()
                )))
            }
        })
        .collect()
}

fn upload<S>(site: &S, path: &Path) -> Result<UploadedPackage>
where
    S: SiteAdmin + ?Sized,
{
    let package_id = site.upload(path)?;
    tracing::info!(file = %path.display(), package = %package_id, "uploaded");
    Ok(UploadedPackage {
        path: path.to_path_buf(),
        package_id,
    })
}

/// Block until `job` stops running, sleeping `poll.interval` between checks.
///
/// Any finished state other than success is returned as `JobFailed`.
pub fn wait_for_job(job: &mut dyn PublishJob, poll: PollPolicy) -> Result<JobStatus> {
    let status = loop {
        let status = job.poll()?;
        if !status.is_running() {
            break status;
        }
        tracing::debug!(job = job.id(), %status, "waiting for job");
        thread::sleep(poll.interval);
    };
    if status.is_success() {
        return Ok(status);
    }
    Err(AdminError::JobFailed {
        job_id: job.id().to_string(),
        status: status.to_string(),
        detail: job
            .failure_detail()
            .unwrap_or_else(|| "no details reported".to_string()),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
