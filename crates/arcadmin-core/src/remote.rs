//! Boundary to the remote administration service.
//!
//! The orchestration code only ever talks to these traits; [`crate::http`]
//! provides the implementation used by the command-line tool.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use url::Url;

use crate::config::ConnectionConfig;
use crate::error::Result;

/// Handle to a named cluster on a site. The cluster itself lives on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub name: String,
}

impl Cluster {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A local artifact paired with the identifier the server assigned to its upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedPackage {
    pub path: PathBuf,
    pub package_id: String,
}

/// Logical location of a tool in the service catalog: folder, service, task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPath {
    pub folder: String,
    pub service: String,
    pub task: String,
}

impl ToolPath {
    /// `System → PublishingTools → "Publish Service Definition"`.
    pub fn publish_service_definition() -> Self {
        Self {
            folder: "System".to_string(),
            service: "PublishingTools".to_string(),
            task: "Publish Service Definition".to_string(),
        }
    }
}

impl fmt::Display for ToolPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.folder, self.service, self.task)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobStatus {
    New,
    Submitted,
    Waiting,
    Executing,
    Cancelling,
    Deleting,
    Succeeded,
    Failed,
    TimedOut,
    Cancelled,
    Deleted,
}

impl JobStatus {
    pub fn is_running(self) -> bool {
        matches!(
            self,
            JobStatus::New
                | JobStatus::Submitted
                | JobStatus::Waiting
                | JobStatus::Executing
                | JobStatus::Cancelling
                | JobStatus::Deleting
        )
    }

    pub fn is_success(self) -> bool {
        self == JobStatus::Succeeded
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::New => "esriJobNew",
            JobStatus::Submitted => "esriJobSubmitted",
            JobStatus::Waiting => "esriJobWaiting",
            JobStatus::Executing => "esriJobExecuting",
            JobStatus::Cancelling => "esriJobCancelling",
            JobStatus::Deleting => "esriJobDeleting",
            JobStatus::Succeeded => "esriJobSucceeded",
            JobStatus::Failed => "esriJobFailed",
            JobStatus::TimedOut => "esriJobTimedOut",
            JobStatus::Cancelled => "esriJobCancelled",
            JobStatus::Deleted => "esriJobDeleted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let status = match s {
            "esriJobNew" => JobStatus::New,
            "esriJobSubmitted" => JobStatus::Submitted,
            "esriJobWaiting" => JobStatus::Waiting,
            "esriJobExecuting" => JobStatus::Executing,
            "esriJobCancelling" => JobStatus::Cancelling,
            "esriJobDeleting" => JobStatus::Deleting,
            "esriJobSucceeded" => JobStatus::Succeeded,
            "esriJobFailed" => JobStatus::Failed,
            "esriJobTimedOut" => JobStatus::TimedOut,
            "esriJobCancelled" => JobStatus::Cancelled,
            "esriJobDeleted" => JobStatus::Deleted,
            _ => return None,
        };
        Some(status)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Administrative view of one site.
pub trait SiteAdmin {
    /// URL the site was reached at; passed to the publish tool.
    fn url(&self) -> &Url;

    fn cluster_names(&self) -> Result<Vec<String>>;

    /// Look up a cluster, failing with `ClusterNotFound` when it does not exist.
    fn cluster(&self, name: &str) -> Result<Cluster>;

    fn create_cluster(&self, name: &str) -> Result<Cluster>;

    fn delete_cluster(&self, cluster: &Cluster) -> Result<()>;

    fn site_machines(&self) -> Result<Vec<String>>;

    fn cluster_machines(&self, cluster: &Cluster) -> Result<Vec<String>>;

    fn add_machine(&self, cluster: &Cluster, machine: &str) -> Result<()>;

    fn remove_machine(&self, cluster: &Cluster, machine: &str) -> Result<()>;

    /// Upload a local file, returning the server's package identifier.
    fn upload(&self, path: &Path) -> Result<String>;
}

/// Read access to the service catalog.
pub trait Catalog {
    fn publish_tool(&self, path: &ToolPath) -> Result<Box<dyn PublishTool + '_>>;
}

pub trait PublishTool {
    /// Ask the server to publish an uploaded package onto `site_url`.
    fn submit(&self, package_id: &str, site_url: &Url) -> Result<Box<dyn PublishJob + '_>>;
}

/// An asynchronous server job observed only through its status.
pub trait PublishJob {
    fn id(&self) -> &str;

    /// Refresh and return the job's status.
    fn poll(&mut self) -> Result<JobStatus>;

    /// Last error message the server attached to the job, if any.
    fn failure_detail(&self) -> Option<String> {
        None
    }
}

/// Opens connections to the admin site and the service catalog.
pub trait Connector {
    type Site: SiteAdmin;
    type Catalog: Catalog;

    fn connect_site(&self, config: &ConnectionConfig) -> Result<Self::Site>;

    fn connect_catalog(&self, rest_url: &Url, config: &ConnectionConfig)
        -> Result<Self::Catalog>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_states() {
        for status in [
            JobStatus::New,
            JobStatus::Submitted,
            JobStatus::Waiting,
            JobStatus::Executing,
            JobStatus::Cancelling,
            JobStatus::Deleting,
        ] {
            assert!(status.is_running(), "{status} should be running");
        }
        for status in [
            JobStatus::Succeeded,
            JobStatus::Failed,
            JobStatus::TimedOut,
            JobStatus::Cancelled,
            JobStatus::Deleted,
        ] {
            assert!(!status.is_running(), "{status} should be finished");
        }
    }

    #[test]
    fn parses_server_status_names() {
        assert_eq!(
            JobStatus::parse("esriJobExecuting"),
            Some(JobStatus::Executing)
        );
        assert_eq!(JobStatus::parse("esriJobSucceeded"), Some(JobStatus::Succeeded));
        assert_eq!(JobStatus::parse("esriJobDeleting"), Some(JobStatus::Deleting));
        assert_eq!(JobStatus::parse("esriJobDeleted"), Some(JobStatus::Deleted));
        assert_eq!(JobStatus::parse("bogus"), None);
    }

    #[test]
    fn publish_tool_path() {
        let path = ToolPath::publish_service_definition();
        assert_eq!(path.to_string(), "System/PublishingTools/Publish Service Definition");
    }
}
