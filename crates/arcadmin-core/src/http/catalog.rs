use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::Endpoint;
use crate::error::{AdminError, Result};
use crate::remote::{Catalog, JobStatus, PublishJob, PublishTool, ToolPath};
use crate::urls::with_segments;

const GP_SERVER: &str = "GPServer";
const INPUT_DIRECTION: &str = "esriGPParameterDirectionInput";
const ERROR_MESSAGE: &str = "esriJobMessageTypeError";

#[derive(Deserialize)]
struct FolderListing {
    #[serde(default)]
    services: Vec<ServiceEntry>,
}

#[derive(Deserialize)]
struct ServiceEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct ServiceInfo {
    #[serde(default)]
    tasks: Vec<String>,
}

#[derive(Deserialize)]
struct TaskInfo {
    #[serde(default)]
    parameters: Vec<TaskParameter>,
}

#[derive(Deserialize)]
struct TaskParameter {
    name: String,
    #[serde(default)]
    direction: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobInfo {
    job_id: String,
    job_status: String,
    #[serde(default)]
    messages: Vec<JobMessage>,
}

#[derive(Deserialize)]
struct JobMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    description: String,
}

/// Client for the REST services directory (`.../arcgis/rest/services/`).
#[derive(Debug, Clone)]
pub struct CatalogClient {
    endpoint: Endpoint,
}

impl CatalogClient {
    pub fn connect(endpoint: Endpoint) -> Result<Self> {
        let _: Value = endpoint.get_url(endpoint.root())?;
        tracing::debug!(root = %endpoint.root(), "connected to REST services");
        Ok(Self { endpoint })
    }
}

impl Catalog for CatalogClient {
    fn publish_tool(&self, path: &ToolPath) -> Result<Box<dyn PublishTool + '_>> {
        let qualified = format!("{}/{}", path.folder, path.service);
        let listing: FolderListing = self.endpoint.get(&[path.folder.as_str()])?;
        let listed = listing
            .services
            .iter()
            .any(|s| s.kind == GP_SERVER && (s.name == qualified || s.name == path.service));
        if !listed {
            return Err(AdminError::NotFound {
                kind: "service",
                name: qualified,
            });
        }

        let service: ServiceInfo = self
            .endpoint
            .get(&[path.folder.as_str(), path.service.as_str(), GP_SERVER])?;
        if !service.tasks.iter().any(|t| t == &path.task) {
            return Err(AdminError::NotFound {
                kind: "task",
                name: path.to_string(),
            });
        }

        let url = self
            .endpoint
            .resolve(&[
                path.folder.as_str(),
                path.service.as_str(),
                GP_SERVER,
                path.task.as_str(),
            ]);
        let task: TaskInfo = self.endpoint.get_url(&url)?;
        let inputs: Vec<String> = task
            .parameters
            .into_iter()
            .filter(|p| p.direction == INPUT_DIRECTION)
            .map(|p| p.name)
            .collect();
        tracing::debug!(tool = %path, ?inputs, "publish tool resolved");
        Ok(Box::new(GpTask {
            endpoint: &self.endpoint,
            url,
            inputs,
        }))
    }
}

/// A geoprocessing task with its declared input parameters, in order.
pub struct GpTask<'a> {
    endpoint: &'a Endpoint,
    url: Url,
    inputs: Vec<String>,
}

impl GpTask<'_> {
    /// Pair positional arguments with the task's inputs.
    fn bind<'v>(&'v self, arguments: &[&'v str]) -> Result<Vec<(&'v str, &'v str)>> {
        if arguments.len() > self.inputs.len() {
            return Err(AdminError::validation(format!(
                "task {} takes {} inputs, {} given",
                self.url,
                self.inputs.len(),
                arguments.len()
            )));
        }
        Ok(self
            .inputs
            .iter()
            .map(String::as_str)
            .zip(arguments.iter().copied())
            .collect())
    }
}

impl PublishTool for GpTask<'_> {
    fn submit(&self, package_id: &str, site_url: &Url) -> Result<Box<dyn PublishJob + '_>> {
        let form = self.bind(&[package_id, site_url.as_str()])?;
        let submitted: JobInfo = self
            .endpoint
            .post_url(&with_segments(&self.url, &["submitJob"]), &form)?;
        tracing::debug!(job = %submitted.job_id, package = package_id, "publish job submitted");
        Ok(Box::new(GpJob {
            endpoint: self.endpoint,
            url: with_segments(&self.url, &["jobs", submitted.job_id.as_str()]),
            id: submitted.job_id,
            detail: None,
        }))
    }
}

/// A submitted job, polled at `{task}/jobs/{id}`.
pub struct GpJob<'a> {
    endpoint: &'a Endpoint,
    url: Url,
    id: String,
    detail: Option<String>,
}

impl PublishJob for GpJob<'_> {
    fn id(&self) -> &str {
        &self.id
    }

    fn poll(&mut self) -> Result<JobStatus> {
        let info: JobInfo = self.endpoint.get_url(&self.url)?;
        if let Some(message) = info
            .messages
            .iter()
            .rev()
            .find(|m| m.kind == ERROR_MESSAGE)
        {
            self.detail = Some(message.description.clone());
        }
        JobStatus::parse(&info.job_status).ok_or_else(|| {
            AdminError::remote(None, format!("unknown job status {}", info.job_status))
        })
    }

    fn failure_detail(&self) -> Option<String> {
        self.detail.clone()
    }
}
