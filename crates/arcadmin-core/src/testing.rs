//! In-memory collaborator used by the unit tests.
//!
//! Every remote call is appended to a log shared by the site and the catalog so
//! tests can assert on cross-object ordering.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use url::Url;

use crate::config::ConnectionConfig;
use crate::error::{AdminError, Result};
use crate::remote::{
    Catalog, Cluster, Connector, JobStatus, PublishJob, PublishTool, SiteAdmin, ToolPath,
};

#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ConnectSite,
    ConnectCatalog(String),
    ClusterNames,
    LookupCluster(String),
    CreateCluster(String),
    DeleteCluster(String),
    SiteMachines,
    ClusterMachines(String),
    AddMachine(String, String),
    RemoveMachine(String, String),
    Upload(PathBuf),
    ResolveTool(String),
    Submit(String, String),
    Poll(String),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Call::CreateCluster(_)
                | Call::DeleteCluster(_)
                | Call::AddMachine(..)
                | Call::RemoveMachine(..)
                | Call::Upload(_)
                | Call::Submit(..)
        )
    }
}

#[derive(Default)]
struct State {
    clusters: BTreeMap<String, Vec<String>>,
    site_machines: Vec<String>,
    failing_machines: Vec<String>,
    failing_uploads: Vec<String>,
    tool_missing: bool,
    running_polls: usize,
    final_status: Option<JobStatus>,
    next_package: usize,
}

/// Fake site, catalog and connector in one cloneable handle.
#[derive(Clone)]
pub struct FakeRemote {
    url: Url,
    state: Rc<RefCell<State>>,
    calls: Rc<RefCell<Vec<Call>>>,
    refuse_connection: bool,
}

impl Default for FakeRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRemote {
    pub fn new() -> Self {
        Self {
            url: Url::parse("http://fake:6080/arcgis/admin/").expect("static URL"),
            state: Rc::new(RefCell::new(State::default())),
            calls: Rc::new(RefCell::new(Vec::new())),
            refuse_connection: false,
        }
    }

    pub fn with_cluster(self, name: &str, machines: &[&str]) -> Self {
        self.state.borrow_mut().clusters.insert(
            name.to_string(),
            machines.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    pub fn with_site_machines(self, machines: &[&str]) -> Self {
        self.state.borrow_mut().site_machines = machines.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn failing_machine(self, machine: &str) -> Self {
        self.state
            .borrow_mut()
            .failing_machines
            .push(machine.to_string());
        self
    }

    pub fn failing_upload(self, file_name: &str) -> Self {
        self.state
            .borrow_mut()
            .failing_uploads
            .push(file_name.to_string());
        self
    }

    pub fn without_publish_tool(self) -> Self {
        self.state.borrow_mut().tool_missing = true;
        self
    }

    /// Jobs report `running` for this many polls before finishing.
    pub fn job_runs_for(self, polls: usize) -> Self {
        self.state.borrow_mut().running_polls = polls;
        self
    }

    pub fn job_finishes_as(self, status: JobStatus) -> Self {
        self.state.borrow_mut().final_status = Some(status);
        self
    }

    pub fn refusing_connections(mut self) -> Self {
        self.refuse_connection = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn cluster_members(&self, name: &str) -> Option<Vec<String>> {
        self.state.borrow().clusters.get(name).cloned()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl SiteAdmin for FakeRemote {
    fn url(&self) -> &Url {
        &self.url
    }

    fn cluster_names(&self) -> Result<Vec<String>> {
        self.record(Call::ClusterNames);
        Ok(self.state.borrow().clusters.keys().cloned().collect())
    }

    fn cluster(&self, name: &str) -> Result<Cluster> {
        self.record(Call::LookupCluster(name.to_string()));
        if self.state.borrow().clusters.contains_key(name) {
            Ok(Cluster::new(name))
        } else {
            Err(AdminError::ClusterNotFound(name.to_string()))
        }
    }

    fn create_cluster(&self, name: &str) -> Result<Cluster> {
        self.record(Call::CreateCluster(name.to_string()));
        self.state
            .borrow_mut()
            .clusters
            .insert(name.to_string(), Vec::new());
        Ok(Cluster::new(name))
    }

    fn delete_cluster(&self, cluster: &Cluster) -> Result<()> {
        self.record(Call::DeleteCluster(cluster.name.clone()));
        self.state
            .borrow_mut()
            .clusters
            .remove(&cluster.name)
            .map(|_| ())
            .ok_or_else(|| AdminError::ClusterNotFound(cluster.name.clone()))
    }

    fn site_machines(&self) -> Result<Vec<String>> {
        self.record(Call::SiteMachines);
        Ok(self.state.borrow().site_machines.clone())
    }

    fn cluster_machines(&self, cluster: &Cluster) -> Result<Vec<String>> {
        self.record(Call::ClusterMachines(cluster.name.clone()));
        self.state
            .borrow()
            .clusters
            .get(&cluster.name)
            .cloned()
            .ok_or_else(|| AdminError::ClusterNotFound(cluster.name.clone()))
    }

    fn add_machine(&self, cluster: &Cluster, machine: &str) -> Result<()> {
        self.record(Call::AddMachine(cluster.name.clone(), machine.to_string()));
        let mut state = self.state.borrow_mut();
        if state.failing_machines.iter().any(|m| m == machine) {
            return Err(AdminError::remote(
                Some(500),
                format!("Machine '{machine}' is not registered with the site."),
            ));
        }
        state
            .clusters
            .get_mut(&cluster.name)
            .ok_or_else(|| AdminError::ClusterNotFound(cluster.name.clone()))?
            .push(machine.to_string());
        Ok(())
    }

    fn remove_machine(&self, cluster: &Cluster, machine: &str) -> Result<()> {
        self.record(Call::RemoveMachine(
            cluster.name.clone(),
            machine.to_string(),
        ));
        let mut state = self.state.borrow_mut();
        let members = state
            .clusters
            .get_mut(&cluster.name)
            .ok_or_else(|| AdminError::ClusterNotFound(cluster.name.clone()))?;
        let before = members.len();
        members.retain(|m| m != machine);
        if members.len() == before {
            return Err(AdminError::remote(
                Some(500),
                format!("Machine '{machine}' is not a member of the cluster."),
            ));
        }
        Ok(())
    }

    fn upload(&self, path: &Path) -> Result<String> {
        self.record(Call::Upload(path.to_path_buf()));
        let mut state = self.state.borrow_mut();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if state.failing_uploads.contains(&file_name) {
            return Err(AdminError::remote(Some(500), "Upload rejected."));
        }
        state.next_package += 1;
        Ok(format!("pkg{}", state.next_package))
    }
}

impl Catalog for FakeRemote {
    fn publish_tool(&self, path: &ToolPath) -> Result<Box<dyn PublishTool + '_>> {
        self.record(Call::ResolveTool(path.to_string()));
        if self.state.borrow().tool_missing {
            return Err(AdminError::NotFound {
                kind: "service",
                name: format!("{}/{}", path.folder, path.service),
            });
        }
        Ok(Box::new(FakeTool { remote: self }))
    }
}

struct FakeTool<'a> {
    remote: &'a FakeRemote,
}

impl PublishTool for FakeTool<'_> {
    fn submit(&self, package_id: &str, site_url: &Url) -> Result<Box<dyn PublishJob + '_>> {
        self.remote
            .record(Call::Submit(package_id.to_string(), site_url.to_string()));
        let state = self.remote.state.borrow();
        Ok(Box::new(FakeJob {
            remote: self.remote,
            id: format!("job-{package_id}"),
            remaining: state.running_polls,
            final_status: state.final_status.unwrap_or(JobStatus::Succeeded),
        }))
    }
}

struct FakeJob<'a> {
    remote: &'a FakeRemote,
    id: String,
    remaining: usize,
    final_status: JobStatus,
}

impl PublishJob for FakeJob<'_> {
    fn id(&self) -> &str {
        &self.id
    }

    fn poll(&mut self) -> Result<JobStatus> {
        self.remote.record(Call::Poll(self.id.clone()));
        if self.remaining > 0 {
            self.remaining -= 1;
            return Ok(JobStatus::Executing);
        }
        Ok(self.final_status)
    }

    fn failure_detail(&self) -> Option<String> {
        (!self.final_status.is_success())
            .then(|| "ERROR 001487: Failed to update the published service.".to_string())
    }
}

impl Connector for FakeRemote {
    type Site = FakeRemote;
    type Catalog = FakeRemote;

    fn connect_site(&self, _config: &ConnectionConfig) -> Result<Self::Site> {
        self.record(Call::ConnectSite);
        if self.refuse_connection {
            return Err(AdminError::remote(None, "connection refused"));
        }
        Ok(self.clone())
    }

    fn connect_catalog(&self, rest_url: &Url, _config: &ConnectionConfig) -> Result<Self::Catalog> {
        self.record(Call::ConnectCatalog(rest_url.to_string()));
        Ok(self.clone())
    }
}
