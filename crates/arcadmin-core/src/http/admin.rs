use std::path::Path;

use reqwest::blocking::multipart::Form;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::Endpoint;
use crate::error::{AdminError, Result};
use crate::remote::{Cluster, SiteAdmin};

#[derive(Deserialize)]
struct ClusterList {
    #[serde(default)]
    clusters: Vec<ClusterEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClusterEntry {
    cluster_name: String,
}

#[derive(Deserialize)]
struct MachineList {
    #[serde(default)]
    machines: Vec<MachineEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MachineEntry {
    machine_name: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    item: UploadedItem,
}

#[derive(Deserialize)]
struct UploadedItem {
    #[serde(rename = "itemID")]
    item_id: String,
}

/// Client for the administrator directory (`.../arcgis/admin/`).
#[derive(Debug, Clone)]
pub struct AdminClient {
    endpoint: Endpoint,
}

impl AdminClient {
    /// Probe the admin root so a bad URL or token fails while connecting.
    pub fn connect(endpoint: Endpoint) -> Result<Self> {
        let _: Value = endpoint.get_url(endpoint.root())?;
        tracing::debug!(root = %endpoint.root(), "connected to admin site");
        Ok(Self { endpoint })
    }

    fn machine_change(&self, cluster: &Cluster, change: &str, machine: &str) -> Result<()> {
        let _: Value = self.endpoint.post(
            &["clusters", cluster.name.as_str(), "machines", change],
            &[("machineNames", machine)],
        )?;
        Ok(())
    }
}

impl SiteAdmin for AdminClient {
    fn url(&self) -> &Url {
        self.endpoint.root()
    }

    fn cluster_names(&self) -> Result<Vec<String>> {
        let list: ClusterList = self.endpoint.get(&["clusters"])?;
        Ok(list.clusters.into_iter().map(|c| c.cluster_name).collect())
    }

    fn cluster(&self, name: &str) -> Result<Cluster> {
        if self.cluster_names()?.iter().any(|n| n == name) {
            Ok(Cluster::new(name))
        } else {
            Err(AdminError::ClusterNotFound(name.to_string()))
        }
    }

    fn create_cluster(&self, name: &str) -> Result<Cluster> {
        let _: Value = self
            .endpoint
            .post(&["clusters", "create"], &[("clusterName", name)])?;
        Ok(Cluster::new(name))
    }

    fn delete_cluster(&self, cluster: &Cluster) -> Result<()> {
        let _: Value = self
            .endpoint
            .post(&["clusters", cluster.name.as_str(), "delete"], &[])?;
        Ok(())
    }

    fn site_machines(&self) -> Result<Vec<String>> {
        let list: MachineList = self.endpoint.get(&["machines"])?;
        Ok(list.machines.into_iter().map(|m| m.machine_name).collect())
    }

    fn cluster_machines(&self, cluster: &Cluster) -> Result<Vec<String>> {
        let list: MachineList = self
            .endpoint
            .get(&["clusters", cluster.name.as_str(), "machines"])?;
        Ok(list.machines.into_iter().map(|m| m.machine_name).collect())
    }

    fn add_machine(&self, cluster: &Cluster, machine: &str) -> Result<()> {
        self.machine_change(cluster, "add", machine)
    }

    fn remove_machine(&self, cluster: &Cluster, machine: &str) -> Result<()> {
        self.machine_change(cluster, "remove", machine)
    }

    fn upload(&self, path: &Path) -> Result<String> {
        let form = Form::new().file("itemFile", path)?;
        let response: UploadResponse = self.endpoint.post_multipart(&["uploads", "upload"], form)?;
        Ok(response.item.item_id)
    }
}
