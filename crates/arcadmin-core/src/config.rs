use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_ADMIN_URL: &str = "http://127.0.0.1:6080/arcgis/admin/";
/// Sentinel REST URL meaning "derive it from the admin URL".
pub const AUTO_REST_URL: &str = "AUTO";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 125;

// ---------------------------------------------------------------------------
// ConnectionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub admin_url: String,
    pub rest_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub http_timeout: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            admin_url: DEFAULT_ADMIN_URL.to_string(),
            rest_url: AUTO_REST_URL.to_string(),
            username: None,
            password: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl ConnectionConfig {
    pub fn new(admin_url: impl Into<String>) -> Self {
        Self {
            admin_url: admin_url.into(),
            ..Self::default()
        }
    }

    /// Username and password, when both were supplied.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PollPolicy
// ---------------------------------------------------------------------------

/// How publish jobs are waited on.
///
/// The job is polled at a fixed interval until the server reports it is no
/// longer running. There is no timeout and no backoff: a job the server never
/// finishes blocks the command until the process is killed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl PollPolicy {
    pub fn from_millis(ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(ms),
        }
    }
}

// ---------------------------------------------------------------------------
// Command configurations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct CreateServiceConfig {
    pub connection: ConnectionConfig,
    pub cluster: Option<String>,
    pub files: Vec<PathBuf>,
    pub poll: PollPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceOperation {
    Status,
    Start,
    Stop,
    Delete,
}

impl ServiceOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceOperation::Status => "status",
            ServiceOperation::Start => "start",
            ServiceOperation::Stop => "stop",
            ServiceOperation::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "status" => ServiceOperation::Status,
            "start" => ServiceOperation::Start,
            "stop" => ServiceOperation::Stop,
            "delete" => ServiceOperation::Delete,
            _ => return None,
        })
    }
}

impl fmt::Display for ServiceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ManageServiceConfig {
    pub connection: ConnectionConfig,
    pub name: Option<String>,
    /// Raw `-o` value. Any string is accepted; see [`ServiceOperation::parse`].
    pub operation: Option<String>,
}

/// Site-wide operation accepted by manage-site. Reserved: not acted on yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteOperation {
    ChkStatus,
    Start,
    Stop,
}

impl SiteOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            SiteOperation::ChkStatus => "chkstatus",
            SiteOperation::Start => "start",
            SiteOperation::Stop => "stop",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "chkstatus" => SiteOperation::ChkStatus,
            "start" => SiteOperation::Start,
            "stop" => SiteOperation::Stop,
            _ => return None,
        })
    }
}

impl fmt::Display for SiteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested changes to one site's topology.
#[derive(Debug, Clone, Default)]
pub struct SitePlan {
    pub cluster: Option<String>,
    pub add_machines: Vec<String>,
    pub remove_machines: Vec<String>,
    pub delete_cluster: bool,
    pub create_cluster: bool,
    pub list: bool,
    pub list_clusters: bool,
    /// Raw `-o` value, kept as given.
    pub operation: Option<String>,
}

impl SitePlan {
    /// True when at least one actionable flag is set.
    pub fn has_action(&self) -> bool {
        !self.add_machines.is_empty()
            || !self.remove_machines.is_empty()
            || self.delete_cluster
            || self.create_cluster
            || self.list
            || self.list_clusters
    }
}

#[derive(Debug, Clone, Default)]
pub struct ManageSiteConfig {
    pub connection: ConnectionConfig,
    pub plan: SitePlan,
}

/// Output rendering for listings and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_defaults() {
        let cfg = ConnectionConfig::default();
        assert_eq!(cfg.admin_url, "http://127.0.0.1:6080/arcgis/admin/");
        assert_eq!(cfg.rest_url, "AUTO");
        assert!(cfg.credentials().is_none());
    }

    #[test]
    fn credentials_need_both_parts() {
        let mut cfg = ConnectionConfig::default();
        cfg.username = Some("admin".into());
        assert!(cfg.credentials().is_none());
        cfg.password = Some("secret".into());
        assert_eq!(cfg.credentials(), Some(("admin", "secret")));
    }

    #[test]
    fn poll_interval_default() {
        assert_eq!(PollPolicy::default().interval, Duration::from_millis(125));
    }

    #[test]
    fn reserved_operation_is_not_an_action() {
        let plan = SitePlan {
            operation: Some("start".into()),
            ..SitePlan::default()
        };
        assert!(!plan.has_action());

        let plan = SitePlan {
            operation: Some("restart".into()),
            ..SitePlan::default()
        };
        assert!(!plan.has_action());

        let plan = SitePlan {
            list_clusters: true,
            ..SitePlan::default()
        };
        assert!(plan.has_action());
    }

    #[test]
    fn operations_parse_leniently() {
        assert_eq!(SiteOperation::parse("chkstatus"), Some(SiteOperation::ChkStatus));
        assert_eq!(SiteOperation::parse("restart"), None);
        assert_eq!(ServiceOperation::parse("delete"), Some(ServiceOperation::Delete));
        assert_eq!(ServiceOperation::parse("restart"), None);
    }
}
