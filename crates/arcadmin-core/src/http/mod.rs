//! Blocking HTTP implementation of the remote traits against the ArcGIS Server
//! administrator directory and REST services directory.
//!
//! Every request carries `f=json` and, once signed in, the session `token`.
//! Error payloads are recognised even when the server answers `200 OK`.

mod admin;
mod catalog;

pub use admin::AdminClient;
pub use catalog::{CatalogClient, GpJob, GpTask};

use reqwest::blocking::{multipart::Form, Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::config::ConnectionConfig;
use crate::error::{AdminError, Result};
use crate::remote::Connector;
use crate::urls::{parse_dir_url, with_segments};

/// One directory root (admin or REST) together with the session token.
#[derive(Debug, Clone)]
pub struct Endpoint {
    client: Client,
    root: Url,
    token: Option<String>,
}

impl Endpoint {
    pub fn new(client: Client, root: Url, token: Option<String>) -> Self {
        Self {
            client,
            root,
            token,
        }
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    pub fn resolve(&self, segments: &[&str]) -> Url {
        with_segments(&self.root, segments)
    }

    pub fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.get_url(&self.resolve(segments))
    }

    pub fn get_url<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url.clone())
            .query(&self.params(&[]))
            .send()?;
        read_payload(response)
    }

    pub fn post<T: DeserializeOwned>(&self, segments: &[&str], form: &[(&str, &str)]) -> Result<T> {
        self.post_url(&self.resolve(segments), form)
    }

    pub fn post_url<T: DeserializeOwned>(&self, url: &Url, form: &[(&str, &str)]) -> Result<T> {
        tracing::debug!(%url, "POST");
        let response = self
            .client
            .post(url.clone())
            .form(&self.params(form))
            .send()?;
        read_payload(response)
    }

    pub fn post_multipart<T: DeserializeOwned>(&self, segments: &[&str], form: Form) -> Result<T> {
        let url = self.resolve(segments);
        tracing::debug!(%url, "POST multipart");
        let mut form = form.text("f", "json");
        if let Some(token) = &self.token {
            form = form.text("token", token.clone());
        }
        let response = self.client.post(url).multipart(form).send()?;
        read_payload(response)
    }

    fn params<'a>(&'a self, extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
        let mut params = Vec::with_capacity(extra.len() + 2);
        params.extend_from_slice(extra);
        params.push(("f", "json"));
        if let Some(token) = &self.token {
            params.push(("token", token.as_str()));
        }
        params
    }
}

// ---------------------------------------------------------------------------
// Payload handling
// ---------------------------------------------------------------------------

fn read_payload<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text()?;
    match serde_json::from_str::<Value>(&body) {
        Ok(value) => {
            check_payload(&value)?;
            if !status.is_success() {
                return Err(status_error(status));
            }
            Ok(serde_json::from_value(value)?)
        }
        Err(_) if !status.is_success() => Err(status_error(status)),
        Err(err) => Err(err.into()),
    }
}

fn status_error(status: StatusCode) -> AdminError {
    AdminError::remote(
        Some(i64::from(status.as_u16())),
        status.canonical_reason().unwrap_or("request failed"),
    )
}

/// Turn either of the server's error payload shapes into `AdminError::Remote`.
///
/// The admin directory answers `{"status":"error","messages":[..],"code":n}`;
/// the REST directory answers `{"error":{"code":n,"message":..,"details":[..]}}`.
pub fn check_payload(value: &Value) -> Result<()> {
    if let Some(error) = value.get("error") {
        let code = error.get("code").and_then(Value::as_i64);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request failed");
        let details = strings(error.get("details"));
        let message = if details.is_empty() {
            message.to_string()
        } else {
            format!("{message}: {}", details.join(" "))
        };
        return Err(AdminError::remote(code, message));
    }
    if value.get("status").and_then(Value::as_str) == Some("error") {
        let code = value.get("code").and_then(Value::as_i64);
        let messages = strings(value.get("messages"));
        let message = if messages.is_empty() {
            "request failed".to_string()
        } else {
            messages.join(" ")
        };
        return Err(AdminError::remote(code, message));
    }
    Ok(())
}

fn strings(value: Option<&Value>) -> Vec<&str> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Sign-in
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// Credentials to sign in with. Neither is fine; only one is a mistake.
pub fn sign_in_credentials(config: &ConnectionConfig) -> Result<Option<(&str, &str)>> {
    match (&config.username, &config.password) {
        (None, None) => Ok(None),
        (Some(_), Some(_)) => Ok(config.credentials()),
        _ => Err(AdminError::validation(
            "both a username and a password are required to sign in",
        )),
    }
}

pub fn generate_token(
    client: &Client,
    admin_root: &Url,
    username: &str,
    password: &str,
) -> Result<String> {
    let url = with_segments(admin_root, &["generateToken"]);
    tracing::debug!(%url, username, "requesting token");
    let response = client
        .post(url)
        .form(&[
            ("username", username),
            ("password", password),
            ("client", "requestip"),
            ("f", "json"),
        ])
        .send()?;
    let token: TokenResponse = read_payload(response)?;
    Ok(token.token)
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

/// Opens real connections to a site. Each connection signs in separately.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl HttpConnector {
    fn open(&self, root: Url, config: &ConnectionConfig) -> Result<Endpoint> {
        let client = Client::builder().timeout(config.http_timeout).build()?;
        let token = match sign_in_credentials(config)? {
            Some((username, password)) => {
                let admin_root = parse_dir_url(&config.admin_url)?;
                Some(generate_token(&client, &admin_root, username, password)?)
            }
            None => None,
        };
        Ok(Endpoint::new(client, root, token))
    }
}

impl Connector for HttpConnector {
    type Site = AdminClient;
    type Catalog = CatalogClient;

    fn connect_site(&self, config: &ConnectionConfig) -> Result<AdminClient> {
        let root = parse_dir_url(&config.admin_url)?;
        AdminClient::connect(self.open(root, config)?)
    }

    fn connect_catalog(&self, rest_url: &Url, config: &ConnectionConfig) -> Result<CatalogClient> {
        CatalogClient::connect(self.open(rest_url.clone(), config)?)
    }
}
