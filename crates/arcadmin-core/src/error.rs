use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("{0}")]
    Validation(String),

    #[error("cluster not found: {0}")]
    ClusterNotFound(String),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("{}", remote_message(.code, .message))]
    Remote { code: Option<i64>, message: String },

    #[error("publish job {job_id} finished as {status}: {detail}")]
    JobFailed {
        job_id: String,
        status: String,
        detail: String,
    },

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AdminError {
    pub fn validation(message: impl Into<String>) -> Self {
        AdminError::Validation(message.into())
    }

    pub fn remote(code: Option<i64>, message: impl Into<String>) -> Self {
        AdminError::Remote {
            code,
            message: message.into(),
        }
    }
}

fn remote_message(code: &Option<i64>, message: &str) -> String {
    match code {
        Some(code) => format!("{message} (code {code})"),
        None => message.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
