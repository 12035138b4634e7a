use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{ClientError, ClientResult};

/// Client configuration, usually parsed from TOML.
///
/// ```toml
/// endpoint = "http://localhost:9020"
/// project = "demo"
/// instance = "main"
/// database = "accounts"
///
/// [session_labels]
/// app = "billing"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base address of the REST API, without the `/v1` prefix.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    pub project: String,
    pub instance: String,
    pub database: String,

    /// Per-request timeout. The only cancellation an in-flight call has.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// Labels attached to every session created by the client.
    #[serde(default)]
    pub session_labels: HashMap<String, String>,
}

fn default_endpoint() -> String {
    "http://localhost:9020".into()
}
fn default_request_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    pub fn new(project: impl Into<String>, instance: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            endpoint: default_endpoint(),
            project: project.into(),
            instance: instance.into(),
            database: database.into(),
            request_timeout_secs: default_request_timeout_secs(),
            accept_invalid_certs: false,
            session_labels: HashMap::new(),
        }
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn session_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.session_labels.insert(key.into(), value.into());
        self
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ClientError::Config(format!("{path}: {e}")))?;
        Self::parse(&content).map_err(|e| e.with_context(path))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> ClientResult<Self> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ClientError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ClientResult<()> {
        for (name, value) in [
            ("endpoint", &self.endpoint),
            ("project", &self.project),
            ("instance", &self.instance),
            ("database", &self.database),
        ] {
            if value.trim().is_empty() {
                return Err(ClientError::Config(format!("'{name}' must not be empty")));
            }
        }
        Ok(())
    }

    /// `projects/{project}/instances/{instance}/databases/{database}`.
    pub fn database_path(&self) -> String {
        format!(
            "projects/{}/instances/{}/databases/{}",
            self.project, self.instance, self.database
        )
    }
}
