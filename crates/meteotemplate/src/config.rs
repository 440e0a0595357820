//! Uploader configuration.
//!
//! [`SiteConfig`] is the YAML section as written by the user. It is resolved
//! once at startup into an immutable [`UploaderConfig`]; every missing or
//! malformed option is reported there, never at the first upload.

use reqwest::Url;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::binding::Binding;
use crate::error::{Error, Result};
use crate::fields::FieldMap;
use crate::request::PASSWORD_PARAM;
use crate::units::{Units, UNIT_PARAMS};

/// Ingest script location relative to the Meteotemplate root.
const DEFAULT_API_PATH: &str = "plugins/api/update.php";

/// HTTP method used for uploads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Parameters in the query string.
    #[default]
    Get,
    /// Parameters as a form-encoded body.
    Post,
}

/// Configuration section as found in the YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Name or address of the server hosting Meteotemplate.
    /// Used to derive `server_url` when that is not given.
    #[serde(default)]
    pub host: Option<String>,

    /// Full URL of the ingest script.
    #[serde(default)]
    pub server_url: Option<String>,

    /// The "update password" from the Meteotemplate settings.
    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub binding: Binding,

    #[serde(default)]
    pub method: Method,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub units: Units,

    /// Parameter remapping: `param -> observation`, `~` drops a parameter.
    #[serde(default)]
    pub fields: BTreeMap<String, Option<String>>,

    #[serde(default = "default_timestamp_param")]
    pub timestamp_param: String,

    /// Build and log requests without sending them.
    #[serde(default)]
    pub skip_upload: bool,

    /// Records older than this many seconds are not uploaded.
    #[serde(default)]
    pub stale_secs: Option<u64>,

    #[serde(default = "default_true")]
    pub log_success: bool,

    #[serde(default = "default_true")]
    pub log_failure: bool,

    /// Records queued for the upload worker before new ones are dropped.
    #[serde(default = "default_max_backlog")]
    pub max_backlog: usize,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_timestamp_param() -> String {
    "DT".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_backlog() -> usize {
    64
}

impl SiteConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Parse(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Validate options and apply derived defaults.
    pub fn resolve(self) -> Result<UploaderConfig> {
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::Config("Missing option password".into()))?;

        let server_url = match (self.server_url, self.host) {
            (Some(url), _) => parse_server_url(&url)?,
            (None, Some(host)) => {
                let host = host.trim_end_matches('/');
                parse_server_url(&format!("http://{host}/{DEFAULT_API_PATH}"))?
            }
            (None, None) => {
                return Err(Error::Config(
                    "Missing option server_url (or host)".into(),
                ))
            }
        };

        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be positive".into()));
        }
        if self.max_backlog == 0 {
            return Err(Error::Config("max_backlog must be positive".into()));
        }
        if self.timestamp_param.is_empty() {
            return Err(Error::Config("timestamp_param must not be empty".into()));
        }

        let fields = FieldMap::meteotemplate().with_overrides(&self.fields);
        if fields.is_empty() {
            return Err(Error::Config("No fields left to upload".into()));
        }
        for field in fields.iter() {
            let param = field.param.as_str();
            if param == PASSWORD_PARAM
                || param == self.timestamp_param
                || UNIT_PARAMS.contains(&param)
            {
                return Err(Error::Config(format!("Field parameter '{param}' is reserved")));
            }
        }

        Ok(UploaderConfig {
            server_url,
            password,
            binding: self.binding,
            method: self.method,
            timeout: Duration::from_secs(self.timeout_secs),
            units: self.units,
            fields,
            timestamp_param: self.timestamp_param,
            skip_upload: self.skip_upload,
            stale: self.stale_secs.map(Duration::from_secs),
            log_success: self.log_success,
            log_failure: self.log_failure,
            max_backlog: self.max_backlog,
        })
    }
}

fn parse_server_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| Error::Config(format!("Invalid server_url '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(Error::Config(format!(
            "Invalid server_url '{raw}': expected an http(s) URL"
        )));
    }
    Ok(url)
}

/// Validated, immutable uploader configuration.
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    pub server_url: Url,
    pub password: String,
    pub binding: Binding,
    pub method: Method,
    pub timeout: Duration,
    pub units: Units,
    pub fields: FieldMap,
    pub timestamp_param: String,
    pub skip_upload: bool,
    pub stale: Option<Duration>,
    pub log_success: bool,
    pub log_failure: bool,
    pub max_backlog: usize,
}

impl UploaderConfig {
    /// Configuration with defaults for everything but the endpoint and password.
    pub fn new(server_url: &str, password: &str) -> Result<Self> {
        SiteConfig {
            host: None,
            server_url: Some(server_url.to_string()),
            password: Some(password.to_string()),
            binding: Binding::default(),
            method: Method::default(),
            timeout_secs: default_timeout_secs(),
            units: Units::default(),
            fields: BTreeMap::new(),
            timestamp_param: default_timestamp_param(),
            skip_upload: false,
            stale_secs: None,
            log_success: true,
            log_failure: true,
            max_backlog: default_max_backlog(),
        }
        .resolve()
    }
}
