//! The uploader: one record in, one HTTP call out, one outcome back.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{Method, UploaderConfig};
use crate::error::{Error, Result};
use crate::record::Record;
use crate::request::UploadRequest;
use crate::response::check_response;

const USER_AGENT: &str = concat!("meteotemplate/", env!("CARGO_PKG_VERSION"));

/// Why a record was not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// `skip_upload` is set.
    Disabled,
    /// Record is older than the configured `stale_secs`.
    Stale { age_secs: i64 },
    /// No mapped observation present; the server needs at least one.
    NoObservations,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Disabled => write!(f, "upload disabled"),
            SkipReason::Stale { age_secs } => write!(f, "record is stale ({age_secs}s old)"),
            SkipReason::NoObservations => write!(f, "no observations to upload"),
        }
    }
}

/// Result of a single upload.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success,
    Skipped(SkipReason),
    Failure(Error),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }
}

/// Capability of forwarding one record somewhere.
///
/// Implementations make at most one attempt and never panic or propagate
/// failures; everything is reported through the returned [`Outcome`].
#[async_trait]
pub trait Upload: Send + Sync {
    async fn upload(&self, record: &Record) -> Outcome;
}

/// Uploads records to a Meteotemplate server.
#[derive(Debug, Clone)]
pub struct Uploader {
    config: Arc<UploaderConfig>,
    client: reqwest::Client,
}

impl Uploader {
    pub fn new(config: UploaderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        log::info!("Data will be uploaded to {}", config.server_url);

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    pub fn config(&self) -> &UploaderConfig {
        &self.config
    }

    /// Send a prepared request and check the server's answer.
    pub async fn send(&self, request: &UploadRequest) -> Result<()> {
        log::debug!("url: {}", request.redacted_url());

        let builder = match request.method {
            Method::Get => self.client.get(request.url()),
            Method::Post => self
                .client
                .post(request.endpoint.clone())
                .form(request.params()),
        };

        let timeout = self.config.timeout;
        let response = builder
            .send()
            .await
            .map_err(|e| Error::from_transport(e, timeout))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::from_transport(e, timeout))?;

        check_response(status, &body)
    }

    fn skip_reason(&self, record: &Record, request: &UploadRequest) -> Option<SkipReason> {
        if let Some(stale) = self.config.stale {
            let age_secs = chrono::Utc::now().timestamp() - record.date_time;
            let limit = i64::try_from(stale.as_secs()).unwrap_or(i64::MAX);
            if age_secs > limit {
                return Some(SkipReason::Stale { age_secs });
            }
        }
        if request.observation_count() == 0 {
            return Some(SkipReason::NoObservations);
        }
        if self.config.skip_upload {
            log::debug!("skip_upload set, not sending {}", request.redacted_url());
            return Some(SkipReason::Disabled);
        }
        None
    }

    /// Whether `outcome` gets a log line. Skips are always reported.
    fn should_log(&self, outcome: &Outcome) -> bool {
        match outcome {
            Outcome::Success => self.config.log_success,
            Outcome::Skipped(_) => true,
            Outcome::Failure(_) => self.config.log_failure,
        }
    }

    fn report(&self, record: &Record, outcome: &Outcome) {
        if !self.should_log(outcome) {
            return;
        }
        let when = format_timestamp(record.date_time);
        match outcome {
            Outcome::Success => log::info!("Published record {when} to Meteotemplate"),
            Outcome::Skipped(reason) => log::info!("Skipped record {when}: {reason}"),
            Outcome::Failure(err) => log::error!("Failed to publish record {when}: {err}"),
        }
    }
}

#[async_trait]
impl Upload for Uploader {
    async fn upload(&self, record: &Record) -> Outcome {
        let request = UploadRequest::build(record, &self.config);

        let outcome = match self.skip_reason(record, &request) {
            Some(reason) => Outcome::Skipped(reason),
            None => match self.send(&request).await {
                Ok(()) => Outcome::Success,
                Err(err) => Outcome::Failure(err),
            },
        };

        self.report(record, &outcome);
        outcome
    }
}

fn format_timestamp(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}
