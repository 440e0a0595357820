//! Meteotemplate uploader
//!
//! Forwards weather station observation records to a Meteotemplate server
//! (`plugins/api/update.php`). Each triggering host event yields at most one
//! HTTP request carrying the update password, the record timestamp and one
//! parameter per available observation.
//!
//! # Architecture
//!
//! ```text
//! host events ──► UploadService ──► Uploader ──► UploadRequest ──► HTTP
//!                   │ binding          │ skip checks             │
//!                   │ (archive|loop)   └─ Outcome ◄── response ──┘
//!                   └─ bounded queue, one worker task
//! ```
//!
//! # Modules
//!
//! - [`config`] — YAML configuration, resolved and validated at startup.
//! - [`error`] — Unified error type.
//! - [`record`] — Observation records and their JSON form.
//! - [`units`] — Unit systems, conversion and value formatting.
//! - [`fields`] — Observation to request-parameter table.
//! - [`request`] — Deterministic request construction.
//! - [`response`] — Success/failure classification of server answers.
//! - [`uploader`] — The `Upload` capability and the HTTP uploader.
//! - [`binding`] — Archive vs. loop event selection.
//! - [`service`] — Non-blocking worker the host feeds with events.

pub mod binding;
pub mod config;
pub mod error;
pub mod fields;
pub mod record;
pub mod request;
pub mod response;
pub mod service;
pub mod units;
pub mod uploader;

pub use binding::{Binding, HostEvent};
pub use config::{Method, SiteConfig, UploaderConfig};
pub use error::{Error, Result};
pub use record::Record;
pub use request::UploadRequest;
pub use service::UploadService;
pub use units::{UnitSystem, Units};
pub use uploader::{Outcome, SkipReason, Upload, Uploader};
