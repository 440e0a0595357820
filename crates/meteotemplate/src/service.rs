//! Background upload worker fed by host events.
//!
//! The host hands every event to [`UploadService::submit`], which never
//! blocks: records selected by the binding are queued and a single worker
//! task uploads them one at a time. A slow or unreachable server therefore
//! only delays uploads, never data acquisition.

use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::binding::{Binding, HostEvent};
use crate::config::UploaderConfig;
use crate::error::Result;
use crate::record::Record;
use crate::uploader::{Upload, Uploader};

pub struct UploadService {
    binding: Binding,
    tx: mpsc::Sender<Record>,
    worker: JoinHandle<()>,
}

impl UploadService {
    /// Start a worker driving `uploader` for events matching `binding`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(binding: Binding, uploader: Arc<dyn Upload>, max_backlog: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<Record>(max_backlog.max(1));

        let worker = tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                // Outcome is already logged by the uploader.
                let _ = uploader.upload(&record).await;
            }
            log::debug!("Upload worker stopped");
        });

        log::info!("Uploading on {binding} events");
        Self {
            binding,
            tx,
            worker,
        }
    }

    /// Build the Meteotemplate uploader from `config` and start its worker.
    pub fn from_config(config: UploaderConfig) -> Result<Self> {
        let binding = config.binding;
        let max_backlog = config.max_backlog;
        let uploader = Uploader::new(config)?;
        Ok(Self::start(binding, Arc::new(uploader), max_backlog))
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    /// Queue the event's record if the binding selects it.
    ///
    /// Returns `true` when a record was queued. A full queue drops the
    /// record with a warning.
    pub fn submit(&self, event: HostEvent) -> bool {
        let Some(record) = self.binding.take(event) else {
            return false;
        };
        match self.tx.try_send(record) {
            Ok(()) => true,
            Err(TrySendError::Full(record)) => {
                log::warn!(
                    "Upload backlog full, dropping record {}",
                    record.date_time
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                log::warn!("Upload worker is gone, dropping record");
                false
            }
        }
    }

    /// Stop accepting events, finish queued uploads and join the worker.
    pub async fn shutdown(self) {
        drop(self.tx);
        if let Err(e) = self.worker.await {
            log::error!("Upload worker failed: {e}");
        }
    }
}
