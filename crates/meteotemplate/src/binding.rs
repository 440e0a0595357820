//! Which host event stream triggers an upload.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::record::Record;

/// Event stream an uploader is bound to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Binding {
    /// One upload per archive interval, with the aggregated record.
    #[default]
    Archive,
    /// One upload per raw sample (LOOP packet).
    Loop,
}

/// An event emitted by the host's acquisition loop.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "record", rename_all = "lowercase")]
pub enum HostEvent {
    Archive(Record),
    Loop(Record),
}

impl HostEvent {
    /// Decode one JSON line of a host event stream.
    ///
    /// Blank lines yield `Ok(None)`. Invalid UTF-8 and malformed JSON are
    /// `Parse` errors that only concern this line.
    pub fn from_line(line: &[u8]) -> Result<Option<Self>> {
        let line = std::str::from_utf8(line)
            .map_err(|e| Error::Parse(format!("Event is not valid UTF-8: {e}")))?;
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(line)
            .map(Some)
            .map_err(|e| Error::Parse(format!("Malformed event: {e}")))
    }
}

impl Binding {
    /// The record to upload for `event`, if this binding listens to it.
    pub fn select<'a>(&self, event: &'a HostEvent) -> Option<&'a Record> {
        match (self, event) {
            (Binding::Archive, HostEvent::Archive(record)) => Some(record),
            (Binding::Loop, HostEvent::Loop(record)) => Some(record),
            _ => None,
        }
    }

    /// Owned variant of [`select`](Self::select).
    pub fn take(&self, event: HostEvent) -> Option<Record> {
        match (self, event) {
            (Binding::Archive, HostEvent::Archive(record)) => Some(record),
            (Binding::Loop, HostEvent::Loop(record)) => Some(record),
            _ => None,
        }
    }
}

impl std::fmt::Display for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Binding::Archive => write!(f, "archive"),
            Binding::Loop => write!(f, "loop"),
        }
    }
}
