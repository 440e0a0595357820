//! Observation records handed over by the host.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::units::UnitSystem;

/// One flat observation record.
///
/// Every record carries a timestamp. Individual observations are optional:
/// stations report different sensors, and a sensor may have no reading.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WireRecord")]
pub struct Record {
    /// Seconds since the Unix epoch.
    pub date_time: i64,
    pub unit_system: UnitSystem,
    values: BTreeMap<String, Option<f64>>,
}

impl Record {
    pub fn new(date_time: i64, unit_system: UnitSystem) -> Self {
        Self {
            date_time,
            unit_system,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style setter for a present reading.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set(name, Some(value));
        self
    }

    /// Set an observation; `None` records a sensor without a reading.
    pub fn set(&mut self, name: impl Into<String>, value: Option<f64>) {
        self.values.insert(name.into(), value);
    }

    /// Value of an observation, `None` if absent or null.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// JSON form of a record: `{"dateTime": .., "usUnits": .., "outTemp": .., ...}`.
#[derive(Debug, Deserialize)]
struct WireRecord {
    #[serde(rename = "dateTime")]
    date_time: i64,
    #[serde(rename = "usUnits", default)]
    unit_system: UnitSystem,
    #[serde(flatten)]
    values: BTreeMap<String, Value>,
}

impl From<WireRecord> for Record {
    fn from(wire: WireRecord) -> Self {
        // Non-numeric entries carry nothing uploadable.
        let values = wire
            .values
            .into_iter()
            .map(|(name, value)| (name, value.as_f64()))
            .collect();
        Self {
            date_time: wire.date_time,
            unit_system: wire.unit_system,
            values,
        }
    }
}
