//! Telemetry snapshot

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::{Map, Value};

/// A consistent view of the source at one instant
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    /// Suit and crew telemetry
    pub eva: Map<String, Value>,
    /// Vehicle telemetry
    pub ltv: Map<String, Value>,
    /// Both domains were obtained in the most recent cycle
    pub source_online: bool,
    /// Wall-clock time of the last fully successful cycle
    #[serde(skip)]
    pub last_updated: Option<SystemTime>,
}

impl TelemetrySnapshot {
    /// Seconds since epoch of the last successful cycle, `0.0` if never
    pub fn last_updated_unix(&self) -> f64 {
        self.last_updated
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0.0, |d| d.as_secs_f64())
    }

    /// EVA domain as a JSON value
    pub fn eva_value(&self) -> Value {
        Value::Object(self.eva.clone())
    }

    /// LTV domain as a JSON value
    pub fn ltv_value(&self) -> Value {
        Value::Object(self.ltv.clone())
    }

    /// `{"eva": ..., "ltv": ...}`, the root that criteria paths resolve against
    pub fn merged(&self) -> Value {
        let mut root = Map::with_capacity(2);
        root.insert("eva".into(), self.eva_value());
        root.insert("ltv".into(), self.ltv_value());
        Value::Object(root)
    }
}
