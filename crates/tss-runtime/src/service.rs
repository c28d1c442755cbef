//! Mission service - every consumer-facing operation
//!
//! Telemetry unavailability never fails a call: missing groups render as
//! empty mappings and missing flags as `false`. Only bad identifiers and
//! unknown procedures are rejected.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use tss_core::{get_path_in, subtree_or_empty, to_bool, EvaId, TssResult};
use tss_procedures::{
    Procedure, ProcedureEngine, ProcedureStatusReport, ProcedureSummary, LTV_NAMESPACE,
};
use tss_state::TelemetrySnapshot;
use tss_transport::DatagramLink;

use crate::{Domains, TelemetrySource};

/// LTV error keys reported by triage, in display order
pub const TRIAGE_KEYS: [&str; 7] = [
    "recovery_mode",
    "power_distribution",
    "electronic_heater",
    "nav_system",
    "fuse",
    "comms",
    "dust_sensor",
];

/// Egress readiness checks: name and dotted path within the EVA domain
pub const EGRESS_CHECKS: [(&str, &str); 3] = [
    ("mission_started", "status.started"),
    ("uia_depress", "uia.depress"),
    ("uia_oxy_vent", "uia.oxy_vent"),
];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HealthReport {
    pub ok: bool,
    pub source_online: bool,
    /// Seconds since epoch of the last complete cycle, `0.0` if never
    pub last_updated: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EvaBundle {
    pub status: Value,
    pub telemetry: Value,
    pub dcu: Value,
    pub error: Value,
    pub imu: Value,
    pub uia: Value,
}

/// Telemetry groups of one crew member
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EvaView {
    pub telemetry: Value,
    pub dcu: Value,
    pub imu: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UiaSwitches {
    pub power: bool,
    pub oxy: bool,
    pub water_supply: bool,
    pub water_waste: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SharedUiaSwitches {
    pub oxy_vent: bool,
    pub depress: bool,
}

/// UIA panel state for one crew member
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UiaView {
    #[serde(rename = "evaId")]
    pub eva_id: String,
    pub uia: UiaSwitches,
    pub shared: SharedUiaSwitches,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LtvBundle {
    pub location: Value,
    pub signal: Value,
    pub errors: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TriageEntry {
    pub key: &'static str,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TriageReport {
    pub active_errors: Vec<TriageEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReadinessCheck {
    pub name: &'static str,
    pub pass: bool,
    pub path: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EgressReport {
    #[serde(rename = "evaId")]
    pub eva_id: String,
    pub checks: Vec<ReadinessCheck>,
}

impl EgressReport {
    pub fn ready(&self) -> bool {
        self.checks.iter().all(|c| c.pass)
    }
}

/// Consumer operations over a telemetry source and the procedure catalog
pub struct MissionService<L> {
    source: TelemetrySource<L>,
    procedures: Arc<ProcedureEngine>,
}

impl<L: DatagramLink> MissionService<L> {
    pub fn new(source: TelemetrySource<L>, procedures: Arc<ProcedureEngine>) -> Self {
        MissionService { source, procedures }
    }

    async fn read(&self, want: Domains) -> Arc<TelemetrySnapshot> {
        self.source.read(want).await
    }

    pub async fn health(&self) -> HealthReport {
        let snap = self.read(Domains::Both).await;
        HealthReport {
            ok: true,
            source_online: snap.source_online,
            last_updated: snap.last_updated_unix(),
        }
    }

    // EVA

    pub async fn eva_bundle(&self) -> EvaBundle {
        let snap = self.read(Domains::Eva).await;
        let eva = &snap.eva;
        EvaBundle {
            status: subtree_or_empty(eva, "status"),
            telemetry: subtree_or_empty(eva, "telemetry"),
            dcu: subtree_or_empty(eva, "dcu"),
            error: subtree_or_empty(eva, "error"),
            imu: subtree_or_empty(eva, "imu"),
            uia: subtree_or_empty(eva, "uia"),
        }
    }

    pub async fn eva_status(&self) -> Value {
        self.eva_group("status").await
    }

    pub async fn eva_errors(&self) -> Value {
        self.eva_group("error").await
    }

    async fn eva_group(&self, group: &str) -> Value {
        subtree_or_empty(&self.read(Domains::Eva).await.eva, group)
    }

    pub async fn eva_view(&self, eva_id: &str) -> TssResult<EvaView> {
        let id: EvaId = eva_id.parse()?;
        let snap = self.read(Domains::Eva).await;
        Ok(EvaView {
            telemetry: member_group(&snap.eva, "telemetry", id),
            dcu: member_group(&snap.eva, "dcu", id),
            imu: member_group(&snap.eva, "imu", id),
        })
    }

    pub async fn eva_dcu(&self, eva_id: &str) -> TssResult<Value> {
        self.eva_member_group("dcu", eva_id).await
    }

    pub async fn eva_imu(&self, eva_id: &str) -> TssResult<Value> {
        self.eva_member_group("imu", eva_id).await
    }

    async fn eva_member_group(&self, group: &str, eva_id: &str) -> TssResult<Value> {
        let id: EvaId = eva_id.parse()?;
        Ok(member_group(&self.read(Domains::Eva).await.eva, group, id))
    }

    /// Per-member switches are stored flat as `{id}_power`, `{id}_oxy`, ...
    pub async fn eva_uia(&self, eva_id: &str) -> TssResult<UiaView> {
        let id: EvaId = eva_id.parse()?;
        let snap = self.read(Domains::Eva).await;
        let uia = snap.eva.get("uia").and_then(Value::as_object);
        let flag = |key: &str| to_bool(uia.and_then(|m| m.get(key)));
        let member = |name: &str| flag(&format!("{}_{}", id, name));

        Ok(UiaView {
            eva_id: id.to_string(),
            uia: UiaSwitches {
                power: member("power"),
                oxy: member("oxy"),
                water_supply: member("water_supply"),
                water_waste: member("water_waste"),
            },
            shared: SharedUiaSwitches {
                oxy_vent: flag("oxy_vent"),
                depress: flag("depress"),
            },
        })
    }

    /// The checks read shared EVA state; the id is validated and echoed
    pub async fn egress_readiness(&self, eva_id: &str) -> TssResult<EgressReport> {
        let id: EvaId = eva_id.parse()?;
        let snap = self.read(Domains::Eva).await;
        let checks = EGRESS_CHECKS
            .iter()
            .map(|&(name, path)| ReadinessCheck {
                name,
                pass: to_bool(get_path_in(&snap.eva, path)),
                path,
            })
            .collect();

        Ok(EgressReport {
            eva_id: id.to_string(),
            checks,
        })
    }

    // LTV

    pub async fn ltv_bundle(&self) -> LtvBundle {
        let snap = self.read(Domains::Ltv).await;
        LtvBundle {
            location: subtree_or_empty(&snap.ltv, "location"),
            signal: subtree_or_empty(&snap.ltv, "signal"),
            errors: subtree_or_empty(&snap.ltv, "errors"),
        }
    }

    pub async fn ltv_location(&self) -> Value {
        self.ltv_group("location").await
    }

    pub async fn ltv_signal(&self) -> Value {
        self.ltv_group("signal").await
    }

    pub async fn ltv_errors(&self) -> Value {
        self.ltv_group("errors").await
    }

    async fn ltv_group(&self, group: &str) -> Value {
        subtree_or_empty(&self.read(Domains::Ltv).await.ltv, group)
    }

    pub async fn ltv_triage(&self) -> TriageReport {
        let snap = self.read(Domains::Ltv).await;
        let errors = snap.ltv.get("errors").and_then(Value::as_object);
        TriageReport {
            active_errors: TRIAGE_KEYS
                .iter()
                .map(|&key| TriageEntry {
                    key,
                    active: to_bool(errors.and_then(|m| m.get(key))),
                })
                .collect(),
        }
    }

    // Procedures

    pub fn ltv_procedures(&self) -> Vec<ProcedureSummary> {
        self.procedures.list(LTV_NAMESPACE)
    }

    pub fn ltv_procedure(&self, id: &str) -> TssResult<Procedure> {
        self.procedures.get(LTV_NAMESPACE, id).cloned()
    }

    /// Evaluate against `{eva, ltv}`; criteria paths start with either key
    pub async fn ltv_procedure_status(&self, id: &str) -> TssResult<ProcedureStatusReport> {
        // Reject unknown ids before touching the source
        self.procedures.get(LTV_NAMESPACE, id)?;
        let snap = self.read(Domains::Both).await;
        self.procedures.status(LTV_NAMESPACE, id, &snap.merged())
    }
}

fn member_group(eva: &Map<String, Value>, group: &str, id: EvaId) -> Value {
    subtree_or_empty(eva, &format!("{}.{}", group, id))
}
