//! Telemetry and catalog fixtures

use std::sync::Arc;

use serde_json::{json, Value};
use tss_procedures::{ProcedureCatalog, ProcedureEngine};

/// EVA document shaped like the source's
pub fn eva_document() -> Value {
    json!({
        "status": { "started": true },
        "telemetry": {
            "eva1": { "heart_rate": 88.0, "oxy_pri_storage": 97.2, "suit_pressure_total": 4.1 },
            "eva2": { "heart_rate": 91.5, "oxy_pri_storage": 95.0, "suit_pressure_total": 4.0 }
        },
        "dcu": {
            "eva1": { "batt": true, "oxy": true, "comm": true, "fan": true, "pump": false, "co2": true },
            "eva2": { "batt": false, "oxy": true, "comm": true, "fan": true, "pump": true, "co2": false }
        },
        "error": { "fan_error": false, "oxy_error": false, "pump_error": false },
        "imu": {
            "eva1": { "posx": 298355.0, "posy": 3272383.0, "heading": 12.0 },
            "eva2": { "posx": 298350.0, "posy": 3272380.0, "heading": 190.0 }
        },
        "uia": {
            "eva1_power": true, "eva1_oxy": true, "eva1_water_supply": false, "eva1_water_waste": false,
            "eva2_power": false, "eva2_oxy": false, "eva2_water_supply": true, "eva2_water_waste": false,
            "oxy_vent": false, "depress": true
        }
    })
}

/// LTV document shaped like the source's
pub fn ltv_document() -> Value {
    json!({
        "location": { "x": 12.5, "y": -3.25, "speed": 0.0 },
        "signal": { "strength": 4, "ping_requested": false },
        "errors": {
            "recovery_mode": false,
            "power_distribution": true,
            "electronic_heater": false,
            "nav_system": false,
            "fuse": false,
            "comms": false,
            "dust_sensor": true
        }
    })
}

/// Two procedures: one satisfied by the fixtures, one not
pub fn catalog_document() -> Value {
    json!({
        "ltv": {
            "nav_check": {
                "title": "Navigation check",
                "steps": [
                    {
                        "id": "stopped",
                        "instruction": "Stop the rover",
                        "criticality": "required",
                        "completion_criteria": [
                            { "path": "ltv.location.speed", "op": "lte", "value": 0.1 }
                        ]
                    },
                    {
                        "id": "nav_ok",
                        "instruction": "Confirm navigation is healthy",
                        "completion_criteria": [
                            { "path": "ltv.errors.nav_system", "value": false },
                            { "path": "ltv.signal.strength", "op": "gte", "value": 3 }
                        ]
                    }
                ]
            },
            "power_reset": {
                "steps": [
                    {
                        "id": "uia_power",
                        "instruction": "Power UIA for crew member one",
                        "completion_criteria": [
                            { "path": "eva.uia.eva1_power", "value": true }
                        ]
                    },
                    {
                        "id": "fault_clear",
                        "instruction": "Power distribution fault clear",
                        "criticality": "required",
                        "completion_criteria": [
                            { "path": "ltv.errors.power_distribution", "value": false }
                        ]
                    }
                ]
            }
        }
    })
}

pub fn engine() -> Arc<ProcedureEngine> {
    let catalog = ProcedureCatalog::from_value(catalog_document())
        .unwrap_or_else(|e| panic!("fixture catalog is invalid: {}", e));
    Arc::new(ProcedureEngine::new(catalog))
}
