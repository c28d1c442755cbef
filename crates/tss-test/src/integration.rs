//! End-to-end bridge tests
//!
//! A real `Runtime` talks UDP to a `SimulatedSource`; assertions go through
//! the mission service or over HTTP.

use std::net::SocketAddr;
use std::time::Duration;

use tss_core::TssResult;
use tss_runtime::{PollConfig, Runtime, RuntimeConfig, TelemetryMode};
use tss_transport::ClientConfig;

use crate::{engine, SimulatedSource};

/// Fast timings suitable for loopback tests
pub fn test_config(source_addr: SocketAddr, mode: TelemetryMode) -> RuntimeConfig {
    RuntimeConfig {
        source_addr,
        bind_addr: ([127, 0, 0, 1], 0).into(),
        client: ClientConfig::with_timeout(Duration::from_millis(50)).retries(2),
        poll: PollConfig {
            interval: Duration::from_millis(20),
        },
        mode,
        ..RuntimeConfig::default()
    }
}

/// Start a bridge against `source` with the fixture catalog
pub async fn start_bridge(source: &SimulatedSource, mode: TelemetryMode) -> TssResult<Runtime> {
    Runtime::start_with_engine(test_config(source.addr(), mode), engine()).await
}

/// Poll `check` until it holds or `limit` elapses
pub async fn wait_until<F>(limit: Duration, mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    use serde_json::{json, Value};
    use tokio::net::TcpListener;
    use tss_core::{Command, TssError};
    use tss_procedures::{Criticality, ProcedureEngine};
    use tss_runtime::MissionService;
    use tss_transport::UdpLink;

    use crate::{eva_document, ltv_document, Behavior};

    async fn online_bridge() -> (SimulatedSource, Runtime) {
        let sim = SimulatedSource::start(eva_document(), ltv_document())
            .await
            .unwrap();
        let bridge = start_bridge(&sim, TelemetryMode::Cached).await.unwrap();
        let service = bridge.service();
        assert!(
            wait_for_online(&service, true).await,
            "bridge should come online"
        );
        (sim, bridge)
    }

    async fn wait_for_online(service: &MissionService<UdpLink>, online: bool) -> bool {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while tokio::time::Instant::now() < deadline {
            if service.health().await.source_online == online {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    // ========================================================================
    // CACHED MODE
    // ========================================================================

    #[tokio::test]
    async fn test_cached_bridge_serves_live_telemetry() {
        let (_sim, bridge) = online_bridge().await;
        let service = bridge.service();

        let health = service.health().await;
        assert!(health.ok);
        assert!(health.last_updated > 0.0);

        let view = service.eva_view("eva2").await.unwrap();
        assert_eq!(view.telemetry["heart_rate"], json!(91.5));

        let uia = service.eva_uia("EVA1").await.unwrap();
        assert!(uia.uia.power && uia.uia.oxy);
        assert!(uia.shared.depress && !uia.shared.oxy_vent);

        let egress = service.egress_readiness("eva1").await.unwrap();
        let passes: Vec<bool> = egress.checks.iter().map(|c| c.pass).collect();
        assert_eq!(passes, [true, true, false]);

        let triage = service.ltv_triage().await;
        let active: Vec<_> = triage
            .active_errors
            .iter()
            .filter(|e| e.active)
            .map(|e| e.key)
            .collect();
        assert_eq!(active, ["power_distribution", "dust_sensor"]);

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_each_cycle_requests_eva_before_ltv() {
        let (sim, bridge) = online_bridge().await;
        let stats = bridge.shutdown().await;
        assert!(stats.cycles >= 1);

        let commands: Vec<u32> = sim.requests().iter().map(|r| r.command).collect();
        assert!(commands.len() >= 2);
        for pair in commands.chunks_exact(2) {
            assert_eq!(pair, [Command::GetEva.to_u32(), Command::GetLtv.to_u32()]);
        }
    }

    #[tokio::test]
    async fn test_silent_ltv_keeps_stale_data_and_goes_offline() {
        let (sim, bridge) = online_bridge().await;
        let service = bridge.service();
        let before = service.health().await;

        sim.set_document(Command::GetEva, json!({"status": {"started": false}}));
        sim.set_behavior(Command::GetLtv, Behavior::Silent);
        assert!(wait_for_online(&service, false).await);

        let health = service.health().await;
        assert!(!health.source_online);
        assert!(health.last_updated >= before.last_updated);

        // EVA keeps refreshing while LTV is retained
        let mut refreshed = false;
        for _ in 0..100 {
            if service.eva_status().await == json!({"started": false}) {
                refreshed = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(refreshed);
        assert!(!service.health().await.source_online);
        assert_eq!(service.ltv_location().await["x"], json!(12.5));

        // Timestamp no longer advances while offline
        let frozen = service.health().await.last_updated;
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(service.health().await.last_updated, frozen);

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_source_recovers_after_garbage() {
        let sim = SimulatedSource::start(eva_document(), ltv_document())
            .await
            .unwrap();
        sim.set_all(Behavior::Garbage);
        let bridge = start_bridge(&sim, TelemetryMode::Cached).await.unwrap();
        let service = bridge.service();

        assert!(wait_until(Duration::from_secs(2), || sim.requests().len() >= 4).await);
        assert!(!service.health().await.source_online);
        assert_eq!(service.eva_bundle().await.status, json!({}));

        sim.set_all(Behavior::Answer);
        assert!(wait_for_online(&service, true).await);
        assert_eq!(service.eva_status().await, json!({"started": true}));

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_procedure_status_follows_telemetry() {
        let (sim, bridge) = online_bridge().await;
        let service = bridge.service();

        let nav = service.ltv_procedure_status("nav_check").await.unwrap();
        assert!(nav.complete);
        assert_eq!(nav.completed_steps, 2);

        let power = service.ltv_procedure_status("power_reset").await.unwrap();
        assert!(!power.complete);
        let next = power.next_step.unwrap();
        assert_eq!(next.id, "fault_clear");
        assert_eq!(next.criticality, Criticality::Required);

        let mut ltv = ltv_document();
        ltv["errors"]["power_distribution"] = json!(false);
        sim.set_document(Command::GetLtv, ltv);

        let mut complete = false;
        for _ in 0..100 {
            if service.ltv_procedure_status("power_reset").await.unwrap().complete {
                complete = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(complete, "procedure should complete once the fault clears");

        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_closes_client() {
        let (_sim, bridge) = online_bridge().await;
        let client = bridge.client();
        bridge.shutdown().await;
        assert!(client.is_closed().await);
        assert!(client.request(Command::GetEva).await.is_none());
    }

    // ========================================================================
    // STARTUP
    // ========================================================================

    fn shipped_catalog() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../procedures/ltv_procedures.json")
    }

    #[tokio::test]
    async fn test_start_fails_on_missing_catalog() {
        let mut config = test_config(([127, 0, 0, 1], 9).into(), TelemetryMode::Cached);
        config.catalog_path = PathBuf::from("/nonexistent/ltv_procedures.json");

        let result = Runtime::start(config).await;
        assert!(matches!(result, Err(TssError::CatalogLoad(_))));
    }

    #[tokio::test]
    async fn test_start_fails_on_malformed_catalog() {
        let path = std::env::temp_dir().join(format!(
            "tss-bridge-bad-catalog-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, b"[\"not\", \"an object\"]").unwrap();

        let mut config = test_config(([127, 0, 0, 1], 9).into(), TelemetryMode::Cached);
        config.catalog_path = path.clone();
        let result = Runtime::start(config).await;
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(TssError::CatalogLoad(_))));
    }

    #[tokio::test]
    async fn test_shipped_catalog_loads() {
        let engine = ProcedureEngine::load(shipped_catalog()).unwrap();
        assert_eq!(engine.catalog().len(), 2);

        let sim = SimulatedSource::start(eva_document(), ltv_document())
            .await
            .unwrap();
        let mut config = test_config(sim.addr(), TelemetryMode::OnDemand);
        config.catalog_path = shipped_catalog();
        let bridge = Runtime::start(config).await.unwrap();

        let ids: Vec<_> = bridge
            .service()
            .ltv_procedures()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["nav_system_recovery", "power_distribution_reset"]);

        let status = bridge
            .service()
            .ltv_procedure_status("nav_system_recovery")
            .await
            .unwrap();
        let expected = engine
            .get("ltv", "nav_system_recovery")
            .unwrap()
            .steps
            .len();
        assert_eq!(status.total_steps, expected);

        bridge.shutdown().await;
    }

    // ========================================================================
    // ON-DEMAND MODE
    // ========================================================================

    #[tokio::test]
    async fn test_on_demand_reads_query_the_source() {
        let sim = SimulatedSource::start(eva_document(), ltv_document())
            .await
            .unwrap();
        let bridge = start_bridge(&sim, TelemetryMode::OnDemand).await.unwrap();
        let service = bridge.service();

        // No background polling
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(sim.requests().is_empty());

        let ltv = service.ltv_bundle().await;
        assert_eq!(ltv.signal["strength"], json!(4));
        assert_eq!(sim.request_count(Command::GetLtv), 1);
        assert_eq!(sim.request_count(Command::GetEva), 0);

        // Nothing is retained once the source disappears
        sim.set_all(Behavior::Silent);
        assert_eq!(service.ltv_bundle().await.signal, json!({}));
        assert!(!service.health().await.source_online);

        bridge.shutdown().await;
    }

    // ========================================================================
    // HTTP SURFACE
    // ========================================================================

    async fn serve(bridge: &Runtime) -> (String, tokio::sync::oneshot::Sender<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = bridge.router();
        let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = stopped.await;
                })
                .await
                .unwrap();
        });
        (format!("http://{}/api/v1", addr), stop)
    }

    async fn get(url: &str) -> (u16, Value) {
        let response = reqwest::get(url).await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn test_http_routes() {
        let (_sim, bridge) = online_bridge().await;
        let (base, stop) = serve(&bridge).await;

        let (status, health) = get(&format!("{}/health", base)).await;
        assert_eq!(status, 200);
        assert_eq!(health["ok"], json!(true));
        assert_eq!(health["source_online"], json!(true));

        let (_, eva) = get(&format!("{}/eva", base)).await;
        assert_eq!(eva["dcu"]["eva1"]["fan"], json!(true));

        let (_, errors) = get(&format!("{}/eva/errors", base)).await;
        assert_eq!(errors["fan_error"], json!(false));

        let (_, uia) = get(&format!("{}/eva/eva2/uia", base)).await;
        assert_eq!(uia["evaId"], json!("eva2"));
        assert_eq!(uia["uia"]["water_supply"], json!(true));

        let (_, triage) = get(&format!("{}/ltv/triage", base)).await;
        assert_eq!(triage["active_errors"][0]["key"], json!("recovery_mode"));

        let (_, list) = get(&format!("{}/procedures/ltv", base)).await;
        assert_eq!(
            list["procedures"][1],
            json!({"id": "power_reset", "title": "power_reset"})
        );

        let (_, proc) = get(&format!("{}/procedures/ltv/nav_check", base)).await;
        assert_eq!(proc["title"], json!("Navigation check"));

        let url = format!("{}/procedures/ltv/nav_check/status", base);
        let (status, report) = get(&url).await;
        assert_eq!(status, 200);
        assert_eq!(report["complete"], json!(true));
        assert_eq!(report["next_step"], Value::Null);

        let _ = stop.send(());
        bridge.shutdown().await;
    }

    #[tokio::test]
    async fn test_http_rejections() {
        let (_sim, bridge) = online_bridge().await;
        let (base, stop) = serve(&bridge).await;

        let (status, body) = get(&format!("{}/eva/eva9/uia", base)).await;
        assert_eq!(status, 404);
        assert_eq!(body["detail"], json!("evaId must be 'eva1' or 'eva2'"));

        let url = format!("{}/procedures/ltv/unknown/status", base);
        let (status, body) = get(&url).await;
        assert_eq!(status, 404);
        assert_eq!(body["detail"], json!("Unknown procedureId"));

        let (status, _) = get(&format!("{}/procedures/ltv/unknown", base)).await;
        assert_eq!(status, 404);

        let _ = stop.send(());
        bridge.shutdown().await;
    }
}
