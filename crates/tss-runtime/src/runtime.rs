//! Bridge runtime - startup and shutdown of every component

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use tss_core::{TssError, TssResult};
use tss_procedures::ProcedureEngine;
use tss_state::TelemetryCache;
use tss_transport::{ProtocolClient, UdpLink};

use crate::{
    http, MissionService, PollDriver, PollHandle, PollStats, RuntimeConfig, TelemetryMode,
    TelemetrySource,
};

/// A running bridge
pub struct Runtime {
    config: RuntimeConfig,
    client: Arc<ProtocolClient<UdpLink>>,
    service: Arc<MissionService<UdpLink>>,
    poller: Option<PollHandle>,
}

impl Runtime {
    /// Load the catalog, connect to the source and, in cached mode, start
    /// polling. A bad catalog aborts startup.
    pub async fn start(config: RuntimeConfig) -> TssResult<Self> {
        config.validate()?;
        let procedures = Arc::new(ProcedureEngine::load(&config.catalog_path)?);
        Self::start_with_engine(config, procedures).await
    }

    /// Same as [`Runtime::start`] with an already-loaded catalog
    pub async fn start_with_engine(
        config: RuntimeConfig,
        procedures: Arc<ProcedureEngine>,
    ) -> TssResult<Self> {
        config.validate()?;
        let client =
            ProtocolClient::connect(config.source_addr, config.client.clone()).await?;
        let client = Arc::new(client);

        let (source, poller) = match config.mode {
            TelemetryMode::Cached => {
                let cache = Arc::new(TelemetryCache::new());
                let driver =
                    PollDriver::new(Arc::clone(&client), Arc::clone(&cache), config.poll.clone());
                (TelemetrySource::Cached(cache), Some(driver.spawn()))
            }
            TelemetryMode::OnDemand => (TelemetrySource::OnDemand(Arc::clone(&client)), None),
        };

        tracing::info!(
            "bridge started: source {}, mode {:?}, {} procedures",
            config.source_addr,
            config.mode,
            procedures.catalog().len()
        );

        Ok(Runtime {
            config,
            client,
            service: Arc::new(MissionService::new(source, procedures)),
            poller,
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn service(&self) -> Arc<MissionService<UdpLink>> {
        Arc::clone(&self.service)
    }

    pub fn client(&self) -> Arc<ProtocolClient<UdpLink>> {
        Arc::clone(&self.client)
    }

    pub fn router(&self) -> Router {
        http::router(self.service())
    }

    /// Serve HTTP on `listener` until `shutdown` resolves
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> TssResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: Option<SocketAddr> = listener.local_addr().ok();
        tracing::info!("serving http on {:?}", addr);
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| TssError::TransportError(e.to_string()))
    }

    /// Stop polling, then close the source connection
    pub async fn shutdown(mut self) -> PollStats {
        let stats = match self.poller.take() {
            Some(poller) => poller.stop().await,
            None => PollStats::default(),
        };
        self.client.close().await;
        tracing::info!("bridge stopped after {} poll cycles", stats.cycles);
        stats
    }
}
