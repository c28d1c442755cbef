//! `tss-bridge` daemon: polls the simulation source and serves the mission API.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use tss_runtime::{logging, PollConfig, Runtime, RuntimeConfig, TelemetryMode};
use tss_transport::ClientConfig;

/// Mission API bridge command line.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source UDP host.
    #[arg(long, env = "TSS_HOST", default_value = "127.0.0.1")]
    tss_host: IpAddr,
    /// Source UDP port.
    #[arg(long, env = "TSS_PORT", default_value_t = 14141)]
    tss_port: u16,
    /// Mission API bind host.
    #[arg(long, env = "TSS_API_HOST", default_value = "127.0.0.1")]
    api_host: IpAddr,
    /// Mission API bind port.
    #[arg(long, env = "TSS_API_PORT", default_value_t = 8100)]
    api_port: u16,
    /// Seconds between poll cycles.
    #[arg(long, env = "TSS_POLL_INTERVAL", default_value_t = 0.25)]
    poll_interval: f64,
    /// Seconds to wait for each UDP reply.
    #[arg(long, env = "TSS_UDP_TIMEOUT", default_value_t = 0.5)]
    udp_timeout: f64,
    /// Attempts per UDP request.
    #[arg(long, env = "TSS_UDP_RETRIES", default_value_t = 2)]
    udp_retries: u32,
    /// Procedure catalog (JSON).
    #[arg(
        long,
        env = "TSS_PROCEDURES_FILE",
        value_name = "FILE",
        default_value = "procedures/ltv_procedures.json"
    )]
    procedures_file: PathBuf,
    /// `cached` (background polling) or `on-demand` (query per request).
    #[arg(long, env = "TSS_MODE", default_value = "cached")]
    mode: String,
    /// Log level when RUST_LOG is unset (e.g. info, debug, trace).
    #[arg(long, env = "TSS_LOG_LEVEL", default_value = "info")]
    log_level: String,
    /// Emit logs as JSON lines.
    #[arg(long, env = "TSS_LOG_JSON")]
    log_json: bool,
}

impl Cli {
    fn runtime_config(&self) -> anyhow::Result<RuntimeConfig> {
        let mode: TelemetryMode = self.mode.parse()?;
        Ok(RuntimeConfig {
            source_addr: SocketAddr::new(self.tss_host, self.tss_port),
            bind_addr: SocketAddr::new(self.api_host, self.api_port),
            client: ClientConfig {
                timeout: seconds(self.udp_timeout, "udp-timeout")?,
                retries: self.udp_retries,
                ..ClientConfig::default()
            },
            poll: PollConfig {
                interval: seconds(self.poll_interval, "poll-interval")?,
            },
            mode,
            catalog_path: self.procedures_file.clone(),
        })
    }
}

fn seconds(value: f64, name: &str) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f64(value).with_context(|| format!("invalid --{} {}", name, value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_json);

    let config = cli.runtime_config()?;
    let bind_addr = config.bind_addr;
    let runtime = Runtime::start(config)
        .await
        .context("bridge failed to start")?;

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;

    let served = runtime
        .serve(listener, async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await;

    runtime.shutdown().await;
    served.context("http server terminated")
}
