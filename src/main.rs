//! pimon — a small always-on resource monitor for Raspberry Pi class
//! hosts: CPU, memory, disk, network throughput and CPU temperature,
//! sampled once a second with rolling histories.
//!
//! Run with:  `RUST_LOG=info pimon`

mod display;

use anyhow::Result;
use pimon_config::{ConfigWatcher, MonitorConfig};
use pimon_sampler::{Sampler, SysinfoSource};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Structured logging — RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("pimon v{} starting", env!("CARGO_PKG_VERSION"));

    let config_path = pimon_config::default_path();
    let (_watcher, mut reload_rx) = ConfigWatcher::spawn(&config_path);

    // Outer loop: one iteration per sampler lifetime. A config change
    // stops the running sampler and starts a fresh one with new settings.
    loop {
        let config = pimon_config::load(&config_path).unwrap_or_else(|e| {
            tracing::error!("{e}; keeping default settings");
            MonitorConfig::default()
        });
        let source = SysinfoSource::new(config.temperature.clone());
        let (sampler, mut samples) = Sampler::start(config, source)?;

        loop {
            tokio::select! {
                maybe = samples.recv() => match maybe {
                    Some(snapshot) => println!("{}", display::readout(&snapshot)),
                    None => return Ok(()), // sampler exited
                },
                Some(()) = reload_rx.recv() => {
                    tracing::info!("config changed — restarting sampler");
                    sampler.shutdown().await;
                    break;
                }
            }
        }
    }
}
