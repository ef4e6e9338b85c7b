//! Entry point for quantum_core. Parses args and runs the selected mode.

use std::env;

use anyhow::Context;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use quantum_core::config::{parse_args, ArgsError, Config, Defaults, Mode};
use quantum_core::remote::RemoteSampler;
use quantum_core::sampler::LocalSampler;
use quantum_core::scheduler::Scheduler;
use quantum_core::session::ProtocolSession;
use quantum_core::source::Source;
use quantum_core::transport::open_serial;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = match parse_args(env::args(), Defaults::from_env()) {
        Ok(v) => v,
        Err(ArgsError::Help(msg)) => {
            println!("{msg}");
            return Ok(());
        }
        Err(ArgsError::Invalid(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cfg.mode {
        Mode::Identify => identify(&cfg).await,
        Mode::Local | Mode::Remote => run(cfg).await,
    }
}

async fn identify(cfg: &Config) -> anyhow::Result<()> {
    let port = open_serial(&cfg.device)?;
    if !cfg.settle.is_zero() {
        debug!(settle_ms = cfg.settle.as_millis() as u64, "waiting for the device to settle");
        tokio::time::sleep(cfg.settle).await;
    }
    let mut session = ProtocolSession::new(port);
    let name = session
        .identify(cfg.timeout)
        .await
        .with_context(|| format!("identify on {}", cfg.device))?;
    println!("{name}");
    Ok(())
}

async fn run(cfg: Config) -> anyhow::Result<()> {
    if cfg.outlasts_firmware_idle() {
        warn!(
            interval_s = cfg.interval.as_secs(),
            "interval is at least the firmware idle timeout; the display will blink inactive between updates"
        );
    }

    let port = open_serial(&cfg.device)?;
    let source = match cfg.mode {
        Mode::Remote => {
            info!(
                url = %cfg.url,
                timeout_ms = cfg.timeout.as_millis() as u64,
                "polling remote telemetry"
            );
            Source::Remote(RemoteSampler::new(cfg.url.clone(), cfg.timeout)?)
        }
        _ => {
            info!("sampling local telemetry");
            Source::Local(LocalSampler::new())
        }
    };

    let mut scheduler = Scheduler::new(source, ProtocolSession::new(port), cfg.interval);
    let stop = scheduler.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, stopping");
            stop.trigger();
        }
    });

    scheduler
        .run()
        .await
        .with_context(|| format!("telemetry loop on {} failed", cfg.device))
}
