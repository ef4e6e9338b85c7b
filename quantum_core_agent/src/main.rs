//! quantum_core_agent: serves this host's gauge telemetry as JSON over HTTP,
//! for `quantum_core run-remote` (or any other collector) to poll.

mod state;
mod status;

use std::net::SocketAddr;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, PartialEq, Eq)]
enum Parsed {
    Port(u16),
    Help(String),
    Invalid(String),
}

fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} [--port PORT|-p PORT]\n\n\
         Defaults: --port {DEFAULT_PORT} (env QUANTUM_CORE_AGENT_PORT)"
    )
}

fn parse_port<I: IntoIterator<Item = String>>(args: I, default_port: u16) -> Parsed {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "quantum_core_agent".into());
    let mut port: Option<String> = None;
    while let Some(a) = it.next() {
        match a.as_str() {
            "-h" | "--help" => return Parsed::Help(usage(&prog)),
            "--port" | "-p" => match it.next() {
                Some(v) => port = Some(v),
                None => return Parsed::Invalid(format!("missing value for {a}\n{}", usage(&prog))),
            },
            _ if a.starts_with("--port=") => port = a.split_once('=').map(|(_, v)| v.to_string()),
            _ => return Parsed::Invalid(format!("unexpected argument '{a}'\n{}", usage(&prog))),
        }
    }
    match port {
        None => Parsed::Port(default_port),
        Some(p) if p.is_empty() => {
            Parsed::Invalid(format!("missing value for --port\n{}", usage(&prog)))
        }
        Some(p) => match p.parse::<u16>() {
            Ok(v) => Parsed::Port(v),
            Err(_) => Parsed::Invalid(format!("invalid port '{p}'\n{}", usage(&prog))),
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let default_port = std::env::var("QUANTUM_CORE_AGENT_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let port = match parse_port(std::env::args(), default_port) {
        Parsed::Port(p) => p,
        Parsed::Help(msg) => {
            println!("{msg}");
            return Ok(());
        }
        Parsed::Invalid(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let app = status::router(AppState::new());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!("serving telemetry at http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
