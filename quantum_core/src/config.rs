//! Command-line and environment configuration for the `quantum_core` binary.
//!
//! Flags win over environment variables, which win over built-in defaults:
//! `QUANTUM_CORE_DEVICE`, `QUANTUM_CORE_INTERVAL`, `QUANTUM_CORE_URL`,
//! `QUANTUM_CORE_TIMEOUT_MS`.

use std::time::Duration;

pub const DEFAULT_DEVICE: &str = "/dev/ttyACM0";
pub const DEFAULT_INTERVAL_SECS: u64 = 1;
pub const DEFAULT_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
/// Pause between opening the port and sending the identify frame. Boards that
/// reset on open ignore input until their bootloader and power-up demo finish.
pub const DEFAULT_SETTLE_MS: u64 = 2_000;

/// The firmware drops its "active" indicator after this long without a frame.
pub const FIRMWARE_IDLE_TIMEOUT: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Local,
    Remote,
    Identify,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
    pub device: String,
    pub interval: Duration,
    pub url: String,
    pub timeout: Duration,
    /// Only used by `identify`.
    pub settle: Duration,
}

/// Defaults before any flag is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub device: String,
    pub interval_secs: u64,
    pub url: String,
    pub timeout_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            url: DEFAULT_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl Defaults {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds defaults from a variable lookup. Empty strings and values that
    /// are not positive integers fall back to the built-in default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base = Self::default();
        let text = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let positive = |key: &str| {
            lookup(key)
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
        };
        Self {
            device: text("QUANTUM_CORE_DEVICE").unwrap_or(base.device),
            interval_secs: positive("QUANTUM_CORE_INTERVAL").unwrap_or(base.interval_secs),
            url: text("QUANTUM_CORE_URL").unwrap_or(base.url),
            timeout_ms: positive("QUANTUM_CORE_TIMEOUT_MS").unwrap_or(base.timeout_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgsError {
    /// `-h/--help`: print and exit successfully.
    Help(String),
    /// Bad invocation: print and exit with an error.
    Invalid(String),
}

pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} <run-local|run-remote|identify> [--device PATH|-d PATH] \
         [--interval SECS|-i SECS] [--url URL|-u URL] [--timeout-ms MS|-t MS] \
         [--settle-ms MS|-s MS]\n\
         \n\
         Commands:\n  \
         run-local    sample this host and drive the display\n  \
         run-remote   poll URL for samples and drive the display\n  \
         identify     ask the display for its device name\n\
         \n\
         Defaults: --device {DEFAULT_DEVICE} --interval {DEFAULT_INTERVAL_SECS} \
         --url {DEFAULT_URL} --timeout-ms {DEFAULT_TIMEOUT_MS} --settle-ms {DEFAULT_SETTLE_MS}\n\
         \n\
         identify waits --settle-ms after opening the port before asking; boards that \
         reset on open may need 5000 or more."
    )
}

fn flag_value(
    name: &str,
    inline: Option<String>,
    it: &mut impl Iterator<Item = String>,
) -> Result<String, String> {
    match inline.or_else(|| it.next()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(format!("missing value for {name}")),
    }
}

pub fn parse_args<I: IntoIterator<Item = String>>(
    args: I,
    defaults: Defaults,
) -> Result<Config, ArgsError> {
    let mut it = args.into_iter();
    let prog = it.next().unwrap_or_else(|| "quantum_core".into());
    let invalid = |msg: String| ArgsError::Invalid(format!("{msg}\n{}", usage(&prog)));

    let mut mode: Option<Mode> = None;
    let mut device: Option<String> = None;
    let mut interval: Option<String> = None;
    let mut url: Option<String> = None;
    let mut timeout: Option<String> = None;
    let mut settle: Option<String> = None;

    while let Some(arg) = it.next() {
        let (key, inline) = match arg.split_once('=') {
            Some((k, v)) if k.starts_with("--") => (k.to_string(), Some(v.to_string())),
            _ => (arg.clone(), None),
        };
        match key.as_str() {
            "-h" | "--help" => return Err(ArgsError::Help(usage(&prog))),
            "--device" | "-d" => {
                device = Some(flag_value(&key, inline, &mut it).map_err(invalid)?);
            }
            "--interval" | "-i" => {
                interval = Some(flag_value(&key, inline, &mut it).map_err(invalid)?);
            }
            "--url" | "-u" => {
                url = Some(flag_value(&key, inline, &mut it).map_err(invalid)?);
            }
            "--timeout-ms" | "-t" => {
                timeout = Some(flag_value(&key, inline, &mut it).map_err(invalid)?);
            }
            "--settle-ms" | "-s" => {
                settle = Some(flag_value(&key, inline, &mut it).map_err(invalid)?);
            }
            "run-local" | "run-remote" | "identify" if mode.is_none() => {
                mode = Some(match key.as_str() {
                    "run-local" => Mode::Local,
                    "run-remote" => Mode::Remote,
                    _ => Mode::Identify,
                });
            }
            _ => return Err(invalid(format!("unexpected argument '{arg}'"))),
        }
    }

    let mode = mode.ok_or_else(|| invalid("missing command".to_string()))?;
    if url.is_some() && mode != Mode::Remote {
        return Err(invalid("--url only applies to run-remote".to_string()));
    }
    if settle.is_some() && mode != Mode::Identify {
        return Err(invalid("--settle-ms only applies to identify".to_string()));
    }

    let interval_secs = match interval {
        Some(v) => v
            .parse::<u64>()
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| invalid(format!("invalid interval '{v}' (whole seconds, >= 1)")))?,
        None => defaults.interval_secs,
    };
    let timeout_ms = match timeout {
        Some(v) => v
            .parse::<u64>()
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| invalid(format!("invalid timeout '{v}' (milliseconds, >= 1)")))?,
        None => defaults.timeout_ms,
    };
    let settle_ms = match settle {
        Some(v) => v
            .parse::<u64>()
            .map_err(|_| invalid(format!("invalid settle delay '{v}' (milliseconds)")))?,
        None => DEFAULT_SETTLE_MS,
    };

    Ok(Config {
        mode,
        device: device.unwrap_or(defaults.device),
        interval: Duration::from_secs(interval_secs),
        url: url.unwrap_or(defaults.url),
        timeout: Duration::from_millis(timeout_ms),
        settle: Duration::from_millis(settle_ms),
    })
}

impl Config {
    /// True when the interval is long enough for the firmware to mark the link idle
    /// between frames.
    pub fn outlasts_firmware_idle(&self) -> bool {
        self.interval >= FIRMWARE_IDLE_TIMEOUT
    }
}
