//! yas-link - control daemon for the Yamaha YAS-207 soundbar
//!
//! Opens the soundbar's serial device, runs the link worker and keeps the
//! connection alive: on a transport failure the port is reopened after
//! `device.reconnect_delay_ms` and the handshake restarts.

use std::env;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use yas_link::config::AppConfig;
use yas_link::devices::yas207::{LinkSession, LinkWorker, SessionSettings, WorkerSettings};
use yas_link::transport::SerialTransport;
use yas_link::{Error, Result};

const DEFAULT_CONFIG_PATH: &str = "/etc/yas-link.toml";

/// Parse config path from command line arguments.
///
/// Supports:
/// - `yas-link <path>` (positional)
/// - `yas-link --config <path>` (flag-based)
/// - `yas-link -c <path>` (short flag)
///
/// Returns `None` when no path was given.
fn parse_config_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();

    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }

    if args.len() > 1 && !args[1].starts_with('-') {
        return Some(args[1].clone());
    }

    None
}

/// Explicit paths must exist; the default path may be absent
fn load_config() -> Result<(AppConfig, String)> {
    match parse_config_path() {
        Some(path) => Ok((AppConfig::from_file(&path)?, path)),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => Ok((
            AppConfig::from_file(DEFAULT_CONFIG_PATH)?,
            DEFAULT_CONFIG_PATH.to_string(),
        )),
        None => Ok((AppConfig::default(), "built-in defaults".to_string())),
    }
}

/// Open the serial port, retrying until it succeeds or shutdown is requested
fn open_transport(config: &AppConfig, shutdown: &AtomicBool) -> Option<SerialTransport> {
    let device = &config.device;
    while !shutdown.load(Ordering::Relaxed) {
        match SerialTransport::open(
            &device.port,
            device.baud_rate,
            device.hardware_flow_control,
            config.timing.read_timeout(),
        ) {
            Ok(transport) => return Some(transport),
            Err(e) => {
                log::error!("Failed to open {}: {}", device.port, e);
                thread::sleep(device.reconnect_delay());
            }
        }
    }
    None
}

/// Run the link until shutdown, reconnecting on transport failures
fn run_link(config: &AppConfig, shutdown: &AtomicBool) -> Result<()> {
    let Some(transport) = open_transport(config, shutdown) else {
        return Ok(());
    };
    let session = LinkSession::new(SessionSettings::from(config));
    let mut worker = LinkWorker::new(transport, session, WorkerSettings::from(config));

    loop {
        match worker.run(shutdown) {
            Ok(()) => return Ok(()),
            Err(e) if e.is_transport() => {
                log::error!("Transport failure: {}", e);
                thread::sleep(config.device.reconnect_delay());
                match open_transport(config, shutdown) {
                    Some(transport) => worker.replace_transport(transport),
                    None => return Ok(()),
                }
            }
            Err(e) => return Err(e),
        }
    }
}

fn main() -> Result<()> {
    let (mut config, config_source) = load_config()?;

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("yas-link v{} starting...", env!("CARGO_PKG_VERSION"));
    log::info!("Using config: {}", config_source);

    config.apply_env_overrides();
    config.validate()?;
    log::info!(
        "Device: {} at {} baud",
        config.device.port,
        config.device.baud_rate
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let s = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        s.store(true, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let worker_shutdown = Arc::clone(&shutdown);
    let worker_handle = thread::Builder::new()
        .name("link-worker".to_string())
        .spawn(move || run_link(&config, &worker_shutdown))
        .map_err(|e| Error::Other(format!("Failed to spawn link worker: {}", e)))?;

    log::info!("yas-link running. Press Ctrl-C to stop.");

    let result = worker_handle
        .join()
        .map_err(|_| Error::Other("Link worker panicked".to_string()))?;

    log::info!("yas-link stopped");
    result
}
