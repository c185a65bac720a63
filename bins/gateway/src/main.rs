//! Ingestion gateway: UDP/multicast in, shared-memory ring out.
//!
//! Configuration layering: built-in defaults, then an optional TOML file,
//! then environment (`SHM_NAME`, `SHM_SLOT_SIZE`, `SHM_SLOT_COUNT`,
//! `INGEST_BIND`, `INGEST_MODE`), then CLI flags.
//!
//! Exit codes: 0 clean shutdown, 2 bind/region-init failure, 3 schema load
//! failure.

use clap::Parser;
use gateway_config::{GatewayConfig, IngestMode};
use gateway_core::{GatewayEngine, bind_socket, run_receive_loop};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const EXIT_INIT_FAILURE: u8 = 2;
const EXIT_SCHEMA_FAILURE: u8 = 3;

/// Market-data ingestion gateway
#[derive(Parser, Debug)]
#[command(name = "gateway")]
#[command(about = "Receives SBE market data over UDP and publishes it to shared memory")]
#[command(version)]
struct Args {
    /// UDP bind address, HOST:PORT
    #[arg(long)]
    bind: Option<String>,

    /// Receiver mode
    #[arg(long, value_parser = parse_mode)]
    mode: Option<IngestMode>,

    /// Ring slot size in bytes (cache-line multiple)
    #[arg(long)]
    slot_size: Option<usize>,

    /// Ring slot count (power of two)
    #[arg(long)]
    slot_count: Option<usize>,

    /// Shared-memory region name
    #[arg(long)]
    shm_name: Option<String>,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// Re-create the region even if it already exists
    #[arg(long)]
    force: bool,
}

fn parse_mode(s: &str) -> Result<IngestMode, String> {
    IngestMode::parse(s).ok_or_else(|| format!("'{s}' is not NORMAL or TESTING"))
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match GatewayConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("gateway: {e}");
                return ExitCode::from(EXIT_INIT_FAILURE);
            }
        },
        None => GatewayConfig::default(),
    };
    if let Err(e) = config.apply_env() {
        eprintln!("gateway: {e}");
        return ExitCode::from(EXIT_INIT_FAILURE);
    }

    // CLI beats file and environment.
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(slot_size) = args.slot_size {
        config.slot_size = slot_size;
    }
    if let Some(slot_count) = args.slot_count {
        config.slot_count = slot_count;
    }
    if let Some(shm_name) = args.shm_name {
        config.shm_name = shm_name;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    // The admitted-template table must resolve against the schema the
    // decoder side understands; an id the schema does not define means the
    // deployment is pointed at the wrong schema description.
    let known = [
        shijim_sbe::TEMPLATE_TRADE,
        shijim_sbe::TEMPLATE_QUOTE,
        shijim_sbe::TEMPLATE_BOOK,
    ];
    if config.admitted_templates.is_empty()
        || config.admitted_templates.iter().any(|t| !known.contains(t))
    {
        error!(
            "admitted template table {:?} does not match schema {} v{}",
            config.admitted_templates,
            shijim_sbe::SCHEMA_ID,
            shijim_sbe::SCHEMA_VERSION
        );
        return ExitCode::from(EXIT_SCHEMA_FAILURE);
    }

    let mut engine = match GatewayEngine::new(&config, args.force) {
        Ok(e) => e,
        Err(e) => {
            error!("region init failed: {e}");
            return ExitCode::from(EXIT_INIT_FAILURE);
        }
    };
    let socket = match bind_socket(&config) {
        Ok(s) => s,
        Err(e) => {
            error!("bind failed: {e}");
            return ExitCode::from(EXIT_INIT_FAILURE);
        }
    };

    info!(
        "GATEWAY: {bind} -> {shm} ({count} slots x {size} B, {mode:?})",
        bind = config.bind,
        shm = config.shm_name,
        count = config.slot_count,
        size = config.slot_size,
        mode = config.mode,
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
            error!("failed to install signal handler: {e}");
            return ExitCode::from(EXIT_INIT_FAILURE);
        }
    }

    let receiver = {
        let flag = Arc::clone(&shutdown);
        std::thread::Builder::new()
            .name("gateway-recv".into())
            .spawn(move || {
                run_receive_loop(&socket, &flag, |frame| engine.on_datagram(frame));
                engine
            })
            .expect("failed to spawn receiver thread")
    };

    let engine = receiver.join().expect("receiver thread panicked");
    let stats = engine.stats();
    info!(
        "GATEWAY: shutdown after {} datagrams: {} published, {} heartbeats, \
         {} filtered, {} malformed, {} truncated, {} dropped",
        stats.received,
        stats.published,
        stats.heartbeats,
        stats.filtered,
        stats.malformed,
        stats.truncated,
        stats.dropped,
    );
    ExitCode::SUCCESS
}
