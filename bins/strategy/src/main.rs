//! Strategy consumer: attaches to the gateway's ring and keeps per-symbol
//! indicators live, reporting throughput once a second.

use clap::Parser;
use shijim_ring::StartMode;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use strategy_core::{StrategyEngine, StrategyParams};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Consecutive empty polls before the loop backs off to a yield.
const IDLE_POLLS_BEFORE_YIELD: u32 = 1024;

/// Market-data strategy consumer
#[derive(Parser, Debug)]
#[command(name = "strategy")]
#[command(about = "Consumes the shared-memory ring and computes microstructure indicators")]
#[command(version)]
struct Args {
    /// Shared-memory region name (falls back to $SHM_NAME)
    #[arg(long)]
    shm_name: Option<String>,

    /// Replay resident frames instead of tailing the live edge
    #[arg(long)]
    from_start: bool,

    /// Symbol id to report on
    #[arg(long, default_value = "1")]
    symbol: u16,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("INFO")),
        )
        .init();

    let shm_name = args
        .shm_name
        .or_else(|| std::env::var("SHM_NAME").ok())
        .unwrap_or_else(|| "shijim_market_data_l2".into());
    let start = if args.from_start {
        StartMode::Beginning
    } else {
        StartMode::Latest
    };

    let mut engine =
        match StrategyEngine::attach(&shm_name, start, &StrategyParams::default()) {
            Ok(e) => e,
            Err(e) => {
                error!("failed to attach to '{shm_name}' (is the gateway running?): {e}");
                return ExitCode::from(2);
            }
        };
    info!("STRATEGY: attached to {shm_name}, reading...");

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
            error!("failed to install signal handler: {e}");
            return ExitCode::from(2);
        }
    }

    let mut last_report = Instant::now();
    let mut frames_at_report = 0u64;
    let mut idle_polls = 0u32;

    while !shutdown.load(Ordering::Relaxed) {
        let applied = engine.poll();

        if applied == 0 {
            // Cooperative back-off: spin briefly for the low-latency case,
            // then yield so an idle feed does not pin a core.
            idle_polls += 1;
            if idle_polls > IDLE_POLLS_BEFORE_YIELD {
                std::thread::sleep(Duration::from_millis(1));
            } else {
                std::hint::spin_loop();
            }
        } else {
            idle_polls = 0;
        }

        if last_report.elapsed() >= Duration::from_secs(1) {
            let stats = engine.stats();
            let state = engine.manager().state(args.symbol);
            info!(
                "STRATEGY: ~{} frames/s | mid={:.4} spread={:.4} ofi={:+.2} vpin={} \
                 trade_int={:.3} | lost={} decode_errors={}",
                stats.frames - frames_at_report,
                state.mid,
                state.spread,
                state.cumulative_ofi,
                state
                    .vpin()
                    .map_or_else(|| "warming".into(), |v| format!("{v:.4}")),
                state.trade_intensity(),
                stats.frames_lost,
                stats.decode_errors,
            );
            frames_at_report = stats.frames;
            last_report = Instant::now();
        }
    }

    let stats = engine.stats();
    info!(
        "STRATEGY: shutdown after {} frames ({} lost, {} decode errors)",
        stats.frames, stats.frames_lost, stats.decode_errors
    );
    ExitCode::SUCCESS
}
