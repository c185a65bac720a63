//! Ring-consume / decode / update loop.

use crate::market_state::{MarketStateManager, StrategyParams};
use shijim_ring::{ReadOutcome, RingError, RingReader, StartMode};
use shijim_sbe::{BookMsg, MdEntryType, SbeMessage, SchemaRegistry};
use shijim_signal::BboSnapshot;
use tracing::warn;

/// Read-only snapshot of the engine's counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PollStats {
    /// Frames decoded and applied.
    pub frames: u64,
    /// Overrun events reported by the reader.
    pub overrun_events: u64,
    /// Frames skipped by overrun recovery (the reader's cumulative count).
    pub frames_lost: u64,
    /// Frames that failed to decode (see the registry counters for kinds).
    pub decode_errors: u64,
}

/// One strategy instance's consumer: a ring reader, a schema registry and
/// the per-symbol state it feeds.
pub struct StrategyEngine {
    reader: RingReader,
    registry: SchemaRegistry,
    manager: MarketStateManager,
    stats: PollStats,
}

impl StrategyEngine {
    /// Attaches to the gateway's region. `Latest` start is the norm for a
    /// live strategy; `Beginning` replays whatever is still resident.
    pub fn attach(shm_name: &str, start: StartMode, params: &StrategyParams) -> Result<Self, RingError> {
        Ok(Self {
            reader: RingReader::attach(shm_name, start)?,
            registry: SchemaRegistry::market_data_v1(),
            manager: MarketStateManager::new(params),
            stats: PollStats::default(),
        })
    }

    /// Drains every resident frame, applying each to the symbol state.
    /// Returns how many frames were applied in this call.
    pub fn poll(&mut self) -> u64 {
        let mut applied = 0u64;
        loop {
            match self.reader.next() {
                ReadOutcome::Frame(view) => {
                    match self.registry.decode(view.payload) {
                        Ok(msg) => {
                            apply(&mut self.manager, msg);
                            self.stats.frames += 1;
                            applied += 1;
                        }
                        Err(e) => {
                            self.stats.decode_errors += 1;
                            warn!(seq = view.seq, "frame dropped: {e}");
                        }
                    }
                }
                ReadOutcome::Overrun { gap } => {
                    self.stats.overrun_events += 1;
                    warn!(gap, "reader overrun, skipped to latest");
                }
                ReadOutcome::Empty => return applied,
            }
        }
    }

    pub fn stats(&self) -> PollStats {
        PollStats {
            frames_lost: self.reader.overruns(),
            ..self.stats
        }
    }

    pub fn manager(&self) -> &MarketStateManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut MarketStateManager {
        &mut self.manager
    }

    /// The reader's cumulative overrun count (frames lost).
    pub fn overruns(&self) -> u64 {
        self.reader.overruns()
    }
}

fn apply(manager: &mut MarketStateManager, msg: SbeMessage<'_>) {
    match msg {
        SbeMessage::Quote(q) => manager.state_mut(q.symbol_id).on_quote(&q),
        SbeMessage::Trade(t) => manager.state_mut(t.symbol_id).on_trade(&t),
        SbeMessage::Book(book) => apply_book(manager, book),
        // Heartbeats are filtered at the gateway; one slipping through is
        // simply ignored.
        SbeMessage::Heartbeat => {}
    }
}

/// Reduces a depth update to its best levels and feeds them as a BBO.
/// Entries that fail to decode or carry null prices are skipped; the update
/// only moves state when both sides are present.
fn apply_book(manager: &mut MarketStateManager, book: BookMsg<'_>) {
    let mut best_bid: Option<(f64, f64)> = None;
    let mut best_ask: Option<(f64, f64)> = None;

    for entry in book.entries {
        let Ok(entry) = entry else { continue };
        let (Some(price), Some(qty)) = (entry.price, entry.qty) else {
            continue;
        };
        let price = price.to_f64();
        let qty = qty.to_f64();
        match entry.entry_type {
            MdEntryType::Bid if best_bid.is_none_or(|(p, _)| price > p) => {
                best_bid = Some((price, qty));
            }
            MdEntryType::Ask if best_ask.is_none_or(|(p, _)| price < p) => {
                best_ask = Some((price, qty));
            }
            _ => {}
        }
    }

    if let (Some((bid_price, bid_size)), Some((ask_price, ask_size))) = (best_bid, best_ask) {
        manager.state_mut(book.symbol_id).on_book_bbo(
            book.transact_time,
            BboSnapshot {
                bid_price,
                bid_size,
                ask_price,
                ask_size,
            },
        );
    }
}
