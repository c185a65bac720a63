//! `strategy-core`: the consumer half of the pipeline.
//!
//! Attaches read-only to the gateway's ring, decodes each frame and feeds
//! the per-symbol indicator state. One engine per strategy instance; nothing
//! here is shared between threads.

mod engine;
mod market_state;

pub use engine::{PollStats, StrategyEngine};
pub use market_state::{
    EVENT_QUOTE, EVENT_TRADE, MAX_SYMBOLS, MarketState, MarketStateManager, StrategyParams,
};
