//! Per-symbol microstructure state.
//!
//! Symbol ids are dense small integers assigned by us, so the manager is a
//! flat array indexed directly by the id — one base+offset load on the hot
//! path, no hashing, no probing, zero allocation after startup.

use shijim_sbe::{QuoteMsg, Side, TradeMsg};
use shijim_signal::{BboSnapshot, MultivariateHawkes, OfiCalculator, TradeSide, Vpin, VpinConfig};

/// Max symbols tracked per strategy instance.
pub const MAX_SYMBOLS: usize = 256;

/// Hawkes event-type ordinal for trades.
pub const EVENT_TRADE: usize = 0;
/// Hawkes event-type ordinal for quote/book updates.
pub const EVENT_QUOTE: usize = 1;
const EVENT_TYPES: usize = 2;

/// Indicator configuration shared by every symbol slot.
#[derive(Debug, Clone, Copy)]
pub struct StrategyParams {
    pub vpin: VpinConfig,
    /// Baseline intensity per event type (`[trade, quote]`).
    pub hawkes_mu: [f64; EVENT_TYPES],
    /// Cross-excitation, row-major: `hawkes_alpha[src][dst]`.
    pub hawkes_alpha: [[f64; EVENT_TYPES]; EVENT_TYPES],
    /// Decay rate per event type.
    pub hawkes_beta: [f64; EVENT_TYPES],
    /// Price-change volatility used by bulk volume classification when the
    /// feed does not disclose the aggressor.
    pub bvc_sigma: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            vpin: VpinConfig::default(),
            hawkes_mu: [0.2, 1.0],
            // Trades excite both clocks; quoting mostly excites itself.
            hawkes_alpha: [[0.6, 0.3], [0.05, 0.4]],
            hawkes_beta: [1.2, 5.0],
            bvc_sigma: 1.0,
        }
    }
}

impl StrategyParams {
    fn build_hawkes(&self) -> MultivariateHawkes {
        MultivariateHawkes::new(
            self.hawkes_mu.to_vec(),
            self.hawkes_alpha.iter().flatten().copied().collect(),
            self.hawkes_beta.to_vec(),
        )
    }
}

/// Everything a strategy knows about one symbol.
#[derive(Debug)]
pub struct MarketState {
    pub symbol_id: u16,
    /// Exchange transact time of the last event applied, nanoseconds.
    pub last_update_ns: u64,
    /// Mid price of the last complete BBO, 0 until one arrives.
    pub mid: f64,
    /// Ask minus bid of the last complete BBO.
    pub spread: f64,
    /// OFI contribution of the most recent BBO change.
    pub last_ofi: f64,
    /// Running OFI sum since reset.
    pub cumulative_ofi: f64,
    /// Last trade price seen, used for BVC classification.
    last_trade_price: Option<f64>,

    ofi: OfiCalculator,
    vpin: Vpin,
    intensity: MultivariateHawkes,
    bvc_sigma: f64,
}

impl MarketState {
    pub fn new(symbol_id: u16, params: &StrategyParams) -> Self {
        Self {
            symbol_id,
            last_update_ns: 0,
            mid: 0.0,
            spread: 0.0,
            last_ofi: 0.0,
            cumulative_ofi: 0.0,
            last_trade_price: None,
            ofi: OfiCalculator::new(),
            vpin: Vpin::new(params.vpin),
            intensity: params.build_hawkes(),
            bvc_sigma: params.bvc_sigma,
        }
    }

    /// Applies a top-of-book update.
    ///
    /// A quote with any side absent (null sentinel on the wire) refreshes
    /// the clock and the quote intensity but cannot move BBO-derived state.
    pub fn on_quote(&mut self, quote: &QuoteMsg) {
        self.last_update_ns = quote.transact_time;
        self.intensity
            .on_event(EVENT_QUOTE, ns_to_secs(quote.transact_time));

        let (Some(bp), Some(bq), Some(ap), Some(aq)) = (
            quote.bid_price,
            quote.bid_qty,
            quote.ask_price,
            quote.ask_qty,
        ) else {
            return;
        };

        self.apply_bbo(BboSnapshot {
            bid_price: bp.to_f64(),
            bid_size: bq.to_f64(),
            ask_price: ap.to_f64(),
            ask_size: aq.to_f64(),
        });
    }

    /// Applies one executed trade.
    pub fn on_trade(&mut self, trade: &TradeMsg) {
        self.last_update_ns = trade.transact_time;
        self.intensity
            .on_event(EVENT_TRADE, ns_to_secs(trade.transact_time));

        let Some(qty) = trade.qty else { return };
        let volume = qty.to_f64();

        match trade.side {
            Some(Side::Buy) => self.vpin.on_trade(volume, TradeSide::Buy),
            Some(Side::Sell) => self.vpin.on_trade(volume, TradeSide::Sell),
            None => {
                // No disclosed aggressor: classify by the price move.
                let price = trade.price.map(|p| p.to_f64());
                let change = match (price, self.last_trade_price) {
                    (Some(now), Some(prev)) => now - prev,
                    _ => 0.0,
                };
                self.vpin.on_trade_bvc(volume, change, self.bvc_sigma);
            }
        }
        if let Some(p) = trade.price {
            self.last_trade_price = Some(p.to_f64());
        }
    }

    /// Applies the best levels extracted from a depth update.
    pub fn on_book_bbo(&mut self, transact_time: u64, bbo: BboSnapshot) {
        self.last_update_ns = transact_time;
        self.intensity
            .on_event(EVENT_QUOTE, ns_to_secs(transact_time));
        self.apply_bbo(bbo);
    }

    fn apply_bbo(&mut self, bbo: BboSnapshot) {
        self.last_ofi = self.ofi.update(bbo);
        self.cumulative_ofi += self.last_ofi;
        self.mid = (bbo.bid_price + bbo.ask_price) / 2.0;
        self.spread = bbo.ask_price - bbo.bid_price;
    }

    /// Current VPIN estimate, once its window has filled.
    pub fn vpin(&self) -> Option<f64> {
        self.vpin.value()
    }

    /// Post-jump trade-arrival intensity.
    pub fn trade_intensity(&self) -> f64 {
        self.intensity.intensity(EVENT_TRADE)
    }

    /// Post-jump quote-arrival intensity.
    pub fn quote_intensity(&self) -> f64 {
        self.intensity.intensity(EVENT_QUOTE)
    }

    /// Clears all indicator state back to configured initial values.
    pub fn reset(&mut self) {
        self.last_update_ns = 0;
        self.mid = 0.0;
        self.spread = 0.0;
        self.last_ofi = 0.0;
        self.cumulative_ofi = 0.0;
        self.last_trade_price = None;
        self.ofi.reset();
        self.vpin.reset();
        self.intensity.reset();
    }
}

/// Flat, directly indexed store of every symbol's state.
pub struct MarketStateManager {
    states: Vec<MarketState>,
}

impl MarketStateManager {
    pub fn new(params: &StrategyParams) -> Self {
        Self {
            states: (0..MAX_SYMBOLS as u16)
                .map(|id| MarketState::new(id, params))
                .collect(),
        }
    }

    /// Direct-index lookup; ids at or beyond [`MAX_SYMBOLS`] fold onto the
    /// final slot rather than branching on the hot path.
    #[inline(always)]
    pub fn state_mut(&mut self, symbol_id: u16) -> &mut MarketState {
        let idx = (symbol_id as usize).min(MAX_SYMBOLS - 1);
        &mut self.states[idx]
    }

    #[inline(always)]
    pub fn state(&self, symbol_id: u16) -> &MarketState {
        let idx = (symbol_id as usize).min(MAX_SYMBOLS - 1);
        &self.states[idx]
    }

    pub fn reset_all(&mut self) {
        for s in &mut self.states {
            s.reset();
        }
    }
}

#[inline(always)]
fn ns_to_secs(ns: u64) -> f64 {
    ns as f64 / 1e9
}
