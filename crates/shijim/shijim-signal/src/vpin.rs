//! Volume-synchronized probability of informed trading.
//!
//! Trades accumulate into equal-volume buckets. When a bucket fills, its
//! absolute buy/sell imbalance joins a fixed window of recent buckets and
//! `VPIN = sum(|V_buy - V_sell|) / (n x V)` over that window. The window sum
//! is maintained incrementally, so every trade is O(1) amortized.

use std::collections::VecDeque;

/// Taker side of a trade when the feed discloses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Bucket volume and window length.
#[derive(Debug, Clone, Copy)]
pub struct VpinConfig {
    /// Volume per bucket (`V`). Must be positive.
    pub bucket_volume: f64,
    /// Number of closed buckets in the estimate (`n`).
    pub window: usize,
}

impl Default for VpinConfig {
    fn default() -> Self {
        Self {
            bucket_volume: 1000.0,
            window: 50,
        }
    }
}

/// Streaming VPIN estimator.
#[derive(Debug)]
pub struct Vpin {
    cfg: VpinConfig,
    /// Buy volume accumulated in the open bucket.
    bucket_buy: f64,
    /// Sell volume accumulated in the open bucket.
    bucket_sell: f64,
    /// |buy - sell| of the last `window` closed buckets.
    imbalances: VecDeque<f64>,
    /// Running sum of `imbalances`.
    window_sum: f64,
    /// Total buckets closed since creation/reset.
    buckets_closed: u64,
}

impl Vpin {
    pub fn new(cfg: VpinConfig) -> Self {
        assert!(cfg.bucket_volume > 0.0, "bucket volume must be positive");
        assert!(cfg.window > 0, "window must hold at least one bucket");
        Self {
            cfg,
            bucket_buy: 0.0,
            bucket_sell: 0.0,
            imbalances: VecDeque::with_capacity(cfg.window),
            window_sum: 0.0,
            buckets_closed: 0,
        }
    }

    /// Feeds a trade whose aggressor side is known.
    pub fn on_trade(&mut self, volume: f64, side: TradeSide) {
        let (buy, sell) = match side {
            TradeSide::Buy => (volume, 0.0),
            TradeSide::Sell => (0.0, volume),
        };
        self.accumulate(buy, sell);
    }

    /// Feeds a trade without a disclosed side, splitting its volume by bulk
    /// volume classification: the buy fraction is the standard normal CDF of
    /// the price change over its volatility.
    pub fn on_trade_bvc(&mut self, volume: f64, price_change: f64, sigma: f64) {
        let buy_fraction = if sigma > 0.0 {
            norm_cdf(price_change / sigma)
        } else {
            // Degenerate volatility: split by the sign of the move.
            match price_change.partial_cmp(&0.0) {
                Some(std::cmp::Ordering::Greater) => 1.0,
                Some(std::cmp::Ordering::Less) => 0.0,
                _ => 0.5,
            }
        };
        self.accumulate(volume * buy_fraction, volume * (1.0 - buy_fraction));
    }

    /// Adds classified volume, closing buckets as they fill. A single large
    /// trade can close several buckets; the overflow carries into the next
    /// bucket pro rata.
    fn accumulate(&mut self, mut buy: f64, mut sell: f64) {
        loop {
            let filled = self.bucket_buy + self.bucket_sell;
            let room = self.cfg.bucket_volume - filled;
            let incoming = buy + sell;

            if incoming < room {
                self.bucket_buy += buy;
                self.bucket_sell += sell;
                return;
            }

            // Fill the open bucket with a proportional share of each side.
            let fraction = if incoming > 0.0 { room / incoming } else { 0.0 };
            self.bucket_buy += buy * fraction;
            self.bucket_sell += sell * fraction;
            buy -= buy * fraction;
            sell -= sell * fraction;
            self.close_bucket();
            if buy + sell <= 0.0 {
                return;
            }
        }
    }

    fn close_bucket(&mut self) {
        let imbalance = (self.bucket_buy - self.bucket_sell).abs();
        self.bucket_buy = 0.0;
        self.bucket_sell = 0.0;
        self.buckets_closed += 1;

        if self.imbalances.len() == self.cfg.window {
            if let Some(oldest) = self.imbalances.pop_front() {
                self.window_sum -= oldest;
            }
        }
        self.imbalances.push_back(imbalance);
        self.window_sum += imbalance;
    }

    /// Current estimate, available once the window is full.
    pub fn value(&self) -> Option<f64> {
        if self.imbalances.len() < self.cfg.window {
            return None;
        }
        Some(self.window_sum / (self.cfg.window as f64 * self.cfg.bucket_volume))
    }

    /// Buckets closed since creation or the last reset.
    pub fn buckets_closed(&self) -> u64 {
        self.buckets_closed
    }

    /// Clears the open bucket and the whole window.
    pub fn reset(&mut self) {
        self.bucket_buy = 0.0;
        self.bucket_sell = 0.0;
        self.imbalances.clear();
        self.window_sum = 0.0;
        self.buckets_closed = 0;
    }
}

/// Standard normal CDF via the Abramowitz-Stegun 7.1.26 erf polynomial
/// (|error| < 1.5e-7, plenty for volume classification).
fn norm_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vpin(bucket_volume: f64, window: usize) -> Vpin {
        Vpin::new(VpinConfig {
            bucket_volume,
            window,
        })
    }

    #[test]
    fn no_value_until_window_fills() {
        let mut v = vpin(10.0, 2);
        v.on_trade(10.0, TradeSide::Buy);
        assert_eq!(v.buckets_closed(), 1);
        assert!(v.value().is_none());
        v.on_trade(10.0, TradeSide::Sell);
        assert!(v.value().is_some());
    }

    /// All one-sided flow maxes the estimate at 1; perfectly balanced flow
    /// takes it to 0.
    #[test]
    fn extremes_of_the_estimate() {
        let mut v = vpin(10.0, 2);
        v.on_trade(10.0, TradeSide::Buy);
        v.on_trade(10.0, TradeSide::Buy);
        assert_eq!(v.value(), Some(1.0));

        let mut v = vpin(10.0, 2);
        for _ in 0..2 {
            v.on_trade(5.0, TradeSide::Buy);
            v.on_trade(5.0, TradeSide::Sell);
        }
        assert_eq!(v.value(), Some(0.0));
    }

    /// A jumbo trade closes multiple buckets and carries its tail into the
    /// open bucket.
    #[test]
    fn oversized_trade_spills_across_buckets() {
        let mut v = vpin(10.0, 4);
        v.on_trade(25.0, TradeSide::Buy);
        assert_eq!(v.buckets_closed(), 2);
        // 5 of volume left in the open bucket.
        v.on_trade(5.0, TradeSide::Buy);
        assert_eq!(v.buckets_closed(), 3);
    }

    /// Old buckets age out of the window: after enough balanced buckets, the
    /// early one-sided buckets no longer weigh in.
    #[test]
    fn window_slides() {
        let mut v = vpin(10.0, 2);
        v.on_trade(10.0, TradeSide::Buy);
        v.on_trade(10.0, TradeSide::Buy);
        assert_eq!(v.value(), Some(1.0));
        for _ in 0..2 {
            v.on_trade(5.0, TradeSide::Buy);
            v.on_trade(5.0, TradeSide::Sell);
        }
        assert_eq!(v.value(), Some(0.0));
    }

    #[test]
    fn bvc_splits_by_normalized_move() {
        let mut v = vpin(10.0, 1);
        // No move: half buy, half sell -> zero imbalance.
        v.on_trade_bvc(10.0, 0.0, 1.0);
        assert_eq!(v.buckets_closed(), 1);
        assert!(v.value().unwrap().abs() < 1e-12);

        // A strong up-move classifies almost everything as buying.
        let mut v = vpin(10.0, 1);
        v.on_trade_bvc(10.0, 5.0, 1.0);
        assert!(v.value().unwrap() > 0.99);
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut v = vpin(10.0, 2);
        v.on_trade(25.0, TradeSide::Buy);
        v.reset();
        assert_eq!(v.buckets_closed(), 0);
        assert!(v.value().is_none());
    }

    #[test]
    fn norm_cdf_matches_known_points() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-9);
        assert!((norm_cdf(1.96) - 0.975).abs() < 1e-3);
        assert!((norm_cdf(-1.96) - 0.025).abs() < 1e-3);
    }
}
