//! Order-flow imbalance from top-of-book changes.

/// One observation of the best bid and offer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BboSnapshot {
    pub bid_price: f64,
    pub bid_size: f64,
    pub ask_price: f64,
    pub ask_size: f64,
}

/// Event-contribution OFI.
///
/// Each tick contributes the signed change in resting liquidity at the top
/// of the book, per side:
///
/// - bid improves → the whole new bid size is fresh buy pressure
/// - bid retreats → the prior bid size was withdrawn
/// - bid price unchanged → the size delta
///
/// and symmetrically for the ask, with the sign convention that a falling or
/// shrinking ask also reads as buy pressure. `OFI = bid_contrib - ask_contrib`,
/// positive = net buying.
#[derive(Debug, Default)]
pub struct OfiCalculator {
    prev: Option<BboSnapshot>,
}

impl OfiCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds the next BBO and returns this tick's OFI contribution.
    ///
    /// The first observation establishes state and contributes 0.
    pub fn update(&mut self, bbo: BboSnapshot) -> f64 {
        let Some(prev) = self.prev.replace(bbo) else {
            return 0.0;
        };

        let bid_contrib = if bbo.bid_price > prev.bid_price {
            bbo.bid_size
        } else if bbo.bid_price < prev.bid_price {
            -prev.bid_size
        } else {
            bbo.bid_size - prev.bid_size
        };

        let ask_contrib = if bbo.ask_price < prev.ask_price {
            bbo.ask_size
        } else if bbo.ask_price > prev.ask_price {
            -prev.ask_size
        } else {
            bbo.ask_size - prev.ask_size
        };

        bid_contrib - ask_contrib
    }

    /// Last BBO fed in, if any.
    pub fn last(&self) -> Option<BboSnapshot> {
        self.prev
    }

    /// Clears the previous BBO; the next update contributes 0 again.
    pub fn reset(&mut self) {
        self.prev = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbo(bid_price: f64, bid_size: f64, ask_price: f64, ask_size: f64) -> BboSnapshot {
        BboSnapshot {
            bid_price,
            bid_size,
            ask_price,
            ask_size,
        }
    }

    #[test]
    fn first_observation_contributes_zero() {
        let mut ofi = OfiCalculator::new();
        assert_eq!(ofi.update(bbo(100.0, 10.0, 101.0, 10.0)), 0.0);
    }

    /// Size added at an unchanged bid is buy pressure: 10 -> 15 gives +5.
    #[test]
    fn bid_side_add_at_same_price() {
        let mut ofi = OfiCalculator::new();
        ofi.update(bbo(100.0, 10.0, 101.0, 10.0));
        assert_eq!(ofi.update(bbo(100.0, 15.0, 101.0, 10.0)), 5.0);
    }

    /// Ask size pulled at an unchanged price also reads as buy pressure:
    /// ask 10 -> 2 gives ask_contrib -8 and OFI +8.
    #[test]
    fn ask_side_drop_at_same_price() {
        let mut ofi = OfiCalculator::new();
        ofi.update(bbo(100.0, 10.0, 101.0, 10.0));
        assert_eq!(ofi.update(bbo(100.0, 10.0, 101.0, 2.0)), 8.0);
    }

    /// Bid price giving way withdraws the prior size: OFI -10 regardless of
    /// the size now resting at the lower level.
    #[test]
    fn broken_bid_support() {
        let mut ofi = OfiCalculator::new();
        ofi.update(bbo(100.0, 10.0, 101.0, 10.0));
        assert_eq!(ofi.update(bbo(99.5, 20.0, 101.0, 10.0)), -10.0);
    }

    #[test]
    fn improving_bid_counts_full_new_size() {
        let mut ofi = OfiCalculator::new();
        ofi.update(bbo(100.0, 10.0, 101.0, 10.0));
        assert_eq!(ofi.update(bbo(100.5, 7.0, 101.0, 10.0)), 7.0);
    }

    /// Mirroring the book (bids become asks and vice versa) inverts the
    /// sign of every contribution.
    #[test]
    fn mirrored_books_invert_the_sign() {
        let histories = [
            [bbo(100.0, 10.0, 101.0, 10.0), bbo(100.0, 15.0, 101.0, 8.0)],
            [bbo(50.0, 3.0, 51.0, 9.0), bbo(50.5, 4.0, 50.9, 2.0)],
        ];

        for history in histories {
            let mut ofi = OfiCalculator::new();
            let mut mirrored = OfiCalculator::new();
            let mut direct = 0.0;
            let mut inverse = 0.0;
            for b in history {
                direct = ofi.update(b);
                // Swap sides: the mirrored ask is the bid and vice versa.
                inverse = mirrored.update(bbo(-b.ask_price, b.ask_size, -b.bid_price, b.bid_size));
            }
            assert_eq!(direct, -inverse);
        }
    }

    #[test]
    fn reset_forgets_history() {
        let mut ofi = OfiCalculator::new();
        ofi.update(bbo(100.0, 10.0, 101.0, 10.0));
        ofi.reset();
        assert!(ofi.last().is_none());
        assert_eq!(ofi.update(bbo(100.0, 99.0, 101.0, 1.0)), 0.0);
    }
}
