//! Shared fixtures for the benchmark suite.

use shijim_sbe::{Decimal, MdEntryType, Side, encode_book, encode_quote, encode_trade};

/// Unique region path per process so parallel bench runs never collide.
pub fn temp_shm_path(tag: &str) -> String {
    format!(
        "/tmp/shijim_perf_{tag}_{}_{}",
        std::process::id(),
        shijim_ring::monotonic_ns()
    )
}

pub fn make_quote_frame() -> Vec<u8> {
    encode_quote(
        1_700_000_000_000_000_000,
        1,
        Some(Decimal::new(1_234_567, -2)),
        Some(Decimal::new(1_500, -3)),
        Some(Decimal::new(1_234_568, -2)),
        Some(Decimal::new(2_300, -3)),
    )
}

pub fn make_trade_frame() -> Vec<u8> {
    encode_trade(
        1_700_000_000_000_000_000,
        1,
        Some(Side::Buy),
        Some(Decimal::new(1_234_567, -2)),
        Some(Decimal::new(250, -3)),
    )
}

pub fn make_book_frame(levels: usize) -> Vec<u8> {
    let entries: Vec<_> = (0..levels)
        .map(|i| {
            let side = if i % 2 == 0 {
                MdEntryType::Bid
            } else {
                MdEntryType::Ask
            };
            (
                side,
                Some(Decimal::new(1_234_500 + i as i64, -2)),
                Some(Decimal::new(1_000, -3)),
            )
        })
        .collect();
    encode_book(1_700_000_000_000_000_000, 1, &entries)
}
