//! Ring-to-indicator pipeline: frames published by a writer come out of
//! `poll()` as updated per-symbol state.

use shijim_ring::{RingConfig, RingWriter, StartMode};
use shijim_sbe::{Decimal, MdEntryType, Side, encode_book, encode_quote, encode_trade};
use strategy_core::{StrategyEngine, StrategyParams};

fn unique_region(tag: &str) -> String {
    format!(
        "/tmp/shijim_strategy_test_{tag}_{}_{}",
        std::process::id(),
        shijim_ring::monotonic_ns()
    )
}

fn px(v: f64) -> Option<Decimal> {
    Some(Decimal::new((v * 100.0).round() as i64, -2))
}

#[test]
fn burst_of_quotes_is_applied_in_order() {
    let name = unique_region("burst");
    let mut writer = RingWriter::create(&name, RingConfig::default(), false).unwrap();
    let mut engine =
        StrategyEngine::attach(&name, StartMode::Beginning, &StrategyParams::default()).unwrap();

    // Prices 100.0, 101.0, ... 199.0 with constant sizes.
    for i in 0..100u64 {
        let p = 100.0 + i as f64;
        let frame = encode_quote(i, 5, px(p), px(10.0), px(p + 1.0), px(10.0));
        writer.publish(&frame).unwrap();
    }

    assert_eq!(engine.poll(), 100);
    let stats = engine.stats();
    assert_eq!(stats.frames, 100);
    assert_eq!(stats.overrun_events, 0);
    assert_eq!(stats.decode_errors, 0);

    let state = engine.manager().state(5);
    assert_eq!(state.mid, 199.5);
    assert_eq!(state.last_update_ns, 99);
    // Price improved on every tick: each improvement contributes the full
    // new bid size (+10) and the rising ask withdraws the prior ask (-10
    // with inverted sign -> +10), 99 times each.
    assert_eq!(state.cumulative_ofi, 99.0 * 20.0);

    let _ = std::fs::remove_file(&name);
}

#[test]
fn trades_and_books_reach_their_indicators() {
    let name = unique_region("mixed");
    let mut writer = RingWriter::create(&name, RingConfig::default(), false).unwrap();
    let params = StrategyParams {
        vpin: shijim_signal::VpinConfig {
            bucket_volume: 10.0,
            window: 1,
        },
        ..StrategyParams::default()
    };
    let mut engine = StrategyEngine::attach(&name, StartMode::Beginning, &params).unwrap();

    writer
        .publish(&encode_trade(
            1_000_000_000,
            2,
            Some(Side::Buy),
            px(50.0),
            Some(Decimal::new(10, 0)),
        ))
        .unwrap();
    writer
        .publish(&encode_book(
            2_000_000_000,
            2,
            &[
                (MdEntryType::Bid, px(49.5), px(3.0)),
                (MdEntryType::Bid, px(49.0), px(9.0)),
                (MdEntryType::Ask, px(50.5), px(4.0)),
            ],
        ))
        .unwrap();

    assert_eq!(engine.poll(), 2);
    let state = engine.manager().state(2);
    assert_eq!(state.vpin(), Some(1.0), "one all-buy bucket");
    assert_eq!(state.mid, 50.0, "best levels 49.5/50.5");
    assert_eq!(state.spread, 1.0);

    let _ = std::fs::remove_file(&name);
}

#[test]
fn lapped_engine_counts_lost_frames_and_recovers() {
    let name = unique_region("overrun");
    let cfg = RingConfig::new(256, 64);
    let mut writer = RingWriter::create(&name, cfg, false).unwrap();
    let mut engine =
        StrategyEngine::attach(&name, StartMode::Beginning, &StrategyParams::default()).unwrap();

    // Publish three rings' worth without polling once.
    for i in 0..192u64 {
        let frame = encode_quote(i, 1, px(100.0), px(1.0), px(101.0), px(1.0));
        writer.publish(&frame).unwrap();
    }

    let applied = engine.poll();
    let stats = engine.stats();
    assert_eq!(stats.overrun_events, 1);
    // Skip-to-latest bypasses everything between the stale cursor and the
    // write position, so all 192 frames are accounted as lost.
    assert_eq!(stats.frames_lost, 192);
    assert_eq!(applied + stats.frames_lost, 192);

    // Back in sync afterwards.
    writer
        .publish(&encode_quote(500, 1, px(100.0), px(2.0), px(101.0), px(1.0)))
        .unwrap();
    assert_eq!(engine.poll(), 1);
    assert_eq!(engine.stats().overrun_events, 1);

    let _ = std::fs::remove_file(&name);
}

#[test]
fn undecodable_frame_is_counted_not_fatal() {
    let name = unique_region("garbage");
    let mut writer = RingWriter::create(&name, RingConfig::default(), false).unwrap();
    let mut engine =
        StrategyEngine::attach(&name, StartMode::Beginning, &StrategyParams::default()).unwrap();

    writer.publish(&[0xBA, 0xD0]).unwrap();
    writer
        .publish(&encode_quote(1, 1, px(100.0), px(1.0), px(101.0), px(1.0)))
        .unwrap();

    assert_eq!(engine.poll(), 1);
    let stats = engine.stats();
    assert_eq!(stats.decode_errors, 1);
    assert_eq!(stats.frames, 1);

    let _ = std::fs::remove_file(&name);
}
