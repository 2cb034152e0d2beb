//! Reconciliation properties over whole message sequences.

use std::time::{Duration, Instant};

use liqwatch::application::{DedupWindow, Reconciler};
use liqwatch::domain::{LiquidationEvent, OrderId, Side, StatisticsStore, Symbol, SymbolStats};
use liqwatch::error::ProtocolError;
use liqwatch::port::FeedMessage;
use liqwatch::testkit::feed::{delete, error, insert, insert_row, table, update};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

const WINDOW: Duration = Duration::from_secs(10);

fn reconciler() -> Reconciler {
    Reconciler::new(DedupWindow::new(WINDOW), StatisticsStore::new())
}

fn at(t0: Instant, millis: u64) -> Instant {
    t0 + Duration::from_millis(millis)
}

fn event(id: &str, symbol: &str, side: Side, price: Decimal, quantity: u64) -> LiquidationEvent {
    LiquidationEvent::try_new(OrderId::new(id), Symbol::new(symbol), side, price, quantity).unwrap()
}

fn fold(events: &[LiquidationEvent], symbol: &str) -> SymbolStats {
    let mut stats = SymbolStats::default();
    for e in events.iter().filter(|e| e.symbol().as_str() == symbol) {
        stats.apply(e);
    }
    stats
}

#[test]
fn reinsert_within_window_is_suppressed_at_every_gap() {
    for gap_ms in [0, 1, 500, 5_000, 9_999, 10_000] {
        let t0 = Instant::now();
        let mut r = reconciler();

        let first = r.process(&insert("X", "XBTUSD", "Buy", 100.0, 5), t0).unwrap();
        r.process(&delete("X"), at(t0, 100)).unwrap();
        let second = r
            .process(&insert("X", "XBTUSD", "Buy", 101.0, 5), at(t0, 100 + gap_ms))
            .unwrap();

        assert_eq!(first.len(), 1, "gap {gap_ms}ms");
        assert!(second.is_empty(), "gap {gap_ms}ms should be suppressed");
    }
}

#[test]
fn reinsert_after_window_is_notified() {
    for gap_ms in [10_001, 15_000, 3_600_000] {
        let t0 = Instant::now();
        let mut r = reconciler();

        r.process(&insert("X", "XBTUSD", "Buy", 100.0, 5), t0).unwrap();
        r.process(&delete("X"), t0).unwrap();
        let second = r
            .process(&insert("X", "XBTUSD", "Buy", 101.0, 5), at(t0, gap_ms))
            .unwrap();

        assert_eq!(second.len(), 1, "gap {gap_ms}ms should be a new event");
        assert_eq!(second[0].annotation().ordinal, 2);
    }
}

#[test]
fn updates_never_notify_and_never_touch_dedup_state() {
    let t0 = Instant::now();
    let mut r = reconciler();

    assert!(r.process(&update("U", 10.0), t0).unwrap().is_empty());
    assert!(r.window().is_empty());

    r.process(&delete("A"), t0).unwrap();
    r.process(&update("A", 11.0), t0).unwrap();
    assert_eq!(r.window().len(), 1);

    // An update does not clear a closed id either.
    assert!(r.process(&insert("A", "XBTUSD", "Sell", 11.0, 1), t0).unwrap().is_empty());
    assert!(r.store().is_empty());
}

#[test]
fn partial_snapshots_never_notify() {
    let t0 = Instant::now();
    let mut r = reconciler();
    let snapshot = table(
        "liquidation",
        "partial",
        vec![
            insert_row("P1", "XBTUSD", "Sell", 100.0, 10),
            insert_row("P2", "ETHUSD", "Buy", 3000.0, 20),
        ],
    );

    assert!(r.process(&snapshot, t0).unwrap().is_empty());
    assert!(r.store().is_empty());
}

#[test]
fn other_tables_leave_state_untouched() {
    let t0 = Instant::now();
    let mut r = reconciler();
    r.process(&insert("A", "XBTUSD", "Sell", 100.0, 50), t0).unwrap();
    r.process(&delete("A"), t0).unwrap();
    let store_before = r.store().clone();
    let window_before = r.window().len();

    for action in ["partial", "insert", "update", "delete"] {
        let msg = table(
            "trade",
            action,
            vec![insert_row("B", "XBTUSD", "Buy", 101.0, 7)],
        );
        assert!(r.process(&msg, at(t0, 1)).unwrap().is_empty());
    }

    assert_eq!(r.store(), &store_before);
    assert_eq!(r.window().len(), window_before);
}

#[test]
fn error_message_surfaces_and_emits_nothing() {
    let mut r = reconciler();
    let err = r
        .process(&error("Unknown or expired signature."), Instant::now())
        .unwrap_err();

    assert_eq!(
        err,
        ProtocolError::Api {
            message: "Unknown or expired signature.".into()
        }
    );
    assert!(r.store().is_empty());
}

#[test]
fn dedup_window_drains_regardless_of_size() {
    for n in [1usize, 10, 1_000] {
        let t0 = Instant::now();
        let mut r = reconciler();

        for i in 0..n {
            r.process(&delete(&format!("ord-{i}")), t0).unwrap();
        }
        assert_eq!(r.window().len(), n);

        for step in 1..=3u64 {
            r.process(&FeedMessage::Ignored, t0 + WINDOW * 2 * step as u32)
                .unwrap();
        }
        assert!(r.window().is_empty(), "n = {n}");
    }
}

#[test]
fn store_equals_fold_over_confirmed_events() {
    let t0 = Instant::now();
    let mut r = reconciler();

    let script: Vec<(u64, FeedMessage)> = vec![
        (0, insert("a", "XBTUSD", "Sell", 9876.5, 50_000)),
        (10, insert("b", "ETHUSD", "Buy", 3000.0, 20)),
        (20, delete("a")),
        (30, insert("a", "XBTUSD", "Sell", 9870.0, 40_000)),
        (40, update("b", 3001.0)),
        (50, insert("c", "XBTUSD", "Buy", 9900.0, 75_000)),
        (60, table("trade", "insert", vec![insert_row("d", "XBTUSD", "Sell", 1.0, 1)])),
        (70, delete("c")),
        (20_000, insert("c", "XBTUSD", "Buy", 9910.0, 1_000)),
        (20_010, insert("e", "ETHUSD", "Sell", 2999.5, 5)),
    ];

    for (ms, msg) in &script {
        r.process(msg, at(t0, *ms)).unwrap();
    }

    let confirmed = vec![
        event("a", "XBTUSD", Side::Sell, dec!(9876.5), 50_000),
        event("b", "ETHUSD", Side::Buy, dec!(3000), 20),
        event("c", "XBTUSD", Side::Buy, dec!(9900), 75_000),
        event("c", "XBTUSD", Side::Buy, dec!(9910), 1_000),
        event("e", "ETHUSD", Side::Sell, dec!(2999.5), 5),
    ];

    for symbol in ["XBTUSD", "ETHUSD"] {
        assert_eq!(
            r.store().get(&Symbol::new(symbol)),
            Some(&fold(&confirmed, symbol)),
            "{symbol}"
        );
    }
    assert_eq!(r.store().len(), 2);
    assert_eq!(r.stats().emitted, 5);
    assert_eq!(r.stats().suppressed, 1);
}

#[test]
fn walkthrough_from_insert_to_late_reinsert() {
    let t0 = Instant::now();
    let mut r = reconciler();
    let btc = Symbol::new("BTC");

    let first = r.process(&insert("A", "BTC", "Sell", 100.0, 50), t0).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(r.store().get(&btc).unwrap().count, 1);

    assert!(r.process(&delete("A"), at(t0, 1_000)).unwrap().is_empty());

    let before = r.store().clone();
    assert!(r
        .process(&insert("A", "BTC", "Sell", 98.0, 30), at(t0, 2_000))
        .unwrap()
        .is_empty());
    assert_eq!(r.store(), &before);

    let late = r
        .process(&insert("A", "BTC", "Sell", 95.0, 10), at(t0, 12_000))
        .unwrap();
    assert_eq!(late.len(), 1);

    let stats = r.store().get(&btc).unwrap();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.total_quantity, 60);
    assert_eq!(stats.total_notional, dec!(5950));
}

#[test]
fn malformed_rows_do_not_block_the_rest_of_the_message() {
    let mut r = reconciler();
    let msg = table(
        "liquidation",
        "insert",
        vec![
            json!({ "orderID": "bad", "symbol": "XBTUSD" }),
            insert_row("zero", "XBTUSD", "Sell", 100.0, 0),
            insert_row("good", "XBTUSD", "Sell", 100.0, 3),
        ],
    );

    let emitted = r.process(&msg, Instant::now()).unwrap();

    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].event().order_id().as_str(), "good");
    assert_eq!(r.stats().malformed_rows, 2);
}

#[test]
fn notification_text_carries_the_annotation() {
    let t0 = Instant::now();
    let mut r = reconciler();

    r.process(&insert("a", "XBTUSD", "Sell", 9876.5, 50_000), t0).unwrap();
    let second = r
        .process(&insert("b", "XBTUSD", "Buy", 9877.0, 1_200), at(t0, 1))
        .unwrap();

    assert_eq!(
        second[0].to_string(),
        "Liquidated short on XBTUSD: Buy 1,200 @ 9877 (#2, rank 2 of 2 recent, 51,200 total)"
    );
}
