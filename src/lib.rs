//! liqwatch - exchange liquidation feed watcher.
//!
//! Consumes the BitMEX realtime `liquidation` table, decides which inserts
//! are genuinely new liquidations, annotates each one with rolling
//! per-symbol statistics, and sends a one-line notification.
//!
//! # Architecture
//!
//! Hexagonal layout:
//!
//! - [`domain`] - Liquidation events, annotations, per-symbol statistics
//! - [`application`] - Dedup window, decorator, reconciler, pipeline
//! - [`port`] - Traits for the feed, the notifier and the statistics store
//! - [`adapter`] - BitMEX WebSocket feed, Telegram and log notifiers,
//!   JSON file and in-memory repositories, the CLI
//! - [`infrastructure`] - Configuration, reconnection, runtime wiring
//!
//! # Reconciliation
//!
//! The feed may announce one liquidation several times: an order can be
//! deleted and immediately re-inserted at a better price. A `delete` marks
//! the order ID as recently closed; an `insert` for a recently closed ID is
//! suppressed. IDs age out of the window after ten seconds by default.
//!
//! # Features
//!
//! - `telegram` (default) - Telegram notification sink
//! - `testkit` - Test helpers for integration tests
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//!
//! use liqwatch::application::{DedupWindow, Reconciler};
//! use liqwatch::domain::StatisticsStore;
//! use liqwatch::port::{Action, FeedMessage, TableMessage};
//! use serde_json::json;
//!
//! let mut reconciler = Reconciler::new(DedupWindow::default(), StatisticsStore::new());
//! let insert = FeedMessage::Table(TableMessage {
//!     table: "liquidation".into(),
//!     action: Action::Insert,
//!     data: vec![json!({
//!         "orderID": "a", "symbol": "XBTUSD", "side": "Sell",
//!         "price": 9876.5, "leavesQty": 50000
//!     })],
//! });
//!
//! let emitted = reconciler.process(&insert, Instant::now()).unwrap();
//! assert_eq!(emitted.len(), 1);
//! assert!(emitted[0].to_string().starts_with("New record! Liquidated long on XBTUSD"));
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
