//! Event reconciler: the per-message state machine.
//!
//! The liquidation table may announce the same forced order several times:
//!
//! ```text
//! insert ..... update ..... delete/insert ..... update ..... delete/insert ..... delete
//! ```
//!
//! `insert` is sent when the order is submitted, `delete` when it executes
//! or is pulled, `update` when it is amended or partially filled. A
//! `delete` followed by an `insert` of the same id is the exchange
//! re-pricing one liquidation, not a second one. Only inserts for ids not
//! closed within the dedup window are reported.

use std::time::Instant;

use serde_json::Value;
use tracing::{debug, error, trace, warn};

use super::decorator::decorate;
use super::dedup::DedupWindow;
use crate::domain::{AnnotatedLiquidation, LiquidationEvent, OrderId, StatisticsStore};
use crate::error::ProtocolError;
use crate::port::outbound::feed::{
    decode_row, Action, FeedMessage, LiquidationRow, OrderKey, TableMessage,
};

/// Counters describing what the reconciler has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcilerStats {
    /// Messages processed, of any kind.
    pub messages: u64,
    /// Liquidations decorated and emitted.
    pub emitted: u64,
    /// Inserts suppressed as re-announcements.
    pub suppressed: u64,
    /// Order ids recorded as closed.
    pub closed: u64,
    /// Rows skipped because they could not be decoded.
    pub malformed_rows: u64,
    /// Frames skipped because they were not valid messages.
    pub malformed_messages: u64,
    /// Messages ignored (other tables, unknown shapes, unknown actions).
    pub ignored: u64,
}

/// Consumes feed messages one at a time and yields confirmed liquidations.
///
/// Owns the dedup window and the statistics store; nothing else mutates
/// either while the reconciler is alive.
#[derive(Debug)]
pub struct Reconciler {
    window: DedupWindow,
    store: StatisticsStore,
    stats: ReconcilerStats,
}

impl Reconciler {
    #[must_use]
    pub fn new(window: DedupWindow, store: StatisticsStore) -> Self {
        Self {
            window,
            store,
            stats: ReconcilerStats::default(),
        }
    }

    /// Process one message observed at `now`.
    ///
    /// Returns the liquidations to notify, in row order. The dedup window
    /// is purged first on every call.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] when the message carries a top-level
    /// `error`; the session should be torn down.
    pub fn process(
        &mut self,
        message: &FeedMessage,
        now: Instant,
    ) -> Result<Vec<AnnotatedLiquidation>, ProtocolError> {
        self.tick(now);

        match message {
            FeedMessage::Error { message } => {
                error!(error = %message, "Feed reported an error");
                Err(ProtocolError::Api {
                    message: message.clone(),
                })
            }
            FeedMessage::Ignored => {
                self.stats.ignored += 1;
                Ok(Vec::new())
            }
            FeedMessage::Table(table) if !table.is_liquidation() => {
                debug!(table = %table.table, action = table.action.as_str(), "Ignoring table");
                self.stats.ignored += 1;
                Ok(Vec::new())
            }
            FeedMessage::Table(table) => Ok(self.process_liquidation(table, now)),
        }
    }

    /// Count a message that could not be decoded and purge the dedup window.
    pub fn skip_message(&mut self, now: Instant) {
        self.tick(now);
        self.stats.malformed_messages += 1;
    }

    fn tick(&mut self, now: Instant) {
        self.stats.messages += 1;

        let purged = self.window.purge(now);
        if purged > 0 {
            trace!(purged, remaining = self.window.len(), "Purged dedup window");
        }
    }

    fn process_liquidation(&mut self, table: &TableMessage, now: Instant) -> Vec<AnnotatedLiquidation> {
        match &table.action {
            Action::Partial => {
                debug!(rows = table.data.len(), "Ignoring liquidation snapshot");
                Vec::new()
            }
            Action::Update => {
                // Amendments never re-trigger a notification.
                debug!(rows = table.data.len(), "Ignoring liquidation update");
                Vec::new()
            }
            Action::Delete => {
                self.close_orders(&table.data, now);
                Vec::new()
            }
            Action::Insert => self.confirm_inserts(&table.data, now),
            Action::Other(action) => {
                warn!(action = %action, "Ignoring unknown liquidation action");
                self.stats.ignored += 1;
                Vec::new()
            }
        }
    }

    fn close_orders(&mut self, rows: &[Value], now: Instant) {
        for row in rows {
            match decode_row::<OrderKey>(row) {
                Ok(key) if !key.order_id.is_empty() => {
                    trace!(order_id = %key.order_id, "Order closed");
                    self.window.mark_closed(OrderId::new(key.order_id), now);
                    self.stats.closed += 1;
                }
                Ok(_) => self.skip_malformed(&Action::Delete, row, "empty orderID"),
                Err(e) => self.skip_malformed(&Action::Delete, row, &e.to_string()),
            }
        }
    }

    fn confirm_inserts(&mut self, rows: &[Value], now: Instant) -> Vec<AnnotatedLiquidation> {
        let mut confirmed = Vec::new();

        for row in rows {
            let event = match Self::decode_event(row) {
                Ok(event) => event,
                Err(reason) => {
                    self.skip_malformed(&Action::Insert, row, &reason);
                    continue;
                }
            };

            if self.window.is_recently_closed(event.order_id(), now) {
                debug!(
                    order_id = %event.order_id(),
                    symbol = %event.symbol(),
                    price = %event.price(),
                    quantity = event.quantity(),
                    "Suppressed re-insert of recently closed order"
                );
                self.stats.suppressed += 1;
                continue;
            }

            confirmed.push(decorate(event, &mut self.store));
            self.stats.emitted += 1;
        }

        confirmed
    }

    fn decode_event(row: &Value) -> Result<LiquidationEvent, String> {
        let row: LiquidationRow = decode_row(row).map_err(|e| e.to_string())?;
        row.into_event().map_err(|e| e.to_string())
    }

    fn skip_malformed(&mut self, action: &Action, row: &Value, reason: &str) {
        warn!(
            action = action.as_str(),
            reason,
            row = %row,
            "Skipping malformed liquidation row"
        );
        self.stats.malformed_rows += 1;
    }

    /// The dedup window.
    #[must_use]
    pub const fn window(&self) -> &DedupWindow {
        &self.window
    }

    /// The statistics store as of the last processed message.
    #[must_use]
    pub const fn store(&self) -> &StatisticsStore {
        &self.store
    }

    #[must_use]
    pub const fn stats(&self) -> &ReconcilerStats {
        &self.stats
    }

    /// Consume the reconciler and return its store.
    #[must_use]
    pub fn into_store(self) -> StatisticsStore {
        self.store
    }
}
