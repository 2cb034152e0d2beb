//! Dedup window for delete/re-insert pairs.
//!
//! The exchange may pull a liquidation order and insert it again under the
//! same id at a revised price. Remembering recently deleted ids for a short
//! window lets the reconciler recognise the re-insert as the same
//! liquidation. This is a heuristic: an id that reappears after the window
//! is treated as a new order.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::domain::OrderId;

/// Suppression window used when none is configured.
pub const DEFAULT_SUPPRESSION_WINDOW: Duration = Duration::from_secs(10);

/// Order ids whose `delete` was seen within the window.
///
/// Memory is bounded by the number of deletes in the last `window`, as long
/// as [`purge`](Self::purge) runs once per processed message.
#[derive(Debug, Clone)]
pub struct DedupWindow {
    window: Duration,
    closed: HashMap<OrderId, Instant>,
}

impl DedupWindow {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            closed: HashMap::new(),
        }
    }

    /// Configured suppression window.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Record that `order_id` was closed at `now`.
    ///
    /// A later delete for the same id refreshes the timestamp.
    pub fn mark_closed(&mut self, order_id: OrderId, now: Instant) {
        self.closed.insert(order_id, now);
    }

    /// True if `order_id` was closed no more than `window` before `now`.
    ///
    /// Entries past the window never match, even before they are purged.
    #[must_use]
    pub fn is_recently_closed(&self, order_id: &OrderId, now: Instant) -> bool {
        self.closed
            .get(order_id)
            .is_some_and(|&closed_at| !self.expired(closed_at, now))
    }

    /// Drop every entry older than the window. Returns how many were removed.
    pub fn purge(&mut self, now: Instant) -> usize {
        let before = self.closed.len();
        let window = self.window;
        self.closed
            .retain(|_, &mut closed_at| now.saturating_duration_since(closed_at) <= window);
        before - self.closed.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.closed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.closed.is_empty()
    }

    fn expired(&self, closed_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(closed_at) > self.window
    }
}

impl Default for DedupWindow {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPRESSION_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn marks_and_matches_within_window() {
        let t0 = Instant::now();
        let mut window = DedupWindow::default();
        window.mark_closed(OrderId::from("a"), t0);

        assert!(window.is_recently_closed(&OrderId::from("a"), t0 + secs(5)));
        assert!(window.is_recently_closed(&OrderId::from("a"), t0 + secs(10)));
        assert!(!window.is_recently_closed(&OrderId::from("b"), t0));
    }

    #[test]
    fn stale_entry_does_not_match_before_purge() {
        let t0 = Instant::now();
        let mut window = DedupWindow::new(secs(10));
        window.mark_closed(OrderId::from("a"), t0);

        assert!(!window.is_recently_closed(&OrderId::from("a"), t0 + secs(11)));
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn purge_removes_only_expired_entries() {
        let t0 = Instant::now();
        let mut window = DedupWindow::new(secs(10));
        window.mark_closed(OrderId::from("old"), t0);
        window.mark_closed(OrderId::from("new"), t0 + secs(8));

        let removed = window.purge(t0 + secs(12));

        assert_eq!(removed, 1);
        assert_eq!(window.len(), 1);
        assert!(window.is_recently_closed(&OrderId::from("new"), t0 + secs(12)));
    }

    #[test]
    fn repeated_delete_refreshes_timestamp() {
        let t0 = Instant::now();
        let mut window = DedupWindow::new(secs(10));
        window.mark_closed(OrderId::from("a"), t0);
        window.mark_closed(OrderId::from("a"), t0 + secs(9));

        window.purge(t0 + secs(15));
        assert!(window.is_recently_closed(&OrderId::from("a"), t0 + secs(15)));
        assert_eq!(window.len(), 1);
    }

    #[test]
    fn purge_empties_window_after_it_elapses() {
        let t0 = Instant::now();
        let mut window = DedupWindow::new(secs(10));
        for i in 0..1_000 {
            window.mark_closed(OrderId::new(format!("ord-{i}")), t0);
        }

        window.purge(t0 + secs(11));
        assert!(window.is_empty());
    }
}
