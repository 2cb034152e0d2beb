//! Per-message pipeline: reconcile, flush, render, notify.
//!
//! The pipeline owns the [`Reconciler`] and drives its collaborators in a
//! fixed order for every message that confirms at least one liquidation:
//!
//! 1. decorate (inside the reconciler, store updated in memory)
//! 2. flush the store through the [`StatsRepository`]
//! 3. render and send each notification once
//!
//! Flush and send failures are logged and never stop the loop.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, warn};

use super::reconciler::Reconciler;
use crate::error::{Error, Result};
use crate::port::outbound::feed::{Decoded, FeedEvent, FeedStream};
use crate::port::outbound::notifier::Notifier;
use crate::port::outbound::stats::StatsRepository;

/// What happened to one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Liquidations confirmed by the reconciler.
    pub emitted: usize,
    /// Notifications the sink accepted.
    pub delivered: usize,
    /// Notifications the sink rejected.
    pub failed: usize,
    /// Whether the store flush succeeded (false when nothing was flushed).
    pub flushed: bool,
}

/// Drives one reconciler against a repository and a notifier.
pub struct Pipeline {
    reconciler: Reconciler,
    repository: Arc<dyn StatsRepository>,
    notifier: Arc<dyn Notifier>,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        reconciler: Reconciler,
        repository: Arc<dyn StatsRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            reconciler,
            repository,
            notifier,
        }
    }

    /// Handle one decoded frame observed at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] when the feed reported an error. Every
    /// other failure is logged and reflected in the [`Outcome`].
    pub async fn handle(&mut self, decoded: Decoded, now: Instant) -> Result<Outcome> {
        let message = match decoded {
            Decoded::Message(message) => message,
            Decoded::Malformed { reason } => {
                warn!(reason = %reason, "Skipping malformed feed message");
                self.reconciler.skip_message(now);
                return Ok(Outcome::default());
            }
        };

        let confirmed = self.reconciler.process(&message, now)?;
        if confirmed.is_empty() {
            return Ok(Outcome::default());
        }

        let flushed = match self.repository.save(self.reconciler.store()) {
            Ok(()) => true,
            Err(e) => {
                error!(
                    error = %e,
                    location = %self.repository.describe(),
                    "Failed to save statistics"
                );
                false
            }
        };

        let mut outcome = Outcome {
            emitted: confirmed.len(),
            flushed,
            ..Outcome::default()
        };

        for annotated in &confirmed {
            let text = annotated.to_string();
            match self.notifier.send(&text).await {
                Ok(()) => {
                    debug!(
                        order_id = %annotated.event().order_id(),
                        symbol = %annotated.event().symbol(),
                        sink = self.notifier.name(),
                        "Sent notification"
                    );
                    outcome.delivered += 1;
                }
                Err(e) => {
                    error!(
                        error = %e,
                        order_id = %annotated.event().order_id(),
                        text = %text,
                        "Failed to send notification"
                    );
                    outcome.failed += 1;
                }
            }
        }

        Ok(outcome)
    }

    /// Consume events from `feed` until the session ends.
    ///
    /// Always returns an error describing why the session ended: the
    /// transport disconnected, the stream finished, or the feed reported a
    /// protocol error.
    pub async fn run<S>(&mut self, feed: &mut S) -> Error
    where
        S: FeedStream + ?Sized,
    {
        loop {
            match feed.next_event().await {
                Some(FeedEvent::Message(decoded)) => {
                    if let Err(e) = self.handle(decoded, Instant::now()).await {
                        return e;
                    }
                }
                Some(FeedEvent::Disconnected { reason }) => {
                    debug!(reason = %reason, feed = feed.feed_name(), "Feed disconnected");
                    return Error::Connection(reason);
                }
                None => {
                    return Error::Connection(format!("{} stream ended", feed.feed_name()));
                }
            }
        }
    }

    #[must_use]
    pub const fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }
}
