//! Reconnecting wrapper for [`FeedStream`].
//!
//! Provides automatic reconnection with exponential backoff and circuit
//! breaker protection for any [`FeedStream`] implementation. The wrapper
//! hides disconnections from the pipeline and resubscribes to the tracked
//! topics, so the reconciler state survives a dropped connection.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::infrastructure::config::reconnection::ReconnectionConfig;
use crate::port::{FeedEvent, FeedStream};

/// Circuit breaker state for connection attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CircuitState {
    /// Normal operation; connections are allowed.
    Closed,
    /// Too many consecutive failures; connections blocked until cooldown expires.
    Open {
        /// Instant when the circuit breaker will transition back to Closed.
        until: Instant,
    },
}

/// Wrapper that adds automatic reconnection to any [`FeedStream`].
///
/// On disconnect it:
/// 1. Waits with exponential backoff
/// 2. Reconnects
/// 3. Resubscribes to all previously requested topics
///
/// A circuit breaker trips after too many consecutive failures.
pub struct ReconnectingFeed<S: FeedStream> {
    inner: S,
    config: ReconnectionConfig,
    /// Topics to resubscribe after reconnection.
    topics: Vec<String>,
    consecutive_failures: u32,
    /// Current backoff delay in milliseconds.
    current_delay_ms: u64,
    circuit_state: CircuitState,
    connected: bool,
    /// Completed reconnections since construction.
    reconnects: u64,
}

impl<S: FeedStream> ReconnectingFeed<S> {
    /// Create a new reconnecting wrapper around a feed.
    ///
    /// The wrapper starts in a disconnected state; call
    /// [`connect`](FeedStream::connect) before reading events.
    pub fn new(inner: S, config: ReconnectionConfig) -> Self {
        let initial_delay = config.initial_delay_ms;
        Self {
            inner,
            config,
            topics: Vec::new(),
            consecutive_failures: 0,
            current_delay_ms: initial_delay,
            circuit_state: CircuitState::Closed,
            connected: false,
            reconnects: 0,
        }
    }

    /// Number of successful reconnections so far.
    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn reset_backoff(&mut self) {
        self.consecutive_failures = 0;
        self.current_delay_ms = self.config.initial_delay_ms;
        self.circuit_state = CircuitState::Closed;
    }

    /// Return the current delay plus jitter and advance the delay for the
    /// next call.
    fn next_delay(&mut self) -> Duration {
        let base_delay = Duration::from_millis(self.current_delay_ms);
        let jitter_ms = self.jitter_ms(base_delay);
        let delay = base_delay + Duration::from_millis(jitter_ms);

        let next_delay = (self.current_delay_ms as f64 * self.config.backoff_multiplier) as u64;
        self.current_delay_ms = next_delay.min(self.config.max_delay_ms);

        delay
    }

    /// Up to 20% of `base_delay`.
    fn jitter_ms(&self, base_delay: Duration) -> u64 {
        let jitter_range_ms = (base_delay.as_millis() as u64) / 5;
        if jitter_range_ms == 0 {
            return 0;
        }

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        (nanos as u64) % (jitter_range_ms + 1)
    }

    /// True if the circuit is closed or has cooled down. Closes the circuit
    /// once the cooldown has expired.
    fn circuit_allows_connection(&mut self) -> bool {
        match self.circuit_state {
            CircuitState::Closed => true,
            CircuitState::Open { until } => {
                if Instant::now() >= until {
                    info!("Circuit breaker cooldown expired, allowing reconnection");
                    self.circuit_state = CircuitState::Closed;
                    self.reset_backoff();
                    true
                } else {
                    false
                }
            }
        }
    }

    fn record_failure(&mut self) {
        self.consecutive_failures += 1;
        self.connected = false;

        if self.consecutive_failures >= self.config.max_consecutive_failures {
            let cooldown = Duration::from_millis(self.config.circuit_breaker_cooldown_ms);
            let until = Instant::now() + cooldown;
            self.circuit_state = CircuitState::Open { until };
            error!(
                failures = self.consecutive_failures,
                cooldown_secs = cooldown.as_secs(),
                "Circuit breaker tripped, pausing reconnection attempts"
            );
        }
    }

    /// Wait out the backoff, then reconnect and resubscribe.
    async fn reconnect(&mut self) -> Result<(), Error> {
        if !self.circuit_allows_connection() {
            if let CircuitState::Open { until } = self.circuit_state {
                let remaining = until.saturating_duration_since(Instant::now());
                warn!(
                    remaining_secs = remaining.as_secs(),
                    "Circuit breaker open, waiting for cooldown"
                );
                sleep(remaining).await;
                self.circuit_state = CircuitState::Closed;
                self.reset_backoff();
            }
        }

        let delay = self.next_delay();
        info!(
            delay_ms = delay.as_millis() as u64,
            attempt = self.consecutive_failures + 1,
            feed = self.inner.feed_name(),
            "Reconnecting after delay"
        );
        sleep(delay).await;

        match self.inner.connect().await {
            Ok(()) => {
                self.connected = true;

                if !self.topics.is_empty() {
                    debug!(topics = ?self.topics, "Resubscribing to topics");
                    if let Err(err) = self.inner.subscribe(&self.topics).await {
                        error!(error = %err, "Resubscribe failed after reconnect");
                        self.record_failure();
                        return Err(err);
                    }
                }

                self.reconnects += 1;
                info!(reconnects = self.reconnects, "Reconnected successfully");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Reconnection failed");
                self.record_failure();
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<S: FeedStream> FeedStream for ReconnectingFeed<S> {
    async fn connect(&mut self) -> Result<(), Error> {
        let result = self.inner.connect().await;
        if result.is_ok() {
            self.connected = true;
            self.reset_backoff();
        }
        result
    }

    async fn subscribe(&mut self, topics: &[String]) -> Result<(), Error> {
        self.topics = topics.to_vec();
        self.inner.subscribe(topics).await
    }

    async fn next_event(&mut self) -> Option<FeedEvent> {
        loop {
            if !self.connected {
                if let Err(e) = self.reconnect().await {
                    warn!(error = %e, "Reconnection attempt failed, will retry");
                    continue;
                }
            }

            match self.inner.next_event().await {
                Some(FeedEvent::Disconnected { reason }) => {
                    warn!(reason = %reason, "Connection lost, will reconnect");
                    self.record_failure();
                    continue;
                }
                Some(event) => {
                    if self.consecutive_failures > 0 {
                        debug!("Received event after reconnection, resetting failure count");
                        self.reset_backoff();
                    }
                    return Some(event);
                }
                None => {
                    warn!("Feed ended unexpectedly, will reconnect");
                    self.record_failure();
                    continue;
                }
            }
        }
    }

    fn feed_name(&self) -> &'static str {
        self.inner.feed_name()
    }
}
