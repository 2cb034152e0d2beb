//! Feed message builders and a scripted [`FeedStream`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::Result;
use crate::port::{Action, Decoded, FeedEvent, FeedMessage, FeedStream, TableMessage};

// ---------------------------------------------------------------------------
// Message builders
// ---------------------------------------------------------------------------

/// Table message with raw rows.
pub fn table(name: &str, action: &str, data: Vec<Value>) -> FeedMessage {
    FeedMessage::Table(TableMessage {
        table: name.to_string(),
        action: Action::parse(action),
        data,
    })
}

/// A full liquidation row as the feed sends it.
pub fn insert_row(order_id: &str, symbol: &str, side: &str, price: f64, quantity: u64) -> Value {
    json!({
        "orderID": order_id,
        "symbol": symbol,
        "side": side,
        "price": price,
        "leavesQty": quantity,
    })
}

/// Single-row liquidation `insert`.
pub fn insert(order_id: &str, symbol: &str, side: &str, price: f64, quantity: u64) -> FeedMessage {
    table(
        "liquidation",
        "insert",
        vec![insert_row(order_id, symbol, side, price, quantity)],
    )
}

/// Single-row liquidation `delete`, keyed by order ID only.
pub fn delete(order_id: &str) -> FeedMessage {
    table("liquidation", "delete", vec![json!({ "orderID": order_id })])
}

/// Single-row liquidation `update` carrying a new price.
pub fn update(order_id: &str, price: f64) -> FeedMessage {
    table(
        "liquidation",
        "update",
        vec![json!({ "orderID": order_id, "price": price })],
    )
}

/// Top-level error reply.
pub fn error(message: &str) -> FeedMessage {
    FeedMessage::Error {
        message: message.to_string(),
    }
}

/// Wrap a message as a decoded feed event.
pub fn message(message: FeedMessage) -> FeedEvent {
    FeedEvent::Message(Decoded::Message(message))
}

pub fn malformed(reason: &str) -> FeedEvent {
    FeedEvent::Message(Decoded::Malformed {
        reason: reason.to_string(),
    })
}

pub fn disconnected(reason: &str) -> FeedEvent {
    FeedEvent::Disconnected {
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// ScriptedFeed
// ---------------------------------------------------------------------------

/// A feed with scripted connect/subscribe results and a fixed event queue.
///
/// Each call to `connect()` or `subscribe()` pops the next result from the
/// corresponding queue (defaults to `Ok(())` when exhausted). A `None`
/// entry in the event queue, or an exhausted queue, ends the stream.
pub struct ScriptedFeed {
    connect_results: VecDeque<Result<()>>,
    subscribe_results: VecDeque<Result<()>>,
    events: VecDeque<Option<FeedEvent>>,
    connect_count: Arc<AtomicU32>,
    subscribe_count: Arc<AtomicU32>,
    subscribed: Vec<String>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self {
            connect_results: VecDeque::new(),
            subscribe_results: VecDeque::new(),
            events: VecDeque::new(),
            connect_count: Arc::new(AtomicU32::new(0)),
            subscribe_count: Arc::new(AtomicU32::new(0)),
            subscribed: Vec::new(),
        }
    }

    pub fn with_connect_results(mut self, results: Vec<Result<()>>) -> Self {
        self.connect_results = results.into();
        self
    }

    pub fn with_subscribe_results(mut self, results: Vec<Result<()>>) -> Self {
        self.subscribe_results = results.into();
        self
    }

    pub fn with_events(mut self, events: Vec<Option<FeedEvent>>) -> Self {
        self.events = events.into();
        self
    }

    /// Queue each message as a decoded event.
    pub fn with_messages(mut self, messages: Vec<FeedMessage>) -> Self {
        self.events = messages.into_iter().map(|m| Some(message(m))).collect();
        self
    }

    /// Shared counters for asserting connect/subscribe call counts.
    pub fn counts(&self) -> (Arc<AtomicU32>, Arc<AtomicU32>) {
        (self.connect_count.clone(), self.subscribe_count.clone())
    }

    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }

    /// Topics from the most recent `subscribe` call.
    pub fn subscribed(&self) -> &[String] {
        &self.subscribed
    }
}

impl Default for ScriptedFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedStream for ScriptedFeed {
    async fn connect(&mut self) -> Result<()> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        self.connect_results.pop_front().unwrap_or(Ok(()))
    }

    async fn subscribe(&mut self, topics: &[String]) -> Result<()> {
        self.subscribe_count.fetch_add(1, Ordering::SeqCst);
        self.subscribed = topics.to_vec();
        self.subscribe_results.pop_front().unwrap_or(Ok(()))
    }

    async fn next_event(&mut self) -> Option<FeedEvent> {
        self.events.pop_front().flatten()
    }

    fn feed_name(&self) -> &'static str {
        "scripted"
    }
}
