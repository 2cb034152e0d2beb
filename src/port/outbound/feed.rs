//! Feed port for the liquidation stream.
//!
//! The transport decodes each frame into a [`Decoded`] value and hands it
//! over as a [`FeedEvent`]. Table rows stay as raw JSON values until the
//! reconciler knows which action they belong to: a `delete` row only
//! carries the order key, an `insert` row carries the full liquidation.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{DomainError, LiquidationEvent, OrderId, Side, Symbol};
use crate::error::Result;

/// Name of the only table the reconciler acts on.
pub const LIQUIDATION_TABLE: &str = "liquidation";

/// Table action announced by the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Initial snapshot sent once per subscription.
    Partial,
    /// New row.
    Insert,
    /// Amendment to an existing row.
    Update,
    /// Row removed.
    Delete,
    /// Anything else the feed may add later.
    Other(String),
}

impl Action {
    /// Parse the feed's action string.
    #[must_use]
    pub fn parse(action: &str) -> Self {
        match action {
            "partial" => Self::Partial,
            "insert" => Self::Insert,
            "update" => Self::Update,
            "delete" => Self::Delete,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Partial => "partial",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Other(other) => other,
        }
    }
}

/// A table data message: `{ "table", "action", "data": [...] }`.
#[derive(Debug, Clone, PartialEq)]
pub struct TableMessage {
    pub table: String,
    pub action: Action,
    pub data: Vec<Value>,
}

impl TableMessage {
    #[must_use]
    pub fn is_liquidation(&self) -> bool {
        self.table == LIQUIDATION_TABLE
    }
}

/// A well-formed message from the feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    /// Table data.
    Table(TableMessage),
    /// Top-level `error` field; fatal for the session.
    Error { message: String },
    /// Any other shape (welcome banner, subscription acks, ...).
    Ignored,
}

/// Result of decoding one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Message(FeedMessage),
    /// Frame could not be decoded; skip it.
    Malformed { reason: String },
}

/// Event yielded by a [`FeedStream`].
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Message(Decoded),
    /// The transport lost the connection.
    Disconnected { reason: String },
}

/// Row key carried by every action, including `delete`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderKey {
    #[serde(rename = "orderID")]
    pub order_id: String,
}

/// Full liquidation row carried by `insert` and `partial`.
#[derive(Debug, Clone, Deserialize)]
pub struct LiquidationRow {
    #[serde(rename = "orderID")]
    pub order_id: String,
    pub symbol: String,
    pub side: Side,
    pub price: Decimal,
    #[serde(rename = "leavesQty")]
    pub leaves_qty: u64,
}

impl LiquidationRow {
    /// Validate the row into a domain event.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] if the row violates an event invariant.
    pub fn into_event(self) -> std::result::Result<LiquidationEvent, DomainError> {
        LiquidationEvent::try_new(
            OrderId::new(self.order_id),
            Symbol::new(self.symbol),
            self.side,
            self.price,
            self.leaves_qty,
        )
    }
}

/// Decode one `data` entry into a row type.
///
/// # Errors
///
/// Returns the serde error when a field is missing or has the wrong type.
pub fn decode_row<T: DeserializeOwned>(value: &Value) -> std::result::Result<T, serde_json::Error> {
    T::deserialize(value)
}

/// Source of feed events.
///
/// Implementations own the connection. `next_event` returns `None` once
/// the stream has ended and will not produce more events.
#[async_trait]
pub trait FeedStream: Send {
    /// Establish the connection.
    async fn connect(&mut self) -> Result<()>;

    /// Subscribe to the given topics on the open connection.
    async fn subscribe(&mut self, topics: &[String]) -> Result<()>;

    /// Wait for the next event.
    async fn next_event(&mut self) -> Option<FeedEvent>;

    /// Feed name for logging.
    fn feed_name(&self) -> &'static str;
}
