//! BitMEX realtime WebSocket message types.
//!
//! Every text frame is a single JSON object. Table data looks like
//!
//! ```json
//! {"table":"liquidation","action":"insert","data":[{"orderID":"...","symbol":"XBTUSD","side":"Sell","price":9876.5,"leavesQty":1200}]}
//! ```
//!
//! and failures look like `{"error":"..."}`. The server also sends a welcome
//! banner and subscription acknowledgements which carry neither key.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::port::{Action, Decoded, FeedMessage, TableMessage};

/// Subscription request: `{"op":"subscribe","args":["liquidation"]}`.
#[derive(Debug, Serialize)]
pub struct SubscribeMessage {
    pub op: &'static str,
    pub args: Vec<String>,
}

impl SubscribeMessage {
    #[must_use]
    pub fn new(topics: Vec<String>) -> Self {
        Self {
            op: "subscribe",
            args: topics,
        }
    }
}

/// Decode one text frame.
///
/// Never fails: frames that cannot be understood come back as
/// [`Decoded::Malformed`] and shapes that carry nothing of interest as
/// [`FeedMessage::Ignored`].
#[must_use]
pub fn decode_frame(text: &str) -> Decoded {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            return Decoded::Malformed {
                reason: format!("invalid JSON: {e}"),
            }
        }
    };

    let Value::Object(mut object) = value else {
        return Decoded::Message(FeedMessage::Ignored);
    };

    if let Some(error) = object.remove("error") {
        let message = match error {
            Value::String(s) => s,
            other => other.to_string(),
        };
        return Decoded::Message(FeedMessage::Error { message });
    }

    match object.remove("table") {
        Some(Value::String(table)) => decode_table(table, object),
        Some(other) => Decoded::Malformed {
            reason: format!("table is not a string: {other}"),
        },
        None => Decoded::Message(FeedMessage::Ignored),
    }
}

fn decode_table(table: String, mut object: Map<String, Value>) -> Decoded {
    let action = match object.remove("action") {
        Some(Value::String(action)) => Action::parse(&action),
        Some(_) => {
            return Decoded::Malformed {
                reason: format!("{table}: action is not a string"),
            }
        }
        None => {
            return Decoded::Malformed {
                reason: format!("{table}: missing action"),
            }
        }
    };

    let data = match object.remove("data") {
        Some(Value::Array(data)) => data,
        Some(_) => {
            return Decoded::Malformed {
                reason: format!("{table}: data is not an array"),
            }
        }
        None => {
            return Decoded::Malformed {
                reason: format!("{table}: missing data"),
            }
        }
    };

    Decoded::Message(FeedMessage::Table(TableMessage {
        table,
        action,
        data,
    }))
}
