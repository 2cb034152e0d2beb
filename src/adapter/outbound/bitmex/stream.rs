//! BitMEX realtime WebSocket stream.
//!
//! Owns one connection at a time and multiplexes three things on the
//! calling task:
//!
//! - inbound frames (decoded with [`decode_frame`]),
//! - keep-alive pings every `ping_interval`,
//! - the read deadline, pushed back on every received frame.
//!
//! All writes (subscribe, ping, pong) happen from the task that reads, so
//! control frames never race each other on the sink.
//!
//! The stream does not reconnect. A dead connection is reported once as
//! [`FeedEvent::Disconnected`]; after that `next_event` returns `None`
//! until `connect` is called again.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{interval_at, sleep_until, timeout, Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

use super::dto::message::{decode_frame, SubscribeMessage};
use super::settings::BitmexConfig;
use crate::error::{Error, Result};
use crate::port::{FeedEvent, FeedStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Live connection state.
struct Connection {
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
    ping: Interval,
    deadline: Instant,
}

/// Liquidation feed backed by the BitMEX realtime API.
pub struct BitmexFeedStream {
    config: BitmexConfig,
    conn: Option<Connection>,
}

impl BitmexFeedStream {
    #[must_use]
    pub const fn new(config: BitmexConfig) -> Self {
        Self { config, conn: None }
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.conn.is_some()
    }
}

#[async_trait]
impl FeedStream for BitmexFeedStream {
    async fn connect(&mut self) -> Result<()> {
        let url = self.config.url()?;
        info!(url = %url, "Connecting to WebSocket");

        let (ws_stream, response) =
            match timeout(self.config.connect_timeout(), connect_async(url.as_str())).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(Error::Connection(format!(
                        "connect timed out after {}s",
                        self.config.connect_timeout_secs
                    )))
                }
            };

        info!(status = %response.status(), "WebSocket connected");

        let (write, read) = ws_stream.split();
        let period = self.config.ping_interval();
        let mut ping = interval_at(Instant::now() + period, period);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.conn = Some(Connection {
            write,
            read,
            ping,
            deadline: Instant::now() + self.config.read_timeout(),
        });
        Ok(())
    }

    async fn subscribe(&mut self, topics: &[String]) -> Result<()> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| Error::Connection("Not connected".into()))?;

        let msg = SubscribeMessage::new(topics.to_vec());
        let json = serde_json::to_string(&msg)?;

        info!(topics = ?topics, "Subscribing to topics");
        send_frame(&mut conn.write, Message::Text(json), self.config.write_timeout())
            .await
            .map_err(Error::Connection)
    }

    async fn next_event(&mut self) -> Option<FeedEvent> {
        let conn = self.conn.as_mut()?;
        let event = read_next(conn, &self.config).await;
        if matches!(event, FeedEvent::Disconnected { .. }) {
            self.conn = None;
        }
        Some(event)
    }

    fn feed_name(&self) -> &'static str {
        "BitMEX"
    }
}

async fn read_next(conn: &mut Connection, config: &BitmexConfig) -> FeedEvent {
    loop {
        tokio::select! {
            frame = conn.read.next() => {
                conn.deadline = Instant::now() + config.read_timeout();
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        trace!(bytes = text.len(), "Received WebSocket text frame");
                        return FeedEvent::Message(decode_frame(&text));
                    }
                    Some(Ok(Message::Ping(data))) => {
                        trace!("Received WebSocket ping");
                        if let Err(reason) =
                            send_frame(&mut conn.write, Message::Pong(data), config.write_timeout()).await
                        {
                            return FeedEvent::Disconnected { reason };
                        }
                    }
                    Some(Ok(Message::Pong(_))) => trace!("Received WebSocket pong"),
                    Some(Ok(Message::Close(frame))) => {
                        info!(frame = ?frame, "WebSocket closed by server");
                        return FeedEvent::Disconnected {
                            reason: frame
                                .map(|f| f.reason.to_string())
                                .unwrap_or_else(|| "closed by server".into()),
                        };
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!(error = %e, "WebSocket error");
                        return FeedEvent::Disconnected { reason: e.to_string() };
                    }
                    None => {
                        return FeedEvent::Disconnected {
                            reason: "stream ended".into(),
                        };
                    }
                }
            }
            _ = conn.ping.tick() => {
                debug!("Sending keep-alive ping");
                if let Err(reason) =
                    send_frame(&mut conn.write, Message::Ping(Vec::new()), config.write_timeout()).await
                {
                    return FeedEvent::Disconnected { reason };
                }
            }
            () = sleep_until(conn.deadline) => {
                warn!(timeout_secs = config.read_timeout_secs, "No frames received within read timeout");
                return FeedEvent::Disconnected {
                    reason: format!("read timed out after {}s", config.read_timeout_secs),
                };
            }
        }
    }
}

async fn send_frame(
    write: &mut SplitSink<WsStream, Message>,
    frame: Message,
    limit: Duration,
) -> std::result::Result<(), String> {
    match timeout(limit, write.send(frame)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("write timed out after {}s", limit.as_secs())),
    }
}
