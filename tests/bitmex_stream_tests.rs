//! BitMEX stream against a local WebSocket server.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use liqwatch::adapter::outbound::bitmex::{BitmexConfig, BitmexFeedStream};
use liqwatch::port::{Action, Decoded, FeedEvent, FeedMessage, FeedStream};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;

fn local_config(addr: SocketAddr) -> BitmexConfig {
    BitmexConfig {
        scheme: "ws".into(),
        host: addr.to_string(),
        ping_interval_secs: 30,
        read_timeout_secs: 2,
        connect_timeout_secs: 2,
        write_timeout_secs: 2,
        ..BitmexConfig::default()
    }
}

/// Accept one connection, forward the first text frame the client sends,
/// then play `frames` and close.
async fn serve_once(frames: Vec<String>) -> (SocketAddr, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();

        while let Some(Ok(frame)) = ws.next().await {
            if let Message::Text(text) = frame {
                let _ = tx.send(text);
                break;
            }
        }

        for frame in frames {
            ws.send(Message::Text(frame)).await.unwrap();
        }
        let _ = ws.close(None).await;
    });

    (addr, rx)
}

#[tokio::test]
async fn subscribes_and_decodes_frames_until_close() {
    let (addr, subscription) = serve_once(vec![
        r#"{"info":"Welcome to the BitMEX Realtime API.","version":"2.0"}"#.into(),
        r#"{"success":true,"subscribe":"liquidation"}"#.into(),
        r#"{"table":"liquidation","action":"insert","data":[{"orderID":"abc","symbol":"XBTUSD","side":"Sell","price":9876.5,"leavesQty":1200}]}"#.into(),
        "not json".into(),
    ])
    .await;

    let mut stream = BitmexFeedStream::new(local_config(addr));
    stream.connect().await.unwrap();
    assert!(stream.is_connected());
    stream.subscribe(&["liquidation".into()]).await.unwrap();

    let sent: Value = serde_json::from_str(&subscription.await.unwrap()).unwrap();
    assert_eq!(sent["op"], "subscribe");
    assert_eq!(sent["args"][0], "liquidation");

    let welcome = stream.next_event().await.unwrap();
    assert_eq!(
        welcome,
        FeedEvent::Message(Decoded::Message(FeedMessage::Ignored))
    );
    let ack = stream.next_event().await.unwrap();
    assert_eq!(ack, FeedEvent::Message(Decoded::Message(FeedMessage::Ignored)));

    match stream.next_event().await.unwrap() {
        FeedEvent::Message(Decoded::Message(FeedMessage::Table(table))) => {
            assert!(table.is_liquidation());
            assert_eq!(table.action, Action::Insert);
            assert_eq!(table.data.len(), 1);
            assert_eq!(table.data[0]["orderID"], "abc");
        }
        other => panic!("expected table message, got {other:?}"),
    }

    assert!(matches!(
        stream.next_event().await,
        Some(FeedEvent::Message(Decoded::Malformed { .. }))
    ));
    assert!(matches!(
        stream.next_event().await,
        Some(FeedEvent::Disconnected { .. })
    ));
    assert!(!stream.is_connected());
    assert!(stream.next_event().await.is_none());
}

#[tokio::test]
async fn silent_server_trips_the_read_deadline() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let _ws = tokio_tungstenite::accept_async(socket).await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let mut stream = BitmexFeedStream::new(BitmexConfig {
        read_timeout_secs: 1,
        ..local_config(addr)
    });
    stream.connect().await.unwrap();

    let event = tokio::time::timeout(Duration::from_secs(5), stream.next_event())
        .await
        .unwrap();

    match event {
        Some(FeedEvent::Disconnected { reason }) => {
            assert!(reason.contains("read timed out"), "{reason}");
        }
        other => panic!("expected read timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn refused_connection_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut stream = BitmexFeedStream::new(local_config(addr));
    assert!(stream.connect().await.is_err());
    assert!(!stream.is_connected());
}
