//! End-to-end exchange against a local websocket server.

use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use retcon_client::{ConnectionSupervisor, SessionEvent, SessionState, WsTransport};
use retcon_config::{ConfigRegistry, PropertyValue};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;

fn registry_for(host: String) -> Arc<ConfigRegistry> {
    let registry = ConfigRegistry::new();
    registry.insert("host", 10, PropertyValue::String(host));
    registry.insert("appId", 10, PropertyValue::String("t1".to_string()));
    Arc::new(registry)
}

#[tokio::test]
async fn exchanges_handshake_with_real_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (seen_tx, seen_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(socket)
            .await
            .expect("upgrade");
        if let Some(Ok(Message::Text(text))) = ws.next().await {
            let _ = seen_tx.send(text);
        }
        ws.send(Message::Text("PONG".to_string()))
            .await
            .expect("reply");
        while let Some(Ok(_)) = ws.next().await {}
    });

    let supervisor =
        ConnectionSupervisor::new(registry_for(addr.to_string()), Arc::new(WsTransport::new()));
    let report = supervisor.start().wait().await;

    assert_eq!(report.url, format!("ws://{addr}/ws/t1"));
    assert_eq!(report.state, SessionState::Closed);
    assert_eq!(report.reply(), Some("PONG"));
    assert_eq!(report.events.last(), Some(&SessionEvent::Closed));
    assert_eq!(seen_rx.await.expect("handshake"), "OK+OK");
}

#[tokio::test]
async fn refused_dial_fails_once() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let supervisor =
        ConnectionSupervisor::new(registry_for(addr.to_string()), Arc::new(WsTransport::new()));
    let report = supervisor.start().wait().await;

    assert_eq!(report.state, SessionState::Failed);
    assert_eq!(report.events.len(), 1);
    assert!(matches!(report.events[0], SessionEvent::DialFailed(_)));
}
