//! Integration tests for WebSocket presence and messaging over a real socket.

mod helpers;

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use helpers::TestApp;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(url: &str) -> WsClient {
    let (ws, _) = connect_async(url).await.expect("WebSocket connect failed");
    ws
}

async fn next_event(ws: &mut WsClient) -> Value {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("read error");
        match message {
            Message::Text(text) => return serde_json::from_str(text.as_str()).unwrap(),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected message {other:?}"),
        }
    }
}

async fn assert_silent(ws: &mut WsClient) {
    if let Ok(Some(Ok(message))) = tokio::time::timeout(Duration::from_millis(200), ws.next()).await
    {
        panic!("expected silence, got {message:?}");
    }
}

async fn send_json(ws: &mut WsClient, value: Value) {
    ws.send(Message::text(value.to_string())).await.unwrap();
}

#[tokio::test]
async fn test_bad_token_gets_401() {
    let app = TestApp::new();
    let server = app.spawn_server().await;

    match connect_async(server.ws_url("garbage")).await {
        Err(tungstenite::Error::Http(response)) => assert_eq!(response.status().as_u16(), 401),
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("upgrade should have been refused"),
    }
    assert_eq!(app.state.realtime.registry.connection_count(), 0);

    server.stop().await;
}

#[tokio::test]
async fn test_presence_and_chat_fanout() {
    let app = TestApp::new();
    let server = app.spawn_server().await;

    let mut alice = connect(&server.ws_url(&app.token_for("alice"))).await;
    assert_eq!(
        next_event(&mut alice).await,
        json!({"type": "online_list", "data": {"users": ["alice"]}})
    );

    let mut bob = connect(&server.ws_url(&app.token_for("bob"))).await;
    assert_eq!(
        next_event(&mut bob).await,
        json!({"type": "online_list", "data": {"users": ["alice", "bob"]}})
    );
    assert_eq!(
        next_event(&mut alice).await,
        json!({"type": "user_joined", "data": {"user": "bob"}})
    );

    send_json(&mut bob, json!({"type": "typing", "isTyping": true})).await;
    assert_eq!(
        next_event(&mut alice).await,
        json!({"type": "typing", "data": {"user": "bob", "isTyping": true}})
    );

    send_json(&mut bob, json!({"type": "chat", "text": "hello"})).await;
    assert_eq!(
        next_event(&mut alice).await,
        json!({"type": "chat", "data": {"from": "bob", "text": "hello"}})
    );
    assert_silent(&mut bob).await;

    bob.close(None).await.unwrap();
    assert_eq!(
        next_event(&mut alice).await,
        json!({"type": "user_left", "data": {"user": "bob"}})
    );

    server.stop().await;
}

#[tokio::test]
async fn test_authorization_header_and_multi_device() {
    let app = TestApp::new();
    let server = app.spawn_server().await;

    let mut bob = connect(&server.ws_url(&app.token_for("bob"))).await;
    next_event(&mut bob).await;

    let mut request = format!("ws://{}/ws", server.addr).into_client_request().unwrap();
    request.headers_mut().insert(
        "authorization",
        format!("Bearer {}", app.token_for("alice")).parse().unwrap(),
    );
    let (mut phone, _) = connect_async(request).await.unwrap();
    next_event(&mut phone).await;
    assert_eq!(
        next_event(&mut bob).await,
        json!({"type": "user_joined", "data": {"user": "alice"}})
    );

    let mut laptop = connect(&server.ws_url(&app.token_for("alice"))).await;
    next_event(&mut laptop).await;
    assert_silent(&mut bob).await;

    laptop.close(None).await.unwrap();
    assert_silent(&mut bob).await;

    phone.close(None).await.unwrap();
    assert_eq!(
        next_event(&mut bob).await,
        json!({"type": "user_left", "data": {"user": "alice"}})
    );

    server.stop().await;
}

#[tokio::test]
async fn test_chat_flood_is_rate_limited() {
    let app = TestApp::new();
    let server = app.spawn_server().await;

    let mut alice = connect(&server.ws_url(&app.token_for("alice"))).await;
    next_event(&mut alice).await;
    let mut bob = connect(&server.ws_url(&app.token_for("bob"))).await;
    next_event(&mut bob).await;
    next_event(&mut alice).await;

    for i in 1..=4 {
        send_json(&mut bob, json!({"type": "chat", "text": format!("m{i}")})).await;
    }

    for i in 1..=3 {
        assert_eq!(
            next_event(&mut alice).await,
            json!({"type": "chat", "data": {"from": "bob", "text": format!("m{i}")}})
        );
    }
    assert_eq!(
        next_event(&mut bob).await,
        json!({"type": "error", "data": {"error": "rate_limited"}})
    );
    assert_silent(&mut alice).await;

    server.stop().await;
}

#[tokio::test]
async fn test_login_then_connect() {
    let app = TestApp::new();
    let server = app.spawn_server().await;

    let response = app.login_from("10.1.1.1", "alice", "wonderland").await;
    let token = response.body["token"].as_str().unwrap().to_string();

    let mut alice = connect(&server.ws_url(&token)).await;
    assert_eq!(
        next_event(&mut alice).await,
        json!({"type": "online_list", "data": {"users": ["alice"]}})
    );

    let health = app.request("GET", "/health", None, &[]).await;
    assert_eq!(health.body["connections"], 1);
    assert_eq!(health.body["online_users"], 1);

    server.stop().await;
}

#[tokio::test]
async fn test_shutdown_closes_sockets() {
    let app = TestApp::new();
    let server = app.spawn_server().await;

    let mut alice = connect(&server.ws_url(&app.token_for("alice"))).await;
    next_event(&mut alice).await;

    server.stop().await;

    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(message) = alice.next().await {
            match message {
                Ok(Message::Close(_)) | Err(_) => return,
                Ok(_) => continue,
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "socket was not closed on shutdown");

    for _ in 0..100 {
        if app.state.realtime.registry.connection_count() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("connection was not unregistered after shutdown");
}
