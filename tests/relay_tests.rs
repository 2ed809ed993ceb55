use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use transport_communication::api::create_relay_router;
use transport_communication::config::environment::EnvironmentConfig;
use transport_communication::state::RelayState;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[tokio::test]
async fn test_health_endpoint() {
    let addr = spawn_relay().await;

    let response = reqwest::get(format!("http://{}/test", addr)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["relay_path"], "/");
    assert!(body["environment"].is_string());
}

#[tokio::test]
async fn test_plain_http_is_not_upgraded() {
    let addr = spawn_relay().await;

    let response = reqwest::get(format!("http://{}/", addr)).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_invalid_frames_keep_connection_open() {
    let addr = spawn_relay().await;
    let mut client = ws_connect(addr).await;

    for frame in [
        "hola",
        r#"{"foo": "bar"}"#,
        r#"{"latitude": 91, "longitude": 20}"#,
        r#"{"latitude": 10, "longitude": 20}"#,
        r#"{"lat": 16.75, "lng": -93.1167}"#,
    ] {
        client.send(Message::Text(frame.to_string())).await.unwrap();
    }
    client.send(Message::Binary(vec![0xff, 0xfe])).await.unwrap();

    // Sigue viva: responde al ping
    client.send(Message::Ping(b"vivo".to_vec())).await.unwrap();
    assert_eq!(next_message(&mut client).await, Some(Message::Pong(b"vivo".to_vec())));

    // Nunca se responde con datos; solo el cierre
    client.close(None).await.unwrap();
    let reply = timeout(Duration::from_secs(5), client.next()).await.unwrap();
    assert!(!matches!(reply, Some(Ok(Message::Text(_)))), "got {:?}", reply);
}

#[tokio::test]
async fn test_large_frame_is_handled() {
    let addr = spawn_relay().await;
    let mut client = ws_connect(addr).await;

    // Supera los 125 y los 65535 bytes: longitudes extendidas de 16 y 64 bits
    let padding = "x".repeat(70_000);
    let frame = format!(r#"{{"latitude": 1, "longitude": 2, "note": "{}"}}"#, padding);
    client.send(Message::Text(frame)).await.unwrap();

    client.send(Message::Ping(b"ok".to_vec())).await.unwrap();
    assert_eq!(next_message(&mut client).await, Some(Message::Pong(b"ok".to_vec())));
}

#[tokio::test]
async fn test_connections_are_independent() {
    let addr = spawn_relay().await;
    let first = ws_connect(addr).await;
    let mut second = ws_connect(addr).await;

    // Cierre abrupto de la primera conexión
    drop(first);

    second
        .send(Message::Text(r#"{"latitude": 1, "longitude": 2}"#.to_string()))
        .await
        .unwrap();
    second.send(Message::Ping(b"ok".to_vec())).await.unwrap();
    assert_eq!(next_message(&mut second).await, Some(Message::Pong(b"ok".to_vec())));
}

async fn spawn_relay() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_relay_router().with_state(RelayState::new(EnvironmentConfig::default()));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn ws_connect(addr: SocketAddr) -> Client {
    let (client, response) = connect_async(format!("ws://{}/", addr)).await.unwrap();
    assert_eq!(response.status().as_u16(), 101);
    client
}

async fn next_message(client: &mut Client) -> Option<Message> {
    timeout(Duration::from_secs(5), client.next())
        .await
        .unwrap()
        .map(|message| message.unwrap())
}
