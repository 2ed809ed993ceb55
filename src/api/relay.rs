//! Endpoints del servidor relay
//!
//! `GET /` acepta conexiones WebSocket; cada conexión corre en su propia tarea
//! y no comparte estado con las demás. `GET /test` responde un health check.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{Json, Response},
    routing::get,
    Router,
};
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::dto::relay_dto::HealthResponse;
use crate::services::relay_service;
use crate::state::RelayState;

pub fn create_relay_router() -> Router<RelayState> {
    Router::new()
        .route("/", get(relay_socket))
        .route("/test", get(test_endpoint))
}

/// Aceptar la conexión WebSocket
async fn relay_socket(ws: WebSocketUpgrade, State(state): State<RelayState>) -> Response {
    let connection_id = state.next_connection_id();
    ws.on_upgrade(move |socket| handle_connection(socket, connection_id))
}

async fn handle_connection(mut socket: WebSocket, connection_id: u64) {
    info!("🔌 [#{}] Cliente conectado", connection_id);

    while let Some(message) = socket.next().await {
        match message {
            Ok(Message::Text(text)) => {
                // Los errores de parseo ya quedaron en el log; la conexión sigue abierta
                let _ = relay_service::handle_frame(connection_id, &text);
            }
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => {
                    let _ = relay_service::handle_frame(connection_id, &text);
                }
                Err(e) => warn!("⚠️ [#{}] Datos inválidos: frame binario no UTF-8 ({})", connection_id, e),
            },
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                debug!("🏓 [#{}] ping/pong", connection_id);
            }
            Ok(Message::Close(frame)) => {
                debug!("👋 [#{}] Close recibido: {:?}", connection_id, frame);
                break;
            }
            Err(e) => {
                warn!("❌ [#{}] Error de transporte: {}", connection_id, e);
                break;
            }
        }
    }

    info!("🔌 [#{}] Cliente desconectado", connection_id);
}

/// Endpoint de prueba simple
async fn test_endpoint(State(state): State<RelayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "¡Servidor relay de ubicación funcionando correctamente!".to_string(),
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        relay_path: "/".to_string(),
        environment: state.config.environment.clone(),
    })
}
