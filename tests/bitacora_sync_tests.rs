use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{extract::State, http::StatusCode, routing::{delete, post}, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use transport_communication::config::environment::EnvironmentConfig;
use transport_communication::services::bitacora_service::{BitacoraLog, MSG_CLEARED, MSG_DELETED, MSG_SAVED};
use transport_communication::services::bitacora_sync::{BitacoraSync, HttpBitacoraSync};
use transport_communication::utils::errors::AppError;

#[derive(Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
    fail: bool,
}

impl Recorder {
    fn record(&self, operation: &str, body: Value) -> Result<Json<Value>, StatusCode> {
        self.calls.lock().unwrap().push((operation.to_string(), body));
        if self.fail {
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        } else {
            Ok(Json(json!({ "success": true })))
        }
    }

    fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

async fn save_data(State(rec): State<Recorder>, Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
    rec.record("saveData", body)
}

async fn delete_record(State(rec): State<Recorder>, Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
    rec.record("deleteRecord", body)
}

async fn clear_history(State(rec): State<Recorder>) -> Result<Json<Value>, StatusCode> {
    rec.record("clearHistory", Value::Null)
}

async fn spawn_persistence(recorder: Recorder) -> SocketAddr {
    let app = Router::new()
        .route("/api/saveData", post(save_data))
        .route("/api/deleteRecord", delete(delete_record))
        .route("/api/clearHistory", delete(clear_history))
        .with_state(recorder);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn fill_and_save(log: &mut BitacoraLog, unit: &str) {
    log.register_new_unit();
    log.select_unit(unit).unwrap();
    log.select_day("Viernes").unwrap();
    log.select_direction("De Suchiapa-Tuxtla").unwrap();
    log.save().await.unwrap();
}

#[tokio::test]
async fn test_changes_are_replicated() {
    let recorder = Recorder::default();
    let addr = spawn_persistence(recorder.clone()).await;
    let config = EnvironmentConfig {
        persistence_base_url: Some(format!("http://{}/", addr)),
        ..EnvironmentConfig::default()
    };
    let mut log = BitacoraLog::from_config(&config).unwrap();
    assert!(log.has_sync());

    fill_and_save(&mut log, "016").await;
    assert_eq!(log.message(), Some(MSG_SAVED));

    fill_and_save(&mut log, "07").await;
    log.delete_record(0).await.unwrap();
    assert_eq!(log.message(), Some(MSG_DELETED));

    log.clear_history().await;
    assert_eq!(log.message(), Some(MSG_CLEARED));

    let calls = recorder.calls();
    let operations: Vec<&str> = calls.iter().map(|(op, _)| op.as_str()).collect();
    assert_eq!(operations, vec!["saveData", "saveData", "deleteRecord", "clearHistory"]);

    let saved = &calls[0].1;
    assert_eq!(saved["unit"], "016");
    assert_eq!(saved["day"], "Viernes");
    assert_eq!(saved["direction"], "De Suchiapa-Tuxtla");
    assert_eq!(saved["time"].as_str().unwrap().len(), 8);

    assert_eq!(calls[2].1["unit"], "016");
}

#[tokio::test]
async fn test_rejected_sync_keeps_local_changes() {
    let recorder = Recorder {
        fail: true,
        ..Recorder::default()
    };
    let addr = spawn_persistence(recorder.clone()).await;
    let sync = HttpBitacoraSync::new(&format!("http://{}", addr)).unwrap();
    let mut log = BitacoraLog::with_sync(Arc::new(sync));

    fill_and_save(&mut log, "01").await;
    assert_eq!(log.records().len(), 1);
    assert!(log.message().unwrap().starts_with("Error de comunicación"));

    fill_and_save(&mut log, "02").await;
    log.delete_record(1).await.unwrap();
    assert_eq!(log.records().len(), 1);
    assert_eq!(log.records()[0].unit.as_str(), "01");

    log.clear_history().await;
    assert!(log.records().is_empty());
    assert!(log.message().unwrap().starts_with("Error de comunicación"));

    assert_eq!(recorder.calls().len(), 4);
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    // Reservar un puerto y liberarlo para que nadie escuche ahí
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let sync = HttpBitacoraSync::new(&format!("http://{}", addr)).unwrap();
    match sync.clear_history().await {
        Err(AppError::Transport(msg)) => assert!(msg.contains("clearHistory")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_response_is_rejected() {
    let app = Router::new().route("/api/clearHistory", delete(|| async { "ok" }));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let sync = HttpBitacoraSync::new(&format!("http://{}", addr)).unwrap();
    assert!(matches!(sync.clear_history().await, Err(AppError::Transport(_))));
}
