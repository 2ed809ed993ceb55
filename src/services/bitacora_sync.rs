//! Sincronización remota de la bitácora
//!
//! Cliente HTTP del servicio externo de persistencia. Las llamadas son
//! "fire-and-forget": solo se exige que la respuesta sea JSON parseable.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use std::time::Duration;

use crate::models::trip::TripRecord;
use crate::utils::errors::{transport_error, AppResult};

/// Colaborador remoto de la bitácora
#[async_trait]
pub trait BitacoraSync: Send + Sync {
    async fn save_data(&self, record: &TripRecord) -> AppResult<()>;
    async fn delete_record(&self, record: &TripRecord) -> AppResult<()>;
    async fn clear_history(&self) -> AppResult<()>;
}

pub struct HttpBitacoraSync {
    base_url: String,
    client: Client,
}

impl HttpBitacoraSync {
    pub fn new(base_url: &str) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| transport_error(&format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn send(&self, method: Method, path: &str, record: Option<&TripRecord>) -> AppResult<()> {
        let url = self.url(path);
        log::info!("🌐 {} {}", method, url);

        let mut request = self.client.request(method.clone(), &url);
        if let Some(record) = record {
            request = request.json(record);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&format!("{} {} failed: {}", method, url, e)))?;

        let status = response.status();
        log::info!("📡 Response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            log::error!("❌ {} {} rechazado con {}: {}", method, url, status, error_text);
            return Err(transport_error(&format!("{} {} returned {}", method, url, status)));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(());
        }

        response
            .json::<serde_json::Value>()
            .await
            .map(|_| ())
            .map_err(|e| transport_error(&format!("invalid JSON response from {}: {}", url, e)))
    }
}

#[async_trait]
impl BitacoraSync for HttpBitacoraSync {
    async fn save_data(&self, record: &TripRecord) -> AppResult<()> {
        self.send(Method::POST, "saveData", Some(record)).await
    }

    async fn delete_record(&self, record: &TripRecord) -> AppResult<()> {
        self.send(Method::DELETE, "deleteRecord", Some(record)).await
    }

    async fn clear_history(&self) -> AppResult<()> {
        self.send(Method::DELETE, "clearHistory", None).await
    }
}
