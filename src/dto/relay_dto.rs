use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::location::Coordinates;

// Mensaje de ubicación recibido por el relay.
// Acepta `latitude`/`longitude` y el formato anterior `lat`/`lng`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct LocationMessage {
    #[serde(alias = "lat")]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[serde(alias = "lng")]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl From<LocationMessage> for Coordinates {
    fn from(message: LocationMessage) -> Self {
        Coordinates::new(message.latitude, message.longitude)
    }
}

// Respuesta del endpoint de prueba
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
    pub status: String,
    pub timestamp: String,
    pub relay_path: String,
    pub environment: String,
}
