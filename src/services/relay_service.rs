//! Decodificación de mensajes del relay
//!
//! Cada frame se procesa de forma independiente: no se guarda nada entre
//! mensajes ni entre conexiones, y nunca se responde al cliente.

use validator::Validate;

use crate::dto::relay_dto::LocationMessage;
use crate::utils::errors::{parse_error, AppResult};

/// Decodificar un frame de texto como mensaje de ubicación
pub fn decode_frame(text: &str) -> AppResult<LocationMessage> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| parse_error(&format!("frame is not JSON: {}", e)))?;

    if !value.is_object() {
        return Err(parse_error("frame is not a JSON object"));
    }

    let location: LocationMessage = serde_json::from_value(value)
        .map_err(|e| parse_error(&format!("frame has no numeric coordinates: {}", e)))?;

    location
        .validate()
        .map_err(|e| parse_error(&format!("coordinates out of range: {}", e)))?;

    Ok(location)
}

/// Decodificar y registrar un frame recibido por la conexión `connection_id`
pub fn handle_frame(connection_id: u64, text: &str) -> AppResult<LocationMessage> {
    log::debug!("📨 [#{}] Mensaje recibido: {}", connection_id, text);

    match decode_frame(text) {
        Ok(location) => {
            log::info!(
                "📍 [#{}] Ubicación recibida: Latitud: {}, Longitud: {}",
                connection_id,
                location.latitude,
                location.longitude
            );
            Ok(location)
        }
        Err(e) => {
            log::warn!("⚠️ [#{}] Datos inválidos: {}", connection_id, e);
            Err(e)
        }
    }
}
