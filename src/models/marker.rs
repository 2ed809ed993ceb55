//! Modelo de marcador de dispositivo
//!
//! Un marcador representa la última posición conocida de un dispositivo
//! rastreado. Pertenece exclusivamente a `MapView`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::location::LocationSample;

/// Identificador opaco de dispositivo, asignado como `device-N`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn from_sequence(n: u64) -> Self {
        DeviceId(format!("device-{}", n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Marcador de un dispositivo en el mapa
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceMarker {
    pub id: DeviceId,
    pub position: LocationSample,
}
