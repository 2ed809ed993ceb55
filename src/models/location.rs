//! Modelo de ubicación
//!
//! Muestras de ubicación producidas por una `LocationSource`. Son efímeras:
//! se consumen inmediatamente por el mapa y nunca se persisten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Par latitud/longitud
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Punto intermedio entre `self` y `other` (interpolación lineal, `t` en [0, 1])
    pub fn lerp(&self, other: &Coordinates, t: f64) -> Coordinates {
        let t = t.clamp(0.0, 1.0);
        Coordinates {
            latitude: self.latitude + (other.latitude - self.latitude) * t,
            longitude: self.longitude + (other.longitude - self.longitude) * t,
        }
    }
}

/// Muestra de ubicación con su instante de captura
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    pub captured_at: DateTime<Utc>,
}

impl LocationSample {
    pub fn new(latitude: f64, longitude: f64, captured_at: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            captured_at,
        }
    }

    /// Muestra capturada ahora mismo
    pub fn now(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, Utc::now())
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}
