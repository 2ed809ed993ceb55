//! Configuración del mapa
//!
//! Centro, zoom y trazos estáticos de ruta que se instalan una sola vez
//! al inicializar el mapa.

use serde::{Deserialize, Serialize};

use crate::models::location::Coordinates;

pub const TUXTLA: Coordinates = Coordinates::new(16.75, -93.1167);
pub const SUCHIAPA: Coordinates = Coordinates::new(16.55, -93.1159);

/// Trazo (polyline) de una ruta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOverlay {
    pub name: String,
    pub path: Vec<Coordinates>,
    pub stroke_color: String,
    pub stroke_opacity: f64,
    pub stroke_weight: u32,
    pub geodesic: bool,
}

impl RouteOverlay {
    /// Ruta Suchiapa - Vía Terán - Tuxtla
    pub fn via_teran() -> Self {
        Self {
            name: "Vía Terán".to_string(),
            path: vec![SUCHIAPA, TUXTLA],
            stroke_color: "#FF0000".to_string(),
            stroke_opacity: 1.0,
            stroke_weight: 2,
            geodesic: true,
        }
    }
}

/// Configuración inicial del mapa
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub center: Coordinates,
    pub zoom: u8,
    pub overlays: Vec<RouteOverlay>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: TUXTLA,
            zoom: 12,
            overlays: vec![RouteOverlay::via_teran()],
        }
    }
}
