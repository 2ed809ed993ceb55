//! Estado compartido de la aplicación
//!
//! `TrackingContext` agrupa el mapa y el estado de activación que antes vivían
//! en un contexto global; se pasa por referencia a los componentes que lo usan.
//! `RelayState` es el estado del router de Axum del servidor relay.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::models::activation::{ActivationState, IndicatorColor};
use crate::services::map_view::MapView;

/// Estado del rastreo en vivo, dueño único del mapa
#[derive(Default)]
pub struct TrackingContext {
    pub map: MapView,
    pub activation: ActivationState,
    /// Se marca con la primera muestra recibida
    pub location_accessed: bool,
}

/// Resumen para el panel del chofer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapStatus {
    pub map_initialized: bool,
    pub device_markers: usize,
    pub button_color: IndicatorColor,
    pub location_accessed: bool,
}

impl TrackingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> MapStatus {
        MapStatus {
            map_initialized: self.map.is_initialized(),
            device_markers: self.map.marker_count(),
            button_color: self.activation.color,
            location_accessed: self.location_accessed,
        }
    }
}

/// Estado del servidor relay. Las conexiones no comparten estado mutable;
/// solo se numeran para los logs.
#[derive(Clone)]
pub struct RelayState {
    pub config: EnvironmentConfig,
    connection_seq: Arc<AtomicU64>,
}

impl RelayState {
    pub fn new(config: EnvironmentConfig) -> Self {
        Self {
            config,
            connection_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Identificador para correlacionar los logs de una conexión
    pub fn next_connection_id(&self) -> u64 {
        self.connection_seq.fetch_add(1, Ordering::Relaxed) + 1
    }
}
