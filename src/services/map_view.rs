//! Vista de mapa y registro de marcadores
//!
//! `MapView` es dueño de la única instancia del widget de mapa y del registro
//! de marcadores por dispositivo. El registro es la fuente de verdad: si el
//! proveedor del mapa no carga, los marcadores se siguen registrando sin widget.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::environment::EnvironmentConfig;
use crate::config::map::{MapConfig, RouteOverlay};
use crate::models::location::{Coordinates, LocationSample};
use crate::models::marker::{DeviceId, DeviceMarker};
use crate::utils::errors::{transport_error, AppError, AppResult};

/// Referencia opaca a un marcador creado en el widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

/// Widget de mapa del proveedor externo
pub trait MapWidget: Send {
    fn add_marker(&mut self, position: Coordinates) -> MarkerHandle;
    fn move_marker(&mut self, handle: MarkerHandle, position: Coordinates);
    fn remove_marker(&mut self, handle: MarkerHandle);
    fn add_polyline(&mut self, overlay: &RouteOverlay);
}

/// Cargador del SDK del mapa
#[async_trait]
pub trait MapProvider: Send + Sync {
    async fn load(&self, config: &MapConfig) -> AppResult<Box<dyn MapWidget>>;
}

/// Widget en memoria: guarda lo que el SDK dibujaría
#[derive(Debug, Default)]
pub struct HeadlessMap {
    center: Option<Coordinates>,
    zoom: u8,
    next_handle: u64,
    markers: BTreeMap<MarkerHandle, Coordinates>,
    polylines: Vec<RouteOverlay>,
}

impl HeadlessMap {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            center: Some(config.center),
            zoom: config.zoom,
            ..Self::default()
        }
    }

    pub fn center(&self) -> Option<Coordinates> {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn marker_positions(&self) -> Vec<Coordinates> {
        self.markers.values().copied().collect()
    }

    pub fn polylines(&self) -> &[RouteOverlay] {
        &self.polylines
    }
}

impl MapWidget for HeadlessMap {
    fn add_marker(&mut self, position: Coordinates) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle(self.next_handle);
        self.markers.insert(handle, position);
        handle
    }

    fn move_marker(&mut self, handle: MarkerHandle, position: Coordinates) {
        if let Some(current) = self.markers.get_mut(&handle) {
            *current = position;
        }
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle);
    }

    fn add_polyline(&mut self, overlay: &RouteOverlay) {
        self.polylines.push(overlay.clone());
    }
}

/// Proveedor que descarga el script del SDK con la API key
pub struct ScriptMapProvider {
    script_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl ScriptMapProvider {
    pub fn new(script_url: String, api_key: String) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| transport_error(&format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            script_url,
            api_key,
            client,
        })
    }

    /// URL del script como se inyectaría en la página
    pub fn script_src(&self) -> String {
        format!(
            "{}?key={}&libraries=places",
            self.script_url,
            urlencoding::encode(&self.api_key)
        )
    }
}

#[async_trait]
impl MapProvider for ScriptMapProvider {
    async fn load(&self, config: &MapConfig) -> AppResult<Box<dyn MapWidget>> {
        log::info!("🗺️ Cargando SDK del mapa desde {}", self.script_url);

        let response = self
            .client
            .get(self.script_src())
            .send()
            .await
            .map_err(|e| transport_error(&format!("map script request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(transport_error(&format!("map script failed with status {}", status)));
        }

        log::info!("✅ SDK del mapa cargado ({})", status);
        Ok(Box::new(HeadlessMap::new(config)))
    }
}

struct RegisteredMarker {
    marker: DeviceMarker,
    handle: Option<MarkerHandle>,
}

/// Dueño del widget de mapa y del registro de marcadores
pub struct MapView {
    widget: Option<Box<dyn MapWidget>>,
    config: Option<MapConfig>,
    markers: BTreeMap<DeviceId, RegisteredMarker>,
    next_device: u64,
}

impl Default for MapView {
    fn default() -> Self {
        Self::new()
    }
}

impl MapView {
    pub fn new() -> Self {
        Self {
            widget: None,
            config: None,
            markers: BTreeMap::new(),
            next_device: 0,
        }
    }

    /// Crear el mapa una sola vez e instalar los trazos de ruta.
    ///
    /// Si el proveedor falla, el error se registra y se devuelve como
    /// `Transport`; la vista sigue funcionando sin widget.
    pub async fn initialize(&mut self, provider: &dyn MapProvider, config: MapConfig) -> AppResult<()> {
        if self.config.is_some() {
            log::debug!("🗺️ Mapa ya inicializado");
            return Ok(());
        }

        let mut widget = match provider.load(&config).await {
            Ok(widget) => widget,
            Err(e) => {
                log::error!("❌ Error cargando el mapa: {}", e);
                return Err(e);
            }
        };

        for overlay in &config.overlays {
            widget.add_polyline(overlay);
        }

        // Los marcadores registrados antes de cargar el mapa se dibujan ahora
        for entry in self.markers.values_mut() {
            entry.handle = Some(widget.add_marker(entry.marker.position.coordinates()));
        }

        log::info!(
            "🗺️ Mapa inicializado en ({}, {}) zoom {}",
            config.center.latitude,
            config.center.longitude,
            config.zoom
        );
        self.widget = Some(widget);
        self.config = Some(config);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.widget.is_some()
    }

    pub fn config(&self) -> Option<&MapConfig> {
        self.config.as_ref()
    }

    /// Asignar el siguiente identificador `device-N`
    pub fn register_device(&mut self) -> DeviceId {
        self.next_device += 1;
        DeviceId::from_sequence(self.next_device)
    }

    /// Crear el marcador del dispositivo o moverlo si ya existe
    pub fn upsert_marker(&mut self, device_id: &DeviceId, position: LocationSample) -> &DeviceMarker {
        let widget = self.widget.as_mut();

        let entry = match self.markers.entry(device_id.clone()) {
            std::collections::btree_map::Entry::Occupied(occupied) => {
                let entry = occupied.into_mut();
                entry.marker.position = position;
                if let (Some(widget), Some(handle)) = (widget, entry.handle) {
                    widget.move_marker(handle, position.coordinates());
                }
                log::debug!("📍 Marcador {} movido", device_id);
                entry
            }
            std::collections::btree_map::Entry::Vacant(vacant) => {
                let handle = widget.map(|w| w.add_marker(position.coordinates()));
                log::info!("📍 Marcador {} creado", device_id);
                vacant.insert(RegisteredMarker {
                    marker: DeviceMarker {
                        id: device_id.clone(),
                        position,
                    },
                    handle,
                })
            }
        };

        &entry.marker
    }

    /// Quitar el marcador de un dispositivo. Devuelve si existía.
    pub fn clear_marker(&mut self, device_id: &DeviceId) -> bool {
        match self.markers.remove(device_id) {
            Some(entry) => {
                if let (Some(widget), Some(handle)) = (self.widget.as_mut(), entry.handle) {
                    widget.remove_marker(handle);
                }
                log::debug!("🗑️ Marcador {} eliminado", device_id);
                true
            }
            None => false,
        }
    }

    /// Quitar todos los marcadores del mapa y del registro
    pub fn clear_all(&mut self) {
        let count = self.markers.len();
        for (_, entry) in std::mem::take(&mut self.markers) {
            if let (Some(widget), Some(handle)) = (self.widget.as_mut(), entry.handle) {
                widget.remove_marker(handle);
            }
        }
        log::info!("🗑️ {} marcadores eliminados", count);
    }

    pub fn marker(&self, device_id: &DeviceId) -> Option<&DeviceMarker> {
        self.markers.get(device_id).map(|entry| &entry.marker)
    }

    pub fn markers(&self) -> Vec<&DeviceMarker> {
        self.markers.values().map(|entry| &entry.marker).collect()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }
}

/// Proveedor del mapa según el entorno: el SDK real si hay API key,
/// si no uno que siempre falla y deja la vista en modo solo-registro.
pub fn provider_from_config(config: &EnvironmentConfig) -> AppResult<Box<dyn MapProvider>> {
    match &config.maps_api_key {
        Some(key) => Ok(Box::new(ScriptMapProvider::new(
            config.maps_script_url.clone(),
            key.clone(),
        )?)),
        None => {
            log::warn!("⚠️ GOOGLE_MAPS_API_KEY no configurada, el mapa no se cargará");
            Ok(Box::new(UnavailableMapProvider))
        }
    }
}

/// Proveedor que siempre falla; para entornos sin SDK
pub struct UnavailableMapProvider;

#[async_trait]
impl MapProvider for UnavailableMapProvider {
    async fn load(&self, _config: &MapConfig) -> AppResult<Box<dyn MapWidget>> {
        Err(AppError::Transport("map provider not configured".to_string()))
    }
}
