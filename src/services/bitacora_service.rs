//! Bitácora de salidas
//!
//! Tabla en memoria de registros de viaje más el estado de selección que
//! debe completarse antes de agregar un registro. Con un `BitacoraSync`
//! configurado, cada cambio local se replica al servicio remoto; si el
//! servicio lo rechaza, el cambio local se conserva y solo se avisa.

use chrono::Local;
use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::models::trip::{DayOfWeek, Direction, SelectionState, TripRecord, UnitCode};
use crate::services::bitacora_sync::{BitacoraSync, HttpBitacoraSync};
use crate::utils::errors::{index_error, validation_error, validation_errors, AppError, AppResult};

pub const MSG_SAVED: &str = "Datos guardados exitosamente.";
pub const MSG_INCOMPLETE: &str = "Por favor, complete todos los campos antes de guardar.";
pub const MSG_CLEARED: &str = "Historial limpiado.";
pub const MSG_DELETED: &str = "Registro eliminado.";

#[derive(Default)]
pub struct BitacoraLog {
    selection: SelectionState,
    records: Vec<TripRecord>,
    directions_enabled: bool,
    show_history: bool,
    message: Option<String>,
    sync: Option<Arc<dyn BitacoraSync>>,
}

impl BitacoraLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sync(sync: Arc<dyn BitacoraSync>) -> Self {
        Self {
            sync: Some(sync),
            ..Self::default()
        }
    }

    /// Con `PERSISTENCE_BASE_URL` configurada, los cambios se replican al servicio remoto
    pub fn from_config(config: &EnvironmentConfig) -> AppResult<Self> {
        match &config.persistence_base_url {
            Some(url) => {
                log::info!("🌐 Bitácora sincronizada con {}", url);
                Ok(Self::with_sync(Arc::new(HttpBitacoraSync::new(url)?)))
            }
            None => Ok(Self::new()),
        }
    }

    pub fn has_sync(&self) -> bool {
        self.sync.is_some()
    }

    /// "Registrar Nueva Unidad": habilita los botones de dirección
    pub fn register_new_unit(&mut self) {
        self.directions_enabled = true;
        self.message = None;
        self.selection.unit = None;
        self.selection.unit_registered = true;
        log::debug!("🚌 Nueva unidad en registro");
    }

    /// Seleccionar unidad. El valor se conserva aunque no sea válido,
    /// pero en ese caso la unidad deja de contar como registrada.
    pub fn select_unit(&mut self, value: &str) -> AppResult<UnitCode> {
        let value = value.trim();
        self.selection.unit = (!value.is_empty()).then(|| value.to_string());

        match UnitCode::parse(value) {
            Ok(unit) => Ok(unit),
            Err(e) => {
                log::debug!("⚠️ Unidad '{}' fuera de la lista permitida", value);
                self.selection.unit_registered = false;
                Err(e)
            }
        }
    }

    pub fn select_day(&mut self, value: &str) -> AppResult<DayOfWeek> {
        let day: DayOfWeek = value.parse()?;
        self.selection.day = Some(day);
        Ok(day)
    }

    pub fn select_direction(&mut self, value: &str) -> AppResult<Direction> {
        if !self.directions_enabled {
            return Err(validation_error("direction", "Registre una nueva unidad"));
        }
        let direction: Direction = value.parse()?;
        self.selection.direction = Some(direction);
        Ok(direction)
    }

    /// Estado del botón "Guardar"
    pub fn can_save(&self) -> bool {
        self.selection.is_complete()
    }

    /// Agregar un registro con la hora local actual
    pub async fn save(&mut self) -> AppResult<TripRecord> {
        let captured_at = Local::now().format("%H:%M:%S").to_string();
        self.save_with_time(captured_at).await
    }

    async fn save_with_time(&mut self, captured_at: String) -> AppResult<TripRecord> {
        let record = match self.build_record(captured_at) {
            Ok(record) => record,
            Err(e) => {
                self.message = Some(MSG_INCOMPLETE.to_string());
                return Err(e);
            }
        };

        self.records.push(record.clone());
        self.message = Some(MSG_SAVED.to_string());
        self.directions_enabled = false;
        self.selection = SelectionState::default();
        log::info!(
            "💾 Registro guardado: {} | unidad {} | {} | {}",
            record.direction,
            record.unit,
            record.captured_at,
            record.day
        );

        if let Some(sync) = self.sync.clone() {
            if let Err(e) = sync.save_data(&record).await {
                self.report_sync_failure("saveData", e);
            }
        }

        Ok(record)
    }

    /// Eliminar el registro en `index`
    pub async fn delete_record(&mut self, index: usize) -> AppResult<TripRecord> {
        if index >= self.records.len() {
            return Err(index_error(index, self.records.len()));
        }

        let removed = self.records.remove(index);
        self.message = Some(MSG_DELETED.to_string());
        log::info!("🗑️ Registro {} eliminado", index);

        if let Some(sync) = self.sync.clone() {
            if let Err(e) = sync.delete_record(&removed).await {
                self.report_sync_failure("deleteRecord", e);
            }
        }

        Ok(removed)
    }

    /// Vaciar el historial
    pub async fn clear_history(&mut self) {
        let count = self.records.len();
        self.records.clear();
        self.message = Some(MSG_CLEARED.to_string());
        log::info!("🧹 Historial limpiado ({} registros)", count);

        if let Some(sync) = self.sync.clone() {
            if let Err(e) = sync.clear_history().await {
                self.report_sync_failure("clearHistory", e);
            }
        }
    }

    /// "Ver Historial" / "Ocultar Historial"
    pub fn toggle_history(&mut self) -> bool {
        self.show_history = !self.show_history;
        self.show_history
    }

    pub fn is_history_visible(&self) -> bool {
        self.show_history
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn directions_enabled(&self) -> bool {
        self.directions_enabled
    }

    /// Mensaje de estado que se muestra bajo el formulario
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn build_record(&self, captured_at: String) -> AppResult<TripRecord> {
        let missing = self.selection.missing_fields();
        if !missing.is_empty() {
            return Err(AppError::Validation(validation_errors(&missing)));
        }

        match (self.selection.valid_unit(), self.selection.day, self.selection.direction) {
            (Some(unit), Some(day), Some(direction)) => Ok(TripRecord {
                direction,
                unit,
                captured_at,
                day,
            }),
            _ => Err(validation_error("selection", "Selección incompleta")),
        }
    }

    fn report_sync_failure(&mut self, operation: &str, error: AppError) {
        log::error!("❌ Sincronización '{}' rechazada: {}", operation, error);
        self.message = Some(error.user_message());
    }
}
