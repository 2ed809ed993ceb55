//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema.
//! Ninguno es fatal: cada componente los recupera en su frontera y los
//! muestra como diálogo, mensaje de estado o entrada de log.

use thiserror::Error;

/// Errores principales de la aplicación
#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Timeout: no location fix within {0} ms")]
    Timeout(u64),

    #[error("Unsupported environment: {0}")]
    UnsupportedEnvironment(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Index error: record {index} out of range (len {len})")]
    Index { index: usize, len: usize },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl AppError {
    /// Código corto para logs y mensajes de estado
    pub fn code(&self) -> &'static str {
        match self {
            AppError::PermissionDenied(_) => "PERMISSION_DENIED",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::UnsupportedEnvironment(_) => "UNSUPPORTED_ENVIRONMENT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Index { .. } => "INDEX_ERROR",
            AppError::Parse(_) => "PARSE_ERROR",
            AppError::Transport(_) => "TRANSPORT_ERROR",
        }
    }

    /// Los errores de ubicación terminan la suscripción que los produjo
    pub fn is_location_error(&self) -> bool {
        matches!(
            self,
            AppError::PermissionDenied(_) | AppError::Timeout(_) | AppError::UnsupportedEnvironment(_)
        )
    }

    /// Mensaje para mostrar al usuario en un diálogo
    pub fn user_message(&self) -> String {
        match self {
            AppError::PermissionDenied(_) => "Permiso de ubicación denegado.".to_string(),
            AppError::Timeout(_) => "No se pudo obtener la ubicación a tiempo.".to_string(),
            AppError::UnsupportedEnvironment(_) => {
                "La geolocalización no es soportada en este entorno.".to_string()
            }
            AppError::Validation(_) => {
                "Por favor, complete todos los campos antes de guardar.".to_string()
            }
            AppError::Index { .. } => "El registro no existe.".to_string(),
            AppError::Parse(_) => "Datos inválidos.".to_string(),
            AppError::Transport(msg) => format!("Error de comunicación: {}", msg),
        }
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación
pub fn validation_error(field: &'static str, message: &'static str) -> AppError {
    AppError::Validation(validation_errors(&[(field, message)]))
}

/// Construir un `ValidationErrors` con un error por campo
pub fn validation_errors(fields: &[(&'static str, &'static str)]) -> validator::ValidationErrors {
    use validator::ValidationError;

    let mut errors = validator::ValidationErrors::new();
    for &(field, message) in fields {
        let mut error = ValidationError::new("custom");
        error.add_param("field".into(), &field);
        error.add_param("message".into(), &message);
        errors.add(field, error);
    }
    errors
}

/// Función helper para crear errores de índice fuera de rango
pub fn index_error(index: usize, len: usize) -> AppError {
    AppError::Index { index, len }
}

/// Función helper para crear errores de parseo
pub fn parse_error(message: &str) -> AppError {
    AppError::Parse(message.to_string())
}

/// Función helper para crear errores de transporte
pub fn transport_error(message: &str) -> AppError {
    AppError::Transport(message.to_string())
}
