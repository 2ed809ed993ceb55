//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! de la bitácora.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Códigos de unidad permitidos en la ruta
    pub static ref UNIT_PATTERN: Regex =
        Regex::new(r"^(01|02|04|05|06|07|08|013|015|016|017|021)$").unwrap();
}

/// Códigos de unidad en el orden en que se muestran en el selector
pub const UNIT_CODES: [&str; 12] = [
    "01", "02", "04", "05", "06", "07", "08", "013", "015", "016", "017", "021",
];

/// Validar que el código de unidad esté en la lista permitida
pub fn validate_unit_code(value: &str) -> Result<(), ValidationError> {
    if !UNIT_PATTERN.is_match(value) {
        let mut error = ValidationError::new("unit_code");
        error.add_param("value".into(), &value.to_string());
        error.add_param("allowed_values".into(), &UNIT_CODES.join(", "));
        return Err(error);
    }
    Ok(())
}
