//! Modelo de la bitácora
//!
//! Registros de salida de unidades (dirección, unidad, hora y día) y el
//! estado de selección que debe completarse antes de guardar un registro.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::errors::{validation_error, AppError};
use crate::utils::validation::validate_unit_code;

/// Sentido del viaje en la ruta Tuxtla - Suchiapa
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "De Tuxtla-Suchiapa")]
    DeTuxtlaSuchiapa,
    #[serde(rename = "De Suchiapa-Tuxtla")]
    DeSuchiapaTuxtla,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::DeTuxtlaSuchiapa, Direction::DeSuchiapaTuxtla];

    pub fn label(&self) -> &'static str {
        match self {
            Direction::DeTuxtlaSuchiapa => "De Tuxtla-Suchiapa",
            Direction::DeSuchiapaTuxtla => "De Suchiapa-Tuxtla",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Direction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|d| d.label() == s.trim())
            .ok_or_else(|| validation_error("direction", "Dirección no reconocida"))
    }
}

/// Día de la semana (nombres en español)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    #[serde(rename = "Lunes")]
    Monday,
    #[serde(rename = "Martes")]
    Tuesday,
    #[serde(rename = "Miércoles")]
    Wednesday,
    #[serde(rename = "Jueves")]
    Thursday,
    #[serde(rename = "Viernes")]
    Friday,
    #[serde(rename = "Sábado")]
    Saturday,
    #[serde(rename = "Domingo")]
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Lunes",
            DayOfWeek::Tuesday => "Martes",
            DayOfWeek::Wednesday => "Miércoles",
            DayOfWeek::Thursday => "Jueves",
            DayOfWeek::Friday => "Viernes",
            DayOfWeek::Saturday => "Sábado",
            DayOfWeek::Sunday => "Domingo",
        }
    }
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(day: chrono::Weekday) -> Self {
        DayOfWeek::ALL[day.num_days_from_monday() as usize]
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DayOfWeek {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayOfWeek::ALL
            .into_iter()
            .find(|d| d.label() == s.trim())
            .ok_or_else(|| validation_error("day", "Día no reconocido"))
    }
}

/// Código de unidad validado contra la lista permitida
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UnitCode(String);

impl UnitCode {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        validate_unit_code(value)
            .map_err(|_| validation_error("unit", "Unidad no permitida"))?;
        Ok(UnitCode(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UnitCode {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UnitCode::parse(&value)
    }
}

impl From<UnitCode> for String {
    fn from(unit: UnitCode) -> Self {
        unit.0
    }
}

impl fmt::Display for UnitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registro inmutable de la bitácora
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRecord {
    pub direction: Direction,
    pub unit: UnitCode,
    /// Hora local del registro, formato `HH:MM:SS`
    #[serde(rename = "time")]
    pub captured_at: String,
    pub day: DayOfWeek,
}

/// Estado de trabajo del formulario de la bitácora
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    /// Valor tal como se seleccionó, aunque no sea válido
    pub unit: Option<String>,
    pub day: Option<DayOfWeek>,
    pub direction: Option<Direction>,
    pub unit_registered: bool,
}

impl SelectionState {
    /// Unidad seleccionada, solo si pasa la validación
    pub fn valid_unit(&self) -> Option<UnitCode> {
        self.unit.as_deref().and_then(|u| UnitCode::parse(u).ok())
    }

    /// El botón de guardar solo se habilita con los cuatro campos completos
    pub fn is_complete(&self) -> bool {
        self.unit_registered
            && self.valid_unit().is_some()
            && self.day.is_some()
            && self.direction.is_some()
    }

    /// Campos que impiden guardar, con su mensaje
    pub fn missing_fields(&self) -> Vec<(&'static str, &'static str)> {
        let mut missing = Vec::new();
        if !self.unit_registered {
            missing.push(("unit_registered", "Registre una nueva unidad"));
        }
        match self.unit.as_deref() {
            None | Some("") => missing.push(("unit", "Seleccione una unidad")),
            Some(_) if self.valid_unit().is_none() => missing.push(("unit", "Unidad no permitida")),
            Some(_) => {}
        }
        if self.day.is_none() {
            missing.push(("day", "Seleccione un día"));
        }
        if self.direction.is_none() {
            missing.push(("direction", "Seleccione una dirección"));
        }
        missing
    }
}
