//! Estado de activación de la ubicación en vivo

use serde::{Deserialize, Serialize};

/// Fase del interruptor de ubicación
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActivationPhase {
    #[default]
    Inactive,
    AwaitingPermission,
    Active,
}

/// Color del botón de ubicación
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorColor {
    #[default]
    Red,
    Green,
}

/// Fase actual más el color que muestra el botón
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ActivationState {
    pub phase: ActivationPhase,
    pub color: IndicatorColor,
}

impl ActivationState {
    pub fn is_active(&self) -> bool {
        self.phase == ActivationPhase::Active
    }

    pub(crate) fn set_inactive(&mut self) {
        self.phase = ActivationPhase::Inactive;
        self.color = IndicatorColor::Red;
    }

    pub(crate) fn set_active(&mut self) {
        self.phase = ActivationPhase::Active;
        self.color = IndicatorColor::Green;
    }
}
