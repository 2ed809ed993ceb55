//! Diálogos de confirmación
//!
//! Los diálogos suspenden el flujo lógico hasta que el usuario responde;
//! se modelan como futuros, nunca como llamadas bloqueantes.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Preguntas que el interruptor de ubicación le hace al usuario
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    EnableLocation,
    DisableLocation,
}

impl Prompt {
    pub fn title(&self) -> &'static str {
        match self {
            Prompt::EnableLocation => "¿Permitir acceso a la ubicación?",
            Prompt::DisableLocation => "Ubicación activa",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Prompt::EnableLocation => "La aplicación mostrará tu posición en el mapa.",
            Prompt::DisableLocation => "¿Deseas desactivar la ubicación en vivo?",
        }
    }

    pub fn confirm_label(&self) -> &'static str {
        match self {
            Prompt::EnableLocation => "Permitir",
            Prompt::DisableLocation => "Desactivar",
        }
    }
}

/// Interfaz de diálogos del host
#[async_trait]
pub trait Dialogs: Send + Sync {
    /// `true` si el usuario aceptó
    async fn confirm(&self, prompt: Prompt) -> bool;

    /// Mostrar un error; se resuelve cuando el usuario lo cierra
    async fn alert(&self, message: &str);
}

/// Respuestas predefinidas; registra lo que se mostró
#[derive(Debug, Default)]
pub struct ScriptedDialogs {
    answers: Mutex<VecDeque<bool>>,
    shown: Mutex<Vec<String>>,
}

impl ScriptedDialogs {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            shown: Mutex::new(Vec::new()),
        }
    }

    /// Títulos de confirmaciones y mensajes de alerta, en orden
    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.shown()
            .into_iter()
            .filter_map(|s| s.strip_prefix("alert: ").map(str::to_string))
            .collect()
    }

    fn record(&self, entry: String) {
        if let Ok(mut shown) = self.shown.lock() {
            shown.push(entry);
        }
    }
}

#[async_trait]
impl Dialogs for ScriptedDialogs {
    async fn confirm(&self, prompt: Prompt) -> bool {
        self.record(format!("confirm: {}", prompt.title()));
        // Sin respuesta predefinida equivale a cerrar el diálogo
        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .unwrap_or(false)
    }

    async fn alert(&self, message: &str) {
        self.record(format!("alert: {}", message));
    }
}
