//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.
//! Todas las variables son opcionales; los valores inválidos caen al default.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::services::location_source::WatchOptions;

pub const DEFAULT_RELAY_PORT: u16 = 8080;
pub const DEFAULT_MAPS_SCRIPT_URL: &str = "https://maps.googleapis.com/maps/api/js";
pub const DEFAULT_LOCATION_TIMEOUT_MS: u64 = 5000;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub relay_host: String,
    pub relay_port: u16,
    pub cors_origins: Vec<String>,
    pub maps_api_key: Option<String>,
    pub maps_script_url: String,
    pub persistence_base_url: Option<String>,
    pub location_timeout_ms: u64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            relay_host: env::var("RELAY_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            relay_port: parse_or_default("RELAY_PORT", DEFAULT_RELAY_PORT),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| split_origins(&origins))
                .unwrap_or_default(),
            maps_api_key: non_empty_var("GOOGLE_MAPS_API_KEY"),
            maps_script_url: non_empty_var("MAPS_SCRIPT_URL")
                .unwrap_or_else(|| DEFAULT_MAPS_SCRIPT_URL.to_string()),
            persistence_base_url: non_empty_var("PERSISTENCE_BASE_URL"),
            location_timeout_ms: parse_or_default("LOCATION_TIMEOUT_MS", DEFAULT_LOCATION_TIMEOUT_MS),
        }
    }
}

impl EnvironmentConfig {
    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor relay
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.relay_host, self.relay_port)
    }

    /// Opciones de geolocalización: alta precisión, sin caché, timeout configurable
    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            timeout: Duration::from_millis(self.location_timeout_ms),
            ..WatchOptions::default()
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or_default<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("⚠️ {}='{}' no es válido, usando {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
