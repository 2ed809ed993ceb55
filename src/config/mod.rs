//! Configuración del proyecto
//!
//! Este módulo contiene las variables de entorno y la configuración
//! inicial del mapa.

pub mod environment;
pub mod map;

pub use environment::*;
pub use map::*;
