//! Servicios del sistema
//!
//! Este módulo contiene la lógica de la ubicación en vivo, el mapa,
//! la bitácora y el relay.

pub mod activation_service;
pub mod bitacora_service;
pub mod bitacora_sync;
pub mod dialogs;
pub mod location_source;
pub mod map_view;
pub mod relay_service;
