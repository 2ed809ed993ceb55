//! Transport-Communication
//!
//! Núcleo de la ubicación en vivo, la bitácora de salidas y el servidor relay
//! de la ruta Tuxtla - Suchiapa (Vía Terán).

pub mod api;
pub mod config;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
