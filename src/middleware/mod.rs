//! Middleware del sistema
//!
//! Este módulo contiene el middleware HTTP del relay.

pub mod cors;

pub use cors::*;
