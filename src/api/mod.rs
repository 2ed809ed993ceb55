//! API endpoints
//!
//! Este módulo contiene los endpoints del servidor relay.

pub mod relay;

pub use relay::*;
