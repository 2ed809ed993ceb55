//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos de la ubicación en vivo,
//! el mapa y la bitácora. Todo vive en memoria.

pub mod activation;
pub mod location;
pub mod marker;
pub mod trip;

pub use activation::*;
pub use location::*;
pub use marker::*;
pub use trip::*;
