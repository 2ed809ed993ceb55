//! Objetos de transferencia
//!
//! Formatos de los mensajes que entran y salen por la red.

pub mod relay_dto;
