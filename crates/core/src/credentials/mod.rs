//! Credential persistence ports

pub mod ports;
