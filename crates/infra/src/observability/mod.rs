//! Logging setup and stable labels for structured logs

pub mod logging;

pub use logging::{error_label, init_tracing};
